//! Dynamic values checked by the rule engine.
//!
//! [`Value`] is the data model every rule, binding and validator works on.
//! It keeps the distinctions loosely typed data sources rely on:
//!
//! - [`Value::Undefined`] is an absent property. Looking up a missing key
//!   (or any key on a scalar) yields `Undefined`, never an error.
//! - [`Value::Null`] is an explicit "no value".
//! - `Value::Number(f64::NAN)` is a number that failed to parse.
//!
//! Objects are insertion ordered and may carry an attached
//! [`ValidationConfiguration`] describing how their own properties are
//! validated. The configuration lives in a dedicated slot, never among the
//! fields, so graph traversal can not descend into it.
//!
//! # Examples
//!
//! ```rust,ignore
//! use data_validation::value::{Object, Value};
//!
//! let user = Value::from(Object::new().with("name", "alice").with("age", 31));
//! assert_eq!(user.get("name"), &Value::from("alice"));
//! assert!(user.get("email").is_undefined());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;

use crate::configuration::ValidationConfiguration;
use crate::error::ConfigError;
use crate::options::DEFAULT_CONFIGURATION_KEY;

pub(crate) static UNDEFINED: Value = Value::Undefined;

// ============================================================================
// VALUE
// ============================================================================

/// A dynamically typed value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Absent value (missing property).
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// IEEE-754 number; `NaN` is a legal, invalid-by-default value.
    Number(f64),
    /// UTF-8 string.
    String(String),
    /// Point in time.
    Date(DateTime<Utc>),
    /// Ordered sequence. Indices are its properties.
    Array(Vec<Value>),
    /// Ordered map with an optional attached configuration.
    Object(Object),
}

impl Value {
    /// Returns `true` for [`Value::Undefined`].
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for a `NaN` number.
    pub fn is_nan(&self) -> bool {
        matches!(self, Self::Number(n) if n.is_nan())
    }

    /// Returns `true` for [`Value::Date`].
    pub fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// Returns `true` for arrays and objects, the nodes graph validation
    /// descends into.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// Returns the object payload, if any.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the number payload, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up a property.
    ///
    /// Objects resolve field names, arrays resolve decimal indices. Anything
    /// else (including a missing key) resolves to [`Value::Undefined`].
    pub fn get(&self, property: &str) -> &Value {
        let found = match self {
            Self::Object(object) => object.get(property),
            Self::Array(items) => property.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        found.unwrap_or(&UNDEFINED)
    }

    /// Truthiness: `undefined`, `null`, `false`, `0`, `NaN` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Date(_) | Self::Array(_) | Self::Object(_) => true,
        }
    }

    /// Loose string coercion.
    pub fn coerce_to_string(&self) -> String {
        match self {
            Self::Undefined => "undefined".to_owned(),
            Self::Null => "null".to_owned(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.clone(),
            Self::Date(d) => d.to_rfc3339_opts(SecondsFormat::Millis, true),
            Self::Array(items) => items
                .iter()
                .map(|item| match item {
                    Self::Undefined | Self::Null => String::new(),
                    other => other.coerce_to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Self::Object(_) => "[object Object]".to_owned(),
        }
    }

    /// Loose numeric coercion. Unconvertible values become `NaN`.
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Undefined | Self::Object(_) => f64::NAN,
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => parse_number(s),
            Self::Date(d) => d.timestamp_millis() as f64,
            Self::Array(_) => parse_number(&self.coerce_to_string()),
        }
    }

    /// Projects the value onto a primitive: dates become their epoch
    /// milliseconds, arrays and objects become their string coercion.
    pub fn primitive(&self) -> Value {
        match self {
            Self::Date(d) => Self::Number(d.timestamp_millis() as f64),
            Self::Array(_) | Self::Object(_) => Self::String(self.coerce_to_string()),
            other => other.clone(),
        }
    }

    /// Loose relational comparison.
    ///
    /// Two strings compare lexicographically, everything else numerically.
    /// Returns `None` when the numeric projection of either side is `NaN`,
    /// which makes every relational check fail.
    pub fn loose_compare(&self, other: &Value) -> Option<Ordering> {
        match (self.primitive(), other.primitive()) {
            (Self::String(a), Self::String(b)) => Some(a.cmp(&b)),
            (a, b) => a.to_number().partial_cmp(&b.to_number()),
        }
    }

    /// Converts JSON into a value, extracting every embedded
    /// `"validationConfiguration"` member into its object's configuration slot.
    pub fn from_json(json: serde_json::Value) -> Result<Value, ConfigError> {
        Self::from_json_with_key(json, DEFAULT_CONFIGURATION_KEY)
    }

    /// Like [`Value::from_json`] with a custom configuration member name.
    pub fn from_json_with_key(json: serde_json::Value, key: &str) -> Result<Value, ConfigError> {
        convert_json(json, key, &mut String::new())
    }
}

fn convert_json(
    json: serde_json::Value,
    key: &str,
    path: &mut String,
) -> Result<Value, ConfigError> {
    match json {
        serde_json::Value::Array(items) => {
            let mut converted = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                let len = path.len();
                path.push_str(&format!("[{index}]"));
                converted.push(convert_json(item, key, path)?);
                path.truncate(len);
            }
            Ok(Value::Array(converted))
        }
        serde_json::Value::Object(map) => {
            let mut object = Object::new();
            for (name, member) in map {
                if name == key {
                    let configuration =
                        ValidationConfiguration::from_json(member).map_err(|source| {
                            let path = if path.is_empty() { "<root>" } else { path.as_str() };
                            ConfigError::Embedded {
                                path: path.to_owned(),
                                source: Box::new(source),
                            }
                        })?;
                    object.set_configuration(configuration);
                    continue;
                }
                let len = path.len();
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(&name);
                let converted = convert_json(member, key, path)?;
                path.truncate(len);
                object.insert(name, converted);
            }
            Ok(Value::Object(object))
        }
        other => Ok(Value::from(other)),
    }
}

fn parse_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // Rust accepts spellings like "inf" and "nan" that loose coercion rejects.
        _ if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => f64::NAN,
        _ => trimmed.parse().unwrap_or(f64::NAN),
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        "0".to_owned()
    } else if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.coerce_to_string())
    }
}

// ============================================================================
// OBJECT
// ============================================================================

/// Insertion-ordered object with an optional attached configuration.
#[derive(Debug, Clone, Default)]
pub struct Object {
    fields: IndexMap<String, Value>,
    configuration: Option<Arc<ValidationConfiguration>>,
}

impl Object {
    /// Creates an empty object without configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field (builder style).
    #[must_use = "builder methods must be chained or built"]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Attaches a validation configuration (builder style).
    #[must_use = "builder methods must be chained or built"]
    pub fn with_configuration(mut self, configuration: ValidationConfiguration) -> Self {
        self.set_configuration(configuration);
        self
    }

    /// Inserts a field, returning the previous value under that name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Attaches a validation configuration, replacing any previous one.
    pub fn set_configuration(&mut self, configuration: ValidationConfiguration) {
        self.configuration = Some(Arc::new(configuration));
    }

    /// The attached validation configuration.
    pub fn configuration(&self) -> Option<&ValidationConfiguration> {
        self.configuration.as_deref()
    }

    /// Looks up a field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Iterates fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when the object has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// Configuration is metadata about the object, not part of its value.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            configuration: None,
        }
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Self::Number(n as f64)
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Self::Date(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Plain conversion: a configuration member is kept as ordinary data.
/// Use [`Value::from_json`] to attach embedded configurations.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Object(map.into_iter().collect()),
        }
    }
}
