//! Length and pattern rules.

use std::fmt;
use std::sync::Arc;

use moka::sync::Cache;
use regex::Regex;

use super::{names, named_or_whole};
use crate::rule::{Check, Rule};
use crate::value::{UNDEFINED, Value};

/// Valid when the length satisfies the configured bounds.
///
/// Arrays are measured by element count, everything else by the character
/// count of its string coercion. Parameters are `{ equals?, min?, max? }`;
/// `equals` is checked first and wins over the range. A bare number is read
/// as `max`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Length;

struct LengthBounds<'a> {
    equals: &'a Value,
    min: &'a Value,
    max: &'a Value,
}

impl<'a> LengthBounds<'a> {
    fn from_parameters(parameters: &'a Value) -> Self {
        match parameters {
            Value::Object(_) => Self {
                equals: parameters.get("equals"),
                min: parameters.get("min"),
                max: parameters.get("max"),
            },
            other => Self {
                equals: &UNDEFINED,
                min: &UNDEFINED,
                max: other,
            },
        }
    }
}

impl Length {
    fn measure(value: &Value) -> f64 {
        match value {
            Value::Array(items) => items.len() as f64,
            other => other.coerce_to_string().chars().count() as f64,
        }
    }
}

impl Rule for Length {
    fn is_value_valid(&self, value: &Value, parameters: &Value) -> Check {
        let bounds = LengthBounds::from_parameters(parameters);
        let length = Self::measure(value);

        if !bounds.equals.is_undefined() && length != bounds.equals.to_number() {
            return Check::from(false);
        }
        let bound_or = |bound: &Value, fallback: f64| {
            if bound.is_undefined() { fallback } else { bound.to_number() }
        };
        let min = bound_or(bounds.min, f64::NEG_INFINITY);
        let max = bound_or(bounds.max, f64::INFINITY);

        Check::from(min <= length && length <= max)
    }

    fn error_message(&self, parameters: &Value) -> String {
        let bounds = LengthBounds::from_parameters(parameters);
        match (bounds.equals, bounds.min, bounds.max) {
            (equals, _, _) if !equals.is_undefined() => {
                format!("The value length must be {equals}.")
            }
            (_, Value::Undefined, Value::Undefined) => "The value length is invalid.".to_owned(),
            (_, min, Value::Undefined) => {
                format!("The value length must be greater or equal to {min}.")
            }
            (_, Value::Undefined, max) => {
                format!("The value length must be lower or equal to {max}.")
            }
            (_, min, max) => format!("The value length must be between {min} and {max}."),
        }
    }

    fn name(&self) -> &str {
        names::LENGTH
    }
}

/// Compiled expressions kept by a [`Pattern`] rule unless configured otherwise.
pub const DEFAULT_PATTERN_CACHE_CAPACITY: u64 = 256;

/// Valid when the string coercion of the value matches a regular expression.
///
/// The parameter is the expression source (or `{ pattern }`). Compiled
/// expressions (and invalid sources) are kept in a bounded cache keyed by
/// source; an invalid expression fails every value.
pub struct Pattern {
    compiled: Cache<String, Option<Arc<Regex>>>,
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("cached", &self.compiled.entry_count())
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl Pattern {
    /// Creates the rule with the default cache capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_PATTERN_CACHE_CAPACITY)
    }

    /// Creates the rule keeping at most `capacity` compiled expressions.
    #[must_use]
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            compiled: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Maximum number of cached expressions.
    pub fn capacity(&self) -> u64 {
        self.compiled.policy().max_capacity().unwrap_or(0)
    }

    /// Number of cached expressions, after pending evictions are applied.
    pub fn cache_size(&self) -> u64 {
        self.compiled.run_pending_tasks();
        self.compiled.entry_count()
    }

    fn matches(&self, source: &str, haystack: &str) -> bool {
        let regex = self.compiled.get_with_by_ref(source, || {
            Regex::new(source)
                .map(Arc::new)
                .map_err(|error| {
                    tracing::warn!(pattern = source, %error, "invalid pattern rule expression");
                })
                .ok()
        });
        regex.is_some_and(|regex| regex.is_match(haystack))
    }
}

impl Rule for Pattern {
    fn is_value_valid(&self, value: &Value, parameters: &Value) -> Check {
        let source = named_or_whole(parameters, "pattern").coerce_to_string();
        Check::from(self.matches(&source, &value.coerce_to_string()))
    }

    fn error_message(&self, parameters: &Value) -> String {
        format!("The value must match /{}/ pattern.", named_or_whole(parameters, "pattern"))
    }

    fn name(&self) -> &str {
        names::PATTERN
    }
}
