//! Error types
//!
//! Failed validation is an expected outcome, not an exceptional one, so it
//! travels by value:
//!
//! - [`Failure`] names the [`RuleBinding`] that rejected a value and where
//!   the value sits in the validated graph.
//! - [`Rejection`] is the error side of every asynchronous [`Outcome`]. It is
//!   either a [`Failure`] or a [`RuleError`] raised while turning rule
//!   descriptors into bindings.
//! - [`ValidationError`] / [`ValidationErrors`] are flat, structured reports
//!   (code, message, field path, parameters) for callers that want every
//!   failing property rather than the first one.
//!
//! Construction problems ([`RuleError`], [`ConfigError`]) are ordinary
//! `std::error::Error`s returned synchronously.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::binding::RuleBinding;

/// Result of an asynchronous validation.
pub type Outcome = Result<(), Rejection>;

// ============================================================================
// CONSTRUCTION ERRORS
// ============================================================================

/// Errors raised while building or registering rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// A binding was built from an empty rule name.
    #[error("raw rule must be a rule instance or a non-empty rule name")]
    InvalidRule,

    /// `add_rule` was called with a name that is already registered.
    #[error("rule `{name}` already exists")]
    DuplicateRule {
        /// The conflicting name.
        name: String,
    },
}

/// Errors raised while reading a validation configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration JSON does not have the expected shape.
    #[error("invalid validation configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration embedded in a JSON document is malformed.
    #[error("invalid validation configuration embedded at `{path}`: {source}")]
    Embedded {
        /// Path of the object carrying the configuration.
        path: String,
        /// Underlying problem.
        #[source]
        source: Box<ConfigError>,
    },
}

// ============================================================================
// FAILURES
// ============================================================================

/// The binding that rejected a value, and where that value lives.
#[derive(Debug, Clone)]
pub struct Failure {
    path: String,
    binding: Arc<RuleBinding>,
}

impl Failure {
    /// Failure of a value validated on its own.
    pub fn new(binding: Arc<RuleBinding>) -> Self {
        Self {
            path: String::new(),
            binding,
        }
    }

    /// Sets the property path (`"user.address.zipcode"`, `"items[0].name"`).
    #[must_use = "builder methods must be chained or built"]
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Property path of the failing value; empty for a bare value.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The binding that failed.
    pub fn binding(&self) -> &Arc<RuleBinding> {
        &self.binding
    }

    /// Human-facing message of the failing binding.
    pub fn message(&self) -> String {
        self.binding.error_message()
    }

    /// Converts to a structured report.
    pub fn to_validation_error(&self) -> ValidationError {
        let mut error = ValidationError::new(self.binding.rule_name().to_owned(), self.message());
        if !self.path.is_empty() {
            error = error.with_field(self.path.clone());
        }
        if let crate::value::Value::Object(parameters) = self.binding.parameters_values() {
            for (name, value) in parameters.iter() {
                error = error.with_param(name.to_owned(), value.coerce_to_string());
            }
        }
        error
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.binding.rule_name(), self.message())
        } else {
            write!(f, "[{}] {}: {}", self.path, self.binding.rule_name(), self.message())
        }
    }
}

impl std::error::Error for Failure {}

/// Why an asynchronous validation did not succeed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Rejection {
    /// A rule rejected a value.
    #[error(transparent)]
    Invalid(#[from] Failure),

    /// A rule descriptor could not be turned into a binding.
    #[error(transparent)]
    Rule(#[from] RuleError),
}

impl Rejection {
    /// The failure, when a rule rejected a value.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Invalid(failure) => Some(failure),
            Self::Rule(_) => None,
        }
    }

    /// The failing binding, when a rule rejected a value.
    pub fn binding(&self) -> Option<&Arc<RuleBinding>> {
        self.failure().map(Failure::binding)
    }

    /// Re-roots the failure path under `prefix`.
    pub(crate) fn nest(self, prefix: &str) -> Self {
        match self {
            Self::Invalid(failure) if !prefix.is_empty() => {
                let path = join_path(prefix, &failure.path);
                Self::Invalid(failure.at(path))
            }
            other => other,
        }
    }
}

/// Joins a parent path and a child path (`"a" + "b"` → `"a.b"`,
/// `"a" + "[0]"` → `"a[0]"`).
pub(crate) fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_owned()
    } else if child.is_empty() {
        parent.to_owned()
    } else if child.starts_with('[') {
        format!("{parent}{child}")
    } else {
        format!("{parent}.{child}")
    }
}

// ============================================================================
// STRUCTURED REPORTS
// ============================================================================

/// A structured validation report entry.
///
/// `code` is the failing rule's name, `params` its resolved named parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule name, for programmatic handling and i18n lookups.
    pub code: Cow<'static, str>,

    /// Human-readable message.
    pub message: Cow<'static, str>,

    /// Property path, e.g. `"user.email"` or `"items[0].name"`.
    pub field: Option<Cow<'static, str>>,

    /// Message template parameters, in declaration order.
    pub params: Vec<(Cow<'static, str>, Cow<'static, str>)>,
}

impl ValidationError {
    /// Creates an error with a code and message.
    pub fn new(code: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            field: None,
            params: Vec::new(),
        }
    }

    /// Sets the field path.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_field(mut self, field: impl Into<Cow<'static, str>>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Adds a template parameter.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_param(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Looks up a parameter value by key.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_ref())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(field) = &self.field {
            write!(f, "[{}] {}: {}", field, self.code, self.message)?;
        } else {
            write!(f, "{}: {}", self.code, self.message)?;
        }

        if !self.params.is_empty() {
            write!(f, " (params: [")?;
            for (i, (k, v)) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{k}={v}")?;
            }
            write!(f, "])")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl From<&Failure> for ValidationError {
    fn from(failure: &Failure) -> Self {
        failure.to_validation_error()
    }
}

/// A collection of validation errors, one per failing property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Adds an error.
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Adds every error of `other`.
    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// All errors, in traversal order.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// The error recorded for a field path.
    #[must_use]
    pub fn field(&self, path: &str) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.field.as_deref() == Some(path))
    }

    /// Converts to a Result.
    #[must_use = "result must be used"]
    pub fn into_result<T>(self, ok_value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(ok_value)
        } else {
            Err(self)
        }
    }
}

impl FromIterator<ValidationError> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
