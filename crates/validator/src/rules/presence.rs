//! Presence rules: the gate rule and `required`.

use crate::rule::{Check, Rule};
use crate::value::Value;

/// Valid when the value is neither undefined nor `NaN`.
///
/// This is the gate rule run first for every synchronous rule list. It does
/// not reject `null`; null handling belongs to [`Required`] and null bypass.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinedAndNotNan;

impl Rule for DefinedAndNotNan {
    fn is_value_valid(&self, value: &Value, _parameters: &Value) -> Check {
        Check::from(!value.is_undefined() && !value.is_nan())
    }

    fn error_message(&self, _parameters: &Value) -> String {
        "The entered value is invalid.".to_owned()
    }

    fn name(&self) -> &str {
        super::names::DEFINED_AND_NOT_NAN
    }
}

/// Valid unless the value is `null`, an empty array, an object without
/// fields, or anything whose string coercion is empty.
///
/// `0`, `false` and dates are present values.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl Required {
    fn is_present(value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::Array(items) => !items.is_empty(),
            Value::Object(object) => !object.is_empty(),
            Value::Date(_) => true,
            other => !other.coerce_to_string().is_empty(),
        }
    }
}

impl Rule for Required {
    fn is_value_valid(&self, value: &Value, _parameters: &Value) -> Check {
        Check::from(Self::is_present(value))
    }

    fn error_message(&self, _parameters: &Value) -> String {
        "This value is mandatory.".to_owned()
    }

    fn name(&self) -> &str {
        super::names::REQUIRED
    }
}
