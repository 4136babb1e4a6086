//! Comparison rules
//!
//! All comparisons go through [`Value::loose_compare`] and
//! [`Value::primitive`], so dates compare by timestamp and numeric strings
//! compare with numbers.
//!
//! # Parameters
//!
//! | rule | parameters |
//! |---|---|
//! | [`Equals`], [`Is`] | the reference value |
//! | [`GreaterThan`], [`LowerThan`] | `{ reference, orEqual? }` or a bare reference |
//! | [`Range`] | `{ min, max }` |

use std::cmp::Ordering;

use super::{names, named_or_whole};
use crate::rule::{Check, Rule};
use crate::value::Value;

/// Valid when the value-of projections of value and reference are equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equals;

impl Rule for Equals {
    fn is_value_valid(&self, value: &Value, reference: &Value) -> Check {
        Check::from(value.primitive() == reference.primitive())
    }

    fn error_message(&self, reference: &Value) -> String {
        if reference.is_date() {
            format!("The date must be {reference}.")
        } else {
            format!("The value must equal {reference}.")
        }
    }

    fn name(&self) -> &str {
        names::EQUALS
    }
}

/// Valid when value and reference are strictly equal (no coercion).
#[derive(Debug, Clone, Copy, Default)]
pub struct Is;

impl Rule for Is {
    fn is_value_valid(&self, value: &Value, reference: &Value) -> Check {
        Check::from(value == reference)
    }

    fn error_message(&self, reference: &Value) -> String {
        format!("The value must be {reference}.")
    }

    fn name(&self) -> &str {
        names::IS
    }
}

/// Shared shape of `greaterThan` / `lowerThan`.
struct Bound<'a> {
    reference: &'a Value,
    or_equal: bool,
}

impl<'a> Bound<'a> {
    fn from_parameters(parameters: &'a Value) -> Self {
        Self {
            reference: named_or_whole(parameters, "reference"),
            or_equal: parameters.as_object().is_some() && parameters.get("orEqual").is_truthy(),
        }
    }

    fn accepts(&self, value: &Value, wanted: Ordering) -> bool {
        match value.loose_compare(self.reference) {
            Some(Ordering::Equal) => self.or_equal,
            Some(ordering) => ordering == wanted,
            None => false,
        }
    }

    fn message(&self, value_word: &str, date_word: &str) -> String {
        let head = if self.reference.is_date() {
            format!("The date must be {date_word}")
        } else {
            format!("The value must be {value_word}")
        };
        let link = if self.or_equal { " or equal to " } else { " than " };
        format!("{head}{link}{}.", self.reference)
    }
}

/// Valid when the value is greater than (or equal to) the reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreaterThan;

impl Rule for GreaterThan {
    fn is_value_valid(&self, value: &Value, parameters: &Value) -> Check {
        Check::from(Bound::from_parameters(parameters).accepts(value, Ordering::Greater))
    }

    fn error_message(&self, parameters: &Value) -> String {
        Bound::from_parameters(parameters).message("greater", "later")
    }

    fn name(&self) -> &str {
        names::GREATER_THAN
    }
}

/// Valid when the value is lower than (or equal to) the reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerThan;

impl Rule for LowerThan {
    fn is_value_valid(&self, value: &Value, parameters: &Value) -> Check {
        Check::from(Bound::from_parameters(parameters).accepts(value, Ordering::Less))
    }

    fn error_message(&self, parameters: &Value) -> String {
        Bound::from_parameters(parameters).message("lower", "earlier")
    }

    fn name(&self) -> &str {
        names::LOWER_THAN
    }
}

/// Valid when `min <= value <= max`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Range;

impl Rule for Range {
    fn is_value_valid(&self, value: &Value, parameters: &Value) -> Check {
        let not_greater = |a: &Value, b: &Value| {
            matches!(a.loose_compare(b), Some(Ordering::Less | Ordering::Equal))
        };
        Check::from(
            not_greater(parameters.get("min"), value) && not_greater(value, parameters.get("max")),
        )
    }

    fn error_message(&self, parameters: &Value) -> String {
        let (min, max) = (parameters.get("min"), parameters.get("max"));
        let kind = if min.is_date() || max.is_date() { "date" } else { "value" };
        format!("The {kind} must be between {min} and {max}.")
    }

    fn name(&self) -> &str {
        names::RANGE
    }
}
