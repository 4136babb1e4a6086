//! Built-in rules
//!
//! These are the rules every [`RuleRegistry`](crate::registry::RuleRegistry)
//! is seeded with. Each one is a one-shot predicate over a [`Value`] and its
//! resolved parameters, with loose coercion semantics.
//!
//! # Rules
//!
//! - **Presence**: [`DefinedAndNotNan`] (the gate rule), [`Required`]
//! - **Comparison**: [`Equals`], [`Is`], [`GreaterThan`], [`LowerThan`], [`Range`]
//! - **Text**: [`Length`], [`Pattern`]
//!
//! # Examples
//!
//! ```rust,ignore
//! use data_validation::prelude::*;
//!
//! let binding = RuleBinding::new(
//!     names::GREATER_THAN,
//!     Some(Parameters::map([("reference", Deferred::from(18))])),
//!     None,
//!     &RuleRegistry::new(),
//! )?;
//! assert!(binding.is_value_valid(&Value::from(21)));
//! ```

pub mod comparison;
pub mod presence;
pub mod text;

use crate::rule::RuleRef;
use crate::value::Value;
use std::sync::Arc;

pub use comparison::{Equals, GreaterThan, Is, LowerThan, Range};
pub use presence::{DefinedAndNotNan, Required};
pub use text::{Length, Pattern};

/// Registry names of the built-in rules.
pub mod names {
    /// Gate rule prepended to every synchronous rule list.
    pub const DEFINED_AND_NOT_NAN: &str = "definedAndNotNan";
    /// Presence rule; also disables null bypass.
    pub const REQUIRED: &str = "required";
    /// Loose equality with a reference.
    pub const EQUALS: &str = "equals";
    /// Strict equality with a reference.
    pub const IS: &str = "is";
    /// `>` / `>=` against a reference.
    pub const GREATER_THAN: &str = "greaterThan";
    /// `<` / `<=` against a reference.
    pub const LOWER_THAN: &str = "lowerThan";
    /// Inclusive range.
    pub const RANGE: &str = "range";
    /// Length bounds.
    pub const LENGTH: &str = "length";
    /// Regular expression match.
    pub const PATTERN: &str = "pattern";
}

/// The built-in rule set, in seeding order.
pub fn builtin() -> Vec<(&'static str, RuleRef)> {
    vec![
        (names::DEFINED_AND_NOT_NAN, Arc::new(DefinedAndNotNan) as RuleRef),
        (names::REQUIRED, Arc::new(Required)),
        (names::EQUALS, Arc::new(Equals)),
        (names::GREATER_THAN, Arc::new(GreaterThan)),
        (names::LOWER_THAN, Arc::new(LowerThan)),
        (names::IS, Arc::new(Is)),
        (names::PATTERN, Arc::new(Pattern::new())),
        (names::LENGTH, Arc::new(Length)),
        (names::RANGE, Arc::new(Range)),
    ]
}

/// Reads a named parameter, falling back to the whole parameter value when
/// it is not an object (so `greaterThan` accepts a bare reference too).
fn named_or_whole<'a>(parameters: &'a Value, name: &str) -> &'a Value {
    match parameters {
        Value::Object(_) => parameters.get(name),
        other => other,
    }
}
