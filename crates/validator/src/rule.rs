//! The rule capability.
//!
//! A [`Rule`] is a stateless predicate plus a message formatter. Rules are
//! created once, registered or shared behind an [`Arc`], and reused by every
//! validation. They never see bindings, apply conditions or deferred
//! parameters: by the time a rule runs, its parameters are plain [`Value`]s.
//!
//! A rule answers either synchronously ([`Check::Ready`]) or asynchronously
//! ([`Check::Pending`]), and should do so consistently.
//!
//! # Examples
//!
//! ```rust,ignore
//! use data_validation::rule::{Check, Rule};
//! use data_validation::value::Value;
//!
//! struct Even;
//!
//! impl Rule for Even {
//!     fn is_value_valid(&self, value: &Value, _parameters: &Value) -> Check {
//!         Check::from(value.to_number() % 2.0 == 0.0)
//!     }
//!
//!     fn error_message(&self, _parameters: &Value) -> String {
//!         "The value must be even.".to_owned()
//!     }
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::value::Value;

/// Shared handle to a rule.
pub type RuleRef = Arc<dyn Rule>;

/// Result of asking a rule about a value.
pub enum Check {
    /// The rule answered synchronously.
    Ready(bool),
    /// The rule answers later; `true` means the value is valid.
    Pending(BoxFuture<'static, bool>),
}

impl Check {
    /// Wraps an asynchronous predicate.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = bool> + Send + 'static,
    {
        Self::Pending(future.boxed())
    }

    /// Turns either form into a future.
    pub fn into_future(self) -> BoxFuture<'static, bool> {
        match self {
            Self::Ready(valid) => futures::future::ready(valid).boxed(),
            Self::Pending(future) => future,
        }
    }
}

impl From<bool> for Check {
    fn from(valid: bool) -> Self {
        Self::Ready(valid)
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(valid) => f.debug_tuple("Ready").field(valid).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A validation rule.
pub trait Rule: Send + Sync {
    /// Checks `value` against already-resolved `parameters`.
    fn is_value_valid(&self, value: &Value, parameters: &Value) -> Check;

    /// Human-facing message for a failure with these parameters.
    fn error_message(&self, parameters: &Value) -> String;

    /// Short identifier used as the failure code.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("rule")
    }
}

impl fmt::Debug for dyn Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule({})", self.name())
    }
}

/// Returns `true` when both handles point at the same rule instance.
pub fn same_rule(a: &RuleRef, b: &RuleRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

// ============================================================================
// CLOSURE RULES
// ============================================================================

/// A rule built from closures.
pub struct FnRule<P, M> {
    name: String,
    predicate: P,
    message: M,
}

impl<P, M> Rule for FnRule<P, M>
where
    P: Fn(&Value, &Value) -> Check + Send + Sync,
    M: Fn(&Value) -> String + Send + Sync,
{
    fn is_value_valid(&self, value: &Value, parameters: &Value) -> Check {
        (self.predicate)(value, parameters)
    }

    fn error_message(&self, parameters: &Value) -> String {
        (self.message)(parameters)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Builds a shared rule from a predicate and a message formatter.
///
/// ```rust,ignore
/// let even = rule_fn(
///     "even",
///     |value, _| Check::from(value.to_number() % 2.0 == 0.0),
///     |_| "The value must be even.".to_owned(),
/// );
/// ```
pub fn rule_fn<P, M>(name: impl Into<String>, predicate: P, message: M) -> RuleRef
where
    P: Fn(&Value, &Value) -> Check + Send + Sync + 'static,
    M: Fn(&Value) -> String + Send + Sync + 'static,
{
    Arc::new(FnRule {
        name: name.into(),
        predicate,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Positive;

    impl Rule for Positive {
        fn is_value_valid(&self, value: &Value, _parameters: &Value) -> Check {
            Check::from(value.to_number() > 0.0)
        }

        fn error_message(&self, _parameters: &Value) -> String {
            "The value must be positive.".to_owned()
        }
    }

    #[test]
    fn default_name_is_the_type_name() {
        assert_eq!(Positive.name(), "Positive");
    }

    #[test]
    fn closure_rules_keep_their_name() {
        let rule = rule_fn(
            "even",
            |v, _| Check::from(v.to_number() % 2.0 == 0.0),
            |_| String::new(),
        );
        assert_eq!(rule.name(), "even");
        assert!(matches!(
            rule.is_value_valid(&Value::from(4), &Value::Undefined),
            Check::Ready(true)
        ));
    }

    #[test]
    fn identity_is_by_instance() {
        let a: RuleRef = Arc::new(Positive);
        let b: RuleRef = Arc::new(Positive);
        assert!(same_rule(&a, &Arc::clone(&a)));
        assert!(!same_rule(&a, &b));
    }

    #[tokio::test]
    async fn ready_checks_lift_into_futures() {
        assert!(Check::from(true).into_future().await);
        assert!(!Check::pending(async { false }).into_future().await);
    }
}
