//! Prelude module for convenient imports.
//!
//! Provides a single `use data_validation::prelude::*;` import that brings
//! in the validator, rule building blocks, values and errors.
//!
//! # Examples
//!
//! ```rust,ignore
//! use data_validation::prelude::*;
//!
//! let validator = Validator::new();
//! let configuration = ValidationConfiguration::new()
//!     .with_rules("age", [RuleSpec::new(names::GREATER_THAN).parameters(Value::from(17))]);
//! ```

// ============================================================================
// VALIDATION: Entry points and configuration
// ============================================================================

pub use crate::configuration::ValidationConfiguration;
pub use crate::options::ValidatorOptions;
pub use crate::runtime::{AsyncRuntime, DrainAll, FailFast, Spawned};
pub use crate::validator::Validator;

// ============================================================================
// RULES: Capability, bindings, registry, built-ins
// ============================================================================

pub use crate::binding::{RawRule, RuleBinding, RuleDescriptor, RuleSpec};
pub use crate::registry::RuleRegistry;
pub use crate::rule::{Check, Rule, RuleRef, rule_fn, same_rule};
pub use crate::rules::names;

// ============================================================================
// DATA: Values and deferred parameters
// ============================================================================

pub use crate::deferred::{Deferred, Parameters};
pub use crate::value::{Object, Value};

// ============================================================================
// ERRORS
// ============================================================================

pub use crate::error::{
    ConfigError, Failure, Outcome, Rejection, RuleError, ValidationError, ValidationErrors,
};
