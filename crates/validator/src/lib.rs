//! # data-validation
//!
//! Rule resolution and composition engine for validating values and object
//! graphs.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use data_validation::prelude::*;
//!
//! let validator = Validator::new();
//!
//! // Synchronous rules run in order; the first failing binding is returned.
//! let failed = validator.validate_value(&Value::from(""), &["required".into()])?;
//! assert_eq!(failed.unwrap().error_message(), "This value is mandatory.");
//!
//! // Object graphs carry their own configuration at any depth.
//! let order = Value::from_json(serde_json::json!({
//!     "reference": "A-12",
//!     "validationConfiguration": {
//!         "rules": { "reference": ["required", { "rule": "length", "parameters": { "max": 8 } }] }
//!     },
//!     "customer": {
//!         "email": "",
//!         "validationConfiguration": { "rules": { "email": ["required"] } }
//!     }
//! }))?;
//! let rejection = validator.is_object_valid(&order, None).await.unwrap_err();
//! assert_eq!(rejection.failure().unwrap().path(), "customer.email");
//! ```
//!
//! ## Concepts
//!
//! - [`Rule`](rule::Rule): a predicate plus a message, synchronous or
//!   asynchronous. Built-ins live in [`rules`].
//! - [`RuleRegistry`](registry::RuleRegistry): named rules, seeded with the
//!   built-ins.
//! - [`RuleBinding`](binding::RuleBinding): a rule with (possibly deferred)
//!   parameters and an apply condition.
//! - [`ValidationConfiguration`](configuration::ValidationConfiguration):
//!   which properties of a node are validated, and how.
//! - [`Validator`]: evaluates all of the above.

pub mod binding;
pub mod configuration;
pub mod deferred;
pub mod error;
mod graph;
pub mod options;
pub mod prelude;
pub mod registry;
pub mod rule;
pub mod rules;
pub mod runtime;
mod validator;
pub mod value;

pub use validator::Validator;
