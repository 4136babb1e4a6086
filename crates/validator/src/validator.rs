//! The validator
//!
//! [`Validator`] evaluates rule lists against single values and walks object
//! graphs applying each node's [`ValidationConfiguration`].
//!
//! # Evaluation policy
//!
//! - **Synchronous lists** ([`Validator::validate_value`]) run in order,
//!   behind the gate rule, and stop at the first failing binding.
//! - **Null bypass**: `null` passes every synchronous list that does not
//!   contain the `required` rule. The gate rule does not block `null`.
//! - **Asynchronous lists** ([`Validator::async_validate_value`]) start every
//!   rule at once; the [`AsyncRuntime`] decides how the results are awaited.
//!   The default settles on the first failure without cancelling the rest.
//! - **Graphs** ([`Validator::is_object_valid`]) start every property
//!   validation and every child traversal; there is no short-circuit between
//!   siblings.
//!
//! Every asynchronous entry point evaluates synchronous rules and starts
//! asynchronous ones before returning its future.
//!
//! # Examples
//!
//! ```rust,ignore
//! use data_validation::prelude::*;
//!
//! let validator = Validator::new();
//!
//! let failed = validator.validate_value(&Value::from(""), &["required".into()])?;
//! assert_eq!(failed.unwrap().error_message(), "This value is mandatory.");
//!
//! let user = Value::from_json(serde_json::json!({
//!     "name": "alice",
//!     "validationConfiguration": { "rules": { "name": ["required"] } }
//! }))?;
//! validator.is_object_valid(&user, None).await?;
//! ```

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, trace};

use crate::binding::{RuleBinding, RuleDescriptor};
use crate::configuration::ValidationConfiguration;
use crate::error::{Failure, Outcome, Rejection, RuleError, ValidationErrors};
use crate::graph::Scope;
use crate::options::ValidatorOptions;
use crate::registry::RuleRegistry;
use crate::rule::same_rule;
use crate::runtime::{AsyncRuntime, Spawned};
use crate::value::Value;

/// Evaluates rules against values and object graphs.
#[derive(Debug, Clone)]
pub struct Validator {
    registry: RuleRegistry,
    runtime: Arc<dyn AsyncRuntime>,
    options: ValidatorOptions,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Validator over the process-wide registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(RuleRegistry::global().clone())
    }

    /// Validator over a specific registry.
    ///
    /// Asynchronous outcomes are aggregated by [`Spawned`]: the first failure
    /// settles them while the other evaluations keep running.
    #[must_use]
    pub fn with_registry(registry: RuleRegistry) -> Self {
        Self {
            registry,
            runtime: Arc::new(Spawned::new()),
            options: ValidatorOptions::default(),
        }
    }

    /// Replaces the aggregation strategy (builder style).
    #[must_use = "builder methods must be chained or built"]
    pub fn with_runtime(mut self, runtime: impl AsyncRuntime + 'static) -> Self {
        self.set_runtime(runtime);
        self
    }

    /// Replaces the options (builder style).
    #[must_use = "builder methods must be chained or built"]
    pub fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the aggregation strategy.
    pub fn set_runtime(&mut self, runtime: impl AsyncRuntime + 'static) {
        self.runtime = Arc::new(runtime);
    }

    /// Registry used to resolve rule names.
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Current aggregation strategy.
    pub fn runtime(&self) -> &dyn AsyncRuntime {
        self.runtime.as_ref()
    }

    /// Current options.
    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    // ------------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------------

    /// Runs synchronous rules in order and returns the first failing binding.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidRule`] when a descriptor reached before the
    /// first failure names no rule.
    pub fn validate_value(
        &self,
        value: &Value,
        rules: &[RuleDescriptor],
    ) -> Result<Option<Arc<RuleBinding>>, RuleError> {
        let gate = RuleBinding::new(self.options.gate_rule.as_str(), None, None, &self.registry)?;

        if value.is_null() && !self.is_required(rules)? {
            trace!("null value bypasses validation");
            return Ok(None);
        }

        let bindings = std::iter::once(Ok(Arc::new(gate)))
            .chain(rules.iter().map(|descriptor| descriptor.to_binding(&self.registry)));
        for binding in bindings {
            let binding = binding?;
            if !binding.is_value_valid(value) {
                debug!(rule = binding.rule_name(), "value failed validation");
                return Ok(Some(binding));
            }
        }
        Ok(None)
    }

    /// Starts every asynchronous rule and aggregates their outcomes.
    pub fn async_validate_value(
        &self,
        value: &Value,
        rules: &[RuleDescriptor],
    ) -> BoxFuture<'static, Outcome> {
        let mut evaluations = Vec::with_capacity(rules.len());
        for descriptor in rules {
            match descriptor.to_binding(&self.registry) {
                Ok(binding) => {
                    evaluations.push(binding.async_is_value_valid(value, self.runtime.as_ref()));
                }
                Err(error) => return self.runtime.settled(Err(error.into())),
            }
        }
        self.runtime.all(evaluations)
    }

    /// Combines a synchronous and an asynchronous rule list into one outcome.
    pub fn is_value_valid(
        &self,
        value: &Value,
        rules: &[RuleDescriptor],
        async_rules: &[RuleDescriptor],
    ) -> BoxFuture<'static, Outcome> {
        let sync_outcome = match self.validate_value(value, rules) {
            Ok(None) => Ok(()),
            Ok(Some(binding)) => Err(Rejection::Invalid(Failure::new(binding))),
            Err(error) => Err(Rejection::Rule(error)),
        };
        let evaluations = vec![
            self.runtime.settled(sync_outcome),
            self.async_validate_value(value, async_rules),
        ];
        self.runtime.all(evaluations)
    }

    // ------------------------------------------------------------------------
    // Graphs
    // ------------------------------------------------------------------------

    /// Validates a node and, recursively, every object or array below it.
    ///
    /// `configuration` applies to `node` only and takes precedence over the
    /// node's attached configuration; descendants always use their own.
    ///
    /// Cyclic graphs are not supported.
    pub fn is_object_valid(
        &self,
        node: &Value,
        configuration: Option<&ValidationConfiguration>,
    ) -> BoxFuture<'static, Outcome> {
        self.runtime.all(self.graph_evaluations(node, configuration, Scope::All))
    }

    /// Like [`Validator::is_object_valid`], restricted at every node to the
    /// properties of `group`. Nodes without the group validate nothing
    /// themselves but are still traversed.
    pub fn is_group_valid(
        &self,
        node: &Value,
        group: &str,
        configuration: Option<&ValidationConfiguration>,
    ) -> BoxFuture<'static, Outcome> {
        self.runtime
            .all(self.graph_evaluations(node, configuration, Scope::Group(group)))
    }

    /// Every failing property of a graph, one entry per property, keyed by
    /// property path.
    pub fn object_errors(
        &self,
        node: &Value,
        configuration: Option<&ValidationConfiguration>,
    ) -> BoxFuture<'static, ValidationErrors> {
        self.collect_errors(self.graph_evaluations(node, configuration, Scope::All))
    }

    /// [`Validator::object_errors`] restricted to a group.
    pub fn group_errors(
        &self,
        node: &Value,
        group: &str,
        configuration: Option<&ValidationConfiguration>,
    ) -> BoxFuture<'static, ValidationErrors> {
        self.collect_errors(self.graph_evaluations(node, configuration, Scope::Group(group)))
    }

    fn is_required(&self, rules: &[RuleDescriptor]) -> Result<bool, RuleError> {
        let Some(required) = self.registry.get_rule(&self.options.required_rule) else {
            return Ok(false);
        };
        for descriptor in rules {
            let binding = descriptor.to_binding(&self.registry)?;
            if binding.rule().is_some_and(|rule| same_rule(rule, &required)) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
