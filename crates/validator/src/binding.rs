//! Rule bindings and rule descriptors
//!
//! A [`RuleBinding`] is a rule bound to parameters and an optional apply
//! condition. Bindings are what validators actually evaluate; everything a
//! caller can write in a rule list is a [`RuleDescriptor`] and is turned
//! into a binding by [`RuleDescriptor::to_binding`].
//!
//! Rule names are resolved against a [`RuleRegistry`] once, when the binding
//! is built. Parameters and apply conditions may be [`Deferred`] and are
//! resolved every time the binding is evaluated.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::{debug, error, trace, warn};

use crate::deferred::{Deferred, Parameters};
use crate::error::{Failure, Outcome, Rejection, RuleError};
use crate::registry::RuleRegistry;
use crate::rule::{Check, RuleRef};
use crate::runtime::AsyncRuntime;
use crate::value::Value;

// ============================================================================
// RAW RULES
// ============================================================================

/// A rule given by name or by instance.
#[derive(Debug, Clone)]
pub enum RawRule {
    /// Name looked up in a [`RuleRegistry`].
    Name(String),
    /// Rule used as-is.
    Instance(RuleRef),
}

impl From<&str> for RawRule {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for RawRule {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<RuleRef> for RawRule {
    fn from(rule: RuleRef) -> Self {
        Self::Instance(rule)
    }
}

// ============================================================================
// RULE BINDING
// ============================================================================

/// A rule with its parameters and apply condition.
#[derive(Debug, Clone)]
pub struct RuleBinding {
    rule: Option<RuleRef>,
    rule_name: String,
    parameters: Parameters,
    apply_condition: Option<Deferred<bool>>,
}

impl RuleBinding {
    /// Binds a rule.
    ///
    /// A name is resolved against `registry` now and never again: later
    /// registry changes do not affect this binding. An unknown name still
    /// builds a binding, which fails every value it is asked about.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidRule`] for an empty name.
    pub fn new(
        raw: impl Into<RawRule>,
        parameters: Option<Parameters>,
        apply_condition: Option<Deferred<bool>>,
        registry: &RuleRegistry,
    ) -> Result<Self, RuleError> {
        let (rule, rule_name) = match raw.into() {
            RawRule::Name(name) if name.is_empty() => return Err(RuleError::InvalidRule),
            RawRule::Name(name) => (registry.get_rule(&name), name),
            RawRule::Instance(rule) => {
                let name = rule.name().to_owned();
                (Some(rule), name)
            }
        };

        Ok(Self {
            rule,
            rule_name,
            parameters: parameters.unwrap_or_default(),
            apply_condition,
        })
    }

    /// The bound rule; `None` when the name was not registered.
    pub fn rule(&self) -> Option<&RuleRef> {
        self.rule.as_ref()
    }

    /// Name the rule was requested by (or the instance's own name).
    pub fn rule_name(&self) -> &str {
        &self.rule_name
    }

    /// Unresolved parameters.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// `true` unless an apply condition is set and currently resolves to `false`.
    pub fn should_be_applied(&self) -> bool {
        self.apply_condition.as_ref().is_none_or(Deferred::resolve)
    }

    /// Parameters with every deferred element resolved, keeping their shape.
    pub fn parameters_values(&self) -> Value {
        self.parameters.resolve()
    }

    /// Synchronous evaluation. A binding that does not apply is valid.
    pub fn is_value_valid(&self, value: &Value) -> bool {
        if !self.should_be_applied() {
            trace!(rule = %self.rule_name, "binding skipped by its apply condition");
            return true;
        }
        let Some(rule) = &self.rule else {
            error!(rule = %self.rule_name, "evaluating a rule that is not registered");
            return false;
        };

        let valid = match rule.is_value_valid(value, &self.parameters_values()) {
            Check::Ready(valid) => valid,
            Check::Pending(_) => {
                warn!(
                    rule = %self.rule_name,
                    "asynchronous rule used in a synchronous rule list"
                );
                false
            }
        };
        if !valid {
            debug!(rule = %self.rule_name, "binding failed");
        }
        valid
    }

    /// Asynchronous evaluation.
    ///
    /// The rule is invoked immediately; the returned future settles with
    /// this binding as the failure, whatever the rule's own reason was. A
    /// binding that does not apply settles successfully.
    pub fn async_is_value_valid(
        self: &Arc<Self>,
        value: &Value,
        runtime: &dyn AsyncRuntime,
    ) -> BoxFuture<'static, Outcome> {
        if !self.should_be_applied() {
            trace!(rule = %self.rule_name, "binding skipped by its apply condition");
            return runtime.settled(Ok(()));
        }
        let Some(rule) = &self.rule else {
            error!(rule = %self.rule_name, "evaluating a rule that is not registered");
            return runtime.settled(Err(self.rejection()));
        };

        let check = rule.is_value_valid(value, &self.parameters_values());
        let binding = Arc::clone(self);
        async move {
            if check.into_future().await {
                Ok(())
            } else {
                debug!(rule = %binding.rule_name, "binding failed");
                Err(binding.rejection())
            }
        }
        .boxed()
    }

    /// Human-facing message for a failure of this binding.
    pub fn error_message(&self) -> String {
        match &self.rule {
            Some(rule) => rule.error_message(&self.parameters_values()),
            None => format!("Unknown validation rule \"{}\".", self.rule_name),
        }
    }

    fn rejection(self: &Arc<Self>) -> Rejection {
        Rejection::Invalid(Failure::new(Arc::clone(self)))
    }
}

// ============================================================================
// DESCRIPTORS
// ============================================================================

/// A rule descriptor with explicit parameters and apply condition.
#[derive(Debug, Clone)]
pub struct RuleSpec {
    /// Rule by name or instance.
    pub rule: RawRule,
    /// Parameters handed to the rule.
    pub parameters: Parameters,
    /// Apply condition; unset means always applied.
    pub only_if: Option<Deferred<bool>>,
}

impl RuleSpec {
    /// Descriptor for a rule without parameters or condition.
    pub fn new(rule: impl Into<RawRule>) -> Self {
        Self {
            rule: rule.into(),
            parameters: Parameters::None,
            only_if: None,
        }
    }

    /// Sets the parameters.
    #[must_use = "builder methods must be chained or built"]
    pub fn parameters(mut self, parameters: impl Into<Parameters>) -> Self {
        self.parameters = parameters.into();
        self
    }

    /// Sets the apply condition.
    #[must_use = "builder methods must be chained or built"]
    pub fn only_if(mut self, condition: impl Into<Deferred<bool>>) -> Self {
        self.only_if = Some(condition.into());
        self
    }
}

/// Anything accepted in a rule list.
///
/// In JSON, a descriptor is either a rule name or
/// `{ "rule": name, "parameters"?: any, "onlyIf"?: bool }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "DescriptorRepr")]
pub enum RuleDescriptor {
    /// Registered rule name.
    Name(String),
    /// Rule instance.
    Rule(RuleRef),
    /// Prebuilt binding, used as-is.
    Binding(Arc<RuleBinding>),
    /// Rule with parameters and condition.
    Spec(RuleSpec),
}

impl RuleDescriptor {
    /// Normalizes the descriptor into a binding.
    ///
    /// A [`RuleDescriptor::Binding`] is returned as the same `Arc`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidRule`] for an empty rule name.
    pub fn to_binding(&self, registry: &RuleRegistry) -> Result<Arc<RuleBinding>, RuleError> {
        let binding = match self {
            Self::Binding(binding) => return Ok(Arc::clone(binding)),
            Self::Name(name) => RuleBinding::new(name.as_str(), None, None, registry)?,
            Self::Rule(rule) => RuleBinding::new(Arc::clone(rule), None, None, registry)?,
            Self::Spec(spec) => RuleBinding::new(
                spec.rule.clone(),
                Some(spec.parameters.clone()),
                spec.only_if.clone(),
                registry,
            )?,
        };
        Ok(Arc::new(binding))
    }
}

impl From<&str> for RuleDescriptor {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for RuleDescriptor {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<RuleRef> for RuleDescriptor {
    fn from(rule: RuleRef) -> Self {
        Self::Rule(rule)
    }
}

impl From<RuleBinding> for RuleDescriptor {
    fn from(binding: RuleBinding) -> Self {
        Self::Binding(Arc::new(binding))
    }
}

impl From<Arc<RuleBinding>> for RuleDescriptor {
    fn from(binding: Arc<RuleBinding>) -> Self {
        Self::Binding(binding)
    }
}

impl From<RuleSpec> for RuleDescriptor {
    fn from(spec: RuleSpec) -> Self {
        Self::Spec(spec)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptorRepr {
    Name(String),
    Spec {
        rule: String,
        #[serde(default)]
        parameters: Option<serde_json::Value>,
        #[serde(default, rename = "onlyIf")]
        only_if: Option<bool>,
    },
}

impl From<DescriptorRepr> for RuleDescriptor {
    fn from(repr: DescriptorRepr) -> Self {
        match repr {
            DescriptorRepr::Name(name) => Self::Name(name),
            DescriptorRepr::Spec {
                rule,
                parameters,
                only_if,
            } => Self::Spec(RuleSpec {
                rule: RawRule::Name(rule),
                parameters: parameters.map(Parameters::from).unwrap_or_default(),
                only_if: only_if.map(Deferred::Ready),
            }),
        }
    }
}
