//! Validator-level options

use serde::{Deserialize, Serialize};

use crate::rules::names;

/// Object member holding an embedded validation configuration.
pub const DEFAULT_CONFIGURATION_KEY: &str = "validationConfiguration";

/// Options shared by every validation a [`Validator`](crate::Validator) runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorOptions {
    /// Member name read as an embedded configuration when converting JSON
    /// documents (e.g. `"validationConfiguration"`).
    pub configuration_key: String,

    /// Registry name of the gate rule run first for every synchronous list.
    pub gate_rule: String,

    /// Registry name of the rule that disables null bypass.
    pub required_rule: String,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            configuration_key: DEFAULT_CONFIGURATION_KEY.to_owned(),
            gate_rule: names::DEFINED_AND_NOT_NAN.to_owned(),
            required_rule: names::REQUIRED.to_owned(),
        }
    }
}

impl ValidatorOptions {
    /// Sets the embedded configuration member name.
    #[must_use = "builder methods must be chained or built"]
    pub fn configuration_key(mut self, key: impl Into<String>) -> Self {
        self.configuration_key = key.into();
        self
    }

    /// Sets the gate rule name.
    #[must_use = "builder methods must be chained or built"]
    pub fn gate_rule(mut self, name: impl Into<String>) -> Self {
        self.gate_rule = name.into();
        self
    }

    /// Sets the required rule name.
    #[must_use = "builder methods must be chained or built"]
    pub fn required_rule(mut self, name: impl Into<String>) -> Self {
        self.required_rule = name.into();
        self
    }
}
