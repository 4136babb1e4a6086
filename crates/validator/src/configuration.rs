//! Per-node validation configuration
//!
//! A [`ValidationConfiguration`] says which properties of one object (or
//! array) are validated and how:
//!
//! - `rules`: property → synchronous rule descriptors, evaluated in order
//!   and fail-fast.
//! - `asyncRules`: property → asynchronous rule descriptors, all started
//!   together.
//! - `groups`: group name → property names, restricting
//!   [`Validator::is_group_valid`](crate::Validator::is_group_valid).
//!
//! It is either passed explicitly to a validation call or attached to the
//! object itself (see [`Object::with_configuration`](crate::value::Object::with_configuration)
//! and [`Value::from_json`](crate::value::Value::from_json)); an explicit
//! configuration wins.
//!
//! # JSON form
//!
//! ```json
//! {
//!   "rules": {
//!     "email": ["required", { "rule": "pattern", "parameters": "^[^@]+@[^@]+$" }],
//!     "age": [{ "rule": "greaterThan", "parameters": { "reference": 17 } }]
//!   },
//!   "asyncRules": { "email": ["uniqueEmail"] },
//!   "groups": { "contact": ["email"] }
//! }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;

use crate::binding::RuleDescriptor;
use crate::error::ConfigError;

/// Validation obligations of one object graph node.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidationConfiguration {
    rules: IndexMap<String, Vec<RuleDescriptor>>,
    async_rules: IndexMap<String, Vec<RuleDescriptor>>,
    groups: IndexMap<String, Vec<String>>,
}

impl ValidationConfiguration {
    /// Empty configuration: nothing is validated at this node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the JSON form.
    pub fn from_json(json: serde_json::Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(json)?)
    }

    /// Sets the synchronous rules of a property.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_rules<I, D>(mut self, property: impl Into<String>, rules: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<RuleDescriptor>,
    {
        self.rules
            .insert(property.into(), rules.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the asynchronous rules of a property.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_async_rules<I, D>(mut self, property: impl Into<String>, rules: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<RuleDescriptor>,
    {
        self.async_rules
            .insert(property.into(), rules.into_iter().map(Into::into).collect());
        self
    }

    /// Declares a group of properties.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_group<I, S>(mut self, name: impl Into<String>, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups
            .insert(name.into(), properties.into_iter().map(Into::into).collect());
        self
    }

    /// Synchronous rules of a property; empty when none are configured.
    pub fn rules(&self, property: &str) -> &[RuleDescriptor] {
        self.rules.get(property).map_or(&[], Vec::as_slice)
    }

    /// Asynchronous rules of a property; empty when none are configured.
    pub fn async_rules(&self, property: &str) -> &[RuleDescriptor] {
        self.async_rules.get(property).map_or(&[], Vec::as_slice)
    }

    /// Properties listed in a group, if the group is declared here.
    pub fn group(&self, name: &str) -> Option<&[String]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    /// Returns `true` when the property has rules of either kind.
    pub fn has_rules(&self, property: &str) -> bool {
        self.rules.contains_key(property) || self.async_rules.contains_key(property)
    }

    /// Properties with a validation obligation: `rules` keys first, then
    /// `asyncRules`-only keys, without duplicates.
    pub fn validated_properties(&self) -> Vec<&str> {
        let mut properties: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        properties.extend(
            self.async_rules
                .keys()
                .map(String::as_str)
                .filter(|property| !self.rules.contains_key(*property)),
        );
        properties
    }

    /// Properties validated for a group at this node.
    ///
    /// Listed properties without rules are skipped. An undeclared group
    /// yields nothing.
    pub fn group_properties(&self, name: &str) -> Vec<&str> {
        let Some(listed) = self.group(name) else {
            return Vec::new();
        };
        let mut properties: Vec<&str> = Vec::with_capacity(listed.len());
        for property in listed.iter().map(String::as_str) {
            if self.has_rules(property) && !properties.contains(&property) {
                properties.push(property);
            }
        }
        properties
    }

    /// Returns `true` when no rules and no groups are configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.async_rules.is_empty() && self.groups.is_empty()
    }
}
