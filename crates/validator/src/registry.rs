//! Named rule registry
//!
//! Bare rule names in descriptors (`"required"`, `"greaterThan"`, ...) are
//! looked up here when a [`RuleBinding`](crate::binding::RuleBinding) is
//! built. A registry is seeded with the [built-in rules](crate::rules) on
//! first access, and again on the first access after [`RuleRegistry::reset`].
//!
//! [`RuleRegistry`] is a handle: clones share the same table. Use
//! [`RuleRegistry::global`] for the process-wide table and
//! [`RuleRegistry::new`] for an isolated one (tests, tenants).
//!
//! # Examples
//!
//! ```rust,ignore
//! use data_validation::prelude::*;
//!
//! let registry = RuleRegistry::new();
//! registry.add_rule("even", rule_fn(
//!     "even",
//!     |value, _| Check::from(value.to_number() % 2.0 == 0.0),
//!     |_| "The value must be even.".to_owned(),
//! ))?;
//!
//! assert!(registry.contains("even"));
//! assert!(registry.add_rule("even", Arc::new(Required)).is_err());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::RuleError;
use crate::rule::RuleRef;
use crate::rules;

type RuleTable = HashMap<String, RuleRef>;

static GLOBAL: LazyLock<RuleRegistry> = LazyLock::new(RuleRegistry::new);

/// Shared handle to a table of named rules.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    /// `None` until first access, and again after a reset.
    rules: Arc<RwLock<Option<RuleTable>>>,
}

impl RuleRegistry {
    /// Creates an isolated registry, seeded lazily with the built-ins.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static RuleRegistry {
        &GLOBAL
    }

    /// Looks up a rule by name.
    pub fn get_rule(&self, name: &str) -> Option<RuleRef> {
        self.read(|rules| rules.get(name).cloned())
    }

    /// Returns `true` when a rule is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.read(|rules| rules.contains_key(name))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names = self.read(|rules| rules.keys().cloned().collect::<Vec<_>>());
        names.sort_unstable();
        names
    }

    /// Registers a rule under a new name.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::DuplicateRule`] when the name is taken; use
    /// [`RuleRegistry::set_rule`] to replace a rule.
    pub fn add_rule(&self, name: impl Into<String>, rule: RuleRef) -> Result<(), RuleError> {
        let name = name.into();
        self.write(|rules| {
            if rules.contains_key(&name) {
                return Err(RuleError::DuplicateRule { name: name.clone() });
            }
            info!(rule = %name, "registered rule");
            rules.insert(name, rule);
            Ok(())
        })
    }

    /// Registers a rule, replacing any rule with the same name.
    pub fn set_rule(&self, name: impl Into<String>, rule: RuleRef) {
        let name = name.into();
        self.write(|rules| {
            let replaced = rules.insert(name.clone(), rule).is_some();
            info!(rule = %name, replaced, "set rule");
        });
    }

    /// Drops every registration. The next access re-seeds the built-ins.
    ///
    /// Bindings built before the reset keep the rule they resolved.
    pub fn reset(&self) {
        *self.rules.write() = None;
        info!("rule registry reset");
    }

    fn read<R>(&self, f: impl FnOnce(&RuleTable) -> R) -> R {
        {
            let guard = self.rules.read();
            if let Some(rules) = guard.as_ref() {
                return f(rules);
            }
        }
        let mut guard = self.rules.write();
        f(guard.get_or_insert_with(seed))
    }

    fn write<R>(&self, f: impl FnOnce(&mut RuleTable) -> R) -> R {
        let mut guard = self.rules.write();
        f(guard.get_or_insert_with(seed))
    }
}

fn seed() -> RuleTable {
    let table: RuleTable = rules::builtin()
        .into_iter()
        .map(|(name, rule)| (name.to_owned(), rule))
        .collect();
    debug!(rules = table.len(), "seeded rule registry with built-in rules");
    table
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rules.read().as_ref() {
            Some(rules) => f
                .debug_struct("RuleRegistry")
                .field("rules", &rules.len())
                .finish(),
            None => f.debug_struct("RuleRegistry").field("rules", &"unseeded").finish(),
        }
    }
}
