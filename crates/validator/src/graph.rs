//! Object graph traversal.
//!
//! Each node contributes one evaluation per validated property, and one
//! traversal per child object or array. Array elements are children like
//! object fields, addressed as `[index]` in failure paths.

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use crate::configuration::ValidationConfiguration;
use crate::error::{Outcome, Rejection, ValidationError, ValidationErrors, join_path};
use crate::validator::Validator;
use crate::value::{Object, Value};

/// Which configured properties a traversal validates.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scope<'a> {
    /// Every property with rules.
    All,
    /// Only the properties of a named group.
    Group(&'a str),
}

impl Scope<'_> {
    fn properties<'c>(&self, configuration: &'c ValidationConfiguration) -> Vec<&'c str> {
        match self {
            Self::All => configuration.validated_properties(),
            Self::Group(group) => configuration.group_properties(group),
        }
    }
}

impl Validator {
    /// Starts every evaluation of the subtree rooted at `node`.
    pub(crate) fn graph_evaluations(
        &self,
        node: &Value,
        configuration: Option<&ValidationConfiguration>,
        scope: Scope<'_>,
    ) -> Vec<BoxFuture<'static, Outcome>> {
        let mut evaluations = Vec::new();
        self.visit(node, configuration, scope, "", &mut evaluations);
        evaluations
    }

    fn visit(
        &self,
        node: &Value,
        explicit: Option<&ValidationConfiguration>,
        scope: Scope<'_>,
        path: &str,
        evaluations: &mut Vec<BoxFuture<'static, Outcome>>,
    ) {
        let configuration = explicit.or_else(|| node.as_object().and_then(Object::configuration));

        if let Some(configuration) = configuration {
            for property in scope.properties(configuration) {
                let property_path = join_path(path, &segment(node, property));
                let outcome = self.is_value_valid(
                    node.get(property),
                    configuration.rules(property),
                    configuration.async_rules(property),
                );
                evaluations.push(
                    outcome
                        .map(move |outcome| {
                            outcome.map_err(|rejection| rejection.nest(&property_path))
                        })
                        .boxed(),
                );
            }
        }

        for (property, child) in self.children(node) {
            let child_path = join_path(path, &segment(node, &property));
            self.visit(child, None, scope, &child_path, evaluations);
        }
    }

    /// Object and array children of a node, without the configuration member.
    fn children<'v>(&self, node: &'v Value) -> Vec<(String, &'v Value)> {
        match node {
            Value::Object(object) => object
                .iter()
                .filter(|(name, child)| {
                    *name != self.options().configuration_key && child.is_container()
                })
                .map(|(name, child)| (name.to_owned(), child))
                .collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .filter(|(_, child)| child.is_container())
                .map(|(index, child)| (index.to_string(), child))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Settles every evaluation and reports each failure.
    pub(crate) fn collect_errors(
        &self,
        evaluations: Vec<BoxFuture<'static, Outcome>>,
    ) -> BoxFuture<'static, ValidationErrors> {
        future::join_all(evaluations)
            .map(|outcomes| {
                outcomes
                    .into_iter()
                    .filter_map(Result::err)
                    .map(|rejection| match rejection {
                        Rejection::Invalid(failure) => failure.to_validation_error(),
                        Rejection::Rule(error) => {
                            ValidationError::new("invalidRule", error.to_string())
                        }
                    })
                    .collect()
            })
            .boxed()
    }
}

fn segment(node: &Value, property: &str) -> String {
    if matches!(node, Value::Array(_)) {
        format!("[{property}]")
    } else {
        property.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RuleRegistry;
    use crate::rules::names;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn failure_paths_follow_the_graph() {
        let validator = Validator::with_registry(RuleRegistry::new());
        let node = Value::from_json(json!({
            "items": [
                { "name": "ok", "validationConfiguration": { "rules": { "name": ["required"] } } },
                { "name": "", "validationConfiguration": { "rules": { "name": ["required"] } } }
            ]
        }))
        .unwrap();

        let rejection = validator.is_object_valid(&node, None).await.unwrap_err();
        assert_eq!(rejection.failure().unwrap().path(), "items[1].name");
    }

    #[tokio::test]
    async fn explicit_configuration_on_an_array_uses_index_paths() {
        let validator = Validator::with_registry(RuleRegistry::new());
        let configuration = ValidationConfiguration::new().with_rules("1", [names::REQUIRED]);
        let node = Value::from(vec![Value::from("a"), Value::from("")]);

        let rejection = validator.is_object_valid(&node, Some(&configuration)).await.unwrap_err();
        assert_eq!(rejection.failure().unwrap().path(), "[1]");
    }

    #[test]
    fn configuration_members_kept_as_data_are_not_children() {
        let validator = Validator::with_registry(RuleRegistry::new());
        let node = Value::from(json!({
            "validationConfiguration": { "rules": {} },
            "child": {},
            "list": [],
            "scalar": 1,
            "nothing": null
        }));

        let names: Vec<String> =
            validator.children(&node).into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["child", "list"]);
    }
}
