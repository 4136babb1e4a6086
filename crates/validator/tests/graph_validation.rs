//! Object graph and group validation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use data_validation::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

/// A rule answering `valid` and counting its invocations.
struct Spy {
    rule: RuleRef,
    calls: Arc<AtomicUsize>,
}

impl Spy {
    fn new(name: &str, valid: bool) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let rule = rule_fn(
            name,
            move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Check::from(valid)
            },
            |_| "spy failed".to_owned(),
        );
        Self { rule, calls }
    }

    fn descriptor(&self) -> RuleDescriptor {
        RuleDescriptor::from(Arc::clone(&self.rule))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn validator() -> Validator {
    Validator::with_registry(RuleRegistry::new())
}

fn nested(rule: &Spy) -> Value {
    Value::from(
        Object::new().with("a", "").with(
            "b",
            Object::new().with("c", "").with_configuration(
                ValidationConfiguration::new().with_rules("c", [rule.descriptor()]),
            ),
        ),
    )
}

#[tokio::test]
async fn nested_configuration_fails_the_whole_graph() {
    let failing = Spy::new("failing", false);
    let rejection = validator().is_object_valid(&nested(&failing), None).await.unwrap_err();

    assert_eq!(rejection.failure().unwrap().path(), "b.c");
    assert_eq!(failing.calls(), 1);
}

#[tokio::test]
async fn nested_configuration_passes_when_rules_pass() {
    let passing = Spy::new("passing", true);
    assert!(validator().is_object_valid(&nested(&passing), None).await.is_ok());
    assert_eq!(passing.calls(), 1);
}

#[tokio::test]
async fn explicit_configuration_wins_over_the_attached_one() {
    let attached = Spy::new("attached", false);
    let explicit = Spy::new("explicit", true);
    let node = Value::from(
        Object::new().with("x", 1).with_configuration(
            ValidationConfiguration::new().with_rules("x", [attached.descriptor()]),
        ),
    );
    let configuration = ValidationConfiguration::new().with_rules("x", [explicit.descriptor()]);

    assert!(validator().is_object_valid(&node, Some(&configuration)).await.is_ok());
    assert_eq!(attached.calls(), 0);
    assert_eq!(explicit.calls(), 1);
}

#[tokio::test]
async fn explicit_configuration_does_not_reach_children() {
    let child_rule = Spy::new("child", false);
    let node = Value::from(Object::new().with("child", Object::new().with("x", 1)));
    let configuration = ValidationConfiguration::new().with_rules("x", [child_rule.descriptor()]);

    assert!(validator().is_object_valid(&node, Some(&configuration)).await.is_ok());
    assert_eq!(child_rule.calls(), 0);
}

#[tokio::test]
async fn sibling_properties_are_all_attempted() {
    let first = Spy::new("first", false);
    let second = Spy::new("second", false);
    let node = Value::from(Object::new().with("a", 1).with("b", 2));
    let configuration = ValidationConfiguration::new()
        .with_rules("a", [first.descriptor()])
        .with_rules("b", [second.descriptor()]);

    assert!(validator().is_object_valid(&node, Some(&configuration)).await.is_err());
    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 1);
}

#[tokio::test]
async fn async_rules_are_validated_on_objects() {
    let remote = rule_fn(
        "unique",
        |value, _| {
            let taken = value.as_str() == Some("taken");
            Check::pending(async move { !taken })
        },
        |_| "Already taken.".to_owned(),
    );
    let configuration = ValidationConfiguration::new()
        .with_rules("login", [names::REQUIRED])
        .with_async_rules("login", [remote]);

    let validator = validator();
    let free = Value::from(Object::new().with("login", "free"));
    let taken = Value::from(Object::new().with("login", "taken"));

    assert!(validator.is_object_valid(&free, Some(&configuration)).await.is_ok());
    let rejection = validator.is_object_valid(&taken, Some(&configuration)).await.unwrap_err();
    assert_eq!(rejection.failure().unwrap().message(), "Already taken.");
    assert_eq!(rejection.failure().unwrap().path(), "login");
}

#[tokio::test]
async fn scalars_and_unconfigured_nodes_are_valid() {
    let validator = validator();
    assert!(validator.is_object_valid(&Value::from(3), None).await.is_ok());
    assert!(validator
        .is_object_valid(&Value::from(Object::new().with("a", Value::Null)), None)
        .await
        .is_ok());
}

// ============================================================================
// GROUPS
// ============================================================================

#[tokio::test]
async fn groups_restrict_validated_properties() {
    let x = Spy::new("x", false);
    let y = Spy::new("y", false);
    let node = Value::from(Object::new().with("x", 1).with("y", 2));
    let configuration = ValidationConfiguration::new()
        .with_rules("x", [x.descriptor()])
        .with_rules("y", [y.descriptor()])
        .with_group("g1", ["x"]);

    let validator = validator();
    assert!(validator.is_group_valid(&node, "g1", Some(&configuration)).await.is_err());
    assert_eq!(x.calls(), 1);
    assert_eq!(y.calls(), 0);

    assert!(validator.is_group_valid(&node, "g2", Some(&configuration)).await.is_ok());
    assert_eq!(y.calls(), 0);
}

#[tokio::test]
async fn groups_without_rules_validate_nothing() {
    let node = Value::from(Object::new().with("value1", "").with("value2", ""));
    let configuration = ValidationConfiguration::new().with_group("group1", ["value1", "value2"]);

    assert!(validator().is_group_valid(&node, "group1", Some(&configuration)).await.is_ok());
    assert!(validator()
        .is_group_valid(&node, "missing", Some(&ValidationConfiguration::new()))
        .await
        .is_ok());
}

#[tokio::test]
async fn groups_are_searched_recursively() {
    let outer = Spy::new("outer", true);
    let inner = Spy::new("inner", false);
    let node = Value::from(
        Object::new()
            .with("value1", "")
            .with(
                "valueObject",
                Object::new().with("value2", "").with_configuration(
                    ValidationConfiguration::new()
                        .with_rules("value2", [inner.descriptor()])
                        .with_group("group2", ["value2"]),
                ),
            )
            .with_configuration(
                ValidationConfiguration::new().with_rules("value1", [outer.descriptor()]),
            ),
    );

    let rejection = validator().is_group_valid(&node, "group2", None).await.unwrap_err();
    assert_eq!(rejection.failure().unwrap().path(), "valueObject.value2");
    assert_eq!(outer.calls(), 0);
    assert_eq!(inner.calls(), 1);
}

#[tokio::test]
async fn groups_are_validated_at_every_depth() {
    let outer = Spy::new("outer", false);
    let inner = Spy::new("inner", false);
    let node = Value::from(
        Object::new()
            .with("value1", "")
            .with(
                "valueObject",
                Object::new().with("value2", "").with_configuration(
                    ValidationConfiguration::new()
                        .with_rules("value2", [inner.descriptor()])
                        .with_group("group1", ["value2"]),
                ),
            )
            .with_configuration(
                ValidationConfiguration::new()
                    .with_rules("value1", [outer.descriptor()])
                    .with_group("group1", ["value1"]),
            ),
    );

    assert!(validator().is_group_valid(&node, "group1", None).await.is_err());
    assert_eq!(outer.calls(), 1);
    assert_eq!(inner.calls(), 1);
}

// ============================================================================
// ERROR MAPS
// ============================================================================

#[tokio::test]
async fn object_errors_report_every_failing_property() {
    let node = Value::from_json(json!({
        "name": "",
        "age": 12,
        "email": "someone@example.com",
        "validationConfiguration": {
            "rules": {
                "name": ["required"],
                "age": [{ "rule": "greaterThan", "parameters": { "reference": 17 } }],
                "email": ["required"]
            }
        },
        "address": {
            "zipcode": "123",
            "validationConfiguration": {
                "rules": { "zipcode": [{ "rule": "length", "parameters": { "equals": 5 } }] }
            }
        }
    }))
    .unwrap();

    let errors = validator().object_errors(&node, None).await;

    assert_eq!(errors.len(), 3);
    assert_eq!(errors.field("name").unwrap().code, "required");
    let age = errors.field("age").unwrap();
    assert_eq!(age.message, "The value must be greater than 17.");
    assert_eq!(age.param("reference"), Some("17"));
    assert_eq!(
        errors.field("address.zipcode").unwrap().message,
        "The value length must be 5."
    );
    assert!(errors.field("email").is_none());
}

#[tokio::test]
async fn group_errors_follow_group_scoping() {
    let node = Value::from(Object::new().with("x", "").with("y", ""));
    let configuration = ValidationConfiguration::new()
        .with_rules("x", [names::REQUIRED])
        .with_rules("y", [names::REQUIRED])
        .with_group("g", ["y"]);

    let errors = validator().group_errors(&node, "g", Some(&configuration)).await;
    assert_eq!(errors.len(), 1);
    assert!(errors.field("y").is_some());
}

#[tokio::test]
async fn valid_graphs_have_no_errors() {
    let errors = validator()
        .object_errors(&Value::from(Object::new().with("a", 1)), None)
        .await;
    assert!(errors.is_empty());
    assert!(errors.into_result(()).is_ok());
}

// ============================================================================
// RUNTIME STRATEGIES
// ============================================================================

#[tokio::test]
async fn fail_fast_runtime_reports_the_same_verdicts() {
    let validator = validator().with_runtime(FailFast);
    let failing = Spy::new("failing", false);
    let passing = Spy::new("passing", true);

    assert!(validator.is_object_valid(&nested(&failing), None).await.is_err());
    assert!(validator.is_object_valid(&nested(&passing), None).await.is_ok());
}

/// An asynchronous rule that never settles.
fn stuck() -> RuleRef {
    rule_fn(
        "stuck",
        |_, _| Check::pending(futures::future::pending()),
        |_| String::new(),
    )
}

#[tokio::test]
async fn known_failures_settle_graphs_with_stuck_async_rules() {
    let configuration = ValidationConfiguration::new()
        .with_rules("name", [names::REQUIRED])
        .with_async_rules("login", [stuck()]);
    let node = Value::from(Object::new().with("name", "").with("login", "alice"));

    let validator = validator();
    let outcome = tokio::time::timeout(
        Duration::from_millis(500),
        validator.is_object_valid(&node, Some(&configuration)),
    )
    .await
    .expect("a known failure settles the graph");
    assert_eq!(outcome.unwrap_err().failure().unwrap().path(), "name");

    let grouped = ValidationConfiguration::new()
        .with_rules("name", [names::REQUIRED])
        .with_async_rules("name", [stuck()])
        .with_group("profile", ["name"]);
    let outcome = tokio::time::timeout(
        Duration::from_millis(500),
        validator.is_group_valid(&node, "profile", Some(&grouped)),
    )
    .await
    .expect("a known failure settles the group");
    assert!(outcome.is_err());
}
