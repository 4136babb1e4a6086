//! Registry lifecycle as seen by validators.

use std::sync::Arc;

use data_validation::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn even() -> RuleRef {
    rule_fn(
        "even",
        |value, _| Check::from(value.to_number() % 2.0 == 0.0),
        |_| "The value must be even.".to_owned(),
    )
}

#[test]
fn custom_rules_are_usable_by_name() {
    let registry = RuleRegistry::new();
    registry.add_rule("even", even()).unwrap();
    let validator = Validator::with_registry(registry);

    let failed = validator
        .validate_value(&Value::from(3), &["even".into()])
        .unwrap()
        .unwrap();
    assert_eq!(failed.error_message(), "The value must be even.");
    assert!(validator.validate_value(&Value::from(4), &["even".into()]).unwrap().is_none());
}

#[test]
fn reset_drops_custom_rules_and_keeps_builtins() {
    let registry = RuleRegistry::new();
    registry.add_rule("even", even()).unwrap();
    registry.reset();

    assert!(registry.get_rule("even").is_none());
    assert!(registry.get_rule(names::REQUIRED).is_some());
    assert!(registry.get_rule(names::DEFINED_AND_NOT_NAN).is_some());
}

#[test]
fn add_rule_with_existing_name_fails() {
    let registry = RuleRegistry::new();
    let err = registry.add_rule(names::EQUALS, even()).unwrap_err();
    assert_eq!(err, RuleError::DuplicateRule { name: names::EQUALS.to_owned() });
    assert_eq!(err.to_string(), "rule `equals` already exists");
}

#[test]
fn set_rule_replaces_for_later_bindings_only() {
    let registry = RuleRegistry::new();
    let validator = Validator::with_registry(registry.clone());
    let before =
        RuleBinding::new(names::EQUALS, Some(Parameters::scalar(1)), None, &registry).unwrap();

    let replacement = even();
    registry.set_rule(names::EQUALS, Arc::clone(&replacement));

    assert!(same_rule(&registry.get_rule(names::EQUALS).unwrap(), &replacement));
    assert!(before.is_value_valid(&Value::from(1)));
    assert!(
        validator
            .validate_value(&Value::from(1), &[names::EQUALS.into()])
            .unwrap()
            .is_some()
    );
}

#[test]
fn replacing_required_changes_null_bypass() {
    let registry = RuleRegistry::new();
    let validator = Validator::with_registry(registry.clone());
    let old_required = RuleBinding::new(names::REQUIRED, None, None, &registry).unwrap();

    registry.set_rule(
        names::REQUIRED,
        rule_fn(
            names::REQUIRED,
            |v, _| Check::from(!v.is_null()),
            |_| "Localised.".to_owned(),
        ),
    );

    let failed = validator
        .validate_value(&Value::Null, &[names::REQUIRED.into()])
        .unwrap()
        .unwrap();
    assert_eq!(failed.error_message(), "Localised.");

    // A binding built before the swap no longer counts as `required`.
    assert!(validator
        .validate_value(&Value::Null, &[old_required.into()])
        .unwrap()
        .is_none());
}

#[rstest]
#[case(names::DEFINED_AND_NOT_NAN)]
#[case(names::REQUIRED)]
#[case(names::EQUALS)]
#[case(names::IS)]
#[case(names::GREATER_THAN)]
#[case(names::LOWER_THAN)]
#[case(names::RANGE)]
#[case(names::LENGTH)]
#[case(names::PATTERN)]
fn global_registry_has_builtins(#[case] name: &str) {
    assert!(RuleRegistry::global().contains(name));
}

#[test]
fn default_validator_uses_the_global_registry() {
    RuleRegistry::global().set_rule(
        "globallyRegisteredOdd",
        rule_fn(
            "odd",
            |value, _| Check::from(value.to_number() % 2.0 != 0.0),
            |_| "The value must be odd.".to_owned(),
        ),
    );

    let validator = Validator::new();
    assert!(validator
        .validate_value(&Value::from(2), &["globallyRegisteredOdd".into()])
        .unwrap()
        .is_some());
}

#[test]
fn unknown_names_fail_instead_of_panicking() {
    let validator = Validator::with_registry(RuleRegistry::new());
    assert!(!validator.registry().contains("notARule"));

    let failed = validator
        .validate_value(&Value::from(1), &["notARule".into()])
        .unwrap()
        .unwrap();
    assert!(failed.rule().is_none());
    assert_eq!(failed.rule_name(), "notARule");
}
