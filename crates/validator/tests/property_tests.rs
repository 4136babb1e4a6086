//! Property-based tests for data-validation.

use std::sync::Arc;

use data_validation::prelude::*;
use proptest::prelude::*;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(Value::Undefined),
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        ".{0,8}".prop_map(Value::from),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(2, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..4)
                .prop_map(|fields| Value::from(fields.into_iter().collect::<Object>())),
        ]
    })
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(object) => !object.is_empty(),
        other => !other.coerce_to_string().is_empty(),
    }
}

// ============================================================================
// REQUIRED: invalid iff null, empty container, or empty string coercion
// ============================================================================

proptest! {
    #[test]
    fn required_characterisation(v in value()) {
        let registry = RuleRegistry::new();
        let binding = RuleBinding::new(names::REQUIRED, None, None, &registry).unwrap();
        prop_assert_eq!(binding.is_value_valid(&v), is_present(&v));
    }

    #[test]
    fn required_accepts_every_number(n in any::<i64>()) {
        let binding = RuleBinding::new(names::REQUIRED, None, None, &RuleRegistry::new()).unwrap();
        prop_assert!(binding.is_value_valid(&Value::from(n)));
    }
}

// ============================================================================
// IDEMPOTENCY
// ============================================================================

proptest! {
    #[test]
    fn parameter_resolution_is_idempotent(
        reference in any::<i32>(),
        or_equal in any::<bool>(),
        tag in "[a-z]{0,6}",
    ) {
        let binding = RuleBinding::new(
            names::GREATER_THAN,
            Some(Parameters::map([
                ("reference", Deferred::lazy(move || Value::from(reference))),
                ("orEqual", Deferred::from(or_equal)),
                ("tag", Deferred::from(tag)),
            ])),
            None,
            &RuleRegistry::new(),
        )
        .unwrap();

        prop_assert_eq!(binding.parameters_values(), binding.parameters_values());
    }

    #[test]
    fn validate_value_is_idempotent(v in value()) {
        let validator = Validator::with_registry(RuleRegistry::new());
        let rules: Vec<RuleDescriptor> = vec![names::REQUIRED.into(), names::LENGTH.into()];

        let rule_name = |b: Arc<RuleBinding>| b.rule_name().to_owned();
        let first = validator.validate_value(&v, &rules).unwrap().map(rule_name);
        let second = validator.validate_value(&v, &rules).unwrap().map(rule_name);
        prop_assert_eq!(first, second);
    }
}

// ============================================================================
// BINDINGS
// ============================================================================

proptest! {
    #[test]
    fn bindings_without_condition_always_apply(v in value()) {
        let registry = RuleRegistry::new();
        let binding =
            RuleBinding::new(names::EQUALS, Some(Parameters::scalar(v)), None, &registry).unwrap();
        prop_assert!(binding.should_be_applied());
    }

    #[test]
    fn false_conditions_make_every_value_valid(v in value()) {
        let binding = RuleBinding::new(
            names::REQUIRED,
            None,
            Some(Deferred::lazy(|| false)),
            &RuleRegistry::new(),
        )
        .unwrap();
        prop_assert!(binding.is_value_valid(&v));
    }

    #[test]
    fn null_passes_any_list_without_required(reference in any::<i32>()) {
        let validator = Validator::with_registry(RuleRegistry::new());
        let rules: Vec<RuleDescriptor> = vec![
            RuleSpec::new(names::EQUALS).parameters(Value::from(reference)).into(),
            RuleSpec::new(names::GREATER_THAN).parameters(Value::from(reference)).into(),
        ];
        prop_assert!(validator.validate_value(&Value::Null, &rules).unwrap().is_none());
    }
}
