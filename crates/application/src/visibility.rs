//! Conditional visibility evaluation for custom fields.

use ekklesia_domain::{
    ConditionalAction, ConditionalOperator, ConditionalRule, CustomField, LogicType,
};
use serde_json::Value;
use tracing::debug;

use crate::value_coercion::{FormValues, coerce_to_number, coerce_to_string, is_blank};

/// Returns whether `field` should render given the live form values.
///
/// Fields without enabled logic, or with no rules, are always visible. A rule
/// referencing a field missing from `all_fields` never holds.
#[must_use]
pub fn evaluate(
    field: &CustomField,
    live_values: &FormValues,
    all_fields: &[CustomField],
) -> bool {
    let Some(logic) = field.conditional_logic() else {
        return true;
    };
    if !logic.is_active() {
        return true;
    }

    let mut results = logic
        .rules
        .iter()
        .map(|rule| rule_holds(field, rule, live_values, all_fields));
    let combined = match logic.logic_type {
        LogicType::All => results.all(|holds| holds),
        LogicType::Any => results.any(|holds| holds),
    };

    match logic.action {
        ConditionalAction::Show => combined,
        ConditionalAction::Hide => !combined,
    }
}

/// Returns the fields that should render, preserving input order.
#[must_use]
pub fn visible_fields<'a>(
    fields: &'a [CustomField],
    live_values: &FormValues,
) -> Vec<&'a CustomField> {
    fields
        .iter()
        .filter(|field| evaluate(field, live_values, fields))
        .collect()
}

fn rule_holds(
    owner: &CustomField,
    rule: &ConditionalRule,
    live_values: &FormValues,
    all_fields: &[CustomField],
) -> bool {
    if !all_fields
        .iter()
        .any(|candidate| candidate.id() == rule.field_id)
    {
        debug!(
            field_id = owner.id(),
            referenced_field_id = rule.field_id.as_str(),
            "conditional rule references a missing field"
        );
        return false;
    }

    let current = live_values.get(rule.field_id.as_str());
    apply_operator(rule.operator, current, rule.value.as_ref())
}

fn apply_operator(
    operator: ConditionalOperator,
    current: Option<&Value>,
    operand: Option<&Value>,
) -> bool {
    match operator {
        ConditionalOperator::Equals => equals(current, operand),
        ConditionalOperator::NotEquals => !equals(current, operand),
        ConditionalOperator::Contains => contains_ignoring_case(current, operand),
        ConditionalOperator::NotContains => !contains_ignoring_case(current, operand),
        ConditionalOperator::GreaterThan => coerce_to_number(current) > coerce_to_number(operand),
        ConditionalOperator::LessThan => coerce_to_number(current) < coerce_to_number(operand),
        ConditionalOperator::IsEmpty => is_blank(current),
        ConditionalOperator::IsNotEmpty => !is_blank(current),
    }
}

/// Unanswered fields never equal anything, not even an empty operand.
fn equals(current: Option<&Value>, operand: Option<&Value>) -> bool {
    match current {
        None | Some(Value::Null) => false,
        Some(_) => coerce_to_string(current) == coerce_to_string(operand),
    }
}

fn contains_ignoring_case(current: Option<&Value>, operand: Option<&Value>) -> bool {
    let haystack = coerce_to_string(current).to_lowercase();
    let needle = coerce_to_string(operand).to_lowercase();
    haystack.contains(needle.as_str())
}

#[cfg(test)]
mod tests {
    use ekklesia_domain::{
        ConditionalAction, ConditionalLogic, ConditionalOperator, ConditionalRule, CustomField,
        FieldType, LogicType,
    };
    use proptest::prelude::*;
    use serde_json::{Value, json};

    use super::{apply_operator, evaluate, visible_fields};
    use crate::value_coercion::FormValues;

    fn values(pairs: &[(&str, Value)]) -> FormValues {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), value.clone()))
            .collect()
    }

    fn source_fields() -> Vec<CustomField> {
        vec![
            CustomField::new("A", "Attending", FieldType::Radio, 0).with_options(["yes", "no"]),
            CustomField::new("age", "Age", FieldType::Number, 1),
            CustomField::new("ministry", "Ministry", FieldType::Text, 2),
        ]
    }

    fn dependent(
        action: ConditionalAction,
        logic_type: LogicType,
        rules: Vec<ConditionalRule>,
    ) -> CustomField {
        CustomField::new("B", "Dietary needs", FieldType::Text, 3)
            .with_conditional_logic(ConditionalLogic::new(action, logic_type, rules))
    }

    #[test]
    fn equals_rule_drives_visibility() {
        let fields = source_fields();
        let field = dependent(
            ConditionalAction::Show,
            LogicType::All,
            vec![ConditionalRule::new("A", ConditionalOperator::Equals, "yes")],
        );

        assert!(evaluate(&field, &values(&[("A", json!("yes"))]), &fields));
        assert!(!evaluate(&field, &values(&[("A", json!("no"))]), &fields));
        assert!(!evaluate(&field, &FormValues::new(), &fields));
    }

    #[test]
    fn unanswered_field_never_equals_an_empty_operand() {
        let fields = source_fields();
        let field = dependent(
            ConditionalAction::Show,
            LogicType::All,
            vec![ConditionalRule::new("A", ConditionalOperator::Equals, "")],
        );

        assert!(!evaluate(&field, &FormValues::new(), &fields));
        assert!(!evaluate(&field, &values(&[("A", Value::Null)]), &fields));
        assert!(evaluate(&field, &values(&[("A", json!(""))]), &fields));

        let negated = dependent(
            ConditionalAction::Show,
            LogicType::All,
            vec![ConditionalRule::new("A", ConditionalOperator::NotEquals, "")],
        );
        assert!(evaluate(&negated, &FormValues::new(), &fields));
        assert!(!evaluate(&negated, &values(&[("A", json!(""))]), &fields));
    }

    #[test]
    fn field_without_logic_is_visible() {
        let fields = source_fields();
        let field = CustomField::new("plain", "Plain", FieldType::Text, 0);
        assert!(evaluate(&field, &FormValues::new(), &fields));
    }

    #[test]
    fn disabled_logic_ignores_its_rules() {
        let fields = source_fields();
        let mut logic = ConditionalLogic::new(
            ConditionalAction::Show,
            LogicType::All,
            vec![ConditionalRule::new("A", ConditionalOperator::Equals, "never")],
        );
        logic.enabled = false;
        let field = CustomField::new("B", "B", FieldType::Text, 0).with_conditional_logic(logic);

        assert!(evaluate(&field, &FormValues::new(), &fields));
    }

    #[test]
    fn dangling_reference_fails_closed() {
        let fields = source_fields();
        let field = dependent(
            ConditionalAction::Show,
            LogicType::Any,
            vec![ConditionalRule::without_operand("ghost", ConditionalOperator::IsEmpty)],
        );

        assert!(!evaluate(&field, &FormValues::new(), &fields));
    }

    #[test]
    fn hide_action_with_dangling_reference_keeps_field_visible() {
        let fields = source_fields();
        let field = dependent(
            ConditionalAction::Hide,
            LogicType::All,
            vec![ConditionalRule::new("ghost", ConditionalOperator::Equals, "x")],
        );

        assert!(evaluate(&field, &FormValues::new(), &fields));
    }

    #[test]
    fn contains_is_case_insensitive_and_handles_multi_choice() {
        assert!(apply_operator(
            ConditionalOperator::Contains,
            Some(&json!("Youth Ministry")),
            Some(&json!("youth")),
        ));
        assert!(apply_operator(
            ConditionalOperator::Contains,
            Some(&json!(["Choir", "Ushering"])),
            Some(&json!("USHER")),
        ));
        assert!(apply_operator(
            ConditionalOperator::NotContains,
            Some(&json!("Choir")),
            Some(&json!("media")),
        ));
    }

    #[test]
    fn numeric_comparisons_coerce_and_reject_non_numbers() {
        assert!(apply_operator(
            ConditionalOperator::GreaterThan,
            Some(&json!("18")),
            Some(&json!(17)),
        ));
        assert!(apply_operator(
            ConditionalOperator::LessThan,
            Some(&json!(3)),
            Some(&json!("10")),
        ));
        assert!(!apply_operator(
            ConditionalOperator::GreaterThan,
            Some(&json!("many")),
            Some(&json!(1)),
        ));
        assert!(!apply_operator(
            ConditionalOperator::LessThan,
            Some(&json!("many")),
            Some(&json!(1)),
        ));
    }

    #[test]
    fn equals_compares_string_forms() {
        assert!(apply_operator(
            ConditionalOperator::Equals,
            Some(&json!(5)),
            Some(&json!("5")),
        ));
        assert!(apply_operator(
            ConditionalOperator::NotEquals,
            Some(&json!(true)),
            Some(&json!("yes")),
        ));
    }

    #[test]
    fn visible_fields_filters_in_order() {
        let mut fields = source_fields();
        fields.push(dependent(
            ConditionalAction::Show,
            LogicType::All,
            vec![ConditionalRule::new("A", ConditionalOperator::Equals, "yes")],
        ));

        let shown: Vec<&str> = visible_fields(&fields, &values(&[("A", json!("no"))]))
            .into_iter()
            .map(CustomField::id)
            .collect();
        assert_eq!(shown, vec!["A", "age", "ministry"]);
    }

    fn live_value_strategy() -> impl Strategy<Value = Option<Value>> {
        prop_oneof![
            Just(None),
            Just(Some(Value::Null)),
            any::<bool>().prop_map(|flag| Some(json!(flag))),
            any::<i32>().prop_map(|number| Some(json!(number))),
            "[ a-zA-Z0-9]{0,8}".prop_map(|text| Some(json!(text))),
            proptest::collection::vec("[a-z]{0,4}", 0..3).prop_map(|items| Some(json!(items))),
        ]
    }

    fn comparison_rule_strategy() -> impl Strategy<Value = (ConditionalOperator, Value)> {
        (
            prop_oneof![
                Just(ConditionalOperator::Equals),
                Just(ConditionalOperator::NotEquals),
                Just(ConditionalOperator::Contains),
                Just(ConditionalOperator::NotContains),
                Just(ConditionalOperator::GreaterThan),
                Just(ConditionalOperator::LessThan),
                Just(ConditionalOperator::IsEmpty),
                Just(ConditionalOperator::IsNotEmpty),
            ],
            prop_oneof![
                "[a-z0-9]{0,4}".prop_map(Value::from),
                any::<i16>().prop_map(Value::from),
            ],
        )
    }

    fn rule_case_strategy()
    -> impl Strategy<Value = (Option<Value>, (ConditionalOperator, Value))> {
        (live_value_strategy(), comparison_rule_strategy())
    }

    fn live_values_for(inputs: &[Option<Value>]) -> FormValues {
        inputs
            .iter()
            .enumerate()
            .filter_map(|(index, value)| value.clone().map(|value| (format!("src{index}"), value)))
            .collect()
    }

    fn sources(count: usize) -> Vec<CustomField> {
        (0..count)
            .map(|index| {
                let order = i32::try_from(index).unwrap_or(0);
                CustomField::new(format!("src{index}"), "Source", FieldType::Text, order)
            })
            .collect()
    }

    fn rules_for(specs: &[(ConditionalOperator, Value)]) -> Vec<ConditionalRule> {
        specs
            .iter()
            .enumerate()
            .map(|(index, (operator, value))| {
                ConditionalRule::new(format!("src{index}"), *operator, value.clone())
            })
            .collect()
    }

    fn individual_results(
        specs: &[(ConditionalOperator, Value)],
        inputs: &[Option<Value>],
    ) -> Vec<bool> {
        specs
            .iter()
            .zip(inputs)
            .map(|((operator, operand), input)| {
                apply_operator(*operator, input.as_ref(), Some(operand))
            })
            .collect()
    }

    proptest! {
        #[test]
        fn inactive_logic_is_always_visible(
            inputs in proptest::collection::vec(live_value_strategy(), 1..4),
            specs in proptest::collection::vec(comparison_rule_strategy(), 1..4),
            action_is_hide in any::<bool>(),
        ) {
            let fields = sources(inputs.len().max(specs.len()));
            let live = live_values_for(&inputs);
            let action = if action_is_hide {
                ConditionalAction::Hide
            } else {
                ConditionalAction::Show
            };

            let mut disabled = ConditionalLogic::new(action, LogicType::All, rules_for(&specs));
            disabled.enabled = false;
            let disabled_field =
                CustomField::new("B", "B", FieldType::Text, 0).with_conditional_logic(disabled);
            prop_assert!(evaluate(&disabled_field, &live, &fields));

            let empty = CustomField::new("B", "B", FieldType::Text, 0)
                .with_conditional_logic(ConditionalLogic::new(action, LogicType::Any, Vec::new()));
            prop_assert!(evaluate(&empty, &live, &fields));
        }

        #[test]
        fn all_and_any_combine_individual_rule_results(
            pairs in proptest::collection::vec(rule_case_strategy(), 1..5),
        ) {
            let (inputs, specs): (Vec<Option<Value>>, Vec<(ConditionalOperator, Value)>) =
                pairs.into_iter().unzip();
            let fields = sources(inputs.len());
            let live = live_values_for(&inputs);
            let expected = individual_results(&specs, &inputs);

            let all_field = dependent(ConditionalAction::Show, LogicType::All, rules_for(&specs));
            prop_assert_eq!(
                evaluate(&all_field, &live, &fields),
                expected.iter().all(|holds| *holds)
            );

            let any_field = dependent(ConditionalAction::Show, LogicType::Any, rules_for(&specs));
            prop_assert_eq!(
                evaluate(&any_field, &live, &fields),
                expected.iter().any(|holds| *holds)
            );
        }

        #[test]
        fn hide_is_the_complement_of_show(
            pairs in proptest::collection::vec(rule_case_strategy(), 1..5),
            any_mode in any::<bool>(),
        ) {
            let (inputs, specs): (Vec<Option<Value>>, Vec<(ConditionalOperator, Value)>) =
                pairs.into_iter().unzip();
            let fields = sources(inputs.len());
            let live = live_values_for(&inputs);
            let logic_type = if any_mode { LogicType::Any } else { LogicType::All };

            let shown = dependent(ConditionalAction::Show, logic_type, rules_for(&specs));
            let hidden = dependent(ConditionalAction::Hide, logic_type, rules_for(&specs));
            prop_assert_eq!(evaluate(&shown, &live, &fields), !evaluate(&hidden, &live, &fields));
        }

        #[test]
        fn flipping_one_satisfied_rule_flips_an_all_group(
            count in 1_usize..5,
            flipped in 0_usize..5,
        ) {
            let flipped = flipped % count;
            let fields = sources(count);
            let specs: Vec<(ConditionalOperator, Value)> =
                (0..count).map(|_| (ConditionalOperator::Equals, json!("yes"))).collect();
            let field = dependent(ConditionalAction::Show, LogicType::All, rules_for(&specs));

            let all_yes: Vec<Option<Value>> = (0..count).map(|_| Some(json!("yes"))).collect();
            prop_assert!(evaluate(&field, &live_values_for(&all_yes), &fields));

            let mut one_no = all_yes.clone();
            one_no[flipped] = Some(json!("no"));
            prop_assert!(!evaluate(&field, &live_values_for(&one_no), &fields));
        }

        #[test]
        fn emptiness_checks_are_exclusive_and_exhaustive(input in live_value_strategy()) {
            let empty = apply_operator(ConditionalOperator::IsEmpty, input.as_ref(), None);
            let not_empty = apply_operator(ConditionalOperator::IsNotEmpty, input.as_ref(), None);
            prop_assert!(empty != not_empty);
        }
    }
}
