use std::borrow::Cow;

use serde_json::Value;

use crate::definition::element::FormElement;
use crate::definition::predicate::{NumericOperand, PredicateCondition};

/// Reads a number from a JSON number or a numeric string.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// True when the element holds a value: not missing, null, `""` or `[]`.
pub fn has_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

/// True when a choice element holds at least one selection.
pub fn has_selection(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Array(items)) => items.iter().any(|item| !item.is_null()),
        Some(_) => true,
    }
}

/// Values selected by a choice submission: scalars, arrays of scalars, and
/// compliance objects carrying their selection under `value`.
pub fn selected_values(value: &Value) -> Vec<Cow<'_, str>> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        Value::Object(map) => map.get("value").map(selected_values).unwrap_or_default(),
        other => scalar_text(other).into_iter().collect(),
    }
}

fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(text) => Some(Cow::Borrowed(text.as_str())),
        Value::Number(number) => Some(Cow::Owned(number.to_string())),
        Value::Bool(flag) => Some(Cow::Owned(flag.to_string())),
        _ => None,
    }
}

/// True when `value` selects any of `option_ids`.
///
/// Ids are mapped to the matching option's value on `element`; an id with
/// no matching option is compared as-is.
pub fn selects_any(element: &FormElement, value: Option<&Value>, option_ids: &[String]) -> bool {
    let Some(value) = value else {
        return false;
    };
    let wanted: Vec<&str> = option_ids
        .iter()
        .map(|option_id| {
            element
                .option(option_id)
                .map(|option| option.value.as_str())
                .unwrap_or(option_id.as_str())
        })
        .collect();

    selected_values(value)
        .iter()
        .any(|selected| wanted.contains(&selected.as_ref()))
}

/// Evaluates the scope-independent predicate kinds against a value.
///
/// `Form`, `RepeatableSet` and element-to-element numeric comparisons need
/// a scope and always yield `false` here.
pub fn matches(element: &FormElement, value: Option<&Value>, condition: &PredicateCondition) -> bool {
    match condition {
        PredicateCondition::Options { option_ids } => selects_any(element, value, option_ids),
        PredicateCondition::Value { has_value: expected } => has_value(value) == *expected,
        PredicateCondition::Numeric {
            operator,
            operand: NumericOperand::Literal(right),
        } => value
            .and_then(as_number)
            .is_some_and(|left| operator.compare(left, *right)),
        PredicateCondition::Between { min, max } => value
            .and_then(as_number)
            .is_some_and(|number| *min <= number && number <= *max),
        PredicateCondition::Numeric {
            operand: NumericOperand::Element(_),
            ..
        }
        | PredicateCondition::Form { .. }
        | PredicateCondition::RepeatableSet { .. } => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::definition::predicate::NumericOperator;

    fn element(value: serde_json::Value) -> FormElement {
        serde_json::from_value(value).expect("element")
    }

    #[test]
    fn option_ids_map_to_option_values() {
        let radio = element(json!({
            "id": "colour_id",
            "name": "colour",
            "type": "radio",
            "options": [
                { "id": "opt_red", "label": "Red", "value": "red" },
                { "id": "opt_blue", "label": "Blue", "value": "blue" }
            ]
        }));
        let ids = vec!["opt_red".to_string()];

        assert!(selects_any(&radio, Some(&json!("red")), &ids));
        assert!(!selects_any(&radio, Some(&json!("blue")), &ids));
        assert!(!selects_any(&radio, Some(&json!("opt_red")), &ids));
        assert!(!selects_any(&radio, None, &ids));
    }

    #[test]
    fn compliance_values_are_unwrapped() {
        let compliance = element(json!({
            "id": "c_id",
            "name": "c",
            "type": "compliance",
            "options": [{ "id": "yes_id", "label": "Yes", "value": "YES" }]
        }));
        let value = json!({ "value": "YES", "notes": "fine" });

        assert!(selects_any(&compliance, Some(&value), &["yes_id".to_string()]));
    }

    #[test]
    fn has_value_treats_blank_as_empty() {
        assert!(!has_value(None));
        assert!(!has_value(Some(&json!(null))));
        assert!(!has_value(Some(&json!(""))));
        assert!(!has_value(Some(&json!([]))));
        assert!(has_value(Some(&json!(0))));
        assert!(has_value(Some(&json!(false))));
    }

    #[test]
    fn has_selection_needs_a_non_null_entry() {
        assert!(!has_selection(Some(&json!([null]))));
        assert!(has_selection(Some(&json!([null, "a"]))));
        assert!(has_selection(Some(&json!(""))));
    }

    #[test]
    fn numeric_and_between_accept_numeric_strings() {
        let number = element(json!({ "id": "n_id", "name": "n", "type": "number" }));
        let greater = PredicateCondition::Numeric {
            operator: NumericOperator::GreaterThan,
            operand: NumericOperand::Literal(10.0),
        };
        let between = PredicateCondition::Between { min: 1.0, max: 5.0 };

        assert!(matches(&number, Some(&json!(11)), &greater));
        assert!(matches(&number, Some(&json!("12.5")), &greater));
        assert!(!matches(&number, Some(&json!("ten")), &greater));
        assert!(matches(&number, Some(&json!(5)), &between));
        assert!(!matches(&number, Some(&json!(5.01)), &between));
        assert!(!matches(&number, None, &between));
    }
}
