use serde_json::{Value, json};

use form_logic::{FormDefinition, FormElement, build_visibility_tree, validate_submission};

fn fixture(name: &str) -> &'static str {
    match name {
        "multi_page_form" => include_str!("../tests/fixtures/multi_page_form.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn inspection() -> FormDefinition {
    FormDefinition::from_json_str(fixture("multi_page_form")).expect("deserialize")
}

fn codes(result: &form_logic::ValidationResult) -> Vec<(&str, &str)> {
    result
        .errors
        .iter()
        .map(|error| {
            (
                error.path.as_deref().unwrap_or_default(),
                error.code.as_deref().unwrap_or_default(),
            )
        })
        .collect()
}

#[test]
fn complete_submission_is_valid() {
    let form = inspection();
    let model = json!({
        "inspector": "Ann",
        "has_issues": "yes",
        "issues": [ { "location": { "room": "Kitchen" } } ],
        "follow_up": "Replace the tap"
    });

    let result = form.validate(&model).expect("validate");
    assert!(result.valid, "unexpected result: {:?}", result);
}

#[test]
fn missing_required_values_are_reported() {
    let form = inspection();
    let result = form.validate(&json!({})).expect("validate");

    assert!(!result.valid);
    assert_eq!(result.missing_required, vec!["/inspector", "/has_issues"]);
    assert!(result.errors.is_empty());
}

#[test]
fn value_rules_are_enforced() {
    let form = inspection();
    let model = json!({ "inspector": "A", "has_issues": "maybe" });

    let result = form.validate(&model).expect("validate");
    assert_eq!(
        codes(&result),
        vec![
            ("/inspector", "min_length"),
            ("/has_issues", "invalid_option")
        ]
    );

    let result = form
        .validate(&json!({ "inspector": 5, "has_issues": "no" }))
        .expect("validate");
    assert_eq!(codes(&result), vec![("/inspector", "type_mismatch")]);
}

#[test]
fn hidden_elements_are_not_validated() {
    let form = inspection();
    let model = json!({ "inspector": "Ann", "has_issues": "no" });

    let result = form.validate(&model).expect("validate");
    assert!(result.valid, "unexpected result: {:?}", result);
}

#[test]
fn repeatable_set_entries_are_checked() {
    let form = inspection();

    let empty = json!({ "inspector": "Ann", "has_issues": "yes", "issues": [] });
    let result = form.validate(&empty).expect("validate");
    assert_eq!(codes(&result), vec![("/issues", "min_entries")]);

    let incomplete = json!({
        "inspector": "Ann",
        "has_issues": "yes",
        "issues": [ { "location": {} } ]
    });
    let result = form.validate(&incomplete).expect("validate");
    assert_eq!(result.missing_required, vec!["/issues/0/location/room"]);
}

#[test]
fn unknown_fields_are_reported_per_level() {
    let form = inspection();
    let model = json!({
        "inspector": "Ann",
        "has_issues": "yes",
        "extra": 1,
        "issues": [ { "location": { "room": "Hall", "floor": 2 } } ]
    });

    let result = form.validate(&model).expect("validate");
    assert!(result.valid);
    assert_eq!(
        result.unknown_fields,
        vec!["/issues/0/location/floor", "/extra"]
    );
}

#[test]
fn unknown_field_alone_keeps_submission_valid() {
    let elements: Vec<FormElement> =
        serde_json::from_value(json!([ { "id": "a_id", "name": "a", "type": "text" } ]))
            .expect("elements");
    let model = json!({ "a": "x", "extra": 1 });

    let tree = build_visibility_tree(&elements, &model).expect("tree");
    let result = validate_submission(&elements, &model, &tree);

    assert!(result.valid);
    assert!(result.errors.is_empty());
    assert!(result.missing_required.is_empty());
    assert_eq!(result.unknown_fields, vec!["/extra"]);
}

#[test]
fn number_and_pattern_rules() {
    let elements: Vec<FormElement> = serde_json::from_value(json!([
        {
            "id": "age_id",
            "name": "age",
            "type": "number",
            "minNumber": 18,
            "maxNumber": 99
        },
        {
            "id": "code_id",
            "name": "code",
            "type": "text",
            "regexPattern": "^[A-Z]{3}$",
            "regexMessage": "Use three capital letters"
        }
    ]))
    .expect("elements");

    let check = |model: Value| {
        let tree = build_visibility_tree(&elements, &model).expect("tree");
        validate_submission(&elements, &model, &tree)
    };

    let result = check(json!({ "age": 12, "code": "abc" }));
    assert_eq!(
        codes(&result),
        vec![("/age", "min"), ("/code", "pattern_mismatch")]
    );
    assert_eq!(result.errors[1].message, "Use three capital letters");

    let result = check(json!({ "age": "120", "code": "ABC" }));
    assert_eq!(codes(&result), vec![("/age", "max")]);

    assert!(check(json!({ "age": 30, "code": "XYZ" })).valid);
}
