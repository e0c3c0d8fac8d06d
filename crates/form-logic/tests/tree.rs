use serde_json::{Value, json};

use form_logic::{
    FormDefinition, FormElement, VisibilityAnnotation, VisibilityCache, build_visibility_tree,
    visible_page_ids,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "multi_page_form" => include_str!("../tests/fixtures/multi_page_form.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn inspection() -> FormDefinition {
    FormDefinition::from_json_str(fixture("multi_page_form")).expect("deserialize")
}

#[test]
fn tree_mirrors_nested_element_shape() {
    let form = inspection();
    let model = json!({
        "has_issues": "yes",
        "issues": [
            { "location": { "room": "Kitchen" } },
            { "location": { "room": "Garage" } }
        ]
    });

    let tree = form.visibility(&model).expect("tree");
    let value = serde_json::to_value(&tree).expect("serialize");

    let keys: Vec<&String> = value.as_object().expect("root").keys().collect();
    assert_eq!(keys, ["page_details", "page_issues", "page_sign_off"]);

    let issues_page = &value["page_issues"];
    assert_eq!(issues_page["type"], "page");
    assert_eq!(issues_page["isShown"], true);

    // the section contributes no key of its own
    let page_keys: Vec<&String> = issues_page["formElements"]
        .as_object()
        .expect("form elements")
        .keys()
        .collect();
    assert_eq!(page_keys, ["issues"]);

    let set = &issues_page["formElements"]["issues"];
    assert_eq!(set["type"], "repeatableSet");
    let entry = &set["entries"]["1"];
    assert_eq!(entry["location"]["type"], "nestedForm");
    assert_eq!(
        entry["location"]["nested"]["room"],
        json!({ "type": "formElement", "isShown": true })
    );
    assert_eq!(entry["photo"]["isShown"], true);
}

#[test]
fn hidden_page_hides_its_children() {
    let form = inspection();
    let model = json!({
        "has_issues": "no",
        "issues": [ { "location": { "room": "Kitchen" } } ]
    });

    let tree = form.visibility(&model).expect("tree");

    match &tree["page_issues"] {
        VisibilityAnnotation::Page {
            is_shown,
            form_elements,
        } => {
            assert!(!is_shown);
            match &form_elements["issues"] {
                VisibilityAnnotation::RepeatableSet { is_shown, entries } => {
                    assert!(!is_shown);
                    assert!(entries.is_empty());
                }
                other => panic!("unexpected annotation {:?}", other),
            }
        }
        other => panic!("unexpected annotation {:?}", other),
    }
    assert_eq!(visible_page_ids(&tree), vec!["page_details", "page_sign_off"]);
}

#[test]
fn nested_form_without_submission_has_empty_map() {
    let elements: Vec<FormElement> = serde_json::from_value(json!([
        {
            "id": "address_id",
            "name": "address",
            "type": "form",
            "elements": [ { "id": "street_id", "name": "street", "type": "text" } ]
        }
    ]))
    .expect("elements");

    let tree = build_visibility_tree(&elements, &json!({})).expect("tree");

    assert_eq!(
        tree["address"],
        VisibilityAnnotation::NestedForm {
            is_shown: true,
            nested: Default::default(),
        }
    );
}

#[test]
fn non_object_entries_evaluate_against_empty_model() {
    let elements: Vec<FormElement> = serde_json::from_value(json!([
        {
            "id": "set_id",
            "name": "set",
            "type": "repeatableSet",
            "elements": [
                { "id": "a_id", "name": "a", "type": "text" },
                {
                    "id": "b_id",
                    "name": "b",
                    "type": "text",
                    "conditionallyShow": true,
                    "conditionallyShowPredicates": [
                        { "elementId": "a_id", "type": "VALUE", "hasValue": false }
                    ]
                }
            ]
        }
    ]))
    .expect("elements");

    let tree = build_visibility_tree(&elements, &json!({ "set": [ "junk" ] })).expect("tree");
    let value = serde_json::to_value(&tree).expect("serialize");

    assert_eq!(value["set"]["entries"]["0"]["b"]["isShown"], true);
}

#[test]
fn cache_rebuilds_only_when_versions_change() {
    let form = inspection();
    let mut cache = VisibilityCache::new();

    let yes = json!({ "has_issues": "yes" });
    let shown = cache
        .get_or_build(1, 1, &form.elements, &yes)
        .expect("tree")["page_issues"]
        .is_shown();
    assert!(shown);

    // same versions: the cached tree is returned even for a different model
    let no = json!({ "has_issues": "no" });
    let cached: Value = serde_json::to_value(cache.get_or_build(1, 1, &form.elements, &no).expect("tree"))
        .expect("serialize");
    assert_eq!(cached["page_issues"]["isShown"], true);

    let rebuilt = cache
        .get_or_build(1, 2, &form.elements, &no)
        .expect("tree")["page_issues"]
        .is_shown();
    assert!(!rebuilt);

    cache.invalidate();
    let after_invalidate = cache
        .get_or_build(1, 2, &form.elements, &yes)
        .expect("tree")["page_issues"]
        .is_shown();
    assert!(after_invalidate);
}
