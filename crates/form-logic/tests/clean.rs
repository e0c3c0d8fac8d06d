use serde_json::{Value, json};

use form_logic::{EngineConfig, FormDefinition, clean_submission};

fn fixture(name: &str) -> &'static str {
    match name {
        "multi_page_form" => include_str!("../tests/fixtures/multi_page_form.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn inspection() -> FormDefinition {
    FormDefinition::from_json_str(fixture("multi_page_form")).expect("deserialize")
}

fn submission(has_issues: &str) -> Value {
    json!({
        "inspector": "Ann",
        "has_issues": has_issues,
        "captcha_one": "tok1",
        "issues": [
            { "location": { "room": "Kitchen", "stale": "x" }, "photo": "data:image/png;base64,AAAA" },
            "junk"
        ],
        "signature": "data:image/png;base64,BBBB",
        "follow_up": "Call the landlord",
        "captcha_two": "tok2"
    })
}

#[test]
fn hidden_values_are_removed() {
    let form = inspection();
    let cleaned = form
        .clean(&submission("no"), &EngineConfig::default())
        .expect("clean");

    assert_eq!(
        Value::Object(cleaned.submission),
        json!({
            "inspector": "Ann",
            "has_issues": "no",
            "intro": true,
            "captcha_one": "tok1",
            "signature": "data:image/png;base64,BBBB",
            "captcha_two": "tok2"
        })
    );
}

#[test]
fn visible_nested_values_are_rebuilt_from_the_definition() {
    let form = inspection();
    let cleaned = form
        .clean(&submission("yes"), &EngineConfig::default())
        .expect("clean");

    assert_eq!(
        cleaned.submission["issues"],
        json!([
            { "location": { "room": "Kitchen" }, "photo": "data:image/png;base64,AAAA" },
            {}
        ])
    );
    assert_eq!(cleaned.submission["follow_up"], "Call the landlord");
}

#[test]
fn captcha_tokens_are_collected_in_document_order() {
    let form = inspection();
    let cleaned = form
        .clean(&submission("yes"), &EngineConfig::default())
        .expect("clean");

    assert_eq!(cleaned.captcha_tokens, vec!["tok1", "tok2"]);

    let mut model = submission("yes");
    model["captcha_one"] = json!(null);
    let cleaned = form.clean(&model, &EngineConfig::default()).expect("clean");
    assert_eq!(cleaned.captcha_tokens, vec!["tok2"]);
    assert!(!cleaned.submission.contains_key("captcha_one"));
}

#[test]
fn stripping_binary_data_drops_attachments_and_content_flags() {
    let form = inspection();
    let config = EngineConfig {
        strip_binary_data: true,
    };
    let cleaned = form.clean(&submission("yes"), &config).expect("clean");

    assert!(!cleaned.submission.contains_key("signature"));
    assert!(!cleaned.submission.contains_key("intro"));
    assert_eq!(
        cleaned.submission["issues"][0],
        json!({ "location": { "room": "Kitchen" } })
    );
    assert_eq!(cleaned.submission["inspector"], "Ann");
}

#[test]
fn elements_missing_from_the_tree_count_as_hidden() {
    let form = inspection();
    let cleaned = clean_submission(
        &form.elements,
        &submission("yes"),
        &Default::default(),
        false,
    );

    // content elements still report their (hidden) state
    assert_eq!(
        Value::Object(cleaned.submission),
        json!({ "intro": false })
    );
    assert!(cleaned.captcha_tokens.is_empty());
}

#[test]
fn cleaned_submission_serializes() {
    let form = inspection();
    let cleaned = form
        .clean(&submission("no"), &EngineConfig::default())
        .expect("clean");

    let bytes = cleaned.to_cbor().expect("cbor");
    assert!(!bytes.is_empty());

    let text = cleaned.to_json_pretty().expect("json");
    let value: Value = serde_json::from_str(&text).expect("parse");
    assert_eq!(value["captchaTokens"], json!(["tok1", "tok2"]));
    assert_eq!(value["submission"]["inspector"], "Ann");
}
