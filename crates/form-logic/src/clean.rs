use serde::{Deserialize, Serialize};
use serde_cbor::{to_vec, value::to_value};
use serde_json::{Map, Value};

use crate::definition::element::{ElementKind, ElementRole, FormElement};
use crate::scope::EMPTY_MODEL;
use crate::tree::{EMPTY_VISIBILITY, VisibilityAnnotation, VisibilityMap};

/// Submission with hidden values removed, ready for submit or draft save.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanedSubmission {
    pub submission: Map<String, Value>,
    /// Captcha tokens in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub captcha_tokens: Vec<String>,
}

impl CleanedSubmission {
    /// Serializes the cleaned submission as canonical CBOR bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        let canonical = to_value(self)?;
        to_vec(&canonical)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Builds a submission holding only the values of visible elements.
///
/// Keys of hidden elements are absent from the result. Content elements
/// record their visibility as a boolean and binary elements are dropped when
/// `strip_binary_data` is set. Elements missing from `visibility` count as
/// hidden.
pub fn clean_submission(
    elements: &[FormElement],
    model: &Value,
    visibility: &VisibilityMap,
    strip_binary_data: bool,
) -> CleanedSubmission {
    let mut cleaner = Cleaner {
        strip_binary_data,
        captcha_tokens: Vec::new(),
    };
    let mut submission = Map::new();

    for element in elements {
        if let ElementKind::Page(page) = &element.kind {
            let form_elements = match visibility.get(&element.id) {
                Some(VisibilityAnnotation::Page { form_elements, .. }) => form_elements,
                _ => &EMPTY_VISIBILITY,
            };
            cleaner.clean_into(&page.elements, model, form_elements, &mut submission);
        } else {
            cleaner.clean_into(std::slice::from_ref(element), model, visibility, &mut submission);
        }
    }

    CleanedSubmission {
        submission,
        captcha_tokens: cleaner.captcha_tokens,
    }
}

struct Cleaner {
    strip_binary_data: bool,
    captcha_tokens: Vec<String>,
}

impl Cleaner {
    fn clean_into(
        &mut self,
        elements: &[FormElement],
        model: &Value,
        visibility: &VisibilityMap,
        out: &mut Map<String, Value>,
    ) {
        for element in elements {
            let annotation = visibility.get(&element.name);
            let is_shown = annotation.is_some_and(VisibilityAnnotation::is_shown);
            let value = model.get(element.name.as_str());

            match element.role() {
                ElementRole::Container(children) => self.clean_into(children, model, visibility, out),
                ElementRole::Content => {
                    if !self.strip_binary_data {
                        out.insert(element.name.clone(), Value::Bool(is_shown));
                    }
                }
                ElementRole::Captcha => {
                    if is_shown && let Some(token) = value.and_then(Value::as_str) {
                        self.captcha_tokens.push(token.to_string());
                        out.insert(element.name.clone(), Value::String(token.to_string()));
                    }
                }
                ElementRole::Binary => {
                    if is_shown
                        && !self.strip_binary_data
                        && let Some(value) = value
                    {
                        out.insert(element.name.clone(), value.clone());
                    }
                }
                ElementRole::NestedForm(children) => {
                    if is_shown
                        && let Some(VisibilityAnnotation::NestedForm { nested, .. }) = annotation
                        && let Some(value) = value
                        && value.is_object()
                    {
                        let mut nested_out = Map::new();
                        self.clean_into(children, value, nested, &mut nested_out);
                        out.insert(element.name.clone(), Value::Object(nested_out));
                    }
                }
                ElementRole::RepeatableSet(children) => {
                    if is_shown
                        && let Some(VisibilityAnnotation::RepeatableSet { entries, .. }) = annotation
                        && let Some(items) = value.and_then(Value::as_array)
                    {
                        let cleaned = items
                            .iter()
                            .enumerate()
                            .map(|(index, item)| {
                                let entry_model = if item.is_object() { item } else { &EMPTY_MODEL };
                                let entry_visibility = entries.get(&index).unwrap_or(&EMPTY_VISIBILITY);
                                let mut entry_out = Map::new();
                                self.clean_into(children, entry_model, entry_visibility, &mut entry_out);
                                Value::Object(entry_out)
                            })
                            .collect();
                        out.insert(element.name.clone(), Value::Array(cleaned));
                    }
                }
                ElementRole::Value => {
                    if is_shown && let Some(value) = value {
                        out.insert(element.name.clone(), value.clone());
                    }
                }
            }
        }
    }
}
