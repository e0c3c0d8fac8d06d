use std::collections::BTreeSet;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::condition::{as_number, has_value, selected_values};
use crate::definition::element::{ElementKind, ElementRole, FormElement};
use crate::scope::EMPTY_MODEL;
use crate::tree::{EMPTY_VISIBILITY, VisibilityAnnotation, VisibilityMap};

/// Validation error metadata reported for a single element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Result returned from [`validate_submission`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_required: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_fields: Vec<String>,
}

/// Validates the visible part of a submission.
///
/// Hidden elements are skipped entirely. Paths are JSON pointers into the
/// submission, e.g. `/people/0/name`. Unknown fields are reported but do not
/// make the submission invalid.
pub fn validate_submission(
    elements: &[FormElement],
    model: &Value,
    visibility: &VisibilityMap,
) -> ValidationResult {
    let mut validator = Validator::default();

    let mut root_names = BTreeSet::new();
    for element in elements {
        if let ElementKind::Page(page) = &element.kind {
            let form_elements = match visibility.get(&element.id) {
                Some(VisibilityAnnotation::Page { form_elements, .. }) => form_elements,
                _ => &EMPTY_VISIBILITY,
            };
            collect_names(&page.elements, &mut root_names);
            validator.validate_level(&page.elements, model, form_elements, "");
        } else {
            collect_names(std::slice::from_ref(element), &mut root_names);
            validator.validate_level(std::slice::from_ref(element), model, visibility, "");
        }
    }
    validator.report_unknown(model, &root_names, "");

    ValidationResult {
        valid: validator.errors.is_empty() && validator.missing_required.is_empty(),
        errors: validator.errors,
        missing_required: validator.missing_required,
        unknown_fields: validator.unknown_fields,
    }
}

#[derive(Default)]
struct Validator {
    errors: Vec<ValidationError>,
    missing_required: Vec<String>,
    unknown_fields: Vec<String>,
}

impl Validator {
    fn validate_level(
        &mut self,
        elements: &[FormElement],
        model: &Value,
        visibility: &VisibilityMap,
        prefix: &str,
    ) {
        for element in elements {
            if let ElementRole::Container(children) = element.role() {
                self.validate_level(children, model, visibility, prefix);
                continue;
            }

            let annotation = visibility.get(&element.name);
            if !annotation.is_some_and(VisibilityAnnotation::is_shown) {
                continue;
            }

            let path = format!("{}/{}", prefix, element.name);
            let value = model.get(element.name.as_str());

            match element.role() {
                ElementRole::Content => {}
                ElementRole::NestedForm(children) => match value {
                    Some(nested) if nested.is_object() => {
                        let nested_visibility = match annotation {
                            Some(VisibilityAnnotation::NestedForm { nested: map, .. }) => map,
                            _ => &EMPTY_VISIBILITY,
                        };
                        self.validate_level(children, nested, nested_visibility, &path);
                        let mut names = BTreeSet::new();
                        collect_names(children, &mut names);
                        self.report_unknown(nested, &names, &path);
                    }
                    _ if element.required => self.missing_required.push(path),
                    _ => {}
                },
                ElementRole::RepeatableSet(children) => {
                    let items = value.and_then(Value::as_array);
                    if let ElementKind::RepeatableSet(config) = &element.kind {
                        let count = items.map(Vec::len).unwrap_or(0);
                        if let Some(min) = config.min_set_entries
                            && count < min
                        {
                            self.errors.push(base_error(
                                element,
                                &path,
                                "not enough entries",
                                "min_entries",
                            ));
                        }
                        if let Some(max) = config.max_set_entries
                            && count > max
                        {
                            self.errors.push(base_error(
                                element,
                                &path,
                                "too many entries",
                                "max_entries",
                            ));
                        }
                    }
                    let Some(items) = items else {
                        if element.required {
                            self.missing_required.push(path);
                        }
                        continue;
                    };
                    let entries = match annotation {
                        Some(VisibilityAnnotation::RepeatableSet { entries, .. }) => Some(entries),
                        _ => None,
                    };
                    let mut names = BTreeSet::new();
                    collect_names(children, &mut names);
                    for (index, item) in items.iter().enumerate() {
                        let entry_model = if item.is_object() { item } else { &EMPTY_MODEL };
                        let entry_visibility = entries
                            .and_then(|entries| entries.get(&index))
                            .unwrap_or(&EMPTY_VISIBILITY);
                        let entry_path = format!("{}/{}", path, index);
                        self.validate_level(children, entry_model, entry_visibility, &entry_path);
                        self.report_unknown(entry_model, &names, &entry_path);
                    }
                }
                ElementRole::Captcha | ElementRole::Binary | ElementRole::Value => {
                    if !has_value(value) {
                        if element.required {
                            self.missing_required.push(path);
                        }
                        continue;
                    }
                    if let Some(value) = value
                        && let Some(error) = validate_value(element, value, &path)
                    {
                        self.errors.push(error);
                    }
                }
                ElementRole::Container(_) => {}
            }
        }
    }

    fn report_unknown(&mut self, model: &Value, names: &BTreeSet<String>, prefix: &str) {
        if let Some(object) = model.as_object() {
            self.unknown_fields.extend(
                object
                    .keys()
                    .filter(|key| !names.contains(*key))
                    .map(|key| format!("{}/{}", prefix, key)),
            );
        }
    }
}

/// Names owning a submission key at this level, looking through containers.
fn collect_names(elements: &[FormElement], names: &mut BTreeSet<String>) {
    for element in elements {
        match element.role() {
            ElementRole::Container(children) => collect_names(children, names),
            _ => {
                names.insert(element.name.clone());
            }
        }
    }
}

fn validate_value(element: &FormElement, value: &Value, path: &str) -> Option<ValidationError> {
    if let Some(rules) = element.kind.text_rules() {
        let Some(text) = value.as_str() else {
            return Some(base_error(element, path, "type mismatch", "type_mismatch"));
        };

        if let Some(pattern) = &rules.regex_pattern
            && let Ok(regex) = Regex::new(pattern)
            && !regex.is_match(text)
        {
            let message = rules
                .regex_message
                .as_deref()
                .unwrap_or("value does not match pattern");
            return Some(base_error(element, path, message, "pattern_mismatch"));
        }

        let length = text.chars().count();
        if let Some(min_length) = rules.min_length
            && length < min_length
        {
            return Some(base_error(
                element,
                path,
                "string shorter than min length",
                "min_length",
            ));
        }
        if let Some(max_length) = rules.max_length
            && length > max_length
        {
            return Some(base_error(
                element,
                path,
                "string longer than max length",
                "max_length",
            ));
        }
        return None;
    }

    if let ElementKind::Number(rules) = &element.kind {
        let Some(number) = as_number(value) else {
            return Some(base_error(element, path, "type mismatch", "type_mismatch"));
        };
        if let Some(min) = rules.min_number
            && number < min
        {
            return Some(base_error(element, path, "value below minimum", "min"));
        }
        if let Some(max) = rules.max_number
            && number > max
        {
            return Some(base_error(element, path, "value above maximum", "max"));
        }
        return None;
    }

    if let Some(choices) = element.kind.choices()
        && !choices.options.is_empty()
        && selected_values(value).iter().any(|selected| {
            !choices
                .options
                .iter()
                .any(|option| option.value == *selected)
        })
    {
        return Some(base_error(element, path, "invalid option", "invalid_option"));
    }

    None
}

fn base_error(element: &FormElement, path: &str, message: &str, code: &str) -> ValidationError {
    ValidationError {
        element_id: Some(element.id.clone()),
        path: Some(path.to_string()),
        message: message.into(),
        code: Some(code.into()),
    }
}
