use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::definition::predicate::{ConditionalPredicate, PredicateRecord};

/// A single node of a form definition tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormElement {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default)]
    pub conditionally_show: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schemars(with = "Vec<PredicateRecord>")]
    pub conditionally_show_predicates: Vec<ConditionalPredicate>,
    #[serde(default)]
    pub requires_all_conditionally_show_predicates: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub kind: ElementKind,
}

/// Type-specific payload of a [`FormElement`], selected by its `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementKind {
    Page(ElementList),
    Section(ElementList),
    Form(ElementList),
    InfoPage(ElementList),
    RepeatableSet(RepeatableSetConfig),
    Radio(ChoiceConfig),
    Checkboxes(ChoiceConfig),
    Select(ChoiceConfig),
    Autocomplete(ChoiceConfig),
    Compliance(ChoiceConfig),
    Text(TextRules),
    Textarea(TextRules),
    Email(TextRules),
    Telephone(TextRules),
    BarcodeScanner(TextRules),
    Number(NumberRules),
    Date,
    Datetime,
    Time,
    Boolean,
    Calculation,
    Location,
    Summary,
    Image,
    Heading,
    Html,
    Captcha,
    Camera,
    Files,
    File,
    Draw,
    /// Any unrecognised `type`. Treated as a plain value element; the original
    /// tag is not kept, so it serializes back as `"other"`.
    #[serde(other)]
    Other,
}

/// How an element participates in the submission and in visibility maps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementRole<'a> {
    /// `page`/`section`: groups children, owns no submission key.
    Container(&'a [FormElement]),
    /// `form`/`infoPage`: children live in a nested object.
    NestedForm(&'a [FormElement]),
    /// Children are replicated per array entry.
    RepeatableSet(&'a [FormElement]),
    /// Display-only element whose "value" is its render state.
    Content,
    Captcha,
    /// Attachment-backed value that can be stripped from light payloads.
    Binary,
    Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElementList {
    #[serde(default)]
    pub elements: Vec<FormElement>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepeatableSetConfig {
    #[serde(default)]
    pub elements: Vec<FormElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_set_entries: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_set_entries: Option<usize>,
}

/// Options offered by a choice element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
    #[serde(default)]
    pub conditionally_show_options: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<ChoiceOptionAttribute>,
}

/// Shows an option only while `elementId` holds one of `optionIds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOptionAttribute {
    pub element_id: String,
    #[serde(default)]
    pub option_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NumberRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_number: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_number: Option<f64>,
}

impl<'a> ElementRole<'a> {
    /// Child elements of containers, nested forms and repeatable sets.
    pub fn children(self) -> Option<&'a [FormElement]> {
        match self {
            ElementRole::Container(children)
            | ElementRole::NestedForm(children)
            | ElementRole::RepeatableSet(children) => Some(children),
            ElementRole::Content | ElementRole::Captcha | ElementRole::Binary | ElementRole::Value => {
                None
            }
        }
    }
}

impl ElementKind {
    pub fn role(&self) -> ElementRole<'_> {
        match self {
            ElementKind::Page(list) | ElementKind::Section(list) => {
                ElementRole::Container(&list.elements)
            }
            ElementKind::Form(list) | ElementKind::InfoPage(list) => {
                ElementRole::NestedForm(&list.elements)
            }
            ElementKind::RepeatableSet(set) => ElementRole::RepeatableSet(&set.elements),
            ElementKind::Image | ElementKind::Heading | ElementKind::Html => ElementRole::Content,
            ElementKind::Captcha => ElementRole::Captcha,
            ElementKind::Camera | ElementKind::Files | ElementKind::File | ElementKind::Draw => {
                ElementRole::Binary
            }
            ElementKind::Radio(_)
            | ElementKind::Checkboxes(_)
            | ElementKind::Select(_)
            | ElementKind::Autocomplete(_)
            | ElementKind::Compliance(_)
            | ElementKind::Text(_)
            | ElementKind::Textarea(_)
            | ElementKind::Email(_)
            | ElementKind::Telephone(_)
            | ElementKind::BarcodeScanner(_)
            | ElementKind::Number(_)
            | ElementKind::Date
            | ElementKind::Datetime
            | ElementKind::Time
            | ElementKind::Boolean
            | ElementKind::Calculation
            | ElementKind::Location
            | ElementKind::Summary
            | ElementKind::Other => ElementRole::Value,
        }
    }

    /// Option configuration for choice-bearing elements.
    pub fn choices(&self) -> Option<&ChoiceConfig> {
        match self {
            ElementKind::Radio(config)
            | ElementKind::Checkboxes(config)
            | ElementKind::Select(config)
            | ElementKind::Autocomplete(config)
            | ElementKind::Compliance(config) => Some(config),
            _ => None,
        }
    }

    pub fn text_rules(&self) -> Option<&TextRules> {
        match self {
            ElementKind::Text(rules)
            | ElementKind::Textarea(rules)
            | ElementKind::Email(rules)
            | ElementKind::Telephone(rules)
            | ElementKind::BarcodeScanner(rules) => Some(rules),
            _ => None,
        }
    }
}

impl FormElement {
    pub fn role(&self) -> ElementRole<'_> {
        self.kind.role()
    }

    /// True for `page` and `section` elements.
    pub fn is_container(&self) -> bool {
        matches!(self.role(), ElementRole::Container(_))
    }

    pub fn is_page(&self) -> bool {
        matches!(self.kind, ElementKind::Page(_))
    }

    /// Looks up one of this element's options by id.
    pub fn option(&self, option_id: &str) -> Option<&ChoiceOption> {
        self.kind
            .choices()?
            .options
            .iter()
            .find(|option| option.id == option_id)
    }

    /// Label used in diagnostics, falling back to the name and then the id.
    pub fn display_label(&self) -> &str {
        if !self.label.is_empty() {
            &self.label
        } else if !self.name.is_empty() {
            &self.name
        } else {
            &self.id
        }
    }
}
