use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::check::{DefinitionReport, check_definition};
use crate::clean::{CleanedSubmission, clean_submission};
use crate::config::EngineConfig;
use crate::definition::element::FormElement;
use crate::error::ConditionalLogicError;
use crate::tree::{VisibilityMap, build_visibility_tree};
use crate::validate::{ValidationResult, validate_submission};

/// Top-level form definition as produced by a form builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_multi_page: bool,
    pub elements: Vec<FormElement>,
}

impl FormDefinition {
    /// Wraps a bare element list in an otherwise empty definition.
    pub fn from_elements(elements: Vec<FormElement>) -> Self {
        Self {
            id: None,
            name: String::new(),
            description: None,
            is_multi_page: elements.iter().any(FormElement::is_page),
            elements,
        }
    }

    /// Parses either a full form object or a bare element array.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        if value.is_array() {
            Ok(Self::from_elements(serde_json::from_value(value)?))
        } else {
            serde_json::from_value(value)
        }
    }

    pub fn visibility(&self, model: &Value) -> Result<VisibilityMap, ConditionalLogicError> {
        build_visibility_tree(&self.elements, model)
    }

    /// Cleans `model` against a freshly built visibility tree.
    pub fn clean(
        &self,
        model: &Value,
        config: &EngineConfig,
    ) -> Result<CleanedSubmission, ConditionalLogicError> {
        let tree = self.visibility(model)?;
        Ok(clean_submission(
            &self.elements,
            model,
            &tree,
            config.strip_binary_data,
        ))
    }

    pub fn validate(&self, model: &Value) -> Result<ValidationResult, ConditionalLogicError> {
        let tree = self.visibility(model)?;
        Ok(validate_submission(&self.elements, model, &tree))
    }

    pub fn check(&self) -> DefinitionReport {
        check_definition(&self.elements)
    }

    /// Visits every element depth-first in document order, descending into
    /// containers, nested forms and repeatable sets.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a FormElement)) {
        walk_elements(&self.elements, visit);
    }

    pub fn find_element(&self, element_id: &str) -> Option<&FormElement> {
        let mut found = None;
        self.walk(&mut |element| {
            if found.is_none() && element.id == element_id {
                found = Some(element);
            }
        });
        found
    }
}

pub(crate) fn walk_elements<'a>(elements: &'a [FormElement], visit: &mut dyn FnMut(&'a FormElement)) {
    for element in elements {
        visit(element);
        if let Some(children) = element.role().children() {
            walk_elements(children, visit);
        }
    }
}
