use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::definition::element::{ElementKind, ElementRole, FormElement};
use crate::error::ConditionalLogicError;
use crate::path::EvaluationPath;
use crate::scope::{EMPTY_MODEL, Scope};
use crate::visibility::is_element_visible;

/// Annotations keyed by element name (page id at the root).
pub type VisibilityMap = BTreeMap<String, VisibilityAnnotation>;

pub(crate) static EMPTY_VISIBILITY: VisibilityMap = BTreeMap::new();

/// Visibility of one element, shaped like the element it describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VisibilityAnnotation {
    #[serde(rename_all = "camelCase")]
    FormElement {
        is_shown: bool,
    },
    #[serde(rename_all = "camelCase")]
    Page {
        is_shown: bool,
        form_elements: VisibilityMap,
    },
    #[serde(rename_all = "camelCase")]
    NestedForm {
        is_shown: bool,
        nested: VisibilityMap,
    },
    #[serde(rename_all = "camelCase")]
    RepeatableSet {
        is_shown: bool,
        entries: BTreeMap<usize, VisibilityMap>,
    },
}

impl VisibilityAnnotation {
    pub fn is_shown(&self) -> bool {
        match self {
            VisibilityAnnotation::FormElement { is_shown }
            | VisibilityAnnotation::Page { is_shown, .. }
            | VisibilityAnnotation::NestedForm { is_shown, .. }
            | VisibilityAnnotation::RepeatableSet { is_shown, .. } => *is_shown,
        }
    }
}

/// Builds the visibility annotation tree for a form.
///
/// Root pages are keyed by page id; every other element is keyed by name.
/// Sections are transparent and children of hidden pages or sections are
/// annotated as hidden without being evaluated.
pub fn build_visibility_tree(
    elements: &[FormElement],
    model: &Value,
) -> Result<VisibilityMap, ConditionalLogicError> {
    let scope = Scope::new(elements, model);
    let mut tree = VisibilityMap::new();

    for element in elements {
        if let ElementKind::Page(page) = &element.kind {
            let is_shown = is_element_visible(&scope, element, &EvaluationPath::new())?;
            let mut form_elements = VisibilityMap::new();
            collect(&scope, &page.elements, is_shown, &mut form_elements)?;
            tree.insert(
                element.id.clone(),
                VisibilityAnnotation::Page {
                    is_shown,
                    form_elements,
                },
            );
        } else {
            collect(&scope, std::slice::from_ref(element), true, &mut tree)?;
        }
    }

    Ok(tree)
}

fn collect<'a>(
    scope: &Scope<'a>,
    elements: &'a [FormElement],
    parent_shown: bool,
    map: &mut VisibilityMap,
) -> Result<(), ConditionalLogicError> {
    for element in elements {
        let is_shown = parent_shown && is_element_visible(scope, element, &EvaluationPath::new())?;

        match element.role() {
            ElementRole::Container(children) => collect(scope, children, is_shown, map)?,
            ElementRole::NestedForm(children) => {
                let mut nested = VisibilityMap::new();
                if is_shown
                    && let Some(value) = scope.value_of(element)
                    && value.is_object()
                {
                    let nested_scope = scope.child(children, value);
                    collect(&nested_scope, children, true, &mut nested)?;
                }
                map.insert(
                    element.name.clone(),
                    VisibilityAnnotation::NestedForm { is_shown, nested },
                );
            }
            ElementRole::RepeatableSet(children) => {
                let mut entries = BTreeMap::new();
                if is_shown && let Some(values) = scope.value_of(element).and_then(Value::as_array) {
                    for (index, entry) in values.iter().enumerate() {
                        let entry_model = if entry.is_object() { entry } else { &EMPTY_MODEL };
                        let entry_scope = scope.child(children, entry_model);
                        let mut entry_map = VisibilityMap::new();
                        collect(&entry_scope, children, true, &mut entry_map)?;
                        entries.insert(index, entry_map);
                    }
                }
                map.insert(
                    element.name.clone(),
                    VisibilityAnnotation::RepeatableSet { is_shown, entries },
                );
            }
            ElementRole::Content | ElementRole::Captcha | ElementRole::Binary | ElementRole::Value => {
                map.insert(
                    element.name.clone(),
                    VisibilityAnnotation::FormElement { is_shown },
                );
            }
        }
    }
    Ok(())
}

/// Ids of root pages that are shown, in key order.
pub fn visible_page_ids(tree: &VisibilityMap) -> Vec<&str> {
    tree.iter()
        .filter(|(_, annotation)| {
            matches!(annotation, VisibilityAnnotation::Page { is_shown: true, .. })
        })
        .map(|(id, _)| id.as_str())
        .collect()
}

/// Caller-owned memo of the last built tree.
///
/// The tree is rebuilt whenever either version differs from the one it was
/// built for; the evaluator itself keeps no state.
#[derive(Debug, Default)]
pub struct VisibilityCache {
    key: Option<(u64, u64)>,
    tree: VisibilityMap,
}

impl VisibilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &mut self,
        definition_version: u64,
        model_version: u64,
        elements: &[FormElement],
        model: &Value,
    ) -> Result<&VisibilityMap, ConditionalLogicError> {
        let key = (definition_version, model_version);
        if self.key != Some(key) {
            self.tree = build_visibility_tree(elements, model)?;
            self.key = Some(key);
        }
        Ok(&self.tree)
    }

    pub fn invalidate(&mut self) {
        self.key = None;
        self.tree.clear();
    }
}
