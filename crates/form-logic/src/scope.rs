use serde_json::Value;

use crate::definition::element::FormElement;
use crate::index::{ElementIndex, IndexedElement};

/// Model used for scopes that have no backing object, such as repeatable
/// set entries that are not JSON objects.
pub(crate) static EMPTY_MODEL: Value = Value::Null;

/// Sibling elements in scope, the submission object backing them and the
/// enclosing scope used when a predicate reaches outside.
///
/// Scopes are built per evaluation pass and only borrow their inputs.
#[derive(Debug)]
pub struct Scope<'a> {
    elements: &'a [FormElement],
    index: ElementIndex<'a>,
    model: &'a Value,
    parent: Option<&'a Scope<'a>>,
}

impl<'a> Scope<'a> {
    /// Root scope over a top-level element list.
    pub fn new(elements: &'a [FormElement], model: &'a Value) -> Self {
        Self {
            elements,
            index: ElementIndex::new(elements),
            model,
            parent: None,
        }
    }

    /// Scope for a nested form or repeatable set entry, chained to `self`.
    pub fn child<'s>(&'s self, elements: &'s [FormElement], model: &'s Value) -> Scope<'s> {
        Scope {
            elements,
            index: ElementIndex::new(elements),
            model,
            parent: Some(self),
        }
    }

    pub fn elements(&self) -> &'a [FormElement] {
        self.elements
    }

    pub fn model(&self) -> &'a Value {
        self.model
    }

    pub fn parent(&self) -> Option<&'a Scope<'a>> {
        self.parent
    }

    pub fn index(&self) -> &ElementIndex<'a> {
        &self.index
    }

    /// Submission value stored under the element's name in this scope.
    pub fn value_of(&self, element: &FormElement) -> Option<&'a Value> {
        self.model.get(element.name.as_str())
    }

    /// Finds an element by id in this scope or the nearest enclosing scope
    /// that defines it, returning that scope along with the element.
    pub fn resolve<'s>(&'s self, element_id: &str) -> Option<(&'s Scope<'a>, &'s IndexedElement<'a>)> {
        let mut scope = self;
        loop {
            if let Some(entry) = scope.index.get(element_id) {
                return Some((scope, entry));
            }
            scope = scope.parent?;
        }
    }
}
