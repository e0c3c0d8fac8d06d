use std::collections::HashMap;

use crate::definition::element::{ElementRole, FormElement};

/// An element reachable from a scope, with the pages/sections enclosing it.
#[derive(Debug, Clone)]
pub struct IndexedElement<'a> {
    pub element: &'a FormElement,
    /// Strict page/section ancestors, outermost first.
    pub containers: Vec<&'a FormElement>,
}

/// Id lookup over an element list flattened through pages and sections.
///
/// Nested forms and repeatable sets are not descended into; their children
/// belong to their own scope.
#[derive(Debug, Clone, Default)]
pub struct ElementIndex<'a> {
    entries: Vec<IndexedElement<'a>>,
    by_id: HashMap<&'a str, usize>,
}

impl<'a> ElementIndex<'a> {
    pub fn new(elements: &'a [FormElement]) -> Self {
        let mut index = Self::default();
        index.collect(elements, &mut Vec::new());
        index
    }

    fn collect(&mut self, elements: &'a [FormElement], containers: &mut Vec<&'a FormElement>) {
        for element in elements {
            let position = self.entries.len();
            self.entries.push(IndexedElement {
                element,
                containers: containers.clone(),
            });
            // first definition wins on duplicate ids
            self.by_id.entry(element.id.as_str()).or_insert(position);

            if let ElementRole::Container(children) = element.role() {
                containers.push(element);
                self.collect(children, containers);
                containers.pop();
            }
        }
    }

    pub fn get(&self, element_id: &str) -> Option<&IndexedElement<'a>> {
        self.by_id
            .get(element_id)
            .and_then(|position| self.entries.get(*position))
    }

    /// Flattened elements in document order, containers included.
    pub fn iter(&self) -> impl Iterator<Item = &IndexedElement<'a>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
