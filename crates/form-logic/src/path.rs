/// An element or option currently being evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    pub id: String,
    pub label: String,
}

/// Ordered list of ids on the current evaluation chain.
///
/// Never mutated in place: [`EvaluationPath::extended`] returns a copy, so
/// sibling predicates evaluated from the same parent never observe each
/// other's entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationPath {
    entries: Vec<PathEntry>,
}

impl EvaluationPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn extended(&self, id: &str, label: &str) -> Self {
        let mut entries = self.entries.clone();
        entries.push(PathEntry {
            id: id.to_string(),
            label: label.to_string(),
        });
        Self { entries }
    }

    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
