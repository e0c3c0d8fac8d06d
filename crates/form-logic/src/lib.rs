#![allow(missing_docs)]

pub mod check;
pub mod clean;
pub mod condition;
pub mod config;
pub mod definition;
pub mod error;
pub mod index;
pub mod options;
pub mod path;
pub mod scope;
pub mod tree;
pub mod validate;
pub mod visibility;

pub use check::{DefinitionIssue, DefinitionReport, check_definition};
pub use clean::{CleanedSubmission, clean_submission};
pub use config::{ConfigError, EngineConfig};
pub use definition::{
    ChoiceOption, ChoiceOptionAttribute, ConditionalPredicate, ElementKind, FormDefinition,
    FormElement, PredicateCondition,
};
pub use error::ConditionalLogicError;
pub use index::{ElementIndex, IndexedElement};
pub use options::{is_option_visible, visible_options};
pub use path::{EvaluationPath, PathEntry};
pub use scope::Scope;
pub use tree::{
    VisibilityAnnotation, VisibilityCache, VisibilityMap, build_visibility_tree, visible_page_ids,
};
pub use validate::{ValidationError, ValidationResult, validate_submission};
pub use visibility::{evaluate_predicate, is_element_visible};
