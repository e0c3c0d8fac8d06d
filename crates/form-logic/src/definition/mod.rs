pub mod element;
pub mod form;
pub mod predicate;

pub use element::{
    ChoiceConfig, ChoiceOption, ChoiceOptionAttribute, ElementKind, ElementList, ElementRole,
    FormElement, NumberRules, RepeatableSetConfig, TextRules,
};
pub use form::FormDefinition;
pub use predicate::{
    CompareWith, ConditionalPredicate, NumericOperand, NumericOperator, PredicateCondition,
    PredicateError, PredicateKind, PredicateRecord,
};
