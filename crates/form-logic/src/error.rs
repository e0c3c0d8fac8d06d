use thiserror::Error;

/// Fatal misconfiguration detected while evaluating conditional logic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionalLogicError {
    #[error(
        "you cannot configure an element to be conditionally shown based on itself or on elements that are conditionally shown based on it; check the conditional logic on element \"{label}\""
    )]
    ElementCycle { element_id: String, label: String },
    #[error(
        "you cannot configure an option to be conditionally shown based on itself or on options that are conditionally shown based on it; check the conditional logic on option \"{option_label}\" of element \"{element_label}\""
    )]
    OptionCycle {
        option_id: String,
        option_label: String,
        element_label: String,
    },
}

impl ConditionalLogicError {
    /// Id of the element or option whose predicates closed the loop.
    pub fn offending_id(&self) -> &str {
        match self {
            ConditionalLogicError::ElementCycle { element_id, .. } => element_id,
            ConditionalLogicError::OptionCycle { option_id, .. } => option_id,
        }
    }
}
