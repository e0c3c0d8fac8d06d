use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A rule that references another element by id and states what that
/// element's submission value must hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PredicateRecord", into = "PredicateRecord")]
pub struct ConditionalPredicate {
    pub element_id: String,
    pub condition: PredicateCondition,
}

/// Match criteria of a [`ConditionalPredicate`].
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateCondition {
    /// The value selects any of the referenced options.
    Options { option_ids: Vec<String> },
    /// The element has (or lacks) a value.
    Value { has_value: bool },
    Numeric {
        operator: NumericOperator,
        operand: NumericOperand,
    },
    /// Inclusive numeric range.
    Between { min: f64, max: f64 },
    /// Evaluated inside the nested form named by `element_id`.
    Form { predicate: Box<ConditionalPredicate> },
    /// Holds when any entry of the repeatable set satisfies the inner predicate.
    RepeatableSet { predicate: Box<ConditionalPredicate> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum NumericOperator {
    #[serde(rename = "===")]
    Equal,
    #[serde(rename = "!==")]
    NotEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessThanOrEqual,
}

impl NumericOperator {
    pub fn compare(self, left: f64, right: f64) -> bool {
        match self {
            NumericOperator::Equal => left == right,
            NumericOperator::NotEqual => left != right,
            NumericOperator::GreaterThan => left > right,
            NumericOperator::GreaterThanOrEqual => left >= right,
            NumericOperator::LessThan => left < right,
            NumericOperator::LessThanOrEqual => left <= right,
        }
    }
}

/// Right-hand side of a numeric comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericOperand {
    Literal(f64),
    /// Value of another element, referenced by id.
    Element(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredicateKind {
    #[default]
    Options,
    Value,
    Numeric,
    Between,
    Form,
    #[serde(rename = "REPEATABLESET")]
    RepeatableSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompareWith {
    #[default]
    Value,
    Element,
}

/// Wire representation of a predicate as stored in form definitions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredicateRecord {
    pub element_id: String,
    #[serde(rename = "type", default)]
    pub kind: PredicateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<NumericOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_with: Option<CompareWith>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Box<PredicateRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeatable_set_predicate: Option<Box<PredicateRecord>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    #[error("predicate on element '{element_id}' is missing '{field}'")]
    MissingField {
        element_id: String,
        field: &'static str,
    },
    #[error("predicate on element '{element_id}' has a non-numeric comparison value")]
    InvalidNumericValue { element_id: String },
}

impl TryFrom<PredicateRecord> for ConditionalPredicate {
    type Error = PredicateError;

    fn try_from(record: PredicateRecord) -> Result<Self, Self::Error> {
        let missing = |field: &'static str| PredicateError::MissingField {
            element_id: record.element_id.clone(),
            field,
        };
        let condition = match record.kind {
            PredicateKind::Options => PredicateCondition::Options {
                option_ids: record.option_ids.clone().unwrap_or_default(),
            },
            PredicateKind::Value => PredicateCondition::Value {
                has_value: record.has_value.ok_or_else(|| missing("hasValue"))?,
            },
            PredicateKind::Numeric => {
                let operator = record.operator.ok_or_else(|| missing("operator"))?;
                let value = record.value.as_ref().ok_or_else(|| missing("value"))?;
                let operand = match record.compare_with.unwrap_or_default() {
                    CompareWith::Element => match value.as_str() {
                        Some(element_id) => NumericOperand::Element(element_id.to_string()),
                        None => {
                            return Err(PredicateError::InvalidNumericValue {
                                element_id: record.element_id.clone(),
                            });
                        }
                    },
                    CompareWith::Value => match crate::condition::as_number(value) {
                        Some(number) => NumericOperand::Literal(number),
                        None => {
                            return Err(PredicateError::InvalidNumericValue {
                                element_id: record.element_id.clone(),
                            });
                        }
                    },
                };
                PredicateCondition::Numeric { operator, operand }
            }
            PredicateKind::Between => PredicateCondition::Between {
                min: record.min.ok_or_else(|| missing("min"))?,
                max: record.max.ok_or_else(|| missing("max"))?,
            },
            PredicateKind::Form => {
                let inner = record.predicate.clone().ok_or_else(|| missing("predicate"))?;
                PredicateCondition::Form {
                    predicate: Box::new(ConditionalPredicate::try_from(*inner)?),
                }
            }
            PredicateKind::RepeatableSet => {
                let inner = record
                    .repeatable_set_predicate
                    .clone()
                    .ok_or_else(|| missing("repeatableSetPredicate"))?;
                PredicateCondition::RepeatableSet {
                    predicate: Box::new(ConditionalPredicate::try_from(*inner)?),
                }
            }
        };
        Ok(ConditionalPredicate {
            element_id: record.element_id,
            condition,
        })
    }
}

impl From<ConditionalPredicate> for PredicateRecord {
    fn from(predicate: ConditionalPredicate) -> Self {
        let mut record = PredicateRecord {
            element_id: predicate.element_id,
            ..Default::default()
        };
        match predicate.condition {
            PredicateCondition::Options { option_ids } => {
                record.kind = PredicateKind::Options;
                record.option_ids = Some(option_ids);
            }
            PredicateCondition::Value { has_value } => {
                record.kind = PredicateKind::Value;
                record.has_value = Some(has_value);
            }
            PredicateCondition::Numeric { operator, operand } => {
                record.kind = PredicateKind::Numeric;
                record.operator = Some(operator);
                match operand {
                    NumericOperand::Literal(number) => {
                        record.compare_with = Some(CompareWith::Value);
                        record.value = Some(serde_json::json!(number));
                    }
                    NumericOperand::Element(element_id) => {
                        record.compare_with = Some(CompareWith::Element);
                        record.value = Some(serde_json::Value::String(element_id));
                    }
                }
            }
            PredicateCondition::Between { min, max } => {
                record.kind = PredicateKind::Between;
                record.min = Some(min);
                record.max = Some(max);
            }
            PredicateCondition::Form { predicate } => {
                record.kind = PredicateKind::Form;
                record.predicate = Some(Box::new(PredicateRecord::from(*predicate)));
            }
            PredicateCondition::RepeatableSet { predicate } => {
                record.kind = PredicateKind::RepeatableSet;
                record.repeatable_set_predicate = Some(Box::new(PredicateRecord::from(*predicate)));
            }
        }
        record
    }
}

impl ConditionalPredicate {
    /// Builds an options predicate, the most common kind in form definitions.
    pub fn options(element_id: impl Into<String>, option_ids: &[&str]) -> Self {
        Self {
            element_id: element_id.into(),
            condition: PredicateCondition::Options {
                option_ids: option_ids.iter().map(|id| id.to_string()).collect(),
            },
        }
    }
}
