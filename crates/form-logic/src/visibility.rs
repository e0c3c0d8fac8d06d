use serde_json::Value;
use tracing::{debug, trace};

use crate::condition::{self, as_number};
use crate::definition::element::{ElementRole, FormElement};
use crate::definition::predicate::{ConditionalPredicate, NumericOperand, PredicateCondition};
use crate::error::ConditionalLogicError;
use crate::index::IndexedElement;
use crate::path::EvaluationPath;
use crate::scope::Scope;

/// Decides whether `element` is shown given the submission in `scope`.
///
/// Elements without conditional logic are always shown. Predicates are
/// combined with AND when `requiresAllConditionallyShowPredicates` is set and
/// with OR otherwise. Returns [`ConditionalLogicError::ElementCycle`] when the
/// element is reached again through its own predicate chain.
pub fn is_element_visible(
    scope: &Scope<'_>,
    element: &FormElement,
    path: &EvaluationPath,
) -> Result<bool, ConditionalLogicError> {
    if !element.conditionally_show || element.conditionally_show_predicates.is_empty() {
        return Ok(true);
    }

    if path.contains(&element.id) {
        debug!(element_id = %element.id, depth = path.len(), "circular conditional logic");
        return Err(ConditionalLogicError::ElementCycle {
            element_id: element.id.clone(),
            label: element.display_label().to_string(),
        });
    }

    let path = path.extended(&element.id, element.display_label());
    let predicates = &element.conditionally_show_predicates;

    if element.requires_all_conditionally_show_predicates {
        for predicate in predicates {
            if !evaluate_predicate(scope, predicate, &path)? {
                return Ok(false);
            }
        }
        Ok(true)
    } else {
        for predicate in predicates {
            if evaluate_predicate(scope, predicate, &path)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Evaluates one predicate, resolving its target through the scope chain.
///
/// A target that cannot be found, sits in a hidden page or section, or is
/// itself hidden never satisfies the predicate.
pub fn evaluate_predicate(
    scope: &Scope<'_>,
    predicate: &ConditionalPredicate,
    path: &EvaluationPath,
) -> Result<bool, ConditionalLogicError> {
    let Some((owner, entry)) = scope.resolve(&predicate.element_id) else {
        debug!(element_id = %predicate.element_id, "predicate references an unknown element");
        return Ok(false);
    };

    if !is_indexed_element_shown(owner, entry, path)? {
        trace!(element_id = %predicate.element_id, "predicate target is hidden");
        return Ok(false);
    }

    let satisfied = evaluate_condition(scope, owner, entry.element, &predicate.condition, path)?;
    trace!(element_id = %predicate.element_id, satisfied, "predicate evaluated");
    Ok(satisfied)
}

/// Visibility of an indexed element including every page/section around it.
pub(crate) fn is_indexed_element_shown(
    owner: &Scope<'_>,
    entry: &IndexedElement<'_>,
    path: &EvaluationPath,
) -> Result<bool, ConditionalLogicError> {
    for container in entry.containers.iter().rev() {
        if !is_element_visible(owner, container, path)? {
            return Ok(false);
        }
    }
    is_element_visible(owner, entry.element, path)
}

/// `owner` is the scope the target was found in; `scope` is where the
/// predicate itself is evaluated and resolves any second element operand.
fn evaluate_condition(
    scope: &Scope<'_>,
    owner: &Scope<'_>,
    element: &FormElement,
    condition: &PredicateCondition,
    path: &EvaluationPath,
) -> Result<bool, ConditionalLogicError> {
    let value = owner.value_of(element);

    match condition {
        PredicateCondition::Form { predicate } => {
            let ElementRole::NestedForm(children) = element.role() else {
                return Ok(false);
            };
            let Some(nested) = value.filter(|value| value.is_object()) else {
                return Ok(false);
            };
            let nested_scope = owner.child(children, nested);
            evaluate_predicate(&nested_scope, predicate, path)
        }
        PredicateCondition::RepeatableSet { predicate } => {
            let ElementRole::RepeatableSet(children) = element.role() else {
                return Ok(false);
            };
            let Some(entries) = value.and_then(Value::as_array) else {
                return Ok(false);
            };
            for entry in entries {
                let entry_scope = owner.child(children, entry);
                if evaluate_predicate(&entry_scope, predicate, path)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        PredicateCondition::Numeric {
            operator,
            operand: NumericOperand::Element(other_id),
        } => {
            let Some(left) = value.and_then(as_number) else {
                return Ok(false);
            };
            let right = scope
                .resolve(other_id)
                .and_then(|(other_scope, other)| other_scope.value_of(other.element))
                .and_then(as_number);
            Ok(right.is_some_and(|right| operator.compare(left, right)))
        }
        _ => Ok(condition::matches(element, value, condition)),
    }
}
