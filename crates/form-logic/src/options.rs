use serde_json::Value;
use tracing::{debug, trace};

use crate::condition::{has_selection, selects_any};
use crate::definition::element::{ChoiceOption, ChoiceOptionAttribute, FormElement};
use crate::error::ConditionalLogicError;
use crate::path::EvaluationPath;
use crate::scope::Scope;
use crate::visibility::is_indexed_element_shown;

/// An option attribute whose target element can currently drive the option.
struct Candidate<'s, 'a> {
    attribute: &'s ChoiceOptionAttribute,
    owner: &'s Scope<'a>,
    target: &'a FormElement,
    value: &'a Value,
}

/// Decides whether a single option of a choice element is offered.
///
/// Options are shown when the element does not use option-level logic, when
/// the option has no attributes, or when none of its attributes can be
/// evaluated yet. Otherwise any satisfied attribute shows the option. Cycles
/// are tracked by option id in `path`, independently of element cycles.
pub fn is_option_visible(
    scope: &Scope<'_>,
    element: &FormElement,
    option: &ChoiceOption,
    path: &EvaluationPath,
) -> Result<bool, ConditionalLogicError> {
    let uses_option_logic = element
        .kind
        .choices()
        .is_some_and(|choices| choices.conditionally_show_options);
    if !uses_option_logic || option.attributes.is_empty() {
        return Ok(true);
    }

    if path.contains(&option.id) {
        debug!(option_id = %option.id, element_id = %element.id, "circular option logic");
        return Err(ConditionalLogicError::OptionCycle {
            option_id: option.id.clone(),
            option_label: option.label.clone(),
            element_label: element.display_label().to_string(),
        });
    }
    let path = path.extended(&option.id, &option.label);

    let candidates = candidate_attributes(scope, option)?;
    if candidates.is_empty() {
        trace!(option_id = %option.id, "no attribute can be evaluated, showing option");
        return Ok(true);
    }

    for candidate in &candidates {
        if attribute_satisfied(candidate, &path)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Options of `element` that are currently offered, in declaration order.
pub fn visible_options<'e>(
    scope: &Scope<'_>,
    element: &'e FormElement,
) -> Result<Vec<&'e ChoiceOption>, ConditionalLogicError> {
    let Some(choices) = element.kind.choices() else {
        return Ok(Vec::new());
    };
    let mut visible = Vec::with_capacity(choices.options.len());
    for option in &choices.options {
        if is_option_visible(scope, element, option, &EvaluationPath::new())? {
            visible.push(option);
        }
    }
    Ok(visible)
}

fn candidate_attributes<'s, 'a>(
    scope: &'s Scope<'a>,
    option: &'s ChoiceOption,
) -> Result<Vec<Candidate<'s, 'a>>, ConditionalLogicError> {
    let mut candidates = Vec::new();
    for attribute in &option.attributes {
        let Some((owner, entry)) = scope.resolve(&attribute.element_id) else {
            debug!(element_id = %attribute.element_id, "option attribute references an unknown element");
            continue;
        };
        if entry.element.is_container() {
            continue;
        }
        // element cycles are tracked separately from option cycles
        if !is_indexed_element_shown(owner, entry, &EvaluationPath::new())? {
            continue;
        }
        let value = owner.value_of(entry.element);
        if !has_selection(value) {
            continue;
        }
        if let Some(value) = value {
            candidates.push(Candidate {
                attribute,
                owner,
                target: entry.element,
                value,
            });
        }
    }
    Ok(candidates)
}

/// Every referenced option that exists on the target must itself be
/// offered, and the target's value must select one of them.
fn attribute_satisfied(
    candidate: &Candidate<'_, '_>,
    path: &EvaluationPath,
) -> Result<bool, ConditionalLogicError> {
    for option_id in &candidate.attribute.option_ids {
        if let Some(referenced) = candidate.target.option(option_id)
            && !is_option_visible(candidate.owner, candidate.target, referenced, path)?
        {
            return Ok(false);
        }
    }
    Ok(selects_any(
        candidate.target,
        Some(candidate.value),
        &candidate.attribute.option_ids,
    ))
}
