use std::collections::{BTreeMap, BTreeSet, HashMap};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::definition::element::{ElementRole, FormElement};
use crate::definition::form::walk_elements;
use crate::definition::predicate::{ConditionalPredicate, NumericOperand, PredicateCondition};

/// A structural problem found in a form definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefinitionIssue {
    DuplicateId {
        element_id: String,
    },
    /// A predicate or option attribute names an element that does not exist.
    UnknownReference {
        element_id: String,
        referenced_id: String,
    },
    /// Element visibility depends on itself.
    CircularElementLogic {
        element_id: String,
        label: String,
    },
    /// Option visibility depends on itself.
    CircularOptionLogic {
        element_id: String,
        option_id: String,
        label: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DefinitionReport {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DefinitionIssue>,
}

/// Checks a definition without any submission.
///
/// Cycles are found over the static dependency graph: an element depends on
/// the targets of its predicates and on the pages/sections enclosing those
/// targets, mirroring what runtime evaluation visits.
pub fn check_definition(elements: &[FormElement]) -> DefinitionReport {
    let mut issues = Vec::new();

    let mut all: Vec<&FormElement> = Vec::new();
    walk_elements(elements, &mut |element| all.push(element));

    let mut seen = BTreeSet::new();
    let mut by_id: HashMap<&str, &FormElement> = HashMap::new();
    for &element in &all {
        if !seen.insert(element.id.as_str()) {
            issues.push(DefinitionIssue::DuplicateId {
                element_id: element.id.clone(),
            });
        }
        by_id.entry(element.id.as_str()).or_insert(element);
    }

    for &element in &all {
        for predicate in &element.conditionally_show_predicates {
            let mut referenced = Vec::new();
            predicate_references(predicate, &mut referenced);
            for referenced_id in referenced {
                if !by_id.contains_key(referenced_id) {
                    issues.push(DefinitionIssue::UnknownReference {
                        element_id: element.id.clone(),
                        referenced_id: referenced_id.to_string(),
                    });
                }
            }
        }
        let Some(choices) = element.kind.choices() else {
            continue;
        };
        for option in &choices.options {
            for attribute in &option.attributes {
                if !by_id.contains_key(attribute.element_id.as_str()) {
                    issues.push(DefinitionIssue::UnknownReference {
                        element_id: element.id.clone(),
                        referenced_id: attribute.element_id.clone(),
                    });
                }
            }
        }
    }

    let mut containers = HashMap::new();
    collect_containers(elements, &mut Vec::new(), &mut containers);
    let element_graph = element_dependencies(&all, &containers);
    for element_id in find_cycles(&element_graph) {
        if let Some(element) = by_id.get(element_id) {
            issues.push(DefinitionIssue::CircularElementLogic {
                element_id: element.id.clone(),
                label: element.display_label().to_string(),
            });
        }
    }

    let (option_graph, option_owners) = option_dependencies(&all, &by_id);
    for option_id in find_cycles(&option_graph) {
        if let Some((element, label)) = option_owners.get(option_id) {
            issues.push(DefinitionIssue::CircularOptionLogic {
                element_id: element.to_string(),
                option_id: option_id.to_string(),
                label: label.to_string(),
            });
        }
    }

    DefinitionReport {
        valid: issues.is_empty(),
        issues,
    }
}

fn predicate_targets<'a>(predicate: &'a ConditionalPredicate, out: &mut Vec<&'a str>) {
    out.push(&predicate.element_id);
    match &predicate.condition {
        PredicateCondition::Form { predicate } | PredicateCondition::RepeatableSet { predicate } => {
            predicate_targets(predicate, out)
        }
        _ => {}
    }
}

/// Every element id a predicate reads, including element operands of numeric
/// comparisons. Operands are read by value only, so they are not graph edges.
fn predicate_references<'a>(predicate: &'a ConditionalPredicate, out: &mut Vec<&'a str>) {
    out.push(&predicate.element_id);
    match &predicate.condition {
        PredicateCondition::Numeric {
            operand: NumericOperand::Element(other_id),
            ..
        } => out.push(other_id),
        PredicateCondition::Form { predicate } | PredicateCondition::RepeatableSet { predicate } => {
            predicate_references(predicate, out)
        }
        _ => {}
    }
}

/// Maps each element id to the page/section ids enclosing it within its scope.
fn collect_containers<'a>(
    elements: &'a [FormElement],
    stack: &mut Vec<&'a str>,
    out: &mut HashMap<&'a str, Vec<&'a str>>,
) {
    for element in elements {
        out.entry(element.id.as_str()).or_insert_with(|| stack.clone());
        match element.role() {
            ElementRole::Container(children) => {
                stack.push(&element.id);
                collect_containers(children, stack, out);
                stack.pop();
            }
            ElementRole::NestedForm(children) | ElementRole::RepeatableSet(children) => {
                collect_containers(children, &mut Vec::new(), out);
            }
            _ => {}
        }
    }
}

fn element_dependencies<'a>(
    all: &[&'a FormElement],
    containers: &HashMap<&'a str, Vec<&'a str>>,
) -> BTreeMap<&'a str, Vec<&'a str>> {
    let mut graph = BTreeMap::new();
    for &element in all {
        if !element.conditionally_show {
            continue;
        }
        let mut edges = Vec::new();
        for predicate in &element.conditionally_show_predicates {
            let mut targets = Vec::new();
            predicate_targets(predicate, &mut targets);
            for target in targets {
                edges.push(target);
                if let Some(enclosing) = containers.get(target) {
                    edges.extend(enclosing.iter().copied());
                }
            }
        }
        graph.insert(element.id.as_str(), edges);
    }
    graph
}

type OptionOwners<'a> = HashMap<&'a str, (&'a str, &'a str)>;

fn option_dependencies<'a>(
    all: &[&'a FormElement],
    by_id: &HashMap<&'a str, &'a FormElement>,
) -> (BTreeMap<&'a str, Vec<&'a str>>, OptionOwners<'a>) {
    let mut graph = BTreeMap::new();
    let mut owners = HashMap::new();
    for &element in all {
        let Some(choices) = element.kind.choices() else {
            continue;
        };
        for option in &choices.options {
            owners.insert(option.id.as_str(), (element.id.as_str(), option.label.as_str()));
            if !choices.conditionally_show_options {
                continue;
            }
            let mut edges = Vec::new();
            for attribute in &option.attributes {
                let Some(&target) = by_id.get(attribute.element_id.as_str()) else {
                    continue;
                };
                edges.extend(
                    attribute
                        .option_ids
                        .iter()
                        .filter_map(|option_id| target.option(option_id))
                        .map(|referenced| referenced.id.as_str()),
                );
            }
            graph.insert(option.id.as_str(), edges);
        }
    }
    (graph, owners)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Nodes at which a back edge closes a cycle, each reported once.
fn find_cycles<'a>(graph: &BTreeMap<&'a str, Vec<&'a str>>) -> Vec<&'a str> {
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut closing = BTreeSet::new();
    for &node in graph.keys() {
        visit(node, graph, &mut marks, &mut closing);
    }
    closing.into_iter().collect()
}

fn visit<'a>(
    node: &'a str,
    graph: &BTreeMap<&'a str, Vec<&'a str>>,
    marks: &mut HashMap<&'a str, Mark>,
    closing: &mut BTreeSet<&'a str>,
) {
    match marks.get(node) {
        Some(Mark::Done) => return,
        Some(Mark::Visiting) => {
            closing.insert(node);
            return;
        }
        None => {}
    }
    marks.insert(node, Mark::Visiting);
    if let Some(edges) = graph.get(node) {
        for &next in edges {
            visit(next, graph, marks, closing);
        }
    }
    marks.insert(node, Mark::Done);
}
