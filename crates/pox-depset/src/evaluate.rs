//! Collapsing conditionals against a flag environment

use crate::condition::{FlagMatch, FlagSet};
use crate::element::Element;
use crate::node::{Group, Node};

fn guard_satisfied<E: FlagSet + ?Sized>(
    restriction: &FlagMatch,
    enabled: &E,
    tristate: Option<&dyn FlagSet>,
) -> bool {
    match tristate {
        Some(filter) if !filter.contains_flag(restriction.flag()) => true,
        _ => restriction.matches(enabled),
    }
}

/// Evaluate `nodes` into `out`, splicing the payload of every satisfied
/// conditional and dropping the rest.
///
/// Groups keep their combinator. A group left empty is dropped and a group
/// left with a single child is replaced by that child.
pub(crate) fn evaluate_nodes<T: Element, E: FlagSet + ?Sized>(
    nodes: &[Node<T>],
    enabled: &E,
    tristate: Option<&dyn FlagSet>,
    out: &mut Vec<Node<T>>,
) {
    for node in nodes {
        match node {
            Node::Leaf(leaf) if leaf.is_transitive() => {
                evaluate_nodes(&leaf.transitive_conditionals(), enabled, tristate, out);
            }
            Node::Leaf(leaf) => out.push(Node::Leaf(leaf.clone())),
            Node::Group(group) => {
                let mut children = Vec::with_capacity(group.children().len());
                evaluate_nodes(group.children(), enabled, tristate, &mut children);
                match children.len() {
                    0 => log::trace!("Dropped emptied {:?} group", group.op()),
                    1 => out.extend(children),
                    _ => out.push(Node::Group(Group::new(group.op(), children))),
                }
            }
            Node::Conditional(cond) => {
                if guard_satisfied(cond.restriction(), enabled, tristate) {
                    evaluate_nodes(cond.payload(), enabled, tristate, out);
                } else {
                    log::trace!("Dropped conditional {}", cond.restriction());
                }
            }
        }
    }
}
