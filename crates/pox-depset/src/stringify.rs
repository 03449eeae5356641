//! Canonical text rendering of DepSet trees

use crate::domain::LivePackages;
use crate::element::Element;
use crate::node::{BoolOp, Node};

/// Render `nodes` space separated, formatting leaves with `func`.
///
/// Nesting mirrors the tree exactly; nothing is re-collapsed here.
pub fn stringify_nodes<T, F: FnMut(&T) -> String>(nodes: &[Node<T>], mut func: F) -> String {
    let mut out: Vec<String> = Vec::new();
    for node in nodes {
        visit(node, &mut func, &mut out);
    }
    out.join(" ")
}

fn visit<T, F: FnMut(&T) -> String>(node: &Node<T>, func: &mut F, out: &mut Vec<String>) {
    let children = match node {
        Node::Leaf(leaf) => {
            out.push(func(leaf));
            return;
        }
        Node::Group(group) => {
            out.push(match group.op() {
                BoolOp::And => "(".to_string(),
                op => format!("{} (", op),
            });
            group.children()
        }
        Node::Conditional(cond) => {
            out.push(format!("{} (", cond.restriction()));
            cond.payload()
        }
    };
    for child in children {
        visit(child, func, out);
    }
    out.push(")".to_string());
}

/// Rewrite the slot of every slot-locking leaf from its best installed match.
/// Returns the number of leaves rewritten.
pub(crate) fn lock_slots<T, D>(nodes: &mut [Node<T>], domain: &D) -> Result<usize, D::Error>
where
    T: Element,
    D: LivePackages<T> + ?Sized,
{
    let mut locked = 0;
    for node in nodes {
        locked += match node {
            Node::Leaf(leaf) if leaf.locks_slot() => {
                let installed = domain.best_match(leaf)?;
                log::debug!(
                    "Locking {} to slot {}{}",
                    leaf,
                    installed.slot,
                    installed.subslot.as_deref().map(|s| format!("/{}", s)).unwrap_or_default()
                );
                leaf.set_slot(&installed.slot, installed.subslot.as_deref());
                1
            }
            Node::Leaf(_) => 0,
            Node::Group(group) => lock_slots(group.children_mut(), domain)?,
            Node::Conditional(cond) => lock_slots(cond.payload_mut(), domain)?,
        };
    }
    Ok(locked)
}
