//! Walking a tree for the conditions that guard its leaves

use indexmap::IndexMap;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet};

use crate::condition::{Condition, FlagMatch};
use crate::element::Element;
use crate::node::Node;

enum Pending<'a, T> {
    Borrowed(&'a Node<T>),
    /// Synthetic nodes produced by expanding a transitive leaf
    Owned(Node<T>),
    /// Leaving a conditional's payload
    PopGuard,
}

/// Depth-first walk yielding each leaf with the guards enclosing it.
///
/// Groups are descended transparently, conditionals push their restriction
/// for the duration of their payload, and transitive leaves are replaced by
/// their synthetic conditional expansion. Leaves with no enclosing guard are
/// only yielded when `yield_unconditional` is set.
pub struct CondNodes<'a, T: Element> {
    pending: Vec<Pending<'a, T>>,
    guards: Vec<FlagMatch>,
    yield_unconditional: bool,
}

impl<'a, T: Element> CondNodes<'a, T> {
    pub fn new(nodes: &'a [Node<T>], yield_unconditional: bool) -> Self {
        CondNodes {
            pending: nodes.iter().rev().map(Pending::Borrowed).collect(),
            guards: Vec::new(),
            yield_unconditional,
        }
    }

    fn visit_leaf(&mut self, leaf: Cow<'a, T>) -> Option<(Cow<'a, T>, Vec<FlagMatch>)> {
        if leaf.is_transitive() {
            let expanded = leaf.transitive_conditionals();
            self.pending.extend(expanded.into_iter().rev().map(Pending::Owned));
            return None;
        }
        if self.guards.is_empty() && !self.yield_unconditional {
            return None;
        }
        Some((leaf, self.guards.clone()))
    }
}

impl<'a, T: Element> Iterator for CondNodes<'a, T> {
    type Item = (Cow<'a, T>, Vec<FlagMatch>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(item) = self.pending.pop() {
            let found = match item {
                Pending::PopGuard => {
                    self.guards.pop();
                    None
                }
                Pending::Borrowed(Node::Leaf(leaf)) => self.visit_leaf(Cow::Borrowed(leaf)),
                Pending::Borrowed(Node::Group(group)) => {
                    self.pending
                        .extend(group.children().iter().rev().map(Pending::Borrowed));
                    None
                }
                Pending::Borrowed(Node::Conditional(cond)) => {
                    self.guards.push(cond.restriction().clone());
                    self.pending.push(Pending::PopGuard);
                    self.pending
                        .extend(cond.payload().iter().rev().map(Pending::Borrowed));
                    None
                }
                Pending::Owned(Node::Leaf(leaf)) => self.visit_leaf(Cow::Owned(leaf)),
                Pending::Owned(Node::Group(group)) => {
                    self.pending
                        .extend(group.into_children().into_iter().rev().map(Pending::Owned));
                    None
                }
                Pending::Owned(Node::Conditional(cond)) => {
                    let (restriction, payload) = cond.into_parts();
                    self.guards.push(restriction);
                    self.pending.push(Pending::PopGuard);
                    self.pending
                        .extend(payload.into_iter().rev().map(Pending::Owned));
                    None
                }
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }
}

/// Map every guarded leaf to one condition per guarded path reaching it.
///
/// A leaf reachable through any unguarded path is dropped from the whole map,
/// even where it also appears under a guard elsewhere.
pub(crate) fn collect_node_conds<T: Element>(nodes: &[Node<T>]) -> IndexMap<T, Vec<Condition>> {
    let mut conds: IndexMap<T, Vec<Condition>> = IndexMap::new();
    let mut always_required: HashSet<T> = HashSet::new();

    for (leaf, guards) in CondNodes::new(nodes, true) {
        match Condition::from_guards(&guards) {
            None => {
                always_required.insert(leaf.into_owned());
            }
            Some(cond) => conds.entry(leaf.into_owned()).or_default().push(cond),
        }
    }

    conds.retain(|leaf, _| !always_required.contains(leaf));
    log::debug!(
        "Computed node conditions for {} leaves ({} always required)",
        conds.len(),
        always_required.len()
    );
    conds
}

/// Every flag guarding at least one leaf
pub(crate) fn collect_known_conditionals<T: Element>(nodes: &[Node<T>]) -> BTreeSet<String> {
    CondNodes::new(nodes, false)
        .flat_map(|(_, guards)| guards.into_iter().map(|g| g.flag().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::depset::DepSet;

    fn depset(s: &str) -> DepSet<String> {
        DepSet::parse(s).unwrap()
    }

    fn walk(s: &str, yield_unconditional: bool) -> Vec<(String, String)> {
        let d = depset(s);
        CondNodes::new(d.restrictions(), yield_unconditional)
            .map(|(leaf, guards)| {
                let guards: Vec<String> = guards.iter().map(|g| g.to_string()).collect();
                (leaf.into_owned(), guards.join(" "))
            })
            .collect()
    }

    #[test]
    fn test_walk_yields_guarded_leaves() {
        assert_eq!(
            walk("a x? ( b !y? ( c ) ) || ( d z? ( e ) )", false),
            vec![
                ("b".to_string(), "x?".to_string()),
                ("c".to_string(), "x? !y?".to_string()),
                ("e".to_string(), "z?".to_string()),
            ]
        );
    }

    #[test]
    fn test_walk_with_unconditional() {
        let walked = walk("a x? ( b ) c", true);
        assert_eq!(
            walked,
            vec![
                ("a".to_string(), String::new()),
                ("b".to_string(), "x?".to_string()),
                ("c".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_walk_is_restartable() {
        let d = depset("x? ( a b )");
        let first: Vec<_> = CondNodes::new(d.restrictions(), false).collect();
        let second: Vec<_> = CondNodes::new(d.restrictions(), false).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_node_conds_paths() {
        let d = depset("x? ( a y? ( a ) ) !z? ( b )");
        let conds = collect_node_conds(d.restrictions());
        assert_eq!(
            conds.get("a").unwrap(),
            &vec![
                Condition::Flag(FlagMatch::new("x", false)),
                Condition::All(vec![FlagMatch::new("x", false), FlagMatch::new("y", false)]),
            ]
        );
        assert_eq!(conds.get("b").unwrap(), &vec![Condition::Flag(FlagMatch::new("z", true))]);
    }

    #[test]
    fn test_node_conds_global_exclusion() {
        let d = depset("x? ( a b ) || ( a c )");
        let conds = collect_node_conds(d.restrictions());
        assert!(!conds.contains_key("a"));
        assert!(conds.contains_key("b"));
        assert!(!conds.contains_key("c"));
    }

    #[test]
    fn test_known_conditionals() {
        let d = depset("a x? ( b !y? ( c ) ) z? ( a )");
        let known = collect_known_conditionals(d.restrictions());
        assert_eq!(
            known.into_iter().collect::<Vec<_>>(),
            vec!["x".to_string(), "y".to_string(), "z".to_string()]
        );
    }

    #[test]
    fn test_transitive_leaves_are_inlined() {
        let d = DepSet::<Atom>::parse("c/d a/b[x?]").unwrap();
        let walked: Vec<(String, String)> = CondNodes::new(d.restrictions(), true)
            .map(|(leaf, guards)| {
                let guards: Vec<String> = guards.iter().map(|g| g.to_string()).collect();
                (leaf.to_string(), guards.join(" "))
            })
            .collect();
        assert_eq!(
            walked,
            vec![
                ("c/d".to_string(), String::new()),
                ("a/b[x]".to_string(), "x?".to_string()),
                ("a/b".to_string(), "!x?".to_string()),
            ]
        );
        let known = collect_known_conditionals(d.restrictions());
        assert!(known.contains("x"));
    }
}
