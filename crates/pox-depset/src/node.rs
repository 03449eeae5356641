//! Tree nodes of a parsed DepSet

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::condition::FlagMatch;

/// Combinator of a group node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoolOp {
    /// Implicit conjunction, written as a bare `( ... )`
    And,
    /// `|| ( ... )`
    Or,
    /// `^^ ( ... )`
    ExactlyOneOf,
    /// `?? ( ... )`
    AtMostOneOf,
}

impl BoolOp {
    /// The operator token as written in a DepSet string
    pub fn token(&self) -> &'static str {
        match self {
            BoolOp::And => "",
            BoolOp::Or => "||",
            BoolOp::ExactlyOneOf => "^^",
            BoolOp::AtMostOneOf => "??",
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// One node of a DepSet tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node<T> {
    Leaf(T),
    Group(Group<T>),
    Conditional(Conditional<T>),
}

impl<T> Node<T> {
    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn is_conditional(&self) -> bool {
        matches!(self, Node::Conditional(_))
    }

    /// Direct children, empty for leaves
    pub fn children(&self) -> &[Node<T>] {
        match self {
            Node::Leaf(_) => &[],
            Node::Group(group) => &group.children,
            Node::Conditional(cond) => &cond.payload,
        }
    }
}

/// Two or more children joined by a combinator
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Group<T> {
    op: BoolOp,
    children: Vec<Node<T>>,
}

impl<T> Group<T> {
    pub(crate) fn new(op: BoolOp, children: Vec<Node<T>>) -> Self {
        debug_assert!(!children.is_empty());
        Group { op, children }
    }

    pub fn op(&self) -> BoolOp {
        self.op
    }

    pub fn children(&self) -> &[Node<T>] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Node<T>] {
        &mut self.children
    }

    pub(crate) fn into_children(self) -> Vec<Node<T>> {
        self.children
    }
}

/// `flag? ( ... )` or `!flag? ( ... )`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Conditional<T> {
    restriction: FlagMatch,
    payload: Vec<Node<T>>,
}

impl<T> Conditional<T> {
    /// Build a conditional node. Returns `None` for an empty payload.
    pub fn new(restriction: FlagMatch, payload: Vec<Node<T>>) -> Option<Self> {
        if payload.is_empty() {
            return None;
        }
        Some(Conditional {
            restriction,
            payload,
        })
    }

    /// Payload must be non-empty
    pub(crate) fn from_parts(restriction: FlagMatch, payload: Vec<Node<T>>) -> Self {
        debug_assert!(!payload.is_empty());
        Conditional {
            restriction,
            payload,
        }
    }

    pub fn restriction(&self) -> &FlagMatch {
        &self.restriction
    }

    pub fn payload(&self) -> &[Node<T>] {
        &self.payload
    }

    pub(crate) fn payload_mut(&mut self) -> &mut [Node<T>] {
        &mut self.payload
    }

    pub(crate) fn into_parts(self) -> (FlagMatch, Vec<Node<T>>) {
        (self.restriction, self.payload)
    }
}
