//! The leaf contract of a DepSet tree

use std::fmt;
use std::hash::Hash;
use thiserror::Error;

use crate::node::Node;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElementError {
    #[error("Element type does not support renames (\"{token} -> {rename}\")")]
    RenameUnsupported { token: String, rename: String },
}

/// A leaf value of a DepSet tree.
///
/// Only construction and rendering are required. The remaining methods are
/// optional capabilities with inert defaults:
///
/// - *transitive* leaves carry nested conditional requirements of their own and
///   expand to synthetic [`Node::Conditional`] nodes on demand
/// - *slot-locking* leaves can have their slot rewritten from the installed
///   package set when stringified in domain-aware mode
pub trait Element: Clone + Eq + Hash + fmt::Display + Sized {
    type Err: std::error::Error + Send + Sync + 'static;

    /// Build a leaf from a single token
    fn parse_element(token: &str) -> Result<Self, Self::Err>;

    /// Build a leaf from `token -> rename`
    fn parse_renamed(token: &str, rename: &str) -> Result<Self, Self::Err>;

    /// Synthetic conditional sub-structure equivalent to this leaf.
    /// Empty for leaves without nested requirements.
    fn transitive_conditionals(&self) -> Vec<Node<Self>> {
        Vec::new()
    }

    fn is_transitive(&self) -> bool {
        false
    }

    /// Whether this leaf asks for its slot to be locked to the installed one
    fn locks_slot(&self) -> bool {
        false
    }

    fn set_slot(&mut self, _slot: &str, _subslot: Option<&str>) {}
}

impl Element for String {
    type Err = ElementError;

    fn parse_element(token: &str) -> Result<Self, Self::Err> {
        Ok(token.to_string())
    }

    fn parse_renamed(token: &str, rename: &str) -> Result<Self, Self::Err> {
        Err(ElementError::RenameUnsupported {
            token: token.to_string(),
            rename: rename.to_string(),
        })
    }
}
