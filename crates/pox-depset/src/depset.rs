//! The parsed DepSet value and its cached views

use indexmap::IndexMap;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;
use std::sync::OnceLock;

use crate::condition::{Condition, FlagSet};
use crate::conditions::{collect_known_conditionals, collect_node_conds, CondNodes};
use crate::domain::LivePackages;
use crate::element::Element;
use crate::error::{ElementCause, ParseError};
use crate::evaluate::evaluate_nodes;
use crate::node::Node;
use crate::parser::{parse_depset, ParseOptions};
use crate::stringify::{lock_slots, stringify_nodes};

/// A parsed dependency expression.
///
/// The tree itself is immutable. `node_conds` and `known_conditionals` are
/// computed on first access and cached for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct DepSet<T: Element> {
    restrictions: Vec<Node<T>>,
    /// Whether any conditional node or transitive leaf was seen while parsing
    conditional: bool,
    node_conds: OnceLock<IndexMap<T, Vec<Condition>>>,
    known_conditionals: OnceLock<BTreeSet<String>>,
}

impl<T: Element> DepSet<T> {
    pub(crate) fn from_parts(restrictions: Vec<Node<T>>, conditional: bool) -> Self {
        DepSet {
            restrictions,
            conditional,
            node_conds: OnceLock::new(),
            known_conditionals: OnceLock::new(),
        }
    }

    /// Parse with the default options, building leaves with [`Element::parse_element`]
    pub fn parse(dep_str: &str) -> Result<Self, ParseError> {
        Self::parse_with_options(dep_str, &ParseOptions::default())
    }

    pub fn parse_with_options(dep_str: &str, options: &ParseOptions) -> Result<Self, ParseError> {
        parse_depset(dep_str, options, |token, rename| match rename {
            Some(rename) => T::parse_renamed(token, rename),
            None => T::parse_element(token),
        })
    }

    /// Parse with a caller-supplied leaf constructor. The second argument is
    /// the rename target when `token -> rename` was parsed.
    pub fn parse_with<F, E>(dep_str: &str, options: &ParseOptions, element_func: F) -> Result<Self, ParseError>
    where
        F: FnMut(&str, Option<&str>) -> Result<T, E>,
        E: Into<ElementCause>,
    {
        parse_depset(dep_str, options, element_func)
    }

    /// Top-level nodes, implicitly ANDed
    pub fn restrictions(&self) -> &[Node<T>] {
        &self.restrictions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node<T>> {
        self.restrictions.iter()
    }

    pub fn len(&self) -> usize {
        self.restrictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restrictions.is_empty()
    }

    /// True when at least one leaf is only required under some condition
    pub fn has_conditionals(&self) -> bool {
        !self.node_conds().is_empty()
    }

    /// Guarded leaves and the conditions under which each is required
    pub fn node_conds(&self) -> &IndexMap<T, Vec<Condition>> {
        self.node_conds.get_or_init(|| {
            if self.conditional {
                collect_node_conds(&self.restrictions)
            } else {
                IndexMap::new()
            }
        })
    }

    /// Every flag name that guards some leaf
    pub fn known_conditionals(&self) -> &BTreeSet<String> {
        self.known_conditionals.get_or_init(|| {
            if self.conditional {
                collect_known_conditionals(&self.restrictions)
            } else {
                BTreeSet::new()
            }
        })
    }

    /// Walk leaves together with their enclosing guards
    pub fn cond_nodes(&self, yield_unconditional: bool) -> CondNodes<'_, T> {
        CondNodes::new(&self.restrictions, yield_unconditional)
    }

    /// Resolve every conditional against `enabled`.
    ///
    /// Flags outside `tristate`, when one is given, count as satisfied no
    /// matter their negation. A DepSet without conditionals is returned as is.
    pub fn evaluate_depset<E: FlagSet + ?Sized>(
        &self,
        enabled: &E,
        tristate: Option<&dyn FlagSet>,
    ) -> Cow<'_, Self> {
        if !self.conditional {
            return Cow::Borrowed(self);
        }
        let mut results = Vec::new();
        evaluate_nodes(&self.restrictions, enabled, tristate, &mut results);
        log::debug!(
            "Evaluated depset: {} -> {} top-level nodes",
            self.restrictions.len(),
            results.len()
        );
        Cow::Owned(DepSet::from_parts(results, false))
    }

    /// Render with a custom leaf formatter
    pub fn to_string_with<F: FnMut(&T) -> String>(&self, func: F) -> String {
        stringify_nodes(&self.restrictions, func)
    }

    /// Render after locking every `:=` leaf to the slot of its best installed
    /// match. The matched leaves are rewritten in place, in traversal order,
    /// and stay rewritten even when a later lookup fails.
    pub fn slotdep_str<D: LivePackages<T> + ?Sized>(&mut self, domain: &D) -> Result<String, D::Error> {
        self.slotdep_str_with(domain, |leaf: &T| leaf.to_string())
    }

    /// [`slotdep_str`](Self::slotdep_str) with a custom leaf formatter
    pub fn slotdep_str_with<D, F>(&mut self, domain: &D, func: F) -> Result<String, D::Error>
    where
        D: LivePackages<T> + ?Sized,
        F: FnMut(&T) -> String,
    {
        self.node_conds.take();
        self.known_conditionals.take();
        let locked = lock_slots(&mut self.restrictions, domain)?;
        log::debug!("Locked {} slot dependencies", locked);
        Ok(self.to_string_with(func))
    }
}

impl<T: Element> Default for DepSet<T> {
    fn default() -> Self {
        DepSet::from_parts(Vec::new(), false)
    }
}

impl<T: Element> PartialEq for DepSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.restrictions == other.restrictions
    }
}

impl<T: Element> Eq for DepSet<T> {}

impl<T: Element> Hash for DepSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.restrictions.hash(state);
    }
}

impl<T: Element> Index<usize> for DepSet<T> {
    type Output = Node<T>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.restrictions[index]
    }
}

impl<'a, T: Element> IntoIterator for &'a DepSet<T> {
    type Item = &'a Node<T>;
    type IntoIter = std::slice::Iter<'a, Node<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.restrictions.iter()
    }
}

impl<T: Element> fmt::Display for DepSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", stringify_nodes(&self.restrictions, |leaf: &T| leaf.to_string()))
    }
}
