//! Flag-match conditions and the flag environments they are tested against

use indexmap::IndexSet;
use std::borrow::Borrow;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::Hash;

/// A set of enabled flags that conditions are evaluated against
pub trait FlagSet {
    /// Check whether `flag` is enabled
    fn contains_flag(&self, flag: &str) -> bool;
}

impl<S: Borrow<str> + Hash + Eq> FlagSet for HashSet<S> {
    fn contains_flag(&self, flag: &str) -> bool {
        self.contains(flag)
    }
}

impl<S: Borrow<str> + Ord> FlagSet for BTreeSet<S> {
    fn contains_flag(&self, flag: &str) -> bool {
        self.contains(flag)
    }
}

impl<S: Borrow<str> + Hash + Eq> FlagSet for IndexSet<S> {
    fn contains_flag(&self, flag: &str) -> bool {
        self.contains(flag)
    }
}

impl<S: AsRef<str>> FlagSet for [S] {
    fn contains_flag(&self, flag: &str) -> bool {
        self.iter().any(|s| s.as_ref() == flag)
    }
}

impl<S: AsRef<str>> FlagSet for Vec<S> {
    fn contains_flag(&self, flag: &str) -> bool {
        self.as_slice().contains_flag(flag)
    }
}

impl<S: AsRef<str>, const N: usize> FlagSet for [S; N] {
    fn contains_flag(&self, flag: &str) -> bool {
        self.as_slice().contains_flag(flag)
    }
}

impl<T: FlagSet + ?Sized> FlagSet for &T {
    fn contains_flag(&self, flag: &str) -> bool {
        (**self).contains_flag(flag)
    }
}

/// A single flag requirement, `flag` or `!flag`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlagMatch {
    flag: String,
    negate: bool,
}

impl FlagMatch {
    pub fn new(flag: impl Into<String>, negate: bool) -> Self {
        FlagMatch {
            flag: flag.into(),
            negate,
        }
    }

    /// Build from a conditional tag such as `foo?` or `!foo?`
    pub(crate) fn from_tag(tag: &str) -> Option<Self> {
        let body = tag.strip_suffix('?')?;
        let (flag, negate) = match body.strip_prefix('!') {
            Some(flag) => (flag, true),
            None => (body, false),
        };
        if flag.is_empty() || flag.contains('?') {
            return None;
        }
        Some(FlagMatch::new(flag, negate))
    }

    pub fn flag(&self) -> &str {
        &self.flag
    }

    pub fn is_negated(&self) -> bool {
        self.negate
    }

    /// Test this requirement against an environment
    pub fn matches<E: FlagSet + ?Sized>(&self, enabled: &E) -> bool {
        enabled.contains_flag(&self.flag) != self.negate
    }

    /// Combine with another requirement; both must hold
    pub fn and(self, other: FlagMatch) -> Condition {
        Condition::All(vec![self, other])
    }
}

impl fmt::Display for FlagMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negate {
            write!(f, "!{}?", self.flag)
        } else {
            write!(f, "{}?", self.flag)
        }
    }
}

/// The condition under which a leaf is reachable along one path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    Flag(FlagMatch),
    /// All of the nested guards on one path, outermost first
    All(Vec<FlagMatch>),
}

impl Condition {
    /// Collapse a guard stack into a condition; `None` for an empty stack
    pub fn from_guards(guards: &[FlagMatch]) -> Option<Self> {
        match guards {
            [] => None,
            [single] => Some(Condition::Flag(single.clone())),
            many => Some(Condition::All(many.to_vec())),
        }
    }

    pub fn matches<E: FlagSet + ?Sized>(&self, enabled: &E) -> bool {
        match self {
            Condition::Flag(m) => m.matches(enabled),
            Condition::All(all) => all.iter().all(|m| m.matches(enabled)),
        }
    }

    /// AND-combine with another condition
    pub fn and(self, other: Condition) -> Condition {
        let mut all = self.into_guards();
        all.extend(other.into_guards());
        Condition::All(all)
    }

    /// Every flag name this condition mentions, in order
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.guards().iter().map(FlagMatch::flag)
    }

    pub fn guards(&self) -> &[FlagMatch] {
        match self {
            Condition::Flag(m) => std::slice::from_ref(m),
            Condition::All(all) => all,
        }
    }

    fn into_guards(self) -> Vec<FlagMatch> {
        match self {
            Condition::Flag(m) => vec![m],
            Condition::All(all) => all,
        }
    }
}

impl From<FlagMatch> for Condition {
    fn from(m: FlagMatch) -> Self {
        Condition::Flag(m)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.guards().iter().map(|m| m.to_string()).collect();
        write!(f, "{}", parts.join(" "))
    }
}
