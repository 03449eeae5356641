//! Lightweight package atoms used as DepSet leaves
//!
//! Only the shape of an atom is modelled here: blocker, version operator,
//! category/package, version, slot dependency and use dependencies. Matching
//! atoms against packages is left to the package domain.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use thiserror::Error;

use crate::condition::FlagMatch;
use crate::element::Element;
use crate::node::{Conditional, Node};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AtomError {
    #[error("Invalid atom \"{0}\"")]
    Invalid(String),
    #[error("Invalid atom \"{atom}\": {reason}")]
    InvalidPart { atom: String, reason: String },
    #[error("Atoms cannot be renamed (\"{0}\")")]
    RenameUnsupported(String),
}

lazy_static! {
    static ref ATOM_RE: Regex = Regex::new(
        r"^(!!?)?(<=|>=|<|>|=|~)?([^:\[\]\s*]+)(\*)?(?::([^\[\]\s]*))?(?:\[([^\[\]\s]*)\])?$"
    ).unwrap();

    static ref CPN_RE: Regex = Regex::new(
        r"^[A-Za-z0-9_][A-Za-z0-9+_.-]*/[A-Za-z0-9_][A-Za-z0-9+_-]*$"
    ).unwrap();

    static ref CPV_RE: Regex = Regex::new(
        r"^([A-Za-z0-9_][A-Za-z0-9+_.-]*/[A-Za-z0-9_][A-Za-z0-9+_-]*?)-(\d+(?:\.\d+)*[a-z]?(?:_(?:alpha|beta|pre|rc|p)\d*)*(?:-r\d+)?)$"
    ).unwrap();

    static ref SLOT_NAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9+_.-]*$").unwrap();

    static ref USE_DEP_RE: Regex = Regex::new(
        r"^(!)?(-)?([A-Za-z0-9][A-Za-z0-9+_@-]*)(\([+-]\))?([?=])?$"
    ).unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Blocker {
    /// `!`
    Weak,
    /// `!!`
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VersionOp {
    Less,
    LessOrEqual,
    Equal,
    Approximate,
    GreaterOrEqual,
    Greater,
}

impl VersionOp {
    fn from_token(s: &str) -> Option<Self> {
        match s {
            "<" => Some(VersionOp::Less),
            "<=" => Some(VersionOp::LessOrEqual),
            "=" => Some(VersionOp::Equal),
            "~" => Some(VersionOp::Approximate),
            ">=" => Some(VersionOp::GreaterOrEqual),
            ">" => Some(VersionOp::Greater),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VersionOp::Less => "<",
            VersionOp::LessOrEqual => "<=",
            VersionOp::Equal => "=",
            VersionOp::Approximate => "~",
            VersionOp::GreaterOrEqual => ">=",
            VersionOp::Greater => ">",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SlotOperator {
    /// `:=`, lock to the slot installed at build time
    Equal,
    /// `:*`
    Star,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotDep {
    slot: Option<String>,
    subslot: Option<String>,
    op: Option<SlotOperator>,
}

impl SlotDep {
    fn parse(atom: &str, s: &str) -> Result<Self, AtomError> {
        let invalid = |reason: &str| AtomError::InvalidPart {
            atom: atom.to_string(),
            reason: reason.to_string(),
        };

        if s == "*" {
            return Ok(SlotDep {
                slot: None,
                subslot: None,
                op: Some(SlotOperator::Star),
            });
        }

        let (rest, op) = match s.strip_suffix('=') {
            Some(rest) => (rest, Some(SlotOperator::Equal)),
            None => (s, None),
        };

        if rest.is_empty() {
            return match op {
                Some(op) => Ok(SlotDep {
                    slot: None,
                    subslot: None,
                    op: Some(op),
                }),
                None => Err(invalid("empty slot")),
            };
        }

        let (slot, subslot) = match rest.split_once('/') {
            Some((slot, subslot)) => (slot, Some(subslot)),
            None => (rest, None),
        };

        if !SLOT_NAME_RE.is_match(slot) {
            return Err(invalid("invalid slot name"));
        }
        if let Some(sub) = subslot {
            if !SLOT_NAME_RE.is_match(sub) {
                return Err(invalid("invalid subslot name"));
            }
        }

        Ok(SlotDep {
            slot: Some(slot.to_string()),
            subslot: subslot.map(str::to_string),
            op,
        })
    }

    pub fn slot(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    pub fn subslot(&self) -> Option<&str> {
        self.subslot.as_deref()
    }

    pub fn op(&self) -> Option<SlotOperator> {
        self.op
    }
}

impl fmt::Display for SlotDep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.op == Some(SlotOperator::Star) {
            return write!(f, "*");
        }
        if let Some(slot) = &self.slot {
            write!(f, "{}", slot)?;
            if let Some(subslot) = &self.subslot {
                write!(f, "/{}", subslot)?;
            }
        }
        if self.op == Some(SlotOperator::Equal) {
            write!(f, "=")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UseDepKind {
    /// `flag`
    Enabled,
    /// `-flag`
    Disabled,
    /// `flag?` / `!flag?`
    Conditional { negate: bool },
    /// `flag=` / `!flag=`
    Equal { negate: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UseDep {
    flag: String,
    kind: UseDepKind,
    /// `(+)` or `(-)`
    default: Option<bool>,
}

impl UseDep {
    fn parse(atom: &str, s: &str) -> Result<Self, AtomError> {
        let invalid = || AtomError::InvalidPart {
            atom: atom.to_string(),
            reason: format!("invalid use dependency \"{}\"", s),
        };

        let caps = USE_DEP_RE.captures(s).ok_or_else(invalid)?;
        let bang = caps.get(1).is_some();
        let minus = caps.get(2).is_some();
        let flag = caps[3].to_string();
        let default = caps.get(4).map(|m| m.as_str() == "(+)");
        let suffix = caps.get(5).map(|m| m.as_str());

        let kind = match (bang, minus, suffix) {
            (false, false, None) => UseDepKind::Enabled,
            (false, true, None) => UseDepKind::Disabled,
            (negate, false, Some("?")) => UseDepKind::Conditional { negate },
            (negate, false, Some("=")) => UseDepKind::Equal { negate },
            _ => return Err(invalid()),
        };

        Ok(UseDep { flag, kind, default })
    }

    fn forced(flag: &str, enabled: bool, default: Option<bool>) -> Self {
        UseDep {
            flag: flag.to_string(),
            kind: if enabled { UseDepKind::Enabled } else { UseDepKind::Disabled },
            default,
        }
    }

    pub fn flag(&self) -> &str {
        &self.flag
    }

    pub fn kind(&self) -> UseDepKind {
        self.kind
    }

    fn is_transitive(&self) -> bool {
        matches!(self.kind, UseDepKind::Conditional { .. } | UseDepKind::Equal { .. })
    }
}

impl fmt::Display for UseDep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let default = match self.default {
            Some(true) => "(+)",
            Some(false) => "(-)",
            None => "",
        };
        match self.kind {
            UseDepKind::Enabled => write!(f, "{}{}", self.flag, default),
            UseDepKind::Disabled => write!(f, "-{}{}", self.flag, default),
            UseDepKind::Conditional { negate } => {
                write!(f, "{}{}{}?", if negate { "!" } else { "" }, self.flag, default)
            }
            UseDepKind::Equal { negate } => {
                write!(f, "{}{}{}=", if negate { "!" } else { "" }, self.flag, default)
            }
        }
    }
}

/// A package dependency atom
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom {
    blocker: Option<Blocker>,
    op: Option<VersionOp>,
    category: String,
    package: String,
    version: Option<String>,
    glob: bool,
    slot_dep: Option<SlotDep>,
    use_deps: Vec<UseDep>,
}

impl Atom {
    pub fn parse(s: &str) -> Result<Self, AtomError> {
        let caps = ATOM_RE.captures(s).ok_or_else(|| AtomError::Invalid(s.to_string()))?;
        let invalid = |reason: &str| AtomError::InvalidPart {
            atom: s.to_string(),
            reason: reason.to_string(),
        };

        let blocker = caps.get(1).map(|m| {
            if m.as_str() == "!!" {
                Blocker::Strong
            } else {
                Blocker::Weak
            }
        });
        let op = caps.get(2).and_then(|m| VersionOp::from_token(m.as_str()));
        let body = &caps[3];
        let glob = caps.get(4).is_some();

        let (cpn, version) = match op {
            Some(_) => {
                let cpv = CPV_RE
                    .captures(body)
                    .ok_or_else(|| invalid("versioned atom requires a valid version"))?;
                (cpv[1].to_string(), Some(cpv[2].to_string()))
            }
            None => {
                if !CPN_RE.is_match(body) {
                    return Err(AtomError::Invalid(s.to_string()));
                }
                (body.to_string(), None)
            }
        };

        if glob && op != Some(VersionOp::Equal) {
            return Err(invalid("\"*\" is only valid with \"=\""));
        }

        let (category, package) = cpn
            .split_once('/')
            .map(|(c, p)| (c.to_string(), p.to_string()))
            .ok_or_else(|| AtomError::Invalid(s.to_string()))?;

        let slot_dep = caps.get(5).map(|m| SlotDep::parse(s, m.as_str())).transpose()?;

        let use_deps = match caps.get(6) {
            Some(m) if m.as_str().is_empty() => return Err(invalid("empty use dependency list")),
            Some(m) => m
                .as_str()
                .split(',')
                .map(|u| UseDep::parse(s, u))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Atom {
            blocker,
            op,
            category,
            package,
            version,
            glob,
            slot_dep,
            use_deps,
        })
    }

    pub fn blocker(&self) -> Option<Blocker> {
        self.blocker
    }

    pub fn op(&self) -> Option<VersionOp> {
        self.op
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// `category/package`
    pub fn key(&self) -> String {
        format!("{}/{}", self.category, self.package)
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn slot_dep(&self) -> Option<&SlotDep> {
        self.slot_dep.as_ref()
    }

    pub fn slot_operator(&self) -> Option<SlotOperator> {
        self.slot_dep.as_ref().and_then(SlotDep::op)
    }

    pub fn use_deps(&self) -> &[UseDep] {
        &self.use_deps
    }

    fn with_use_deps(&self, use_deps: Vec<UseDep>) -> Self {
        Atom {
            use_deps,
            ..self.clone()
        }
    }

    /// Expand the conditional use dependencies in `varied`, left to right,
    /// on top of the already `forced` ones.
    fn expand_transitive(&self, forced: Vec<UseDep>, varied: &[UseDep]) -> Vec<Node<Atom>> {
        let Some((first, rest)) = varied.split_first() else {
            return vec![Node::Leaf(self.with_use_deps(forced))];
        };

        let flag = first.flag();
        let with = |enabled: bool| {
            let mut next = forced.clone();
            next.push(UseDep::forced(flag, enabled, first.default));
            next
        };

        // (payload when flag is set, payload when flag is unset)
        let (on, off) = match first.kind {
            // a[x?] == x? ( a[x] ) !x? ( a )
            UseDepKind::Conditional { negate: false } => (with(true), forced.clone()),
            // a[!x?] == x? ( a ) !x? ( a[-x] )
            UseDepKind::Conditional { negate: true } => (forced.clone(), with(false)),
            // a[x=] == x? ( a[x] ) !x? ( a[-x] )
            UseDepKind::Equal { negate: false } => (with(true), with(false)),
            // a[!x=] == x? ( a[-x] ) !x? ( a[x] )
            UseDepKind::Equal { negate: true } => (with(false), with(true)),
            UseDepKind::Enabled | UseDepKind::Disabled => {
                let mut next = forced.clone();
                next.push(first.clone());
                return self.expand_transitive(next, rest);
            }
        };

        vec![
            Node::Conditional(Conditional::from_parts(
                FlagMatch::new(flag, false),
                self.expand_transitive(on, rest),
            )),
            Node::Conditional(Conditional::from_parts(
                FlagMatch::new(flag, true),
                self.expand_transitive(off, rest),
            )),
        ]
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.blocker {
            Some(Blocker::Strong) => write!(f, "!!")?,
            Some(Blocker::Weak) => write!(f, "!")?,
            None => {}
        }
        if let Some(op) = self.op {
            write!(f, "{}", op.as_str())?;
        }
        write!(f, "{}/{}", self.category, self.package)?;
        if let Some(version) = &self.version {
            write!(f, "-{}", version)?;
        }
        if self.glob {
            write!(f, "*")?;
        }
        if let Some(slot_dep) = &self.slot_dep {
            write!(f, ":{}", slot_dep)?;
        }
        if !self.use_deps.is_empty() {
            let uses: Vec<String> = self.use_deps.iter().map(|u| u.to_string()).collect();
            write!(f, "[{}]", uses.join(","))?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Atom {
    type Err = AtomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Atom::parse(s)
    }
}

impl Element for Atom {
    type Err = AtomError;

    fn parse_element(token: &str) -> Result<Self, Self::Err> {
        Atom::parse(token)
    }

    fn parse_renamed(token: &str, rename: &str) -> Result<Self, Self::Err> {
        Err(AtomError::RenameUnsupported(format!("{} -> {}", token, rename)))
    }

    fn transitive_conditionals(&self) -> Vec<Node<Self>> {
        if !self.is_transitive() {
            return Vec::new();
        }
        let (varied, fixed): (Vec<UseDep>, Vec<UseDep>) =
            self.use_deps.iter().cloned().partition(UseDep::is_transitive);
        self.expand_transitive(fixed, &varied)
    }

    fn is_transitive(&self) -> bool {
        self.use_deps.iter().any(UseDep::is_transitive)
    }

    fn locks_slot(&self) -> bool {
        self.slot_operator() == Some(SlotOperator::Equal)
    }

    fn set_slot(&mut self, slot: &str, subslot: Option<&str>) {
        self.slot_dep = Some(SlotDep {
            slot: Some(slot.to_string()),
            subslot: subslot.map(str::to_string),
            op: self.slot_operator(),
        });
    }
}
