//! DepSet dependency expressions
//!
//! This crate parses the DepSet grammar used for package dependencies,
//! licenses and fetch lists into a tree of AND/OR groups and flag
//! conditionals, evaluates that tree against a set of enabled flags, reports
//! which leaves are only required under some condition, and renders trees
//! back to canonical text.
//!
//! ```
//! use pox_depset::{Atom, DepSet};
//!
//! let deps = DepSet::<Atom>::parse("dev-libs/glib ssl? ( dev-libs/openssl )").unwrap();
//! assert!(deps.has_conditionals());
//! assert!(deps.known_conditionals().contains("ssl"));
//!
//! let evaluated = deps.evaluate_depset(&["ssl"], None);
//! assert_eq!(evaluated.to_string(), "dev-libs/glib dev-libs/openssl");
//! ```

pub mod atom;
pub mod condition;
mod conditions;
mod depset;
pub mod domain;
mod element;
mod error;
mod evaluate;
pub mod fetchable;
pub mod node;
mod parser;
mod stringify;

pub use atom::{Atom, AtomError};
pub use condition::{Condition, FlagMatch, FlagSet};
pub use conditions::CondNodes;
pub use depset::DepSet;
pub use domain::{LivePackages, SlotInfo};
pub use element::{Element, ElementError};
pub use error::{ElementCause, ParseError};
pub use fetchable::{Fetchable, FetchableError};
pub use node::{BoolOp, Conditional, Group, Node};
pub use parser::{ParseOptions, DEFAULT_MAX_DEPTH};
pub use stringify::stringify_nodes;
