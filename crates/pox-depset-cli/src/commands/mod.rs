//! depset subcommands.

pub mod conds;
pub mod eval;
pub mod flags;
pub mod parse;
pub mod slotdep;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::io::Read;
use std::path::PathBuf;

use pox_depset::{Atom, DepSet, Element, Fetchable, ParseOptions};

use crate::config::DepsetConfig;

pub use conds::CondsArgs;
pub use eval::EvalArgs;
pub use flags::FlagsArgs;
pub use parse::ParseArgs;
pub use slotdep::SlotdepArgs;

/// Leaf type of the parsed DepSet
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    /// Package atoms (DEPEND, RDEPEND, ...)
    Atom,
    /// Fetchable URIs (SRC_URI)
    Fetch,
    /// Plain words (LICENSE, RESTRICT, ...)
    Word,
}

/// Arguments shared by every subcommand
#[derive(Args, Debug)]
pub struct InputArgs {
    /// DepSet string; read from stdin when omitted
    pub depset: Option<String>,

    /// Leaf type of the DepSet
    #[arg(short = 'k', long, value_enum, default_value_t = LeafKind::Atom)]
    pub kind: LeafKind,

    /// Scan for transitive use-dependency atoms
    #[arg(long)]
    pub transitive: bool,

    /// Accept `uri -> name` file renames
    #[arg(long)]
    pub renames: bool,

    /// Working directory (depset.toml is searched upward from here)
    #[arg(short = 'd', long, default_value = ".")]
    pub working_dir: PathBuf,
}

/// Input string plus the configuration that applies to it
pub struct Session {
    pub input: String,
    pub config: DepsetConfig,
    pub options: ParseOptions,
}

impl InputArgs {
    pub fn prepare(self) -> Result<Session> {
        let working_dir = self
            .working_dir
            .canonicalize()
            .context("Failed to resolve working directory")?;
        let config = DepsetConfig::load(&working_dir)?.unwrap_or_default();

        let mut options = config.parse_options();
        if self.transitive {
            options = options.transitive_use_atoms(true);
        }
        if self.renames {
            options = options.allow_src_uri_file_renames(true);
        }

        let input = match self.depset {
            Some(depset) => depset,
            None => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read DepSet from stdin")?;
                buf
            }
        };

        Ok(Session {
            input,
            config,
            options,
        })
    }
}

/// A subcommand that works on any leaf type
pub trait LeafCommand {
    fn run<T: Element>(&self, session: &Session) -> Result<()>;
}

/// Run `command` with the element type selected by `kind`
pub fn dispatch<C: LeafCommand>(kind: LeafKind, command: &C, session: &Session) -> Result<()> {
    match kind {
        LeafKind::Atom => command.run::<Atom>(session),
        LeafKind::Fetch => command.run::<Fetchable>(session),
        LeafKind::Word => command.run::<String>(session),
    }
}

pub fn parse_input<T: Element>(session: &Session) -> Result<DepSet<T>> {
    DepSet::parse_with_options(&session.input, &session.options).context("Invalid DepSet")
}
