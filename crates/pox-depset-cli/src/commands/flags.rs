//! Flags command - list every flag a DepSet is conditional on.

use anyhow::Result;
use clap::Args;
use pox_depset::Element;

use super::{dispatch, parse_input, InputArgs, LeafCommand, Session};

#[derive(Args, Debug)]
pub struct FlagsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

struct Flags;

impl LeafCommand for Flags {
    fn run<T: Element>(&self, session: &Session) -> Result<()> {
        let depset = parse_input::<T>(session)?;
        for flag in depset.known_conditionals() {
            println!("{}", flag);
        }
        Ok(())
    }
}

pub fn execute(args: FlagsArgs) -> Result<()> {
    let kind = args.input.kind;
    let session = args.input.prepare()?;
    dispatch(kind, &Flags, &session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::LeafKind;
    use tempfile::TempDir;

    fn args(depset: &str, dir: &TempDir) -> FlagsArgs {
        FlagsArgs {
            input: InputArgs {
                depset: Some(depset.to_string()),
                kind: LeafKind::Word,
                transitive: false,
                renames: false,
                working_dir: dir.path().to_path_buf(),
            },
        }
    }

    #[test]
    fn test_execute_succeeds() {
        let dir = TempDir::new().unwrap();
        assert!(execute(args("GPL-2 doc? ( FDL-1.3 )", &dir)).is_ok());
    }

    #[test]
    fn test_execute_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let err = execute(args("doc? ( FDL-1.3", &dir)).unwrap_err();
        assert!(err.to_string().contains("Invalid DepSet"));
    }
}
