//! Conds command - list guarded leaves and the conditions requiring them.

use anyhow::Result;
use clap::Args;
use pox_depset::Element;

use super::{dispatch, parse_input, InputArgs, LeafCommand, Session};

#[derive(Args, Debug)]
pub struct CondsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

struct Conds;

impl LeafCommand for Conds {
    fn run<T: Element>(&self, session: &Session) -> Result<()> {
        let depset = parse_input::<T>(session)?;
        for (leaf, conditions) in depset.node_conds() {
            for condition in conditions {
                println!("{}: {}", leaf, condition);
            }
        }
        Ok(())
    }
}

pub fn execute(args: CondsArgs) -> Result<()> {
    let kind = args.input.kind;
    let session = args.input.prepare()?;
    dispatch(kind, &Conds, &session)
}
