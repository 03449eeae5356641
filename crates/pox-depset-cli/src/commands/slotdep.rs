//! Slotdep command - lock `:=` slot dependencies to the installed packages.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;

use pox_depset::Atom;

use super::{parse_input, InputArgs, LeafKind};
use crate::installed::InstalledSnapshot;

#[derive(Args, Debug)]
pub struct SlotdepArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// JSON list of installed packages (`key`, `version`, `slot`, `subslot`)
    #[arg(short = 'i', long, value_name = "FILE")]
    pub installed: PathBuf,
}

pub fn execute(args: SlotdepArgs) -> Result<()> {
    if args.input.kind != LeafKind::Atom {
        bail!("slotdep only works on package atoms");
    }
    let installed = InstalledSnapshot::load(&args.installed)?;
    let session = args.input.prepare()?;

    let mut depset = parse_input::<Atom>(&session)?;
    let rendered = depset
        .slotdep_str(&installed)
        .context("Failed to lock slot dependencies")?;
    println!("{}", rendered);
    Ok(())
}
