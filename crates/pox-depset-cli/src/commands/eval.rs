//! Eval command - resolve conditionals against a set of enabled flags.

use anyhow::Result;
use clap::Args;
use indexmap::IndexSet;
use pox_depset::{Element, FlagSet};

use super::{dispatch, parse_input, InputArgs, LeafCommand, Session};

#[derive(Args, Debug)]
pub struct EvalArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Enabled flags (comma separated); defaults to `use.enabled` from depset.toml
    #[arg(short = 'u', long = "use", value_delimiter = ',')]
    pub flags: Vec<String>,

    /// Only evaluate conditionals on these flags; all others pass
    #[arg(short = 't', long, value_delimiter = ',')]
    pub tristate: Option<Vec<String>>,
}

struct Eval {
    flags: Vec<String>,
    tristate: Option<Vec<String>>,
}

impl Eval {
    fn environment(&self, session: &Session) -> (IndexSet<String>, Option<IndexSet<String>>) {
        let flags = if self.flags.is_empty() {
            &session.config.use_flags.enabled
        } else {
            &self.flags
        };
        let tristate = self
            .tristate
            .as_ref()
            .or(session.config.use_flags.tristate.as_ref());
        (
            flags.iter().cloned().collect(),
            tristate.map(|t| t.iter().cloned().collect()),
        )
    }
}

impl LeafCommand for Eval {
    fn run<T: Element>(&self, session: &Session) -> Result<()> {
        let depset = parse_input::<T>(session)?;
        let (enabled, tristate) = self.environment(session);
        log::debug!("Evaluating with flags {:?} (tristate {:?})", enabled, tristate);

        let evaluated = depset.evaluate_depset(&enabled, tristate.as_ref().map(|t| t as &dyn FlagSet));
        println!("{}", evaluated);
        Ok(())
    }
}

pub fn execute(args: EvalArgs) -> Result<()> {
    let kind = args.input.kind;
    let session = args.input.prepare()?;
    let command = Eval {
        flags: args.flags,
        tristate: args.tristate,
    };
    dispatch(kind, &command, &session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DepsetConfig;

    fn session(enabled: &[&str], tristate: Option<&[&str]>) -> Session {
        let mut config = DepsetConfig::default();
        config.use_flags.enabled = enabled.iter().map(|s| s.to_string()).collect();
        config.use_flags.tristate = tristate.map(|t| t.iter().map(|s| s.to_string()).collect());
        Session {
            input: String::new(),
            options: config.parse_options(),
            config,
        }
    }

    #[test]
    fn test_environment_falls_back_to_config() {
        let eval = Eval { flags: vec![], tristate: None };
        let (enabled, tristate) = eval.environment(&session(&["ssl"], Some(&["ssl"])));
        assert!(enabled.contains("ssl"));
        assert!(tristate.unwrap().contains("ssl"));
    }

    #[test]
    fn test_cli_flags_override_config() {
        let eval = Eval {
            flags: vec!["gtk".to_string()],
            tristate: Some(vec!["gtk".to_string()]),
        };
        let (enabled, tristate) = eval.environment(&session(&["ssl"], Some(&["ssl"])));
        assert!(!enabled.contains("ssl"));
        assert!(enabled.contains("gtk"));
        assert!(tristate.unwrap().contains("gtk"));
    }
}
