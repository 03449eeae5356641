use anyhow::{Context, Result};
use indexmap::IndexMap;
use pox_depset::{BoolOp, ParseOptions};
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILE: &str = "depset.toml";

/// The depset configuration file structure (depset.toml)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DepsetConfig {
    /// Flag environment used by `eval`
    #[serde(rename = "use")]
    pub use_flags: UseConfig,

    /// Parser settings
    pub parse: ParseConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UseConfig {
    /// Flags considered enabled
    pub enabled: Vec<String>,

    /// Flags conditionals are restricted to; others always pass
    pub tristate: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ParseConfig {
    pub transitive_use_atoms: bool,

    pub allow_src_uri_file_renames: bool,

    /// Deepest accepted group nesting
    pub max_depth: Option<usize>,

    /// Extra operator tokens, e.g. `"^^" = "exactly-one-of"`
    pub operators: IndexMap<String, BoolOp>,
}

impl DepsetConfig {
    /// Load configuration from depset.toml, searching upward from the given directory
    pub fn load(start_dir: &Path) -> Result<Option<Self>> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE);

            if config_path.exists() {
                log::debug!("Using {}", config_path.display());
                let content = std::fs::read_to_string(&config_path)
                    .with_context(|| format!("Failed to read {}", config_path.display()))?;
                let config: DepsetConfig = toml::from_str(&content)
                    .with_context(|| format!("Invalid {}", config_path.display()))?;
                return Ok(Some(config));
            }

            if !current.pop() {
                return Ok(None);
            }
        }
    }

    /// Parser options described by this configuration
    pub fn parse_options(&self) -> ParseOptions {
        let mut options = ParseOptions::default()
            .transitive_use_atoms(self.parse.transitive_use_atoms)
            .allow_src_uri_file_renames(self.parse.allow_src_uri_file_renames);
        if let Some(depth) = self.parse.max_depth {
            options = options.max_depth(depth);
        }
        for (token, op) in &self.parse.operators {
            options = options.operator(token.clone(), *op);
        }
        options
    }
}
