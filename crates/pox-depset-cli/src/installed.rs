//! Installed package snapshots used by `slotdep`

use anyhow::{Context, Result};
use pox_depset::{Atom, LivePackages, SlotInfo};
use serde::Deserialize;
use std::cmp::Ordering;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("No installed package matches \"{0}\"")]
pub struct NoInstalledMatch(String);

#[derive(Debug, Clone, Deserialize)]
pub struct InstalledPackage {
    /// `category/package`
    pub key: String,
    pub version: String,
    pub slot: String,
    #[serde(default)]
    pub subslot: Option<String>,
}

/// A JSON list of installed packages
#[derive(Debug, Default)]
pub struct InstalledSnapshot {
    packages: Vec<InstalledPackage>,
}

impl InstalledSnapshot {
    pub fn new(packages: Vec<InstalledPackage>) -> Self {
        InstalledSnapshot { packages }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let packages: Vec<InstalledPackage> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid installed package list {}", path.display()))?;
        log::debug!("Loaded {} installed packages from {}", packages.len(), path.display());
        Ok(Self::new(packages))
    }
}

impl LivePackages<Atom> for InstalledSnapshot {
    type Error = NoInstalledMatch;

    fn best_match(&self, pattern: &Atom) -> Result<SlotInfo, Self::Error> {
        let key = pattern.key();
        self.packages
            .iter()
            .filter(|pkg| pkg.key == key)
            .max_by(|a, b| compare_versions(&a.version, &b.version))
            .map(|pkg| SlotInfo::new(pkg.slot.clone(), pkg.subslot.as_deref()))
            .ok_or_else(|| NoInstalledMatch(pattern.to_string()))
    }
}

/// Compare versions by their numeric components, `1.10` > `1.9`
fn compare_versions(a: &str, b: &str) -> Ordering {
    fn components(v: &str) -> Vec<u64> {
        v.split(|c: char| !c.is_ascii_digit())
            .filter(|part| !part.is_empty())
            .filter_map(|part| part.parse().ok())
            .collect()
    }
    components(a).cmp(&components(b))
}
