//! Installed-package lookups used when locking slot dependencies

/// Slot data of an installed package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInfo {
    pub slot: String,
    pub subslot: Option<String>,
}

impl SlotInfo {
    pub fn new(slot: impl Into<String>, subslot: Option<&str>) -> Self {
        SlotInfo {
            slot: slot.into(),
            subslot: subslot.map(str::to_string),
        }
    }
}

/// Access to the packages installed on the live system.
///
/// Only consulted by [`DepSet::slotdep_str`](crate::DepSet::slotdep_str).
pub trait LivePackages<T> {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Slot data of the highest ranked installed package matching `pattern`
    fn best_match(&self, pattern: &T) -> Result<SlotInfo, Self::Error>;
}
