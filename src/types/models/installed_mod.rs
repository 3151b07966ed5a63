use std::path::PathBuf;

use serde::Serialize;

use crate::types::version::Version;

/// A mod found in the mods directory. Always derived from disk, never stored.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct InstalledMod {
    pub name: String,
    pub version: Version,
    pub path: PathBuf,
}
