use std::cmp::Ordering;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const MAX_COMPONENTS: usize = 4;

/// Numeric mod version, up to four components.
///
/// Components that were not written are stored as zero, so `1.0` and `1.0.0`
/// are the same version. Equality is exact per component; there is no range
/// or "compatible" matching anywhere in this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Version {
    components: [u16; MAX_COMPONENTS],
    written: usize,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum VersionParseError {
    #[error("version string is empty")]
    Empty,
    #[error("version {0} has more than 4 components")]
    TooManyComponents(String),
    #[error("invalid version component '{component}' in {version}")]
    InvalidComponent { version: String, component: String },
}

impl Version {
    pub fn new(major: u16, minor: u16, patch: u16) -> Version {
        Version {
            components: [major, minor, patch, 0],
            written: 3,
        }
    }

    /// Exact comparison used to pick a release out of a mod's release list.
    pub fn equals(&self, other: &Version) -> bool {
        self.components == other.components
    }
}

// `written` only affects display, never identity or ordering.
impl PartialEq for Version {
    fn eq(&self, other: &Version) -> bool {
        self.equals(other)
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.components.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() > MAX_COMPONENTS {
            return Err(VersionParseError::TooManyComponents(trimmed.to_string()));
        }

        let mut components = [0u16; MAX_COMPONENTS];
        for (i, part) in parts.iter().enumerate() {
            components[i] = part
                .parse::<u16>()
                .map_err(|_| VersionParseError::InvalidComponent {
                    version: trimmed.to_string(),
                    component: part.to_string(),
                })?;
        }

        Ok(Version {
            components,
            written: parts.len(),
        })
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = self.written.max(3);
        let parts: Vec<String> = self.components[..shown]
            .iter()
            .map(|c| c.to_string())
            .collect();
        write!(f, "{}", parts.join("."))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse::<Version>().map_err(serde::de::Error::custom)
    }
}
