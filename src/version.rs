//! Schema version of the document a runtime section belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dotted `major.minor.revision` version, ordered numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub revision: u32,
}

impl Version {
    pub const V_7_0_0: Version = Version::new(7, 0, 0);

    /// First version where unknown parameters in dynamic templates are rejected.
    pub const V_8_0_0: Version = Version::new(8, 0, 0);

    pub const CURRENT: Version = Version::V_8_0_0;

    pub const fn new(major: u32, minor: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            revision,
        }
    }

    pub fn before(&self, other: Version) -> bool {
        *self < other
    }

    pub fn on_or_after(&self, other: Version) -> bool {
        *self >= other
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::CURRENT
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

impl FromStr for Version {
    type Err = String;

    /// Parse `"7"`, `"7.10"` or `"7.10.2"`; missing parts default to zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(format!("Invalid version '{}': expected major[.minor[.revision]]", s));
        }

        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|e| format!("Invalid version '{}': {}", s, e))?;
        }

        Ok(Version::new(numbers[0], numbers[1], numbers[2]))
    }
}

impl TryFrom<String> for Version {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}
