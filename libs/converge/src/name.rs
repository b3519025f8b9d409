//! Validated instance name tokens.
//!
//! Instance names derive every per-instance path on the host, so they are
//! parsed strictly: a name that is not path-safe is rejected at the
//! boundary rather than trusted downstream.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NameError;

/// Maximum instance name length in bytes.
pub const MAX_NAME_LENGTH: usize = 64;

/// A validated instance name.
///
/// Allowed characters are ASCII alphanumerics plus `.`, `_`, and `-`; the
/// name must contain at least one alphanumeric and must not be a relative
/// path token (`.` or `..`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct InstanceName(String);

impl InstanceName {
    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives the default database identifier for this instance.
    ///
    /// Lower-cased with non-alphanumeric characters stripped, so the token
    /// is valid as both a schema name and a database user name. Stable
    /// across runs for the same instance name.
    pub fn db_token(&self) -> String {
        self.0
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect()
    }
}

impl FromStr for InstanceName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NameError::Empty);
        }

        if s.len() > MAX_NAME_LENGTH {
            return Err(NameError::TooLong {
                max: MAX_NAME_LENGTH,
                actual: s.len(),
            });
        }

        if let Some(ch) = s
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '.' | '_' | '-'))
        {
            return Err(NameError::InvalidChar { ch });
        }

        if s == "." || s == ".." || !s.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(NameError::Reserved(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for InstanceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for InstanceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for InstanceName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
