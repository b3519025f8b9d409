//! Per-instance parameters and their resolution against site defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;
use crate::error::ConfigError;
use crate::name::InstanceName;

/// Desired lifecycle phase of an instance.
///
/// There is no tracked previous state: every convergence run computes the
/// full intent set for the requested target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    /// Instance exists and is served.
    #[default]
    Present,

    /// Instance data is retained but serving is disabled. Reversible.
    Absent,

    /// Instance data and database are removed. Irreversible.
    Deleted,
}

impl TargetState {
    /// Returns true for the destructive target.
    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// Returns true if on-disk instance data is retained.
    pub fn retains_data(&self) -> bool {
        !self.is_destructive()
    }

    /// Returns true if the instance is served by the web server.
    pub fn is_served(&self) -> bool {
        matches!(self, Self::Present)
    }
}

impl FromStr for TargetState {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            "deleted" => Ok(Self::Deleted),
            other => Err(ConfigError::InvalidTargetState(other.to_string())),
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// Per-instance declaration as supplied by the caller.
///
/// Everything except the target state is optional; unset fields fall back
/// to site defaults or name-derived values during resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceParams {
    /// Target lifecycle state. Defaults to present.
    #[serde(default)]
    pub ensure: TargetState,

    /// Schema name. Defaults to the name-derived token.
    pub db_name: Option<String>,

    /// Database user. Defaults to the name-derived token.
    pub db_user: Option<String>,

    /// Password for the database user. Required when present.
    pub db_password: Option<String>,

    /// Server name override for this instance.
    pub server_name: Option<String>,

    /// Admin contact override for this instance.
    pub admin_email: Option<String>,
}

impl InstanceParams {
    /// Declaration with only a target state set.
    pub fn with_ensure(ensure: TargetState) -> Self {
        Self {
            ensure,
            ..Self::default()
        }
    }
}

/// Fully resolved parameters for one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParams {
    /// Target lifecycle state.
    pub ensure: TargetState,

    /// Concrete schema name.
    pub db_name: String,

    /// Concrete database user.
    pub db_user: String,

    /// Database password, when supplied.
    pub db_password: Option<String>,

    /// Effective server name.
    pub server_name: String,

    /// Effective admin contact.
    pub admin_email: String,
}

/// Merge instance parameters over site defaults.
///
/// Instance-level values win. `db_name` and `db_user` fall back to the
/// deterministic name-derived token, so repeated resolution of the same
/// declaration is stable. Fails before any intent is emitted when a
/// required parameter is missing.
pub fn resolve(
    name: &InstanceName,
    params: &InstanceParams,
    site: &SiteConfig,
) -> Result<ResolvedParams, ConfigError> {
    if params.ensure == TargetState::Present && params.db_password.is_none() {
        return Err(ConfigError::MissingRequiredParameter {
            instance: name.to_string(),
            parameter: "db_password",
        });
    }

    let token = name.db_token();

    Ok(ResolvedParams {
        ensure: params.ensure,
        db_name: params.db_name.clone().unwrap_or_else(|| token.clone()),
        db_user: params.db_user.clone().unwrap_or(token),
        db_password: params.db_password.clone(),
        server_name: params
            .server_name
            .clone()
            .unwrap_or_else(|| site.server_name.clone()),
        admin_email: params
            .admin_email
            .clone()
            .unwrap_or_else(|| site.admin_email.clone()),
    })
}
