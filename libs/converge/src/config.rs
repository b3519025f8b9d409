//! Module-wide site configuration.
//!
//! One `SiteConfig` is provided per host and shared by every instance on
//! it. OS-family differences are resolved here, once, at the boundary;
//! planning code never branches on platform.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default root of the shared application install.
pub const DEFAULT_INSTALL_ROOT: &str = "/usr/share/mediawiki";

/// Default root for per-instance configuration directories.
pub const DEFAULT_CONFIG_ROOT: &str = "/etc/mediawiki";

/// Default document root instances are served from.
pub const DEFAULT_DOC_ROOT: &str = "/var/www/wikis";

/// OS family the host belongs to.
///
/// Determines the web server group used for writable instance directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Debian,
    RedHat,
}

impl Platform {
    /// Resolve a platform from an OS family fact.
    ///
    /// Returns `None` for families this module does not support.
    pub fn from_family(family: &str) -> Option<Self> {
        match family.to_ascii_lowercase().as_str() {
            "debian" | "ubuntu" => Some(Self::Debian),
            "redhat" | "centos" => Some(Self::RedHat),
            _ => None,
        }
    }

    /// The group the web server worker processes run as.
    pub fn web_group(&self) -> &'static str {
        match self {
            Self::Debian => "www-data",
            Self::RedHat => "apache",
        }
    }
}

/// Module-wide configuration shared by all instances on a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Canonical server name for the host.
    pub server_name: String,

    /// Administrative contact advertised by virtual hosts.
    pub admin_email: String,

    /// Root password for the database server.
    ///
    /// Held for the out-of-band database provisioning path; planning never
    /// embeds it in an intent.
    pub db_root_password: String,

    /// Root of the shared application install.
    pub install_root: PathBuf,

    /// Root for per-instance configuration directories.
    pub config_root: PathBuf,

    /// Document root instances are served from.
    pub doc_root: PathBuf,

    /// Group owning writable instance directories (web server group).
    pub web_group: String,
}

impl SiteConfig {
    /// Create a site configuration with default roots and Debian defaults.
    pub fn new(
        server_name: impl Into<String>,
        admin_email: impl Into<String>,
        db_root_password: impl Into<String>,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            admin_email: admin_email.into(),
            db_root_password: db_root_password.into(),
            install_root: PathBuf::from(DEFAULT_INSTALL_ROOT),
            config_root: PathBuf::from(DEFAULT_CONFIG_ROOT),
            doc_root: PathBuf::from(DEFAULT_DOC_ROOT),
            web_group: Platform::default().web_group().to_string(),
        }
    }

    /// Apply platform-specific defaults.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.web_group = platform.web_group().to_string();
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let server_name =
            std::env::var("WIKIFARM_SERVER_NAME").unwrap_or_else(|_| "localhost".to_string());

        let admin_email =
            std::env::var("WIKIFARM_ADMIN_EMAIL").unwrap_or_else(|_| "root@localhost".to_string());

        let db_root_password = std::env::var("WIKIFARM_DB_ROOT_PASSWORD").unwrap_or_default();

        let platform = std::env::var("WIKIFARM_PLATFORM")
            .ok()
            .and_then(|s| Platform::from_family(&s))
            .unwrap_or_default();

        let mut config = Self::new(server_name, admin_email, db_root_password)
            .with_platform(platform);

        if let Ok(root) = std::env::var("WIKIFARM_INSTALL_ROOT") {
            config.install_root = PathBuf::from(root);
        }
        if let Ok(root) = std::env::var("WIKIFARM_CONFIG_ROOT") {
            config.config_root = PathBuf::from(root);
        }
        if let Ok(root) = std::env::var("WIKIFARM_DOC_ROOT") {
            config.doc_root = PathBuf::from(root);
        }

        config
    }

    /// Parse a site manifest from TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let manifest: SiteManifest =
            toml::from_str(contents).map_err(|e| ConfigError::Manifest(e.to_string()))?;
        Ok(manifest.into_config())
    }

    /// Read and parse a site manifest from a TOML file.
    pub fn from_toml_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

/// On-disk site manifest shape. Roots and platform are optional.
#[derive(Debug, Deserialize)]
struct SiteManifest {
    server_name: String,
    admin_email: String,
    db_root_password: String,
    install_root: Option<PathBuf>,
    config_root: Option<PathBuf>,
    doc_root: Option<PathBuf>,
    platform: Option<Platform>,
}

impl SiteManifest {
    fn into_config(self) -> SiteConfig {
        let mut config = SiteConfig::new(self.server_name, self.admin_email, self.db_root_password)
            .with_platform(self.platform.unwrap_or_default());

        if let Some(root) = self.install_root {
            config.install_root = root;
        }
        if let Some(root) = self.config_root {
            config.config_root = root;
        }
        if let Some(root) = self.doc_root {
            config.doc_root = root;
        }

        config
    }
}
