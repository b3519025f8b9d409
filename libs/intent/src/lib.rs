//! # wikifarm-intent
//!
//! Declarative resource intents for wiki instance provisioning.
//!
//! An intent is a plain statement of desired state for one underlying
//! resource: a directory, a symlink, a database, or a virtual host. Intents
//! carry no apply logic and no memory of prior runs; an external applier
//! realizes them idempotently (create-if-missing, remove-if-present).
//!
//! # Invariants
//!
//! - Intents are pure data; equality is structural
//! - An intent set is an ordered `Vec<ResourceIntent>`; the order is the
//!   application order
//! - Identities are stable across runs for the same inputs

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default port for instance virtual hosts.
pub const DEFAULT_VHOST_PORT: u16 = 80;

/// Default host for instance databases.
pub const DEFAULT_DB_HOST: &str = "localhost";

/// Default grant level for instance database users.
pub const DEFAULT_DB_GRANT: &str = "all";

/// Template identifier for instance virtual host configuration.
pub const VHOST_TEMPLATE: &str = "instance-vhost";

/// Desired presence of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ensure {
    /// The resource must exist with the stated attributes.
    Present,

    /// The resource must not exist.
    Absent,
}

impl Ensure {
    /// Returns true if the resource is desired present.
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }
}

impl fmt::Display for Ensure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// An octal file mode.
///
/// Displayed and serialized in the four-digit octal form provisioners
/// expect (`0755`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMode(u32);

impl FileMode {
    /// The standard mode for instance directories and links.
    pub const DIR: FileMode = FileMode(0o755);

    /// Creates a mode from raw permission bits.
    #[must_use]
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw permission bits.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}

impl Serialize for FileMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format!("{:04o}", self.0))
    }
}

impl<'de> Deserialize<'de> for FileMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bits = u32::from_str_radix(&s, 8)
            .map_err(|_| serde::de::Error::custom(format!("invalid octal mode: {s}")))?;
        Ok(Self(bits))
    }
}

/// Ownership attributes for a filesystem resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileOwner {
    /// Owning user.
    pub owner: String,

    /// Owning group.
    pub group: String,
}

impl FileOwner {
    /// Owned by root, group root.
    pub fn root_root() -> Self {
        Self {
            owner: "root".to_string(),
            group: "root".to_string(),
        }
    }

    /// Owned by root with an explicit group (e.g. the web server group).
    pub fn root_group(group: impl Into<String>) -> Self {
        Self {
            owner: "root".to_string(),
            group: group.into(),
        }
    }
}

impl fmt::Display for FileOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner, self.group)
    }
}

/// Desired state for a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryIntent {
    /// Absolute path of the directory.
    pub path: PathBuf,

    /// Desired presence.
    pub ensure: Ensure,

    /// Ownership when present.
    pub owner: FileOwner,

    /// Permission mode when present.
    pub mode: FileMode,

    /// Remove contents recursively when absent.
    pub recurse_on_remove: bool,
}

/// Desired state for a symbolic link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymlinkIntent {
    /// Absolute path of the link itself.
    pub path: PathBuf,

    /// Desired presence.
    pub ensure: Ensure,

    /// Ownership of the link.
    pub owner: FileOwner,

    /// Permission mode, where the provisioner honors link modes.
    pub mode: Option<FileMode>,

    /// Link target. Meaningful only when present.
    pub target: PathBuf,
}

/// Desired state for an instance database, its user, and grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseIntent {
    /// Schema name.
    pub name: String,

    /// Database user owning the schema.
    pub user: String,

    /// Password for the database user.
    pub password: String,

    /// Host the user connects from.
    pub host: String,

    /// Grant level for the user on the schema.
    pub grant: String,

    /// Desired presence.
    pub ensure: Ensure,
}

/// Desired state for an instance virtual host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VhostIntent {
    /// Virtual host identity (the instance name).
    pub name: String,

    /// Listening port.
    pub port: u16,

    /// Document root the vhost serves from.
    pub docroot: PathBuf,

    /// Administrative contact advertised by the server.
    pub server_admin: String,

    /// Identifier of the vhost configuration template.
    pub template: String,

    /// Desired presence.
    pub ensure: Ensure,
}

/// The kind of resource an intent addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Directory,
    Symlink,
    Database,
    Vhost,
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => write!(f, "directory"),
            Self::Symlink => write!(f, "symlink"),
            Self::Database => write!(f, "database"),
            Self::Vhost => write!(f, "vhost"),
        }
    }
}

/// A declarative statement of desired state for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceIntent {
    /// A directory on the host filesystem.
    Directory(DirectoryIntent),

    /// A symbolic link on the host filesystem.
    Symlink(SymlinkIntent),

    /// An instance database with its user and grants.
    Database(DatabaseIntent),

    /// A web server virtual host.
    Vhost(VhostIntent),
}

impl ResourceIntent {
    /// The kind of resource this intent addresses.
    pub fn kind(&self) -> IntentKind {
        match self {
            Self::Directory(_) => IntentKind::Directory,
            Self::Symlink(_) => IntentKind::Symlink,
            Self::Database(_) => IntentKind::Database,
            Self::Vhost(_) => IntentKind::Vhost,
        }
    }

    /// Desired presence of the underlying resource.
    pub fn ensure(&self) -> Ensure {
        match self {
            Self::Directory(d) => d.ensure,
            Self::Symlink(s) => s.ensure,
            Self::Database(d) => d.ensure,
            Self::Vhost(v) => v.ensure,
        }
    }

    /// Stable identity for logging and deduplication.
    ///
    /// Two intents with the same identity address the same underlying
    /// resource, whatever their attributes.
    pub fn identity(&self) -> String {
        match self {
            Self::Directory(d) => format!("directory:{}", d.path.display()),
            Self::Symlink(s) => format!("symlink:{}", s.path.display()),
            Self::Database(d) => format!("database:{}", d.name),
            Self::Vhost(v) => format!("vhost:{}", v.name),
        }
    }
}

impl fmt::Display for ResourceIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ensure={}", self.identity(), self.ensure())
    }
}
