//! # wikifarm-apply
//!
//! Intent-to-provisioner adapters.
//!
//! The planning side emits ordered `ResourceIntent` sets; this crate
//! dispatches them to the provisioners that own the actual side effects:
//! - **`FileProvisioner`**: directories and symlinks
//! - **`DatabaseProvisioner`**: schemas, users, grants
//! - **`VhostProvisioner`**: web server virtual hosts
//!
//! Provisioner internals (SQL, config rendering, file I/O) live outside
//! this workspace; each implementation is expected to apply its intent
//! idempotently (create-if-missing, remove-if-present). Application is
//! synchronous, single-pass, and fail-fast: the first provisioner failure
//! aborts the pass and surfaces as-is. Retries belong to the outer
//! runtime.
//!
//! A recording mock implementing all three traits is provided for tests.

use std::sync::Mutex;

use thiserror::Error;
use tracing::debug;
use wikifarm_intent::{DatabaseIntent, DirectoryIntent, ResourceIntent, SymlinkIntent, VhostIntent};

/// Failure reported by a provisioner for one intent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ProvisionError(String);

impl ProvisionError {
    /// Create a provisioner failure with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure of an apply pass, tagged with the failing intent's identity.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// A directory or symlink intent failed.
    #[error("filesystem intent '{identity}' failed: {source}")]
    Filesystem {
        identity: String,
        source: ProvisionError,
    },

    /// A database intent failed.
    #[error("database intent '{identity}' failed: {source}")]
    Database {
        identity: String,
        source: ProvisionError,
    },

    /// A vhost intent failed.
    #[error("vhost intent '{identity}' failed: {source}")]
    Vhost {
        identity: String,
        source: ProvisionError,
    },
}

impl ApplyError {
    /// Identity of the intent that failed.
    pub fn identity(&self) -> &str {
        match self {
            Self::Filesystem { identity, .. }
            | Self::Database { identity, .. }
            | Self::Vhost { identity, .. } => identity,
        }
    }
}

/// Applies filesystem intents: directories and symlinks.
pub trait FileProvisioner {
    /// Converge one directory to its intent.
    fn apply_directory(&self, intent: &DirectoryIntent) -> Result<(), ProvisionError>;

    /// Converge one symlink to its intent.
    fn apply_symlink(&self, intent: &SymlinkIntent) -> Result<(), ProvisionError>;
}

/// Applies database intents: schema, user, and grants as one unit.
pub trait DatabaseProvisioner {
    /// Converge one instance database to its intent.
    fn apply_database(&self, intent: &DatabaseIntent) -> Result<(), ProvisionError>;
}

/// Applies vhost intents against the web server configuration.
pub trait VhostProvisioner {
    /// Converge one virtual host to its intent.
    fn apply_vhost(&self, intent: &VhostIntent) -> Result<(), ProvisionError>;
}

/// Counters for one apply pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub directories: usize,
    pub symlinks: usize,
    pub databases: usize,
    pub vhosts: usize,
}

impl ApplyStats {
    /// Total intents applied.
    pub fn total(&self) -> usize {
        self.directories + self.symlinks + self.databases + self.vhosts
    }
}

/// Dispatches an ordered intent set to the injected provisioners.
pub struct IntentApplier<'a> {
    files: &'a dyn FileProvisioner,
    databases: &'a dyn DatabaseProvisioner,
    vhosts: &'a dyn VhostProvisioner,
}

impl<'a> IntentApplier<'a> {
    /// Create an applier over the three provisioner seams.
    pub fn new(
        files: &'a dyn FileProvisioner,
        databases: &'a dyn DatabaseProvisioner,
        vhosts: &'a dyn VhostProvisioner,
    ) -> Self {
        Self {
            files,
            databases,
            vhosts,
        }
    }

    /// Apply intents in the given order, stopping at the first failure.
    pub fn apply(&self, intents: &[ResourceIntent]) -> Result<ApplyStats, ApplyError> {
        let mut stats = ApplyStats::default();

        for intent in intents {
            debug!(intent = %intent, "Applying intent");

            match intent {
                ResourceIntent::Directory(dir) => {
                    self.files
                        .apply_directory(dir)
                        .map_err(|source| ApplyError::Filesystem {
                            identity: intent.identity(),
                            source,
                        })?;
                    stats.directories += 1;
                }
                ResourceIntent::Symlink(link) => {
                    self.files
                        .apply_symlink(link)
                        .map_err(|source| ApplyError::Filesystem {
                            identity: intent.identity(),
                            source,
                        })?;
                    stats.symlinks += 1;
                }
                ResourceIntent::Database(db) => {
                    self.databases
                        .apply_database(db)
                        .map_err(|source| ApplyError::Database {
                            identity: intent.identity(),
                            source,
                        })?;
                    stats.databases += 1;
                }
                ResourceIntent::Vhost(vhost) => {
                    self.vhosts
                        .apply_vhost(vhost)
                        .map_err(|source| ApplyError::Vhost {
                            identity: intent.identity(),
                            source,
                        })?;
                    stats.vhosts += 1;
                }
            }
        }

        Ok(stats)
    }
}

/// Recording provisioner for tests and development.
///
/// Implements all three provisioner traits, appending each applied
/// intent's identity to an in-order log. Can be configured to fail on a
/// specific identity to exercise fail-fast behavior.
#[derive(Debug, Default)]
pub struct RecordingProvisioner {
    applied: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

impl RecordingProvisioner {
    /// Create a recording provisioner that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recording provisioner that fails on one intent identity.
    pub fn failing_on(identity: impl Into<String>) -> Self {
        Self {
            applied: Mutex::new(Vec::new()),
            fail_on: Some(identity.into()),
        }
    }

    /// Identities applied so far, in application order.
    pub fn applied(&self) -> Vec<String> {
        self.applied.lock().unwrap().clone()
    }

    fn record(&self, identity: String) -> Result<(), ProvisionError> {
        if self.fail_on.as_deref() == Some(identity.as_str()) {
            return Err(ProvisionError::new(format!("configured to fail: {identity}")));
        }
        self.applied.lock().unwrap().push(identity);
        Ok(())
    }
}

impl FileProvisioner for RecordingProvisioner {
    fn apply_directory(&self, intent: &DirectoryIntent) -> Result<(), ProvisionError> {
        self.record(format!("directory:{}", intent.path.display()))
    }

    fn apply_symlink(&self, intent: &SymlinkIntent) -> Result<(), ProvisionError> {
        self.record(format!("symlink:{}", intent.path.display()))
    }
}

impl DatabaseProvisioner for RecordingProvisioner {
    fn apply_database(&self, intent: &DatabaseIntent) -> Result<(), ProvisionError> {
        self.record(format!("database:{}", intent.name))
    }
}

impl VhostProvisioner for RecordingProvisioner {
    fn apply_vhost(&self, intent: &VhostIntent) -> Result<(), ProvisionError> {
        self.record(format!("vhost:{}", intent.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use wikifarm_intent::{Ensure, FileMode, FileOwner};

    fn sample_intents() -> Vec<ResourceIntent> {
        vec![
            ResourceIntent::Directory(DirectoryIntent {
                path: PathBuf::from("/etc/mediawiki/wiki1"),
                ensure: Ensure::Present,
                owner: FileOwner::root_root(),
                mode: FileMode::DIR,
                recurse_on_remove: false,
            }),
            ResourceIntent::Symlink(SymlinkIntent {
                path: PathBuf::from("/var/www/wikis/wiki1"),
                ensure: Ensure::Present,
                owner: FileOwner::root_root(),
                mode: None,
                target: PathBuf::from("/etc/mediawiki/wiki1"),
            }),
            ResourceIntent::Vhost(VhostIntent {
                name: "wiki1".to_string(),
                port: 80,
                docroot: PathBuf::from("/var/www/wikis"),
                server_admin: "admin@example.com".to_string(),
                template: "instance-vhost".to_string(),
                ensure: Ensure::Present,
            }),
        ]
    }

    #[test]
    fn applies_in_order() {
        let provisioner = RecordingProvisioner::new();
        let applier = IntentApplier::new(&provisioner, &provisioner, &provisioner);

        let stats = applier.apply(&sample_intents()).unwrap();

        assert_eq!(stats.directories, 1);
        assert_eq!(stats.symlinks, 1);
        assert_eq!(stats.vhosts, 1);
        assert_eq!(stats.total(), 3);
        assert_eq!(
            provisioner.applied(),
            vec![
                "directory:/etc/mediawiki/wiki1",
                "symlink:/var/www/wikis/wiki1",
                "vhost:wiki1",
            ]
        );
    }

    #[test]
    fn stops_at_first_failure() {
        let provisioner = RecordingProvisioner::failing_on("symlink:/var/www/wikis/wiki1");
        let applier = IntentApplier::new(&provisioner, &provisioner, &provisioner);

        let err = applier.apply(&sample_intents()).unwrap_err();

        assert_eq!(err.identity(), "symlink:/var/www/wikis/wiki1");
        assert!(matches!(err, ApplyError::Filesystem { .. }));
        // The vhost intent after the failure was never attempted.
        assert_eq!(provisioner.applied(), vec!["directory:/etc/mediawiki/wiki1"]);
    }

    #[test]
    fn database_failure_is_tagged() {
        let provisioner = RecordingProvisioner::failing_on("database:wiki1");
        let applier = IntentApplier::new(&provisioner, &provisioner, &provisioner);

        let intents = vec![ResourceIntent::Database(DatabaseIntent {
            name: "wiki1".to_string(),
            user: "wiki1".to_string(),
            password: "pw".to_string(),
            host: "localhost".to_string(),
            grant: "all".to_string(),
            ensure: Ensure::Absent,
        })];

        let err = applier.apply(&intents).unwrap_err();
        assert!(matches!(err, ApplyError::Database { .. }));
    }
}
