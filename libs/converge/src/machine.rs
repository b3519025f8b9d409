//! The instance lifecycle state machine.
//!
//! Given a target state and resolved parameters, emits the full ordered
//! set of resource intents for one instance. No previous state is
//! consulted; idempotence comes from each intent being safe to re-apply,
//! not from diffing history.
//!
//! Intent order encodes the dependency order the applying runtime must
//! respect: config directory before its contents, contents before the
//! public link, public link before the vhost. On deletion the database
//! drop leads, independent of filesystem removal.

use tracing::{debug, warn};
use wikifarm_intent::{
    DatabaseIntent, DirectoryIntent, Ensure, FileMode, FileOwner, ResourceIntent, SymlinkIntent,
    VhostIntent, DEFAULT_DB_GRANT, DEFAULT_DB_HOST, DEFAULT_VHOST_PORT, VHOST_TEMPLATE,
};

use crate::config::SiteConfig;
use crate::error::ConfigError;
use crate::name::InstanceName;
use crate::params::{resolve, InstanceParams, ResolvedParams, TargetState};
use crate::paths::{plan_paths, PathSet};

/// The planned intent set for one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstancePlan {
    name: InstanceName,
    ensure: TargetState,
    intents: Vec<ResourceIntent>,
}

impl InstancePlan {
    /// The instance this plan converges.
    pub fn name(&self) -> &InstanceName {
        &self.name
    }

    /// The target state the plan was computed for.
    pub fn ensure(&self) -> TargetState {
        self.ensure
    }

    /// Intents in application order.
    pub fn intents(&self) -> &[ResourceIntent] {
        &self.intents
    }

    /// Consume the plan, yielding intents in application order.
    pub fn into_intents(self) -> Vec<ResourceIntent> {
        self.intents
    }

    /// The database intent, if this plan carries one.
    pub fn database_intent(&self) -> Option<&DatabaseIntent> {
        self.intents.iter().find_map(|intent| match intent {
            ResourceIntent::Database(db) => Some(db),
            _ => None,
        })
    }

    /// The vhost intent. Every plan carries exactly one.
    pub fn vhost_intent(&self) -> Option<&VhostIntent> {
        self.intents.iter().find_map(|intent| match intent {
            ResourceIntent::Vhost(vhost) => Some(vhost),
            _ => None,
        })
    }
}

/// Plan the intent set for one instance.
///
/// Resolution and planning either complete in full or fail without
/// emitting anything; a plan is never partial.
pub fn plan_instance(
    name: &InstanceName,
    params: &InstanceParams,
    site: &SiteConfig,
) -> Result<InstancePlan, ConfigError> {
    let resolved = resolve(name, params, site)?;
    let paths = plan_paths(name, site);

    let intents = match resolved.ensure {
        TargetState::Present | TargetState::Absent => {
            retained_intents(name, &resolved, &paths, site)
        }
        TargetState::Deleted => {
            warn!(instance = %name, "Planning irreversible instance deletion");
            deletion_intents(name, &resolved, &paths, site)
        }
    };

    debug!(
        instance = %name,
        ensure = %resolved.ensure,
        intent_count = intents.len(),
        "Planned instance"
    );

    Ok(InstancePlan {
        name: name.clone(),
        ensure: resolved.ensure,
        intents,
    })
}

/// Intents for the present and absent states.
///
/// Both keep the instance's files and database intact; they differ only in
/// whether the vhost serves. Disabling an instance must never lose data.
fn retained_intents(
    name: &InstanceName,
    resolved: &ResolvedParams,
    paths: &PathSet,
    site: &SiteConfig,
) -> Vec<ResourceIntent> {
    let mut intents = Vec::with_capacity(paths.shared_links.len() + 4);

    intents.push(ResourceIntent::Directory(DirectoryIntent {
        path: paths.config_dir.clone(),
        ensure: Ensure::Present,
        owner: FileOwner::root_root(),
        mode: FileMode::DIR,
        recurse_on_remove: false,
    }));

    intents.push(ResourceIntent::Directory(DirectoryIntent {
        path: paths.images_dir.clone(),
        ensure: Ensure::Present,
        owner: FileOwner::root_group(&site.web_group),
        mode: FileMode::DIR,
        recurse_on_remove: false,
    }));

    for shared in &paths.shared_links {
        intents.push(ResourceIntent::Symlink(SymlinkIntent {
            path: shared.link.clone(),
            ensure: Ensure::Present,
            owner: FileOwner::root_root(),
            mode: Some(FileMode::DIR),
            target: shared.target.clone(),
        }));
    }

    intents.push(ResourceIntent::Symlink(SymlinkIntent {
        path: paths.public_link.clone(),
        ensure: Ensure::Present,
        owner: FileOwner::root_root(),
        mode: None,
        target: paths.config_dir.clone(),
    }));

    intents.push(vhost_intent(name, resolved, site));

    intents
}

/// Intents for the deleted state.
///
/// A strict superset of absent's removals: the database drop is added and
/// the config directory goes recursively, taking the images directory and
/// shared links with it.
fn deletion_intents(
    name: &InstanceName,
    resolved: &ResolvedParams,
    paths: &PathSet,
    site: &SiteConfig,
) -> Vec<ResourceIntent> {
    let mut intents = Vec::with_capacity(4);

    // Database credentials are only known when the caller supplied a
    // password; without one the database lifecycle stays out of band.
    if let Some(password) = &resolved.db_password {
        intents.push(ResourceIntent::Database(DatabaseIntent {
            name: resolved.db_name.clone(),
            user: resolved.db_user.clone(),
            password: password.clone(),
            host: DEFAULT_DB_HOST.to_string(),
            grant: DEFAULT_DB_GRANT.to_string(),
            ensure: Ensure::Absent,
        }));
    }

    intents.push(ResourceIntent::Directory(DirectoryIntent {
        path: paths.config_dir.clone(),
        ensure: Ensure::Absent,
        owner: FileOwner::root_root(),
        mode: FileMode::DIR,
        recurse_on_remove: true,
    }));

    intents.push(ResourceIntent::Symlink(SymlinkIntent {
        path: paths.public_link.clone(),
        ensure: Ensure::Absent,
        owner: FileOwner::root_root(),
        mode: None,
        target: paths.config_dir.clone(),
    }));

    intents.push(vhost_intent(name, resolved, site));

    intents
}

fn vhost_intent(
    name: &InstanceName,
    resolved: &ResolvedParams,
    site: &SiteConfig,
) -> ResourceIntent {
    let ensure = if resolved.ensure.is_served() {
        Ensure::Present
    } else {
        Ensure::Absent
    };

    ResourceIntent::Vhost(VhostIntent {
        name: name.to_string(),
        port: DEFAULT_VHOST_PORT,
        docroot: site.doc_root.clone(),
        server_admin: resolved.admin_email.clone(),
        template: VHOST_TEMPLATE.to_string(),
        ensure,
    })
}
