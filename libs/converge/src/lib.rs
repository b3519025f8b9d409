//! # wikifarm-converge
//!
//! Instance lifecycle planning for a wiki farm host.
//!
//! Given a per-instance declaration (name, target state, parameters) and
//! the host's site configuration, this crate resolves parameters, computes
//! paths, and emits the ordered set of resource intents that converge the
//! host toward the declared state. Planning is pure: no filesystem,
//! database, or web server access happens here.
//!
//! ## Target states
//!
//! - **present**: instance files, shared links, and vhost all exist
//! - **absent**: serving disabled, data and database retained (reversible)
//! - **deleted**: data removed and database dropped (irreversible)
//!
//! ## Design principles
//!
//! - Planning is deterministic: identical inputs produce identical plans
//! - No intent carries memory of prior runs; idempotence lives in the
//!   applier (create-if-missing, remove-if-present)
//! - Errors surface before any intent is emitted, never mid-plan

mod config;
mod error;
mod host;
mod machine;
mod name;
mod params;
mod paths;

pub use config::{
    Platform, SiteConfig, DEFAULT_CONFIG_ROOT, DEFAULT_DOC_ROOT, DEFAULT_INSTALL_ROOT,
};
pub use error::{ConfigError, NameError};
pub use host::{ConvergeStats, HostPlan};
pub use machine::{plan_instance, InstancePlan};
pub use name::{InstanceName, MAX_NAME_LENGTH};
pub use params::{resolve, InstanceParams, ResolvedParams, TargetState};
pub use paths::{plan_paths, PathSet, SharedLink, SHARED_FILES};
