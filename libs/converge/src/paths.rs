//! Filesystem path planning for an instance.
//!
//! Pure path arithmetic: nothing here touches the filesystem. Existence
//! checks and creation belong to the applying runtime.

use std::path::PathBuf;

use crate::config::SiteConfig;
use crate::name::InstanceName;

/// Shared application files symlinked into every instance directory.
///
/// The catalog is version-pinned: adding an entry is a module version
/// change, not a parameter.
pub const SHARED_FILES: [&str; 19] = [
    "api.php",
    "config",
    "extensions",
    "img_auth.php",
    "includes",
    "index.php",
    "load.php",
    "languages",
    "maintenance",
    "mw-config",
    "opensearch_desc.php",
    "profileinfo.php",
    "redirect.php",
    "redirect.phtml",
    "resources",
    "skins",
    "thumb_handler.php",
    "thumb.php",
    "wiki.phtml",
];

/// One shared-file symlink: the link inside the instance directory and its
/// target inside the shared install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedLink {
    /// Link path under the instance config directory.
    pub link: PathBuf,

    /// Target path under the shared install root.
    pub target: PathBuf,
}

/// The full set of filesystem paths an instance occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSet {
    /// Per-instance configuration directory.
    pub config_dir: PathBuf,

    /// Writable images directory inside the config directory.
    pub images_dir: PathBuf,

    /// Symlinks into the shared install, one per catalog entry.
    pub shared_links: Vec<SharedLink>,

    /// Public symlink under the document root.
    pub public_link: PathBuf,
}

/// Compute the paths for one instance. Deterministic, no I/O.
pub fn plan_paths(name: &InstanceName, site: &SiteConfig) -> PathSet {
    let config_dir = site.config_root.join(name.as_str());
    let images_dir = config_dir.join("images");

    let shared_links = SHARED_FILES
        .iter()
        .map(|entry| SharedLink {
            link: config_dir.join(entry),
            target: site.install_root.join(entry),
        })
        .collect();

    let public_link = site.doc_root.join(name.as_str());

    PathSet {
        config_dir,
        images_dir,
        shared_links,
        public_link,
    }
}
