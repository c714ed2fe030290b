//! Config path resolution helpers.

use std::path::{Path, PathBuf};

/// Project configuration files, in search order.
pub const DEFAULT_CONFIG_FILES: [&str; 3] =
    ["config/cartage.toml", "cartage.toml", ".cartage.toml"];

/// Find the first default configuration file that exists under `base_dir`.
pub fn find_config_file(base_dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_FILES
        .iter()
        .map(|name| base_dir.join(name))
        .find(|path| path.is_file())
}
