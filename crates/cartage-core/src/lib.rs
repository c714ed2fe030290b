//! Cartage Core Library
//!
//! Builds reproducible release packages from a git checkout: a manifest of
//! packaged files, a clean work area, release metadata, an optional
//! dependency cache, and a compressed tarball produced by plug-ins.

pub mod cartage;
pub mod compression;
pub mod config;
pub mod error;
pub mod ignore;
pub mod manifest;
pub mod metadata;
mod pipeline;
pub mod plugin;
pub mod plugins;
pub mod process;
pub mod vcs;

/// The cartage version, reported for built-in plug-ins.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cartage::Cartage;
pub use error::{Error, Result};

/// Re-exports of commonly used types
pub mod prelude {
    // Run context
    pub use crate::cartage::Cartage;
    pub use crate::compression::Compression;
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::{CartageConfig, PluginConfig};

    // Manifest
    pub use crate::manifest::{IgnoreFileAction, IgnoreMode, Manifest, ManifestCheck};

    // Plug-ins
    pub use crate::plugin::{Capabilities, Feature, Plugin, PluginRegistry, Plugins};
    pub use crate::plugins::{BuildTarball, VendorCommand};

    // Metadata
    pub use crate::metadata::ReleaseMetadata;

    // Version control
    pub use crate::vcs::{GitRepository, Vcs};
}
