//! Configuration schema for cartage.toml

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::compression::Compression;
use crate::error::{Error, Result};

/// Root configuration structure for cartage.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartageConfig {
    /// Package name; defaults to the basename of the origin repo URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Where the final package is written; defaults to `<root>/tmp`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,

    /// Package source root; defaults to the repository work tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_path: Option<PathBuf>,

    /// Timestamp for the final package name. Not validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<Compression>,

    #[serde(default)]
    pub quiet: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub disable_dependency_cache: bool,

    /// Directory holding `dependency-cache.tar*`; defaults to `<root>/tmp`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_cache_path: Option<PathBuf>,

    /// Pins the release hashref instead of reading `HEAD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_hashref: Option<String>,

    /// Plug-in configuration, keyed by plug-in name
    #[serde(default)]
    pub plugins: BTreeMap<String, PluginConfig>,

    /// Command configuration, keyed by primary command name
    #[serde(default)]
    pub commands: BTreeMap<String, toml::Table>,
}

impl CartageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// The configuration subset for the plug-in `name`. Missing entries yield
    /// an empty (enabled) configuration.
    pub fn for_plugin(&self, name: &str) -> PluginConfig {
        self.plugins.get(name).cloned().unwrap_or_default()
    }

    /// The configuration subset for the command `name`.
    pub fn for_command(&self, name: &str) -> toml::Table {
        self.commands.get(name).cloned().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name
            && (matches!(name.as_str(), "" | "." | "..") || name.contains('/'))
        {
            return Err(Error::configuration(format!(
                "Invalid package name {name:?}: must be a single path component"
            )));
        }
        Ok(())
    }
}

/// Configuration for a single plug-in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Disables the plug-in for the run
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,

    /// Plug-in specific settings
    #[serde(flatten)]
    pub settings: toml::Table,
}

impl PluginConfig {
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            settings: toml::Table::new(),
        }
    }

    /// Deserialize the plug-in specific settings into `T`.
    pub fn settings<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(toml::Value::Table(self.settings.clone()).try_into()?)
    }
}
