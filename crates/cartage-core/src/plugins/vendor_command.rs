//! Runs a user-configured dependency vendoring command.
//!
//! ```toml
//! [plugins.vendor_command]
//! command = ["bundle", "install", "--deployment"]
//! paths = ["vendor/bundle"]
//! ```

use std::any::Any;
use std::path::PathBuf;

use serde::Deserialize;

use crate::cartage::Cartage;
use crate::config::PluginConfig;
use crate::error::Result;
use crate::plugin::{Capabilities, Feature, Plugin};
use crate::process::CommandLine;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VendorCommandSettings {
    /// Program and arguments, run in the work area
    #[serde(default)]
    pub command: Vec<String>,

    /// Vendored paths relative to the work area, stored in the dependency
    /// cache
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

/// Offers `vendor_dependencies` only when a command is configured.
#[derive(Debug, Default)]
pub struct VendorCommand {
    command: Option<CommandLine>,
    paths: Vec<PathBuf>,
}

impl Plugin for VendorCommand {
    fn capabilities(&self) -> Capabilities {
        Capabilities::new().with(Feature::VendorDependencies)
    }

    fn offer_feature(&self, feature: Feature) -> bool {
        self.command.is_some() && self.capabilities().contains(feature)
    }

    fn resolve_plugin_config(&mut self, config: &PluginConfig) -> Result<()> {
        let settings: VendorCommandSettings = config.settings()?;
        self.command = if settings.command.is_empty() {
            None
        } else {
            Some(CommandLine::from_argv(settings.command)?)
        };
        self.paths = settings.paths;
        Ok(())
    }

    fn invoke(&self, feature: Feature, cx: &Cartage) -> Result<()> {
        let Some(command) = &self.command else {
            return Ok(());
        };
        if feature != Feature::VendorDependencies {
            return Ok(());
        }

        cx.display("Vendoring dependencies...");
        let command = command.clone().current_dir(&cx.work_path()?);
        cx.runner().run(&command)?;
        Ok(())
    }

    fn vendored_paths(&self, _cx: &Cartage) -> Vec<PathBuf> {
        self.paths.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
