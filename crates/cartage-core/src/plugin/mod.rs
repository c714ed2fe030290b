//! Plug-in layer: the [`Plugin`] capability interface, the process-wide
//! [`PluginRegistry`], and the per-run [`Plugins`] collection.
//!
//! Plug-ins declare the [`Feature`]s they provide through [`Capabilities`].
//! The build pipeline broadcasts a feature to every enabled plug-in offering
//! it, in registration order.

mod instances;
mod registry;

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use crate::cartage::Cartage;
use crate::config::PluginConfig;
use crate::error::Result;

pub use instances::{PluginInstance, Plugins};
pub use registry::{PluginDescriptor, PluginRegistry, register, registered};

/// A pipeline hook a plug-in may provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feature {
    VendorDependencies,
    PreBuildPackage,
    BuildPackage,
    PostBuildPackage,
    PreBuildTarball,
    PostBuildTarball,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::VendorDependencies,
        Feature::PreBuildPackage,
        Feature::BuildPackage,
        Feature::PostBuildPackage,
        Feature::PreBuildTarball,
        Feature::PostBuildTarball,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::VendorDependencies => "vendor_dependencies",
            Feature::PreBuildPackage => "pre_build_package",
            Feature::BuildPackage => "build_package",
            Feature::PostBuildPackage => "post_build_package",
            Feature::PreBuildTarball => "pre_build_tarball",
            Feature::PostBuildTarball => "post_build_tarball",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of features a plug-in declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    features: BTreeSet<Feature>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, feature: Feature) -> Self {
        self.features.insert(feature);
        self
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        self.features.iter().copied()
    }
}

impl FromIterator<Feature> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

/// A cartage plug-in.
///
/// Implementations must be `Default` to be registered; the registry
/// constructs one instance per run. Plug-ins receive the run context on
/// every call, so they may query paths and configuration or dispatch
/// further features themselves.
pub trait Plugin: Any + fmt::Debug {
    /// Features this plug-in provides.
    fn capabilities(&self) -> Capabilities;

    /// Whether this plug-in currently offers `feature`. Defaults to the
    /// declared capabilities.
    fn offer_feature(&self, feature: Feature) -> bool {
        self.capabilities().contains(feature)
    }

    /// Receive the `[plugins.<name>]` configuration before the run.
    fn resolve_plugin_config(&mut self, _config: &PluginConfig) -> Result<()> {
        Ok(())
    }

    /// Perform `feature`.
    fn invoke(&self, feature: Feature, cx: &Cartage) -> Result<()>;

    /// Paths, relative to the work area, produced by `vendor_dependencies`.
    fn vendored_paths(&self, _cx: &Cartage) -> Vec<PathBuf> {
        Vec::new()
    }

    fn version(&self) -> &'static str {
        crate::VERSION
    }

    fn as_any(&self) -> &dyn Any;
}

/// The registered name of plug-in type `P`: the type name in snake case
/// (`BuildTarball` becomes `build_tarball`).
pub fn plugin_name<P: ?Sized>() -> String {
    let full = std::any::type_name::<P>();
    let base = full.split('<').next().unwrap_or(full);
    let short = base.rsplit("::").next().unwrap_or(base);
    to_snake_case(short)
}

fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|j| chars[j]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
