//! Packages the work area as a tarball.

use std::any::Any;
use std::path::PathBuf;

use crate::cartage::Cartage;
use crate::error::Result;
use crate::plugin::{Capabilities, Feature, Plugin};
use crate::process::CommandLine;

/// Creates `<final_name>.tar<ext>` from the work area.
///
/// Requests `pre_build_tarball` before and `post_build_tarball` after
/// writing the tarball.
#[derive(Debug, Default)]
pub struct BuildTarball;

impl BuildTarball {
    /// The final tarball path.
    pub fn package_name(&self, cx: &Cartage) -> Result<PathBuf> {
        let mut name = cx.final_name()?.into_os_string();
        name.push(format!(".tar{}", cx.compression().extension()));
        Ok(PathBuf::from(name))
    }

    fn build(&self, cx: &Cartage) -> Result<()> {
        let package = self.package_name(cx)?;
        if let Some(parent) = package.parent() {
            std::fs::create_dir_all(parent)?;
        }

        cx.display(format!("Creating {}...", package.display()));
        let tar = CommandLine::new("tar")
            .arg(format!("cf{}", cx.compression().tar_flag()))
            .path_arg(&package)
            .arg("-C")
            .path_arg(&cx.tmp_path())
            .arg(cx.name()?);
        cx.runner().run(&tar)?;
        Ok(())
    }
}

impl Plugin for BuildTarball {
    fn capabilities(&self) -> Capabilities {
        Capabilities::new().with(Feature::BuildPackage)
    }

    fn invoke(&self, feature: Feature, cx: &Cartage) -> Result<()> {
        if feature != Feature::BuildPackage {
            return Ok(());
        }
        cx.plugins().request(Feature::PreBuildTarball, cx)?;
        self.build(cx)?;
        cx.plugins().request(Feature::PostBuildTarball, cx)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
