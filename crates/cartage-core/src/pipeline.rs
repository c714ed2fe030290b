//! The build pipeline: work area, restored files, metadata, vendoring, and
//! the `build_package` feature broadcast.

use std::path::{Path, PathBuf};

use crate::cartage::Cartage;
use crate::error::{Error, Result};
use crate::metadata::RELEASE_METADATA_FILE;
use crate::plugin::Feature;
use crate::process::CommandLine;

impl Cartage {
    /// Build the release package. Every step is fatal; nothing is rolled
    /// back on failure.
    pub fn build_package(&self) -> Result<()> {
        tracing::debug!(timestamp = self.timestamp(), "Building package");

        self.prepare_work_area()?;
        self.restore_modified_files()?;
        self.save_release_metadata()?;
        self.vendor_dependencies()?;

        self.plugins().request(Feature::PreBuildPackage, self)?;
        self.plugins().request(Feature::BuildPackage, self)?;
        self.plugins().request(Feature::PostBuildPackage, self)?;
        Ok(())
    }

    /// Write `release-metadata.json` into `dir`.
    pub fn save_local_release_metadata(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(RELEASE_METADATA_FILE);
        std::fs::write(&path, self.release_metadata()?.to_json()?)?;
        Ok(path)
    }

    /// Recreate the work area and copy the resolved manifest into it.
    fn prepare_work_area(&self) -> Result<()> {
        self.display("Preparing cartage work area...");

        let work_path = self.work_path()?;
        if work_path.exists() {
            std::fs::remove_dir_all(&work_path)?;
        }
        std::fs::create_dir_all(&work_path)?;

        let parent = self.root_path().parent().ok_or_else(|| {
            Error::configuration(format!(
                "Cannot package the filesystem root {}",
                self.root_path().display()
            ))
        })?;

        self.manifest()
            .resolve(Some(self.root_path()), |file_list| {
                let create = CommandLine::new("tar")
                    .args(["cf", "-", "-C"])
                    .path_arg(parent)
                    .args(["-h", "-T"])
                    .path_arg(file_list);
                let extract = CommandLine::new("tar")
                    .args(["xf", "-", "-C"])
                    .path_arg(&work_path)
                    .arg("--strip-components=1");
                self.runner().pipe(&create, &extract)
            })
    }

    /// Replace locally modified files in the work area with their content at
    /// the release hashref.
    fn restore_modified_files(&self) -> Result<()> {
        let work_path = self.work_path()?;
        let hashref = self.release_hashref()?;

        for file in self.vcs().modified_files()? {
            let target = work_path.join(&file);
            if !target.exists() {
                tracing::debug!("Not restoring {file}: excluded from the package");
                continue;
            }
            match self.vcs().show(hashref, &file)? {
                Some(content) => {
                    tracing::debug!("Restoring {file} from {hashref}");
                    std::fs::write(&target, content)?;
                }
                None => tracing::warn!("Cannot restore {file}: not present at {hashref}"),
            }
        }
        Ok(())
    }

    fn save_release_metadata(&self) -> Result<()> {
        self.display("Saving release metadata...");

        let json = self.release_metadata()?.to_json()?;
        std::fs::write(self.work_path()?.join(RELEASE_METADATA_FILE), &json)?;

        let final_json = self.final_release_metadata_json()?;
        if let Some(parent) = final_json.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(final_json, json)?;
        Ok(())
    }

    fn vendor_dependencies(&self) -> Result<()> {
        self.extract_dependency_cache()?;
        self.plugins().request(Feature::VendorDependencies, self)?;

        let paths: Vec<PathBuf> = self
            .plugins()
            .request_map(Feature::VendorDependencies, self, |plugin, cx| {
                plugin.vendored_paths(cx)
            })?
            .into_iter()
            .flatten()
            .collect();
        self.create_dependency_cache(&paths)
    }

    fn extract_dependency_cache(&self) -> Result<()> {
        let cache = self.dependency_cache();
        if !self.dependency_cache_enabled() || !cache.exists() {
            return Ok(());
        }

        self.display(format!("Extracting {}...", cache.display()));
        let extract = CommandLine::new("tar")
            .arg(format!("xf{}", self.compression().tar_flag()))
            .path_arg(&cache)
            .arg("-C")
            .path_arg(&self.work_path()?);
        self.runner().run(&extract)?;
        Ok(())
    }

    fn create_dependency_cache(&self, paths: &[PathBuf]) -> Result<()> {
        if !self.dependency_cache_enabled() || paths.is_empty() {
            return Ok(());
        }

        let cache = self.dependency_cache();
        std::fs::create_dir_all(self.dependency_cache_path())?;

        let work_path = self.work_path()?;
        let mut create = CommandLine::new("tar")
            .arg(format!("cf{}", self.compression().tar_flag()))
            .path_arg(&cache)
            .arg("-C")
            .path_arg(&work_path);
        for path in paths {
            create = create.path_arg(path.strip_prefix(&work_path).unwrap_or(path));
        }
        self.runner().run(&create)?;
        Ok(())
    }
}
