//! The run context shared by the pipeline, commands, and plug-ins.

use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::compression::Compression;
use crate::config::CartageConfig;
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::metadata::{PackageMetadata, ReleaseMetadata, RepoMetadata};
use crate::plugin::{self, Plugin, PluginRegistry, Plugins};
use crate::process::CommandRunner;
use crate::vcs::{GitRepository, Vcs};

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
pub const DEPENDENCY_CACHE_BASENAME: &str = "dependency-cache";

/// A single packaging run.
///
/// Derived values (name, timestamp, hashref, repository URL) are computed
/// on first use and stay fixed for the rest of the run.
#[derive(Debug)]
pub struct Cartage {
    config: CartageConfig,
    root_path: PathBuf,
    vcs: Box<dyn Vcs>,
    runner: CommandRunner,
    plugins: Plugins,
    name: OnceCell<String>,
    timestamp: OnceCell<String>,
    release_hashref: OnceCell<String>,
    repo_url: OnceCell<String>,
}

impl Cartage {
    /// Open the repository for `config` and set up the process-wide plug-ins.
    ///
    /// The package root is `root_path` when configured (relative to the
    /// current directory), otherwise the top of the enclosing work tree.
    pub fn new(config: CartageConfig) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let vcs = match &config.root_path {
            Some(root) => GitRepository::open_at(&cwd.join(root))?,
            None => GitRepository::discover(&cwd)?,
        };
        Self::with_vcs(config, Box::new(vcs), &plugin::registered())
    }

    /// Build a run from explicit collaborators.
    pub fn with_vcs(
        config: CartageConfig,
        vcs: Box<dyn Vcs>,
        registry: &PluginRegistry,
    ) -> Result<Self> {
        config.validate()?;

        let mut plugins = Plugins::from_registry(registry);
        plugins.resolve_config(&config)?;

        Ok(Self {
            root_path: vcs.root(),
            runner: CommandRunner::new(config.quiet).verbose(config.verbose),
            config,
            vcs,
            plugins,
            name: OnceCell::new(),
            timestamp: OnceCell::new(),
            release_hashref: OnceCell::new(),
            repo_url: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &CartageConfig {
        &self.config
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn vcs(&self) -> &dyn Vcs {
        self.vcs.as_ref()
    }

    pub fn runner(&self) -> &CommandRunner {
        &self.runner
    }

    pub fn plugins(&self) -> &Plugins {
        &self.plugins
    }

    /// The run's instance of plug-in `P`.
    pub fn plugin<P: Plugin>(&self) -> Option<&P> {
        self.plugins.typed::<P>()
    }

    pub fn quiet(&self) -> bool {
        self.config.quiet
    }

    pub fn verbose(&self) -> bool {
        self.config.verbose
    }

    pub fn manifest(&self) -> Manifest<'_> {
        Manifest::new(&self.root_path, self.vcs.as_ref()).quiet(self.quiet())
    }

    /// Progress message shown in verbose mode.
    pub fn display(&self, message: impl fmt::Display) {
        tracing::info!("{message}");
    }

    /// Package name: configured, or the origin URL basename without `.git`.
    pub fn name(&self) -> Result<&str> {
        memoize(&self.name, || match &self.config.name {
            Some(name) => Ok(name.clone()),
            None => name_from_url(self.repo_url()?),
        })
    }

    pub fn repo_url(&self) -> Result<&str> {
        memoize(&self.repo_url, || self.vcs.remote_url())
    }

    /// The commit being packaged: configured, or `HEAD`.
    pub fn release_hashref(&self) -> Result<&str> {
        memoize(&self.release_hashref, || match &self.config.release_hashref {
            Some(hashref) => Ok(hashref.clone()),
            None => self.vcs.head_hashref(),
        })
    }

    /// Configured timestamp, or the current UTC time as `%Y%m%d%H%M%S`.
    pub fn timestamp(&self) -> &str {
        self.timestamp.get_or_init(|| match &self.config.timestamp {
            Some(timestamp) => timestamp.clone(),
            None => chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string(),
        })
    }

    pub fn compression(&self) -> Compression {
        self.config.compression.unwrap_or_default()
    }

    pub fn tmp_path(&self) -> PathBuf {
        self.root_path.join("tmp")
    }

    pub fn work_path(&self) -> Result<PathBuf> {
        Ok(self.tmp_path().join(self.name()?))
    }

    /// Directory receiving the final package and its metadata.
    pub fn target(&self) -> PathBuf {
        match &self.config.target {
            Some(target) => self.root_path.join(target),
            None => self.tmp_path(),
        }
    }

    /// `<target>/<name>-<timestamp>`, the stem of every final artifact.
    pub fn final_name(&self) -> Result<PathBuf> {
        Ok(self
            .target()
            .join(format!("{}-{}", self.name()?, self.timestamp())))
    }

    pub fn final_release_metadata_json(&self) -> Result<PathBuf> {
        let mut path = self.final_name()?.into_os_string();
        path.push("-release-metadata.json");
        Ok(PathBuf::from(path))
    }

    pub fn dependency_cache_enabled(&self) -> bool {
        !self.config.disable_dependency_cache
    }

    pub fn dependency_cache_path(&self) -> PathBuf {
        match &self.config.dependency_cache_path {
            Some(path) => self.root_path.join(path),
            None => self.tmp_path(),
        }
    }

    /// `<cache path>/dependency-cache.tar<ext>`
    pub fn dependency_cache(&self) -> PathBuf {
        self.dependency_cache_path().join(format!(
            "{DEPENDENCY_CACHE_BASENAME}.tar{}",
            self.compression().extension()
        ))
    }

    pub fn release_metadata(&self) -> Result<ReleaseMetadata> {
        Ok(ReleaseMetadata {
            package: PackageMetadata {
                name: self.name()?.to_string(),
                repo: RepoMetadata {
                    kind: self.vcs.kind().to_string(),
                    url: self.repo_url()?.to_string(),
                },
                hashref: self.release_hashref()?.to_string(),
                timestamp: self.timestamp().to_string(),
            },
        })
    }
}

fn memoize<'a>(cell: &'a OnceCell<String>, init: impl FnOnce() -> Result<String>) -> Result<&'a str> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = init()?;
    Ok(cell.get_or_init(|| value))
}

fn name_from_url(url: &str) -> Result<String> {
    let trimmed = url.trim_end_matches('/');
    let base = trimmed
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(trimmed);
    let name = base.strip_suffix(".git").unwrap_or(base);
    if name.is_empty() {
        return Err(Error::configuration(format!(
            "Cannot derive a package name from repository URL {url:?}"
        )));
    }
    Ok(name.to_string())
}
