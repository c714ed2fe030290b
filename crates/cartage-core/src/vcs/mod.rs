//! Version-control queries used by the manifest engine and build pipeline.
//!
//! The pipeline only needs a handful of read-only queries, so they sit
//! behind [`Vcs`]; [`GitRepository`] answers them with `git2`.

mod git;

use std::fmt;
use std::path::PathBuf;

use crate::error::Result;

pub use git::GitRepository;

/// Read-only repository queries.
pub trait Vcs: fmt::Debug {
    /// Short identifier written into release metadata (`"git"`).
    fn kind(&self) -> &'static str;

    /// The package root (the work tree, or a subdirectory of it).
    fn root(&self) -> PathBuf;

    /// Tracked files, relative to [`Vcs::root`], `/`-separated.
    fn tracked_files(&self) -> Result<Vec<String>>;

    /// Files with working-tree or index changes, excluding untracked files.
    fn modified_files(&self) -> Result<Vec<String>>;

    /// Committed content of `path` at `revision`, or `None` when the path
    /// does not exist at that revision.
    fn show(&self, revision: &str, path: &str) -> Result<Option<Vec<u8>>>;

    /// The commit id `HEAD` points at.
    fn head_hashref(&self) -> Result<String>;

    /// The fetch URL of the `origin` remote.
    fn remote_url(&self) -> Result<String>;
}
