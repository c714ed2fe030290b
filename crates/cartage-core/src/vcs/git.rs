//! `git2` implementation of [`Vcs`].

use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository, Status, StatusOptions};

use super::Vcs;
use crate::error::{Error, Result};

const ORIGIN: &str = "origin";

/// A git work tree, optionally narrowed to a subdirectory used as the
/// package root.
pub struct GitRepository {
    repo: Repository,
    root: PathBuf,
    /// `root` relative to the work tree, `/`-terminated; empty at the top.
    prefix: String,
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("root", &self.root)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl GitRepository {
    /// Discover the repository containing `start`. The package root is the
    /// top of the work tree.
    pub fn discover(start: &Path) -> Result<Self> {
        let repo = Repository::discover(start)?;
        let root = workdir(&repo)?;
        Ok(Self {
            repo,
            root,
            prefix: String::new(),
        })
    }

    /// Open the repository containing `root` and use `root` itself as the
    /// package root.
    pub fn open_at(root: &Path) -> Result<Self> {
        let repo = Repository::discover(root)?;
        let workdir = workdir(&repo)?;
        let root = root.canonicalize()?;

        let relative = root.strip_prefix(&workdir).map_err(|_| {
            Error::configuration(format!(
                "Root path {} is outside the repository work tree {}",
                root.display(),
                workdir.display()
            ))
        })?;

        let mut prefix = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        if !prefix.is_empty() {
            prefix.push('/');
        }

        Ok(Self { repo, root, prefix })
    }

    fn relative<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(self.prefix.as_str())
    }
}

fn workdir(repo: &Repository) -> Result<PathBuf> {
    let workdir = repo
        .workdir()
        .ok_or_else(|| Error::configuration("Cannot package a bare repository"))?;
    Ok(workdir.canonicalize()?)
}

impl Vcs for GitRepository {
    fn kind(&self) -> &'static str {
        "git"
    }

    fn root(&self) -> PathBuf {
        self.root.clone()
    }

    fn tracked_files(&self) -> Result<Vec<String>> {
        let mut index = self.repo.index()?;
        index.read(false)?;
        let files = index
            .iter()
            .filter_map(|entry| {
                let path = String::from_utf8_lossy(&entry.path).into_owned();
                self.relative(&path).map(str::to_string)
            })
            .collect();
        Ok(files)
    }

    fn modified_files(&self) -> Result<Vec<String>> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(false)
            .include_ignored(false)
            .renames_head_to_index(true);

        let statuses = self.repo.statuses(Some(&mut options))?;
        let files = statuses
            .iter()
            .filter(|entry| !entry.status().intersects(Status::WT_NEW | Status::IGNORED))
            .filter_map(|entry| {
                let path = entry
                    .head_to_index()
                    .and_then(|delta| delta.new_file().path())
                    .map(|p| p.to_string_lossy().into_owned())
                    .or_else(|| entry.path().map(str::to_string))?;
                self.relative(&path).map(str::to_string)
            })
            .collect();
        Ok(files)
    }

    fn show(&self, revision: &str, path: &str) -> Result<Option<Vec<u8>>> {
        let commit = self.repo.revparse_single(revision)?.peel_to_commit()?;
        let tree = commit.tree()?;
        let full_path = format!("{}{}", self.prefix, path);

        let entry = match tree.get_path(Path::new(&full_path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let object = entry.to_object(&self.repo)?;
        Ok(object.as_blob().map(|blob| blob.content().to_vec()))
    }

    fn head_hashref(&self) -> Result<String> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    fn remote_url(&self) -> Result<String> {
        let remote = self.repo.find_remote(ORIGIN).map_err(|e| {
            Error::configuration(format!("Cannot read the '{ORIGIN}' remote: {}", e.message()))
        })?;
        remote
            .url()
            .map(str::to_string)
            .ok_or_else(|| Error::configuration(format!("The '{ORIGIN}' remote has no URL")))
    }
}
