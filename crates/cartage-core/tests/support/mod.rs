#![allow(dead_code)]

use std::fs;
use std::path::Path;

use git2::{IndexAddOption, Repository, Signature};
use tempfile::TempDir;

use cartage_core::config::CartageConfig;
use cartage_core::plugin::PluginRegistry;
use cartage_core::vcs::GitRepository;
use cartage_core::Cartage;

pub const ORIGIN_URL: &str = "git://host/repo-url.git";

/// A work tree at `<temp>/repo-url` with an `origin` remote.
pub struct Fixture {
    pub temp: TempDir,
    pub repo: Repository,
}

impl Fixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("repo-url");
        fs::create_dir_all(&root).unwrap();
        let repo = Repository::init(&root).unwrap();
        repo.remote("origin", ORIGIN_URL).unwrap();
        Self { temp, repo }
    }

    pub fn root(&self) -> std::path::PathBuf {
        self.temp.path().join("repo-url")
    }

    pub fn write(&self, path: &str, content: &str) {
        let file = self.root().join(path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(file, content).unwrap();
    }

    pub fn read(&self, path: &str) -> String {
        fs::read_to_string(self.root().join(path)).unwrap()
    }

    pub fn commit_all(&self, message: &str) -> git2::Oid {
        commit_all(&self.repo, message)
    }

    pub fn cartage(&self, config: CartageConfig) -> Cartage {
        self.cartage_with(config, &PluginRegistry::with_builtin_plugins())
    }

    pub fn cartage_with(&self, config: CartageConfig, registry: &PluginRegistry) -> Cartage {
        let vcs = GitRepository::open_at(&self.root()).unwrap();
        Cartage::with_vcs(config, Box::new(vcs), registry).unwrap()
    }
}

pub fn commit_all(repo: &Repository, message: &str) -> git2::Oid {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let sig = Signature::now("Cartage Test", "test@example.com").unwrap();
    match repo.head() {
        Ok(head) => {
            let parent = repo.find_commit(head.target().unwrap()).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])
                .unwrap()
        }
        Err(_) => repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[])
            .unwrap(),
    }
}

pub fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
