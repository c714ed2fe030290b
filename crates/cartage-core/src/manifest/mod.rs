//! The package manifest (`Manifest.txt`) and ignore file (`.cartignore`).
//!
//! `Manifest.txt` is the authoritative list of files in a package. It is
//! generated from the tracked files in the repository, pruned with the
//! ignore patterns, and checked against the repository before packing.

mod check;
mod ignore_file;

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::ignore::{IgnoreRules, strip_comments_and_empty_lines};
use crate::vcs::Vcs;

pub use check::ManifestCheck;
pub use ignore_file::{IgnoreFileAction, IgnoreMode};

pub const MANIFEST_FILE: &str = "Manifest.txt";

/// Manifest operations for a package root.
#[derive(Debug, Clone, Copy)]
pub struct Manifest<'a> {
    root: &'a Path,
    vcs: &'a dyn Vcs,
    quiet: bool,
}

impl<'a> Manifest<'a> {
    pub fn new(root: &'a Path, vcs: &'a dyn Vcs) -> Self {
        Self {
            root,
            vcs,
            quiet: false,
        }
    }

    /// Suppress diff output from [`Manifest::check`].
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn root(&self) -> &Path {
        self.root
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Regenerate `Manifest.txt` from the tracked files, overwriting it.
    pub fn generate(&self) -> Result<Vec<String>> {
        let path = self.manifest_file();
        let files = self.file_list()?;
        write_file_list(&mut std::fs::File::create(&path)?, &files)?;
        tracing::info!("Wrote {} entries to {}", files.len(), path.display());
        Ok(files)
    }

    /// The stripped entries of `Manifest.txt`, in file order.
    pub fn entries(&self) -> Result<Vec<String>> {
        let path = self.manifest_file();
        if !path.exists() {
            return Err(Error::MissingManifest);
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(strip_comments_and_empty_lines(content.lines()))
    }

    /// The resolved entries: manifest entries pruned with the ignore file,
    /// `.slugignore`, or the defaults, each prefixed with the basename of
    /// `path` (the current directory by default).
    pub fn resolved_entries(&self, path: Option<&Path>) -> Result<Vec<String>> {
        let entries = self.entries()?;
        if entries.is_empty() {
            return Err(Error::EmptyManifest);
        }

        let base = match path {
            Some(path) => std::path::absolute(path)?,
            None => std::env::current_dir()?,
        };
        let prefix = base
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::configuration(format!("Cannot resolve manifest against {}", base.display()))
            })?;

        let rules = IgnoreRules::load(self.root, true)?;
        Ok(rules
            .prune(entries)
            .into_iter()
            .map(|entry| format!("{prefix}/{entry}"))
            .collect())
    }

    /// Resolve the manifest into a file list usable with `tar -T` and hand
    /// its location to `f`. The list is written to a scratch file which is
    /// removed when this call returns, whether `f` succeeds or not.
    pub fn resolve<T, F>(&self, path: Option<&Path>, f: F) -> Result<T>
    where
        F: FnOnce(&Path) -> Result<T>,
    {
        let entries = self.resolved_entries(path)?;

        let mut scratch = tempfile::Builder::new().prefix("Manifest.").tempfile()?;
        write_file_list(scratch.as_file_mut(), &entries)?;
        scratch.as_file_mut().flush()?;

        tracing::debug!(
            "Resolved {} manifest entries into {}",
            entries.len(),
            scratch.path().display()
        );
        f(scratch.path())
    }

    /// Tracked files pruned with the ignore file or the defaults (never
    /// `.slugignore`), sorted and deduplicated.
    pub(crate) fn file_list(&self) -> Result<Vec<String>> {
        let rules = IgnoreRules::load(self.root, false)?;
        let mut files = rules.prune(self.vcs.tracked_files()?);
        files.sort();
        files.dedup();
        Ok(files)
    }
}

fn write_file_list(out: &mut impl Write, files: &[String]) -> Result<()> {
    let mut content = files.join("\n");
    content.push('\n');
    out.write_all(content.as_bytes())?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// In-memory repository listing for manifest tests.
    #[derive(Debug, Default)]
    pub(crate) struct ListedFiles {
        pub root: PathBuf,
        pub files: RefCell<Vec<String>>,
    }

    impl ListedFiles {
        pub fn new(root: &Path, files: &[&str]) -> Self {
            Self {
                root: root.to_path_buf(),
                files: RefCell::new(files.iter().map(|f| f.to_string()).collect()),
            }
        }
    }

    impl Vcs for ListedFiles {
        fn kind(&self) -> &'static str {
            "git"
        }
        fn root(&self) -> PathBuf {
            self.root.clone()
        }
        fn tracked_files(&self) -> Result<Vec<String>> {
            Ok(self.files.borrow().clone())
        }
        fn modified_files(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
        fn show(&self, _revision: &str, _path: &str) -> Result<Option<Vec<u8>>> {
            Ok(None)
        }
        fn head_hashref(&self) -> Result<String> {
            Ok("12345".to_string())
        }
        fn remote_url(&self) -> Result<String> {
            Ok("git://host/repo-url.git".to_string())
        }
    }

    const MANIFEST: &str = "bin/build\nbin/cartage\nlib/cartage.rb\nspec/cartage.rb\n";

    fn setup(ignore: Option<&str>) -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(MANIFEST_FILE), MANIFEST).unwrap();
        if let Some(ignore) = ignore {
            std::fs::write(temp.path().join(".cartignore"), ignore).unwrap();
        }
        temp
    }

    fn resolve_lines(temp: &TempDir) -> Vec<String> {
        let vcs = ListedFiles::new(temp.path(), &[]);
        let manifest = Manifest::new(temp.path(), &vcs);
        manifest
            .resolve(Some(Path::new("foo")), |file| {
                Ok(std::fs::read_to_string(file)?
                    .lines()
                    .map(str::to_string)
                    .collect())
            })
            .unwrap()
    }

    #[test]
    fn test_generate_sorts_and_dedups() {
        let temp = TempDir::new().unwrap();
        let vcs = ListedFiles::new(temp.path(), &["b", "a", "a", "a", "b", "c"]);
        std::fs::write(temp.path().join(".cartignore"), "").unwrap();

        let files = Manifest::new(temp.path(), &vcs).generate().unwrap();
        assert_eq!(files, vec!["a", "b", "c"]);
        assert_eq!(
            std::fs::read_to_string(temp.path().join(MANIFEST_FILE)).unwrap(),
            "a\nb\nc\n"
        );
    }

    #[test]
    fn test_generate_ignores_slugignore() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".slugignore"), "lib/\n").unwrap();
        let vcs = ListedFiles::new(temp.path(), &["lib/a.rb", "spec/a.rb"]);

        let files = Manifest::new(temp.path(), &vcs).generate().unwrap();
        // Defaults apply, so spec/ is pruned and lib/ is kept.
        assert_eq!(files, vec!["lib/a.rb"]);
    }

    #[test]
    fn test_resolve_without_manifest() {
        let temp = TempDir::new().unwrap();
        let vcs = ListedFiles::new(temp.path(), &[]);
        let err = Manifest::new(temp.path(), &vcs)
            .resolve(None, |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, Error::MissingManifest));
    }

    #[test]
    fn test_resolve_empty_manifest() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(MANIFEST_FILE), "# nothing\n\n").unwrap();
        let vcs = ListedFiles::new(temp.path(), &[]);
        let err = Manifest::new(temp.path(), &vcs)
            .resolve(None, |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, Error::EmptyManifest));
        assert_eq!(err.to_string(), "Manifest.txt is empty.");
    }

    #[test]
    fn test_resolve_with_empty_ignore_keeps_everything() {
        let temp = setup(Some(""));
        assert_eq!(
            resolve_lines(&temp),
            vec![
                "foo/bin/build",
                "foo/bin/cartage",
                "foo/lib/cartage.rb",
                "foo/spec/cartage.rb"
            ]
        );
    }

    #[test]
    fn test_resolve_prunes_with_cartignore() {
        let temp = setup(Some("spec/\n"));
        assert_eq!(
            resolve_lines(&temp),
            vec!["foo/bin/build", "foo/bin/cartage", "foo/lib/cartage.rb"]
        );
    }

    #[test]
    fn test_resolve_prunes_with_leading_slash() {
        let temp = setup(Some("/spec\n"));
        assert_eq!(
            resolve_lines(&temp),
            vec!["foo/bin/build", "foo/bin/cartage", "foo/lib/cartage.rb"]
        );
    }

    #[test]
    fn test_resolve_prunes_with_slugignore() {
        let temp = setup(None);
        std::fs::write(temp.path().join(".slugignore"), "spec/\n").unwrap();
        assert_eq!(
            resolve_lines(&temp),
            vec!["foo/bin/build", "foo/bin/cartage", "foo/lib/cartage.rb"]
        );
    }

    #[test]
    fn test_resolve_prunes_with_defaults() {
        let temp = setup(None);
        assert_eq!(
            resolve_lines(&temp),
            vec!["foo/bin/cartage", "foo/lib/cartage.rb"]
        );
    }

    #[test]
    fn test_resolve_removes_scratch_file_on_error() {
        let temp = setup(Some(""));
        let vcs = ListedFiles::new(temp.path(), &[]);
        let mut seen = None;

        let result: Result<()> = Manifest::new(temp.path(), &vcs).resolve(None, |file| {
            assert!(file.exists());
            seen = Some(file.to_path_buf());
            Err(Error::configuration("boom"))
        });

        assert!(result.is_err());
        let seen = seen.unwrap();
        assert!(!seen.exists(), "scratch file should be removed");
    }

    #[test]
    fn test_resolve_removes_scratch_file_on_success() {
        let temp = setup(Some(""));
        let vcs = ListedFiles::new(temp.path(), &[]);

        let seen = Manifest::new(temp.path(), &vcs)
            .resolve(None, |file| {
                assert!(file.file_name().unwrap().to_string_lossy().starts_with("Manifest."));
                Ok(file.to_path_buf())
            })
            .unwrap();
        assert!(!seen.exists());
    }
}
