//! Installing the default `.cartignore`.

use std::collections::HashSet;
use std::path::PathBuf;

use super::Manifest;
use crate::error::{Error, Result};
use crate::ignore::{DEFAULT_IGNORE, IGNORE_FILE, strip_comments_and_empty_lines};

/// How an existing `.cartignore` is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreMode {
    Merge,
    Overwrite,
}

impl IgnoreMode {
    /// Interpret the `manifest cartignore` options. Conflicting combinations
    /// are rejected with [`Error::InvalidIgnoreMode`].
    pub fn from_options(mode: Option<&str>, force: bool, merge: bool) -> Result<Option<Self>> {
        let invalid = |message: &str| Err(Error::InvalidIgnoreMode(message.to_string()));

        let mode = match mode {
            None => None,
            Some("overwrite" | "force") => Some(Self::Overwrite),
            Some("merge") => Some(Self::Merge),
            Some(other) => {
                return Err(Error::InvalidIgnoreMode(format!(
                    "Unknown mode '{other}' (expected 'overwrite' or 'merge')"
                )));
            }
        };

        if force && merge {
            return invalid("Cannot mix options --force and --merge");
        }
        if merge && mode == Some(Self::Overwrite) {
            return invalid("Cannot mix option --merge and --mode overwrite");
        }
        if force && mode == Some(Self::Merge) {
            return invalid("Cannot mix option --force and --mode merge");
        }

        Ok(if force {
            Some(Self::Overwrite)
        } else if merge {
            Some(Self::Merge)
        } else {
            mode
        })
    }
}

/// What [`Manifest::install_default_ignore`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreFileAction {
    NoOp,
    Create,
    Merge,
    Overwrite,
}

impl IgnoreFileAction {
    fn plan(mode: Option<IgnoreMode>, exists: bool) -> Self {
        match mode {
            Some(IgnoreMode::Merge) => Self::Merge,
            Some(IgnoreMode::Overwrite) => Self::Overwrite,
            None if exists => Self::NoOp,
            None => Self::Create,
        }
    }
}

impl Manifest<'_> {
    pub fn ignore_file(&self) -> PathBuf {
        self.root.join(IGNORE_FILE)
    }

    /// Write the default `.cartignore`. Without a mode an existing file is
    /// left alone.
    pub fn install_default_ignore(&self, mode: Option<IgnoreMode>) -> Result<IgnoreFileAction> {
        let path = self.ignore_file();
        let action = IgnoreFileAction::plan(mode, path.exists());

        let content = match action {
            IgnoreFileAction::NoOp => {
                tracing::info!("{IGNORE_FILE} already exists, skipping...");
                return Ok(action);
            }
            IgnoreFileAction::Create | IgnoreFileAction::Overwrite => {
                tracing::info!("Creating {IGNORE_FILE}...");
                DEFAULT_IGNORE.to_string()
            }
            IgnoreFileAction::Merge => {
                tracing::info!("Merging {IGNORE_FILE}...");
                let existing = if path.exists() {
                    std::fs::read_to_string(&path)?
                } else {
                    String::new()
                };
                merge_patterns(&existing)
            }
        };

        std::fs::write(&path, content)?;
        Ok(action)
    }
}

fn merge_patterns(existing: &str) -> String {
    let mut seen = HashSet::new();
    let lines = existing.lines().chain(DEFAULT_IGNORE.lines());
    let merged: Vec<String> = strip_comments_and_empty_lines(lines)
        .into_iter()
        .filter(|pattern| seen.insert(pattern.clone()))
        .collect();
    let mut content = merged.join("\n");
    content.push('\n');
    content
}

#[cfg(test)]
mod tests {
    use super::super::tests::ListedFiles;
    use super::*;
    use tempfile::TempDir;

    fn install(temp: &TempDir, mode: Option<IgnoreMode>) -> IgnoreFileAction {
        let vcs = ListedFiles::new(temp.path(), &[]);
        Manifest::new(temp.path(), &vcs)
            .install_default_ignore(mode)
            .unwrap()
    }

    fn read_ignore(temp: &TempDir) -> String {
        std::fs::read_to_string(temp.path().join(IGNORE_FILE)).unwrap()
    }

    fn default_patterns() -> Vec<String> {
        strip_comments_and_empty_lines(DEFAULT_IGNORE.lines())
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(IgnoreMode::from_options(None, false, false).unwrap(), None);
        assert_eq!(
            IgnoreMode::from_options(Some("force"), false, false).unwrap(),
            Some(IgnoreMode::Overwrite)
        );
        assert_eq!(
            IgnoreMode::from_options(Some("merge"), false, true).unwrap(),
            Some(IgnoreMode::Merge)
        );
        assert_eq!(
            IgnoreMode::from_options(None, true, false).unwrap(),
            Some(IgnoreMode::Overwrite)
        );
    }

    #[test]
    fn test_mode_conflicts() {
        let cases = [
            (None, true, true, "Cannot mix options --force and --merge"),
            (
                Some("overwrite"),
                false,
                true,
                "Cannot mix option --merge and --mode overwrite",
            ),
            (
                Some("merge"),
                true,
                false,
                "Cannot mix option --force and --mode merge",
            ),
        ];
        for (mode, force, merge, message) in cases {
            let err = IgnoreMode::from_options(mode, force, merge).unwrap_err();
            assert_eq!(err.to_string(), message);
            assert_eq!(err.exit_code(), crate::error::EX_USAGE);
        }
    }

    #[test]
    fn test_creates_when_absent() {
        let temp = TempDir::new().unwrap();
        assert_eq!(install(&temp, None), IgnoreFileAction::Create);
        assert_eq!(read_ignore(&temp), DEFAULT_IGNORE);
    }

    #[test]
    fn test_noop_when_present() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(IGNORE_FILE), "xyz/\n").unwrap();
        assert_eq!(install(&temp, None), IgnoreFileAction::NoOp);
        assert_eq!(read_ignore(&temp), "xyz/\n");
    }

    #[test]
    fn test_overwrite_replaces_existing() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(IGNORE_FILE), "xyz/\n").unwrap();
        assert_eq!(
            install(&temp, Some(IgnoreMode::Overwrite)),
            IgnoreFileAction::Overwrite
        );
        assert_eq!(read_ignore(&temp), DEFAULT_IGNORE);
    }

    #[test]
    fn test_merge_adds_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(IGNORE_FILE), "# mine\nxyz/\nlog/\n").unwrap();
        assert_eq!(install(&temp, Some(IgnoreMode::Merge)), IgnoreFileAction::Merge);

        let lines: Vec<String> = read_ignore(&temp).lines().map(str::to_string).collect();
        let mut expected = vec!["xyz/".to_string(), "log/".to_string()];
        expected.extend(default_patterns().into_iter().filter(|p| p != "log/"));
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_merge_removes_existing_duplicates() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(IGNORE_FILE), "xyz/\nxyz/\n  xyz/\nlog/\n").unwrap();
        install(&temp, Some(IgnoreMode::Merge));

        let content = read_ignore(&temp);
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.iter().filter(|line| **line == "xyz/").count(), 1);
        assert_eq!(lines.iter().filter(|line| **line == "log/").count(), 1);
        let unique: HashSet<&str> = lines.iter().copied().collect();
        assert_eq!(unique.len(), lines.len());
    }

    #[test]
    fn test_merge_without_existing_file_writes_defaults() {
        let temp = TempDir::new().unwrap();
        install(&temp, Some(IgnoreMode::Merge));
        let lines: Vec<String> = read_ignore(&temp).lines().map(str::to_string).collect();
        assert_eq!(lines, default_patterns());
    }
}
