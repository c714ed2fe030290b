//! Ignore-file parsing and source selection.

use std::path::{Path, PathBuf};

use super::pattern::IgnorePattern;
use crate::error::Result;

pub const IGNORE_FILE: &str = ".cartignore";
pub const SLUGIGNORE_FILE: &str = ".slugignore";

/// The built-in ignore patterns, used when no ignore file exists and written
/// by `cartage manifest cartignore`.
pub const DEFAULT_IGNORE: &str = "\
# Some of these are in .gitignore, but let's remove these just in case they got
# checked in.

# Exact files to remove. Matches with ==.
.DS_Store
.autotest
.editorconfig
.env
.git-wtfrc
.gitignore
.local.vimrc
.lvimrc
.cartignore
.powenv
.rake_tasks~
.rspec
.rubocop.yml
.rvmrc
.semaphore-cache
.workenv
Guardfile
README.md
bin/build
bin/notify-project-board
bin/osx-bootstrap
bin/setup

# Patterns to remove. These have a *, **, or ? in them. Globs are path-aware
# and match dotfiles.
*.rbc
.*.swp
**/.DS_Store

# Directories to remove. These should end with a slash. Matches every path
# that starts with the directory.
db/seeds/development/
db/seeds/test/
# db/seeds/dit/
# db/seeds/staging/
log/
test/
tests/
rspec/
spec/
specs/
feature/
features/
tmp/
vendor/bundle/
";

/// Strip comments (an unescaped `#` and everything after it) and surrounding
/// whitespace from each line, dropping lines that end up empty.
pub fn strip_comments_and_empty_lines<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            let line = strip_comment(line.as_ref()).trim();
            (!line.is_empty()).then(|| line.to_string())
        })
        .collect()
}

fn strip_comment(line: &str) -> &str {
    let mut previous = None;
    for (index, c) in line.char_indices() {
        if c == '#' && previous != Some('\\') {
            return &line[..index];
        }
        previous = Some(c);
    }
    line
}

/// Where the active ignore patterns came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreSource {
    CartIgnore(PathBuf),
    SlugIgnore(PathBuf),
    Default,
}

/// The compiled ignore patterns for a package root.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    source: IgnoreSource,
    patterns: Vec<IgnorePattern>,
}

impl IgnoreRules {
    /// Load the rules for `root`. The first existing source wins entirely:
    /// `.cartignore`, then `.slugignore` (only when `allow_slugignore`), then
    /// the built-in defaults.
    pub fn load(root: &Path, allow_slugignore: bool) -> Result<Self> {
        let ignore_file = root.join(IGNORE_FILE);
        let slugignore_file = root.join(SLUGIGNORE_FILE);

        let (source, content) = if ignore_file.exists() {
            let content = std::fs::read_to_string(&ignore_file)?;
            (IgnoreSource::CartIgnore(ignore_file), content)
        } else if allow_slugignore && slugignore_file.exists() {
            let content = std::fs::read_to_string(&slugignore_file)?;
            (IgnoreSource::SlugIgnore(slugignore_file), content)
        } else {
            (IgnoreSource::Default, DEFAULT_IGNORE.to_string())
        };

        tracing::debug!(?source, "Loaded ignore patterns");
        Self::from_lines(source, content.lines())
    }

    pub fn from_lines<I, S>(source: IgnoreSource, lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = strip_comments_and_empty_lines(lines)
            .iter()
            .map(|line| IgnorePattern::parse(line))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { source, patterns })
    }

    pub fn source(&self) -> &IgnoreSource {
        &self.source
    }

    pub fn patterns(&self) -> &[IgnorePattern] {
        &self.patterns
    }

    /// Whether any pattern excludes `path`.
    pub fn is_ignored(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(path))
    }

    /// Remove every ignored path, preserving order.
    pub fn prune<I, S>(&self, files: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        files
            .into_iter()
            .map(Into::into)
            .filter(|file| !self.is_ignored(file))
            .collect()
    }
}
