//! Compiled ignore patterns.

use std::fmt;

use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;

use crate::error::{Error, Result};

/// A single compiled ignore rule.
#[derive(Clone)]
pub enum IgnorePattern {
    /// Matches one path exactly.
    Exact(String),
    /// Path-aware glob; `*` and `?` stop at `/`, dotfiles match, `**`
    /// crosses directories, braces and brackets are supported.
    Glob { raw: String, matcher: GlobMatcher },
    /// Anchored regex prefix; the pattern text is used as a regex as-is.
    DirectoryPrefix(Regex),
}

impl IgnorePattern {
    /// Compile a stripped ignore-file line.
    ///
    /// - `/dir` (no `*` or `?`) becomes the regex `^dir/`
    /// - anything ending in `/` becomes the regex `^pattern`
    /// - anything else containing `*` or `?` is a glob
    /// - everything else is an exact path
    pub fn parse(raw: &str) -> Result<Self> {
        let has_glob = raw.contains(['*', '?']);

        if let Some(stripped) = raw.strip_prefix('/')
            && !has_glob
        {
            return directory_prefix(raw, &format!("{}/", stripped.trim_end_matches('/')));
        }

        if raw.ends_with('/') {
            return directory_prefix(raw, raw);
        }

        if has_glob {
            return glob(raw, raw);
        }

        Ok(IgnorePattern::Exact(raw.to_string()))
    }

    /// Whether `path` (relative, `/`-separated) is excluded by this pattern.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            IgnorePattern::Exact(exact) => exact == path,
            IgnorePattern::Glob { matcher, .. } => matcher.is_match(path),
            IgnorePattern::DirectoryPrefix(prefix) => prefix.is_match(path),
        }
    }
}

fn directory_prefix(raw: &str, prefix: &str) -> Result<IgnorePattern> {
    Regex::new(&format!("^{prefix}"))
        .map(IgnorePattern::DirectoryPrefix)
        .map_err(|e| Error::Pattern {
            pattern: raw.to_string(),
            message: e.to_string(),
        })
}

fn glob(raw: &str, pattern: &str) -> Result<IgnorePattern> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map_err(|e| Error::Pattern {
            pattern: raw.to_string(),
            message: e.to_string(),
        })?;

    Ok(IgnorePattern::Glob {
        raw: raw.to_string(),
        matcher: glob.compile_matcher(),
    })
}

impl fmt::Debug for IgnorePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnorePattern::Exact(exact) => f.debug_tuple("Exact").field(exact).finish(),
            IgnorePattern::Glob { raw, .. } => f.debug_tuple("Glob").field(raw).finish(),
            IgnorePattern::DirectoryPrefix(re) => {
                f.debug_tuple("DirectoryPrefix").field(&re.as_str()).finish()
            }
        }
    }
}
