//! Ignore patterns for pruning package contents.
//!
//! Patterns come from `.cartignore`, `.slugignore` (resolve only), or the
//! built-in defaults. A path is ignored when any pattern matches it.

pub mod pattern;
pub mod rules;

pub use pattern::IgnorePattern;
pub use rules::{
    DEFAULT_IGNORE, IGNORE_FILE, IgnoreRules, IgnoreSource, SLUGIGNORE_FILE,
    strip_comments_and_empty_lines,
};
