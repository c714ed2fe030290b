//! Error taxonomy for cartage operations.

use std::path::PathBuf;

/// Exit status used by the CLI when conflicting options are given.
pub const EX_USAGE: i32 = 64;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// There is no `Manifest.txt` in the package root.
    #[error(
        "Cartage cannot create a package without a Manifest.txt file. You may generate\n\
         or update the Manifest.txt file with the following command:\n\n    \
         cartage manifest generate\n"
    )]
    MissingManifest,

    #[error("Manifest.txt is empty.")]
    EmptyManifest,

    #[error("{0}")]
    InvalidIgnoreMode(String),

    /// An external process exited unsuccessfully (or could not be started).
    #[error("Error running '{command}'")]
    ExternalCommand {
        command: String,
        status: Option<i32>,
        output: String,
    },

    #[error("{0}")]
    Configuration(String),

    #[error("Configuration file {} does not exist.", .0.display())]
    MissingConfigFile(PathBuf),

    #[error("Invalid compression type {0:?}")]
    InvalidCompression(String),

    #[error("Cannot add plug-in '{0}': plug-ins are frozen once configuration is resolved")]
    RegistryFrozen(String),

    #[error("Plug-ins cannot be requested before configuration is resolved")]
    PluginsUnresolved,

    #[error("Invalid ignore pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// The process exit status this error maps to at the CLI boundary.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidIgnoreMode(_) => EX_USAGE,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_manifest_message_is_instructional() {
        let message = Error::MissingManifest.to_string();
        assert!(message.contains("cannot create"));
        assert!(message.contains("cartage manifest generate"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::InvalidIgnoreMode("x".into()).exit_code(), EX_USAGE);
        assert_eq!(Error::EmptyManifest.exit_code(), 1);
        let failure = Error::ExternalCommand {
            command: "false".into(),
            status: Some(1),
            output: String::new(),
        };
        assert_eq!(failure.to_string(), "Error running 'false'");
        assert_eq!(failure.exit_code(), 1);
    }
}
