//! Tarball compression settings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Compression applied to every tarball cartage writes (the final package and
/// the dependency cache).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Bzip2,
    Gzip,
    None,
}

impl Compression {
    /// The `tar` flag letter for this compression.
    pub fn tar_flag(self) -> &'static str {
        match self {
            Compression::Bzip2 => "j",
            Compression::Gzip => "z",
            Compression::None => "",
        }
    }

    /// The file extension appended after `.tar`.
    pub fn extension(self) -> &'static str {
        match self {
            Compression::Bzip2 => ".bz2",
            Compression::Gzip => ".gz",
            Compression::None => "",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Compression::Bzip2 => "bzip2",
            Compression::Gzip => "gzip",
            Compression::None => "none",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bzip2" => Ok(Compression::Bzip2),
            "gzip" => Ok(Compression::Gzip),
            "none" => Ok(Compression::None),
            other => Err(Error::InvalidCompression(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_bzip2() {
        assert_eq!(Compression::default(), Compression::Bzip2);
    }

    #[test]
    fn test_flags_and_extensions() {
        assert_eq!(Compression::Bzip2.tar_flag(), "j");
        assert_eq!(Compression::Bzip2.extension(), ".bz2");
        assert_eq!(Compression::Gzip.tar_flag(), "z");
        assert_eq!(Compression::Gzip.extension(), ".gz");
        assert_eq!(Compression::None.tar_flag(), "");
        assert_eq!(Compression::None.extension(), "");
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!("gzip".parse::<Compression>().unwrap(), Compression::Gzip);
        let err = "foo".parse::<Compression>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid compression type \"foo\"");
    }

    #[test]
    fn test_serde_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            compression: Compression,
        }
        let parsed: Wrapper = toml::from_str("compression = \"none\"").unwrap();
        assert_eq!(parsed.compression, Compression::None);
        assert!(toml::from_str::<Wrapper>("compression = \"zip\"").is_err());
    }
}
