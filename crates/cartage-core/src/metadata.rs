//! `release-metadata.json`: what was packaged, from where, and when.

use serde::{Deserialize, Serialize};

pub const RELEASE_METADATA_FILE: &str = "release-metadata.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseMetadata {
    pub package: PackageMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub repo: RepoMetadata,
    pub hashref: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMetadata {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

impl ReleaseMetadata {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
