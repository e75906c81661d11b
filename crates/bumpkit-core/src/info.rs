//! Process metadata resolved once at start-up.

use semver::Version;
use serde::Serialize;

use crate::version::{VersionResult, parse_version};

/// Name and version of the running tool.
///
/// Built once in `main` from package metadata and passed down by
/// reference; nothing reads it from global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInfo {
    name: String,
    version: Version,
}

impl ToolInfo {
    /// Resolve from a binary name and its `major.minor.patch` version string.
    pub fn resolve(name: &str, version: &str) -> VersionResult<Self> {
        Ok(Self {
            name: name.to_string(),
            version: parse_version(version)?,
        })
    }

    /// Binary name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binary version.
    pub const fn version(&self) -> &Version {
        &self.version
    }
}

impl std::fmt::Display for ToolInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}
