//! Semantic version parsing and bump computation.
//!
//! Versions found in source files are plain `major.minor.patch` triples.
//! They are parsed strictly (exactly three dot-separated integers) and
//! represented as [`semver::Version`] so ordering and display come for free.

use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from version operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The text is not three dot-separated non-negative integers.
    #[error("malformed version {text:?}: expected MAJOR.MINOR.PATCH")]
    Malformed {
        /// The offending text.
        text: String,
    },

    /// Bumping would push a component past `u64::MAX`.
    #[error("cannot bump {version}: {level} component is already at its maximum")]
    Overflow {
        /// The version that cannot be bumped.
        version: Version,
        /// The requested bump level.
        level: BumpLevel,
    },
}

/// Result alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// Semver bump level.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
    /// Patch release (x.y.Z).
    #[default]
    Patch,
    /// Minor release (x.Y.0).
    Minor,
    /// Major release (X.0.0).
    Major,
}

impl BumpLevel {
    /// Capitalized label used for changelog subheadings.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Patch => "Patch",
            Self::Minor => "Minor",
            Self::Major => "Major",
        }
    }
}

impl std::fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Patch => write!(f, "patch"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
        }
    }
}

/// Compute the next version by applying a bump level.
///
/// Fails with [`VersionError::Overflow`] rather than wrapping when the
/// bumped component is already `u64::MAX`.
pub fn next_version(current: &Version, level: BumpLevel) -> VersionResult<Version> {
    let overflow = || VersionError::Overflow {
        version: current.clone(),
        level,
    };
    let next = match level {
        BumpLevel::Patch => Version::new(
            current.major,
            current.minor,
            current.patch.checked_add(1).ok_or_else(overflow)?,
        ),
        BumpLevel::Minor => {
            Version::new(current.major, current.minor.checked_add(1).ok_or_else(overflow)?, 0)
        }
        BumpLevel::Major => Version::new(current.major.checked_add(1).ok_or_else(overflow)?, 0, 0),
    };
    Ok(next)
}

/// Parse `major.minor.patch`.
///
/// Leading zeros are accepted (`01.2.3` is `1.2.3`); pre-release and build
/// suffixes are not.
pub fn parse_version(text: &str) -> VersionResult<Version> {
    let malformed = || VersionError::Malformed {
        text: text.to_string(),
    };

    let mut parts = text.split('.');
    let mut component = || -> VersionResult<u64> {
        let part = parts.next().ok_or_else(malformed)?;
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        part.parse().map_err(|_| malformed())
    };

    let major = component()?;
    let minor = component()?;
    let patch = component()?;
    if parts.next().is_some() {
        return Err(malformed());
    }
    Ok(Version::new(major, minor, patch))
}
