//! Artifact coordinates
//!
//! A coordinate names one artifact: `group:artifact:type:version`. The
//! short form `group:artifact:version` implies the `jar` type.

use crate::error::{ReprobeError, ReprobeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type assumed when a coordinate omits it
pub const DEFAULT_TYPE: &str = "jar";

/// Immutable artifact identity, compared by value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinate {
    group: String,
    artifact: String,
    kind: String,
    version: String,
}

impl Coordinate {
    /// Create a coordinate from its four parts
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        kind: impl Into<String>,
        version: impl Into<String>,
    ) -> ReprobeResult<Self> {
        let coordinate = Self {
            group: group.into(),
            artifact: artifact.into(),
            kind: kind.into(),
            version: version.into(),
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// Artifact type (packaging extension, e.g. `jar` or `pom`)
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Relative path of this artifact inside a repository.
    ///
    /// Dots in the group become directories:
    /// `junit:junit:jar:4.12` -> `junit/junit/4.12/junit-4.12.jar`
    pub fn layout_path(&self) -> String {
        format!(
            "{}/{}/{}/{}-{}.{}",
            self.group.replace('.', "/"),
            self.artifact,
            self.version,
            self.artifact,
            self.version,
            self.kind
        )
    }

    fn validate(&self) -> ReprobeResult<()> {
        let parts = [
            ("group", &self.group),
            ("artifact", &self.artifact),
            ("type", &self.kind),
            ("version", &self.version),
        ];

        for (name, value) in parts {
            if value.is_empty() {
                return Err(ReprobeError::coordinate(
                    self.to_string(),
                    format!("{} must not be empty", name),
                ));
            }
            if value
                .chars()
                .any(|c| c == ':' || c == '/' || c == '\\' || c.is_whitespace())
            {
                return Err(ReprobeError::coordinate(
                    self.to_string(),
                    format!("{} contains a separator or whitespace", name),
                ));
            }
            if value.contains("..") {
                return Err(ReprobeError::coordinate(
                    self.to_string(),
                    format!("{} must not contain '..'", name),
                ));
            }
        }

        Ok(())
    }
}

impl FromStr for Coordinate {
    type Err = ReprobeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        match parts.as_slice() {
            [group, artifact, version] => Self::new(*group, *artifact, DEFAULT_TYPE, *version),
            [group, artifact, kind, version] => Self::new(*group, *artifact, *kind, *version),
            _ => Err(ReprobeError::coordinate(
                s,
                format!("expected 3 or 4 ':'-separated segments, got {}", parts.len()),
            )),
        }
    }
}

impl TryFrom<String> for Coordinate {
    type Error = ReprobeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Coordinate> for String {
    fn from(value: Coordinate) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.group, self.artifact, self.kind, self.version
        )
    }
}
