//! Check records: the last known outcome for one (repository, coordinate)

use super::key::CheckKey;
use crate::artifact::{Coordinate, RepositoryId};
use chrono::{DateTime, Utc};
use std::fmt;

/// Result of one completed check against one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The repository has the artifact
    Found,
    /// The repository confirmed the artifact is absent
    NotFound,
    /// The repository could not be queried
    Error(String),
}

impl CheckOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found => write!(f, "found"),
            Self::NotFound => write!(f, "not found"),
            Self::Error(reason) => write!(f, "error: {}", reason),
        }
    }
}

/// Fully formed cache entry.
///
/// Records are never mutated after construction; the cache replaces the
/// whole record when a new check completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRecord {
    key: CheckKey,
    outcome: CheckOutcome,
    checked_at: DateTime<Utc>,
    local_last_update: Option<DateTime<Utc>>,
}

impl CheckRecord {
    pub(crate) fn new(
        key: CheckKey,
        outcome: CheckOutcome,
        checked_at: DateTime<Utc>,
        previous: Option<&CheckRecord>,
    ) -> Self {
        let local_last_update = if outcome.is_found() {
            Some(checked_at)
        } else {
            previous.and_then(|p| p.local_last_update)
        };

        Self {
            key,
            outcome,
            checked_at,
            local_last_update,
        }
    }

    pub fn key(&self) -> &CheckKey {
        &self.key
    }

    pub fn repository_id(&self) -> &RepositoryId {
        self.key.repository()
    }

    pub fn coordinate(&self) -> &Coordinate {
        self.key.coordinate()
    }

    pub fn outcome(&self) -> &CheckOutcome {
        &self.outcome
    }

    pub fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    /// When the artifact was last confirmed present in this repository
    pub fn local_last_update(&self) -> Option<DateTime<Utc>> {
        self.local_last_update
    }
}
