//! Composite cache key for check records.
//!
//! A `CheckKey` cannot be built without a repository id, so there is no
//! way to file or read a check outcome by coordinate alone.

use crate::artifact::{Coordinate, RepositoryId};
use std::fmt;

/// (repository id, coordinate) pair identifying one check
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CheckKey {
    inner: CheckKeyInner,
}

/// Private inner struct - prevents external construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct CheckKeyInner {
    repository: RepositoryId,
    coordinate: Coordinate,
}

impl CheckKey {
    pub fn new(repository: &RepositoryId, coordinate: &Coordinate) -> Self {
        Self {
            inner: CheckKeyInner {
                repository: repository.clone(),
                coordinate: coordinate.clone(),
            },
        }
    }

    pub fn repository(&self) -> &RepositoryId {
        &self.inner.repository
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.inner.coordinate
    }
}

impl fmt::Display for CheckKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.inner.repository, self.inner.coordinate)
    }
}
