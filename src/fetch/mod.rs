//! Artifact transport
//!
//! The resolver only ever talks to a [`Fetcher`]. Concrete fetchers cover
//! the two location kinds a repository can have:
//! - `file://` URLs and plain paths: [`FileFetcher`]
//! - `http://` and `https://` URLs: [`HttpFetcher`]

mod factory;
mod file;
mod http;

pub use factory::{create_fetcher, LocationScheme, RepositoryFetcher};
pub use file::FileFetcher;
pub use http::HttpFetcher;

use crate::artifact::{Coordinate, Repository, RepositoryId};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Outcome of one fetch attempt against one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// The artifact's bytes
    Found(Vec<u8>),
    /// The repository answered, and does not have the artifact
    NotFound,
    /// The repository could not be asked (network, I/O, timeout)
    TransportError(String),
}

/// Retrieves artifacts from a single repository.
///
/// Implementations must be safe to call concurrently for different
/// (coordinate, repository) pairs and may block on I/O.
pub trait Fetcher: Send + Sync {
    /// Try to retrieve one artifact from one repository
    fn fetch(&self, coordinate: &Coordinate, repository: &Repository) -> FetchResult;

    /// Get the human-readable fetcher name for logs
    fn name(&self) -> &'static str;
}

/// A found artifact, cheap to clone
#[derive(Clone, PartialEq, Eq)]
pub struct ArtifactHandle {
    coordinate: Coordinate,
    repository: RepositoryId,
    bytes: Arc<[u8]>,
    sha256: String,
}

impl ArtifactHandle {
    pub fn new(coordinate: Coordinate, repository: RepositoryId, bytes: Vec<u8>) -> Self {
        let sha256 = hex::encode(Sha256::digest(&bytes));
        Self {
            coordinate,
            repository,
            bytes: Arc::from(bytes),
            sha256,
        }
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    /// Repository the artifact was found in
    pub fn repository(&self) -> &RepositoryId {
        &self.repository
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Hex SHA-256 of the artifact bytes
    pub fn sha256(&self) -> &str {
        &self.sha256
    }
}

impl fmt::Debug for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactHandle")
            .field("coordinate", &self.coordinate.to_string())
            .field("repository", &self.repository.as_str())
            .field("len", &self.bytes.len())
            .field("sha256", &self.sha256)
            .finish()
    }
}
