//! Filesystem repositories (`file://` URLs or plain paths)

use super::{FetchResult, Fetcher};
use crate::artifact::{Coordinate, Repository};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// Reads artifacts from a repository laid out on the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFetcher;

impl FileFetcher {
    pub fn new() -> Self {
        Self
    }

    /// Root directory of a filesystem repository location
    pub fn root(location: &str) -> PathBuf {
        PathBuf::from(location.strip_prefix("file://").unwrap_or(location))
    }
}

impl Fetcher for FileFetcher {
    fn fetch(&self, coordinate: &Coordinate, repository: &Repository) -> FetchResult {
        let path = Self::root(repository.location()).join(coordinate.layout_path());
        debug!("Reading {}", path.display());

        match std::fs::read(&path) {
            Ok(bytes) => FetchResult::Found(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => FetchResult::NotFound,
            Err(e) => FetchResult::TransportError(format!("reading {}: {}", path.display(), e)),
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
