//! Fetcher factory: picks a transport from a repository's location

use super::{FetchResult, Fetcher, FileFetcher, HttpFetcher};
use crate::artifact::{Coordinate, Repository};
use crate::config::schema::FetchConfig;
use std::sync::Arc;
use std::time::Duration;

/// Kind of location a repository points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationScheme {
    /// `file://` URL or bare filesystem path
    File,
    /// `http://` or `https://`
    Http,
    /// Any other `scheme://`
    Unsupported,
}

impl LocationScheme {
    /// Detect the scheme of a repository location
    pub fn detect(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Http
        } else if lower.starts_with("file://") || !lower.contains("://") {
            Self::File
        } else {
            Self::Unsupported
        }
    }
}

/// Dispatches each fetch to the transport matching the repository
#[derive(Debug, Clone)]
pub struct RepositoryFetcher {
    file: FileFetcher,
    http: HttpFetcher,
}

impl RepositoryFetcher {
    pub fn new(file: FileFetcher, http: HttpFetcher) -> Self {
        Self { file, http }
    }
}

impl Fetcher for RepositoryFetcher {
    fn fetch(&self, coordinate: &Coordinate, repository: &Repository) -> FetchResult {
        match LocationScheme::detect(repository.location()) {
            LocationScheme::File => self.file.fetch(coordinate, repository),
            LocationScheme::Http => self.http.fetch(coordinate, repository),
            LocationScheme::Unsupported => FetchResult::TransportError(format!(
                "unsupported repository location: {}",
                repository.location()
            )),
        }
    }

    fn name(&self) -> &'static str {
        "repository"
    }
}

/// Create the default fetcher from configuration
pub fn create_fetcher(config: &FetchConfig) -> Arc<dyn Fetcher> {
    Arc::new(RepositoryFetcher::new(
        FileFetcher::new(),
        HttpFetcher::new(
            Duration::from_secs(config.timeout_secs),
            config.max_artifact_mb.saturating_mul(1024 * 1024),
        ),
    ))
}
