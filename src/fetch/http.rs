//! HTTP(S) repositories

use super::{FetchResult, Fetcher};
use crate::artifact::{Coordinate, Repository};
use std::time::Duration;
use tracing::{debug, warn};

/// Fetches artifacts with blocking HTTP GETs
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
    max_bytes: u64,
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}

impl HttpFetcher {
    /// Create a fetcher with a per-request timeout and a body size limit
    pub fn new(timeout: Duration, max_bytes: u64) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self { agent, max_bytes }
    }

    /// URL of an artifact inside a repository
    pub fn artifact_url(location: &str, coordinate: &Coordinate) -> String {
        format!(
            "{}/{}",
            location.trim_end_matches('/'),
            coordinate.layout_path()
        )
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, coordinate: &Coordinate, repository: &Repository) -> FetchResult {
        let url = Self::artifact_url(repository.location(), coordinate);
        debug!("GET {}", url);

        match self.agent.get(&url).call() {
            Ok(mut response) => match response
                .body_mut()
                .with_config()
                .limit(self.max_bytes)
                .read_to_vec()
            {
                Ok(bytes) => FetchResult::Found(bytes),
                Err(e) => {
                    warn!("Failed reading body of {}: {}", url, e);
                    FetchResult::TransportError(e.to_string())
                }
            },
            Err(ureq::Error::StatusCode(404 | 410)) => FetchResult::NotFound,
            Err(ureq::Error::StatusCode(code)) => {
                FetchResult::TransportError(format!("HTTP {} from {}", code, url))
            }
            Err(e) => FetchResult::TransportError(format!("{}: {}", url, e)),
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
