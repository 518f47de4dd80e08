//! Configuration schema for reprobe
//!
//! Configuration is stored at `~/.config/reprobe/config.toml`

use crate::artifact::{Repository, UpdatePolicy};
use crate::cache::CachePolicy;
use crate::error::ReprobeResult;
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Resolution settings
    pub resolver: ResolverConfig,

    /// Transport settings
    pub fetch: FetchConfig,

    /// Repositories, in the order they are searched
    pub repositories: Vec<RepositoryConfig>,
}

impl Config {
    /// Build the enabled and disabled repositories in declared order
    pub fn repositories(&self) -> ReprobeResult<Vec<Repository>> {
        self.repositories
            .iter()
            .map(RepositoryConfig::to_repository)
            .collect()
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum coordinates resolved in parallel per batch
    pub workers: usize,

    /// Let concurrent callers share one in-progress check per key
    pub coalesce_checks: bool,

    /// Reuse not-found results within the repository update window
    pub cache_not_found: bool,

    /// Reuse transfer errors within the repository update window
    pub cache_transfer_errors: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            coalesce_checks: true,
            cache_not_found: true,
            cache_transfer_errors: false,
        }
    }
}

impl ResolverConfig {
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            cache_not_found: self.cache_not_found,
            cache_transfer_errors: self.cache_transfer_errors,
        }
    }
}

/// Transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout for HTTP repositories
    pub timeout_secs: u64,

    /// Largest artifact accepted over HTTP, in MiB
    pub max_artifact_mb: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_artifact_mb: 256,
        }
    }
}

/// One `[[repositories]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Repository identity (cache key component)
    pub id: String,

    /// `file://` path, plain path, or `http(s)://` URL
    pub url: String,

    /// always, daily, never, or interval:<minutes>
    #[serde(default)]
    pub update_policy: UpdatePolicy,

    /// Disabled repositories are skipped during resolution
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl RepositoryConfig {
    pub fn to_repository(&self) -> ReprobeResult<Repository> {
        Ok(Repository::new(&self.id, self.url.clone())?
            .with_update_policy(self.update_policy)
            .with_enabled(self.enabled))
    }
}
