//! Resolution session state

use crate::artifact::Repository;
use crate::cache::{ArtifactStore, CachePolicy, CacheStats, NotFoundCache};
use crate::clock::{Clock, SystemClock};
use crate::error::{ReprobeError, ReprobeResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// One logical resolution run.
///
/// Owns the repository list and the only check cache its resolutions use.
/// Sessions never share cache state; ending a session drops its records.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    repositories: Arc<[Repository]>,
    cache: Arc<NotFoundCache>,
    artifacts: Arc<ArtifactStore>,
    created_at: DateTime<Utc>,
}

/// What a session did, reported when it ends
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub artifacts: usize,
    pub cache: CacheStats,
}

impl Session {
    /// Start a session with an empty cache
    pub fn new(repositories: Vec<Repository>, policy: CachePolicy) -> ReprobeResult<Self> {
        Self::with_clock(repositories, policy, Arc::new(SystemClock))
    }

    /// Start a session whose cache reads time from `clock`
    pub fn with_clock(
        repositories: Vec<Repository>,
        policy: CachePolicy,
        clock: Arc<dyn Clock>,
    ) -> ReprobeResult<Self> {
        if repositories.is_empty() {
            return Err(ReprobeError::NoRepositories);
        }

        let mut seen = HashSet::new();
        for repo in &repositories {
            if !seen.insert(repo.id().clone()) {
                return Err(ReprobeError::DuplicateRepository(repo.id().to_string()));
            }
        }

        let session = Self {
            id: Uuid::new_v4(),
            repositories: repositories.into(),
            cache: Arc::new(NotFoundCache::with_clock(policy, clock)),
            artifacts: Arc::new(ArtifactStore::new()),
            created_at: Utc::now(),
        };

        info!(
            "Started session {} with {} repositories",
            session.id,
            session.repositories.len()
        );
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Repositories in search order
    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn cache(&self) -> &NotFoundCache {
        &self.cache
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn shared_repositories(&self) -> Arc<[Repository]> {
        Arc::clone(&self.repositories)
    }

    pub(crate) fn shared_cache(&self) -> Arc<NotFoundCache> {
        Arc::clone(&self.cache)
    }

    pub(crate) fn shared_artifacts(&self) -> Arc<ArtifactStore> {
        Arc::clone(&self.artifacts)
    }

    /// End the session, releasing its cache
    pub fn end(self) -> SessionSummary {
        let summary = SessionSummary {
            id: self.id,
            created_at: self.created_at,
            ended_at: Utc::now(),
            artifacts: self.artifacts.len(),
            cache: self.cache.stats(),
        };

        info!(
            "Ended session {}: {} checks, {} cache hits, {} coalesced",
            summary.id, summary.cache.checks, summary.cache.hits, summary.cache.coalesced
        );
        summary
    }
}
