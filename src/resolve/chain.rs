//! Fallback chain for a single coordinate

use crate::artifact::{Coordinate, Repository};
use crate::cache::{ArtifactStore, CheckGuard, CheckKey, CheckOutcome, CheckRecord, Claim, NotFoundCache};
use crate::error::ReprobeResult;
use crate::fetch::{ArtifactHandle, FetchResult, Fetcher};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// What one repository contributed to a chain
enum Step {
    Found(ArtifactHandle),
    Next,
}

/// Outcome of walking the chain for one coordinate
#[derive(Debug)]
pub(crate) struct Walked {
    pub handle: Option<ArtifactHandle>,
    pub fetches: usize,
}

/// Everything a fallback chain needs, shareable across worker threads
pub(crate) struct Chain {
    pub fetcher: Arc<dyn Fetcher>,
    pub cache: Arc<NotFoundCache>,
    pub artifacts: Arc<ArtifactStore>,
    pub repositories: Arc<[Repository]>,
    pub coalesce: bool,
}

impl Chain {
    /// Try each repository in order, stopping at the first that has the artifact
    pub fn walk(&self, coordinate: &Coordinate) -> ReprobeResult<Walked> {
        let mut fetches = 0;

        for repository in self.repositories.iter() {
            if !repository.is_enabled() {
                debug!("Skipping disabled repository {}", repository.id());
                continue;
            }

            if let Step::Found(handle) = self.visit(coordinate, repository, &mut fetches)? {
                debug!("Resolved {} from {}", coordinate, repository.id());
                return Ok(Walked {
                    handle: Some(handle),
                    fetches,
                });
            }
        }

        debug!(
            "{} not found in any of {} repositories",
            coordinate,
            self.repositories.len()
        );
        Ok(Walked {
            handle: None,
            fetches,
        })
    }

    fn visit(
        &self,
        coordinate: &Coordinate,
        repository: &Repository,
        fetches: &mut usize,
    ) -> ReprobeResult<Step> {
        let key = CheckKey::new(repository.id(), coordinate);

        loop {
            if let Some(record) = self.cache.fresh(repository, coordinate)? {
                if let Some(step) = self.reuse(&key, &record) {
                    return Ok(step);
                }
            }

            if !self.coalesce {
                return Ok(self.check(&key, repository, None, fetches));
            }

            match self.cache.claim_check(repository.id(), coordinate) {
                Claim::ShouldCheck(guard) => {
                    // Another caller may have finished this key between lookup and claim
                    if let Some(record) = self.cache.lookup_verified(repository.id(), coordinate)? {
                        if self.cache.is_fresh(&record, repository) {
                            if let Some(step) = self.reuse(&key, &record) {
                                return Ok(step);
                            }
                        }
                    }
                    return Ok(self.check(&key, repository, Some(guard), fetches));
                }
                Claim::AlreadyInProgress(pending) => {
                    debug!("Waiting for in-flight check of {}", key);
                    if let Some(record) = pending.wait() {
                        NotFoundCache::verify(&key, &record)?;
                        match record.outcome() {
                            CheckOutcome::Found => {
                                if let Some(handle) = self.artifacts.get(&key) {
                                    return Ok(Step::Found(handle));
                                }
                            }
                            CheckOutcome::NotFound | CheckOutcome::Error(_) => {
                                return Ok(Step::Next)
                            }
                        }
                    }
                    // The owner gave up; look again
                }
            }
        }
    }

    /// Turn a fresh record into a step, if it can stand in for a check
    fn reuse(&self, key: &CheckKey, record: &CheckRecord) -> Option<Step> {
        match record.outcome() {
            CheckOutcome::Found => self.artifacts.get(key).map(Step::Found),
            CheckOutcome::NotFound => {
                debug!("Skipping {}: not found at {}", key, record.checked_at());
                Some(Step::Next)
            }
            CheckOutcome::Error(reason) => {
                debug!("Skipping {}: cached error ({})", key, reason);
                Some(Step::Next)
            }
        }
    }

    /// Fetch from the repository and record what happened
    fn check(
        &self,
        key: &CheckKey,
        repository: &Repository,
        guard: Option<CheckGuard<'_>>,
        fetches: &mut usize,
    ) -> Step {
        let coordinate = key.coordinate();
        *fetches += 1;

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.fetcher.fetch(coordinate, repository)
        }))
        .unwrap_or_else(|_| FetchResult::TransportError("fetcher panicked".to_string()));

        let (outcome, step) = match result {
            FetchResult::Found(bytes) => {
                let handle =
                    ArtifactHandle::new(coordinate.clone(), repository.id().clone(), bytes);
                // Stored before the Found record so readers of that record find the bytes
                self.artifacts.insert(key.clone(), handle.clone());
                (CheckOutcome::Found, Step::Found(handle))
            }
            FetchResult::NotFound => (CheckOutcome::NotFound, Step::Next),
            FetchResult::TransportError(reason) => {
                warn!(
                    "Failed to fetch {} from {}: {}",
                    coordinate,
                    repository.id(),
                    reason
                );
                (CheckOutcome::Error(reason), Step::Next)
            }
        };

        match guard {
            Some(guard) => {
                guard.complete(outcome);
            }
            None => {
                self.cache.record_outcome(repository.id(), coordinate, outcome);
            }
        }

        step
    }
}
