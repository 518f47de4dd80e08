//! Session-scoped store of check records.

use super::inflight::{CheckGuard, Claim, InFlight, PendingCheck};
use super::key::CheckKey;
use super::record::{CheckOutcome, CheckRecord};
use crate::artifact::{Coordinate, Repository, RepositoryId};
use crate::clock::{Clock, SystemClock};
use crate::error::{ReprobeError, ReprobeResult};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Which outcomes may be served from the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Reuse NotFound records within their repository's update window
    pub cache_not_found: bool,
    /// Reuse Error records within their repository's update window
    pub cache_transfer_errors: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            cache_not_found: true,
            cache_transfer_errors: false,
        }
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered by a fresh record
    pub hits: u64,
    /// Lookups that required a check
    pub misses: u64,
    /// Outcomes recorded
    pub checks: u64,
    /// Claims that joined a check already in progress
    pub coalesced: u64,
    /// Records currently held
    pub records: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Concurrency-safe map from (repository id, coordinate) to check record.
///
/// Records are stored whole behind an `Arc` and swapped under the shard
/// lock of their own key, so readers see either the previous record or the
/// next one, never a mix. No fetch or other I/O runs while a shard is held.
pub struct NotFoundCache {
    records: DashMap<CheckKey, Arc<CheckRecord>>,
    in_flight: DashMap<CheckKey, Arc<InFlight>>,
    clock: Arc<dyn Clock>,
    policy: CachePolicy,
    hits: AtomicU64,
    misses: AtomicU64,
    checks: AtomicU64,
    coalesced: AtomicU64,
}

impl NotFoundCache {
    /// Create an empty cache using wall-clock time
    pub fn new(policy: CachePolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    /// Create an empty cache with an explicit time source
    pub fn with_clock(policy: CachePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            in_flight: DashMap::new(),
            clock,
            policy,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            checks: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Current record for the key, if any
    pub fn lookup(
        &self,
        repository: &RepositoryId,
        coordinate: &Coordinate,
    ) -> Option<Arc<CheckRecord>> {
        let key = CheckKey::new(repository, coordinate);
        self.records.get(&key).map(|r| Arc::clone(r.value()))
    }

    /// Like [`lookup`](Self::lookup), but fails if the record read back was
    /// filed for a different key
    pub fn lookup_verified(
        &self,
        repository: &RepositoryId,
        coordinate: &Coordinate,
    ) -> ReprobeResult<Option<Arc<CheckRecord>>> {
        let key = CheckKey::new(repository, coordinate);
        match self.records.get(&key).map(|r| Arc::clone(r.value())) {
            Some(record) => {
                Self::verify(&key, &record)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Check that a record belongs to the key it was read under
    pub fn verify(key: &CheckKey, record: &CheckRecord) -> ReprobeResult<()> {
        if record.key() != key {
            return Err(ReprobeError::CacheCorruption {
                expected: key.to_string(),
                found: record.key().to_string(),
            });
        }
        Ok(())
    }

    /// Install a new record for the key with `checked_at = now`.
    ///
    /// Concurrent writers to the same key resolve last-write-wins; each
    /// write replaces the whole record.
    pub fn record_outcome(
        &self,
        repository: &RepositoryId,
        coordinate: &Coordinate,
        outcome: CheckOutcome,
    ) -> Arc<CheckRecord> {
        let key = CheckKey::new(repository, coordinate);
        self.record_key(&key, outcome)
    }

    pub(crate) fn record_key(&self, key: &CheckKey, outcome: CheckOutcome) -> Arc<CheckRecord> {
        let now = self.clock.now();

        let record = match self.records.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let record = Arc::new(CheckRecord::new(
                    key.clone(),
                    outcome,
                    now,
                    Some(entry.get().as_ref()),
                ));
                entry.insert(Arc::clone(&record));
                record
            }
            Entry::Vacant(entry) => {
                let record = Arc::new(CheckRecord::new(key.clone(), outcome, now, None));
                entry.insert(Arc::clone(&record));
                record
            }
        };

        self.checks.fetch_add(1, Ordering::Relaxed);
        debug!("Recorded {} for {}", record.outcome(), key);
        record
    }

    /// Whether a record may be reused instead of checking again
    pub fn is_fresh(&self, record: &CheckRecord, repository: &Repository) -> bool {
        if record.repository_id() != repository.id() {
            return false;
        }

        let policy = repository.update_policy();
        match record.outcome() {
            CheckOutcome::Found => true,
            CheckOutcome::NotFound => {
                self.policy.cache_not_found
                    && policy.is_fresh(record.checked_at(), self.clock.now())
            }
            CheckOutcome::Error(_) => {
                self.policy.cache_transfer_errors
                    && policy.is_fresh(record.checked_at(), self.clock.now())
            }
        }
    }

    /// Fresh record for this repository and coordinate, counting the
    /// lookup as a hit or a miss
    pub fn fresh(
        &self,
        repository: &Repository,
        coordinate: &Coordinate,
    ) -> ReprobeResult<Option<Arc<CheckRecord>>> {
        let record = self
            .lookup_verified(repository.id(), coordinate)?
            .filter(|r| self.is_fresh(r, repository));

        if record.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        Ok(record)
    }

    /// Claim the right to check a key.
    ///
    /// The first claimant gets [`Claim::ShouldCheck`]; claims made while
    /// that check runs get [`Claim::AlreadyInProgress`].
    pub fn claim_check(&self, repository: &RepositoryId, coordinate: &Coordinate) -> Claim<'_> {
        let key = CheckKey::new(repository, coordinate);

        match self.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => {
                self.coalesced.fetch_add(1, Ordering::Relaxed);
                Claim::AlreadyInProgress(PendingCheck::new(Arc::clone(entry.get())))
            }
            Entry::Vacant(entry) => {
                let flight = Arc::new(InFlight::new());
                entry.insert(Arc::clone(&flight));
                Claim::ShouldCheck(CheckGuard::new(self, key, flight))
            }
        }
    }

    pub(crate) fn end_flight(&self, key: &CheckKey, flight: &Arc<InFlight>) {
        self.in_flight
            .remove_if(key, |_, current| Arc::ptr_eq(current, flight));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop all records; checks in progress are unaffected
    pub fn clear(&self) {
        self.records.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            checks: self.checks.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            records: self.records.len() as u64,
        }
    }
}

impl Default for NotFoundCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

impl std::fmt::Debug for NotFoundCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotFoundCache")
            .field("records", &self.records.len())
            .field("in_flight", &self.in_flight.len())
            .field("policy", &self.policy)
            .finish()
    }
}
