//! Coalescing of concurrent checks for the same key.
//!
//! The first caller to claim a key runs the check; everyone else who
//! claims it while that check is running waits for its record instead of
//! issuing a duplicate fetch. Correctness never depends on this: records
//! are keyed per repository whether or not checks are coalesced.

use super::key::CheckKey;
use super::not_found::NotFoundCache;
use super::record::{CheckOutcome, CheckRecord};
use std::sync::{Arc, Condvar, Mutex};

#[derive(Debug)]
enum FlightState {
    Running,
    Completed(Arc<CheckRecord>),
    Abandoned,
}

/// Shared state of one in-progress check
#[derive(Debug)]
pub(crate) struct InFlight {
    state: Mutex<FlightState>,
    done: Condvar,
}

impl InFlight {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(FlightState::Running),
            done: Condvar::new(),
        }
    }

    fn finish(&self, state: FlightState) {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *guard = state;
        self.done.notify_all();
    }

    fn wait(&self) -> Option<Arc<CheckRecord>> {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            match &*guard {
                FlightState::Running => {
                    guard = self.done.wait(guard).unwrap_or_else(|e| e.into_inner());
                }
                FlightState::Completed(record) => return Some(Arc::clone(record)),
                FlightState::Abandoned => return None,
            }
        }
    }
}

/// Answer to [`NotFoundCache::claim_check`]
#[must_use]
pub enum Claim<'a> {
    /// This caller owns the check and must complete the guard
    ShouldCheck(CheckGuard<'a>),
    /// Another caller is already checking this key
    AlreadyInProgress(PendingCheck),
}

/// Ownership of one in-progress check.
///
/// Dropping the guard without calling [`CheckGuard::complete`] releases
/// the claim and wakes waiters empty-handed, so they check for themselves.
pub struct CheckGuard<'a> {
    cache: &'a NotFoundCache,
    key: CheckKey,
    flight: Arc<InFlight>,
    finished: bool,
}

impl<'a> CheckGuard<'a> {
    pub(crate) fn new(cache: &'a NotFoundCache, key: CheckKey, flight: Arc<InFlight>) -> Self {
        Self {
            cache,
            key,
            flight,
            finished: false,
        }
    }

    pub fn key(&self) -> &CheckKey {
        &self.key
    }

    /// Record the outcome of the check and hand it to any waiters
    pub fn complete(mut self, outcome: CheckOutcome) -> Arc<CheckRecord> {
        let record = self.cache.record_key(&self.key, outcome);
        self.cache.end_flight(&self.key, &self.flight);
        self.flight.finish(FlightState::Completed(Arc::clone(&record)));
        self.finished = true;
        record
    }
}

impl Drop for CheckGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.cache.end_flight(&self.key, &self.flight);
            self.flight.finish(FlightState::Abandoned);
        }
    }
}

/// Handle on a check another caller is running
pub struct PendingCheck {
    flight: Arc<InFlight>,
}

impl PendingCheck {
    pub(crate) fn new(flight: Arc<InFlight>) -> Self {
        Self { flight }
    }

    /// Block until the owning caller finishes.
    ///
    /// Returns `None` when the owner gave up without recording an outcome.
    pub fn wait(self) -> Option<Arc<CheckRecord>> {
        self.flight.wait()
    }
}
