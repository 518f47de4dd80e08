//! Artifact resolution across ordered repositories
//!
//! For each coordinate the resolver walks the session's repositories in
//! declared order, consulting the session cache before every fetch:
//! 1. Fresh NotFound for this repository: skip it
//! 2. Fresh Found for this repository: done
//! 3. Otherwise fetch, record the outcome, and stop on Found
//!
//! Transport errors are recorded and the walk continues. Coordinates in a
//! batch are resolved in parallel; repositories for one coordinate never are.

mod chain;
mod report;

pub use report::{ResolutionOutcome, ResolutionReport};

use crate::artifact::Coordinate;
use crate::config::schema::ResolverConfig;
use crate::error::{ReprobeError, ReprobeResult};
use crate::fetch::Fetcher;
use crate::session::Session;
use chain::{Chain, Walked};
use futures_util::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// Resolves coordinates against a session's repositories
pub struct Resolver {
    fetcher: Arc<dyn Fetcher>,
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: ResolverConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn chain(&self, session: &Session) -> Chain {
        Chain {
            fetcher: Arc::clone(&self.fetcher),
            cache: session.shared_cache(),
            artifacts: session.shared_artifacts(),
            repositories: session.shared_repositories(),
            coalesce: self.config.coalesce_checks,
        }
    }

    /// Resolve one coordinate, blocking on fetches
    pub fn resolve(
        &self,
        session: &Session,
        coordinate: &Coordinate,
    ) -> ReprobeResult<ResolutionOutcome> {
        let walked = self.chain(session).walk(coordinate)?;
        Ok(outcome_of(walked))
    }

    /// Resolve a batch one coordinate at a time on the calling thread
    pub fn resolve_each(
        &self,
        session: &Session,
        coordinates: &[Coordinate],
    ) -> ReprobeResult<ResolutionReport> {
        let chain = self.chain(session);
        let mut report = ResolutionReport::default();

        for coordinate in dedup(coordinates) {
            let walked = chain.walk(&coordinate)?;
            let fetches = walked.fetches;
            report.push(coordinate, outcome_of(walked), fetches);
        }

        Ok(report)
    }

    /// Resolve a batch, running up to `workers` coordinates in parallel.
    ///
    /// Safe to call concurrently on the same session; each coordinate's
    /// outcome is the same however many callers ask for it at once.
    pub async fn resolve_all(
        &self,
        session: &Session,
        coordinates: &[Coordinate],
    ) -> ReprobeResult<ResolutionReport> {
        let chain = Arc::new(self.chain(session));
        let permits = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let unique = dedup(coordinates);

        debug!(
            "Resolving {} coordinates in session {} with {} workers",
            unique.len(),
            session.id(),
            self.config.workers.max(1)
        );

        let tasks = unique.into_iter().map(|coordinate| {
            let chain = Arc::clone(&chain);
            let permits = Arc::clone(&permits);
            async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| ReprobeError::TaskFailed(e.to_string()))?;

                let target = coordinate.clone();
                let walked = tokio::task::spawn_blocking(move || chain.walk(&target))
                    .await
                    .map_err(|e| ReprobeError::TaskFailed(e.to_string()))??;

                Ok::<_, ReprobeError>((coordinate, walked))
            }
        });

        let mut report = ResolutionReport::default();
        for (coordinate, walked) in try_join_all(tasks).await? {
            let fetches = walked.fetches;
            report.push(coordinate, outcome_of(walked), fetches);
        }

        info!(
            "Resolved {}/{} coordinates with {} fetches",
            report.resolved_count(),
            report.len(),
            report.fetches()
        );
        Ok(report)
    }
}

fn outcome_of(walked: Walked) -> ResolutionOutcome {
    match walked.handle {
        Some(handle) => ResolutionOutcome::Found(handle),
        None => ResolutionOutcome::Unresolved,
    }
}

/// Drop repeated coordinates, keeping first-seen order
fn dedup(coordinates: &[Coordinate]) -> Vec<Coordinate> {
    let mut seen = HashSet::new();
    coordinates
        .iter()
        .filter(|c| seen.insert((*c).clone()))
        .cloned()
        .collect()
}
