//! Concurrent fallback resolution against a shared session cache
//!
//! Many threads resolve the same batch at once. The first repository has
//! most of the batch but answers slowly and lacks one artifact; the second
//! has everything. Every thread must see every artifact, from the first
//! repository that has it, no matter how the first repository's negative
//! answer interleaves with the other threads' checks.

use reprobe::artifact::{Coordinate, Repository};
use reprobe::cache::{CachePolicy, CheckOutcome};
use reprobe::config::schema::ResolverConfig;
use reprobe::fetch::{FetchResult, Fetcher};
use reprobe::resolve::{ResolutionOutcome, Resolver};
use reprobe::session::Session;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const THREADS: usize = 10;
const ITERATIONS: usize = 50;

/// Remote has only the `remote-` artifacts; local has everything
struct SplitFetcher {
    remote_delay: Duration,
    remote_calls: AtomicUsize,
    local_calls: AtomicUsize,
}

impl SplitFetcher {
    fn new(remote_delay: Duration) -> Self {
        Self {
            remote_delay,
            remote_calls: AtomicUsize::new(0),
            local_calls: AtomicUsize::new(0),
        }
    }
}

impl Fetcher for SplitFetcher {
    fn fetch(&self, coordinate: &Coordinate, repository: &Repository) -> FetchResult {
        match repository.id().as_str() {
            "remote" => {
                self.remote_calls.fetch_add(1, Ordering::SeqCst);
                thread::sleep(self.remote_delay);
                if coordinate.artifact().starts_with("remote-") {
                    FetchResult::Found(coordinate.to_string().into_bytes())
                } else {
                    FetchResult::NotFound
                }
            }
            _ => {
                self.local_calls.fetch_add(1, Ordering::SeqCst);
                FetchResult::Found(coordinate.to_string().into_bytes())
            }
        }
    }

    fn name(&self) -> &'static str {
        "split"
    }
}

fn artifact() -> Coordinate {
    "test-groupId:test-artifactId:jar:1".parse().unwrap()
}

/// One artifact only the second repository has, four the first has
fn batch() -> Vec<Coordinate> {
    let mut coordinates = vec![artifact()];
    coordinates.extend(
        (0..4).map(|i| format!("test-groupId:remote-{}:jar:1", i).parse().unwrap()),
    );
    coordinates
}

fn expected_source(coordinate: &Coordinate) -> &'static str {
    if coordinate.artifact().starts_with("remote-") {
        "remote"
    } else {
        "local"
    }
}

fn repositories() -> Vec<Repository> {
    vec![
        Repository::new("remote", "https://repository.example.org/maven2").unwrap(),
        Repository::new("local", "file:///var/cache/local-repository").unwrap(),
    ]
}

fn run_threads(config: ResolverConfig) {
    let fetcher = Arc::new(SplitFetcher::new(Duration::from_millis(1)));
    let resolver = Arc::new(Resolver::new(fetcher.clone(), config));
    let coordinates = batch();

    for iteration in 0..ITERATIONS {
        let session = Arc::new(Session::new(repositories(), CachePolicy::default()).unwrap());
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let session = Arc::clone(&session);
                let resolver = Arc::clone(&resolver);
                let barrier = Arc::clone(&barrier);
                // Each thread walks the batch from a different starting point
                let mut order = coordinates.clone();
                let len = order.len();
                order.rotate_left(t % len);
                thread::spawn(move || {
                    barrier.wait();
                    resolver.resolve_each(&session, &order).unwrap()
                })
            })
            .collect();

        for handle in handles {
            let report = handle.join().unwrap();
            assert_eq!(report.len(), coordinates.len());
            for c in &coordinates {
                let found = report
                    .get(c)
                    .and_then(ResolutionOutcome::handle)
                    .unwrap_or_else(|| panic!("{} unresolved in iteration {}", c, iteration));
                assert_eq!(found.repository().as_str(), expected_source(c));
                assert_eq!(found.bytes(), c.to_string().as_bytes());
            }
        }

        // Each answer stays filed under the repository that gave it
        let remote = session.repositories()[0].id();
        let local = session.repositories()[1].id();
        for c in &coordinates {
            let record = session.cache().lookup(remote, c).unwrap();
            match expected_source(c) {
                "remote" => {
                    assert_eq!(record.outcome(), &CheckOutcome::Found);
                    assert!(session.cache().lookup(local, c).is_none());
                }
                _ => {
                    assert_eq!(record.outcome(), &CheckOutcome::NotFound);
                    let local_record = session.cache().lookup(local, c).unwrap();
                    assert_eq!(local_record.outcome(), &CheckOutcome::Found);
                }
            }
        }
    }

    assert!(fetcher.remote_calls.load(Ordering::SeqCst) >= ITERATIONS * coordinates.len());
    assert!(fetcher.local_calls.load(Ordering::SeqCst) >= ITERATIONS);
}

#[test]
fn concurrent_resolution_always_finds_artifact() {
    run_threads(ResolverConfig::default());
}

#[test]
fn concurrent_resolution_without_coalescing() {
    run_threads(ResolverConfig {
        coalesce_checks: false,
        ..Default::default()
    });
}

#[test]
fn coalesced_checks_fetch_each_repository_once() {
    let fetcher = Arc::new(SplitFetcher::new(Duration::from_millis(20)));
    let resolver = Arc::new(Resolver::new(fetcher.clone(), ResolverConfig::default()));
    let session = Arc::new(Session::new(repositories(), CachePolicy::default()).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));
    let a = artifact();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let (session, resolver, barrier, a) = (
                Arc::clone(&session),
                Arc::clone(&resolver),
                Arc::clone(&barrier),
                a.clone(),
            );
            thread::spawn(move || {
                barrier.wait();
                resolver.resolve(&session, &a).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_found());
    }

    // Late arrivals see the fresh records and never fetch
    assert_eq!(fetcher.remote_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fetcher.local_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_batches_on_one_session() {
    let fetcher = Arc::new(SplitFetcher::new(Duration::from_millis(1)));
    let resolver = Arc::new(Resolver::new(fetcher, ResolverConfig::default()));

    for _ in 0..10 {
        let session = Arc::new(Session::new(repositories(), CachePolicy::default()).unwrap());
        let coordinates = batch();

        let tasks: Vec<_> = (0..THREADS)
            .map(|_| {
                let session = Arc::clone(&session);
                let resolver = Arc::clone(&resolver);
                let coordinates = coordinates.clone();
                tokio::spawn(async move { resolver.resolve_all(&session, &coordinates).await })
            })
            .collect();

        for task in tasks {
            let report = task.await.unwrap().unwrap();
            assert_eq!(report.len(), 5);
            assert!(report.is_complete());
            for (c, outcome) in report.iter() {
                let handle = outcome.handle().unwrap();
                assert_eq!(handle.repository().as_str(), expected_source(c));
            }
        }
    }
}
