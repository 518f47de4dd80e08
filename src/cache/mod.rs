//! Per-repository check cache
//!
//! Remembers, for each (repository, coordinate) pair, the outcome of the
//! last check so the resolver can skip repositories already known not to
//! have an artifact.
//!
//! # Key Isolation
//!
//! Every record is filed under a [`CheckKey`], which cannot be constructed
//! without a repository id. A miss recorded against one repository is
//! therefore never visible when another repository is asked about the same
//! coordinate.
//!
//! # Freshness
//!
//! | Outcome | Fresh while |
//! |---------|-------------|
//! | Found | always (for the session) |
//! | NotFound | inside the repository's update window, if `cache_not_found` |
//! | Error | inside the update window, only if `cache_transfer_errors` |

pub mod artifacts;
pub mod inflight;
pub mod key;
pub mod not_found;
pub mod record;

pub use artifacts::ArtifactStore;
pub use inflight::{CheckGuard, Claim, PendingCheck};
pub use key::CheckKey;
pub use not_found::{CachePolicy, CacheStats, NotFoundCache};
pub use record::{CheckOutcome, CheckRecord};
