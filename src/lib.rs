//! Reprobe - Ordered-fallback artifact resolution
//!
//! Resolves artifact coordinates against an ordered list of repositories,
//! remembering per repository which checks came back empty so later
//! lookups can skip them until the repository's update policy says the
//! answer is stale.

pub mod artifact;
pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod resolve;
pub mod session;

pub use error::{ReprobeError, ReprobeResult};
