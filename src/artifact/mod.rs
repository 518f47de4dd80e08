//! Artifact and repository identities
//!
//! Both types are immutable values. A `Coordinate` names what to find;
//! a `Repository` names where to look and how long a miss stays valid.

pub mod coordinate;
pub mod repository;

pub use coordinate::{Coordinate, DEFAULT_TYPE};
pub use repository::{Repository, RepositoryId, UpdatePolicy};
