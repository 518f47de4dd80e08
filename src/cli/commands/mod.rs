//! CLI command implementations

pub mod config;
pub mod resolve;

pub use config::execute as config;
pub use resolve::execute as resolve;
