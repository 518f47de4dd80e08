//! Session management module

pub mod state;

pub use state::{Session, SessionSummary};
