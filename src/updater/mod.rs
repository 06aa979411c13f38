//! Stat Updater module
//!
//! Incremental running-average updates with last-writer-wins or strict
//! (compare-and-swap) persistence.

mod error;
mod retry;
mod service;

pub use error::UpdateError;
pub use retry::{ApplyOptions, UpdateMode, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES};
pub use service::AggregateStatUpdater;
