//! joke_stats Library
//!
//! Running-average rating and battle statistics for the dad jokes app.
//! Re-exports modules for the server binary and integration testing.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod store;
pub mod updater;

pub use config::Config;
pub use domain::{compute_next, DomainError, Observation, RunningStat, StatDomain};
pub use error::{AppError, AppResult};
pub use store::{DocumentStore, InMemoryStore, PgDocumentStore, StoreError, StoredStat};
pub use updater::{AggregateStatUpdater, ApplyOptions, UpdateError, UpdateMode};
