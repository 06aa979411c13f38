//! Domain module
//!
//! Core domain types and the running-average arithmetic.

pub mod context;
pub mod error;
pub mod observation;
pub mod stat;

pub use context::OperationContext;
pub use error::DomainError;
pub use observation::{Observation, StatDomain};
pub use stat::{compute_next, RunningStat};
