//! Typed task dispatch for the background worker.
//!
//! This crate provides:
//! - collaborator traits the dispatcher talks to (`RentalStore`, `MetricsSource`)
//! - an in-memory reference store backing the worker binary and tests
//! - the `Dispatcher` routing every task variant to its collaborator

pub mod dispatcher;
pub mod memory;
pub mod store;

pub use dispatcher::Dispatcher;
pub use memory::MemoryStore;
pub use store::{MetricsSnapshot, MetricsSource, RentalStore, StoreError};
