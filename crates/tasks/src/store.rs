//! Collaborator traits consumed by the task dispatcher.
//!
//! The queue core knows nothing about databases or metrics; the dispatcher
//! reaches them through these seams. Implementations are expected to block
//! (the dispatcher only calls them from worker threads or for quick lookups),
//! which is why the methods are synchronous.

use chrono::{DateTime, Utc};
use serde::Serialize;

use rently_core::rental::RentalSummary;
use rently_core::report::{PopularProduct, RevenueSummary};

/// Errors from store collaborators.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// Read/maintenance access to rental data.
pub trait RentalStore: Send + Sync {
    /// Look up the denormalized view of one rental order.
    fn rental_summary(&self, rental_order_id: i64) -> Result<Option<RentalSummary>, StoreError>;

    /// Remove password-reset tokens issued before `cutoff`. Returns the
    /// number removed.
    fn purge_expired_reset_tokens(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;

    /// Recompute the availability counters. Returns the number of products
    /// touched.
    fn refresh_inventory_counts(&self) -> Result<usize, StoreError>;

    /// Aggregate revenue across all rental orders.
    fn revenue_summary(&self) -> Result<RevenueSummary, StoreError>;

    /// Top products by rental frequency.
    fn popular_products(&self, limit: usize) -> Result<Vec<PopularProduct>, StoreError>;
}

/// Point-in-time process counters for the metrics task.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricsSnapshot {
    pub active_rentals: usize,
    pub pending_reset_tokens: usize,
    pub tokens_purged_total: u64,
    pub inventory_refreshes_total: u64,
}

/// Source of process counters, sampled by the periodic metrics job.
pub trait MetricsSource: Send + Sync {
    fn snapshot(&self) -> MetricsSnapshot;
}
