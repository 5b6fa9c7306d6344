//! In-memory reference store.
//!
//! Stands in for the backing database, which is an external collaborator.
//! Used by the worker binary for out-of-the-box runs and by tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use rently_core::rental::RentalSummary;
use rently_core::report::{PopularProduct, RevenueSummary};

use crate::store::{MetricsSnapshot, MetricsSource, RentalStore, StoreError};

/// An issued password-reset token.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

/// Thread-safe in-memory implementation of [`RentalStore`] and
/// [`MetricsSource`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    rentals: Mutex<HashMap<i64, RentalSummary>>,
    reset_tokens: Mutex<Vec<ResetToken>>,
    products: Mutex<Vec<PopularProduct>>,
    tokens_purged: AtomicU64,
    inventory_refreshes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_rental(&self, summary: RentalSummary) {
        self.rentals
            .lock()
            .unwrap()
            .insert(summary.rental_order_id, summary);
    }

    pub fn insert_reset_token(&self, token: &str, issued_at: DateTime<Utc>) {
        self.reset_tokens.lock().unwrap().push(ResetToken {
            token: token.to_string(),
            issued_at,
        });
    }

    pub fn insert_product(&self, product: PopularProduct) {
        self.products.lock().unwrap().push(product);
    }

    /// Reset tokens currently held (expired or not).
    pub fn token_count(&self) -> usize {
        self.reset_tokens.lock().unwrap().len()
    }
}

impl RentalStore for MemoryStore {
    fn rental_summary(&self, rental_order_id: i64) -> Result<Option<RentalSummary>, StoreError> {
        Ok(self.rentals.lock().unwrap().get(&rental_order_id).cloned())
    }

    fn purge_expired_reset_tokens(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut tokens = self.reset_tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| t.issued_at >= cutoff);
        let purged = before - tokens.len();
        self.tokens_purged.fetch_add(purged as u64, Ordering::Relaxed);
        Ok(purged)
    }

    fn refresh_inventory_counts(&self) -> Result<usize, StoreError> {
        let touched = self.products.lock().unwrap().len();
        self.inventory_refreshes.fetch_add(1, Ordering::Relaxed);
        Ok(touched)
    }

    fn revenue_summary(&self) -> Result<RevenueSummary, StoreError> {
        let rentals = self.rentals.lock().unwrap();
        if rentals.is_empty() {
            return Ok(RevenueSummary::empty());
        }
        let total_revenue: f64 = rentals.values().map(|r| r.total_amount).sum();
        let total_orders = rentals.len() as u64;
        Ok(RevenueSummary {
            total_revenue,
            total_orders,
            avg_order_value: total_revenue / total_orders as f64,
        })
    }

    fn popular_products(&self, limit: usize) -> Result<Vec<PopularProduct>, StoreError> {
        let mut products = self.products.lock().unwrap().clone();
        products.sort_by(|a, b| b.rental_count.cmp(&a.rental_count));
        products.truncate(limit);
        Ok(products)
    }
}

impl MetricsSource for MemoryStore {
    fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            active_rentals: self.rentals.lock().unwrap().len(),
            pending_reset_tokens: self.reset_tokens.lock().unwrap().len(),
            tokens_purged_total: self.tokens_purged.load(Ordering::Relaxed),
            inventory_refreshes_total: self.inventory_refreshes.load(Ordering::Relaxed),
        }
    }
}
