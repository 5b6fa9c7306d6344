//! Aggregate row types for the daily report task.

use serde::{Deserialize, Serialize};

/// Revenue aggregation across rental orders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub total_revenue: f64,
    pub total_orders: u64,
    pub avg_order_value: f64,
}

impl RevenueSummary {
    /// Zero-valued summary for an empty order set.
    pub fn empty() -> Self {
        Self {
            total_revenue: 0.0,
            total_orders: 0,
            avg_order_value: 0.0,
        }
    }
}

/// One row of the popular-products ranking (by rental frequency).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularProduct {
    pub product_id: i64,
    pub product_name: String,
    pub rental_count: u64,
}
