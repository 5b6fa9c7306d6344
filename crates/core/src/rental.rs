//! Rental order view shared between the task dispatcher and email templates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Denormalized view of a rental order, as needed for confirmation emails.
///
/// Produced by the store collaborator; the full order model (line items,
/// pricing rules, handover state) lives with the backing database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalSummary {
    pub rental_order_id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub start_ts: DateTime<Utc>,
    pub end_ts: DateTime<Utc>,
    pub total_amount: f64,
    /// Order status label, e.g. "confirmed", "returned".
    pub status: String,
}
