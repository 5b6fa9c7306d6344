//! The closed set of background task variants and the handler trait.
//!
//! Request-handling code does not enqueue arbitrary callables; it enqueues
//! one of the [`Task`] variants below. Every variant can be named for logs,
//! serialized, and routed through a single typed [`TaskHandler`], and each
//! carries an [`ExecutionMode`] capability decided here rather than inferred
//! at dispatch time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// A deferred unit of background work.
///
/// Fire-and-forget: enqueuers never see a result. Variants that need input
/// carry it by value so the task is self-contained once queued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Task {
    /// Deliver a pre-composed email.
    SendEmail {
        to: String,
        subject: String,
        body: String,
    },
    /// Look up a rental order and email its confirmation to the customer.
    SendRentalConfirmation { rental_order_id: i64 },
    /// Email a payment receipt after a successful charge.
    SendPaymentConfirmation {
        payment_intent_id: String,
        to: String,
    },
    /// Purge password-reset tokens older than the retention window.
    CleanupExpiredTokens,
    /// Recompute the inventory availability counters.
    RefreshInventoryCache,
    /// Compute the revenue summary and popular-product ranking.
    GenerateDailyReports,
    /// Snapshot process counters into the log stream.
    LogSystemMetrics,
}

/// How a task is executed by the drain loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Awaited directly on the runtime; the task suspends at I/O points.
    Cooperative,
    /// Dispatched to the fixed-size worker pool; the task may block a thread.
    Blocking,
}

impl Task {
    /// Stable name used in log records and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Task::SendEmail { .. } => "send_email",
            Task::SendRentalConfirmation { .. } => "send_rental_confirmation",
            Task::SendPaymentConfirmation { .. } => "send_payment_confirmation",
            Task::CleanupExpiredTokens => "cleanup_expired_tokens",
            Task::RefreshInventoryCache => "refresh_inventory_cache",
            Task::GenerateDailyReports => "generate_daily_reports",
            Task::LogSystemMetrics => "log_system_metrics",
        }
    }

    /// Capability tag for the drain loop. Email variants suspend on SMTP
    /// I/O and cooperate; store sweeps and report queries block a thread.
    pub fn execution_mode(&self) -> ExecutionMode {
        match self {
            Task::SendEmail { .. }
            | Task::SendRentalConfirmation { .. }
            | Task::SendPaymentConfirmation { .. } => ExecutionMode::Cooperative,
            Task::CleanupExpiredTokens
            | Task::RefreshInventoryCache
            | Task::GenerateDailyReports
            | Task::LogSystemMetrics => ExecutionMode::Blocking,
        }
    }
}

/// Executes tasks popped off the queue.
///
/// The queue calls exactly one of the two methods per task, chosen by the
/// task's [`ExecutionMode`]: `run` on the cooperative loop, `run_blocking`
/// inside the worker pool.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    /// Execute a cooperative task on the runtime.
    async fn run(&self, task: Task) -> Result<(), TaskError>;

    /// Execute a blocking task on a worker thread.
    fn run_blocking(&self, task: Task) -> Result<(), TaskError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable() {
        let task = Task::SendRentalConfirmation { rental_order_id: 7 };
        assert_eq!(task.name(), "send_rental_confirmation");
        assert_eq!(Task::GenerateDailyReports.name(), "generate_daily_reports");
    }

    #[test]
    fn email_variants_are_cooperative() {
        let task = Task::SendEmail {
            to: "a@example.com".to_string(),
            subject: "hi".to_string(),
            body: "".to_string(),
        };
        assert_eq!(task.execution_mode(), ExecutionMode::Cooperative);
        assert_eq!(
            Task::SendPaymentConfirmation {
                payment_intent_id: "pi_123".to_string(),
                to: "a@example.com".to_string(),
            }
            .execution_mode(),
            ExecutionMode::Cooperative
        );
    }

    #[test]
    fn store_variants_are_blocking() {
        assert_eq!(
            Task::CleanupExpiredTokens.execution_mode(),
            ExecutionMode::Blocking
        );
        assert_eq!(
            Task::RefreshInventoryCache.execution_mode(),
            ExecutionMode::Blocking
        );
    }

    #[test]
    fn task_serde_roundtrip() {
        let task = Task::SendRentalConfirmation {
            rental_order_id: 42,
        };
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("send_rental_confirmation"));
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(task, back);
    }
}
