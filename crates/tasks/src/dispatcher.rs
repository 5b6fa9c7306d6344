//! Routes task variants to their collaborators.
//!
//! One typed handler covers the whole task surface: email variants go to
//! the mailer (with template rendering where needed), maintenance and
//! report variants go to the store. The queue decides which of the two
//! entry points to call from each task's execution mode; a variant
//! arriving at the wrong entry point is a dispatch error.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use rently_notify::templating::{ConfirmationContext, ReceiptContext, TemplateRenderer};
use rently_notify::{EmailMessage, Mailer, NotifyError};
use rently_queue::{Task, TaskError, TaskHandler};

use crate::store::{MetricsSource, RentalStore, StoreError};

/// Retention window for password-reset tokens.
const TOKEN_MAX_AGE_HOURS: i64 = 24;

/// Number of products in the daily popularity ranking.
const REPORT_TOP_PRODUCTS: usize = 10;

/// The worker's [`TaskHandler`]: one match arm per task variant.
pub struct Dispatcher {
    mailer: Arc<dyn Mailer>,
    store: Arc<dyn RentalStore>,
    metrics: Arc<dyn MetricsSource>,
    renderer: TemplateRenderer,
    app_name: String,
}

impl Dispatcher {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        store: Arc<dyn RentalStore>,
        metrics: Arc<dyn MetricsSource>,
        app_name: String,
    ) -> Self {
        Self {
            mailer,
            store,
            metrics,
            renderer: TemplateRenderer::new(),
            app_name,
        }
    }
}

fn notify_error(e: NotifyError) -> TaskError {
    match e {
        NotifyError::Template(msg) => TaskError::Template(msg),
        other => TaskError::Email(other.to_string()),
    }
}

fn store_error(e: StoreError) -> TaskError {
    TaskError::Store(e.to_string())
}

#[async_trait]
impl TaskHandler for Dispatcher {
    async fn run(&self, task: Task) -> Result<(), TaskError> {
        match task {
            Task::SendEmail { to, subject, body } => {
                self.mailer
                    .send(&EmailMessage {
                        to,
                        subject,
                        text_body: body,
                        html_body: None,
                    })
                    .await
                    .map_err(notify_error)
            }
            Task::SendRentalConfirmation { rental_order_id } => {
                let summary = self
                    .store
                    .rental_summary(rental_order_id)
                    .map_err(store_error)?
                    .ok_or(TaskError::UnknownOrder(rental_order_id))?;
                let body = self
                    .renderer
                    .rental_confirmation(&ConfirmationContext::from_summary(&summary))
                    .map_err(notify_error)?;
                let message = EmailMessage {
                    to: summary.customer_email.clone(),
                    subject: format!("Rental Confirmation - Order #{}", summary.rental_order_id),
                    text_body: body,
                    html_body: None,
                };
                self.mailer.send(&message).await.map_err(notify_error)?;
                info!(rental_order_id, to = %message.to, "rental confirmation sent");
                Ok(())
            }
            Task::SendPaymentConfirmation {
                payment_intent_id,
                to,
            } => {
                let body = self
                    .renderer
                    .payment_receipt(&ReceiptContext {
                        payment_intent_id: payment_intent_id.clone(),
                        app_name: self.app_name.clone(),
                    })
                    .map_err(notify_error)?;
                self.mailer
                    .send(&EmailMessage {
                        to,
                        subject: "Payment Received - Thank You".to_string(),
                        text_body: body,
                        html_body: None,
                    })
                    .await
                    .map_err(notify_error)?;
                info!(payment_intent_id = %payment_intent_id, "payment receipt sent");
                Ok(())
            }
            other => Err(TaskError::Dispatch(format!(
                "{} requires a worker thread",
                other.name()
            ))),
        }
    }

    fn run_blocking(&self, task: Task) -> Result<(), TaskError> {
        match task {
            Task::CleanupExpiredTokens => {
                let cutoff = Utc::now() - chrono::Duration::hours(TOKEN_MAX_AGE_HOURS);
                let purged = self
                    .store
                    .purge_expired_reset_tokens(cutoff)
                    .map_err(store_error)?;
                info!(purged, "expired reset tokens removed");
                Ok(())
            }
            Task::RefreshInventoryCache => {
                let touched = self.store.refresh_inventory_counts().map_err(store_error)?;
                info!(touched, "inventory availability cache refreshed");
                Ok(())
            }
            Task::GenerateDailyReports => {
                let revenue = self.store.revenue_summary().map_err(store_error)?;
                let top = self
                    .store
                    .popular_products(REPORT_TOP_PRODUCTS)
                    .map_err(store_error)?;
                info!(
                    total_revenue = revenue.total_revenue,
                    total_orders = revenue.total_orders,
                    avg_order_value = revenue.avg_order_value,
                    ranked_products = top.len(),
                    "daily report generated"
                );
                Ok(())
            }
            Task::LogSystemMetrics => {
                let snapshot = self.metrics.snapshot();
                info!(
                    active_rentals = snapshot.active_rentals,
                    pending_reset_tokens = snapshot.pending_reset_tokens,
                    tokens_purged_total = snapshot.tokens_purged_total,
                    inventory_refreshes_total = snapshot.inventory_refreshes_total,
                    "system metrics"
                );
                Ok(())
            }
            other => Err(TaskError::Dispatch(format!(
                "{} must run on the cooperative loop",
                other.name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use rently_core::rental::RentalSummary;
    use std::sync::Mutex;

    /// Mailer that records every message instead of sending.
    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }

        fn channel_name(&self) -> &str {
            "recording"
        }
    }

    fn dispatcher_with(
        store: Arc<MemoryStore>,
    ) -> (Dispatcher, Arc<RecordingMailer>) {
        let mailer = Arc::new(RecordingMailer::default());
        let dispatcher = Dispatcher::new(
            mailer.clone(),
            store.clone(),
            store,
            "Rently Backend".to_string(),
        );
        (dispatcher, mailer)
    }

    fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.insert_rental(RentalSummary {
            rental_order_id: 42,
            customer_name: "Alice Tan".to_string(),
            customer_email: "alice@example.com".to_string(),
            start_ts: Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap(),
            end_ts: Utc.with_ymd_and_hms(2026, 8, 3, 18, 30, 0).unwrap(),
            total_amount: 149.5,
            status: "confirmed".to_string(),
        });
        store
    }

    #[tokio::test]
    async fn rental_confirmation_renders_and_sends() {
        let (dispatcher, mailer) = dispatcher_with(seeded_store());

        dispatcher
            .run(Task::SendRentalConfirmation {
                rental_order_id: 42,
            })
            .await
            .unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "alice@example.com");
        assert_eq!(sent[0].subject, "Rental Confirmation - Order #42");
        assert!(sent[0].text_body.contains("Dear Alice Tan,"));
        assert!(sent[0].text_body.contains("$149.50"));
    }

    #[tokio::test]
    async fn unknown_order_is_an_error() {
        let (dispatcher, mailer) = dispatcher_with(seeded_store());

        let result = dispatcher
            .run(Task::SendRentalConfirmation {
                rental_order_id: 999,
            })
            .await;

        assert!(matches!(result, Err(TaskError::UnknownOrder(999))));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_email_passes_through_unchanged() {
        let (dispatcher, mailer) = dispatcher_with(seeded_store());

        dispatcher
            .run(Task::SendEmail {
                to: "ops@example.com".to_string(),
                subject: "Low stock".to_string(),
                body: "Only 2 units left".to_string(),
            })
            .await
            .unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent[0].subject, "Low stock");
        assert_eq!(sent[0].text_body, "Only 2 units left");
    }

    #[tokio::test]
    async fn payment_receipt_includes_reference() {
        let (dispatcher, mailer) = dispatcher_with(seeded_store());

        dispatcher
            .run(Task::SendPaymentConfirmation {
                payment_intent_id: "pi_3Abc".to_string(),
                to: "alice@example.com".to_string(),
            })
            .await
            .unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert!(sent[0].text_body.contains("pi_3Abc"));
        assert!(sent[0].text_body.contains("Rently Backend"));
    }

    #[test]
    fn cleanup_purges_only_expired_tokens() {
        let store = seeded_store();
        store.insert_reset_token("stale", Utc::now() - Duration::hours(48));
        store.insert_reset_token("fresh", Utc::now() - Duration::hours(1));
        let (dispatcher, _mailer) = dispatcher_with(store.clone());

        dispatcher.run_blocking(Task::CleanupExpiredTokens).unwrap();

        assert_eq!(store.token_count(), 1);
    }

    #[test]
    fn reports_and_metrics_read_the_store() {
        let store = seeded_store();
        let (dispatcher, _mailer) = dispatcher_with(store.clone());

        dispatcher.run_blocking(Task::GenerateDailyReports).unwrap();
        dispatcher.run_blocking(Task::RefreshInventoryCache).unwrap();
        dispatcher.run_blocking(Task::LogSystemMetrics).unwrap();

        assert_eq!(store.snapshot().inventory_refreshes_total, 1);
    }

    #[tokio::test]
    async fn blocking_variant_rejected_on_cooperative_path() {
        let (dispatcher, _mailer) = dispatcher_with(seeded_store());
        let result = dispatcher.run(Task::CleanupExpiredTokens).await;
        assert!(matches!(result, Err(TaskError::Dispatch(_))));
    }

    #[test]
    fn cooperative_variant_rejected_on_worker_path() {
        let (dispatcher, _mailer) = dispatcher_with(seeded_store());
        let result = dispatcher.run_blocking(Task::SendEmail {
            to: "a@example.com".to_string(),
            subject: "x".to_string(),
            body: String::new(),
        });
        assert!(matches!(result, Err(TaskError::Dispatch(_))));
    }
}
