//! Log-only mailer for development and unconfigured environments.
//!
//! Writes each message to the log stream instead of sending it, so the
//! worker can run out of the box without an SMTP server.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::traits::{EmailMessage, Mailer, NotifyError};

/// Mailer that logs messages instead of delivering them. Always succeeds.
#[derive(Debug, Default)]
pub struct LogMailer {
    sent: AtomicUsize,
}

impl LogMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages logged so far.
    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        self.sent.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            channel = "log",
            to = %message.to,
            subject = %message.subject,
            body = %message.text_body,
            "mock email (SMTP not configured)"
        );
        Ok(())
    }

    /// Returns `"log"`.
    fn channel_name(&self) -> &str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mailer = LogMailer::new();
        let message = EmailMessage {
            to: "customer@example.com".to_string(),
            subject: "Welcome".to_string(),
            text_body: "hello".to_string(),
            html_body: None,
        };
        assert!(mailer.send(&message).await.is_ok());
        assert!(mailer.send(&message).await.is_ok());
        assert_eq!(mailer.sent_count(), 2);
        assert_eq!(mailer.channel_name(), "log");
    }
}
