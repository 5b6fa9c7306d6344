//! Mailer trait definition and shared error types.

/// Errors that can occur during email delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A composed email ready for delivery.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: String,
    pub subject: String,
    /// Plain-text body.
    pub text_body: String,
    /// Optional HTML alternative.
    pub html_body: Option<String>,
}

/// Trait for email delivery backends.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a message through this backend.
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;

    /// Human-readable name for this backend (e.g., "smtp", "log").
    fn channel_name(&self) -> &str;
}
