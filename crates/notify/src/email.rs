//! SMTP mailer via `lettre` with TLS support.
//!
//! Delivers task emails through an SMTP server. Supports STARTTLS and
//! implicit TLS connections; credentials come from the SMTP config.

use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use rently_core::config::SmtpConfig;

use crate::traits::{EmailMessage, Mailer, NotifyError};

/// Sends emails via SMTP.
#[derive(Debug)]
pub struct SmtpMailer {
    /// Async SMTP transport for sending emails.
    transport: AsyncSmtpTransport<Tokio1Executor>,
    /// Sender mailbox.
    from: Mailbox,
}

impl SmtpMailer {
    /// Build an `SmtpMailer` from SMTP configuration.
    ///
    /// The config must carry a host; callers are expected to fall back to
    /// [`LogMailer`](crate::mock::LogMailer) when it does not. Port 465
    /// uses implicit TLS; other ports use STARTTLS unless TLS is disabled.
    pub fn from_config(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let host = config
            .host
            .as_deref()
            .ok_or_else(|| NotifyError::Config("SMTP host not configured".to_string()))?;

        let from: Mailbox = config
            .from_mailbox()
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Config(e.to_string()))?;

        let mut builder = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| NotifyError::Config(e.to_string()))?
                .port(config.port)
        } else if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| NotifyError::Config(e.to_string()))?
                .port(config.port)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(config.port)
        };

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    /// Send a message to its recipient.
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Config(e.to_string()))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject);

        let email = match &message.html_body {
            Some(html) => builder
                .multipart(MultiPart::alternative_plain_html(
                    message.text_body.clone(),
                    html.clone(),
                ))
                .map_err(|e| NotifyError::Smtp(e.to_string()))?,
            None => builder
                .body(message.text_body.clone())
                .map_err(|e| NotifyError::Smtp(e.to_string()))?,
        };

        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        tracing::info!(
            channel = "smtp",
            to = %message.to,
            subject = %message.subject,
            "email delivered"
        );

        Ok(())
    }

    /// Returns `"smtp"`.
    fn channel_name(&self) -> &str {
        "smtp"
    }
}
