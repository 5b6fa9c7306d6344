use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

/// Application settings resolved from environment variables.
///
/// Defaults are development-friendly so the worker can run out of the box
/// (emails fall back to the log mailer when SMTP is unconfigured).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app_name: String,
    pub smtp: SmtpConfig,
    pub queue: QueueLimits,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            app_name: env_or("APP_NAME", "Rently Backend"),
            smtp: SmtpConfig::from_env(),
            queue: QueueLimits::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  app:    name={}", self.app_name);
        tracing::info!(
            "  smtp:   host={}, port={}, from={}",
            self.smtp.host.as_deref().unwrap_or("(unset, logging mail)"),
            self.smtp.port,
            self.smtp.from_addr,
        );
        tracing::info!("  queue:  high_water={}", self.queue.high_water);
    }
}

// ── SMTP ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP server hostname. When unset, email delivery is logged instead.
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// STARTTLS on the connection. Port 465 uses implicit TLS regardless.
    pub use_tls: bool,
    pub from_name: String,
    pub from_addr: String,
}

impl SmtpConfig {
    fn from_env() -> Self {
        Self {
            host: env_opt("SMTP_HOST"),
            port: env_u16("SMTP_PORT", 587),
            username: env_opt("SMTP_USERNAME"),
            password: env_opt("SMTP_PASSWORD"),
            use_tls: env_or("SMTP_TLS", "true") == "true",
            from_name: env_or("EMAIL_FROM_NAME", "Rently Rentals"),
            from_addr: env_or("EMAIL_FROM", "noreply@rently.dev"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.host.is_some()
    }

    /// Sender in `Name <addr>` form for message headers.
    pub fn from_mailbox(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_addr)
    }
}

// ── Queue limits ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueLimits {
    /// Pending-task depth above which enqueue logs a warning. The queue
    /// itself stays unbounded; this is an observability threshold only.
    pub high_water: usize,
}

impl QueueLimits {
    fn from_env() -> Self {
        Self {
            high_water: env_usize("QUEUE_HIGH_WATER", 10_000),
        }
    }
}

impl Default for QueueLimits {
    fn default() -> Self {
        Self { high_water: 10_000 }
    }
}
