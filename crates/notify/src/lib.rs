//! Email delivery for the background task worker.
//!
//! This crate provides:
//! - `Mailer` trait for pluggable delivery backends
//! - SMTP implementation via `lettre` and a log-only development fallback
//! - Minijinja template rendering for confirmation and receipt bodies

pub mod email;
pub mod mock;
pub mod templating;
pub mod traits;

pub use email::SmtpMailer;
pub use mock::LogMailer;
pub use traits::{EmailMessage, Mailer, NotifyError};
