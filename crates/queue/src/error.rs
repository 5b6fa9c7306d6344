//! Task execution error types.

use thiserror::Error;

/// Errors raised by task handlers.
///
/// These never reach the code that enqueued the task; the drain loop catches
/// them, logs them with the task name, and moves on to the next task.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("email delivery failed: {0}")]
    Email(String),

    #[error("template rendering failed: {0}")]
    Template(String),

    #[error("store operation failed: {0}")]
    Store(String),

    #[error("rental order not found: {0}")]
    UnknownOrder(i64),

    #[error("dispatch error: {0}")]
    Dispatch(String),
}
