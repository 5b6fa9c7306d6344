pub mod error;
pub mod queue;
pub mod scheduler;
pub mod task;

pub use error::TaskError;
pub use queue::{QueueConfig, TaskQueue};
pub use scheduler::PeriodicScheduler;
pub use task::{ExecutionMode, Task, TaskHandler};
