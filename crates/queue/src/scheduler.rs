//! Interval-based periodic job scheduling.
//!
//! Each registered job pairs a [`Task`] template with an interval in
//! minutes. The tick loop checks elapsed time against each job in
//! registration order and enqueues the due ones onto the [`TaskQueue`];
//! actual execution ordering and failure isolation are the queue's job.
//!
//! Registration is not idempotent: registering the same task twice creates
//! two independent jobs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::queue::TaskQueue;
use crate::task::Task;

/// Scheduling state for one periodic job.
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    /// Task template cloned onto the queue each time the job is due.
    pub task: Task,
    /// Minimum elapsed time between runs.
    pub interval: chrono::Duration,
    /// When the job was last enqueued.
    pub last_run: DateTime<Utc>,
}

/// Holds the registered periodic jobs and drives the due-check loop.
pub struct PeriodicScheduler {
    jobs: Mutex<Vec<ScheduledJob>>,
    queue: TaskQueue,
    tick: Duration,
    shutdown: Arc<AtomicBool>,
}

impl PeriodicScheduler {
    /// Create a scheduler feeding the given queue, checking due jobs every
    /// `tick`.
    pub fn new(queue: TaskQueue, tick: Duration) -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
            queue,
            tick,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register a periodic job.
    ///
    /// `last_run` starts one interval in the past so the job is due on the
    /// very first check. An interval of zero means "due on every check".
    pub fn schedule_periodic(&self, task: Task, interval_minutes: i64) {
        let interval = chrono::Duration::minutes(interval_minutes);
        info!(
            task = task.name(),
            interval_minutes, "registered periodic job"
        );
        self.jobs.lock().unwrap().push(ScheduledJob {
            task,
            interval,
            last_run: Utc::now() - interval,
        });
    }

    /// Check all jobs against the current time, enqueueing the due ones.
    pub fn run_due_jobs(&self) {
        self.run_due_jobs_at(Utc::now());
    }

    /// Check all jobs against a supplied instant.
    ///
    /// Jobs are checked in registration order; when several are due at
    /// once they are enqueued in that order. Split out from
    /// [`run_due_jobs`](Self::run_due_jobs) for deterministic tests.
    pub fn run_due_jobs_at(&self, now: DateTime<Utc>) {
        let mut jobs = self.jobs.lock().unwrap();
        for job in jobs.iter_mut() {
            if now.signed_duration_since(job.last_run) >= job.interval {
                debug!(task = job.task.name(), "periodic job due");
                self.queue.enqueue(job.task.clone());
                job.last_run = now;
            }
        }
    }

    /// Run the tick loop until [`shutdown`](Self::shutdown) is called.
    pub async fn run(&self) {
        info!(
            tick_secs = self.tick.as_secs(),
            jobs = self.job_count(),
            "periodic scheduler starting"
        );
        while !self.shutdown.load(Ordering::Relaxed) {
            self.run_due_jobs();
            tokio::time::sleep(self.tick).await;
        }
        info!("periodic scheduler stopped");
    }

    /// Signal the tick loop to stop after the current sleep.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Shutdown flag handle for external signaling.
    pub fn shutdown_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Number of registered jobs (duplicates counted).
    pub fn job_count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::queue::QueueConfig;
    use crate::task::TaskHandler;
    use async_trait::async_trait;

    struct RecordingHandler {
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl TaskHandler for RecordingHandler {
        async fn run(&self, task: Task) -> Result<(), TaskError> {
            self.log.lock().unwrap().push(task.name().to_string());
            Ok(())
        }

        fn run_blocking(&self, task: Task) -> Result<(), TaskError> {
            self.log.lock().unwrap().push(task.name().to_string());
            Ok(())
        }
    }

    fn scheduler_with_log() -> (PeriodicScheduler, TaskQueue, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let queue = TaskQueue::new(
            Arc::new(RecordingHandler { log: log.clone() }),
            QueueConfig::default(),
        );
        let scheduler = PeriodicScheduler::new(queue.clone(), Duration::from_secs(60));
        (scheduler, queue, log)
    }

    #[tokio::test]
    async fn job_is_due_immediately_after_registration() {
        let (scheduler, queue, log) = scheduler_with_log();
        scheduler.schedule_periodic(Task::CleanupExpiredTokens, 60);
        scheduler.run_due_jobs_at(Utc::now());
        queue.wait_idle().await;
        assert_eq!(*log.lock().unwrap(), vec!["cleanup_expired_tokens"]);
    }

    #[tokio::test]
    async fn second_check_within_interval_is_noop() {
        let (scheduler, queue, log) = scheduler_with_log();
        scheduler.schedule_periodic(Task::CleanupExpiredTokens, 60);
        let now = Utc::now();
        scheduler.run_due_jobs_at(now);
        queue.wait_idle().await;
        scheduler.run_due_jobs_at(now + chrono::Duration::minutes(30));
        queue.wait_idle().await;
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn job_runs_again_once_interval_elapses() {
        let (scheduler, queue, log) = scheduler_with_log();
        scheduler.schedule_periodic(Task::RefreshInventoryCache, 30);
        let now = Utc::now();
        scheduler.run_due_jobs_at(now);
        scheduler.run_due_jobs_at(now + chrono::Duration::minutes(30));
        queue.wait_idle().await;
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn zero_interval_is_always_due() {
        let (scheduler, queue, log) = scheduler_with_log();
        scheduler.schedule_periodic(Task::LogSystemMetrics, 0);
        let now = Utc::now();
        scheduler.run_due_jobs_at(now);
        scheduler.run_due_jobs_at(now);
        scheduler.run_due_jobs_at(now);
        queue.wait_idle().await;
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn duplicate_registration_creates_independent_jobs() {
        let (scheduler, queue, log) = scheduler_with_log();
        scheduler.schedule_periodic(Task::GenerateDailyReports, 1440);
        scheduler.schedule_periodic(Task::GenerateDailyReports, 1440);
        assert_eq!(scheduler.job_count(), 2);
        scheduler.run_due_jobs_at(Utc::now());
        queue.wait_idle().await;
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn due_jobs_enqueue_in_registration_order() {
        let (scheduler, queue, log) = scheduler_with_log();
        scheduler.schedule_periodic(Task::CleanupExpiredTokens, 0);
        scheduler.schedule_periodic(Task::RefreshInventoryCache, 0);
        scheduler.schedule_periodic(Task::LogSystemMetrics, 0);
        scheduler.run_due_jobs_at(Utc::now());
        queue.wait_idle().await;
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "cleanup_expired_tokens",
                "refresh_inventory_cache",
                "log_system_metrics"
            ]
        );
    }

    #[tokio::test]
    async fn shutdown_before_run_exits_immediately() {
        let (scheduler, _queue, log) = scheduler_with_log();
        scheduler.schedule_periodic(Task::CleanupExpiredTokens, 60);
        scheduler.shutdown();
        scheduler.run().await;
        assert!(log.lock().unwrap().is_empty());
    }
}
