//! task-worker — drains the background task queue and runs periodic jobs.
//!
//! Periodic set registered at startup:
//! - expired-token cleanup, every 60 minutes
//! - inventory cache refresh, every 30 minutes
//! - daily report generation, every 1440 minutes
//! - system metrics snapshot, every 15 minutes

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use rently_core::config::{load_dotenv, Config};
use rently_notify::{LogMailer, Mailer, SmtpMailer};
use rently_queue::{PeriodicScheduler, QueueConfig, Task, TaskQueue};
use rently_tasks::{Dispatcher, MemoryStore};

// ── CLI ─────────────────────────────────────────────────────────────

/// Background worker for the rental backend's deferred tasks.
#[derive(Parser, Debug)]
#[command(name = "task-worker", version, about)]
struct Cli {
    /// Seconds between periodic-job due checks.
    #[arg(long, env = "SCHEDULER_TICK_SECS", default_value_t = 60)]
    tick_secs: u64,

    /// Worker threads reserved for blocking tasks.
    #[arg(long, env = "BLOCKING_WORKERS", default_value_t = 4)]
    workers: usize,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    load_dotenv();
    let config = Config::from_env();
    config.log_summary();

    let mailer: Arc<dyn Mailer> = if config.smtp.is_configured() {
        match SmtpMailer::from_config(&config.smtp) {
            Ok(mailer) => Arc::new(mailer),
            Err(e) => {
                tracing::warn!(error = %e, "SMTP setup failed, logging emails instead");
                Arc::new(LogMailer::new())
            }
        }
    } else {
        info!("SMTP not configured, logging emails instead");
        Arc::new(LogMailer::new())
    };

    let store = Arc::new(MemoryStore::new());
    let dispatcher = Dispatcher::new(
        mailer,
        store.clone(),
        store.clone(),
        config.app_name.clone(),
    );

    let queue = TaskQueue::new(
        Arc::new(dispatcher),
        QueueConfig {
            blocking_workers: cli.workers,
            high_water: config.queue.high_water,
        },
    );

    let scheduler = PeriodicScheduler::new(queue.clone(), Duration::from_secs(cli.tick_secs));
    scheduler.schedule_periodic(Task::CleanupExpiredTokens, 60);
    scheduler.schedule_periodic(Task::RefreshInventoryCache, 30);
    scheduler.schedule_periodic(Task::GenerateDailyReports, 1440);
    scheduler.schedule_periodic(Task::LogSystemMetrics, 15);

    info!("task-worker starting");
    tokio::select! {
        _ = scheduler.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("ctrl-c received, shutting down");
            scheduler.shutdown();
        }
    }

    // Let the current drain finish; anything enqueued after this point is
    // abandoned with the process (the queue is not durable).
    queue.wait_idle().await;
    info!(abandoned = queue.pending_len(), "task-worker exited");

    Ok(())
}
