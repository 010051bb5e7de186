/// Cron-scheduled expired-booking cleanup
///
/// Registers one async job on a `tokio-cron-scheduler` `JobScheduler`. Each
/// tick deletes every booking whose end date lies before the tick time.
/// Cron expressions are evaluated in UTC.
///
/// # Example
///
/// ```no_run
/// use carbooking_worker::scheduler::CleanupScheduler;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), carbooking_worker::scheduler::WorkerError> {
/// let mut scheduler = CleanupScheduler::start(pool, "0 0 2 * * *").await?;
/// // ... wait for a shutdown signal ...
/// scheduler.shutdown().await?;
/// # Ok(())
/// # }
/// ```

use carbooking_shared::cleanup::cleanup_expired_bookings;
use chrono::Utc;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error(transparent)]
    Scheduler(#[from] JobSchedulerError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Runs one cleanup pass at the current instant
///
/// Returns the number of deleted bookings.
pub async fn run_cleanup(pool: &PgPool) -> Result<u64, WorkerError> {
    let started = std::time::Instant::now();
    let deleted = cleanup_expired_bookings(pool, Utc::now()).await?;

    info!(deleted, "Cleanup pass took {:?}", started.elapsed());

    Ok(deleted)
}

/// Builds the cleanup job without registering it
///
/// Fails if `cron` is not a valid schedule.
pub fn cleanup_job(pool: PgPool, cron: &str) -> Result<Job, WorkerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pool = pool.clone();

        Box::pin(async move {
            if let Err(e) = run_cleanup(&pool).await {
                error!("Scheduled cleanup of expired bookings failed: {}", e);
            }
        })
    })?;

    Ok(job)
}

/// Running scheduler owning the cleanup job
pub struct CleanupScheduler {
    scheduler: JobScheduler,
}

impl CleanupScheduler {
    /// Registers the cleanup job and starts ticking
    pub async fn start(pool: PgPool, cron: &str) -> Result<Self, WorkerError> {
        let scheduler = JobScheduler::new().await?;
        scheduler.add(cleanup_job(pool, cron)?).await?;
        scheduler.start().await?;

        info!(cron, "Expired booking cleanup scheduled");

        Ok(Self { scheduler })
    }

    /// Stops the scheduler; a job already running is not interrupted
    pub async fn shutdown(&mut self) -> Result<(), WorkerError> {
        self.scheduler.shutdown().await?;
        info!("Cleanup scheduler stopped");
        Ok(())
    }
}
