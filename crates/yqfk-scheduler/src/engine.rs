//! Scheduler engine — two triggers, one job.
//!
//! The startup run and the daily cron run both go through
//! [`Scheduler::fire`]. Only one run is ever in flight: a trigger that
//! arrives while a run is going is logged and dropped.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use tokio::sync::{Mutex, watch};

use crate::cron::CronSchedule;

/// Why a run was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Immediately at process start.
    Startup,
    /// The recurring daily slot.
    Daily,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Startup => write!(f, "startup"),
            Trigger::Daily => write!(f, "daily"),
        }
    }
}

/// Runs `job` for each trigger, skipping triggers that overlap a run.
pub struct Scheduler<F> {
    job: F,
    running: Mutex<()>,
}

impl<F, Fut> Scheduler<F>
where
    F: Fn(Trigger) -> Fut + Send + Sync + 'static,
    Fut: Future + Send,
{
    pub fn new(job: F) -> Self {
        Self {
            job,
            running: Mutex::new(()),
        }
    }

    /// Run the job now. Returns `None` if another run holds the slot.
    pub async fn fire(&self, trigger: Trigger) -> Option<Fut::Output> {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::warn!("⏭️ {trigger} trigger skipped: previous run still in progress");
            return None;
        };
        tracing::info!("🔔 {trigger} run started");
        Some((self.job)(trigger).await)
    }

    /// Wait until no run is in progress.
    pub async fn wait_idle(&self) {
        drop(self.running.lock().await);
    }
}

/// Daily trigger loop. Sleeps until the next cron slot in `tz`, fires, and
/// repeats until `shutdown` flips to `true`.
///
/// Shutdown is only observed while sleeping; a run that has started is
/// always allowed to finish.
pub async fn run_daily<F, Fut>(
    scheduler: Arc<Scheduler<F>>,
    schedule: CronSchedule,
    tz: Tz,
    mut shutdown: watch::Receiver<bool>,
) where
    F: Fn(Trigger) -> Fut + Send + Sync + 'static,
    Fut: Future + Send,
{
    tracing::info!(
        "⏰ Daily run scheduled: '{}' ({})",
        schedule.expression(),
        tz.name()
    );

    loop {
        let now = Utc::now();
        let Some(next) = schedule.next_after(now, tz) else {
            tracing::error!(
                "No upcoming slot for '{}', daily trigger stopped",
                schedule.expression()
            );
            return;
        };
        tracing::info!(
            "Next run at {}",
            next.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S")
        );

        let wait = (next - now).to_std().unwrap_or_default();
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = shutdown.changed() => {
                tracing::debug!("Daily trigger stopped");
                return;
            }
        }
        if *shutdown.borrow() {
            return;
        }

        scheduler.fire(Trigger::Daily).await;
    }
}
