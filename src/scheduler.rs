use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::services::RefreshService;

/// Drives the cache refresh sweep on a fixed interval or a cron expression.
/// The sweep itself lives in [`RefreshService`]; this only decides when it
/// runs. There is no shared mutable state with request handlers — the cache
/// store's atomic upsert is the only synchronization point.
pub struct Scheduler {
    refresh: Arc<RefreshService>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    pub fn new(refresh: Arc<RefreshService>, config: SchedulerConfig) -> Self {
        Self {
            refresh,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting background scheduler");

        if let Some(cron_expr) = &self.config.cron_expression {
            self.run_with_cron(cron_expr).await
        } else {
            self.run_with_interval().await
        }
    }

    async fn run_with_cron(&self, cron_expr: &str) -> Result<()> {
        let mut sched = JobScheduler::new().await?;

        let refresh = Arc::clone(&self.refresh);
        let running = Arc::clone(&self.running);

        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let refresh = Arc::clone(&refresh);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                if let Err(e) = refresh.sweep().await {
                    error!("Scheduled cache sweep failed: {}", e);
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Scheduler running with cron: {}", cron_expr);

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    async fn run_with_interval(&self) -> Result<()> {
        let interval_mins = self.config.sweep_interval_minutes;

        info!("Scheduler running every {} minutes", interval_mins);

        let mut sweep_interval = interval(Duration::from_secs(u64::from(interval_mins) * 60));
        // The first tick fires immediately; skip it so startup isn't a sweep.
        sweep_interval.tick().await;

        loop {
            sweep_interval.tick().await;

            if !*self.running.read().await {
                break;
            }

            info!("Running scheduled cache sweep...");
            if let Err(e) = self.refresh.sweep().await {
                error!("Scheduled cache sweep failed: {}", e);
            }
        }

        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping scheduler...");
        *self.running.write().await = false;
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }
}
