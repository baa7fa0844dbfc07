use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};

use crate::booking::BookingService;

/// Periodic reconciliation: once an hour every user's local bookings are
/// checked against a fresh table snapshot and stale ones pruned, so ghost
/// bookings disappear even for users who never open the bot.
pub struct SweeperService {
    service: Arc<BookingService>,
    scheduler: JobScheduler,
}

impl SweeperService {
    pub async fn new(
        service: Arc<BookingService>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self { service, scheduler })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let service = self.service.clone();

        let sweep_job = Job::new_async("0 0 * * * *", move |_uuid, _l| {
            let service = service.clone();
            Box::pin(async move {
                sweep(service).await;
            })
        })?;

        self.scheduler.add(sweep_job).await?;
        self.scheduler.start().await?;

        tracing::info!("sweeper service started - reconciling bookings hourly");
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    // Manual trigger for testing
    pub async fn sweep_now(&self) {
        sweep(self.service.clone()).await;
    }
}

async fn sweep(service: Arc<BookingService>) {
    match service.reconcile_all_users().await {
        Ok(0) => tracing::debug!("sweep finished: nothing to prune"),
        Ok(pruned) => tracing::info!("sweep finished: pruned {pruned} stale bookings"),
        Err(e) => tracing::error!("sweep failed: {e:#}"),
    }
}
