use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{task::JoinHandle, time::sleep};

use crate::{
    db::SeenStore,
    domain::Bucket,
    infrastructure::shutdown::ShutdownListener,
    tasks::scanner::BucketScanner,
};

/// Drives the steady state: scan every bucket in fixed order, flush the seen
/// store once, sleep, repeat. Source and delivery failures are absorbed
/// inside the scanner as counters, so nothing a cycle does can end the loop;
/// only the shutdown signal can.
pub struct CycleRunner {
    scanner: BucketScanner,
    buckets: Vec<Bucket>,
    store: Arc<SeenStore>,
    cycle_interval: Duration,
}

impl CycleRunner {
    pub fn new(
        scanner: BucketScanner,
        buckets: Vec<Bucket>,
        store: Arc<SeenStore>,
        cycle_interval: Duration,
    ) -> Self {
        Self {
            scanner,
            buckets,
            store,
            cycle_interval,
        }
    }

    pub fn spawn(self, mut shutdown: ShutdownListener) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run_loop(&mut shutdown).await;
        })
    }

    async fn run_loop(&self, shutdown: &mut ShutdownListener) {
        loop {
            if shutdown.is_triggered() {
                break;
            }

            for bucket in &self.buckets {
                if shutdown.is_triggered() {
                    break;
                }
                // One reference clock per scan; every age in the scan is
                // measured against it.
                let now = Utc::now();
                let outcome = self.scanner.scan(bucket, now).await;
                tracing::info!(
                    target: "cycle",
                    bucket = %bucket.name,
                    sent = outcome.sent,
                    stale = outcome.stale,
                    low_score = outcome.low_score,
                    duplicate = outcome.duplicate,
                    delivery_failures = outcome.delivery_failures,
                    fetch_failures = outcome.fetch_failures,
                    "bucket scan finished"
                );
            }

            // Batched once per cycle; per-candidate writes would put sqlite
            // on the hot path for no benefit.
            self.store.flush().await;
            tracing::info!(target: "cycle", seen = self.store.len(), "cycle complete");

            tokio::select! {
                _ = sleep(self.cycle_interval) => {}
                _ = shutdown.notified() => break,
            }
        }

        // Alerts dispatched in an interrupted cycle must still reach the
        // store file, or the next start re-sends them.
        self.store.flush().await;
        tracing::info!(target: "cycle", "cycle runner stopped");
    }
}
