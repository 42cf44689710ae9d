use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Minimum spacing between requests to a source family that blocks eager
/// clients. Callers serialize on the internal lock, so the spacing holds
/// even when scans run concurrently.
pub struct Throttle {
    min_delay: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_call: Mutex::new(None),
        }
    }

    /// Waits until at least `min_delay` has passed since the previous call
    /// returned from this method. The first call never waits.
    pub async fn acquire(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                sleep(self.min_delay - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}
