use std::{sync::Arc, time::Duration};

use chrono::Utc;
use chrono_tz::Tz;
use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

use crate::{infrastructure::shutdown::ShutdownListener, notify::AlertSink};

/// Liveness side-channel: a periodic message through the alert sink so an
/// operator can tell "no interesting postings" from "the process died".
/// The interval is a floor; a delayed tick never causes a burst.
pub fn spawn_heartbeat(
    sink: Arc<dyn AlertSink>,
    period: Duration,
    timezone: Tz,
    mut shutdown: ShutdownListener,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period.max(Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the startup message already
        // covers that moment.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let local = Utc::now().with_timezone(&timezone);
                    let text = format!(
                        "🛰 Job sniper alive — {}",
                        local.format("%Y-%m-%d %H:%M:%S %Z")
                    );
                    if !sink.send_text(&text).await {
                        tracing::warn!(target: "heartbeat", "heartbeat delivery failed");
                    }
                }
                _ = shutdown.notified() => break,
            }
        }
        tracing::info!(target: "heartbeat", "heartbeat stopped");
    })
}
