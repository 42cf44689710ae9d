use std::{sync::Arc, time::Duration};

use anyhow::Result;
use chrono::Utc;
use chrono_tz::Tz;
use reqwest::Client;
use teloxide::Bot;
use tokio::time::timeout;

use crate::{
    config::AppConfig,
    db::SeenStore,
    infrastructure::{directories::ResolvedPaths, shutdown::Shutdown},
    notify::{AlertSink, TelegramNotifier},
    sources::{FeedAdapter, ListingAdapter, SourceAdapter, Throttle},
    tasks::{heartbeat::spawn_heartbeat, BucketScanner, CycleRunner},
};

// Boards serve RSS to anything; the listing endpoint is pickier, and a plain
// browser UA keeps it answering.
const USER_AGENT: &str = "Mozilla/5.0";

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

pub struct JobSniperApp {
    _paths: ResolvedPaths,
    config: Arc<AppConfig>,
    store: Arc<SeenStore>,
    sink: Arc<dyn AlertSink>,
    runner: CycleRunner,
    shutdown: Shutdown,
}

impl JobSniperApp {
    pub async fn initialize(
        config: AppConfig,
        paths: ResolvedPaths,
        shutdown: Shutdown,
    ) -> Result<Self> {
        let config = Arc::new(config);

        let store = Arc::new(SeenStore::open(&paths.db_path).await);
        // Retention pruning runs once per start; the per-candidate lookup
        // path never pays for it.
        store.prune(config.dedupe.retention, Utc::now()).await;

        let http_client = Client::builder().user_agent(USER_AGENT).build()?;

        let throttle = Arc::new(Throttle::new(config.sources.scrape_delay));
        let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();
        for feed in &config.sources.feeds {
            adapters.push(Arc::new(FeedAdapter::new(
                http_client.clone(),
                feed.clone(),
                config.sources.feed_max_entries,
                config.sources.fetch_timeout,
            )));
        }
        adapters.push(Arc::new(ListingAdapter::new(
            http_client,
            config.sources.listing.clone(),
            config.sources.listing_max_cards,
            config.sources.fetch_timeout,
            throttle,
        )?));

        let bot = Bot::new(&config.telegram.bot_token);
        let sink: Arc<dyn AlertSink> =
            Arc::new(TelegramNotifier::new(bot, config.telegram.chat_id));

        let scanner = BucketScanner::new(
            adapters,
            sink.clone(),
            store.clone(),
            config.sources.fetch_concurrency,
        );
        let runner = CycleRunner::new(
            scanner,
            config.buckets.clone(),
            store.clone(),
            config.scheduler.cycle_interval,
        );

        Ok(Self {
            _paths: paths,
            config,
            store,
            sink,
            runner,
            shutdown,
        })
    }

    pub async fn run(self) -> Result<()> {
        let JobSniperApp {
            _paths: _,
            config,
            store,
            sink,
            runner,
            shutdown,
        } = self;

        tracing::info!(
            target: "lifecycle",
            buckets = config.buckets.len(),
            cycle_interval = ?config.scheduler.cycle_interval,
            "job sniper starting"
        );
        if !sink.send_text("🚀 Job Sniper LIVE").await {
            tracing::warn!(target: "lifecycle", "startup message delivery failed");
        }

        let tz: Tz = config
            .timezone
            .parse()
            .unwrap_or(chrono_tz::Europe::London);
        let mut heartbeat_handle = spawn_heartbeat(
            sink.clone(),
            config.scheduler.heartbeat_interval,
            tz,
            shutdown.listener(),
        );
        let mut cycle_handle = runner.spawn(shutdown.listener());

        let mut shutdown_listener = shutdown.listener();
        tokio::select! {
            _ = shutdown_listener.notified() => {
                tracing::info!(target: "lifecycle", "shutdown signal received");
            }
            res = &mut cycle_handle => {
                if let Err(err) = res {
                    tracing::error!(target: "lifecycle", error = %err, "cycle runner died");
                }
            }
        }

        shutdown.trigger();

        // The runner finishes its in-flight cycle and final flush before it
        // returns; give it a bounded grace window.
        if !cycle_handle.is_finished() {
            match timeout(SHUTDOWN_GRACE, &mut cycle_handle).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::error!(target: "lifecycle", error = %err, "cycle runner failed during shutdown");
                }
                Err(_) => {
                    tracing::warn!(
                        target: "lifecycle",
                        "cycle runner did not stop within {:?}; aborting it",
                        SHUTDOWN_GRACE
                    );
                    cycle_handle.abort();
                    // The cycle may have marked alerts it never flushed.
                    store.flush().await;
                }
            }
        }

        if timeout(Duration::from_secs(5), &mut heartbeat_handle).await.is_err() {
            tracing::warn!(target: "heartbeat", "heartbeat did not stop in time; aborting it");
            heartbeat_handle.abort();
        }

        store.close().await;
        sink.send_text("🛑 Job Sniper stopped").await;
        tracing::info!(target: "lifecycle", "job sniper stopped");
        Ok(())
    }
}
