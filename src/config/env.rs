use std::time::Duration;

use thiserror::Error;

use crate::domain::Bucket;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub buckets: Vec<Bucket>,
    pub sources: SourcesConfig,
    pub scheduler: SchedulerConfig,
    pub dedupe: DedupeConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
    pub timezone: String,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: i64,
}

#[derive(Debug, Clone)]
pub struct SourcesConfig {
    pub feeds: Vec<FeedEndpoint>,
    pub listing: ListingEndpoint,
    pub fetch_timeout: Duration,
    pub feed_max_entries: usize,
    pub listing_max_cards: usize,
    pub scrape_delay: Duration,
    pub fetch_concurrency: usize,
}

/// A syndicated feed, `{query}` substituted with the encoded search term.
#[derive(Debug, Clone)]
pub struct FeedEndpoint {
    pub label: String,
    pub url_template: String,
}

/// A scraped listing page: URL template plus the markup selection rule.
#[derive(Debug, Clone)]
pub struct ListingEndpoint {
    pub label: String,
    pub url_template: String,
    pub card_selector: String,
    pub link_selector: String,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub cycle_interval: Duration,
    pub heartbeat_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct DedupeConfig {
    pub retention: chrono::Duration,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
    pub data_dir: String,
    pub db_filename: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
