use std::{env, time::Duration};

use crate::domain::Bucket;

use super::env::{
    AppConfig, ConfigError, DedupeConfig, DirectoryConfig, FeedEndpoint, ListingEndpoint,
    LoggingConfig, SchedulerConfig, SourcesConfig, TelegramConfig,
};

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let bot_token =
            env::var("JOBBOT_TOKEN").map_err(|_| ConfigError::Missing("JOBBOT_TOKEN"))?;
        let chat_id_raw =
            env::var("JOBBOT_CHAT_ID").map_err(|_| ConfigError::Missing("JOBBOT_CHAT_ID"))?;
        let chat_id = chat_id_raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::Invalid {
                key: "JOBBOT_CHAT_ID",
                reason: format!("not a chat id: {chat_id_raw:?}"),
            })?;

        let buckets = match env::var("BUCKETS_JSON") {
            Ok(raw) if !raw.trim().is_empty() => parse_buckets(&raw)?,
            _ => default_buckets(),
        };

        let feeds = env::var("FEED_SOURCES")
            .ok()
            .map(|raw| parse_feed_sources(&raw))
            .filter(|feeds| !feeds.is_empty())
            .unwrap_or_else(default_feeds);

        let listing = ListingEndpoint {
            label: env::var("LISTING_LABEL").unwrap_or_else(|_| "LinkedIn".to_string()),
            url_template: env::var("LISTING_URL_TEMPLATE").unwrap_or_else(|_| {
                // Guest search endpoint, pre-filtered to UK remote/hybrid
                // postings.
                "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search/\
                 ?keywords={query}&location=United%20Kingdom&f_WT=2%2C3&start=0"
                    .to_string()
            }),
            card_selector: env::var("LISTING_CARD_SELECTOR").unwrap_or_else(|_| "li".to_string()),
            link_selector: env::var("LISTING_LINK_SELECTOR")
                .unwrap_or_else(|_| "a.base-card__full-link".to_string()),
        };

        let sources = SourcesConfig {
            feeds,
            listing,
            fetch_timeout: Duration::from_secs(parse_env("FETCH_TIMEOUT_SECS", 20)),
            feed_max_entries: parse_env("FEED_MAX_ENTRIES", 15),
            listing_max_cards: parse_env("LISTING_MAX_CARDS", 20),
            scrape_delay: Duration::from_millis(parse_env("SCRAPE_DELAY_MS", 1_500)),
            fetch_concurrency: parse_env("FETCH_CONCURRENCY", 4),
        };

        let scheduler = SchedulerConfig {
            cycle_interval: Duration::from_secs(parse_env("CHECK_INTERVAL", 60)),
            heartbeat_interval: Duration::from_secs(parse_env("HEARTBEAT_MINUTES", 360) * 60),
        };

        let dedupe = DedupeConfig {
            retention: chrono::Duration::days(parse_env("RETENTION_DAYS", 14)),
        };

        let directories = DirectoryConfig {
            logs_dir: env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string()),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            db_filename: env::var("DB_FILENAME").unwrap_or_else(|_| "seen.db".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        let timezone = env::var("BOT_TIMEZONE").unwrap_or_else(|_| "Europe/London".to_string());

        Ok(Self {
            telegram: TelegramConfig { bot_token, chat_id },
            buckets,
            sources,
            scheduler,
            dedupe,
            directories,
            logging,
            timezone,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_buckets(raw: &str) -> Result<Vec<Bucket>, ConfigError> {
    serde_json::from_str::<Vec<Bucket>>(raw).map_err(|err| ConfigError::Invalid {
        key: "BUCKETS_JSON",
        reason: err.to_string(),
    })
}

/// `FEED_SOURCES` format: `Label|template;Label|template`. Malformed parts
/// are skipped.
fn parse_feed_sources(raw: &str) -> Vec<FeedEndpoint> {
    raw.split(';')
        .filter_map(|part| {
            let (label, template) = part.trim().split_once('|')?;
            if label.is_empty() || !template.contains("{query}") {
                return None;
            }
            Some(FeedEndpoint {
                label: label.trim().to_string(),
                url_template: template.trim().to_string(),
            })
        })
        .collect()
}

fn default_feeds() -> Vec<FeedEndpoint> {
    vec![
        FeedEndpoint {
            label: "Indeed RSS".to_string(),
            url_template: "https://www.indeed.co.uk/rss?q={query}&l=United+Kingdom&sort=date"
                .to_string(),
        },
        FeedEndpoint {
            label: "Reed RSS".to_string(),
            url_template:
                "https://www.reed.co.uk/jobs/rss?keywords={query}&location=United+Kingdom"
                    .to_string(),
        },
    ]
}

fn default_buckets() -> Vec<Bucket> {
    vec![
        Bucket {
            name: "CYBER".to_string(),
            search_terms: vec![
                "SOC Analyst".to_string(),
                "Security Operations Analyst".to_string(),
                "Cyber Security Analyst".to_string(),
                "Threat Analyst".to_string(),
                "DevSecOps".to_string(),
            ],
            positive_keywords: vec![
                "soc".to_string(),
                "security".to_string(),
                "threat".to_string(),
                "incident".to_string(),
                "blue team".to_string(),
                "siem".to_string(),
                "cyber".to_string(),
            ],
            negative_keywords: vec![
                "intern".to_string(),
                "sales".to_string(),
                "recruiter".to_string(),
                "teacher".to_string(),
            ],
            freshness_limit_minutes: 90,
            per_cycle_quota: 5,
            min_feed_score: 3,
            min_listing_score: 3,
        },
        Bucket {
            name: "IT".to_string(),
            search_terms: vec![
                "2nd Line Support".to_string(),
                "IT Support Engineer".to_string(),
                "Service Desk Engineer".to_string(),
                "IT Engineer".to_string(),
                "IT Analyst".to_string(),
            ],
            positive_keywords: vec![
                "2nd line".to_string(),
                "service desk".to_string(),
                "it support".to_string(),
                "azure".to_string(),
                "intune".to_string(),
                "network".to_string(),
            ],
            negative_keywords: vec![
                "intern".to_string(),
                "sales".to_string(),
                "recruiter".to_string(),
            ],
            freshness_limit_minutes: 360,
            per_cycle_quota: 4,
            // Listing metadata is noisier for generalist IT roles; the
            // looser threshold keeps recall up.
            min_feed_score: 3,
            min_listing_score: 2,
        },
    ]
}
