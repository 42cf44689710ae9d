pub mod env;
mod loader;

pub use env::{
    AppConfig, ConfigError, DedupeConfig, DirectoryConfig, FeedEndpoint, ListingEndpoint,
    LoggingConfig, SchedulerConfig, SourcesConfig, TelegramConfig,
};
pub use loader::load_config;
