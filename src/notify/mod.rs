pub mod telegram;

pub use telegram::TelegramNotifier;

use async_trait::async_trait;

use crate::domain::ScoredCandidate;

/// Everything the pipeline hands over about a posting worth alerting on.
/// Rendering is the sink's concern.
#[derive(Debug, Clone)]
pub struct Alert {
    pub bucket: String,
    pub title: String,
    pub url: String,
    pub source_label: String,
    pub age_minutes: i64,
    pub score: i32,
}

impl Alert {
    pub fn from_scored(bucket: &str, candidate: &ScoredCandidate) -> Self {
        Self {
            bucket: bucket.to_string(),
            title: candidate.record.title.clone(),
            url: candidate.record.url.clone(),
            source_label: candidate.record.source_label.clone(),
            age_minutes: candidate.age_minutes,
            score: candidate.score,
        }
    }
}

/// Delivery end of the pipeline. Failure is a plain `false`: the scanner
/// leaves the candidate unmarked so a later cycle retries it.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send_alert(&self, alert: &Alert) -> bool;
    async fn send_text(&self, text: &str) -> bool;
}
