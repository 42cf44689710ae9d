use serde::Deserialize;

use crate::domain::types::SourceKind;

/// A topical grouping of search terms with its own vocabulary and policy.
/// Deserializable so `BUCKETS_JSON` can replace the built-in definitions.
#[derive(Debug, Clone, Deserialize)]
pub struct Bucket {
    pub name: String,
    pub search_terms: Vec<String>,
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
    pub freshness_limit_minutes: i64,
    pub per_cycle_quota: u32,
    #[serde(default = "default_min_feed_score")]
    pub min_feed_score: i32,
    #[serde(default = "default_min_listing_score")]
    pub min_listing_score: i32,
}

impl Bucket {
    pub fn min_score_for(&self, kind: SourceKind) -> i32 {
        match kind {
            SourceKind::Feed => self.min_feed_score,
            SourceKind::Listing => self.min_listing_score,
        }
    }
}

fn default_min_feed_score() -> i32 {
    3
}

fn default_min_listing_score() -> i32 {
    3
}
