use chrono::{DateTime, Utc};

/// One raw listing pulled from a source, before any filtering.
#[derive(Debug, Clone)]
pub struct CandidateRecord {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub published_at: Option<DateTime<Utc>>,
    pub source_label: String,
}

/// A candidate that survived the freshness filter. Never persisted.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub record: CandidateRecord,
    pub age_minutes: i64,
    pub score: i32,
}
