pub mod feed;
pub mod listing;
pub mod throttle;

pub use feed::FeedAdapter;
pub use listing::ListingAdapter;
pub use throttle::Throttle;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{CandidateRecord, SourceKind};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("feed parse failed: {0}")]
    FeedParse(#[from] feed_rs::parser::ParseFeedError),
    #[error("listing url is not absolute: {0}")]
    BadOrigin(String),
}

/// One queryable job source. Implementations bound their own result size,
/// carry a per-call timeout, and surface failures as values; the scanner
/// logs them and moves on.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn label(&self) -> &str;
    fn kind(&self) -> SourceKind;
    async fn fetch(&self, term: &str) -> Result<Vec<CandidateRecord>, FetchError>;
}

/// Query-string encoding for a search term ("SOC Analyst" -> "SOC+Analyst").
pub(crate) fn encode_term(term: &str) -> String {
    url::form_urlencoded::byte_serialize(term.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_term_uses_plus_for_spaces() {
        assert_eq!(encode_term("SOC Analyst"), "SOC+Analyst");
        assert_eq!(encode_term("2nd Line Support"), "2nd+Line+Support");
    }
}
