use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::FeedEndpoint,
    domain::{CandidateRecord, SourceKind},
};

use super::{encode_term, FetchError, SourceAdapter};

/// Syndicated-feed source. The URL template carries a `{query}` placeholder
/// substituted with the encoded search term.
pub struct FeedAdapter {
    endpoint: FeedEndpoint,
    client: Client,
    max_entries: usize,
    timeout: Duration,
}

impl FeedAdapter {
    pub fn new(client: Client, endpoint: FeedEndpoint, max_entries: usize, timeout: Duration) -> Self {
        Self {
            endpoint,
            client,
            max_entries,
            timeout,
        }
    }

    /// Feeds are reverse-chronological, so only the first `max_entries`
    /// entries are considered; rescanning a board's whole backlog buys
    /// nothing once freshness filtering is applied downstream.
    fn entries_to_records(&self, feed: feed_rs::model::Feed) -> Vec<CandidateRecord> {
        let mut records = Vec::new();
        for entry in feed.entries.into_iter().take(self.max_entries) {
            let Some(title) = entry
                .title
                .map(|t| t.content.trim().to_string())
                .filter(|t| !t.is_empty())
            else {
                continue;
            };
            let Some(url) = entry
                .links
                .first()
                .map(|link| link.href.clone())
                .or_else(|| entry.id.starts_with("http").then(|| entry.id.clone()))
            else {
                continue;
            };
            let published_at = entry.published.or(entry.updated);
            let summary = entry.summary.map(|s| s.content).unwrap_or_default();

            records.push(CandidateRecord {
                title,
                url,
                summary,
                published_at,
                source_label: self.endpoint.label.clone(),
            });
        }
        records
    }
}

#[async_trait]
impl SourceAdapter for FeedAdapter {
    fn label(&self) -> &str {
        &self.endpoint.label
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Feed
    }

    async fn fetch(&self, term: &str) -> Result<Vec<CandidateRecord>, FetchError> {
        let url = self.endpoint.url_template.replace("{query}", &encode_term(term));
        let response = self.client.get(&url).timeout(self.timeout).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let bytes = response.bytes().await?;
        let feed = feed_rs::parser::parse(&bytes[..])?;

        let records = self.entries_to_records(feed);
        tracing::debug!(
            target: "sources",
            source = %self.endpoint.label,
            term,
            records = records.len(),
            "feed fetched"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Jobs</title>
    <item>
      <title>SOC Analyst - London</title>
      <link>https://jobs.example.co.uk/soc-analyst-1</link>
      <description>Security operations centre role, SIEM experience.</description>
      <pubDate>Wed, 05 Aug 2026 09:30:00 GMT</pubDate>
    </item>
    <item>
      <title></title>
      <link>https://jobs.example.co.uk/untitled</link>
    </item>
    <item>
      <title>Service Desk Engineer</title>
      <link>https://jobs.example.co.uk/service-desk-2</link>
    </item>
    <item>
      <title>Third entry past the cap</title>
      <link>https://jobs.example.co.uk/capped-3</link>
    </item>
  </channel>
</rss>"#;

    fn adapter(max_entries: usize) -> FeedAdapter {
        FeedAdapter::new(
            Client::new(),
            FeedEndpoint {
                label: "Indeed RSS".to_string(),
                url_template: "https://jobs.example.co.uk/rss?q={query}".to_string(),
            },
            max_entries,
            Duration::from_secs(20),
        )
    }

    #[test]
    fn extracts_title_link_and_timestamp() {
        let feed = feed_rs::parser::parse(FIXTURE.as_bytes()).expect("fixture parses");
        let records = adapter(15).entries_to_records(feed);

        assert_eq!(records.len(), 3);
        let first = &records[0];
        assert_eq!(first.title, "SOC Analyst - London");
        assert_eq!(first.url, "https://jobs.example.co.uk/soc-analyst-1");
        assert_eq!(first.source_label, "Indeed RSS");
        assert!(first.summary.contains("SIEM"));
        assert_eq!(
            first.published_at,
            Some(Utc.with_ymd_and_hms(2026, 8, 5, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn untitled_entries_are_discarded() {
        let feed = feed_rs::parser::parse(FIXTURE.as_bytes()).expect("fixture parses");
        let records = adapter(15).entries_to_records(feed);
        assert!(records.iter().all(|r| !r.title.is_empty()));
    }

    #[test]
    fn entries_without_a_date_pass_through_with_none() {
        let feed = feed_rs::parser::parse(FIXTURE.as_bytes()).expect("fixture parses");
        let records = adapter(15).entries_to_records(feed);
        assert_eq!(records[1].title, "Service Desk Engineer");
        assert!(records[1].published_at.is_none());
    }

    #[test]
    fn entry_cap_is_applied_in_feed_order() {
        let feed = feed_rs::parser::parse(FIXTURE.as_bytes()).expect("fixture parses");
        let records = adapter(3).entries_to_records(feed);
        // The cap counts entries, not kept records; the untitled second
        // entry eats one slot.
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title, "Service Desk Engineer");
    }
}
