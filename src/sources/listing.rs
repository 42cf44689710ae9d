use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::{
    config::ListingEndpoint,
    domain::{CandidateRecord, SourceKind},
    freshness,
    relevance::collapse_whitespace,
};

use super::{encode_term, FetchError, SourceAdapter, Throttle};

/// Scraped HTML listing source. Markup is selected, not understood: a card
/// selector bounds the search space, a link selector inside each card yields
/// the title and href, and an optional `<time datetime>` attribute supplies
/// the timestamp.
pub struct ListingAdapter {
    label: String,
    url_template: String,
    card_selector: Selector,
    link_selector: Selector,
    time_selector: Selector,
    client: Client,
    max_cards: usize,
    timeout: Duration,
    throttle: Arc<Throttle>,
}

impl ListingAdapter {
    pub fn new(
        client: Client,
        endpoint: ListingEndpoint,
        max_cards: usize,
        timeout: Duration,
        throttle: Arc<Throttle>,
    ) -> Result<Self> {
        let card_selector = Selector::parse(&endpoint.card_selector)
            .map_err(|err| anyhow!("invalid card selector {:?}: {err}", endpoint.card_selector))?;
        let link_selector = Selector::parse(&endpoint.link_selector)
            .map_err(|err| anyhow!("invalid link selector {:?}: {err}", endpoint.link_selector))?;
        let time_selector = Selector::parse("time").map_err(|err| anyhow!("time selector: {err}"))?;

        Ok(Self {
            label: endpoint.label,
            url_template: endpoint.url_template,
            card_selector,
            link_selector,
            time_selector,
            client,
            max_cards,
            timeout,
            throttle,
        })
    }

    /// Synchronous on purpose: `Html` is not `Send`, so it must not live
    /// across an await point.
    fn extract_cards(&self, body: &str, page_url: &Url) -> Vec<CandidateRecord> {
        let document = Html::parse_document(body);
        let mut records = Vec::new();

        for card in document.select(&self.card_selector).take(self.max_cards) {
            let Some(anchor) = card.select(&self.link_selector).next() else {
                continue;
            };
            let title = collapse_whitespace(&anchor.text().collect::<String>());
            if title.is_empty() {
                continue;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Ok(link) = page_url.join(href) else {
                continue;
            };
            let published_at = card
                .select(&self.time_selector)
                .next()
                .and_then(|el| el.value().attr("datetime"))
                .and_then(freshness::parse_timestamp);
            let summary = collapse_whitespace(&card.text().collect::<String>());

            records.push(CandidateRecord {
                title,
                url: link.to_string(),
                summary,
                published_at,
                source_label: self.label.clone(),
            });
        }
        records
    }
}

#[async_trait]
impl SourceAdapter for ListingAdapter {
    fn label(&self) -> &str {
        &self.label
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Listing
    }

    async fn fetch(&self, term: &str) -> Result<Vec<CandidateRecord>, FetchError> {
        // Listing sources block eager clients; the shared throttle spaces
        // out every request to this family, across terms and buckets.
        self.throttle.acquire().await;

        let url = self.url_template.replace("{query}", &encode_term(term));
        let page_url = Url::parse(&url).map_err(|_| FetchError::BadOrigin(url.clone()))?;

        let response = self.client.get(&url).timeout(self.timeout).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let body = response.text().await?;

        let records = self.extract_cards(&body, &page_url);
        tracing::debug!(
            target: "sources",
            source = %self.label,
            term,
            records = records.len(),
            "listing page fetched"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<html><body><ul>
      <li>
        <a class="job-card__link" href="https://www.example.com/jobs/view/soc-analyst-101">
          SOC  Analyst
        </a>
        <time datetime="2026-08-05T09:30:00Z">33 minutes ago</time>
        <span>London · Hybrid</span>
      </li>
      <li>
        <a class="job-card__link" href="/jobs/view/threat-analyst-102">Threat Analyst</a>
        <span>Remote</span>
      </li>
      <li>
        <span>Promoted content with no anchor</span>
      </li>
      <li>
        <a class="job-card__link" href="/jobs/view/capped-103">Past the cap</a>
      </li>
    </ul></body></html>"#;

    fn adapter(max_cards: usize) -> ListingAdapter {
        ListingAdapter::new(
            Client::new(),
            ListingEndpoint {
                label: "LinkedIn".to_string(),
                url_template: "https://www.example.com/jobs/search/?keywords={query}".to_string(),
                card_selector: "li".to_string(),
                link_selector: "a.job-card__link".to_string(),
            },
            max_cards,
            Duration::from_secs(20),
            Arc::new(Throttle::new(Duration::from_millis(0))),
        )
        .expect("valid selectors")
    }

    fn page_url() -> Url {
        Url::parse("https://www.example.com/jobs/search/?keywords=SOC+Analyst").expect("url")
    }

    #[test]
    fn extracts_cards_with_title_link_and_timestamp() {
        let records = adapter(20).extract_cards(FIXTURE, &page_url());

        assert_eq!(records.len(), 3);
        let first = &records[0];
        assert_eq!(first.title, "SOC Analyst");
        assert_eq!(first.url, "https://www.example.com/jobs/view/soc-analyst-101");
        assert!(first.published_at.is_some());
        assert!(first.summary.contains("London · Hybrid"));
        assert_eq!(first.source_label, "LinkedIn");
    }

    #[test]
    fn relative_links_resolve_against_the_page_origin() {
        let records = adapter(20).extract_cards(FIXTURE, &page_url());
        assert_eq!(records[1].url, "https://www.example.com/jobs/view/threat-analyst-102");
        assert!(records[1].published_at.is_none());
    }

    #[test]
    fn cards_without_an_anchor_are_skipped() {
        let records = adapter(20).extract_cards(FIXTURE, &page_url());
        assert!(records.iter().all(|r| !r.title.contains("Promoted")));
    }

    #[test]
    fn card_cap_bounds_extraction() {
        let records = adapter(2).extract_cards(FIXTURE, &page_url());
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.title != "Past the cap"));
    }
}
