use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::{stream, StreamExt};

use crate::{
    db::SeenStore,
    domain::{Bucket, BucketOutcome, CandidateRecord, ScoredCandidate, SourceKind},
    fingerprint::fingerprint,
    freshness,
    notify::{Alert, AlertSink},
    relevance::score_text,
    sources::{FetchError, SourceAdapter},
};

/// Resolves one (term, adapter) pair into its fetch result. Lifting the
/// fetch into a named async fn gives it a fully concrete signature, which
/// the `buffered` combinator needs to reason about the spawned future.
async fn fetch_pair(
    term: String,
    adapter: Arc<dyn SourceAdapter>,
) -> (String, Arc<dyn SourceAdapter>, Result<Vec<CandidateRecord>, FetchError>) {
    let result = adapter.fetch(&term).await;
    (term, adapter, result)
}

/// Runs one bucket through the pipeline: fetch, freshness-filter, score,
/// threshold, dedupe-check, dispatch, mark-seen. Stops the whole bucket as
/// soon as the per-cycle quota is reached.
pub struct BucketScanner {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    sink: Arc<dyn AlertSink>,
    store: Arc<SeenStore>,
    fetch_concurrency: usize,
}

impl BucketScanner {
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        sink: Arc<dyn AlertSink>,
        store: Arc<SeenStore>,
        fetch_concurrency: usize,
    ) -> Self {
        Self {
            adapters,
            sink,
            store,
            fetch_concurrency: fetch_concurrency.max(1),
        }
    }

    /// One scan of one bucket. `now` is the reference clock for every age
    /// computed here, so repeated measurements of a record agree.
    ///
    /// Fetches for the (term x adapter) pairs overlap up to
    /// `fetch_concurrency`, but `buffered` yields them back in pair order
    /// and records are processed in arrival order by this single loop --
    /// dispatch order and the quota counter stay identical to a fully
    /// sequential scan. Dropping the stream on short-circuit cancels any
    /// fetch still in flight.
    pub async fn scan(&self, bucket: &Bucket, now: DateTime<Utc>) -> BucketOutcome {
        let mut outcome = BucketOutcome::default();

        let pairs: Vec<(String, Arc<dyn SourceAdapter>)> = bucket
            .search_terms
            .iter()
            .flat_map(|term| {
                self.adapters
                    .iter()
                    .cloned()
                    .map(move |adapter| (term.clone(), adapter))
            })
            .collect();

        let fetch_futures: Vec<
            futures::future::BoxFuture<
                'static,
                (String, Arc<dyn SourceAdapter>, Result<Vec<CandidateRecord>, FetchError>),
            >,
        > = pairs
            .into_iter()
            .map(|(term, adapter)| Box::pin(fetch_pair(term, adapter)) as _)
            .collect();

        let mut fetches = stream::iter(fetch_futures).buffered(self.fetch_concurrency);

        'bucket: while let Some((term, adapter, result)) = fetches.next().await {
            let records = match result {
                Ok(records) => records,
                Err(err) => {
                    outcome.fetch_failures += 1;
                    tracing::warn!(
                        target: "scan",
                        source = adapter.label(),
                        term = %term,
                        error = %err,
                        "fetch failed; continuing with remaining sources"
                    );
                    continue;
                }
            };

            for record in records {
                if outcome.sent >= bucket.per_cycle_quota {
                    tracing::info!(
                        target: "scan",
                        bucket = %bucket.name,
                        sent = outcome.sent,
                        "quota reached; short-circuiting bucket"
                    );
                    break 'bucket;
                }
                self.process(bucket, adapter.kind(), record, now, &mut outcome).await;
            }
        }

        outcome
    }

    async fn process(
        &self,
        bucket: &Bucket,
        kind: SourceKind,
        record: CandidateRecord,
        now: DateTime<Utc>,
        outcome: &mut BucketOutcome,
    ) {
        let published = freshness::normalize(record.published_at, now);
        let age_minutes = freshness::age_minutes(published, now);
        if age_minutes > bucket.freshness_limit_minutes {
            outcome.stale += 1;
            return;
        }

        let text = format!("{} {}", record.title, record.summary);
        let score = score_text(&text, &bucket.positive_keywords, &bucket.negative_keywords);
        if score < bucket.min_score_for(kind) {
            outcome.low_score += 1;
            return;
        }

        let fp = fingerprint(&record.source_label, &record.url, &record.title);
        if self.store.is_seen(&fp) {
            outcome.duplicate += 1;
            return;
        }

        let scored = ScoredCandidate {
            record,
            age_minutes,
            score,
        };
        let alert = Alert::from_scored(&bucket.name, &scored);
        if self.sink.send_alert(&alert).await {
            self.store.mark_seen(&fp, now);
            outcome.sent += 1;
            tracing::info!(
                target: "scan",
                bucket = %bucket.name,
                source = %scored.record.source_label,
                age_minutes = scored.age_minutes,
                score = scored.score,
                title = %scored.record.title,
                "alert dispatched"
            );
        } else {
            // Left unmarked so the next cycle can retry delivery.
            outcome.delivery_failures += 1;
        }
    }
}
