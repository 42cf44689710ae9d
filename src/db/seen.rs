use std::{collections::HashMap, path::Path};

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use sqlx::{sqlite::SqlitePool, Row};

/// Durable map from candidate fingerprint to first-seen time. The full set
/// is held in memory; sqlite only sees a bulk load at startup, one batched
/// insert per cycle, and a prune at process start.
pub struct SeenStore {
    pool: Option<SqlitePool>,
    entries: Mutex<HashMap<String, i64>>,
    pending: Mutex<Vec<(String, i64)>>,
}

impl SeenStore {
    /// Opens the backing database and loads every fingerprint. Never fatal:
    /// an absent or corrupt file degrades to an empty memory-only store.
    pub async fn open(db_path: &Path) -> Self {
        match Self::try_open(db_path).await {
            Ok(store) => store,
            Err(err) => {
                tracing::warn!(
                    target: "db",
                    error = %err,
                    path = %db_path.display(),
                    "seen store unavailable; continuing with an empty in-memory store"
                );
                Self::in_memory()
            }
        }
    }

    async fn try_open(db_path: &Path) -> anyhow::Result<Self> {
        let pool = super::init_pool(db_path).await?;
        let rows = sqlx::query("SELECT fingerprint, first_seen_at FROM seen")
            .fetch_all(&pool)
            .await?;

        let mut entries = HashMap::with_capacity(rows.len());
        for row in rows {
            let fingerprint: String = row.try_get("fingerprint")?;
            let first_seen_at: i64 = row.try_get("first_seen_at")?;
            entries.insert(fingerprint, first_seen_at);
        }
        tracing::info!(target: "db", entries = entries.len(), "seen store loaded");

        Ok(Self {
            pool: Some(pool),
            entries: Mutex::new(entries),
            pending: Mutex::new(Vec::new()),
        })
    }

    /// Store with no durable backing. Used in tests and as the degraded
    /// fallback when sqlite cannot be opened.
    pub fn in_memory() -> Self {
        Self {
            pool: None,
            entries: Mutex::new(HashMap::new()),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn is_seen(&self, fingerprint: &str) -> bool {
        self.entries.lock().contains_key(fingerprint)
    }

    /// Idempotent: re-marking an existing fingerprint changes nothing.
    pub fn mark_seen(&self, fingerprint: &str, at: DateTime<Utc>) {
        let mut entries = self.entries.lock();
        if entries.contains_key(fingerprint) {
            return;
        }
        entries.insert(fingerprint.to_string(), at.timestamp());
        self.pending.lock().push((fingerprint.to_string(), at.timestamp()));
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Persists everything marked since the last flush. A write failure is
    /// logged and the batch is carried over to the next flush; the risk left
    /// open is a duplicate alert after a restart, not store corruption.
    pub async fn flush(&self) {
        let batch: Vec<(String, i64)> = {
            let mut pending = self.pending.lock();
            pending.drain(..).collect()
        };
        if batch.is_empty() {
            return;
        }
        let Some(pool) = &self.pool else {
            tracing::warn!(
                target: "db",
                entries = batch.len(),
                "no backing store; fingerprints from this cycle will not survive a restart"
            );
            return;
        };
        match Self::write_batch(pool, &batch).await {
            Ok(()) => {
                tracing::debug!(target: "db", entries = batch.len(), "seen store flushed");
            }
            Err(err) => {
                tracing::warn!(
                    target: "db",
                    error = %err,
                    entries = batch.len(),
                    "failed to persist fingerprints; retrying next cycle"
                );
                self.pending.lock().extend(batch);
            }
        }
    }

    async fn write_batch(pool: &SqlitePool, batch: &[(String, i64)]) -> anyhow::Result<()> {
        let mut tx = pool.begin().await?;
        for (fingerprint, first_seen_at) in batch {
            sqlx::query("INSERT OR IGNORE INTO seen (fingerprint, first_seen_at) VALUES (?1, ?2)")
                .bind(fingerprint)
                .bind(first_seen_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Deletes entries first seen before `now - retention`. Run once per
    /// process start; the per-candidate lookup path never pays for it.
    pub async fn prune(&self, retention: Duration, now: DateTime<Utc>) {
        let cutoff = (now - retention).timestamp();
        let before = self.len();
        self.entries.lock().retain(|_, first_seen_at| *first_seen_at >= cutoff);

        if let Some(pool) = &self.pool {
            match sqlx::query("DELETE FROM seen WHERE first_seen_at < ?1")
                .bind(cutoff)
                .execute(pool)
                .await
            {
                Ok(result) => {
                    tracing::info!(
                        target: "db",
                        removed = result.rows_affected(),
                        retained = self.len(),
                        "seen store pruned"
                    );
                }
                Err(err) => {
                    tracing::warn!(target: "db", error = %err, "failed to prune seen store");
                }
            }
        } else if before > self.len() {
            tracing::info!(target: "db", removed = before - self.len(), "seen store pruned");
        }
    }

    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn mark_seen_is_idempotent() {
        let store = SeenStore::in_memory();
        store.mark_seen("abc123", now());
        store.mark_seen("abc123", now());
        assert_eq!(store.len(), 1);
        assert!(store.is_seen("abc123"));
        assert!(!store.is_seen("def456"));
    }

    #[tokio::test]
    async fn fingerprints_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("seen.db");

        let store = SeenStore::open(&path).await;
        store.mark_seen("abc123", now());
        store.flush().await;
        store.close().await;

        let reopened = SeenStore::open(&path).await;
        assert!(reopened.is_seen("abc123"));
        assert_eq!(reopened.len(), 1);
    }

    #[tokio::test]
    async fn unflushed_fingerprints_do_not_survive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("seen.db");

        let store = SeenStore::open(&path).await;
        store.mark_seen("abc123", now());
        store.close().await;

        let reopened = SeenStore::open(&path).await;
        assert!(!reopened.is_seen("abc123"));
    }

    #[tokio::test]
    async fn prune_removes_only_expired_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("seen.db");
        let reference = now();

        let store = SeenStore::open(&path).await;
        store.mark_seen("old", reference - Duration::days(20));
        store.mark_seen("recent", reference - Duration::days(2));
        store.flush().await;

        store.prune(Duration::days(14), reference).await;
        assert!(!store.is_seen("old"));
        assert!(store.is_seen("recent"));

        store.close().await;
        let reopened = SeenStore::open(&path).await;
        assert!(!reopened.is_seen("old"));
        assert!(reopened.is_seen("recent"));
    }

    #[tokio::test]
    async fn corrupt_database_degrades_to_empty_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("seen.db");
        std::fs::write(&path, b"this is not a sqlite file").expect("write garbage");

        let store = SeenStore::open(&path).await;
        assert!(store.is_empty());

        // Still usable for the session even though nothing persists.
        store.mark_seen("abc123", now());
        assert!(store.is_seen("abc123"));
        store.flush().await;
    }
}
