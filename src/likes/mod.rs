use chrono::{DateTime, NaiveDate, Utc};
use fs_err as fs;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tempfile::NamedTempFile;

use crate::config::Config;
use crate::errors::TripError;
use crate::wire::TripRequest;

/// Process-wide "likes" tally.
#[derive(Debug, Default)]
pub struct LikeCounter {
    n: AtomicU64,
}

impl LikeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a tally carried over from earlier runs.
    pub fn with_count(n: u64) -> Self {
        Self { n: AtomicU64::new(n) }
    }

    /// Returns the tally after this like.
    pub fn like(&self) -> u64 {
        self.n.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn count(&self) -> u64 {
        self.n.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct LikeTally {
    count: u64,
}

/// The tally between runs, kept as `{root}/.vibe_trip/likes.json`.
#[derive(Debug, Clone)]
pub struct LikeStore {
    path: PathBuf,
}

impl LikeStore {
    pub fn new(root: &Path) -> Self {
        Self { path: root.join(".vibe_trip").join("likes.json") }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Zero when nothing has been saved yet.
    pub fn load(&self) -> Result<u64, TripError> {
        let body = match fs::read_to_string(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let tally: LikeTally = serde_json::from_str(&body)?;
        Ok(tally.count)
    }

    pub fn save(&self, count: u64) -> Result<(), TripError> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| TripError::Configuration(format!("bad likes path {}", self.path.display())))?;
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(serde_json::to_string_pretty(&LikeTally { count })?.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| TripError::Io(e.error))?;
        tracing::debug!(path = %self.path.display(), count, "likes tally saved");
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeRecord {
    pub city: String,
    pub date: NaiveDate,
    pub days: u32,
    pub liked_at: DateTime<Utc>,
    pub itinerary: String,
}

impl LikeRecord {
    pub fn new(req: &TripRequest, itinerary: &str) -> Self {
        Self {
            city: req.city.clone(),
            date: req.date,
            days: req.days(),
            liked_at: Utc::now(),
            itinerary: itinerary.to_string(),
        }
    }
}

/// Posts liked itineraries to the configured webhook.
pub struct WebhookSink {
    url: String,
    client: Client,
}

impl WebhookSink {
    /// `None` when no webhook is configured.
    pub fn from_config(cfg: &Config) -> Result<Option<Self>, TripError> {
        let Some(url) = cfg.like_webhook_url.clone() else {
            return Ok(None);
        };
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TripError::Service(format!("http client init failed: {e}")))?;
        Ok(Some(Self { url, client }))
    }

    pub async fn post(&self, record: &LikeRecord) -> Result<(), TripError> {
        let resp = self
            .client
            .post(&self.url)
            .json(record)
            .send()
            .await
            .map_err(|e| TripError::Service(format!("webhook request failed: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TripError::Service(format!("webhook returned {status}")));
        }
        tracing::info!(city = %record.city, "liked itinerary posted to webhook");
        Ok(())
    }
}

/// Bump the counter and, when a sink exists, persist the record.
pub async fn like(
    counter: &LikeCounter,
    sink: Option<&WebhookSink>,
    record: &LikeRecord,
) -> Result<u64, TripError> {
    let total = counter.like();
    match sink {
        Some(s) => s.post(record).await?,
        None => tracing::info!(total, "like recorded locally (no webhook configured)"),
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn concurrent_likes_are_all_counted() {
        let counter = Arc::new(LikeCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = Arc::clone(&counter);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        c.like();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(counter.count(), 8000);
    }

    #[test]
    fn no_webhook_configured_means_no_sink() {
        assert!(WebhookSink::from_config(&Config::default()).unwrap().is_none());
        let cfg = Config { like_webhook_url: Some("https://hooks.example.com/x".into()), ..Config::default() };
        assert!(WebhookSink::from_config(&cfg).unwrap().is_some());
    }

    #[tokio::test]
    async fn like_without_sink_only_counts() {
        let counter = LikeCounter::new();
        let req = TripRequest::new("부산", NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(), 1).unwrap();
        let rec = LikeRecord::new(&req, "1일차");
        assert_eq!(like(&counter, None, &rec).await.unwrap(), 1);
        assert_eq!(like(&counter, None, &rec).await.unwrap(), 2);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["city"], "부산");
        assert_eq!(json["date"], "2025-07-01");
    }

    #[test]
    fn tally_survives_a_new_store_and_counter() {
        let dir = tempfile::tempdir().unwrap();
        let store = LikeStore::new(dir.path());
        assert_eq!(store.load().unwrap(), 0);
        assert!(store.path().ends_with(".vibe_trip/likes.json"));

        let first = LikeCounter::with_count(store.load().unwrap());
        assert_eq!(first.like(), 1);
        store.save(first.count()).unwrap();

        let reopened = LikeStore::new(dir.path());
        let second = LikeCounter::with_count(reopened.load().unwrap());
        assert_eq!(second.like(), 2);
        reopened.save(second.count()).unwrap();
        assert_eq!(LikeStore::new(dir.path()).load().unwrap(), 2);
    }

    #[test]
    fn corrupt_tally_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LikeStore::new(dir.path());
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.load(), Err(TripError::Json(_))));
    }
}
