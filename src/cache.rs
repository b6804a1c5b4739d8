//! Persistent response cache for geocoding and routing lookups.
//!
//! Nominatim and the public OSRM demo server both ask clients to avoid
//! repeating identical queries, so resolved locations and routes are kept
//! on disk for a while. The cache is optional: until [`init`] has been
//! called every lookup misses and every store is a no-op.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use fjall::{Database, Keyspace, KeyspaceCreateOptions};
use rand::RngExt;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::OnceCell;
use tokio::task;
use tracing::{debug, instrument};

use crate::TripPlannerError;

const KEYSPACE: &str = "responses";

static RESPONSES: OnceCell<ResponseCache> = OnceCell::const_new();

/// A cached response and the unix second it goes stale
#[derive(Serialize, Deserialize)]
struct CachedResponse<T> {
    stale_after: u64,
    body: T,
}

fn unix_seconds(at: SystemTime) -> Result<u64> {
    Ok(at.duration_since(UNIX_EPOCH)?.as_secs())
}

pub struct ResponseCache {
    responses: Keyspace,
}

impl ResponseCache {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::builder(path.as_ref()).open()?;
        let responses = db.keyspace(KEYSPACE, KeyspaceCreateOptions::default)?;
        Ok(Self { responses })
    }

    /// Keep `body` under `key` for `ttl`
    #[instrument(level = "debug", skip(self, body))]
    pub async fn store<T: Serialize + Send + 'static>(
        &self,
        key: &str,
        body: T,
        ttl: Duration,
    ) -> Result<()> {
        let stale_at = SystemTime::now()
            .checked_add(ttl)
            .with_context(|| format!("TTL of {ttl:?} is out of range"))?;
        let encoded = postcard::to_stdvec(&CachedResponse {
            stale_after: unix_seconds(stale_at)?,
            body,
        })?;

        let responses = self.responses.clone();
        let key = key.as_bytes().to_vec();
        task::spawn_blocking(move || responses.insert(key, encoded)).await??;
        Ok(())
    }

    /// Fresh body stored under `key`. Stale entries are evicted and read as a miss.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let responses = self.responses.clone();
        let raw_key = key.as_bytes().to_vec();
        let raw = task::spawn_blocking(move || {
            responses
                .get(raw_key)
                .map(|slice| slice.map(|bytes| bytes.to_vec()))
        })
        .await??;

        let Some(raw) = raw else {
            debug!("Cache miss");
            return Ok(None);
        };

        let cached: CachedResponse<T> = postcard::from_bytes(&raw)?;
        if unix_seconds(SystemTime::now())? < cached.stale_after {
            debug!("Cache hit");
            return Ok(Some(cached.body));
        }

        debug!("Cached entry is stale, evicting");
        self.evict(key).await?;
        Ok(None)
    }

    pub async fn evict(&self, key: &str) -> Result<()> {
        let responses = self.responses.clone();
        let key = key.as_bytes().to_vec();
        task::spawn_blocking(move || responses.remove(key)).await??;
        Ok(())
    }
}

/// Open the on-disk cache used by [`get`] and [`put`]. Call once at startup.
pub fn init(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let cache = ResponseCache::open(path).map_err(|e| {
        TripPlannerError::cache(format!("Failed to open {}: {e:#}", path.display()))
    })?;
    RESPONSES
        .set(cache)
        .map_err(|_| TripPlannerError::cache("Cache already initialized"))?;
    Ok(())
}

/// Time-to-live with +-10% jitter so entries written together expire apart.
#[must_use]
pub fn jittered_ttl(hours: u32) -> Duration {
    let jitter: f64 = rand::rng().random_range(0.9..1.1);
    Duration::from_secs((f64::from(hours) * 3600.0 * jitter) as u64)
}

pub async fn put<T: Serialize + Send + 'static>(key: &str, body: T, ttl: Duration) -> Result<()> {
    match RESPONSES.get() {
        Some(cache) => cache.store(key, body, ttl).await,
        None => Ok(()),
    }
}

pub async fn get<T: DeserializeOwned + Send + 'static>(key: &str) -> Result<Option<T>> {
    match RESPONSES.get() {
        Some(cache) => cache.fetch(key).await,
        None => Ok(None),
    }
}
