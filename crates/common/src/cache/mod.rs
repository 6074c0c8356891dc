//! Cache layer
//!
//! Provides:
//! - A narrow `CacheStore` capability trait (`get`/`set` with TTL)
//! - Redis-backed implementation with prefixed keys
//! - A no-op implementation used when no cache backend is configured
//! - An in-memory implementation for tests and local runs
//! - Content-hash key builders
//!
//! Cache access is best-effort throughout: a read or write failure is
//! logged and treated as a miss, never surfaced to the caller. The cache is
//! an optimization, not a source of truth.

use crate::config::RedisConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Narrow cache capability: string values in, string values out.
///
/// Implementations must be best-effort: `get` reports a failed read as a
/// miss, `set` swallows write failures after logging them.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a value; `None` on miss or backend failure
    async fn get(&self, key: &str) -> Option<String>;

    /// Set a value with a TTL; failures are logged, never propagated
    async fn set(&self, key: &str, value: &str, ttl: Duration);
}

/// Redis cache client
pub struct RedisCache {
    connection: RwLock<MultiplexedConnection>,
    key_prefix: String,
}

impl RedisCache {
    /// Connect to Redis. Connection failure is an error here so callers can
    /// decide to fall back to [`NoopCache`].
    pub async fn connect(url: &str, key_prefix: &str) -> Result<Self> {
        let client = Client::open(url).map_err(|e| AppError::CacheError {
            message: format!("Failed to create Redis client: {}", e),
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::CacheError {
                message: format!("Failed to connect to Redis: {}", e),
            })?;

        Ok(Self {
            connection: RwLock::new(connection),
            key_prefix: key_prefix.to_string(),
        })
    }

    /// Build a prefixed key
    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let full_key = self.key(key);
        let mut conn = self.connection.write().await;

        match conn.get::<_, Option<String>>(&full_key).await {
            Ok(Some(value)) => {
                debug!(key = %full_key, "Cache hit");
                Some(value)
            }
            Ok(None) => {
                debug!(key = %full_key, "Cache miss");
                None
            }
            Err(e) => {
                warn!(key = %full_key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) {
        let full_key = self.key(key);
        let mut conn = self.connection.write().await;

        if let Err(e) = conn
            .set_ex::<_, _, ()>(&full_key, value, ttl.as_secs())
            .await
        {
            warn!(key = %full_key, error = %e, "Cache write failed, continuing without cache");
        } else {
            debug!(key = %full_key, ttl_secs = ttl.as_secs(), "Cache set");
        }
    }
}

/// No-op cache used when no backend is configured
#[derive(Debug, Clone, Default)]
pub struct NoopCache;

#[async_trait]
impl CacheStore for NoopCache {
    async fn get(&self, _key: &str) -> Option<String> {
        None
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) {}
}

/// In-memory cache with TTL, for tests and single-process runs
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some((value, expires)) if *expires > Instant::now() => Some(value.clone()),
            _ => None,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
    }
}

/// Build a cache from configuration: Redis when a URL is present and
/// reachable, otherwise a transparent no-op.
pub async fn from_config(config: &RedisConfig) -> Arc<dyn CacheStore> {
    match &config.url {
        Some(url) => match RedisCache::connect(url, &config.key_prefix).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                warn!(error = %e, "Redis unavailable, caching disabled");
                Arc::new(NoopCache)
            }
        },
        None => {
            debug!("No cache backend configured, caching disabled");
            Arc::new(NoopCache)
        }
    }
}

/// Cache key builders
pub mod keys {
    use sha2::{Digest, Sha256};

    /// Hex SHA-256 of the input
    pub fn content_hash(input: &str) -> String {
        let digest = Sha256::digest(input.as_bytes());
        hex::encode(digest)
    }

    /// Key for a cached context build, derived from the normalized query
    /// and result size
    pub fn context(query: &str, top_n: usize, language: Option<&str>) -> String {
        let lang = language.unwrap_or("auto");
        format!(
            "context:{}",
            content_hash(&format!("{}|{}|{}", query.trim(), top_n, lang))
        )
    }

    /// Key for a cached embedding
    pub fn embedding(model: &str, text: &str) -> String {
        format!("embedding:{}:{}", model, content_hash(text))
    }
}
