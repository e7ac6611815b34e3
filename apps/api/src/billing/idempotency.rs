//! Webhook event deduplication.
//!
//! `InMemoryIdempotencyStore` is a bounded FIFO: a queue of ids in arrival
//! order plus a set for lookups. Once full, the oldest id is evicted. It is
//! per-process and forgets everything on restart.
//!
//! `RedisIdempotencyStore` shares seen ids across instances with a TTL.

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use redis::AsyncCommands;
use tracing::warn;

pub const DEFAULT_CAPACITY: usize = 1000;
const REDIS_KEY_PREFIX: &str = "paypal:webhook:seen:";
const REDIS_TTL_SECS: u64 = 24 * 60 * 60;

#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    async fn is_duplicate(&self, event_id: &str) -> bool;

    async fn mark_seen(&self, event_id: &str);

    /// Records `event_id` and reports whether it had been seen before, atomically.
    async fn check_and_mark(&self, event_id: &str) -> bool;
}

#[derive(Debug)]
struct SeenIds {
    order: VecDeque<String>,
    lookup: HashSet<String>,
}

#[derive(Debug)]
pub struct InMemoryIdempotencyStore {
    capacity: usize,
    inner: Mutex<SeenIds>,
}

impl InMemoryIdempotencyStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: Mutex::new(SeenIds {
                order: VecDeque::with_capacity(capacity),
                lookup: HashSet::with_capacity(capacity),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    fn insert(&self, event_id: &str) -> bool {
        let mut seen = self.inner.lock();
        if seen.lookup.contains(event_id) {
            return true;
        }
        seen.order.push_back(event_id.to_string());
        seen.lookup.insert(event_id.to_string());
        while seen.order.len() > self.capacity {
            if let Some(oldest) = seen.order.pop_front() {
                seen.lookup.remove(&oldest);
            }
        }
        false
    }
}

impl Default for InMemoryIdempotencyStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl IdempotencyStore for InMemoryIdempotencyStore {
    async fn is_duplicate(&self, event_id: &str) -> bool {
        self.inner.lock().lookup.contains(event_id)
    }

    async fn mark_seen(&self, event_id: &str) {
        self.insert(event_id);
    }

    async fn check_and_mark(&self, event_id: &str) -> bool {
        self.insert(event_id)
    }
}

/// `SET key 1 NX EX ttl`: the first writer wins, later deliveries see a duplicate.
/// Redis being unreachable is logged and treated as "not seen".
#[derive(Clone)]
pub struct RedisIdempotencyStore {
    client: redis::Client,
}

impl RedisIdempotencyStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn key(event_id: &str) -> String {
        format!("{REDIS_KEY_PREFIX}{event_id}")
    }

    async fn exists(&self, event_id: &str) -> redis::RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.exists(Self::key(event_id)).await
    }

    async fn set_if_absent(&self, event_id: &str) -> redis::RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(Self::key(event_id))
            .arg(1)
            .arg("NX")
            .arg("EX")
            .arg(REDIS_TTL_SECS)
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }
}

#[async_trait]
impl IdempotencyStore for RedisIdempotencyStore {
    async fn is_duplicate(&self, event_id: &str) -> bool {
        self.exists(event_id).await.unwrap_or_else(|e| {
            warn!("Redis idempotency lookup failed for {event_id}: {e}");
            false
        })
    }

    async fn mark_seen(&self, event_id: &str) {
        if let Err(e) = self.set_if_absent(event_id).await {
            warn!("Redis idempotency write failed for {event_id}: {e}");
        }
    }

    async fn check_and_mark(&self, event_id: &str) -> bool {
        match self.set_if_absent(event_id).await {
            Ok(inserted) => !inserted,
            Err(e) => {
                warn!("Redis idempotency check failed for {event_id}: {e}");
                false
            }
        }
    }
}
