//! Fixed-window counter backends
//!
//! Redis when the deployment has one (counters shared across replicas),
//! an in-process DashMap otherwise. Both expose the same primitive: an
//! atomic increment that also arms the window expiry on first touch.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use redis::aio::MultiplexedConnection;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Increment-and-expire primitive for one window key. Returns the
/// counter value after the increment.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn incr_and_expire(&self, key: &str, window: Duration) -> anyhow::Result<u64>;
}

pub struct RedisCounterStore {
    client: redis::Client,
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
}

impl RedisCounterStore {
    pub fn new(url: &str, key_prefix: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix: key_prefix.to_string(),
        })
    }

    async fn get_connection(&self) -> Result<MultiplexedConnection, redis::RedisError> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // Double-check after acquiring the write lock
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self.client.get_multiplexed_async_connection().await?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn incr_and_expire(&self, key: &str, window: Duration) -> anyhow::Result<u64> {
        let redis_key = self.make_key(key);
        let mut conn = match self.get_connection().await {
            Ok(c) => c,
            Err(e) => {
                self.reset_connection().await;
                return Err(e.into());
            }
        };

        // Single round trip; EXPIRE NX arms the window only on the
        // first increment so later hits never push the reset out
        let mut pipe = redis::pipe();
        pipe.atomic()
            .incr(&redis_key, 1u64)
            .cmd("EXPIRE")
            .arg(&redis_key)
            .arg(window.as_secs().max(1))
            .arg("NX")
            .ignore();

        match pipe.query_async::<(u64,)>(&mut conn).await {
            Ok((count,)) => Ok(count),
            Err(e) => {
                self.reset_connection().await;
                Err(e.into())
            }
        }
    }
}

/// Single-process fallback. Windows are tracked per key and reset
/// lazily on the first increment after expiry.
#[derive(Default)]
pub struct MemoryCounterStore {
    windows: DashMap<String, (Instant, u64)>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn incr_and_expire(&self, key: &str, window: Duration) -> anyhow::Result<u64> {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert((now, 0));

        let (started, count) = *entry;
        if now.duration_since(started) >= window {
            *entry = (now, 1);
            Ok(1)
        } else {
            *entry = (started, count + 1);
            Ok(count + 1)
        }
    }
}
