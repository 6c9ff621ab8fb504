use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use thiserror::Error;

use crate::models::MatchCreated;

/// Errors that can occur when publishing match events
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Outbound channel for match-created notifications.
///
/// Consumed by the chat and notification services. Exactly one publish per
/// match: only the detector call that won the insert-if-absent race emits.
#[async_trait]
pub trait MatchEventSink: Send + Sync {
    async fn publish(&self, event: &MatchCreated) -> Result<(), EventError>;
}

/// Publishes match events as JSON on a Redis channel
pub struct RedisEventPublisher {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    channel: String,
}

impl RedisEventPublisher {
    pub async fn new(redis_url: &str, channel: String) -> Result<Self, EventError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            channel,
        })
    }
}

#[async_trait]
impl MatchEventSink for RedisEventPublisher {
    async fn publish(&self, event: &MatchCreated) -> Result<(), EventError> {
        let payload = serde_json::to_string(event)?;

        let mut conn = self.redis.lock().await;
        redis::cmd("PUBLISH")
            .arg(&self.channel)
            .arg(payload)
            .query_async::<()>(&mut *conn)
            .await?;
        drop(conn);

        tracing::debug!(
            "Published match event: {} ({} / {})",
            event.match_id,
            event.user_low_id,
            event.user_high_id
        );

        Ok(())
    }
}

/// Fallback sink that only logs, for deployments without Redis
pub struct LogEventSink;

#[async_trait]
impl MatchEventSink for LogEventSink {
    async fn publish(&self, event: &MatchCreated) -> Result<(), EventError> {
        tracing::info!(
            "Match created: {} ({} / {})",
            event.match_id,
            event.user_low_id,
            event.user_high_id
        );
        Ok(())
    }
}

/// Recording sink used by the test suite to assert exactly-once emission
#[derive(Default)]
pub struct RecordingEventSink {
    events: tokio::sync::Mutex<Vec<MatchCreated>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<MatchCreated> {
        self.events.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.events.lock().await.len()
    }
}

#[async_trait]
impl MatchEventSink for RecordingEventSink {
    async fn publish(&self, event: &MatchCreated) -> Result<(), EventError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}
