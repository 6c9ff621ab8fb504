use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;

use crate::models::{Match, Swipe, SwipeAction};
use crate::services::store::{MatchStore, StoreError, SwipeStore};

/// PostgreSQL unique-violation SQLSTATE
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL client backing the swipe and match stores.
///
/// The uniqueness invariants live in the schema: swipes are unique on
/// (actor_id, target_id) and matches on (user_low_id, user_high_id), so
/// concurrent writers racing past application-level checks are stopped by
/// the database rather than by application logic.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StoreError> {
        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StoreError::Conflict;
        }
    }
    StoreError::Sqlx(err)
}

fn row_to_swipe(row: &sqlx::postgres::PgRow) -> Swipe {
    Swipe {
        id: row.get("id"),
        actor_id: row.get("actor_id"),
        target_id: row.get("target_id"),
        action: row.get("action"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl SwipeStore for PostgresClient {
    async fn insert_swipe(&self, swipe: &Swipe) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO swipes (id, actor_id, target_id, action, created_at)
            VALUES ($1, $2, $3, $4, $5)
        "#;

        sqlx::query(query)
            .bind(swipe.id)
            .bind(&swipe.actor_id)
            .bind(&swipe.target_id)
            .bind(swipe.action)
            .bind(swipe.created_at)
            .execute(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        tracing::debug!(
            "Recorded swipe: {} -> {} ({:?})",
            swipe.actor_id,
            swipe.target_id,
            swipe.action
        );

        Ok(())
    }

    async fn swipe_exists(&self, actor_id: &str, target_id: &str) -> Result<bool, StoreError> {
        let query = r#"
            SELECT 1 AS present
            FROM swipes
            WHERE actor_id = $1 AND target_id = $2
        "#;

        let row = sqlx::query(query)
            .bind(actor_id)
            .bind(target_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    async fn find_reciprocal_like(
        &self,
        actor_id: &str,
        target_id: &str,
    ) -> Result<Option<Swipe>, StoreError> {
        let query = r#"
            SELECT id, actor_id, target_id, action, created_at
            FROM swipes
            WHERE actor_id = $1 AND target_id = $2 AND action IN ($3, $4)
        "#;

        let row = sqlx::query(query)
            .bind(actor_id)
            .bind(target_id)
            .bind(SwipeAction::Like)
            .bind(SwipeAction::SuperLike)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_swipe))
    }

    async fn swiped_target_ids(&self, actor_id: &str) -> Result<Vec<String>, StoreError> {
        let query = r#"
            SELECT target_id
            FROM swipes
            WHERE actor_id = $1
        "#;

        let rows = sqlx::query(query)
            .bind(actor_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("target_id")).collect())
    }
}

#[async_trait]
impl MatchStore for PostgresClient {
    async fn insert_match_if_absent(&self, m: &Match) -> Result<bool, StoreError> {
        let query = r#"
            INSERT INTO matches (id, user_low_id, user_high_id, matched_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_low_id, user_high_id) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(m.id)
            .bind(&m.user_low_id)
            .bind(&m.user_high_id)
            .bind(m.matched_at)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn matched_user_ids(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let query = r#"
            SELECT CASE WHEN user_low_id = $1 THEN user_high_id ELSE user_low_id END AS other_id
            FROM matches
            WHERE (user_low_id = $1 OR user_high_id = $1) AND ended_at IS NULL
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("other_id")).collect())
    }
}
