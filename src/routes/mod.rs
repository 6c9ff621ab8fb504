// Route exports
pub mod feed;
pub mod swipes;

use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

use crate::core::{FeedGenerator, SwipeRecorder};
use crate::models::HealthResponse;
use crate::services::PostgresClient;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub recorder: Arc<SwipeRecorder>,
    pub feed: Arc<FeedGenerator>,
    pub postgres: Option<Arc<PostgresClient>>,
    pub max_feed_limit: u16,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(swipes::configure)
            .configure(feed::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let storage_healthy = match &state.postgres {
        Some(pg) => pg.health_check().await.unwrap_or(false),
        None => true,
    };

    let status = if storage_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}
