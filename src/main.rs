mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use config::Settings;
use core::{
    ActivityScorer, AgeScorer, FeedConfig, FeedGenerator, GenderScorer, InterestScorer,
    MatchDetector, ScoreAggregator, SwipeRecorder,
};
use routes::AppState;
use services::{
    CacheManager, HttpProfileProvider, LogEventSink, MatchEventSink, MatchStore, PostgresClient,
    ProfileProvider, RedisEventPublisher, SwipeStore,
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap_or_default())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Ember match engine...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize PostgreSQL client (swipe and match stores)
    let postgres = Arc::new(
        PostgresClient::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
        )
        .await
        .unwrap_or_else(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            panic!("PostgreSQL connection error: {}", e);
        }),
    );

    info!("PostgreSQL client initialized");

    // Initialize the feed cache; Redis is optional and the cache degrades
    // to L1-only without it
    let cache = match &settings.cache.redis_url {
        Some(url) => match CacheManager::new(url, settings.cache.l1_cache_size, settings.cache.ttl_secs).await {
            Ok(c) => {
                info!(
                    "Cache manager initialized (L1: {} entries, TTL: {}s, Redis L2)",
                    settings.cache.l1_cache_size, settings.cache.ttl_secs
                );
                Arc::new(c)
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), running with L1 cache only", e);
                Arc::new(CacheManager::in_memory(
                    settings.cache.l1_cache_size,
                    settings.cache.ttl_secs,
                ))
            }
        },
        None => Arc::new(CacheManager::in_memory(
            settings.cache.l1_cache_size,
            settings.cache.ttl_secs,
        )),
    };

    // Match event channel; falls back to log-only when Redis is absent
    let events: Arc<dyn MatchEventSink> = match &settings.cache.redis_url {
        Some(url) => {
            match RedisEventPublisher::new(url, settings.events.match_channel.clone()).await {
                Ok(p) => {
                    info!("Match events publishing to '{}'", settings.events.match_channel);
                    Arc::new(p)
                }
                Err(e) => {
                    warn!("Failed to connect event publisher ({}), logging match events only", e);
                    Arc::new(LogEventSink)
                }
            }
        }
        None => Arc::new(LogEventSink),
    };

    // Profile service client
    let profiles: Arc<dyn ProfileProvider> = Arc::new(HttpProfileProvider::new(
        settings.profiles.endpoint.clone(),
        settings.profiles.api_key.clone(),
    ));

    info!("Profile service client initialized");

    // Assemble the scorer registry from configured weights
    let weights = &settings.scoring.weights;
    let aggregator = Arc::new(
        ScoreAggregator::new()
            .register(Box::new(AgeScorer::new(
                weights.age,
                settings.scoring.default_min_age,
                settings.scoring.default_max_age,
            )))
            .register(Box::new(GenderScorer::new(weights.gender)))
            .register(Box::new(InterestScorer::new(weights.interests)))
            .register(Box::new(ActivityScorer::new(
                weights.activity,
                settings.scoring.activity_threshold_days,
            ))),
    );

    info!(
        "Score aggregator initialized with {} scorers (age: {}, gender: {}, interests: {}, activity: {})",
        aggregator.scorer_count(),
        weights.age,
        weights.gender,
        weights.interests,
        weights.activity
    );

    let swipe_store: Arc<dyn SwipeStore> = postgres.clone();
    let match_store: Arc<dyn MatchStore> = postgres.clone();

    let detector = MatchDetector::new(
        Arc::clone(&swipe_store),
        Arc::clone(&match_store),
        events,
    );
    let recorder = Arc::new(SwipeRecorder::new(Arc::clone(&swipe_store), detector));

    let feed = Arc::new(FeedGenerator::new(
        swipe_store,
        match_store,
        profiles,
        aggregator,
        cache,
        FeedConfig {
            min_score: settings.feed.min_score,
            candidate_pool_limit: settings.feed.candidate_pool_limit,
        },
    ));

    // Build application state
    let app_state = AppState {
        recorder,
        feed,
        postgres: Some(postgres),
        max_feed_limit: settings.feed.max_limit,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
