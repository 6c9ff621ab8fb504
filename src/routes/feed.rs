use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{ErrorResponse, FeedQuery, FeedResponse, InvalidateFeedRequest};
use crate::routes::AppState;

/// Configure feed routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/feed", web::get().to(get_feed))
        .route("/feed/invalidate", web::post().to(invalidate_feed));
}

/// Feed endpoint
///
/// GET /api/v1/feed?userId={userId}&limit={limit}&offset={offset}
async fn get_feed(state: web::Data<AppState>, query: web::Query<FeedQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    // Cap limit to prevent excessive pages
    let limit = query.limit.min(state.max_feed_limit) as usize;
    let offset = query.offset as usize;

    tracing::info!(
        "Building feed for {}: limit={}, offset={}",
        query.user_id,
        limit,
        offset
    );

    match state.feed.get_feed(&query.user_id, limit, offset).await {
        Ok(page) => HttpResponse::Ok().json(FeedResponse {
            candidates: page.candidates,
            total: page.total,
            has_more: page.has_more,
        }),
        Err(e) => {
            tracing::error!("Failed to build feed for {}: {}", query.user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "feed_error".to_string(),
                message: "Failed to build feed".to_string(),
                status_code: 500,
            })
        }
    }
}

/// Feed cache eviction endpoint, called by the profile service whenever a
/// user's preferences change.
///
/// POST /api/v1/feed/invalidate
async fn invalidate_feed(
    state: web::Data<AppState>,
    req: web::Json<InvalidateFeedRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    state.feed.invalidate(&req.user_id).await;
    tracing::debug!("Feed cache invalidated for {}", req.user_id);

    HttpResponse::NoContent().finish()
}
