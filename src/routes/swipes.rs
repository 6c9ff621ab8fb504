use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::SwipeError;
use crate::models::{ErrorResponse, RecordSwipeRequest, RecordSwipeResponse};
use crate::routes::AppState;

/// Configure swipe routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/swipes", web::post().to(record_swipe));
}

/// Record swipe endpoint
///
/// POST /api/v1/swipes
///
/// Request body:
/// ```json
/// {
///   "actorId": "string",
///   "targetId": "string",
///   "action": "like|pass|super_like"
/// }
/// ```
async fn record_swipe(
    state: web::Data<AppState>,
    req: web::Json<RecordSwipeRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    tracing::info!(
        "Recording swipe: {} -> {} ({:?})",
        req.actor_id,
        req.target_id,
        req.action
    );

    match state
        .recorder
        .record_swipe(&req.actor_id, &req.target_id, req.action)
        .await
    {
        Ok(outcome) => {
            // The feed was built against a now-stale swipe set.
            state.feed.invalidate(&req.actor_id).await;

            HttpResponse::Ok().json(RecordSwipeResponse {
                swipe_id: outcome.swipe_id,
                is_match: outcome.matched.is_some(),
                match_id: outcome.matched.map(|m| m.id),
            })
        }
        Err(SwipeError::InvalidSwipe(msg)) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "invalid_swipe".to_string(),
            message: msg,
            status_code: 400,
        }),
        Err(SwipeError::DuplicateSwipe) => HttpResponse::Conflict().json(ErrorResponse {
            error: "duplicate_swipe".to_string(),
            message: format!(
                "User {} has already swiped on {}",
                req.actor_id, req.target_id
            ),
            status_code: 409,
        }),
        Err(SwipeError::Store(e)) => {
            tracing::error!(
                "Failed to record swipe {} -> {}: {}",
                req.actor_id,
                req.target_id,
                e
            );
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "storage_error".to_string(),
                message: "Failed to record swipe".to_string(),
                status_code: 500,
            })
        }
    }
}
