use std::sync::Arc;

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Extension, Json, Router};
use tracing::{error, warn};

use crate::controller::AppState;
use crate::error::QueryError;
use crate::models::query_payload::QueryPayload;
use crate::services::intent_extractor::IntentExtractor;
use crate::services::keyword_refiner::KeywordRefiner;
use crate::services::query_service::QueryService;
use crate::services::search_orchestrator::SearchOrchestrator;

pub fn router(app_state: AppState) -> Router {
    let query_service = Arc::new(QueryService::new(
        IntentExtractor::new(app_state.language_backend, app_state.ai_model),
        KeywordRefiner::new(app_state.keyword_policy),
        SearchOrchestrator::new(app_state.place_provider, app_state.page_size),
    ));

    Router::new()
        .route("/parse-query", post(parse_query))
        .route_layer(Extension(query_service))
}

/// Interprets a free-text restaurant query and returns one page of places.
pub async fn parse_query(
    Extension(query_service): Extension<Arc<QueryService>>,
    body: Bytes,
) -> impl IntoResponse {
    let payload = match QueryPayload::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Rejecting unparseable request body due to: {}", e);
            return QueryError::InvalidBody.into_response();
        }
    };

    return match query_service.handle(&payload).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!(query = %payload.query_text(), "Something went wrong handling parse-query due to: {}", e);
            e.into_response()
        }
    };
}
