//! Axum HTTP handlers for the lite-api service.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use crate::{dto::SearchRequest, AppState};

pub const API_VERSION: &str = "1.0.0";

/// GET /
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({"status": "OK", "api_version": API_VERSION})),
    )
}

// ------------------------------------------------------------------ //
//  GET /hotels                                                        //
// ------------------------------------------------------------------ //

/// Search hotel availability through the supplier.
///
/// 400 when the query string cannot be bound, 422 when it is semantically
/// invalid and 500 for any failure past validation.
pub async fn search_hotels(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchRequest>, QueryRejection>,
) -> Response {
    let span = info_span!("search", request_id = %Uuid::new_v4());

    async move {
        let Query(req) = match query {
            Ok(q) => q,
            Err(rejection) => {
                debug!(error = %rejection, "query binding failed");
                return failure(StatusCode::BAD_REQUEST, rejection.body_text());
            }
        };

        if let Err(e) = req.validate() {
            debug!(error = %e, "search request rejected");
            return failure(StatusCode::UNPROCESSABLE_ENTITY, e.to_string());
        }

        match state.service.search(&req).await {
            Ok(resp) => {
                info!(
                    hotels = resp.data.len(),
                    currency = %req.currency,
                    "search served"
                );
                (StatusCode::OK, Json(resp)).into_response()
            }
            Err(e) => {
                error!(error = %e, "search failed");
                failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
    .instrument(span)
    .await
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({"error": message.into()}))).into_response()
}

// ------------------------------------------------------------------ //
//  Tests                                                              //
// ------------------------------------------------------------------ //
