//! HTTP request handlers.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Json, State},
    http::{header::ACCEPT, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::Value;
use tower_http::trace::TraceLayer;

use super::state::AppState;
use crate::negotiation::{AcceptList, DecodeType, PreferenceEntry};

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/negotiate", get(negotiate))
        .route("/decode", post(decode))
        .layer(DefaultBodyLimit::max(state.config.max_body_size));

    let router = if state.config.logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.uptime().as_secs(),
    })
}

/// All `Accept` header values, joined the way repeated fields combine
fn accept_header(headers: &HeaderMap) -> String {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join(",")
}

/// Negotiation result
#[derive(Debug, Serialize)]
pub struct NegotiateResponse {
    pub decode_type: DecodeType,
    pub preferences: Vec<PreferenceEntry>,
}

/// Classify the request's Accept header
async fn negotiate(State(state): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    let accepted = AcceptList::parse(&accept_header(&headers));
    let decode_type = state.negotiator.select(&accepted);

    Json(NegotiateResponse {
        decode_type,
        preferences: accepted.into_entries(),
    })
}

/// Decoded body
#[derive(Debug, Serialize)]
pub struct DecodeResponse {
    pub decode_type: DecodeType,
    pub body: Value,
}

/// Decode the request body with the negotiated decoder
async fn decode(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = accept_header(&headers);

    match state.negotiator.negotiate(&header) {
        DecodeType::Json => match serde_json::from_slice::<Value>(&body) {
            Ok(value) => Json(DecodeResponse {
                decode_type: DecodeType::Json,
                body: value,
            })
            .into_response(),
            Err(e) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": format!("Invalid JSON body: {e}")})),
            )
                .into_response(),
        },
        DecodeType::Unknown => {
            tracing::warn!(accept = %header, "no decoder for Accept header");
            (
                StatusCode::NOT_ACCEPTABLE,
                Json(serde_json::json!({
                    "error": "No acceptable decoder",
                    "accept": header,
                })),
            )
                .into_response()
        },
    }
}
