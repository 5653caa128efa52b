//! REST endpoints for Sveriges Radio
//!
//! Both endpoints are read-only and take no parameters. Upstream failures
//! answer `502 Bad Gateway` (`504 Gateway Timeout` when the upstream timed
//! out) with `{"error": "..."}` and no partial data.

use crate::dto::{SongDto, TrafficMessageDto};
use crate::error::Error;
use crate::server_ext::SverigesRadioState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};

// ============ Error handling ============

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Upstream returned status 503 Service Unavailable for https://api.sr.se/api/v2/programs/index?format=json")]
    pub error: String,
}

/// Error returned by the handlers
#[derive(Debug)]
pub struct AppError(Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_timeout() {
            StatusCode::GATEWAY_TIMEOUT
        } else if self.0.is_upstream() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!(status = %status, "Request failed: {}", self.0);

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

/// Creates the router of the Sveriges Radio API
///
/// Paths are relative: the server nests them under `/api/v1`.
pub fn create_router(state: SverigesRadioState) -> Router {
    Router::new()
        .route("/programs/aggregated-songs", get(aggregated_songs))
        .route("/traffic/messages", get(traffic_messages))
        .with_state(state)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Song currently (or last) played on every channel
///
/// Songs come in completion order, not in channel order.
#[utoipa::path(
    get,
    path = "/api/v1/programs/aggregated-songs",
    tag = "programs",
    responses(
        (status = 200, description = "One song per channel with something to report", body = Vec<SongDto>),
        (status = 502, description = "Upstream API failure, or every channel failed", body = ErrorResponse),
        (status = 504, description = "Upstream API timeout", body = ErrorResponse),
    )
)]
pub async fn aggregated_songs(
    State(state): State<SverigesRadioState>,
) -> Result<Json<Vec<SongDto>>, AppError> {
    let aggregate = state.aggregator.aggregate().await?;
    if !aggregate.failed_channels.is_empty() {
        warn!(
            failed = aggregate.failed_channels.len(),
            channels = ?aggregate.failed_channels,
            "Partial song aggregation"
        );
    }
    Ok(Json(aggregate.songs.into_iter().map(SongDto::from).collect()))
}

/// Latest traffic messages, in upstream order
#[utoipa::path(
    get,
    path = "/api/v1/traffic/messages",
    tag = "traffic",
    responses(
        (status = 200, description = "Traffic messages", body = Vec<TrafficMessageDto>),
        (status = 502, description = "Upstream API failure", body = ErrorResponse),
        (status = 504, description = "Upstream API timeout", body = ErrorResponse),
    )
)]
pub async fn traffic_messages(
    State(state): State<SverigesRadioState>,
) -> Result<Json<Vec<TrafficMessageDto>>, AppError> {
    let messages = state.traffic.latest_messages().await?;
    Ok(Json(messages.into_iter().map(TrafficMessageDto::from).collect()))
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SR Aggregator API",
        version = "1.0.0",
        description = "Now playing songs and traffic messages from Sveriges Radio",
    ),
    paths(aggregated_songs, traffic_messages),
    components(schemas(SongDto, TrafficMessageDto, ErrorResponse)),
    tags(
        (name = "programs", description = "Songs aggregated across all channels"),
        (name = "traffic", description = "Traffic messages")
    )
)]
pub struct ApiDoc;
