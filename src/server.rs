use std::{path::PathBuf, sync::Arc};

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{debug, warn};
use serde::Serialize;
use tokio::net::TcpListener;

use crate::{
    clients::entities::Track,
    recommender::{RecommendationError, RecommendationRequest, Recommender},
};

/// Body absent or not JSON
pub const MISSING_BODY: &str = "Bad Request - must send a JSON body with track and artist";
/// An artist name missing or empty
pub const MISSING_ARTISTS: &str = "Bad Request - must pass 3 artists";
/// Token acquisition failed
pub const TOKEN_FAILED: &str = "Something went wrong when fetching access token";
/// An artist search call failed
pub const SEARCH_FAILED: &str = "Error when searching artists";
/// Recommendation call returned no tracks
pub const NO_RECOMMENDATIONS: &str = "No recommendations found.";
/// Recommendation call failed
pub const RECOMMENDATIONS_FAILED: &str = "Something went wrong when fetching recommendations";

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    recommender: Arc<Recommender>,
    public_dir: PathBuf,
}

impl AppState {
    /// State serving `index.html` from `public_dir`.
    pub fn new(recommender: Recommender, public_dir: impl Into<PathBuf>) -> Self {
        AppState {
            recommender: Arc::new(recommender),
            public_dir: public_dir.into(),
        }
    }
}

#[derive(Serialize, Debug)]
struct MessageBody {
    message: String,
}

#[derive(Serialize, Debug)]
struct TracksBody {
    tracks: Vec<Track>,
}

fn message(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(MessageBody {
            message: message.into(),
        }),
    )
        .into_response()
}

// Fixed client-facing messages; upstream details stay in the log
impl IntoResponse for RecommendationError {
    fn into_response(self) -> Response {
        match self {
            RecommendationError::Validation(_) => message(StatusCode::BAD_REQUEST, MISSING_ARTISTS),
            RecommendationError::UpstreamAuth => {
                message(StatusCode::INTERNAL_SERVER_ERROR, TOKEN_FAILED)
            }
            RecommendationError::NotFound { artist } => message(
                StatusCode::NOT_FOUND,
                format!("Songs by {artist} not found."),
            ),
            RecommendationError::UpstreamSearch { .. } => {
                message(StatusCode::INTERNAL_SERVER_ERROR, SEARCH_FAILED)
            }
            RecommendationError::NoRecommendations => {
                message(StatusCode::NOT_FOUND, NO_RECOMMENDATIONS)
            }
            RecommendationError::UpstreamRecommendation => {
                message(StatusCode::INTERNAL_SERVER_ERROR, RECOMMENDATIONS_FAILED)
            }
        }
    }
}

/// `GET /` and `POST /recommendations`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/recommendations", post(recommendations))
        .with_state(state)
}

/// Serve the router on `listener` until the server stops.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}

async fn index(State(state): State<AppState>) -> Response {
    let path = state.public_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            warn!("Cannot serve {}: {e}", path.display());
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn recommendations(
    State(state): State<AppState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            debug!("Rejected recommendations body: {rejection}");
            return message(StatusCode::BAD_REQUEST, MISSING_BODY);
        }
    };

    match state.recommender.recommend(&request).await {
        Ok(tracks) => Json(TracksBody { tracks }).into_response(),
        Err(e) => e.into_response(),
    }
}
