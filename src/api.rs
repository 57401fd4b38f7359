use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use crate::app::Config;
use crate::clients::errors::{Error, Result};

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Failures a handler can end with, each mapped to a fixed status and body
#[derive(Debug)]
pub enum ApiError {
    Validation(&'static str),
    LyricsNotFound,
    Upstream {
        message: &'static str,
        source: Error,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::LyricsNotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "lyrics": null, "message": "Lyrics not found" })),
            )
                .into_response(),
            ApiError::Upstream { message, source } => {
                error!("{message}: {source}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": message })),
                )
                    .into_response()
            }
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct SearchParams {
    q: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct LyricsParams {
    artist: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct GradeRequest {
    lyrics: Option<String>,
}

fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn search(
    State(config): State<Config>,
    Query(params): Query<SearchParams>,
) -> std::result::Result<Json<Value>, ApiError> {
    let query = required(params.q.as_deref()).ok_or(ApiError::Validation("Query is required"))?;

    let body = config
        .catalog
        .search_tracks(query)
        .await
        .map_err(|source| ApiError::Upstream {
            message: "Failed to search for song",
            source,
        })?;
    Ok(Json(body))
}

async fn lyrics(
    State(config): State<Config>,
    Query(params): Query<LyricsParams>,
) -> std::result::Result<Json<Value>, ApiError> {
    let (Some(artist), Some(title)) = (
        required(params.artist.as_deref()),
        required(params.title.as_deref()),
    ) else {
        return Err(ApiError::Validation("Artist and title are required"));
    };

    match config.lyrics.resolve(artist, title).await {
        Some(lyrics) => Ok(Json(json!({ "lyrics": lyrics }))),
        None => Err(ApiError::LyricsNotFound),
    }
}

async fn grade(
    State(config): State<Config>,
    payload: std::result::Result<Json<GradeRequest>, JsonRejection>,
) -> std::result::Result<Json<Value>, ApiError> {
    // Forwarded as-is, only an absent or empty field is rejected
    let lyrics = payload
        .ok()
        .and_then(|Json(body)| body.lyrics)
        .filter(|l| !l.is_empty())
        .ok_or(ApiError::Validation("Lyrics are required"))?;

    let body = config
        .grader
        .grade(&lyrics)
        .await
        .map_err(|source| ApiError::Upstream {
            message: "Failed to grade lyrics",
            source,
        })?;
    Ok(Json(body))
}

pub fn router(config: Config) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", get(search))
        .route("/lyrics", get(lyrics))
        .route("/grade", post(grade))
        .layer(CorsLayer::permissive())
        .with_state(config)
}

pub async fn serve(config: Config, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Server is running on port {port}");
    axum::serve(listener, router(config)).await?;
    Ok(())
}
