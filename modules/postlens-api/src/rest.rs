use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use postlens_common::ScrapeError;
use postlens_scrapers::{Dispatcher, Operation};

pub struct AppState {
    pub dispatcher: Dispatcher,
}

#[derive(Deserialize)]
pub struct ScrapeRequest {
    pub url: Option<String>,
    pub platform: Option<String>,
    pub event_name: Option<String>,
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "OK", "service": "Scraper API" }))
}

pub async fn scrape(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScrapeRequest>,
) -> Response {
    handle(state, req, Operation::Post).await
}

pub async fn scrape_profile(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScrapeRequest>,
) -> Response {
    handle(state, req, Operation::Profile).await
}

/// Shared request flow for both operations. Input problems are 400s;
/// extraction failures come back as 200s carrying an `{error}` record,
/// exactly as the extractors report them.
async fn handle(state: Arc<AppState>, req: ScrapeRequest, operation: Operation) -> Response {
    let event_name = req.event_name.unwrap_or_default();

    let Some(url) = req.url.filter(|u| !u.is_empty()) else {
        return bad_request("URL is required");
    };
    if url::Url::parse(&url).is_err() {
        return bad_request("Invalid URL format");
    }

    let platform = req.platform.as_deref().filter(|p| !p.is_empty());
    info!(url = %url, platform = platform.unwrap_or("auto"), "Scrape request");

    let result = match platform {
        Some(platform) => state.dispatcher.dispatch(platform, operation, &url).await,
        None => state.dispatcher.dispatch_detected(operation, &url).await,
    };

    let mut body = match result {
        Ok(output) => serde_json::to_value(&output).unwrap_or_default(),
        Err(e @ ScrapeError::UnsupportedPlatform(_)) => {
            return bad_request(&e.to_string());
        }
        Err(e) => {
            warn!(url = %url, error = %e, "Scraping error");
            json!({ "error": e.to_string() })
        }
    };

    if let Some(obj) = body.as_object_mut() {
        obj.insert("event_name".to_string(), Value::String(event_name));
    }

    Json(body).into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}
