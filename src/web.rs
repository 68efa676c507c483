use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::photos::{self, PhotoDbError};
use crate::query::{self, QueryParams};
use crate::types::CameraRegistry;

pub mod pages;

pub struct WebState {
    pub config: AppConfig,
    pub registry: CameraRegistry,
    pub client: reqwest::Client,
}

pub async fn start_web_server(
    config: AppConfig,
    registry: CameraRegistry,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.forward_timeout_ms))
        .build()?;
    let port = config.web_port;
    let www_dir = config.www_dir.clone();
    let state = Arc::new(WebState {
        config,
        registry,
        client,
    });

    let app = Router::new()
        .route("/", get(admin_page))
        .route("/configure", get(handle_configure))
        .route("/photo", get(handle_photo))
        .route("/api/cameras", get(list_cameras))
        .with_state(state)
        // everything else comes straight off the photo archive
        .fallback_service(ServeDir::new(www_dir))
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("🌐 Admin server listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

/// The admin page: raw settings, an edit form per compatible camera, and a
/// photo link. The page's own query string supplies the pass key the submit
/// script forwards to `/configure`.
async fn admin_page(State(state): State<Arc<WebState>>, RawQuery(raw): RawQuery) -> Response {
    let params = match query::parse(raw.as_deref().unwrap_or(""), false) {
        Ok(params) => params,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    let pass_key = params.first("pass_key").unwrap_or("");

    match state.registry.load().await {
        Ok(cameras) => Html(pages::render_admin_page(&cameras, pass_key)).into_response(),
        Err(e) => {
            warn!("failed to load camera records: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Whether a configure request carries the right pass key. An empty
/// configured key disables the check.
fn authorized(params: &QueryParams, pass_key: &str) -> bool {
    if pass_key.is_empty() {
        return true;
    }
    params.first("pass_key") == Some(pass_key)
}

/// Forward an edited configuration to a camera and answer immediately.
///
/// The forward is fire-and-forget: it races with any other in-flight
/// submission for the same camera and only its log line reports the outcome.
async fn handle_configure(State(state): State<Arc<WebState>>, RawQuery(raw): RawQuery) -> Response {
    let params = match query::parse(raw.as_deref().unwrap_or(""), false) {
        Ok(params) => params,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    if !authorized(&params, &state.config.pass_key) {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    let camera = params.first("camera").unwrap_or("");
    let info = params.first("info").unwrap_or("");
    if camera.is_empty() || info.is_empty() {
        return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
    }

    let client = state.client.clone();
    let endpoint = camera.to_string();
    let body = info.to_string();
    tokio::spawn(async move {
        forward_configuration(client, endpoint, body).await;
    });

    (StatusCode::OK, "Configuration Sent").into_response()
}

async fn forward_configuration(client: reqwest::Client, endpoint: String, info: String) {
    let result = client
        .post(&endpoint)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(info)
        .send()
        .await;
    match result {
        Ok(response) => {
            info!("⚙️ Configuration forwarded to {}: {}", endpoint, response.status());
        }
        Err(e) => {
            warn!("⚙️ Configuration forward to {} failed: {}", endpoint, e);
        }
    }
}

/// The portion of a capture-database record to redirect the browser to,
/// starting at its `/cameras` component.
fn archive_web_path(record: &str) -> Option<&str> {
    record.find("/cameras").map(|at| &record[at..])
}

/// Resolve a photo by camera and signed index against the capture database.
async fn handle_photo(State(state): State<Arc<WebState>>, RawQuery(raw): RawQuery) -> Response {
    // both parameters are single-valued, so the flattened convention fits
    let params = match query::parse(raw.as_deref().unwrap_or(""), true) {
        Ok(params) => params,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let (camera, index) = match (params.first("camera"), params.first("index")) {
        (Some(camera), Some(index)) if !camera.is_empty() && !index.is_empty() => (camera, index),
        _ => return (StatusCode::BAD_REQUEST, "Missing parameters").into_response(),
    };
    let index: i64 = match index.parse() {
        Ok(index) => index,
        Err(_) => return (StatusCode::BAD_REQUEST, "Bad Request").into_response(),
    };

    let db_path = state.config.camera_db_path(camera);
    match photos::lookup(&db_path, index).await {
        Ok(record) => match archive_web_path(&record) {
            Some(path) => Redirect::to(path).into_response(),
            None => (StatusCode::BAD_REQUEST, "Unknown record index").into_response(),
        },
        Err(PhotoDbError::UnknownIndex) => {
            (StatusCode::BAD_REQUEST, "Unknown record index").into_response()
        }
        Err(PhotoDbError::Io(e)) => {
            warn!("capture database read failed for {camera}: {e}");
            (StatusCode::BAD_REQUEST, "Bad Request").into_response()
        }
    }
}

/// The camera records as JSON.
async fn list_cameras(State(state): State<Arc<WebState>>) -> Response {
    match state.registry.load().await {
        Ok(cameras) => {
            let count = cameras.len();
            Json(json!({
                "code": 200,
                "message": "OK",
                "data": {
                    "cameras": cameras,
                    "count": count
                }
            }))
            .into_response()
        }
        Err(e) => {
            warn!("failed to load camera records: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "code": 500,
                    "message": "failed to load camera records",
                    "data": null
                })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_configured_key_disables_the_check() {
        let params = query::parse("camera=c&info=i", false).unwrap();
        assert!(authorized(&params, ""));
    }

    #[test]
    fn matching_first_pass_key_authorizes() {
        let params = query::parse("pass_key=hunter2&camera=c", false).unwrap();
        assert!(authorized(&params, "hunter2"));
        // repeats only count through the first grouped value
        let params = query::parse("pass_key=wrong&pass_key=hunter2", false).unwrap();
        assert!(!authorized(&params, "hunter2"));
    }

    #[test]
    fn absent_or_empty_pass_key_is_rejected() {
        let params = query::parse("camera=c&info=i", false).unwrap();
        assert!(!authorized(&params, "hunter2"));
        let params = query::parse("pass_key=&camera=c", false).unwrap();
        assert!(!authorized(&params, "hunter2"));
    }

    #[test]
    fn archive_path_starts_at_cameras_component() {
        assert_eq!(
            archive_web_path("www/cameras/cam-7/001.jpg"),
            Some("/cameras/cam-7/001.jpg")
        );
        assert_eq!(archive_web_path("somewhere/else.jpg"), None);
    }
}
