//! Image serving endpoint
//!
//! Serves candidate images straight from their filesystem location (local
//! disk or network share) so the browser can preview them without the file
//! ever being copied or uploaded.

use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::path::Path;

use crate::{
    error::{ApiError, ApiResult},
    services::image_scanner::has_image_extension,
    AppState,
};

/// GET /images/serve query parameters
#[derive(Debug, Deserialize)]
pub struct ServeParams {
    /// Full filesystem path of the image (URL-encoded by the caller)
    pub path: String,
}

/// GET /images/serve?path=...
///
/// Only files carrying an image extension are served; anything else is
/// refused before touching the filesystem.
pub async fn serve_image(Query(params): Query<ServeParams>) -> ApiResult<Response> {
    let path = Path::new(&params.path);

    if !has_image_extension(path) {
        return Err(ApiError::BadRequest(format!(
            "Not a servable image: {}",
            params.path
        )));
    }

    if !path.is_file() {
        return Err(ApiError::NotFound(format!(
            "Image not found: {}",
            params.path
        )));
    }

    let content_type = match path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        _ => "image/jpeg",
    };

    let bytes = tokio::fs::read(path).await?;

    tracing::debug!(path = %params.path, bytes = bytes.len(), "Served image");

    Ok((
        StatusCode::OK,
        [
            ("content-type", content_type),
            ("cache-control", "no-cache, no-store, must-revalidate"),
        ],
        bytes,
    )
        .into_response())
}

/// Build image serving routes
pub fn image_routes() -> Router<AppState> {
    Router::new().route("/images/serve", get(serve_image))
}
