//! Reconciliation scan API handler
//!
//! POST /reconcile/scan walks a directory tree of product photos and pairs
//! every catalog product with its candidate images.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    db,
    error::{ApiError, ApiResult},
    models::{ImageFile, ProductMatches},
    services::{self, ImageScanner},
    AppState,
};

/// POST /reconcile/scan request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    /// Root directory to scan for product photos
    pub image_path: String,

    /// Whether archived products take part in the scan. Defaults to true:
    /// the reconciliation scan has always seen the whole catalog, and
    /// excluding archived rows is an explicit opt-in.
    #[serde(default = "default_include_archived")]
    pub include_archived: bool,
}

fn default_include_archived() -> bool {
    true
}

/// POST /reconcile/scan response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub success: bool,

    /// Products with at least one candidate image, in catalog order
    pub products: Vec<ProductMatches>,

    /// Discovered images no product claimed
    pub unmatched_images: Vec<ImageFile>,

    /// Number of products with candidates
    pub total: usize,

    /// Number of image files discovered under the root
    pub scanned_files: usize,
}

/// POST /reconcile/scan
///
/// Validates the scan root, loads the catalog, walks the tree, and runs the
/// matching pass. The result is recomputed in full on every call.
pub async fn scan(
    State(state): State<AppState>,
    Json(request): Json<ScanRequest>,
) -> ApiResult<Json<ScanResponse>> {
    match run_scan(&state, &request).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => {
            *state.last_error.write().await = Some(err.to_string());
            Err(err)
        }
    }
}

async fn run_scan(state: &AppState, request: &ScanRequest) -> ApiResult<ScanResponse> {
    let image_path = request.image_path.trim();
    if image_path.is_empty() {
        return Err(ApiError::BadRequest("Image path is required".to_string()));
    }

    let root = Path::new(image_path);
    if !root.exists() {
        return Err(ApiError::BadRequest(format!(
            "Image path does not exist: {}",
            image_path
        )));
    }
    if !root.is_dir() {
        return Err(ApiError::BadRequest(format!(
            "Image path is not a directory: {}",
            image_path
        )));
    }

    let products = db::products::load_products(&state.db, request.include_archived).await?;
    let images = ImageScanner::new().scan(root)?;
    let scanned_files = images.len();

    let report = services::match_products(&products, &images, services::serve_url);

    tracing::info!(
        root = %root.display(),
        products = products.len(),
        scanned_files,
        matched = report.matched.len(),
        unmatched = report.unmatched_images.len(),
        "Reconciliation scan complete"
    );

    Ok(ScanResponse {
        success: true,
        total: report.matched.len(),
        products: report.matched,
        unmatched_images: report.unmatched_images,
        scanned_files,
    })
}

/// Build reconciliation routes
pub fn reconcile_routes() -> Router<AppState> {
    Router::new().route("/reconcile/scan", post(scan))
}
