//! Integration tests for pim-ir API endpoints
//!
//! Drives the real router in-process against an in-memory database and
//! tempfile image trees.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::json;
use tower::util::ServiceExt;

use pim_ir::models::{ImageFile, ProductRecord};

/// Test helper: create test app with in-memory database
async fn create_test_app() -> (axum::Router, sqlx::SqlitePool) {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    pim_ir::db::init_tables(&pool)
        .await
        .expect("Failed to initialize database schema");

    let state = pim_ir::AppState::new(pool.clone());
    let app = pim_ir::build_router(state);

    (app, pool)
}

fn record(id: &str) -> ProductRecord {
    ProductRecord {
        id: id.to_string(),
        sku: None,
        photo_id: None,
        name_en: None,
        name_es: None,
        name: None,
        category: None,
        image: None,
    }
}

async fn seed(pool: &sqlx::SqlitePool, product: &ProductRecord, archived: bool) {
    pim_ir::db::products::upsert_product(pool, product, archived)
        .await
        .expect("Failed to seed product");
}

/// Test helper: build a product photo tree with a nested folder and
/// non-image litter
fn create_test_image_tree() -> tempfile::TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    std::fs::write(temp_dir.path().join("ABC123.jpg"), b"fake jpeg data").unwrap();
    std::fs::write(temp_dir.path().join("notes.txt"), b"not an image").unwrap();

    let nested = temp_dir.path().join("warehouse");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::write(nested.join("valvula_hidraulica.png"), b"fake png data").unwrap();
    std::fs::write(nested.join("stray.jpeg"), b"fake stray data").unwrap();

    temp_dir
}

async fn post_scan(app: axum::Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reconcile/scan")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _pool) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "pim-ir");
}

#[tokio::test]
async fn test_scan_rejects_missing_path() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = post_scan(app, json!({ "imagePath": "   " })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_scan_rejects_nonexistent_path() {
    let (app, _pool) = create_test_app().await;

    let (status, json) =
        post_scan(app, json!({ "imagePath": "/definitely/not/a/real/path" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_scan_happy_path() {
    let (app, pool) = create_test_app().await;
    let temp_dir = create_test_image_tree();

    let mut by_sku = record("prod-1");
    by_sku.sku = Some("ABC-123".to_string());
    seed(&pool, &by_sku, false).await;

    let mut by_name = record("prod-2");
    by_name.name_es = Some("Valvula Hidraulica Pesada".to_string());
    seed(&pool, &by_name, false).await;

    seed(&pool, &record("prod-3"), false).await;

    let (status, json) = post_scan(
        app,
        json!({ "imagePath": temp_dir.path().to_str().unwrap() }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    // notes.txt never enters any list
    assert_eq!(json["scannedFiles"], 3);
    assert_eq!(json["total"], 2);

    let products = json["products"].as_array().unwrap();
    assert_eq!(products.len(), 2);

    // Catalog order is preserved; flattened product fields sit beside the
    // candidate list
    assert_eq!(products[0]["id"], "prod-1");
    assert_eq!(products[0]["sku"], "ABC-123");
    let candidates = products[0]["candidateImages"].as_array().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["filename"], "ABC123.jpg");
    assert!(candidates[0]["url"]
        .as_str()
        .unwrap()
        .starts_with("/images/serve?path="));

    assert_eq!(products[1]["id"], "prod-2");
    assert_eq!(
        products[1]["candidateImages"][0]["filename"],
        "valvula_hidraulica.png"
    );
    assert_eq!(
        products[1]["candidateImages"][0]["relativePath"],
        "warehouse/valvula_hidraulica.png"
    );

    let unmatched = json["unmatchedImages"].as_array().unwrap();
    assert_eq!(unmatched.len(), 1);
    assert_eq!(unmatched[0]["filename"], "stray.jpeg");
}

#[tokio::test]
async fn test_scan_includes_archived_by_default() {
    let (app, pool) = create_test_app().await;
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(temp_dir.path().join("OLD99.jpg"), b"fake").unwrap();

    let mut archived = record("prod-old");
    archived.sku = Some("OLD99".to_string());
    seed(&pool, &archived, true).await;

    let (status, json) = post_scan(
        app,
        json!({ "imagePath": temp_dir.path().to_str().unwrap() }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1);
    assert_eq!(json["products"][0]["id"], "prod-old");
}

#[tokio::test]
async fn test_scan_can_exclude_archived() {
    let (app, pool) = create_test_app().await;
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(temp_dir.path().join("OLD99.jpg"), b"fake").unwrap();

    let mut archived = record("prod-old");
    archived.sku = Some("OLD99".to_string());
    seed(&pool, &archived, true).await;

    let (status, json) = post_scan(
        app,
        json!({
            "imagePath": temp_dir.path().to_str().unwrap(),
            "includeArchived": false
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 0);
    assert_eq!(json["unmatchedImages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_serve_image_round_trip() {
    let (app, _pool) = create_test_app().await;
    let temp_dir = tempfile::tempdir().unwrap();
    let image_path = temp_dir.path().join("front view.png");
    std::fs::write(&image_path, b"\x89PNG fake bytes").unwrap();

    // Build the URL exactly the way scan responses do
    let image = ImageFile {
        filename: "front view.png".to_string(),
        full_path: image_path.clone(),
        relative_path: "front view.png".into(),
    };
    let url = pim_ir::services::serve_url(&image);

    let response = app
        .oneshot(Request::builder().uri(url).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/png"
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"\x89PNG fake bytes");
}

#[tokio::test]
async fn test_serve_image_refuses_non_image_extension() {
    let (app, _pool) = create_test_app().await;
    let temp_dir = tempfile::tempdir().unwrap();
    let secret = temp_dir.path().join("secret.txt");
    std::fs::write(&secret, b"do not serve").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/images/serve?path={}",
                    urlencoding::encode(secret.to_str().unwrap())
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_serve_image_missing_file() {
    let (app, _pool) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/images/serve?path=%2Fno%2Fsuch%2Ffile.jpg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
