//! Router-level tests for the JSON API. The provider is left unconfigured,
//! so search responses exercise the degraded (local-data-only) path.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::Set;
use std::sync::Arc;
use tower::ServiceExt;

use vendry::config::Config;
use vendry::entities::social_vendors;

async fn spawn_app() -> (Arc<vendry::api::AppState>, Router) {
    let db_path = std::env::temp_dir().join(format!("vendry-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.dataforseo.enabled = false;
    config.instagram.enabled = false;
    config.scheduler.enabled = false;
    config.retry.max_attempts = 1;
    config.retry.base_delay_ms = 1;

    let state = vendry::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");

    let router = vendry::api::router(state.clone()).await;
    (state, router)
}

async fn seed_dallas_vendors(state: &vendry::api::AppState) {
    state
        .shared
        .store
        .add_vendor(vendry::db::approved_listing(
            "Claimed Studio",
            "photographers",
            Some("wedding"),
            "Dallas",
            "Texas",
        ))
        .await
        .expect("seed local vendor");

    state
        .shared
        .store
        .upsert_social_vendor(social_vendors::ActiveModel {
            instagram_handle: Set("goldenhourdallas".to_string()),
            business_name: Set("Golden Hour Dallas".to_string()),
            bio: Set(Some("Dallas wedding photographer".to_string())),
            category: Set("photographers".to_string()),
            subcategory: Set(None),
            city: Set("Dallas".to_string()),
            state: Set("Texas".to_string()),
            phone: Set(None),
            email: Set(None),
            website_url: Set(None),
            profile_image_url: Set(None),
            follower_count: Set(Some(1200)),
            has_contact_info: Set(false),
            fetched_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        })
        .await
        .expect("seed social vendor");
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn search_rejects_missing_required_fields() {
    let (_, app) = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/search")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "category": "photographers",
                        "city": "   ",
                        "state": "TX"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], serde_json::json!(false));
}

#[tokio::test]
async fn search_degrades_to_local_data_without_provider() {
    let (state, app) = spawn_app().await;
    seed_dallas_vendors(&state).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/search")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "category": "photographers",
                        "city": "Dallas",
                        "state": "TX"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["success"], serde_json::json!(true));
    let data = &json["data"];
    assert_eq!(data["partial"], serde_json::json!(true));
    assert_eq!(data["total_results"], serde_json::json!(2));
    assert_eq!(data["source_breakdown"]["local"], serde_json::json!(1));
    assert_eq!(data["source_breakdown"]["social"], serde_json::json!(1));

    // Claimed vendors come first.
    let results = data["results"].as_array().unwrap();
    assert_eq!(results[0]["source"], serde_json::json!("local"));
    assert_eq!(results[0]["name"], serde_json::json!("Claimed Studio"));
    assert_eq!(results[1]["source"], serde_json::json!("social"));
}

#[tokio::test]
async fn search_applies_subcategory_filter_to_local_rows() {
    let (state, app) = spawn_app().await;
    seed_dallas_vendors(&state).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/search")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "category": "photographers",
                        "city": "Dallas",
                        "state": "TX",
                        "subcategory": "wedding"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    // Both seeded rows mention weddings, so both survive the filter.
    assert_eq!(json["data"]["total_results"], serde_json::json!(2));
}

#[tokio::test]
async fn vendors_endpoint_lists_approved_rows() {
    let (state, app) = spawn_app().await;
    seed_dallas_vendors(&state).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/vendors?category=photographers&limit=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let vendors = json["data"].as_array().unwrap();
    assert_eq!(vendors.len(), 1);
    assert_eq!(vendors[0]["name"], serde_json::json!("Claimed Studio"));
    assert_eq!(vendors[0]["source"], serde_json::json!("local"));
}

#[tokio::test]
async fn vendors_endpoint_rejects_bad_limit() {
    let (_, app) = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/vendors?limit=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn system_status_reports_counts() {
    let (state, app) = spawn_app().await;
    seed_dallas_vendors(&state).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/system/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["vendors"], serde_json::json!(1));
    assert_eq!(data["social_vendors"], serde_json::json!(1));
    assert_eq!(data["cached_searches"], serde_json::json!(0));
    assert_eq!(data["scheduler_enabled"], serde_json::json!(false));
}

#[tokio::test]
async fn health_endpoints_respond() {
    let (_, app) = spawn_app().await;

    let live = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/system/health/live")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(live.status(), StatusCode::OK);

    let ready = app
        .oneshot(
            Request::builder()
                .uri("/api/system/health/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
    let json = body_json(ready).await;
    assert_eq!(json["data"]["ready"], serde_json::json!(true));
}

#[tokio::test]
async fn refresh_trigger_with_empty_cache_is_noop() {
    let (_, app) = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/tasks/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["refreshed"], serde_json::json!(0));
    assert_eq!(json["data"]["failed"], serde_json::json!(0));
}

#[tokio::test]
async fn locations_endpoints_start_empty() {
    let (_, app) = spawn_app().await;

    let states = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/locations/states")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(states.status(), StatusCode::OK);
    let json = body_json(states).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);

    let cities = app
        .oneshot(
            Request::builder()
                .uri("/api/locations/Texas/cities")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(cities.status(), StatusCode::OK);
}
