use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use bundle_dash::api::{AppState, construct_router};
use bundle_dash::config::AppConfig;
use bundle_dash::model::{
    BundleListing, BundleType, ByobListing, OrderRecord, OrderStatus, StoreRecord,
};
use bundle_dash::storage::{Repository, SqliteStorage};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;

const TOKEN: &str = "test-token";
const SHOP: &str = "alpha.myshopify.com";

fn order(id: &str, bundle_type: BundleType, revenue: f64, status: OrderStatus, days_ago: i64) -> OrderRecord {
    OrderRecord {
        id: id.to_string(),
        bundle_id: format!("bundle-{id}"),
        bundle_name: format!("Bundle {id}"),
        bundle_type: Some(bundle_type),
        revenue,
        discount_amount: 5.0,
        quantity: 1,
        status,
        created_at: Utc::now() - Duration::days(days_ago),
        customer_id: None,
        first_purchase: None,
    }
}

fn seeded_storage() -> SqliteStorage {
    let storage = SqliteStorage::in_memory().unwrap();
    let now = Utc::now();

    storage
        .save_store(&StoreRecord {
            myshopify_domain: SHOP.into(),
            shop: format!("https://{SHOP}"),
            name: "Alpha Goods".into(),
            url: Some("https://alpha.example".into()),
            currency_code: "USD".into(),
            plan_display_name: Some("Shopify Plus".into()),
            shopify_plus: true,
            created_at: Some(now - Duration::days(400)),
            contact_email: Some("owner@alpha.example".into()),
            email: Some("shop@alpha.example".into()),
            country: Some("US".into()),
            installed_at: Some(now - Duration::days(2)),
        })
        .unwrap();

    storage
        .save_bundle(&BundleListing {
            id: "b1".into(),
            user_id: "offline_alpha".into(),
            shop: SHOP.into(),
            bundle_name: "Summer Duo".into(),
            bundle_type: "fixed".into(),
            discount_type: Some("percentage".into()),
            discount_value: Some(10.0),
            product_handle: Some("summer-duo".into()),
            products: json!([{ "id": 1 }, { "id": 2 }]),
            status: Some("active".into()),
            created_at: now - Duration::days(5),
            shop_info: None,
        })
        .unwrap();

    storage
        .save_byob(&ByobListing {
            id: "y1".into(),
            user_id: "offline_alpha".into(),
            shop: SHOP.into(),
            bundle_name: "Pick Three".into(),
            bundle_type: "byob".into(),
            discount_type: None,
            discount_value: None,
            products: json!([]),
            product_status: Some("draft".into()),
            conditions: json!({}),
            tiers: json!([]),
            media: json!([]),
            created_at: now - Duration::days(1),
            shop_info: None,
        })
        .unwrap();

    for record in [
        order("1", BundleType::Fixed, 100.0, OrderStatus::Completed, 1),
        order("2", BundleType::Byob, 50.0, OrderStatus::Completed, 3),
        order("3", BundleType::Fixed, 30.0, OrderStatus::Cancelled, 2),
        order("4", BundleType::Infinite, 70.0, OrderStatus::Completed, 20),
    ] {
        storage.save_order(SHOP, &record).unwrap();
    }

    storage
}

fn app() -> Router {
    let repo: Arc<dyn Repository> = Arc::new(Mutex::new(seeded_storage()));
    construct_router(Arc::new(AppState {
        repo,
        config: Arc::new(AppConfig::default()),
        access_token: TOKEN.to_string(),
    }))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_needs_no_token() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn api_rejects_missing_and_wrong_tokens() {
    let missing = app()
        .oneshot(Request::builder().uri("/api/stores").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(missing).await["error"]["code"], "UNAUTHORIZED");

    let wrong = app()
        .oneshot(
            Request::builder()
                .uri("/api/stores")
                .header(header::AUTHORIZATION, "Bearer nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn analytics_for_unknown_store_is_not_found() {
    let response = app()
        .oneshot(get("/api/analytics/ghost.myshopify.com"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn weekly_analytics_skip_cancelled_and_older_orders() {
    let response = app()
        .oneshot(get(&format!("/api/analytics/{SHOP}?period=7")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let overview = &body["analytics"]["overview"];
    assert_eq!(body["period"], 7);
    assert_eq!(body["currency"], "USD");
    assert_eq!(body["shopInfo"]["name"], "Alpha Goods");
    assert_eq!(overview["totalRevenue"], 150.0);
    assert_eq!(overview["totalOrders"], 2);
    assert_eq!(overview["averageOrderValue"], 75.0);
    assert_eq!(overview["totalDiscounts"], 10.0);
    assert_eq!(body["analytics"]["bundleTypes"]["infinite"]["count"], 0);
    assert_eq!(body["analytics"]["bundleTypes"]["byob"]["revenue"], 50.0);
    assert_eq!(body["ranking"][0]["bundleId"], "bundle-1");
}

#[tokio::test]
async fn unsupported_period_falls_back_to_thirty_days() {
    let response = app()
        .oneshot(get(&format!("/api/analytics/{SHOP}?period=14")))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["period"], 30);
    assert_eq!(body["analytics"]["overview"]["totalRevenue"], 220.0);
}

#[tokio::test]
async fn bundle_listing_filters_and_reports_stats() {
    let response = app().oneshot(get("/api/bundles?status=active")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["filteredTotal"], 1);
    assert_eq!(body["items"][0]["bundleName"], "Summer Duo");
    assert_eq!(body["items"][0]["shopInfo"]["name"], "Alpha Goods");
    assert_eq!(body["stats"]["active"], 1);
    assert_eq!(body["stats"]["draft"], 1);
}

#[tokio::test]
async fn shop_bundles_lists_both_kinds() {
    let response = app().oneshot(get(&format!("/api/bundles/{SHOP}"))).await.unwrap();

    let body = body_json(response).await;
    assert_eq!(body["bundles"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["byobs"][0]["bundleType"], "byob");
}

#[tokio::test]
async fn store_export_is_a_csv_attachment() {
    let response = app().oneshot(get("/api/stores/export.csv")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"shopify-stores.csv\""
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("\"Store Name\""));
    assert!(lines.next().unwrap().starts_with("\"Alpha Goods\",\"https://alpha.myshopify.com\""));
}

#[tokio::test]
async fn store_listing_includes_overview() {
    let response = app().oneshot(get("/api/stores")).await.unwrap();

    let body = body_json(response).await;
    assert_eq!(body["items"][0]["myshopifyDomain"], SHOP);
    assert_eq!(body["items"][0]["bundleCounts"]["totalBundles"], 2);
    assert_eq!(body["items"][0]["installedAgo"], "2 days ago");
    assert_eq!(body["overview"]["plusStores"], 1);
}

#[tokio::test]
async fn unknown_routes_use_the_error_envelope() {
    let response = app()
        .oneshot(Request::builder().uri("/nowhere").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "No route for /nowhere");
}

#[tokio::test]
async fn lowercase_bearer_scheme_is_accepted() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/stores")
                .header(header::AUTHORIZATION, format!("bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
