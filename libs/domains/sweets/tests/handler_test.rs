//! Handler tests for the Sweets domain
//!
//! These tests drive the `/sweets` router end to end:
//! - Public listing and search
//! - Token and role checks ahead of body parsing
//! - JSON and multipart forms
//! - Purchase and restock stock transitions
//!
//! They run against the in-memory repository, so no database is needed.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use axum_helpers::{AppError, AuthGate, Identity, IdentityProvider, JwtConfig, TokenService};
use domain_sweets::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // For oneshot()
use uuid::Uuid;

const SECRET: &str = "sweets-handler-secret-with-32-plus-chars";
const BOUNDARY: &str = "sweetshop-boundary";

struct StaticIdentities(HashMap<Uuid, Identity>);

#[async_trait]
impl IdentityProvider for StaticIdentities {
    async fn resolve(&self, user_id: Uuid) -> Result<Option<Identity>, AppError> {
        Ok(self.0.get(&user_id).cloned())
    }
}

struct FixedUrlStore;

#[async_trait]
impl MediaStore for FixedUrlStore {
    async fn upload(&self, path: &Path) -> Option<String> {
        assert!(path.exists());
        Some("https://cdn.example.com/sweet.png".to_string())
    }
}

struct Harness {
    repository: InMemorySweetRepository,
    media: Arc<dyn MediaStore>,
    gate: AuthGate,
    admin_token: String,
    user_token: String,
    admin_id: Uuid,
}

impl Harness {
    fn new() -> Self {
        Self::with_media(Arc::new(DisabledMediaStore))
    }

    fn with_media(media: Arc<dyn MediaStore>) -> Self {
        let tokens = TokenService::new(&JwtConfig::new(SECRET, Duration::from_secs(3600)).unwrap());
        let admin_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();

        let identities = HashMap::from([
            (admin_id, identity(admin_id, "admin")),
            (user_id, identity(user_id, "user")),
        ]);

        Self {
            repository: InMemorySweetRepository::new(),
            media,
            admin_token: tokens.issue(admin_id).unwrap(),
            user_token: tokens.issue(user_id).unwrap(),
            gate: AuthGate::new(tokens, Arc::new(StaticIdentities(identities))),
            admin_id,
        }
    }

    fn app(&self) -> axum::Router {
        let service = SweetService::new(self.repository.clone(), Arc::clone(&self.media));
        handlers::router(service, self.gate.clone())
    }

    async fn seed(&self, name: &str, price: f64, quantity: i64) -> Sweet {
        let sweet = Sweet::new(
            name.to_string(),
            "candy".to_string(),
            price,
            quantity,
            None,
            vec![self.admin_id],
        );
        self.repository.create(sweet).await.unwrap()
    }
}

fn identity(id: Uuid, role: &str) -> Identity {
    Identity {
        id,
        name: role.to_string(),
        email: format!("{}@example.com", role),
        role: role.to_string(),
    }
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn multipart(uri: &str, token: &str, fields: &[(&str, &str)], image: Option<&[u8]>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"sweet.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn names(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_list_is_public() {
    let harness = Harness::new();
    harness.seed("Toffee", 1.5, 3).await;

    let response = harness
        .app()
        .oneshot(request("GET", "/", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Sweets fetched successfully");
    assert_eq!(names(&body), vec!["Toffee"]);
}

#[tokio::test]
async fn test_add_requires_token() {
    let harness = Harness::new();

    let response = harness
        .app()
        .oneshot(request(
            "POST",
            "/",
            None,
            Some(json!({"name": "Fudge", "category": "candy", "price": 2.0, "quantity": 1})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(harness.repository.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_add_rejects_non_admin_before_reading_body() {
    let harness = Harness::new();

    // Malformed body: a 403 proves the role check ran first
    let response = harness
        .app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::AUTHORIZATION, format!("Bearer {}", harness.user_token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_add_sweet_as_admin() {
    let harness = Harness::new();

    let response = harness
        .app()
        .oneshot(request(
            "POST",
            "/",
            Some(&harness.admin_token),
            Some(json!({
                "name": "Fudge",
                "category": "candy",
                "price": 2.5,
                "quantity": 10,
                "admins": harness.admin_id
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["statusCode"], 201);
    assert_eq!(body["message"], "Sweet added successfully");
    assert_eq!(body["data"]["name"], "Fudge");
    assert_eq!(body["data"]["quantity"], 10);
    assert_eq!(body["data"]["admins"], json!([harness.admin_id.to_string()]));
}

#[tokio::test]
async fn test_add_with_missing_fields() {
    let harness = Harness::new();

    let response = harness
        .app()
        .oneshot(request(
            "POST",
            "/",
            Some(&harness.admin_token),
            Some(json!({"name": "Fudge", "price": 2.5})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "All fields are required");
}

#[tokio::test]
async fn test_add_duplicate_name() {
    let harness = Harness::new();
    harness.seed("Fudge", 1.0, 1).await;

    let response = harness
        .app()
        .oneshot(request(
            "POST",
            "/",
            Some(&harness.admin_token),
            Some(json!({"name": "Fudge", "category": "candy", "price": 2.0, "quantity": 1})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Sweet already exists");
}

#[tokio::test]
async fn test_add_rejects_negative_price() {
    let harness = Harness::new();

    let response = harness
        .app()
        .oneshot(request(
            "POST",
            "/",
            Some(&harness.admin_token),
            Some(json!({"name": "Fudge", "category": "candy", "price": -1.0, "quantity": 1})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["errors"][0]["field"], "price");
}

#[tokio::test]
async fn test_add_multipart_with_image() {
    let harness = Harness::with_media(Arc::new(FixedUrlStore));

    let response = harness
        .app()
        .oneshot(multipart(
            "/",
            &harness.admin_token,
            &[
                ("name", "Lollipop"),
                ("category", "candy"),
                ("price", "0.75"),
                ("quantity", "40"),
            ],
            Some(b"\x89PNG fake image bytes"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["data"]["price"], 0.75);
    assert_eq!(body["data"]["quantity"], 40);
    assert_eq!(body["data"]["image"], "https://cdn.example.com/sweet.png");
}

#[tokio::test]
async fn test_add_multipart_non_numeric_price() {
    let harness = Harness::new();

    let response = harness
        .app()
        .oneshot(multipart(
            "/",
            &harness.admin_token,
            &[
                ("name", "Lollipop"),
                ("category", "candy"),
                ("price", "cheap"),
                ("quantity", "40"),
            ],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(harness.repository.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_image_upload_failure_is_not_persisted() {
    let harness = Harness::new();

    let response = harness
        .app()
        .oneshot(multipart(
            "/",
            &harness.admin_token,
            &[
                ("name", "Lollipop"),
                ("category", "candy"),
                ("price", "1"),
                ("quantity", "1"),
            ],
            Some(b"bytes"),
        ))
        .await
        .unwrap();

    assert!(response.status().is_server_error());
    let body = json_body(response).await;
    assert_eq!(body["message"], "Failed to upload image");
    assert!(harness.repository.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_add_multipart_text_image_is_rejected() {
    let harness = Harness::with_media(Arc::new(FixedUrlStore));

    let response = harness
        .app()
        .oneshot(multipart(
            "/",
            &harness.admin_token,
            &[
                ("name", "Lollipop"),
                ("category", "candy"),
                ("price", "1"),
                ("quantity", "1"),
                ("image", "https://evil.example/x.png"),
            ],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["message"], "image must be an uploaded file");
    assert!(harness.repository.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_partial_fields() {
    let harness = Harness::new();
    let sweet = harness.seed("Toffee", 1.5, 3).await;

    let response = harness
        .app()
        .oneshot(request(
            "PUT",
            &format!("/{}", sweet.id),
            Some(&harness.admin_token),
            Some(json!({"price": 2.25})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Sweet updated successfully");
    assert_eq!(body["data"]["name"], "Toffee");
    assert_eq!(body["data"]["price"], 2.25);
    assert_eq!(body["data"]["quantity"], 3);
}

#[tokio::test]
async fn test_update_unknown_sweet() {
    let harness = Harness::new();

    let response = harness
        .app()
        .oneshot(request(
            "PUT",
            &format!("/{}", Uuid::new_v4()),
            Some(&harness.admin_token),
            Some(json!({"price": 2.25})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Sweet not found");
}

#[tokio::test]
async fn test_delete_returns_removed_sweet() {
    let harness = Harness::new();
    let sweet = harness.seed("Toffee", 1.5, 3).await;

    let response = harness
        .app()
        .oneshot(request(
            "DELETE",
            &format!("/{}", sweet.id),
            Some(&harness.admin_token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Sweet deleted");
    assert_eq!(body["data"]["name"], "Toffee");
    assert!(harness.repository.get_by_id(sweet.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_invalid_id() {
    let harness = Harness::new();

    let response = harness
        .app()
        .oneshot(request("DELETE", "/not-a-uuid", Some(&harness.admin_token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_purchase_until_out_of_stock() {
    let harness = Harness::new();
    let sweet = harness.seed("Gobstopper", 0.5, 1).await;
    let uri = format!("/{}/purchase", sweet.id);

    let first = harness
        .app()
        .oneshot(request("POST", &uri, Some(&harness.user_token), None))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let body = json_body(first).await;
    assert_eq!(body["message"], "Sweet purchased successfully");
    assert_eq!(body["data"]["quantity"], 0);

    let second = harness
        .app()
        .oneshot(request("POST", &uri, Some(&harness.user_token), None))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body = json_body(second).await;
    assert_eq!(body["message"], "Out of stock");

    let stored = harness.repository.get_by_id(sweet.id).await.unwrap().unwrap();
    assert_eq!(stored.quantity, 0);
}

#[tokio::test]
async fn test_purchase_requires_token() {
    let harness = Harness::new();
    let sweet = harness.seed("Gobstopper", 0.5, 1).await;

    let response = harness
        .app()
        .oneshot(request("POST", &format!("/{}/purchase", sweet.id), None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_restock_as_admin() {
    let harness = Harness::new();
    let sweet = harness.seed("Gobstopper", 0.5, 0).await;

    let response = harness
        .app()
        .oneshot(request(
            "POST",
            &format!("/{}/restock", sweet.id),
            Some(&harness.admin_token),
            Some(json!({"amount": 12})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Sweet restocked successfully");
    assert_eq!(body["data"]["quantity"], 12);
}

#[tokio::test]
async fn test_restock_rejects_non_positive_amount() {
    let harness = Harness::new();
    let sweet = harness.seed("Gobstopper", 0.5, 2).await;

    for body in [json!({"amount": 0}), json!({"amount": -4}), json!({})] {
        let response = harness
            .app()
            .oneshot(request(
                "POST",
                &format!("/{}/restock", sweet.id),
                Some(&harness.admin_token),
                Some(body),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Invalid restock amount");
    }
}

#[tokio::test]
async fn test_restock_without_body_is_missing_amount() {
    let harness = Harness::new();
    let sweet = harness.seed("Gobstopper", 0.5, 2).await;

    let response = harness
        .app()
        .oneshot(request(
            "POST",
            &format!("/{}/restock", sweet.id),
            Some(&harness.admin_token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Invalid restock amount");
    let stored = harness.repository.get_by_id(sweet.id).await.unwrap().unwrap();
    assert_eq!(stored.quantity, 2);
}

#[tokio::test]
async fn test_restock_forbidden_for_user() {
    let harness = Harness::new();
    let sweet = harness.seed("Gobstopper", 0.5, 2).await;

    let response = harness
        .app()
        .oneshot(request(
            "POST",
            &format!("/{}/restock", sweet.id),
            Some(&harness.user_token),
            Some(json!({"amount": 5})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_search_filters_and_sorts() {
    let harness = Harness::new();
    harness.seed("Dark Chocolate", 4.0, 1).await;
    harness.seed("Milk Chocolate", 2.0, 1).await;
    harness.seed("Jelly Bean", 1.0, 1).await;

    let response = harness
        .app()
        .oneshot(request(
            "GET",
            "/search?name=chocolate&maxPrice=5&sort=price_asc",
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(names(&body), vec!["Milk Chocolate", "Dark Chocolate"]);
}

#[tokio::test]
async fn test_search_blank_parameters_are_ignored() {
    let harness = Harness::new();
    harness.seed("Toffee", 1.5, 3).await;

    let response = harness
        .app()
        .oneshot(request("GET", "/search?name=&minPrice=", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(names(&body), vec!["Toffee"]);
}

#[tokio::test]
async fn test_search_invalid_price_is_bad_request() {
    let harness = Harness::new();

    let response = harness
        .app()
        .oneshot(request("GET", "/search?minPrice=abc", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_blank_sort_is_ignored() {
    let harness = Harness::new();
    harness.seed("Toffee", 1.5, 3).await;

    let response = harness
        .app()
        .oneshot(request("GET", "/search?sort=&name=toffee", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(names(&body), vec!["Toffee"]);
}

#[tokio::test]
async fn test_search_non_finite_price_is_bad_request() {
    let harness = Harness::new();
    harness.seed("Toffee", 1.5, 3).await;

    for uri in ["/search?minPrice=NaN", "/search?maxPrice=inf"] {
        let response = harness
            .app()
            .oneshot(request("GET", uri, None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}
