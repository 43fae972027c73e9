#![allow(dead_code)]

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use server::{routes, ServerState};
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "Password123!";

pub struct TestApp {
    pub router: Router,
    pub uploads_dir: PathBuf,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Router over a fresh in-memory database and a throwaway uploads directory.
pub async fn spawn_app() -> anyhow::Result<TestApp> {
    let db = models::db::connect_in_memory().await?;
    let uploads_dir = std::env::temp_dir().join(format!("rental-listings-test-{}", Uuid::new_v4()));
    common::env::ensure_env(&uploads_dir).await?;

    let auth = configs::AuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: 1 };
    let api = configs::ApiConfig { uploads_dir: uploads_dir.display().to_string(), ..Default::default() };
    let state = ServerState::new(db, &auth, &api);
    Ok(TestApp { router: routes::build_router(state, &api), uploads_dir })
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> anyhow::Result<TestResponse> {
        let resp = self.router.clone().oneshot(req).await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        Ok(TestResponse { status, headers, body })
    }

    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> anyhow::Result<TestResponse> {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header("authorization", format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req.header("content-type", "application/json").body(Body::from(serde_json::to_vec(&body)?))?,
            None => req.body(Body::empty())?,
        };
        self.send(req).await
    }

    pub async fn get(&self, uri: &str) -> anyhow::Result<TestResponse> {
        self.call(Method::GET, uri, None, None).await
    }

    /// Registers `email` and returns its token.
    pub async fn register(&self, email: &str) -> anyhow::Result<String> {
        let body = json!({"name": "Test User", "email": email, "password": PASSWORD, "phone": "+15551234567"});
        let resp = self.call(Method::POST, "/api/v1/auth/register", None, Some(body)).await?;
        anyhow::ensure!(resp.status == StatusCode::CREATED, "register failed: {}", resp.body);
        Ok(resp.body["data"]["token"].as_str().unwrap_or_default().to_string())
    }

    /// Creates a listing and returns its id.
    pub async fn create_listing(&self, token: &str, body: Value) -> anyhow::Result<String> {
        let resp = self.call(Method::POST, "/api/v1/apartments", Some(token), Some(body)).await?;
        anyhow::ensure!(resp.status == StatusCode::CREATED, "create failed: {}", resp.body);
        Ok(resp.body["data"]["id"].as_str().unwrap_or_default().to_string())
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.uploads_dir);
    }
}

pub fn listing(unit_number: &str, project: &str, price: f64, bedrooms: i32) -> Value {
    json!({
        "unitName": format!("{project} {unit_number}"),
        "unitNumber": unit_number,
        "project": project,
        "description": "Corner unit with plenty of light",
        "bedrooms": bedrooms,
        "bathrooms": 1.5,
        "squareFootage": 900,
        "price": price,
        "address": "100 Main St",
        "city": "Austin",
        "state": "TX",
        "zipCode": "73301",
        "amenities": ["Gym"],
        "petPolicy": "allowed",
        "parkingSpaces": 1,
        "leaseTerms": ["12 months"],
        "contactEmail": "leasing@example.com",
        "contactPhone": "+15125550100"
    })
}
