mod support;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use support::{listing, spawn_app};

const BOUNDARY: &str = "----rental-listings-boundary";

fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes());
    }
    for (file_name, content_type, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn form_fields(value: &Value) -> Vec<(String, String)> {
    value
        .as_object()
        .into_iter()
        .flatten()
        .map(|(k, v)| {
            let text = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), text)
        })
        .collect()
}

fn multipart_request(method: Method, uri: &str, token: &str, body: Vec<u8>) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))?)
}

fn uploads_in(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir.join("apartments")).map(|d| d.count()).unwrap_or(0)
}

#[tokio::test]
async fn create_then_read_round_trip() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = app.register("owner@example.com").await?;

    let resp = app.call(Method::POST, "/api/v1/apartments", Some(&token), Some(listing("A-1", "Harbor", 1800.0, 2))).await?;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.body["message"], "Apartment created successfully");
    let created = resp.body["data"].clone();
    assert_eq!(created["isAvailable"], true);
    assert_eq!(created["petPolicy"], "allowed");

    let id = created["id"].as_str().unwrap();
    let resp = app.get(&format!("/api/v1/apartments/{id}")).await?;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"], created);
    Ok(())
}

#[tokio::test]
async fn creating_requires_authentication() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let resp = app.call(Method::POST, "/api/v1/apartments", None, Some(listing("A-1", "Harbor", 1800.0, 2))).await?;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["message"], "Access token is required");
    Ok(())
}

#[tokio::test]
async fn invalid_listing_reports_fields() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = app.register("owner@example.com").await?;

    let mut body = listing("A-1", "Harbor", -5.0, 14);
    body["leaseTerms"] = json!([]);
    let resp = app.call(Method::POST, "/api/v1/apartments", Some(&token), Some(body)).await?;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Validation failed");
    let fields: Vec<&str> = resp.body["errors"].as_array().unwrap().iter().filter_map(|e| e["field"].as_str()).collect();
    assert_eq!(fields, ["bedrooms", "price", "leaseTerms"]);
    Ok(())
}

#[tokio::test]
async fn update_preserves_untouched_fields() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = app.register("owner@example.com").await?;
    let id = app.create_listing(&token, listing("A-1", "Harbor", 1800.0, 2)).await?;

    let resp = app
        .call(Method::PUT, &format!("/api/v1/apartments/{id}"), Some(&token), Some(json!({"price": 2100, "isAvailable": false})))
        .await?;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Apartment updated successfully");
    let data = &resp.body["data"];
    assert_eq!(data["price"], 2100.0);
    assert_eq!(data["isAvailable"], false);
    assert_eq!(data["unitNumber"], "A-1");
    assert_eq!(data["bedrooms"], 2);
    assert_eq!(data["amenities"], json!(["Gym"]));
    Ok(())
}

#[tokio::test]
async fn only_the_owner_may_mutate() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let owner = app.register("owner@example.com").await?;
    let intruder = app.register("intruder@example.com").await?;
    let id = app.create_listing(&owner, listing("A-1", "Harbor", 1800.0, 2)).await?;
    let uri = format!("/api/v1/apartments/{id}");

    let resp = app.call(Method::PUT, &uri, Some(&intruder), Some(json!({"price": 1}))).await?;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.body["message"], "You can only update your own apartments");

    let resp = app.call(Method::DELETE, &uri, Some(&intruder), None).await?;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.body["message"], "You can only delete your own apartments");

    let resp = app.get(&uri).await?;
    assert_eq!(resp.body["data"]["price"], 1800.0);
    Ok(())
}

#[tokio::test]
async fn delete_removes_the_listing() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = app.register("owner@example.com").await?;
    let id = app.create_listing(&token, listing("A-1", "Harbor", 1800.0, 2)).await?;
    let uri = format!("/api/v1/apartments/{id}");

    let resp = app.call(Method::DELETE, &uri, Some(&token), None).await?;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Apartment deleted successfully");

    let resp = app.get(&uri).await?;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["message"], "Apartment not found");
    Ok(())
}

#[tokio::test]
async fn duplicate_unit_in_project_is_a_conflict() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = app.register("owner@example.com").await?;
    app.create_listing(&token, listing("A-1", "Harbor", 1800.0, 2)).await?;

    let resp = app.call(Method::POST, "/api/v1/apartments", Some(&token), Some(listing("A-1", "Harbor", 900.0, 1))).await?;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.body["message"], "Apartment with this unit number already exists in this project");

    // Same unit number in another project is fine.
    app.create_listing(&token, listing("A-1", "Lakeside", 900.0, 1)).await?;
    Ok(())
}

#[tokio::test]
async fn malformed_and_unknown_ids() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    let resp = app.get("/api/v1/apartments/not-a-uuid").await?;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Invalid ID format");

    let resp = app.get(&format!("/api/v1/apartments/{}", uuid::Uuid::new_v4())).await?;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn list_filters_sorts_and_paginates() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = app.register("owner@example.com").await?;
    app.create_listing(&token, listing("A-1", "Harbor", 1800.0, 2)).await?;
    app.create_listing(&token, listing("A-2", "Harbor", 950.0, 0)).await?;
    app.create_listing(&token, listing("B-1", "Lakeside", 2600.0, 3)).await?;

    let resp = app.get("/api/v1/apartments?limit=2&sortBy=price&sortOrder=asc").await?;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["pagination"], json!({"page": 1, "limit": 2, "total": 3, "pages": 2}));
    let prices: Vec<f64> = resp.body["data"].as_array().unwrap().iter().filter_map(|a| a["price"].as_f64()).collect();
    assert_eq!(prices, [950.0, 1800.0]);

    let resp = app.get("/api/v1/apartments?project=harbor&minPrice=1000").await?;
    let units: Vec<&str> = resp.body["data"].as_array().unwrap().iter().filter_map(|a| a["unitNumber"].as_str()).collect();
    assert_eq!(units, ["A-1"]);

    let resp = app.get("/api/v1/apartments?bedrooms=3").await?;
    assert_eq!(resp.body["pagination"]["total"], 1);

    let resp = app.get("/api/v1/apartments?page=3&limit=2").await?;
    assert_eq!(resp.body["data"], json!([]));
    assert_eq!(resp.body["pagination"]["pages"], 2);
    Ok(())
}

#[tokio::test]
async fn bad_query_parameters_are_field_errors() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let resp = app.get("/api/v1/apartments?limit=0&sortBy=rent").await?;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["errors"][0], json!({"field": "limit", "message": "Limit must be between 1 and 100"}));
    assert_eq!(resp.body["errors"][1]["field"], "sortBy");
    Ok(())
}

#[tokio::test]
async fn huge_page_numbers_are_rejected_not_overflowed() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = app.register("pager@example.com").await?;
    app.create_listing(&token, listing("P-1", "Harbor", 1500.0, 1)).await?;

    let page = u64::MAX;
    for uri in [
        format!("/api/v1/apartments?page={page}"),
        format!("/api/v1/apartments/search?q=harbor&page={page}"),
    ] {
        let resp = app.get(&uri).await?;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(resp.body["errors"][0], json!({"field": "page", "message": "Page must be a positive integer"}));
    }
    let resp = app.call(Method::GET, &format!("/api/v1/apartments/my-apartments?page={page}"), Some(&token), None).await?;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["errors"][0]["field"], "page");

    let last = service::pagination::MAX_PAGE;
    let resp = app.get(&format!("/api/v1/apartments?page={last}&limit=100")).await?;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"], json!([]));
    assert_eq!(resp.body["pagination"]["total"], 1);
    Ok(())
}

#[tokio::test]
async fn my_apartments_only_lists_the_callers() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let me = app.register("me@example.com").await?;
    let other = app.register("other@example.com").await?;
    app.create_listing(&me, listing("A-1", "Harbor", 1800.0, 2)).await?;
    app.create_listing(&other, listing("B-1", "Harbor", 1900.0, 2)).await?;

    let resp = app.call(Method::GET, "/api/v1/apartments/my-apartments", Some(&me), None).await?;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["pagination"]["total"], 1);
    assert_eq!(resp.body["data"][0]["unitNumber"], "A-1");

    let resp = app.get("/api/v1/apartments/my-apartments").await?;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn stats_and_search() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = app.register("owner@example.com").await?;
    app.create_listing(&token, listing("A-1", "Harbor", 1000.0, 1)).await?;
    app.create_listing(&token, listing("A-2", "Harbor", 3000.0, 2)).await?;
    let mut lake = listing("B-1", "Lakeside", 2000.0, 2);
    lake["description"] = json!("Quiet lakeside retreat near the lake trail");
    app.create_listing(&token, lake).await?;

    let resp = app.get("/api/v1/apartments/stats").await?;
    assert_eq!(resp.status, StatusCode::OK);
    let stats = &resp.body["data"];
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["available"], 3);
    assert_eq!(stats["averagePrice"], 2000.0);
    assert_eq!(stats["priceRange"], json!({"min": 1000.0, "max": 3000.0}));
    assert_eq!(stats["bedroomDistribution"], json!({"1": 1, "2": 2}));
    assert_eq!(stats["projectCounts"], json!({"Harbor": 2, "Lakeside": 1}));

    let resp = app.get("/api/v1/apartments/search?q=lake").await?;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["pagination"]["total"], 1);
    assert_eq!(resp.body["data"][0]["unitNumber"], "B-1");

    let resp = app.get("/api/v1/apartments/search?q=%20%20").await?;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Search query is required");
    Ok(())
}

#[tokio::test]
async fn multipart_create_stores_and_serves_images() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = app.register("owner@example.com").await?;

    let fields = form_fields(&listing("A-1", "Harbor", 1800.0, 2));
    let fields: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    let body = multipart_body(&fields, &[("front.png", "image/png", b"\x89PNG fake image bytes")]);
    let resp = app.send(multipart_request(Method::POST, "/api/v1/apartments", &token, body)?).await?;
    assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.body);

    let images = resp.body["data"]["images"].as_array().unwrap().clone();
    assert_eq!(images.len(), 1);
    let url = images[0].as_str().unwrap();
    assert!(url.starts_with("http://localhost/uploads/apartments/"));
    assert!(url.ends_with(".png"));
    assert_eq!(uploads_in(&app.uploads_dir), 1);

    let path = url.trim_start_matches("http://localhost");
    let resp = app.get(path).await?;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.headers.get("cache-control").unwrap(), "public, max-age=31536000");

    // Keep nothing, then add one new image.
    let id = resp_id(&app, &token).await?;
    let body = multipart_body(&[("existingImages", "[]")], &[("side.jpg", "image/jpeg", b"jpeg bytes")]);
    let resp = app.send(multipart_request(Method::PUT, &format!("/api/v1/apartments/{id}"), &token, body)?).await?;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
    let images = resp.body["data"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert!(images[0].as_str().unwrap().ends_with(".jpg"));
    Ok(())
}

async fn resp_id(app: &support::TestApp, token: &str) -> anyhow::Result<String> {
    let resp = app.call(Method::GET, "/api/v1/apartments/my-apartments", Some(token), None).await?;
    Ok(resp.body["data"][0]["id"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn rejected_uploads_leave_no_files() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = app.register("owner@example.com").await?;

    let body = multipart_body(&[("unitName", "Loft")], &[("notes.txt", "text/plain", b"hello")]);
    let resp = app.send(multipart_request(Method::POST, "/api/v1/apartments", &token, body)?).await?;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Only image files are allowed");

    // A valid image on an invalid listing is cleaned up again.
    let body = multipart_body(&[("unitName", "Loft")], &[("a.png", "image/png", b"png")]);
    let resp = app.send(multipart_request(Method::POST, "/api/v1/apartments", &token, body)?).await?;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Validation failed");
    assert_eq!(uploads_in(&app.uploads_dir), 0);
    Ok(())
}

#[tokio::test]
async fn health_and_unknown_routes() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    let resp = app.get("/health").await?;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Apartments API is running");

    let resp = app.get("/api/v1/nowhere?x=1").await?;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["message"], "Route /api/v1/nowhere?x=1 not found");
    Ok(())
}
