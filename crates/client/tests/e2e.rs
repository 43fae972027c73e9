use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use client::{ApartmentsClient, ClientError, ImageUpload};
use common::types::apartment::{ApartmentFilters, ApartmentInput};
use common::types::auth::{LoginRequest, ProfileUpdateRequest, RegisterRequest};
use server::{routes, ServerState};
use tokio::net::TcpListener;
use uuid::Uuid;

const PASSWORD: &str = "Password123!";

struct TestServer {
    base_url: String,
    uploads_dir: PathBuf,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.uploads_dir);
    }
}

async fn start_server() -> anyhow::Result<TestServer> {
    let db = models::db::connect_in_memory().await?;
    let uploads_dir = std::env::temp_dir().join(format!("rental-listings-client-{}", Uuid::new_v4()));
    common::env::ensure_env(&uploads_dir).await?;

    let auth = configs::AuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: 1 };
    let api = configs::ApiConfig { uploads_dir: uploads_dir.display().to_string(), ..Default::default() };
    let app = routes::build_router(ServerState::new(db, &auth, &api), &api);

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = server::serve(listener, app, std::future::pending()).await {
            eprintln!("server error: {e}");
        }
    });
    Ok(TestServer { base_url: format!("http://{addr}"), uploads_dir })
}

fn registration(email: &str) -> RegisterRequest {
    RegisterRequest { name: "Client Tester".into(), email: email.into(), password: PASSWORD.into(), phone: "+15551234567".into() }
}

fn listing(unit_number: &str, project: &str, price: f64, bedrooms: i32) -> ApartmentInput {
    ApartmentInput {
        unit_name: Some(format!("{project} {unit_number}")),
        unit_number: Some(unit_number.into()),
        project: Some(project.into()),
        description: Some("Bright two-bedroom near the park".into()),
        bedrooms: Some(bedrooms),
        bathrooms: Some(2.0),
        square_footage: Some(1100),
        price: Some(price),
        address: Some("42 Elm St".into()),
        city: Some("Austin".into()),
        state: Some("TX".into()),
        zip_code: Some("73301".into()),
        amenities: Some(vec!["Pool".into(), "Gym".into()]),
        pet_policy: Some("conditional".into()),
        parking_spaces: Some(1),
        lease_terms: Some(vec!["12 months".into()]),
        contact_email: Some("leasing@example.com".into()),
        contact_phone: Some("+15125550100".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn health_reports_ok() -> anyhow::Result<()> {
    let srv = start_server().await?;
    let api = ApartmentsClient::new(&srv.base_url)?;
    let health = api.health().await?;
    assert_eq!(health.status, "ok");
    Ok(())
}

#[tokio::test]
async fn session_lifecycle() -> anyhow::Result<()> {
    let srv = start_server().await?;
    let mut api = ApartmentsClient::new(&srv.base_url)?;

    let registered = api.register(&registration("client@example.com")).await?;
    assert_eq!(registered.user.email, "client@example.com");
    assert!(api.token().is_some());

    let me = api.me().await?;
    assert_eq!(me.id, registered.user.id);

    let updated = api
        .update_profile(&ProfileUpdateRequest { name: Some("Renamed Tester".into()), ..Default::default() })
        .await?;
    assert_eq!(updated.name, "Renamed Tester");

    api.logout().await?;
    assert!(api.token().is_none());
    // The logout response expired the cookie, so nothing authenticates the next call.
    let err = api.me().await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    let logged_in = api.login(&LoginRequest { email: "client@example.com".into(), password: PASSWORD.into() }).await?;
    assert_eq!(logged_in.user.name, "Renamed Tester");
    Ok(())
}

#[tokio::test]
async fn cookie_session_works_without_a_bearer_token() -> anyhow::Result<()> {
    let srv = start_server().await?;
    let mut api = ApartmentsClient::new(&srv.base_url)?;
    api.register(&registration("cookie@example.com")).await?;
    api.login(&LoginRequest { email: "cookie@example.com".into(), password: PASSWORD.into() }).await?;

    api.set_token(None);
    assert_eq!(api.me().await?.email, "cookie@example.com");
    Ok(())
}

#[tokio::test]
async fn listing_crud_and_queries() -> anyhow::Result<()> {
    let srv = start_server().await?;
    let mut owner = ApartmentsClient::new(&srv.base_url)?;
    owner.register(&registration("owner@example.com")).await?;

    let a = owner.create_apartment(&listing("101", "Lakeside", 1500.0, 1)).await?;
    let b = owner.create_apartment(&listing("202", "Lakeside", 2100.0, 2)).await?;
    owner.create_apartment(&listing("303", "Hilltop", 3200.0, 3)).await?;

    let fetched = owner.get_apartment(a.id).await?;
    assert_eq!(fetched.unit_number, "101");
    assert_eq!(fetched.amenities, vec!["Pool".to_string(), "Gym".to_string()]);

    let cheap = owner
        .list_apartments(&ApartmentFilters { max_price: Some(2500.0), sort_by: Some("price".into()), sort_order: Some("asc".into()), ..Default::default() })
        .await?;
    assert_eq!(cheap.pagination.total, 2);
    let prices: Vec<f64> = cheap.items.iter().map(|apt| apt.price).collect();
    assert_eq!(prices, vec![1500.0, 2100.0]);

    let page = owner.list_apartments(&ApartmentFilters { limit: Some(2), page: Some(2), ..Default::default() }).await?;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.pagination.pages, 2);

    let found = owner.search("hilltop", None, None).await?;
    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].project, "Hilltop");

    let stats = owner.stats().await?;
    assert_eq!(stats.total, 3);
    assert_eq!(stats.project_counts.get("Lakeside"), Some(2));
    assert_eq!(stats.price_range.max, 3200.0);

    let patched = owner
        .update_apartment(b.id, &ApartmentInput { price: Some(1999.0), is_available: Some(false), ..Default::default() })
        .await?;
    assert_eq!(patched.price, 1999.0);
    assert!(!patched.is_available);
    assert_eq!(patched.unit_number, "202");

    let mine = owner.my_apartments(&ApartmentFilters::default()).await?;
    assert_eq!(mine.pagination.total, 3);

    owner.delete_apartment(a.id).await?;
    let err = owner.get_apartment(a.id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    Ok(())
}

#[tokio::test]
async fn api_errors_carry_status_and_fields() -> anyhow::Result<()> {
    let srv = start_server().await?;
    let mut owner = ApartmentsClient::new(&srv.base_url)?;
    owner.register(&registration("first@example.com")).await?;
    let apt = owner.create_apartment(&listing("1A", "Riverside", 1800.0, 2)).await?;

    match owner.create_apartment(&listing("1A", "Riverside", 1900.0, 2)).await {
        Err(ClientError::Api { status, .. }) => assert_eq!(status, 409),
        other => panic!("expected a conflict, got {other:?}"),
    }

    match owner.create_apartment(&ApartmentInput { unit_number: Some("9Z".into()), ..Default::default() }).await {
        Err(ClientError::Api { status, message, errors }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Validation failed");
            assert!(errors.iter().any(|e| e.field == "price"));
        }
        other => panic!("expected validation errors, got {other:?}"),
    }

    let mut stranger = ApartmentsClient::new(&srv.base_url)?;
    stranger.register(&registration("second@example.com")).await?;
    let err = stranger.delete_apartment(apt.id).await.unwrap_err();
    assert_eq!(err.status(), Some(403));

    let anonymous = ApartmentsClient::new(&srv.base_url)?;
    let err = anonymous.create_apartment(&listing("2B", "Riverside", 1700.0, 1)).await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    let err = stranger.register(&registration("first@example.com")).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    Ok(())
}

#[tokio::test]
async fn uploads_images_with_a_listing() -> anyhow::Result<()> {
    let srv = start_server().await?;
    let mut owner = ApartmentsClient::new(&srv.base_url)?;
    owner.register(&registration("photos@example.com")).await?;

    let photo = ImageUpload { file_name: "front.png".into(), content_type: "image/png".into(), bytes: vec![0x89, b'P', b'N', b'G'] };
    let created = owner.create_apartment_with_images(&listing("7C", "Parkview", 2400.0, 2), vec![photo]).await?;
    assert_eq!(created.images.len(), 1);
    assert!(created.images[0].contains("/uploads/apartments/"));
    assert_eq!(created.lease_terms, vec!["12 months".to_string()]);

    let served = reqwest::get(&created.images[0]).await?;
    assert!(served.status().is_success());
    assert_eq!(served.bytes().await?.as_ref(), &[0x89, b'P', b'N', b'G']);

    let patch = ApartmentInput { existing_images: Some(Vec::new()), ..Default::default() };
    let replacement = ImageUpload { file_name: "back.jpg".into(), content_type: "image/jpeg".into(), bytes: vec![0xFF, 0xD8, 0xFF] };
    let updated = owner.update_apartment_with_images(created.id, &patch, vec![replacement]).await?;
    assert_eq!(updated.images.len(), 1);
    assert!(updated.images[0].ends_with(".jpg"));

    let text = ImageUpload { file_name: "notes.txt".into(), content_type: "text/plain".into(), bytes: b"hello".to_vec() };
    let err = owner.create_apartment_with_images(&listing("8D", "Parkview", 2500.0, 2), vec![text]).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    Ok(())
}
