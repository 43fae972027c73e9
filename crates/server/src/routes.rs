use axum::extract::{DefaultBodyLimit, OriginalUri, State};
use axum::http::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use common::types::Health;
use configs::ApiConfig;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::JsonApiError;
use crate::openapi::ApiDoc;
use crate::state::ServerState;

pub mod apartments;
pub mod auth;

#[utoipa::path(get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = Health), (status = 503, description = "Database unreachable")))]
pub async fn health(State(state): State<ServerState>) -> Result<Json<Health>, JsonApiError> {
    if let Err(e) = state.db.ping().await {
        warn!(error = %e, "health check: database ping failed");
        return Err(JsonApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Database unavailable"));
    }
    Ok(Json(Health::ok(state.started_at.elapsed().as_secs())))
}

async fn route_not_found(OriginalUri(uri): OriginalUri) -> JsonApiError {
    JsonApiError::not_found(format!("Route {uri} not found"))
}

/// Only the configured origin may call the API with credentials; `*` opens it up.
pub fn build_cors(origin: &str) -> CorsLayer {
    if origin.trim() == "*" {
        return CorsLayer::very_permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH])
            .allow_headers([CONTENT_TYPE, AUTHORIZATION])
            .allow_credentials(true),
        Err(e) => {
            warn!(%origin, error = %e, "unusable CORS origin, allowing any");
            CorsLayer::very_permissive()
        }
    }
}

fn api_routes() -> Router<ServerState> {
    let auth = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
        .route("/profile", put(auth::update_profile));

    // Static segments are matched before `/:id`.
    let apartments = Router::new()
        .route("/", get(apartments::list).post(apartments::create))
        .route("/stats", get(apartments::stats))
        .route("/search", get(apartments::search))
        .route("/my-apartments", get(apartments::mine))
        .route("/:id", get(apartments::get_one).put(apartments::update).delete(apartments::delete));

    Router::new().nest("/auth", auth).nest("/apartments", apartments)
}

/// Build the full application router: API under `api.prefix`, health, docs and uploaded files.
pub fn build_router(state: ServerState, api: &ApiConfig) -> Router {
    let uploads = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(CACHE_CONTROL, HeaderValue::from_static("public, max-age=31536000")))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("cross-origin"),
        ))
        .service(ServeDir::new(&state.uploads.dir));

    Router::new()
        .route("/health", get(health))
        .nest(&api.prefix, api_routes())
        .merge(SwaggerUi::new("/api-docs").url("/openapi.json", ApiDoc::openapi()))
        .nest_service("/uploads", uploads)
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(api.max_body_bytes))
        .layer(build_cors(&api.cors_origin))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
        .with_state(state)
}
