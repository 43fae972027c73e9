use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use common::types::apartment::{ApartmentInput, ApartmentStatsView, ApartmentView};
use common::types::ApiResponse;
use service::apartment::Apartment;
use service::errors::ServiceError;
use service::pagination::Page;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::extract::{ApiPath, ApiQuery, CurrentUser, ListingPayload};
use crate::state::ServerState;
use crate::uploads::{self, StoredImage};
use crate::validation::{listing_query, owner_query, search_query, ListingParams, SearchParams};

type ApiResult<T> = Result<Json<ApiResponse<T>>, JsonApiError>;

fn page_response(page: Page<Apartment>) -> Json<ApiResponse<Vec<ApartmentView>>> {
    let page = page.map(Apartment::into_view);
    Json(ApiResponse::paginated(page.items, page.meta))
}

/// Drops the request's freshly stored images when the write did not go through.
async fn keep_uploads_on_success<T>(images: &[StoredImage], result: Result<T, ServiceError>) -> Result<T, JsonApiError> {
    match result {
        Ok(v) => Ok(v),
        Err(e) => {
            uploads::discard(images).await;
            Err(e.into())
        }
    }
}

#[utoipa::path(get, path = "/api/v1/apartments", tag = "apartments",
    params(
        ("page" = Option<u64>, Query, description = "1-based page, default 1"),
        ("limit" = Option<u64>, Query, description = "Page size 1..=100, default 10"),
        ("search" = Option<String>, Query, description = "Substring over unit name, unit number, project, description, address, city"),
        ("unitName" = Option<String>, Query, description = "Unit name substring"),
        ("unitNumber" = Option<String>, Query, description = "Unit number substring"),
        ("project" = Option<String>, Query, description = "Project name substring"),
        ("minPrice" = Option<f64>, Query, description = "Lowest monthly price"),
        ("maxPrice" = Option<f64>, Query, description = "Highest monthly price"),
        ("bedrooms" = Option<i32>, Query, description = "Minimum bedrooms"), ("bathrooms" = Option<f64>, Query, description = "Minimum bathrooms"),
        ("city" = Option<String>, Query, description = "City substring"),
        ("state" = Option<String>, Query, description = "State substring"),
        ("isAvailable" = Option<bool>, Query, description = "Availability flag"),
        ("petPolicy" = Option<String>, Query, description = "allowed, not-allowed or conditional"),
        ("sortBy" = Option<String>, Query, description = "price, bedrooms, bathrooms, squareFootage, createdAt, unitName"),
        ("sortOrder" = Option<String>, Query, description = "asc or desc"),
    ),
    responses((status = 200, description = "One page of listings", body = [ApartmentView]), (status = 400, description = "Invalid query")))]
pub async fn list(State(state): State<ServerState>, ApiQuery(params): ApiQuery<ListingParams>) -> ApiResult<Vec<ApartmentView>> {
    let query = listing_query(&params)?;
    let page = state.apartments.list(query).await?;
    Ok(page_response(page))
}

#[utoipa::path(get, path = "/api/v1/apartments/{id}", tag = "apartments", params(("id" = Uuid, Path, description = "Listing id")),
    responses((status = 200, description = "Listing", body = ApartmentView), (status = 400, description = "Invalid ID format"), (status = 404, description = "Apartment not found")))]
pub async fn get_one(State(state): State<ServerState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<ApartmentView> {
    let apartment = state.apartments.find(id).await?;
    Ok(Json(ApiResponse::ok(apartment.into_view())))
}

#[utoipa::path(post, path = "/api/v1/apartments", tag = "apartments", security(("bearer" = [])), request_body = ApartmentInput,
    responses((status = 201, description = "Created", body = ApartmentView), (status = 400, description = "Validation failed"), (status = 401, description = "Not authenticated"), (status = 409, description = "Unit number already used in this project")))]
pub async fn create(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    payload: ListingPayload,
) -> Result<(StatusCode, Json<ApiResponse<ApartmentView>>), JsonApiError> {
    let urls = payload.image_urls();
    let result = state.apartments.create(user.id, payload.input, urls).await;
    let created = keep_uploads_on_success(&payload.images, result).await?;
    let body = ApiResponse::ok(created.into_view()).with_message("Apartment created successfully");
    Ok((StatusCode::CREATED, Json(body)))
}

#[utoipa::path(put, path = "/api/v1/apartments/{id}", tag = "apartments", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Listing id")), request_body = ApartmentInput,
    responses((status = 200, description = "Updated", body = ApartmentView), (status = 403, description = "Not the owner"), (status = 404, description = "Apartment not found"), (status = 409, description = "Unit number already used in this project")))]
pub async fn update(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    payload: ListingPayload,
) -> ApiResult<ApartmentView> {
    let urls = payload.image_urls();
    let result = state.apartments.update(user.id, id, payload.input, urls).await;
    let updated = keep_uploads_on_success(&payload.images, result).await?;
    Ok(Json(ApiResponse::ok(updated.into_view()).with_message("Apartment updated successfully")))
}

#[utoipa::path(delete, path = "/api/v1/apartments/{id}", tag = "apartments", security(("bearer" = [])), params(("id" = Uuid, Path, description = "Listing id")),
    responses((status = 200, description = "Deleted"), (status = 403, description = "Not the owner"), (status = 404, description = "Apartment not found")))]
pub async fn delete(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    state.apartments.delete(user.id, id).await?;
    Ok(Json(ApiResponse::message("Apartment deleted successfully")))
}

#[utoipa::path(get, path = "/api/v1/apartments/stats", tag = "apartments",
    responses((status = 200, description = "Aggregate statistics", body = ApartmentStatsView)))]
pub async fn stats(State(state): State<ServerState>) -> ApiResult<ApartmentStatsView> {
    Ok(Json(ApiResponse::ok(state.apartments.stats().await?)))
}

#[utoipa::path(get, path = "/api/v1/apartments/search", tag = "apartments",
    params(
        ("q" = String, Query, description = "Search words"),
        ("page" = Option<u64>, Query, description = "1-based page, default 1"),
        ("limit" = Option<u64>, Query, description = "Page size 1..=100, default 10"),
    ),
    responses((status = 200, description = "Listings ranked by relevance", body = [ApartmentView]), (status = 400, description = "Search query is required")))]
pub async fn search(State(state): State<ServerState>, ApiQuery(params): ApiQuery<SearchParams>) -> ApiResult<Vec<ApartmentView>> {
    let (q, pagination) = search_query(&params)?;
    let page = state.apartments.search(&q, pagination).await?;
    Ok(page_response(page))
}

#[utoipa::path(get, path = "/api/v1/apartments/my-apartments", tag = "apartments", security(("bearer" = [])),
    params(
        ("page" = Option<u64>, Query, description = "1-based page, default 1"),
        ("limit" = Option<u64>, Query, description = "Page size 1..=100, default 10"),
        ("search" = Option<String>, Query, description = "Substring over unit name, project, description, address, city"),
        ("sortBy" = Option<String>, Query, description = "price, bedrooms, bathrooms, squareFootage, createdAt, unitName"),
        ("sortOrder" = Option<String>, Query, description = "asc or desc"),
    ),
    responses((status = 200, description = "The caller's listings", body = [ApartmentView]), (status = 401, description = "Not authenticated")))]
pub async fn mine(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(params): ApiQuery<ListingParams>,
) -> ApiResult<Vec<ApartmentView>> {
    let query = owner_query(&params)?;
    let page = state.apartments.list_for_owner(user.id, query).await?;
    Ok(page_response(page))
}
