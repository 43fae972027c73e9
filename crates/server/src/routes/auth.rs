use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use common::types::auth::{AuthPayload, LoginRequest, ProfileUpdateRequest, RegisterRequest, UserView};
use common::types::ApiResponse;
use service::auth::domain::{AuthSession, LoginInput, ProfileUpdate, RegisterInput};
use tracing::info;

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, CurrentUser, AUTH_COOKIE};
use crate::state::ServerState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, JsonApiError>;

fn payload(session: AuthSession) -> AuthPayload {
    AuthPayload { token: session.token, user: session.user.into() }
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[utoipa::path(post, path = "/api/v1/auth/register", tag = "auth", request_body = RegisterRequest,
    responses((status = 201, description = "Registered", body = AuthPayload), (status = 400, description = "Validation failed"), (status = 409, description = "Email already registered")))]
pub async fn register(
    State(state): State<ServerState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthPayload>>), JsonApiError> {
    let input = RegisterInput { name: req.name, email: req.email, password: req.password, phone: req.phone };
    let session = state.auth.register(input).await?;
    let body = ApiResponse::ok(payload(session)).with_message("User registered successfully");
    Ok((StatusCode::CREATED, Json(body)))
}

#[utoipa::path(post, path = "/api/v1/auth/login", tag = "auth", request_body = LoginRequest,
    responses((status = 200, description = "Logged in; also sets the auth_token cookie", body = AuthPayload), (status = 401, description = "Invalid email or password")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<AuthPayload>>), JsonApiError> {
    let session = state.auth.login(LoginInput { email: req.email, password: req.password }).await?;
    let jar = jar.add(session_cookie(session.token.clone()));
    Ok((jar, Json(ApiResponse::ok(payload(session)).with_message("Login successful"))))
}

#[utoipa::path(get, path = "/api/v1/auth/me", tag = "auth", security(("bearer" = [])),
    responses((status = 200, description = "Current user", body = UserView), (status = 401, description = "Missing or invalid token")))]
pub async fn me(CurrentUser(user): CurrentUser) -> ApiResult<UserView> {
    Ok(Json(ApiResponse::ok(UserView::from(user)).with_message("User profile retrieved successfully")))
}

#[utoipa::path(post, path = "/api/v1/auth/logout", tag = "auth", security(("bearer" = [])),
    responses((status = 200, description = "Logged out; clears the auth_token cookie")))]
pub async fn logout(CurrentUser(user): CurrentUser, jar: CookieJar) -> (CookieJar, Json<ApiResponse<()>>) {
    info!(user_id = %user.id, "user_logout");
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    let jar = jar.remove(cookie);
    (jar, Json(ApiResponse::message("Logout successful. Please remove the token from client storage.")))
}

#[utoipa::path(put, path = "/api/v1/auth/profile", tag = "auth", security(("bearer" = [])), request_body = ProfileUpdateRequest,
    responses((status = 200, description = "Updated user", body = UserView), (status = 400, description = "Validation failed or wrong current password")))]
pub async fn update_profile(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<ProfileUpdateRequest>,
) -> ApiResult<UserView> {
    let update = ProfileUpdate {
        name: req.name,
        phone: req.phone,
        current_password: req.current_password,
        new_password: req.new_password,
        confirm_password: req.confirm_password,
    };
    let message = if update.changes_password() {
        "Profile and password updated successfully"
    } else {
        "Profile updated successfully"
    };
    let updated = state.auth.update_profile(user.id, update).await?;
    Ok(Json(ApiResponse::ok(UserView::from(updated)).with_message(message)))
}
