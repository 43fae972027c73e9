//! Typed HTTP client for the rental listings API.
//!
//! Wraps `reqwest` with the server's response envelope: successful calls
//! return the `data` payload, failures surface as [`ClientError::Api`] with
//! the server's message and field errors.
//!
//! ```no_run
//! # async fn demo() -> Result<(), client::ClientError> {
//! use client::ApartmentsClient;
//! use common::types::apartment::ApartmentFilters;
//! use common::types::auth::LoginRequest;
//!
//! let mut api = ApartmentsClient::new("http://127.0.0.1:3001")?;
//! api.login(&LoginRequest { email: "test@test.com".into(), password: "Password123!".into() }).await?;
//! let page = api.list_apartments(&ApartmentFilters { city: Some("Austin".into()), ..Default::default() }).await?;
//! println!("{} of {} listings", page.items.len(), page.pagination.total);
//! # Ok(())
//! # }
//! ```

use common::types::apartment::{ApartmentFilters, ApartmentInput, ApartmentStatsView, ApartmentView};
use common::types::auth::{AuthPayload, LoginRequest, ProfileUpdateRequest, RegisterRequest, UserView};
use common::types::{ApiResponse, FieldError, Health, PageMeta};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_PREFIX: &str = "/api/v1";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with `success: false`.
    #[error("{status}: {message}")]
    Api { status: u16, message: String, errors: Vec<FieldError> },
    #[error("response did not contain data")]
    MissingData,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// One page of results plus its metadata.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}

/// An image file attached to a create/update request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub struct ApartmentsClient {
    http: reqwest::Client,
    root: String,
    prefix: String,
    token: Option<String>,
}

impl ApartmentsClient {
    /// `root` is the server origin, e.g. `http://localhost:3001`.
    pub fn new(root: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { http, root: root.into().trim_end_matches('/').to_string(), prefix: DEFAULT_PREFIX.into(), token: None })
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replace or drop the bearer token. The cookie jar is left alone.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.root, self.prefix, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn envelope<T: DeserializeOwned>(resp: Response) -> Result<ApiResponse<T>, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<ApiResponse<T>>().await?);
        }
        let text = resp.text().await?;
        let (message, errors) = match serde_json::from_str::<ApiResponse<Value>>(&text) {
            Ok(body) => (body.message.unwrap_or_else(|| status.to_string()), body.errors),
            Err(_) => (text, Vec::new()),
        };
        debug!(status = status.as_u16(), %message, "api error");
        Err(ClientError::Api { status: status.as_u16(), message, errors })
    }

    async fn data<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ClientError> {
        Self::envelope::<T>(req.send().await?).await?.data.ok_or(ClientError::MissingData)
    }

    async fn page<T: DeserializeOwned>(req: RequestBuilder) -> Result<Listing<T>, ClientError> {
        let body = Self::envelope::<Vec<T>>(req.send().await?).await?;
        let pagination = body.pagination.ok_or(ClientError::MissingData)?;
        Ok(Listing { items: body.data.unwrap_or_default(), pagination })
    }

    async fn message(req: RequestBuilder) -> Result<String, ClientError> {
        let body = Self::envelope::<Value>(req.send().await?).await?;
        Ok(body.message.unwrap_or_default())
    }

    pub async fn health(&self) -> Result<Health, ClientError> {
        let resp = self.http.get(format!("{}/health", self.root)).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::Api { status: resp.status().as_u16(), message: resp.text().await?, errors: Vec::new() });
        }
        Ok(resp.json().await?)
    }

    /// Registers and keeps the returned token for later calls.
    pub async fn register(&mut self, req: &RegisterRequest) -> Result<AuthPayload, ClientError> {
        let payload: AuthPayload = Self::data(self.request(Method::POST, "/auth/register").json(req)).await?;
        self.token = Some(payload.token.clone());
        Ok(payload)
    }

    /// Logs in and keeps the returned token for later calls.
    pub async fn login(&mut self, req: &LoginRequest) -> Result<AuthPayload, ClientError> {
        let payload: AuthPayload = Self::data(self.request(Method::POST, "/auth/login").json(req)).await?;
        self.token = Some(payload.token.clone());
        Ok(payload)
    }

    pub async fn me(&self) -> Result<UserView, ClientError> {
        Self::data(self.request(Method::GET, "/auth/me")).await
    }

    pub async fn logout(&mut self) -> Result<String, ClientError> {
        let message = Self::message(self.request(Method::POST, "/auth/logout")).await?;
        self.token = None;
        Ok(message)
    }

    pub async fn update_profile(&self, req: &ProfileUpdateRequest) -> Result<UserView, ClientError> {
        Self::data(self.request(Method::PUT, "/auth/profile").json(req)).await
    }

    pub async fn list_apartments(&self, filters: &ApartmentFilters) -> Result<Listing<ApartmentView>, ClientError> {
        Self::page(self.request(Method::GET, "/apartments").query(filters)).await
    }

    pub async fn my_apartments(&self, filters: &ApartmentFilters) -> Result<Listing<ApartmentView>, ClientError> {
        Self::page(self.request(Method::GET, "/apartments/my-apartments").query(filters)).await
    }

    pub async fn search(&self, q: &str, page: Option<u64>, limit: Option<u64>) -> Result<Listing<ApartmentView>, ClientError> {
        #[derive(Serialize)]
        struct SearchQuery<'a> {
            q: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            page: Option<u64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            limit: Option<u64>,
        }
        Self::page(self.request(Method::GET, "/apartments/search").query(&SearchQuery { q, page, limit })).await
    }

    pub async fn stats(&self) -> Result<ApartmentStatsView, ClientError> {
        Self::data(self.request(Method::GET, "/apartments/stats")).await
    }

    pub async fn get_apartment(&self, id: Uuid) -> Result<ApartmentView, ClientError> {
        Self::data(self.request(Method::GET, &format!("/apartments/{id}"))).await
    }

    pub async fn create_apartment(&self, input: &ApartmentInput) -> Result<ApartmentView, ClientError> {
        Self::data(self.request(Method::POST, "/apartments").json(input)).await
    }

    /// Multipart create; `images` are uploaded and appended to any URLs in `input`.
    pub async fn create_apartment_with_images(
        &self,
        input: &ApartmentInput,
        images: Vec<ImageUpload>,
    ) -> Result<ApartmentView, ClientError> {
        let form = listing_form(input, images)?;
        Self::data(self.request(Method::POST, "/apartments").multipart(form)).await
    }

    pub async fn update_apartment(&self, id: Uuid, patch: &ApartmentInput) -> Result<ApartmentView, ClientError> {
        Self::data(self.request(Method::PUT, &format!("/apartments/{id}")).json(patch)).await
    }

    /// Multipart update. Set `patch.existing_images` to choose which stored images stay.
    pub async fn update_apartment_with_images(
        &self,
        id: Uuid,
        patch: &ApartmentInput,
        images: Vec<ImageUpload>,
    ) -> Result<ApartmentView, ClientError> {
        let form = listing_form(patch, images)?;
        Self::data(self.request(Method::PUT, &format!("/apartments/{id}")).multipart(form)).await
    }

    pub async fn delete_apartment(&self, id: Uuid) -> Result<String, ClientError> {
        Self::message(self.request(Method::DELETE, &format!("/apartments/{id}"))).await
    }
}

/// List fields travel as JSON array strings, everything else as plain text.
fn listing_form(input: &ApartmentInput, images: Vec<ImageUpload>) -> Result<Form, ClientError> {
    let Value::Object(fields) = serde_json::to_value(input).map_err(|e| ClientError::InvalidRequest(e.to_string()))? else {
        return Err(ClientError::InvalidRequest("listing input is not an object".into()));
    };
    let mut form = Form::new();
    for (name, value) in fields {
        let text = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        form = form.text(name, text);
    }
    for image in images {
        let part = Part::bytes(image.bytes).file_name(image.file_name).mime_str(&image.content_type)?;
        form = form.part("images", part);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_root_and_prefix() {
        let c = ApartmentsClient::new("http://localhost:3001/").unwrap().with_prefix("/api/v2/");
        assert_eq!(c.url("/apartments"), "http://localhost:3001/api/v2/apartments");
    }

    #[test]
    fn api_errors_expose_status() {
        let err = ClientError::Api { status: 409, message: "dup".into(), errors: Vec::new() };
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.to_string(), "409: dup");
    }

    #[test]
    fn form_encodes_lists_as_json() {
        let input = ApartmentInput { lease_terms: Some(vec!["12 months".into()]), bedrooms: Some(2), ..Default::default() };
        assert!(listing_form(&input, Vec::new()).is_ok());
    }
}
