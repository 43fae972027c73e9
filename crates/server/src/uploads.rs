//! Multipart listing forms: text fields become an [`ApartmentInput`], `images`
//! file parts are written under `<uploads_dir>/apartments/`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use axum::http::header::HOST;
use axum::http::HeaderMap;
use common::types::apartment::ApartmentInput;
use common::types::FieldError;
use serde_json::{Map, Number, Value};
use service::apartment::domain::MAX_IMAGES;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::state::UploadSettings;

const IMAGE_FIELD: &str = "images";
const LIST_FIELDS: [&str; 4] = ["amenities", "images", "existingImages", "leaseTerms"];
const INT_FIELDS: [&str; 3] = ["bedrooms", "squareFootage", "parkingSpaces"];
const FLOAT_FIELDS: [&str; 2] = ["bathrooms", "price"];
const BOOL_FIELDS: [&str; 1] = ["isAvailable"];

#[derive(Clone, Debug)]
pub struct StoredImage {
    pub path: PathBuf,
    pub url: String,
}

/// `<scheme>://<host>` of the incoming request, honouring `X-Forwarded-Proto`.
pub fn public_base(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers.get(HOST).and_then(|v| v.to_str().ok()).unwrap_or("localhost");
    format!("{scheme}://{host}")
}

/// Reads the whole form. Files written before a failure are removed again.
pub async fn read_listing_form(
    mut multipart: Multipart,
    settings: &UploadSettings,
    base_url: &str,
) -> Result<(ApartmentInput, Vec<StoredImage>), JsonApiError> {
    let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut stored = Vec::new();
    if let Err(e) = collect_parts(&mut multipart, settings, base_url, &mut fields, &mut stored).await {
        discard(&stored).await;
        return Err(e);
    }
    match form_to_input(fields) {
        Ok(input) => Ok((input, stored)),
        Err(e) => {
            discard(&stored).await;
            Err(e)
        }
    }
}

async fn collect_parts(
    multipart: &mut Multipart,
    settings: &UploadSettings,
    base_url: &str,
    fields: &mut BTreeMap<String, Vec<String>>,
    stored: &mut Vec<StoredImage>,
) -> Result<(), JsonApiError> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().trim_end_matches("[]").to_string();
        let file_name = field.file_name().map(str::to_string);
        let Some(file_name) = file_name else {
            let text = field.text().await?;
            fields.entry(name).or_default().push(text);
            continue;
        };

        if name != IMAGE_FIELD {
            return Err(JsonApiError::bad_request(format!("Unexpected file field: {name}")));
        }
        if file_name.is_empty() {
            continue;
        }
        if stored.len() >= MAX_IMAGES {
            return Err(JsonApiError::bad_request(format!("Too many files. Maximum is {MAX_IMAGES} images")));
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(JsonApiError::bad_request("Only image files are allowed"));
        }
        let bytes = field.bytes().await?;
        if bytes.len() > settings.max_file_bytes {
            return Err(JsonApiError::bad_request(format!(
                "File too large. Maximum size is {} bytes",
                settings.max_file_bytes
            )));
        }

        let stored_name = format!("{}.{}", Uuid::new_v4(), extension(&file_name, &content_type));
        let path = settings.apartments_dir().join(&stored_name);
        tokio::fs::write(&path, &bytes).await.map_err(JsonApiError::internal)?;
        info!(file = %path.display(), size = bytes.len(), "image stored");
        stored.push(StoredImage { path, url: format!("{base_url}/uploads/apartments/{stored_name}") });
    }
    Ok(())
}

/// Removes files of a request that did not end up in a listing.
pub async fn discard(images: &[StoredImage]) {
    for image in images {
        if let Err(e) = tokio::fs::remove_file(&image.path).await {
            warn!(file = %image.path.display(), error = %e, "failed to remove orphaned upload");
        }
    }
}

fn extension(file_name: &str, content_type: &str) -> String {
    let from_name = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));
    match from_name {
        Some(ext) => ext.to_ascii_lowercase(),
        None => content_type
            .strip_prefix("image/")
            .map(|s| s.split(['+', ';']).next().unwrap_or("img"))
            .filter(|s| !s.is_empty())
            .unwrap_or("img")
            .to_string(),
    }
}

/// Text form fields to the JSON shape of [`ApartmentInput`]. List fields take
/// repeated keys or one JSON array string; numbers and booleans are coerced.
pub fn form_to_input(fields: BTreeMap<String, Vec<String>>) -> Result<ApartmentInput, JsonApiError> {
    let mut map = Map::new();
    let mut errors = Vec::new();

    for (name, values) in fields {
        if LIST_FIELDS.contains(&name.as_str()) {
            map.insert(name, Value::Array(list_values(values).into_iter().map(Value::String).collect()));
            continue;
        }
        let Some(raw) = values.into_iter().rev().map(|v| v.trim().to_string()).find(|v| !v.is_empty()) else {
            continue;
        };
        let value = if INT_FIELDS.contains(&name.as_str()) {
            raw.parse::<i64>().ok().map(Value::from)
        } else if FLOAT_FIELDS.contains(&name.as_str()) {
            raw.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number)
        } else if BOOL_FIELDS.contains(&name.as_str()) {
            match raw.as_str() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            }
        } else {
            Some(Value::String(raw))
        };
        match value {
            Some(v) => {
                map.insert(name, v);
            }
            None => {
                let kind = if BOOL_FIELDS.contains(&name.as_str()) { "a boolean" } else { "a number" };
                errors.push(FieldError::new(name.clone(), format!("{name} must be {kind}")));
            }
        }
    }

    if !errors.is_empty() {
        return Err(JsonApiError::validation(errors));
    }
    serde_json::from_value(Value::Object(map)).map_err(|e| JsonApiError::bad_request(e.to_string()))
}

fn list_values(values: Vec<String>) -> Vec<String> {
    if let [single] = values.as_slice() {
        let trimmed = single.trim();
        if trimmed.starts_with('[') {
            if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
                return list;
            }
        }
        if trimmed.is_empty() {
            return Vec::new();
        }
    }
    values
}
