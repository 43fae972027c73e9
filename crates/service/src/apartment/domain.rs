//! Listing query and input types, plus the field rules every stored listing obeys.

use std::str::FromStr;

use common::types::apartment::{ApartmentInput, PetPolicy};
use common::types::FieldError;
use models::validate;
use uuid::Uuid;

use crate::pagination::Pagination;

pub const MAX_AMENITIES: usize = 20;
pub const MAX_IMAGES: usize = 10;
pub const MAX_URL_LEN: usize = 500;
pub const MAX_CONTACT_EMAIL_LEN: usize = 100;
pub const DUPLICATE_UNIT: &str = "Apartment with this unit number already exists in this project";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortField {
    Price,
    Bedrooms,
    Bathrooms,
    SquareFootage,
    #[default]
    CreatedAt,
    UnitName,
}

impl SortField {
    pub const NAMES: &'static str = "price, bedrooms, bathrooms, squareFootage, createdAt, unitName";
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "price" => SortField::Price,
            "bedrooms" => SortField::Bedrooms,
            "bathrooms" => SortField::Bathrooms,
            "squareFootage" => SortField::SquareFootage,
            "createdAt" => SortField::CreatedAt,
            "unitName" => SortField::UnitName,
            other => return Err(format!("unknown sort field: {other}")),
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Listing filters. Text filters are case-insensitive substring matches;
/// `bedrooms`/`bathrooms` are minimums; the price bounds are inclusive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApartmentFilter {
    pub search: Option<String>,
    pub unit_name: Option<String>,
    pub unit_number: Option<String>,
    pub project: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<f64>,
    pub is_available: Option<bool>,
    pub pet_policy: Option<PetPolicy>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApartmentQuery {
    pub filter: ApartmentFilter,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub pagination: Pagination,
}

/// The caller's own listings, optionally narrowed by a search string.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OwnerQuery {
    pub search: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub pagination: Pagination,
}

/// A complete, validated listing ready to be written.
#[derive(Clone, Debug, PartialEq)]
pub struct ApartmentDraft {
    pub unit_name: String,
    pub unit_number: String,
    pub project: String,
    pub description: String,
    pub bedrooms: i32,
    pub bathrooms: f64,
    pub square_footage: i32,
    pub price: f64,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub is_available: bool,
    pub floor_plan: Option<String>,
    pub pet_policy: PetPolicy,
    pub parking_spaces: i32,
    pub lease_terms: Vec<String>,
    pub contact_email: String,
    pub contact_phone: String,
    pub virtual_tour_url: Option<String>,
}

struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn fail(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Trimmed, required, bounded text.
    fn text(&mut self, value: Option<String>, field: &str, label: &str, max: usize) -> String {
        let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
        if value.is_empty() {
            self.fail(field, &format!("{label} is required"));
        } else if value.chars().count() > max {
            self.fail(field, &format!("{label} cannot exceed {max} characters"));
        }
        value
    }

    fn int(&mut self, value: Option<i32>, field: &str, range: std::ops::RangeInclusive<i32>, message: &str) -> i32 {
        match value {
            Some(v) if range.contains(&v) => v,
            _ => {
                self.fail(field, message);
                value.unwrap_or_default()
            }
        }
    }

    fn float(&mut self, value: Option<f64>, field: &str, ok: impl Fn(f64) -> bool, message: &str) -> f64 {
        match value {
            Some(v) if v.is_finite() && ok(v) => v,
            _ => {
                self.fail(field, message);
                value.unwrap_or_default()
            }
        }
    }

    /// Blank means absent; otherwise a bounded http(s) URL.
    fn optional_url(&mut self, value: Option<String>, field: &str, label: &str, max: usize) -> Option<String> {
        let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())?;
        if value.chars().count() > max {
            self.fail(field, &format!("{label} cannot exceed {max} characters"));
        } else if !validate::is_valid_url(&value) {
            self.fail(field, &format!("{label} must be a valid URL"));
        }
        Some(value)
    }
}

fn clean_list(items: Option<Vec<String>>) -> Vec<String> {
    items
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ApartmentDraft {
    /// Validate a full listing body, reporting every offending field.
    pub fn validate(input: ApartmentInput) -> Result<Self, Vec<FieldError>> {
        let mut c = Checker { errors: Vec::new() };

        let unit_name = c.text(input.unit_name, "unitName", "Unit name", 100);
        let unit_number = c.text(input.unit_number, "unitNumber", "Unit number", 20);
        let project = c.text(input.project, "project", "Project name", 100);
        let description = c.text(input.description, "description", "Description", 2000);
        let bedrooms = c.int(input.bedrooms, "bedrooms", 0..=10, "Bedrooms must be a number between 0 and 10");
        let bathrooms = c.float(input.bathrooms, "bathrooms", |v| (0.5..=10.0).contains(&v), "Bathrooms must be a number between 0.5 and 10");
        let square_footage = c.int(input.square_footage, "squareFootage", 100..=10_000, "Square footage must be between 100 and 10,000");
        let price = c.float(input.price, "price", |v| v >= 0.0, "Price must be a positive number");
        let address = c.text(input.address, "address", "Address", 200);
        let city = c.text(input.city, "city", "City", 100);
        let state = c.text(input.state, "state", "State", 50);
        let zip_code = c.text(input.zip_code, "zipCode", "ZIP code", 10);

        let amenities = clean_list(input.amenities);
        if amenities.len() > MAX_AMENITIES {
            c.fail("amenities", "Amenities must be an array with maximum 20 items");
        }
        let images = clean_list(input.images);
        if images.len() > MAX_IMAGES {
            c.fail("images", "Images must be an array with maximum 10 items");
        }
        if images.iter().any(|i| !validate::is_valid_url(i)) {
            c.fail("images", "Each image must be a valid URL");
        }

        let floor_plan = c.optional_url(input.floor_plan, "floorPlan", "Floor plan", MAX_URL_LEN);
        let pet_policy = match input.pet_policy.as_deref().map(str::trim).map(PetPolicy::from_str) {
            Some(Ok(p)) => p,
            _ => {
                c.fail("petPolicy", "Pet policy must be one of: allowed, not-allowed, conditional");
                PetPolicy::NotAllowed
            }
        };
        let parking_spaces = c.int(input.parking_spaces, "parkingSpaces", 0..=10, "Parking spaces must be a number between 0 and 10");
        let lease_terms = clean_list(input.lease_terms);
        if lease_terms.is_empty() {
            c.fail("leaseTerms", "Lease terms must be an array with at least one item");
        }

        let contact_email = input.contact_email.map(|e| e.trim().to_lowercase()).unwrap_or_default();
        if contact_email.chars().count() > MAX_CONTACT_EMAIL_LEN {
            c.fail("contactEmail", "Contact email cannot exceed 100 characters");
        } else if !validate::is_valid_contact_email(&contact_email) {
            c.fail("contactEmail", "Contact email must be a valid email address");
        }
        let contact_phone = input.contact_phone.map(|p| p.trim().to_string()).unwrap_or_default();
        if !validate::is_valid_phone(&contact_phone) {
            c.fail("contactPhone", "Contact phone must be a valid phone number");
        }
        let virtual_tour_url = c.optional_url(input.virtual_tour_url, "virtualTourUrl", "Virtual tour URL", MAX_URL_LEN);

        if !c.errors.is_empty() {
            return Err(c.errors);
        }
        Ok(Self {
            unit_name,
            unit_number,
            project,
            description,
            bedrooms,
            bathrooms,
            square_footage,
            price,
            address,
            city,
            state,
            zip_code,
            amenities,
            images,
            is_available: input.is_available.unwrap_or(true),
            floor_plan,
            pet_policy,
            parking_spaces,
            lease_terms,
            contact_email,
            contact_phone,
            virtual_tour_url,
        })
    }
}

/// The stored listing expressed as a full input body.
pub fn input_from_model(m: &models::apartment::Model) -> ApartmentInput {
    ApartmentInput {
        unit_name: Some(m.unit_name.clone()),
        unit_number: Some(m.unit_number.clone()),
        project: Some(m.project.clone()),
        description: Some(m.description.clone()),
        bedrooms: Some(m.bedrooms),
        bathrooms: Some(m.bathrooms),
        square_footage: Some(m.square_footage),
        price: Some(m.price),
        address: Some(m.address.clone()),
        city: Some(m.city.clone()),
        state: Some(m.state.clone()),
        zip_code: Some(m.zip_code.clone()),
        amenities: Some(m.amenities.0.clone()),
        images: Some(m.images.0.clone()),
        existing_images: None,
        is_available: Some(m.is_available),
        floor_plan: m.floor_plan.clone(),
        pet_policy: Some(m.pet_policy.clone()),
        parking_spaces: Some(m.parking_spaces),
        lease_terms: Some(m.lease_terms.0.clone()),
        contact_email: Some(m.contact_email.clone()),
        contact_phone: Some(m.contact_phone.clone()),
        virtual_tour_url: m.virtual_tour_url.clone(),
    }
}

/// Fields present in `patch` replace those in `base`; absent ones are kept.
pub fn overlay(base: ApartmentInput, patch: ApartmentInput) -> ApartmentInput {
    ApartmentInput {
        unit_name: patch.unit_name.or(base.unit_name),
        unit_number: patch.unit_number.or(base.unit_number),
        project: patch.project.or(base.project),
        description: patch.description.or(base.description),
        bedrooms: patch.bedrooms.or(base.bedrooms),
        bathrooms: patch.bathrooms.or(base.bathrooms),
        square_footage: patch.square_footage.or(base.square_footage),
        price: patch.price.or(base.price),
        address: patch.address.or(base.address),
        city: patch.city.or(base.city),
        state: patch.state.or(base.state),
        zip_code: patch.zip_code.or(base.zip_code),
        amenities: patch.amenities.or(base.amenities),
        images: patch.images.or(base.images),
        existing_images: None,
        is_available: patch.is_available.or(base.is_available),
        floor_plan: patch.floor_plan.or(base.floor_plan),
        pet_policy: patch.pet_policy.or(base.pet_policy),
        parking_spaces: patch.parking_spaces.or(base.parking_spaces),
        lease_terms: patch.lease_terms.or(base.lease_terms),
        contact_email: patch.contact_email.or(base.contact_email),
        contact_phone: patch.contact_phone.or(base.contact_phone),
        virtual_tour_url: patch.virtual_tour_url.or(base.virtual_tour_url),
    }
}

/// Trimmed text; blank strings count as absent.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Who is allowed to change a listing.
pub fn ensure_owner(owner_id: Uuid, actor_id: Uuid, action: &str) -> Result<(), crate::errors::ServiceError> {
    if owner_id != actor_id {
        return Err(crate::errors::ServiceError::Forbidden(format!("You can only {action} your own apartments")));
    }
    Ok(())
}
