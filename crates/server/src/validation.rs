//! Query-string rules for the listing endpoints.
//!
//! Parameters arrive as raw strings so that every bad value is reported as a
//! field error with a readable message rather than a decoder failure.

use std::str::FromStr;

use common::types::apartment::PetPolicy;
use common::types::FieldError;
use serde::Deserialize;
use service::apartment::domain::{ApartmentFilter, ApartmentQuery, OwnerQuery, SortField, SortOrder};
use service::pagination::{Pagination, DEFAULT_LIMIT, MAX_LIMIT, MAX_PAGE};

use crate::errors::JsonApiError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub unit_name: Option<String>,
    pub unit_number: Option<String>,
    pub project: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub is_available: Option<String>,
    pub pet_policy: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Default)]
struct QueryChecker {
    errors: Vec<FieldError>,
}

impl QueryChecker {
    fn fail(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(field, message));
    }

    fn present(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    fn text(&mut self, value: &Option<String>, field: &str, max: usize, message: &str) -> Option<String> {
        let v = Self::present(value)?;
        if v.chars().count() > max {
            self.fail(field, message);
            return None;
        }
        Some(v.to_string())
    }

    fn parse<T: FromStr>(&mut self, value: &Option<String>, field: &str, ok: impl Fn(&T) -> bool, message: &str) -> Option<T> {
        let v = Self::present(value)?;
        match v.parse::<T>() {
            Ok(parsed) if ok(&parsed) => Some(parsed),
            _ => {
                self.fail(field, message);
                None
            }
        }
    }

    fn pagination(&mut self, page: &Option<String>, limit: &Option<String>) -> Pagination {
        let page = self
            .parse::<u64>(page, "page", |p| (1..=MAX_PAGE).contains(p), "Page must be a positive integer")
            .unwrap_or(1);
        let limit = self
            .parse::<u64>(limit, "limit", |l| (1..=MAX_LIMIT).contains(l), "Limit must be between 1 and 100")
            .unwrap_or(DEFAULT_LIMIT);
        Pagination::new(page, limit)
    }

    fn sorting(&mut self, sort_by: &Option<String>, sort_order: &Option<String>) -> (SortField, SortOrder) {
        let by_message = format!("sortBy must be one of: {}", SortField::NAMES);
        let by = self.parse::<SortField>(sort_by, "sortBy", |_| true, &by_message).unwrap_or_default();
        let order = self
            .parse::<SortOrder>(sort_order, "sortOrder", |_| true, "sortOrder must be either asc or desc")
            .unwrap_or_default();
        (by, order)
    }

    fn search(&mut self, value: &Option<String>) -> Option<String> {
        self.text(value, "search", 100, "Search query must be between 1 and 100 characters")
    }

    fn finish<T>(self, value: T) -> Result<T, JsonApiError> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(JsonApiError::validation(self.errors))
        }
    }
}

pub fn listing_query(params: &ListingParams) -> Result<ApartmentQuery, JsonApiError> {
    let mut c = QueryChecker::default();
    let pagination = c.pagination(&params.page, &params.limit);
    let (sort_by, sort_order) = c.sorting(&params.sort_by, &params.sort_order);
    let filter = ApartmentFilter {
        search: c.search(&params.search),
        unit_name: c.text(&params.unit_name, "unitName", 100, "Unit name must be between 1 and 100 characters"),
        unit_number: c.text(&params.unit_number, "unitNumber", 20, "Unit number must be between 1 and 20 characters"),
        project: c.text(&params.project, "project", 100, "Project name must be between 1 and 100 characters"),
        city: c.text(&params.city, "city", 100, "City must be between 1 and 100 characters"),
        state: c.text(&params.state, "state", 50, "State must be between 1 and 50 characters"),
        min_price: c.parse(&params.min_price, "minPrice", |p: &f64| *p >= 0.0, "Minimum price must be a positive number"),
        max_price: c.parse(&params.max_price, "maxPrice", |p: &f64| *p >= 0.0, "Maximum price must be a positive number"),
        bedrooms: c.parse(&params.bedrooms, "bedrooms", |b: &i32| (0..=10).contains(b), "Bedrooms must be between 0 and 10"),
        bathrooms: c.parse(&params.bathrooms, "bathrooms", |b: &f64| (0.5..=10.0).contains(b), "Bathrooms must be between 0.5 and 10"),
        is_available: c.parse(&params.is_available, "isAvailable", |_: &bool| true, "isAvailable must be a boolean"),
        pet_policy: c.parse::<PetPolicy>(
            &params.pet_policy,
            "petPolicy",
            |_| true,
            "Pet policy must be one of: allowed, not-allowed, conditional",
        ),
    };
    c.finish(ApartmentQuery { filter, sort_by, sort_order, pagination })
}

pub fn owner_query(params: &ListingParams) -> Result<OwnerQuery, JsonApiError> {
    let mut c = QueryChecker::default();
    let pagination = c.pagination(&params.page, &params.limit);
    let (sort_by, sort_order) = c.sorting(&params.sort_by, &params.sort_order);
    let search = c.search(&params.search);
    c.finish(OwnerQuery { search, sort_by, sort_order, pagination })
}

/// The raw search text (may be empty; the service rejects that) and its page.
pub fn search_query(params: &SearchParams) -> Result<(String, Pagination), JsonApiError> {
    let mut c = QueryChecker::default();
    let pagination = c.pagination(&params.page, &params.limit);
    let q = params.q.as_deref().unwrap_or_default().trim().to_string();
    c.finish((q, pagination))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ListingParams {
        let map: serde_json::Map<String, serde_json::Value> =
            pairs.iter().map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string()))).collect();
        serde_json::from_value(serde_json::Value::Object(map)).unwrap()
    }

    #[test]
    fn defaults_when_nothing_is_given() {
        let q = listing_query(&ListingParams::default()).unwrap();
        assert_eq!(q.pagination, Pagination::new(1, 10));
        assert_eq!(q.sort_by, SortField::CreatedAt);
        assert_eq!(q.sort_order, SortOrder::Desc);
        assert_eq!(q.filter, ApartmentFilter::default());
    }

    #[test]
    fn zero_valued_filters_are_kept() {
        let q = listing_query(&params(&[("bedrooms", "0"), ("minPrice", "0"), ("isAvailable", "false")])).unwrap();
        assert_eq!(q.filter.bedrooms, Some(0));
        assert_eq!(q.filter.min_price, Some(0.0));
        assert_eq!(q.filter.is_available, Some(false));
    }

    #[test]
    fn collects_every_bad_parameter() {
        let err = listing_query(&params(&[
            ("page", "0"),
            ("limit", "500"),
            ("bathrooms", "0.25"),
            ("petPolicy", "cats-only"),
            ("sortBy", "rent"),
            ("sortOrder", "sideways"),
        ]))
        .unwrap_err();
        let fields: Vec<_> = err.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["page", "limit", "sortBy", "sortOrder", "bathrooms", "petPolicy"]);
        assert_eq!(err.errors[1].message, "Limit must be between 1 and 100");
    }

    #[test]
    fn out_of_range_pages_are_rejected() {
        let past_last = (MAX_PAGE + 1).to_string();
        for page in ["18446744073709551615", past_last.as_str(), "99999999999999999999"] {
            let err = listing_query(&params(&[("page", page)])).unwrap_err();
            assert_eq!(err.errors[0].field, "page", "page={page}");
            assert_eq!(err.errors[0].message, "Page must be a positive integer");
        }
        let err = search_query(&SearchParams { q: Some("loft".into()), page: Some(u64::MAX.to_string()), limit: None }).unwrap_err();
        assert_eq!(err.errors[0].field, "page");

        let last = MAX_PAGE.to_string();
        let q = listing_query(&params(&[("page", last.as_str()), ("limit", "100")])).unwrap();
        assert!(q.pagination.offset() <= i64::MAX as u64);
    }

    #[test]
    fn blank_text_filters_are_ignored() {
        let q = listing_query(&params(&[("city", "  "), ("search", ""), ("project", " Sunrise ")])).unwrap();
        assert_eq!(q.filter.city, None);
        assert_eq!(q.filter.search, None);
        assert_eq!(q.filter.project.as_deref(), Some("Sunrise"));
    }

    #[test]
    fn owner_query_reads_search_and_sort() {
        let q = owner_query(&params(&[("search", "loft"), ("sortBy", "price"), ("sortOrder", "asc"), ("page", "2")])).unwrap();
        assert_eq!(q.search.as_deref(), Some("loft"));
        assert_eq!(q.sort_by, SortField::Price);
        assert_eq!(q.sort_order, SortOrder::Asc);
        assert_eq!(q.pagination.page, 2);
    }
}
