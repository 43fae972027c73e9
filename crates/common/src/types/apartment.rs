use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PetPolicy {
    Allowed,
    NotAllowed,
    Conditional,
}

impl PetPolicy {
    pub const ALL: [PetPolicy; 3] = [PetPolicy::Allowed, PetPolicy::NotAllowed, PetPolicy::Conditional];

    pub fn as_str(self) -> &'static str {
        match self {
            PetPolicy::Allowed => "allowed",
            PetPolicy::NotAllowed => "not-allowed",
            PetPolicy::Conditional => "conditional",
        }
    }
}

impl fmt::Display for PetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PetPolicy::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown pet policy: {s}"))
    }
}

/// A listing as returned by the API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentView {
    pub id: Uuid,
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_plan: Option<String>,
    pub pet_policy: PetPolicy,
    pub parking_spaces: i32,
    pub lease_terms: Vec<String>,
    pub contact_email: String,
    pub contact_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_tour_url: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update body. Every field is optional on the wire; create requires
/// the mandatory ones during validation so that each gap is reported per field.
#[derive(Serialize, Deserialize, Debug, Clone, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub square_footage: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    /// Update only: image URLs to keep before appending uploads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking_spaces: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease_terms: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_tour_url: Option<String>,
}

/// Query string for the listing endpoints, as sent by clients.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet_policy: Option<PetPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, ToSchema)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentStatsView {
    pub total: u64,
    pub available: u64,
    pub unavailable: u64,
    pub average_price: f64,
    pub price_range: PriceRange,
    /// Bedroom count -> number of listings, ascending by bedroom count.
    #[schema(value_type = Object)]
    pub bedroom_distribution: BTreeMap<i32, u64>,
    /// Project -> number of listings, most listings first.
    #[schema(value_type = Object)]
    pub project_counts: ProjectCounts,
}

/// Ordered project counts, encoded as a JSON object whose key order is the
/// descending count order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectCounts(pub Vec<(String, u64)>);

impl ProjectCounts {
    pub fn get(&self, project: &str) -> Option<u64> {
        self.0.iter().find(|(p, _)| p == project).map(|(_, c)| *c)
    }
}

impl Serialize for ProjectCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (project, count) in &self.0 {
            map.serialize_entry(project, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ProjectCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountsVisitor;

        impl<'de> Visitor<'de> for CountsVisitor {
            type Value = ProjectCounts;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of project name to listing count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((project, count)) = access.next_entry::<String, u64>()? {
                    entries.push((project, count));
                }
                Ok(ProjectCounts(entries))
            }
        }

        deserializer.deserialize_map(CountsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_policy_uses_kebab_case_on_the_wire() {
        assert_eq!(serde_json::to_value(PetPolicy::NotAllowed).unwrap(), "not-allowed");
        assert_eq!("conditional".parse::<PetPolicy>().unwrap(), PetPolicy::Conditional);
        assert!("cats-only".parse::<PetPolicy>().is_err());
    }

    #[test]
    fn project_counts_keep_their_order() {
        let counts = ProjectCounts(vec![("Zeta".into(), 5), ("Alpha".into(), 2)]);
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"Zeta":5,"Alpha":2}"#);
        let back: ProjectCounts = serde_json::from_str(&json).unwrap();
        assert_eq!(back, counts);
        assert_eq!(back.get("Alpha"), Some(2));
    }

    #[test]
    fn filters_skip_unset_fields() {
        let f = ApartmentFilters { min_price: Some(1000.0), sort_by: Some("price".into()), ..Default::default() };
        let v = serde_json::to_value(&f).unwrap();
        assert_eq!(v, serde_json::json!({"minPrice": 1000.0, "sortBy": "price"}));
    }
}
