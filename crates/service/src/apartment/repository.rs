use async_trait::async_trait;
use common::types::apartment::ApartmentStatsView;
use uuid::Uuid;

use super::domain::{ApartmentDraft, ApartmentQuery, OwnerQuery};
use crate::errors::ServiceError;

pub type Apartment = models::apartment::Model;

/// Persistence for listings. Listing methods return one page plus the total
/// number of matching rows.
#[async_trait]
pub trait ApartmentRepository: Send + Sync {
    async fn list(&self, query: &ApartmentQuery) -> Result<(Vec<Apartment>, u64), ServiceError>;
    async fn list_by_owner(&self, owner_id: Uuid, query: &OwnerQuery) -> Result<(Vec<Apartment>, u64), ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<Apartment>, ServiceError>;
    /// Listing with this unit number in this project, if any.
    async fn find_unit(&self, unit_number: &str, project: &str) -> Result<Option<Apartment>, ServiceError>;
    async fn insert(&self, owner_id: Uuid, draft: ApartmentDraft) -> Result<Apartment, ServiceError>;
    async fn update(&self, existing: Apartment, draft: ApartmentDraft) -> Result<Apartment, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
    async fn stats(&self) -> Result<ApartmentStatsView, ServiceError>;
    /// Newest `cap` rows where any term occurs in the unit name, project or description.
    async fn text_candidates(&self, terms: &[String], cap: u64) -> Result<Vec<Apartment>, ServiceError>;
}
