use std::cmp::Reverse;
use std::sync::Arc;

use common::types::apartment::{ApartmentInput, ApartmentStatsView};
use tracing::{info, instrument};
use uuid::Uuid;

use super::domain::{ensure_owner, input_from_model, overlay, ApartmentDraft, ApartmentQuery, OwnerQuery, DUPLICATE_UNIT};
use super::repository::{Apartment, ApartmentRepository};
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};
use crate::search;

/// Listing service independent of web framework
pub struct ApartmentService<R: ApartmentRepository> {
    repo: Arc<R>,
    search_cap: u64,
}

fn not_found() -> ServiceError {
    ServiceError::NotFound("Apartment not found".into())
}

impl<R: ApartmentRepository> ApartmentService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo, search_cap: search::MAX_CANDIDATES } }

    /// Override how many candidate rows one search may load.
    pub fn with_search_cap(mut self, cap: u64) -> Self {
        self.search_cap = cap.max(1);
        self
    }

    #[instrument(skip(self))]
    pub async fn list(&self, query: ApartmentQuery) -> Result<Page<Apartment>, ServiceError> {
        let (items, total) = self.repo.list(&query).await?;
        Ok(Page::new(items, query.pagination, total))
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Apartment>, ServiceError> {
        self.repo.get(id).await
    }

    /// Like [`get`](Self::get) but a missing listing is an error.
    pub async fn find(&self, id: Uuid) -> Result<Apartment, ServiceError> {
        self.repo.get(id).await?.ok_or_else(not_found)
    }

    #[instrument(skip(self))]
    pub async fn list_for_owner(&self, owner_id: Uuid, query: OwnerQuery) -> Result<Page<Apartment>, ServiceError> {
        let (items, total) = self.repo.list_by_owner(owner_id, &query).await?;
        Ok(Page::new(items, query.pagination, total))
    }

    /// Create a listing for `owner_id`. `uploaded` image URLs follow any in the body.
    #[instrument(skip(self, input, uploaded), fields(owner_id = %owner_id))]
    pub async fn create(&self, owner_id: Uuid, mut input: ApartmentInput, uploaded: Vec<String>) -> Result<Apartment, ServiceError> {
        let mut images = input.images.take().unwrap_or_default();
        images.extend(uploaded);
        input.images = Some(images);
        input.existing_images = None;

        let draft = ApartmentDraft::validate(input).map_err(ServiceError::Validation)?;
        if self.repo.find_unit(&draft.unit_number, &draft.project).await?.is_some() {
            return Err(ServiceError::Conflict(DUPLICATE_UNIT.into()));
        }
        let created = self.repo.insert(owner_id, draft).await?;
        info!(apartment_id = %created.id, unit = %created.unit_number, project = %created.project, "apartment_created");
        Ok(created)
    }

    /// Owner-only partial update. The kept image list is `existing_images`,
    /// else `images`, else the stored list; `uploaded` URLs are appended.
    #[instrument(skip(self, patch, uploaded), fields(actor_id = %actor_id, apartment_id = %id))]
    pub async fn update(&self, actor_id: Uuid, id: Uuid, mut patch: ApartmentInput, uploaded: Vec<String>) -> Result<Apartment, ServiceError> {
        let existing = self.find(id).await?;
        ensure_owner(existing.user_id, actor_id, "update")?;

        let mut images = patch
            .existing_images
            .take()
            .or_else(|| patch.images.take())
            .unwrap_or_else(|| existing.images.0.clone());
        images.extend(uploaded);
        patch.images = Some(images);

        let merged = overlay(input_from_model(&existing), patch);
        let draft = ApartmentDraft::validate(merged).map_err(ServiceError::Validation)?;
        if draft.unit_number != existing.unit_number || draft.project != existing.project {
            if let Some(other) = self.repo.find_unit(&draft.unit_number, &draft.project).await? {
                if other.id != id {
                    return Err(ServiceError::Conflict(DUPLICATE_UNIT.into()));
                }
            }
        }
        let updated = self.repo.update(existing, draft).await?;
        info!("apartment_updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, actor_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.find(id).await?;
        ensure_owner(existing.user_id, actor_id, "delete")?;
        if !self.repo.delete(id).await? {
            return Err(not_found());
        }
        info!("apartment_deleted");
        Ok(())
    }

    pub async fn stats(&self) -> Result<ApartmentStatsView, ServiceError> {
        self.repo.stats().await
    }

    /// Relevance-ranked search over unit name, project and description.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, pagination: Pagination) -> Result<Page<Apartment>, ServiceError> {
        let terms = search::terms(query);
        if terms.is_empty() {
            return Err(ServiceError::BadRequest("Search query is required".into()));
        }
        let mut scored: Vec<(u32, Apartment)> = self
            .repo
            .text_candidates(&terms, self.search_cap)
            .await?
            .into_iter()
            .map(|a| (search::score(&terms, &[a.unit_name.as_str(), a.project.as_str(), a.description.as_str()]), a))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by_key(|(score, a)| (Reverse(*score), Reverse(a.created_at), a.id));

        let total = scored.len() as u64;
        let items = scored
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit as usize)
            .map(|(_, a)| a)
            .collect();
        Ok(Page::new(items, pagination, total))
    }
}
