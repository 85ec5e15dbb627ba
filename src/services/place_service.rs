// src/services/place_service.rs
// DOCUMENTATION: Business logic for places
// PURPOSE: Intermediary between handlers and repository, handles extra logic

use crate::db::PlaceRepository;
use crate::errors::CrmError;
use crate::models::{
    CreatePlaceRequest, DeletedResponse, PageRequest, PaginatedResponse, PlaceResponse,
    UpdatePlaceRequest,
};

pub struct PlaceService;

impl PlaceService {
    /// List the account's places, one page at a time
    pub async fn list_places(
        repo: &dyn PlaceRepository,
        account_id: i64,
        page: PageRequest,
    ) -> Result<PaginatedResponse<PlaceResponse>, CrmError> {
        let (places, total) = repo.list(account_id, &page).await?;
        let data = places.iter().map(|p| p.to_response()).collect();
        Ok(PaginatedResponse::new(data, total, &page))
    }

    /// Get one place, foreign and missing ids are both NotFound
    pub async fn get_place(
        repo: &dyn PlaceRepository,
        account_id: i64,
        id: i64,
    ) -> Result<PlaceResponse, CrmError> {
        let place = repo
            .find(account_id, id)
            .await?
            .ok_or_else(|| CrmError::NotFound("Place".to_string()))?;
        Ok(place.to_response())
    }

    /// Create a new place owned by the account
    pub async fn create_place(
        repo: &dyn PlaceRepository,
        account_id: i64,
        req: CreatePlaceRequest,
    ) -> Result<PlaceResponse, CrmError> {
        let place = repo.create(account_id, &req).await?;
        log::info!("Created place {} for account {}", place.id, account_id);
        Ok(place.to_response())
    }

    /// Partially update a place
    pub async fn update_place(
        repo: &dyn PlaceRepository,
        account_id: i64,
        id: i64,
        req: UpdatePlaceRequest,
    ) -> Result<PlaceResponse, CrmError> {
        let place = repo
            .update(account_id, id, &req)
            .await?
            .ok_or_else(|| CrmError::NotFound("Place".to_string()))?;
        log::info!("Updated place {} for account {}", place.id, account_id);
        Ok(place.to_response())
    }

    /// Delete a place
    pub async fn delete_place(
        repo: &dyn PlaceRepository,
        account_id: i64,
        id: i64,
    ) -> Result<DeletedResponse, CrmError> {
        if !repo.delete(account_id, id).await? {
            return Err(CrmError::NotFound("Place".to_string()));
        }
        log::info!("Deleted place {} for account {}", id, account_id);
        Ok(DeletedResponse { deleted: true, id })
    }
}
