// src/models/place.rs
// DOCUMENTATION: Core data structures for places
// PURPOSE: Defines all serialization/deserialization models for API and database

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::AccountRef;

/// Represents a complete place record from the database
/// DOCUMENTATION: Maps directly to the places table
/// Every row belongs to exactly one account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Place {
    pub id: i64,

    /// Owning account - every query filters on it
    pub account_id: i64,

    pub street: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,

    /// ISO country code (2 or 3 letters)
    pub country: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating a new place
/// DOCUMENTATION: Body of POST /api/places
/// Every field is optional, unset fields are stored as null
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePlaceRequest {
    #[validate(length(max = 255))]
    pub street: Option<String>,

    #[validate(length(max = 255))]
    pub city: Option<String>,

    #[validate(length(max = 255))]
    pub province: Option<String>,

    #[validate(length(max = 255))]
    pub postal_code: Option<String>,

    #[validate(length(max = 3))]
    pub country: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

/// Request DTO for updating an existing place
/// DOCUMENTATION: Body of PUT /api/places/{id}
/// All fields are optional - only provided fields are updated
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePlaceRequest {
    #[validate(length(max = 255))]
    pub street: Option<String>,

    #[validate(length(max = 255))]
    pub city: Option<String>,

    #[validate(length(max = 255))]
    pub province: Option<String>,

    #[validate(length(max = 255))]
    pub postal_code: Option<String>,

    #[validate(length(max = 3))]
    pub country: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

/// Response DTO for API responses
/// DOCUMENTATION: Shape returned by every /api/places endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceResponse {
    pub id: i64,

    /// Always "place"
    pub object: String,

    pub street: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub country: Option<String>,

    /// Owning account
    pub account: AccountRef,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Place {
    /// Convert Place to PlaceResponse for API
    pub fn to_response(&self) -> PlaceResponse {
        PlaceResponse {
            id: self.id,
            object: "place".to_string(),
            street: self.street.clone(),
            city: self.city.clone(),
            province: self.province.clone(),
            postal_code: self.postal_code.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            country: self.country.clone(),
            account: AccountRef {
                id: self.account_id,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
