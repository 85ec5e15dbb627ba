// src/db/place_repository.rs
// DOCUMENTATION: Database access layer for places
// PURPOSE: All SQL touching the places table

use super::{database_error, PlaceRepository};
use crate::errors::CrmError;
use crate::models::*;
use async_trait::async_trait;
use sqlx::PgPool;

const PLACE_COLUMNS: &str = r#"
    id, account_id, street, city, province, postal_code, country,
    latitude, longitude, created_at, updated_at
"#;

/// PgPlaceRepository: places stored in PostgreSQL
/// DOCUMENTATION: Every statement carries `account_id = $n` so foreign rows
/// behave exactly like missing ones
pub struct PgPlaceRepository {
    pool: PgPool,
}

impl PgPlaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaceRepository for PgPlaceRepository {
    async fn list(
        &self,
        account_id: i64,
        page: &PageRequest,
    ) -> Result<(Vec<Place>, i64), CrmError> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM places WHERE account_id = $1")
            .bind(account_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("count places", e))?;

        // ORDER BY comes from a closed enum, never from user input
        let sql = format!(
            "SELECT {} FROM places WHERE account_id = $1 ORDER BY {} LIMIT $2 OFFSET $3",
            PLACE_COLUMNS,
            page.sort.sql()
        );

        let places = sqlx::query_as::<_, Place>(&sql)
            .bind(account_id)
            .bind(page.per_page)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error("list places", e))?;

        Ok((places, total.0))
    }

    async fn find(&self, account_id: i64, id: i64) -> Result<Option<Place>, CrmError> {
        let sql = format!(
            "SELECT {} FROM places WHERE id = $1 AND account_id = $2",
            PLACE_COLUMNS
        );

        sqlx::query_as::<_, Place>(&sql)
            .bind(id)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("fetch place", e))
    }

    async fn create(&self, account_id: i64, req: &CreatePlaceRequest) -> Result<Place, CrmError> {
        let sql = format!(
            r#"
            INSERT INTO places (
                account_id, street, city, province, postal_code, country,
                latitude, longitude, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            RETURNING {}
            "#,
            PLACE_COLUMNS
        );

        let place = sqlx::query_as::<_, Place>(&sql)
            .bind(account_id) // $1
            .bind(&req.street) // $2
            .bind(&req.city) // $3
            .bind(&req.province) // $4
            .bind(&req.postal_code) // $5
            .bind(&req.country) // $6
            .bind(req.latitude) // $7
            .bind(req.longitude) // $8
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("create place", e))?;

        Ok(place)
    }

    async fn update(
        &self,
        account_id: i64,
        id: i64,
        req: &UpdatePlaceRequest,
    ) -> Result<Option<Place>, CrmError> {
        // COALESCE keeps the stored value for every field left out of the request
        let sql = format!(
            r#"
            UPDATE places
            SET street = COALESCE($3, street),
                city = COALESCE($4, city),
                province = COALESCE($5, province),
                postal_code = COALESCE($6, postal_code),
                country = COALESCE($7, country),
                latitude = COALESCE($8, latitude),
                longitude = COALESCE($9, longitude),
                updated_at = NOW()
            WHERE id = $1 AND account_id = $2
            RETURNING {}
            "#,
            PLACE_COLUMNS
        );

        sqlx::query_as::<_, Place>(&sql)
            .bind(id)
            .bind(account_id)
            .bind(&req.street)
            .bind(&req.city)
            .bind(&req.province)
            .bind(&req.postal_code)
            .bind(&req.country)
            .bind(req.latitude)
            .bind(req.longitude)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database_error("update place", e))
    }

    async fn delete(&self, account_id: i64, id: i64) -> Result<bool, CrmError> {
        let result = sqlx::query("DELETE FROM places WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("delete place", e))?;

        Ok(result.rows_affected() > 0)
    }
}
