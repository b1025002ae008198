// =============================================================================
// IMPORTS
// =============================================================================

use anyhow::Context;
use sqlx::FromRow;
use std::str::FromStr;

use crate::domain::storage_location::{
    CreateStorageLocationRequest, StorageLocation, StorageLocationName, StorageLocationNotFound,
    StorageLocationRepository, StorageLocationType,
};
use crate::outbound::sqlx::postgres::Postgres;

// =============================================================================
// DATABASE TYPES
// =============================================================================

#[derive(Debug, Clone, FromRow)]
struct DatabaseStorageLocation {
    id: i64,
    name: String,
    location_type: String,
}

impl TryFrom<DatabaseStorageLocation> for StorageLocation {
    type Error = anyhow::Error;

    fn try_from(value: DatabaseStorageLocation) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            name: StorageLocationName::new(&value.name).context("invalid storage location name from database")?,
            location_type: StorageLocationType::from_str(&value.location_type)
                .context("invalid storage location type from database")?,
        })
    }
}

// =============================================================================
// REPOSITORY IMPLEMENTATION
// =============================================================================

impl StorageLocationRepository for Postgres {
    async fn create(&self, request: CreateStorageLocationRequest) -> Result<StorageLocation, anyhow::Error> {
        let row: DatabaseStorageLocation = sqlx::query_as(
            "INSERT INTO storage_locations (name, location_type) VALUES ($1, $2)
             RETURNING id, name, location_type",
        )
        .bind(request.name.to_string())
        .bind(request.location_type.to_string())
        .fetch_one(&self.pool)
        .await
        .context("failed to insert storage location")?;

        row.try_into()
    }

    async fn get(&self, id: i64) -> Result<StorageLocation, StorageLocationNotFound> {
        let row: Option<DatabaseStorageLocation> =
            sqlx::query_as("SELECT id, name, location_type FROM storage_locations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|_| StorageLocationNotFound::Id(id))?;

        let row = row.ok_or(StorageLocationNotFound::Id(id))?;
        row.try_into().map_err(|_| StorageLocationNotFound::Id(id))
    }

    async fn list_all(&self) -> Result<Vec<StorageLocation>, anyhow::Error> {
        let rows: Vec<DatabaseStorageLocation> =
            sqlx::query_as("SELECT id, name, location_type FROM storage_locations ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .context("failed to list storage locations")?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete(&self, id: i64) -> Result<(), StorageLocationNotFound> {
        let result = sqlx::query("DELETE FROM storage_locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|_| StorageLocationNotFound::Id(id))?;

        if result.rows_affected() == 0 {
            return Err(StorageLocationNotFound::Id(id));
        }
        Ok(())
    }
}
