// =============================================================================
// IMPORTS
// =============================================================================

use anyhow::Context;
use sqlx::FromRow;

use crate::domain::inventory::{InventoryLine, InventoryRepository};
use crate::outbound::sqlx::postgres::Postgres;

// =============================================================================
// DATABASE TYPES
// =============================================================================

#[derive(Debug, Clone, FromRow)]
struct DatabaseInventoryLine {
    id: i64,
    scryfall_id: String,
    oracle_id: String,
    treatment: String,
    quantity: i64,
    storage_location_id: Option<i64>,
}

impl From<DatabaseInventoryLine> for InventoryLine {
    fn from(value: DatabaseInventoryLine) -> Self {
        Self {
            id: value.id,
            scryfall_id: value.scryfall_id,
            oracle_id: value.oracle_id,
            treatment: value.treatment,
            quantity: value.quantity,
            storage_location_id: value.storage_location_id,
        }
    }
}

const SELECT_FIELDS: &str = "id, scryfall_id, oracle_id, treatment, quantity, storage_location_id";

// =============================================================================
// REPOSITORY IMPLEMENTATION
// =============================================================================

impl InventoryRepository for Postgres {
    async fn find_by_oracle_id(&self, oracle_id: &str) -> Result<Vec<InventoryLine>, anyhow::Error> {
        let rows: Vec<DatabaseInventoryLine> = sqlx::query_as(&format!(
            "SELECT {SELECT_FIELDS} FROM inventory_lines WHERE oracle_id = $1"
        ))
        .bind(oracle_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to look up inventory lines by oracle id")?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_line(
        &self,
        scryfall_id: &str,
        treatment: &str,
        storage_location_id: Option<i64>,
    ) -> Result<Option<InventoryLine>, anyhow::Error> {
        let row: Option<DatabaseInventoryLine> = sqlx::query_as(&format!(
            "SELECT {SELECT_FIELDS} FROM inventory_lines
             WHERE scryfall_id = $1 AND treatment = $2 AND storage_location_id IS NOT DISTINCT FROM $3"
        ))
        .bind(scryfall_id)
        .bind(treatment)
        .bind(storage_location_id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to look up inventory line")?;

        Ok(row.map(Into::into))
    }

    /// `storage_location_id` is nullable and a plain unique index treats
    /// `NULL` as distinct from `NULL`, so `ON CONFLICT` can't be used to
    /// merge two `Unassigned` lines for the same printing. Instead this
    /// locks the matching row with the same `IS NOT DISTINCT FROM` lookup
    /// `find_line` uses, then updates or inserts inside one transaction —
    /// the lock closes the race two concurrent upserts would otherwise hit.
    async fn upsert(
        &self,
        scryfall_id: &str,
        oracle_id: &str,
        treatment: &str,
        quantity: i64,
        storage_location_id: Option<i64>,
    ) -> Result<InventoryLine, anyhow::Error> {
        let mut tx = self.pool.begin().await.context("failed to open transaction")?;

        let existing: Option<DatabaseInventoryLine> = sqlx::query_as(&format!(
            "SELECT {SELECT_FIELDS} FROM inventory_lines
             WHERE scryfall_id = $1 AND treatment = $2 AND storage_location_id IS NOT DISTINCT FROM $3
             FOR UPDATE"
        ))
        .bind(scryfall_id)
        .bind(treatment)
        .bind(storage_location_id)
        .fetch_optional(&mut *tx)
        .await
        .context("failed to look up inventory line for upsert")?;

        let row: DatabaseInventoryLine = match existing {
            Some(existing) => sqlx::query_as(&format!(
                "UPDATE inventory_lines SET quantity = quantity + $1 WHERE id = $2 RETURNING {SELECT_FIELDS}"
            ))
            .bind(quantity)
            .bind(existing.id)
            .fetch_one(&mut *tx)
            .await
            .context("failed to update inventory line quantity")?,
            None => sqlx::query_as(&format!(
                "INSERT INTO inventory_lines (scryfall_id, oracle_id, treatment, quantity, storage_location_id)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING {SELECT_FIELDS}"
            ))
            .bind(scryfall_id)
            .bind(oracle_id)
            .bind(treatment)
            .bind(quantity)
            .bind(storage_location_id)
            .fetch_one(&mut *tx)
            .await
            .context("failed to insert inventory line")?,
        };

        tx.commit().await.context("failed to commit inventory upsert")?;
        Ok(row.into())
    }

    async fn batch_move(&self, ids: &[i64], target_location_id: Option<i64>) -> Result<u64, anyhow::Error> {
        let result = sqlx::query("UPDATE inventory_lines SET storage_location_id = $1 WHERE id = ANY($2)")
            .bind(target_location_id)
            .bind(ids)
            .execute(&self.pool)
            .await
            .context("failed to batch move inventory lines")?;

        Ok(result.rows_affected())
    }

    async fn batch_delete(&self, ids: &[i64]) -> Result<u64, anyhow::Error> {
        let result = sqlx::query("DELETE FROM inventory_lines WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .context("failed to batch delete inventory lines")?;

        Ok(result.rows_affected())
    }

    async fn list_all(&self) -> Result<Vec<InventoryLine>, anyhow::Error> {
        let rows: Vec<DatabaseInventoryLine> = sqlx::query_as(&format!(
            "SELECT {SELECT_FIELDS} FROM inventory_lines ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .context("failed to list inventory lines")?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_by_ids(&self, ids: &[i64]) -> Result<Vec<InventoryLine>, anyhow::Error> {
        let rows: Vec<DatabaseInventoryLine> = sqlx::query_as(&format!(
            "SELECT {SELECT_FIELDS} FROM inventory_lines WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .context("failed to list inventory lines by id")?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_location(&self, id: i64, storage_location_id: Option<i64>) -> Result<(), anyhow::Error> {
        sqlx::query("UPDATE inventory_lines SET storage_location_id = $1 WHERE id = $2")
            .bind(storage_location_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to update location for inventory line {id}"))?;

        Ok(())
    }
}
