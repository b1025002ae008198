use std::future::Future;

use super::models::InventoryLine;

/// Storage contract consumed by the Sort Pipeline. `upsert` is the one
/// operation that must serialize concurrent writers at the store level —
/// see the concurrency notes on `SortPipeline::insert_one_copy`.
pub trait InventoryRepository: Clone + Send + Sync + 'static {
    fn find_by_oracle_id(
        &self,
        oracle_id: &str,
    ) -> impl Future<Output = Result<Vec<InventoryLine>, anyhow::Error>> + Send;

    fn find_line(
        &self,
        scryfall_id: &str,
        treatment: &str,
        storage_location_id: Option<i64>,
    ) -> impl Future<Output = Result<Option<InventoryLine>, anyhow::Error>> + Send;

    /// Creates the line if none with this exact `(scryfall_id, treatment,
    /// storage_location_id)` exists yet; otherwise increments its quantity.
    fn upsert(
        &self,
        scryfall_id: &str,
        oracle_id: &str,
        treatment: &str,
        quantity: i64,
        storage_location_id: Option<i64>,
    ) -> impl Future<Output = Result<InventoryLine, anyhow::Error>> + Send;

    /// Moves every id in `ids` to `target_location_id` as one atomic unit.
    /// Returns the number of rows updated, or fails the whole batch.
    fn batch_move(
        &self,
        ids: &[i64],
        target_location_id: Option<i64>,
    ) -> impl Future<Output = Result<u64, anyhow::Error>> + Send;

    fn batch_delete(&self, ids: &[i64]) -> impl Future<Output = Result<u64, anyhow::Error>> + Send;

    fn list_all(&self) -> impl Future<Output = Result<Vec<InventoryLine>, anyhow::Error>> + Send;

    fn list_by_ids(&self, ids: &[i64]) -> impl Future<Output = Result<Vec<InventoryLine>, anyhow::Error>> + Send;

    fn update_location(
        &self,
        id: i64,
        storage_location_id: Option<i64>,
    ) -> impl Future<Output = Result<(), anyhow::Error>> + Send;
}
