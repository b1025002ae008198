use std::future::Future;

use super::models::{CreateStorageLocationRequest, StorageLocation, StorageLocationNotFound};

pub trait StorageLocationRepository: Clone + Send + Sync + 'static {
    fn create(
        &self,
        request: CreateStorageLocationRequest,
    ) -> impl Future<Output = Result<StorageLocation, anyhow::Error>> + Send;

    fn get(&self, id: i64) -> impl Future<Output = Result<StorageLocation, StorageLocationNotFound>> + Send;

    fn list_all(&self) -> impl Future<Output = Result<Vec<StorageLocation>, anyhow::Error>> + Send;

    /// Unconditional delete. The RESTRICT-on-rule-reference check belongs to
    /// `storage_location::services::Administration`, which has a rule store
    /// to check against — a single-entity repository can't enforce it alone.
    fn delete(&self, id: i64) -> impl Future<Output = Result<(), StorageLocationNotFound>> + Send;
}
