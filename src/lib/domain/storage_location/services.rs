use std::future::Future;

use crate::domain::rule::RuleRepository;

use super::models::{CreateStorageLocationRequest, DeleteStorageLocationError, StorageLocation, StorageLocationNotFound};
use super::ports::StorageLocationRepository;

pub trait StorageLocationAdministration {
    fn create(
        &self,
        request: CreateStorageLocationRequest,
    ) -> impl Future<Output = Result<StorageLocation, anyhow::Error>> + Send;

    fn get(&self, id: i64) -> impl Future<Output = Result<StorageLocation, StorageLocationNotFound>> + Send;

    fn list_all(&self) -> impl Future<Output = Result<Vec<StorageLocation>, anyhow::Error>> + Send;

    fn delete(&self, id: i64) -> impl Future<Output = Result<(), DeleteStorageLocationError>> + Send;
}

#[derive(Debug, Clone)]
pub struct Service<L, R>
where
    L: StorageLocationRepository,
    R: RuleRepository,
{
    locations: L,
    rules: R,
}

impl<L, R> Service<L, R>
where
    L: StorageLocationRepository,
    R: RuleRepository,
{
    pub fn new(locations: L, rules: R) -> Self {
        Self { locations, rules }
    }
}

impl<L, R> StorageLocationAdministration for Service<L, R>
where
    L: StorageLocationRepository,
    R: RuleRepository,
{
    async fn create(&self, request: CreateStorageLocationRequest) -> Result<StorageLocation, anyhow::Error> {
        self.locations.create(request).await
    }

    async fn get(&self, id: i64) -> Result<StorageLocation, StorageLocationNotFound> {
        self.locations.get(id).await
    }

    async fn list_all(&self) -> Result<Vec<StorageLocation>, anyhow::Error> {
        self.locations.list_all().await
    }

    async fn delete(&self, id: i64) -> Result<(), DeleteStorageLocationError> {
        let referencing = self.rules.list_all().await?.into_iter().filter(|r| r.storage_location_id == id).count();
        if referencing > 0 {
            return Err(DeleteStorageLocationError::StillReferencedByRules(id));
        }
        self.locations.delete(id).await?;
        Ok(())
    }
}
