use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::storage_location::{CreateStorageLocationRequest, StorageLocation, StorageLocationNotFound, StorageLocationRepository};

#[derive(Debug, Clone, Default)]
pub struct Memory {
    locations: Arc<Mutex<Vec<StorageLocation>>>,
    next_id: Arc<Mutex<i64>>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageLocationRepository for Memory {
    async fn create(&self, request: CreateStorageLocationRequest) -> Result<StorageLocation, anyhow::Error> {
        let mut next_id = self.next_id.lock().await;
        *next_id += 1;
        let location = StorageLocation {
            id: *next_id,
            name: request.name,
            location_type: request.location_type,
        };
        self.locations.lock().await.push(location.clone());
        Ok(location)
    }

    async fn get(&self, id: i64) -> Result<StorageLocation, StorageLocationNotFound> {
        self.locations
            .lock()
            .await
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or(StorageLocationNotFound::Id(id))
    }

    async fn list_all(&self) -> Result<Vec<StorageLocation>, anyhow::Error> {
        Ok(self.locations.lock().await.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StorageLocationNotFound> {
        self.get(id).await?;
        self.locations.lock().await.retain(|l| l.id != id);
        Ok(())
    }
}
