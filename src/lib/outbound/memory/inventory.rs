use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::inventory::{InventoryLine, InventoryRepository};

/// A single mutex over the whole line list. This is the in-process analog
/// of the reference deployment's single-writer SQLite connection: every
/// `upsert` takes the lock for its whole read-modify-write, so two
/// concurrent inserts into the same `(scryfall_id, treatment, location)`
/// cannot race each other into two separate rows.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    lines: Arc<Mutex<Vec<InventoryLine>>>,
    next_id: Arc<Mutex<i64>>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InventoryRepository for Memory {
    async fn find_by_oracle_id(&self, oracle_id: &str) -> Result<Vec<InventoryLine>, anyhow::Error> {
        Ok(self.lines.lock().await.iter().filter(|l| l.oracle_id == oracle_id).cloned().collect())
    }

    async fn find_line(
        &self,
        scryfall_id: &str,
        treatment: &str,
        storage_location_id: Option<i64>,
    ) -> Result<Option<InventoryLine>, anyhow::Error> {
        Ok(self
            .lines
            .lock()
            .await
            .iter()
            .find(|l| {
                l.scryfall_id == scryfall_id && l.treatment == treatment && l.storage_location_id == storage_location_id
            })
            .cloned())
    }

    async fn upsert(
        &self,
        scryfall_id: &str,
        oracle_id: &str,
        treatment: &str,
        quantity: i64,
        storage_location_id: Option<i64>,
    ) -> Result<InventoryLine, anyhow::Error> {
        let mut lines = self.lines.lock().await;
        if let Some(existing) = lines.iter_mut().find(|l| {
            l.scryfall_id == scryfall_id && l.treatment == treatment && l.storage_location_id == storage_location_id
        }) {
            existing.quantity += quantity;
            return Ok(existing.clone());
        }

        let mut next_id = self.next_id.lock().await;
        *next_id += 1;
        let line = InventoryLine {
            id: *next_id,
            scryfall_id: scryfall_id.to_string(),
            oracle_id: oracle_id.to_string(),
            treatment: treatment.to_string(),
            quantity,
            storage_location_id,
        };
        lines.push(line.clone());
        Ok(line)
    }

    async fn batch_move(&self, ids: &[i64], target_location_id: Option<i64>) -> Result<u64, anyhow::Error> {
        let mut updated = 0;
        let mut lines = self.lines.lock().await;
        for line in lines.iter_mut() {
            if ids.contains(&line.id) {
                line.storage_location_id = target_location_id;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn batch_delete(&self, ids: &[i64]) -> Result<u64, anyhow::Error> {
        let mut lines = self.lines.lock().await;
        let before = lines.len();
        lines.retain(|l| !ids.contains(&l.id));
        Ok((before - lines.len()) as u64)
    }

    async fn list_all(&self) -> Result<Vec<InventoryLine>, anyhow::Error> {
        Ok(self.lines.lock().await.clone())
    }

    async fn list_by_ids(&self, ids: &[i64]) -> Result<Vec<InventoryLine>, anyhow::Error> {
        Ok(self.lines.lock().await.iter().filter(|l| ids.contains(&l.id)).cloned().collect())
    }

    async fn update_location(&self, id: i64, storage_location_id: Option<i64>) -> Result<(), anyhow::Error> {
        if let Some(line) = self.lines.lock().await.iter_mut().find(|l| l.id == id) {
            line.storage_location_id = storage_location_id;
        }
        Ok(())
    }
}
