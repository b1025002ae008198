use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::card::{CardRecord, CardRepository, GetCardError};

/// A `HashMap`-backed `CardRepository`, for tests and for standalone runs
/// with no Postgres configured. Seeded up front — the engine treats card
/// data as read-only, so there is no write path here to race against.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    cards: Arc<Mutex<HashMap<String, CardRecord>>>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, card: CardRecord) {
        self.cards.lock().await.insert(card.scryfall_id.clone(), card);
    }
}

impl CardRepository for Memory {
    async fn get_card(&self, scryfall_id: &str) -> Result<CardRecord, GetCardError> {
        self.cards
            .lock()
            .await
            .get(scryfall_id)
            .cloned()
            .ok_or_else(|| GetCardError::NotFound(scryfall_id.to_string()))
    }
}
