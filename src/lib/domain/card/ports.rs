use std::future::Future;

use super::models::{CardRecord, GetCardError};

/// Read-only lookup of card data by its Scryfall printing id.
///
/// The pipeline and the rule evaluator both depend on this trait rather than
/// a concrete store, so the in-memory adapter can stand in for tests and the
/// Postgres adapter for a real deployment without either caring which one
/// it's talking to.
pub trait CardRepository: Clone + Send + Sync + 'static {
    fn get_card(
        &self,
        scryfall_id: &str,
    ) -> impl Future<Output = Result<CardRecord, GetCardError>> + Send;
}
