// =============================================================================
// IMPORTS
// =============================================================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::card::GetCardError;

use super::conflict::PrintingConflict;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, Error)]
pub enum InsertCopyError {
    #[error("quantity must be at least 1")]
    NonPositiveQuantity,
    #[error(transparent)]
    CardNotFound(#[from] GetCardError),
    /// Not strictly an error — the caller must decide how to proceed. Kept
    /// as a distinct `Result::Err` arm rather than folded into the success
    /// type so the pipeline cannot accidentally write past it.
    #[error("printing conflict: {0:?}")]
    Conflict(PrintingConflict),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum BatchMoveError {
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

// =============================================================================
// DOMAIN TYPES
// =============================================================================

/// Where an inserted copy should land. `AUTO` delegates to the Evaluator;
/// `UNASSIGNED` leaves the line with no location at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationPreference {
    Specific(i64),
    Auto,
    Unassigned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryLine {
    pub id: i64,
    pub scryfall_id: String,
    pub oracle_id: String,
    pub treatment: String,
    pub quantity: i64,
    pub storage_location_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertCopyRequest {
    pub scryfall_id: String,
    pub oracle_id: String,
    pub treatment: String,
    pub quantity: i64,
    pub location_preference: LocationPreference,
}

/// One selector line in a `Re-sort` call — either a fixed id set or every
/// line currently in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResortSelector {
    Ids(Vec<i64>),
    All,
}

/// One entry of `Re-sort`'s movement log; omitted entirely for lines whose
/// location did not change.
#[derive(Debug, Clone, PartialEq)]
pub struct Movement {
    pub inventory_line_id: i64,
    pub card_name: String,
    pub treatment: String,
    pub from_location_id: Option<i64>,
    pub to_location_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResortReport {
    pub processed: u64,
    pub updated: u64,
    pub errors: u64,
    pub movements: Vec<Movement>,
}
