// =============================================================================
// IMPORTS
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("storage location name cannot be empty")]
pub struct StorageLocationNameEmptyError;

#[derive(Debug, Error)]
pub enum StorageLocationNotFound {
    #[error("no storage location with id {0}")]
    Id(i64),
}

#[derive(Debug, Error)]
pub enum DeleteStorageLocationError {
    #[error("storage location {0} is still referenced by one or more rules")]
    StillReferencedByRules(i64),
    #[error(transparent)]
    NotFound(#[from] StorageLocationNotFound),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

// =============================================================================
// DOMAIN NEWTYPES
// =============================================================================

/// A validated, non-empty storage location name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct StorageLocationName(String);

impl StorageLocationName {
    pub fn new(raw: &str) -> Result<Self, StorageLocationNameEmptyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Err(StorageLocationNameEmptyError)
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }
}

impl Display for StorageLocationName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for StorageLocationName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        StorageLocationName::new(&raw).map_err(serde::de::Error::custom)
    }
}

/// The two physical container kinds a card copy can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, StrumDisplay, EnumString)]
pub enum StorageLocationType {
    Box,
    Binder,
}

// =============================================================================
// MAIN DOMAIN ENTITY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageLocation {
    pub id: i64,
    pub name: StorageLocationName,
    #[serde(rename = "type")]
    pub location_type: StorageLocationType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateStorageLocationRequest {
    pub name: StorageLocationName,
    pub location_type: StorageLocationType,
}

impl CreateStorageLocationRequest {
    pub fn new(name: &str, location_type: StorageLocationType) -> Result<Self, StorageLocationNameEmptyError> {
        Ok(Self {
            name: StorageLocationName::new(name)?,
            location_type,
        })
    }
}
