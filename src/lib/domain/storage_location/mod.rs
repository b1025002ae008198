pub mod models;
pub mod ports;
pub mod services;

pub use models::{
    CreateStorageLocationRequest, DeleteStorageLocationError, StorageLocation, StorageLocationName,
    StorageLocationNameEmptyError, StorageLocationNotFound, StorageLocationType,
};
pub use ports::StorageLocationRepository;
pub use services::{Service, StorageLocationAdministration};
