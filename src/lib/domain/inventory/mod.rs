pub mod conflict;
pub mod models;
pub mod ports;
pub mod services;

pub use conflict::{ExistingHolding, PrintingConflict};
pub use models::{
    BatchMoveError, InsertCopyError, InsertCopyRequest, InventoryLine, LocationPreference, Movement,
    ResortReport, ResortSelector,
};
pub use ports::InventoryRepository;
pub use services::{Service, SortPipeline};
