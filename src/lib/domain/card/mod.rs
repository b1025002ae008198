pub mod models;
pub mod ports;
pub mod projector;

pub use models::{CardRecord, GetCardError, Prices};
pub use ports::CardRepository;
pub use projector::{normalize_date, project, project_from_json, ProjectionError};
