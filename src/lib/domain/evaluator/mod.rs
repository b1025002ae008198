pub mod models;
pub mod services;

pub use models::EvaluationOutcome;
pub use services::{Evaluator, Service};
