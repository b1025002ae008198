/// The outcome of evaluating a Rule Set against a projected card: either
/// the storage location owned by the first matching rule, or no match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationOutcome {
    Matched { storage_location_id: i64 },
    NoMatch,
}

impl EvaluationOutcome {
    pub fn storage_location_id(self) -> Option<i64> {
        match self {
            EvaluationOutcome::Matched { storage_location_id } => Some(storage_location_id),
            EvaluationOutcome::NoMatch => None,
        }
    }
}
