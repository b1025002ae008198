/// One existing location a conflicting printing is already held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistingHolding {
    pub storage_location_id: i64,
    pub quantity: i64,
}

/// Surfaced to the caller of `Insert one copy` when other printings of the
/// same oracle card already sit in a location different from the caller's
/// preference. The pipeline never picks a location on the caller's behalf
/// in this situation — it stops short of writing anything and hands back
/// the set of existing holdings for the caller to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintingConflict {
    pub oracle_id: String,
    pub existing: Vec<ExistingHolding>,
}
