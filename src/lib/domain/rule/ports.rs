use std::future::Future;

use super::models::{PriorityAssignment, RuleNotFound, SortingRule};

/// Storage contract consumed by the Evaluator and by Rule Administration.
/// Production uses Postgres; tests use an in-memory map.
pub trait RuleRepository: Clone + Send + Sync + 'static {
    /// Ascending priority, ties by ascending id, enabled rules only — the
    /// exact order the Evaluator consults.
    fn list_enabled_ordered_by_priority(
        &self,
    ) -> impl Future<Output = Result<Vec<SortingRule>, anyhow::Error>> + Send;

    fn list_all(&self) -> impl Future<Output = Result<Vec<SortingRule>, anyhow::Error>> + Send;

    fn get(&self, id: i64) -> impl Future<Output = Result<SortingRule, RuleNotFound>> + Send;

    fn insert(&self, rule: SortingRule) -> impl Future<Output = Result<SortingRule, anyhow::Error>> + Send;

    fn update(&self, rule: SortingRule) -> impl Future<Output = Result<SortingRule, anyhow::Error>> + Send;

    fn delete(&self, id: i64) -> impl Future<Output = Result<(), anyhow::Error>> + Send;

    /// Applied atomically: either every pair lands, or none does.
    fn batch_update_priorities(
        &self,
        assignments: Vec<PriorityAssignment>,
    ) -> impl Future<Output = Result<(), anyhow::Error>> + Send;

    fn max_priority(&self) -> impl Future<Output = Result<i64, anyhow::Error>> + Send;
}
