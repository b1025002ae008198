use std::future::Future;

use crate::domain::expr::validate_expression;
use crate::domain::storage_location::StorageLocationRepository;

use super::models::{
    validate_priority_permutation, BatchPriorityError, CreateRuleError, CreateRuleRequest,
    PriorityAssignment, RuleValidationError, SortingRule, UpdateRuleError, UpdateRuleRequest,
};
use super::ports::RuleRepository;

pub trait RuleAdministration {
    fn create(
        &self,
        request: CreateRuleRequest,
    ) -> impl Future<Output = Result<SortingRule, CreateRuleError>> + Send;

    fn update(
        &self,
        id: i64,
        request: UpdateRuleRequest,
    ) -> impl Future<Output = Result<SortingRule, UpdateRuleError>> + Send;

    fn delete(&self, id: i64) -> impl Future<Output = Result<(), anyhow::Error>> + Send;

    fn set_enabled(&self, id: i64, enabled: bool) -> impl Future<Output = Result<SortingRule, UpdateRuleError>> + Send;

    fn batch_update_priorities(
        &self,
        assignments: Vec<PriorityAssignment>,
    ) -> impl Future<Output = Result<(), BatchPriorityError>> + Send;
}

#[derive(Debug, Clone)]
pub struct Service<R, L>
where
    R: RuleRepository,
    L: StorageLocationRepository,
{
    rules: R,
    storage_locations: L,
}

impl<R, L> Service<R, L>
where
    R: RuleRepository,
    L: StorageLocationRepository,
{
    pub fn new(rules: R, storage_locations: L) -> Self {
        Self { rules, storage_locations }
    }

    async fn check_storage_location(&self, id: i64) -> Result<(), RuleValidationError> {
        self.storage_locations
            .get(id)
            .await
            .map_err(|_| RuleValidationError::UnknownStorageLocation(id))?;
        Ok(())
    }
}

impl<R, L> RuleAdministration for Service<R, L>
where
    R: RuleRepository,
    L: StorageLocationRepository,
{
    async fn create(&self, request: CreateRuleRequest) -> Result<SortingRule, CreateRuleError> {
        validate_expression(&request.expression).map_err(RuleValidationError::from)?;
        self.check_storage_location(request.storage_location_id).await?;

        let priority = self.rules.max_priority().await? + 1;

        let rule = SortingRule {
            id: 0,
            name: request.name,
            expression: request.expression,
            priority,
            storage_location_id: request.storage_location_id,
            enabled: request.enabled,
        };
        Ok(self.rules.insert(rule).await?)
    }

    async fn update(&self, id: i64, request: UpdateRuleRequest) -> Result<SortingRule, UpdateRuleError> {
        let mut current = self.rules.get(id).await?;

        if let Some(name) = request.name {
            current.name = name;
        }
        if let Some(expression) = request.expression {
            validate_expression(&expression).map_err(RuleValidationError::from)?;
            current.expression = expression;
        }
        if let Some(storage_location_id) = request.storage_location_id {
            self.check_storage_location(storage_location_id)
                .await
                .map_err(UpdateRuleError::Validation)?;
            current.storage_location_id = storage_location_id;
        }
        if let Some(priority) = request.priority {
            if priority != current.priority {
                let existing = self.rules.list_all().await?;
                if let Some(holder) = existing.iter().find(|r| r.priority == priority && r.id != id) {
                    return Err(UpdateRuleError::Validation(RuleValidationError::DuplicatePriority {
                        priority,
                        held_by: holder.id,
                    }));
                }
            }
            current.priority = priority;
        }
        if let Some(enabled) = request.enabled {
            current.enabled = enabled;
        }

        Ok(self.rules.update(current).await?)
    }

    async fn delete(&self, id: i64) -> Result<(), anyhow::Error> {
        self.rules.delete(id).await
    }

    async fn set_enabled(&self, id: i64, enabled: bool) -> Result<SortingRule, UpdateRuleError> {
        let mut current = self.rules.get(id).await?;
        current.enabled = enabled;
        Ok(self.rules.update(current).await?)
    }

    async fn batch_update_priorities(
        &self,
        assignments: Vec<PriorityAssignment>,
    ) -> Result<(), BatchPriorityError> {
        let all = self.rules.list_all().await?;
        let all_ids = all.iter().map(|r| r.id).collect();

        validate_priority_permutation(&assignments, &all_ids)?;

        self.rules.batch_update_priorities(assignments).await?;
        Ok(())
    }
}
