// =============================================================================
// IMPORTS
// =============================================================================

use anyhow::{anyhow, Context};
use sqlx::FromRow;

use crate::domain::rule::{PriorityAssignment, RuleName, RuleNotFound, RuleRepository, SortingRule};
use crate::outbound::sqlx::postgres::Postgres;

// =============================================================================
// DATABASE TYPES
// =============================================================================

#[derive(Debug, Clone, FromRow)]
struct DatabaseRule {
    id: i64,
    name: String,
    expression: String,
    priority: i64,
    storage_location_id: i64,
    enabled: bool,
}

impl TryFrom<DatabaseRule> for SortingRule {
    type Error = anyhow::Error;

    fn try_from(value: DatabaseRule) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            name: RuleName::new(&value.name).context("invalid rule name from database")?,
            expression: value.expression,
            priority: value.priority,
            storage_location_id: value.storage_location_id,
            enabled: value.enabled,
        })
    }
}

// =============================================================================
// REPOSITORY IMPLEMENTATION
// =============================================================================

const SELECT_FIELDS: &str = "id, name, expression, priority, storage_location_id, enabled";

impl RuleRepository for Postgres {
    async fn list_enabled_ordered_by_priority(&self) -> Result<Vec<SortingRule>, anyhow::Error> {
        let rows: Vec<DatabaseRule> = sqlx::query_as(&format!(
            "SELECT {SELECT_FIELDS} FROM sorting_rules WHERE enabled ORDER BY priority ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .context("failed to list enabled rules")?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_all(&self) -> Result<Vec<SortingRule>, anyhow::Error> {
        let rows: Vec<DatabaseRule> = sqlx::query_as(&format!(
            "SELECT {SELECT_FIELDS} FROM sorting_rules ORDER BY priority ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .context("failed to list rules")?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: i64) -> Result<SortingRule, RuleNotFound> {
        let row: Option<DatabaseRule> = sqlx::query_as(&format!("SELECT {SELECT_FIELDS} FROM sorting_rules WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|_| RuleNotFound::Id(id))?;

        let row = row.ok_or(RuleNotFound::Id(id))?;
        row.try_into().map_err(|_| RuleNotFound::Id(id))
    }

    async fn insert(&self, rule: SortingRule) -> Result<SortingRule, anyhow::Error> {
        let row: DatabaseRule = sqlx::query_as(&format!(
            "INSERT INTO sorting_rules (name, expression, priority, storage_location_id, enabled)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {SELECT_FIELDS}"
        ))
        .bind(rule.name.as_str())
        .bind(&rule.expression)
        .bind(rule.priority)
        .bind(rule.storage_location_id)
        .bind(rule.enabled)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert rule")?;

        row.try_into()
    }

    async fn update(&self, rule: SortingRule) -> Result<SortingRule, anyhow::Error> {
        let row: DatabaseRule = sqlx::query_as(&format!(
            "UPDATE sorting_rules
             SET name = $1, expression = $2, priority = $3, storage_location_id = $4, enabled = $5
             WHERE id = $6
             RETURNING {SELECT_FIELDS}"
        ))
        .bind(rule.name.as_str())
        .bind(&rule.expression)
        .bind(rule.priority)
        .bind(rule.storage_location_id)
        .bind(rule.enabled)
        .bind(rule.id)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to update rule {}", rule.id))?;

        row.try_into()
    }

    async fn delete(&self, id: i64) -> Result<(), anyhow::Error> {
        let result = sqlx::query("DELETE FROM sorting_rules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete rule {id}"))?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("no rule with id {id}"));
        }
        Ok(())
    }

    /// Runs every pair inside one transaction: either every priority lands
    /// or the whole batch rolls back.
    async fn batch_update_priorities(&self, assignments: Vec<PriorityAssignment>) -> Result<(), anyhow::Error> {
        let mut tx = self.pool.begin().await.context("failed to open transaction")?;

        for assignment in assignments {
            sqlx::query("UPDATE sorting_rules SET priority = $1 WHERE id = $2")
                .bind(assignment.priority)
                .bind(assignment.rule_id)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("failed to set priority for rule {}", assignment.rule_id))?;
        }

        tx.commit().await.context("failed to commit priority batch")?;
        Ok(())
    }

    async fn max_priority(&self) -> Result<i64, anyhow::Error> {
        let max: Option<i64> = sqlx::query_scalar("SELECT MAX(priority) FROM sorting_rules")
            .fetch_one(&self.pool)
            .await
            .context("failed to read max priority")?;

        Ok(max.unwrap_or(0))
    }
}
