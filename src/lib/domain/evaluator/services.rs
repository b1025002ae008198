use std::future::Future;

use tracing::debug;

use crate::domain::expr::{self, Value};
use crate::domain::rule::{RuleRepository, SortingRule};

use super::models::EvaluationOutcome;

pub trait Evaluator {
    /// Loads all enabled rules ordered by priority, then delegates to
    /// `evaluate_card_with_rules`.
    fn evaluate_card(
        &self,
        card_data: &Value,
    ) -> impl Future<Output = Result<EvaluationOutcome, anyhow::Error>> + Send;

    /// Runs `card_data` against an already-fetched rule list, in the order
    /// given. Disabled rules are skipped regardless of list order, so a
    /// caller doesn't have to pre-filter before calling this. Exposed
    /// separately so re-sort can prefetch once and reuse it across every
    /// line.
    fn evaluate_card_with_rules(&self, card_data: &Value, rules: &[SortingRule]) -> EvaluationOutcome;
}

#[derive(Debug, Clone)]
pub struct Service<R>
where
    R: RuleRepository,
{
    rules: R,
}

impl<R> Service<R>
where
    R: RuleRepository,
{
    pub fn new(rules: R) -> Self {
        Self { rules }
    }
}

impl<R> Evaluator for Service<R>
where
    R: RuleRepository,
{
    async fn evaluate_card(&self, card_data: &Value) -> Result<EvaluationOutcome, anyhow::Error> {
        let rules = self.rules.list_enabled_ordered_by_priority().await?;
        Ok(self.evaluate_card_with_rules(card_data, &rules))
    }

    fn evaluate_card_with_rules(&self, card_data: &Value, rules: &[SortingRule]) -> EvaluationOutcome {
        for rule in rules.iter().filter(|r| r.enabled) {
            let program = match expr::compile(&rule.expression) {
                Ok(program) => program,
                Err(err) => {
                    debug!(rule_id = rule.id, %err, "stored rule failed to compile, skipping");
                    continue;
                }
            };
            match program.evaluate(card_data) {
                Ok(true) => {
                    return EvaluationOutcome::Matched {
                        storage_location_id: rule.storage_location_id,
                    }
                }
                Ok(false) => continue,
                Err(err) => {
                    debug!(rule_id = rule.id, %err, "rule evaluation failed, skipping");
                    continue;
                }
            }
        }
        EvaluationOutcome::NoMatch
    }
}
