use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::Mutex;

use crate::domain::rule::{PriorityAssignment, RuleNotFound, RuleRepository, SortingRule};

/// Single mutex over the whole rule list — a deliberately simple model of
/// the "serialize writers against each other, and against readers" rule
/// from the concurrency model. Every operation here takes the lock, so
/// there's no separate read/write path to get out of sync.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    rules: Arc<Mutex<Vec<SortingRule>>>,
    next_id: Arc<Mutex<i64>>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RuleRepository for Memory {
    async fn list_enabled_ordered_by_priority(&self) -> Result<Vec<SortingRule>, anyhow::Error> {
        let mut rules: Vec<SortingRule> =
            self.rules.lock().await.iter().filter(|r| r.enabled).cloned().collect();
        rules.sort_by_key(|r| (r.priority, r.id));
        Ok(rules)
    }

    async fn list_all(&self) -> Result<Vec<SortingRule>, anyhow::Error> {
        Ok(self.rules.lock().await.clone())
    }

    async fn get(&self, id: i64) -> Result<SortingRule, RuleNotFound> {
        self.rules
            .lock()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RuleNotFound::Id(id))
    }

    async fn insert(&self, mut rule: SortingRule) -> Result<SortingRule, anyhow::Error> {
        let mut next_id = self.next_id.lock().await;
        *next_id += 1;
        rule.id = *next_id;
        self.rules.lock().await.push(rule.clone());
        Ok(rule)
    }

    async fn update(&self, rule: SortingRule) -> Result<SortingRule, anyhow::Error> {
        let mut rules = self.rules.lock().await;
        let slot = rules
            .iter_mut()
            .find(|r| r.id == rule.id)
            .ok_or_else(|| anyhow!("no rule with id {}", rule.id))?;
        *slot = rule.clone();
        Ok(rule)
    }

    async fn delete(&self, id: i64) -> Result<(), anyhow::Error> {
        self.rules.lock().await.retain(|r| r.id != id);
        Ok(())
    }

    async fn batch_update_priorities(&self, assignments: Vec<PriorityAssignment>) -> Result<(), anyhow::Error> {
        let mut rules = self.rules.lock().await;
        for assignment in &assignments {
            if !rules.iter().any(|r| r.id == assignment.rule_id) {
                return Err(anyhow!("no rule with id {}", assignment.rule_id));
            }
        }
        for assignment in assignments {
            if let Some(rule) = rules.iter_mut().find(|r| r.id == assignment.rule_id) {
                rule.priority = assignment.priority;
            }
        }
        Ok(())
    }

    async fn max_priority(&self) -> Result<i64, anyhow::Error> {
        Ok(self.rules.lock().await.iter().map(|r| r.priority).max().unwrap_or(0))
    }
}
