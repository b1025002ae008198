use std::future::Future;

use tracing::warn;

use crate::domain::card::{project, CardRepository};
use crate::domain::evaluator::{EvaluationOutcome, Evaluator};
use crate::domain::rule::RuleRepository;

use super::conflict::{ExistingHolding, PrintingConflict};
use super::models::{
    BatchMoveError, InsertCopyError, InsertCopyRequest, InventoryLine, LocationPreference, Movement,
    ResortReport, ResortSelector,
};
use super::ports::InventoryRepository;

pub trait SortPipeline {
    fn insert_one_copy(
        &self,
        request: InsertCopyRequest,
    ) -> impl Future<Output = Result<InventoryLine, InsertCopyError>> + Send;

    fn batch_move(
        &self,
        ids: &[i64],
        target_location_id: Option<i64>,
    ) -> impl Future<Output = Result<u64, BatchMoveError>> + Send;

    fn batch_delete(&self, ids: &[i64]) -> impl Future<Output = Result<u64, anyhow::Error>> + Send;

    fn resort(&self, selector: ResortSelector) -> impl Future<Output = Result<ResortReport, anyhow::Error>> + Send;
}

#[derive(Debug, Clone)]
pub struct Service<C, Ev, I, R>
where
    C: CardRepository,
    Ev: Evaluator,
    I: InventoryRepository,
    R: RuleRepository,
{
    cards: C,
    evaluator: Ev,
    inventory: I,
    rules: R,
}

impl<C, Ev, I, R> Service<C, Ev, I, R>
where
    C: CardRepository,
    Ev: Evaluator,
    I: InventoryRepository,
    R: RuleRepository,
{
    pub fn new(cards: C, evaluator: Ev, inventory: I, rules: R) -> Self {
        Self { cards, evaluator, inventory, rules }
    }

    /// Existing lines for `oracle_id` held in a real location other than
    /// `intended_target`. Lines with no location at all never conflict —
    /// only an *assigned* location competes with the new copy's home.
    async fn detect_conflict(
        &self,
        oracle_id: &str,
        intended_target: Option<i64>,
    ) -> Result<Option<PrintingConflict>, anyhow::Error> {
        let existing_lines = self.inventory.find_by_oracle_id(oracle_id).await?;
        let conflicting: Vec<ExistingHolding> = existing_lines
            .iter()
            .filter_map(|line| match line.storage_location_id {
                Some(loc) if Some(loc) != intended_target => {
                    Some(ExistingHolding { storage_location_id: loc, quantity: line.quantity })
                }
                _ => None,
            })
            .collect();

        if conflicting.is_empty() {
            Ok(None)
        } else {
            Ok(Some(PrintingConflict { oracle_id: oracle_id.to_string(), existing: conflicting }))
        }
    }
}

impl<C, Ev, I, R> SortPipeline for Service<C, Ev, I, R>
where
    C: CardRepository,
    Ev: Evaluator,
    I: InventoryRepository,
    R: RuleRepository,
{
    async fn insert_one_copy(&self, request: InsertCopyRequest) -> Result<InventoryLine, InsertCopyError> {
        if request.quantity < 1 {
            return Err(InsertCopyError::NonPositiveQuantity);
        }

        let card = self.cards.get_card(&request.scryfall_id).await?;

        let intended_target = match request.location_preference {
            LocationPreference::Specific(id) => Some(id),
            LocationPreference::Unassigned => None,
            LocationPreference::Auto => {
                let projected = project(&card, &request.treatment, Some(request.quantity));
                self.evaluator.evaluate_card(&projected).await?.storage_location_id()
            }
        };

        if !matches!(request.location_preference, LocationPreference::Unassigned) {
            if let Some(conflict) = self.detect_conflict(&request.oracle_id, intended_target).await? {
                return Err(InsertCopyError::Conflict(conflict));
            }
        }

        Ok(self
            .inventory
            .upsert(
                &request.scryfall_id,
                &request.oracle_id,
                &request.treatment,
                request.quantity,
                intended_target,
            )
            .await?)
    }

    async fn batch_move(&self, ids: &[i64], target_location_id: Option<i64>) -> Result<u64, BatchMoveError> {
        Ok(self.inventory.batch_move(ids, target_location_id).await?)
    }

    async fn batch_delete(&self, ids: &[i64]) -> Result<u64, anyhow::Error> {
        self.inventory.batch_delete(ids).await
    }

    async fn resort(&self, selector: ResortSelector) -> Result<ResortReport, anyhow::Error> {
        let lines = match &selector {
            ResortSelector::All => self.inventory.list_all().await?,
            ResortSelector::Ids(ids) => self.inventory.list_by_ids(ids).await?,
        };
        let rules = self.rules.list_enabled_ordered_by_priority().await?;

        let mut report = ResortReport::default();

        for line in &lines {
            report.processed += 1;

            let card = match self.cards.get_card(&line.scryfall_id).await {
                Ok(card) => card,
                Err(err) => {
                    warn!(line_id = line.id, %err, "resort: card lookup failed, skipping line");
                    report.errors += 1;
                    continue;
                }
            };

            let projected = project(&card, &line.treatment, Some(line.quantity));
            let outcome = self.evaluator.evaluate_card_with_rules(&projected, &rules);
            let target = match outcome {
                EvaluationOutcome::Matched { storage_location_id } => Some(storage_location_id),
                EvaluationOutcome::NoMatch => None,
            };

            if target == line.storage_location_id {
                continue;
            }

            if let Err(err) = self.inventory.update_location(line.id, target).await {
                warn!(line_id = line.id, %err, "resort: store write failed, skipping line");
                report.errors += 1;
                continue;
            }

            report.updated += 1;
            report.movements.push(Movement {
                inventory_line_id: line.id,
                card_name: card.name.clone(),
                treatment: line.treatment.clone(),
                from_location_id: line.storage_location_id,
                to_location_id: target,
            });
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::{CardRecord, GetCardError, Prices};
    use crate::domain::evaluator;
    use crate::domain::rule::{PriorityAssignment, RuleName, RuleNotFound, RuleRepository, SortingRule};
    use std::collections::HashMap;
    use std::future::ready;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct FakeCardRepo {
        cards: Arc<Mutex<HashMap<String, CardRecord>>>,
    }

    impl FakeCardRepo {
        fn with(cards: Vec<CardRecord>) -> Self {
            let map = cards.into_iter().map(|c| (c.scryfall_id.clone(), c)).collect();
            Self { cards: Arc::new(Mutex::new(map)) }
        }
    }

    impl CardRepository for FakeCardRepo {
        fn get_card(
            &self,
            scryfall_id: &str,
        ) -> impl Future<Output = Result<CardRecord, GetCardError>> + Send {
            let found = self.cards.lock().unwrap().get(scryfall_id).cloned();
            ready(found.ok_or_else(|| GetCardError::NotFound(scryfall_id.to_string())))
        }
    }

    #[derive(Clone, Default)]
    struct FakeRuleRepo {
        rules: Arc<Mutex<Vec<SortingRule>>>,
    }

    impl FakeRuleRepo {
        fn with(rules: Vec<SortingRule>) -> Self {
            Self { rules: Arc::new(Mutex::new(rules)) }
        }
    }

    impl RuleRepository for FakeRuleRepo {
        fn list_enabled_ordered_by_priority(
            &self,
        ) -> impl Future<Output = Result<Vec<SortingRule>, anyhow::Error>> + Send {
            let mut rules: Vec<SortingRule> =
                self.rules.lock().unwrap().iter().filter(|r| r.enabled).cloned().collect();
            rules.sort_by_key(|r| (r.priority, r.id));
            ready(Ok(rules))
        }
        fn list_all(&self) -> impl Future<Output = Result<Vec<SortingRule>, anyhow::Error>> + Send {
            ready(Ok(self.rules.lock().unwrap().clone()))
        }
        fn get(&self, id: i64) -> impl Future<Output = Result<SortingRule, RuleNotFound>> + Send {
            let found = self.rules.lock().unwrap().iter().find(|r| r.id == id).cloned();
            ready(found.ok_or(RuleNotFound::Id(id)))
        }
        fn insert(&self, rule: SortingRule) -> impl Future<Output = Result<SortingRule, anyhow::Error>> + Send {
            ready(Ok(rule))
        }
        fn update(&self, rule: SortingRule) -> impl Future<Output = Result<SortingRule, anyhow::Error>> + Send {
            ready(Ok(rule))
        }
        fn delete(&self, _id: i64) -> impl Future<Output = Result<(), anyhow::Error>> + Send {
            ready(Ok(()))
        }
        fn batch_update_priorities(
            &self,
            _assignments: Vec<PriorityAssignment>,
        ) -> impl Future<Output = Result<(), anyhow::Error>> + Send {
            ready(Ok(()))
        }
        fn max_priority(&self) -> impl Future<Output = Result<i64, anyhow::Error>> + Send {
            ready(Ok(self.rules.lock().unwrap().iter().map(|r| r.priority).max().unwrap_or(0)))
        }
    }

    #[derive(Clone, Default)]
    struct FakeInventoryRepo {
        lines: Arc<Mutex<Vec<InventoryLine>>>,
        next_id: Arc<Mutex<i64>>,
    }

    impl InventoryRepository for FakeInventoryRepo {
        fn find_by_oracle_id(
            &self,
            oracle_id: &str,
        ) -> impl Future<Output = Result<Vec<InventoryLine>, anyhow::Error>> + Send {
            let found = self.lines.lock().unwrap().iter().filter(|l| l.oracle_id == oracle_id).cloned().collect();
            ready(Ok(found))
        }
        fn find_line(
            &self,
            scryfall_id: &str,
            treatment: &str,
            storage_location_id: Option<i64>,
        ) -> impl Future<Output = Result<Option<InventoryLine>, anyhow::Error>> + Send {
            let found = self
                .lines
                .lock()
                .unwrap()
                .iter()
                .find(|l| l.scryfall_id == scryfall_id && l.treatment == treatment && l.storage_location_id == storage_location_id)
                .cloned();
            ready(Ok(found))
        }
        fn upsert(
            &self,
            scryfall_id: &str,
            oracle_id: &str,
            treatment: &str,
            quantity: i64,
            storage_location_id: Option<i64>,
        ) -> impl Future<Output = Result<InventoryLine, anyhow::Error>> + Send {
            let mut lines = self.lines.lock().unwrap();
            if let Some(existing) = lines.iter_mut().find(|l| {
                l.scryfall_id == scryfall_id && l.treatment == treatment && l.storage_location_id == storage_location_id
            }) {
                existing.quantity += quantity;
                return ready(Ok(existing.clone()));
            }
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let line = InventoryLine {
                id: *next_id,
                scryfall_id: scryfall_id.to_string(),
                oracle_id: oracle_id.to_string(),
                treatment: treatment.to_string(),
                quantity,
                storage_location_id,
            };
            lines.push(line.clone());
            ready(Ok(line))
        }
        fn batch_move(
            &self,
            ids: &[i64],
            target_location_id: Option<i64>,
        ) -> impl Future<Output = Result<u64, anyhow::Error>> + Send {
            let mut updated = 0;
            let mut lines = self.lines.lock().unwrap();
            for line in lines.iter_mut() {
                if ids.contains(&line.id) {
                    line.storage_location_id = target_location_id;
                    updated += 1;
                }
            }
            ready(Ok(updated))
        }
        fn batch_delete(&self, ids: &[i64]) -> impl Future<Output = Result<u64, anyhow::Error>> + Send {
            let mut lines = self.lines.lock().unwrap();
            let before = lines.len();
            lines.retain(|l| !ids.contains(&l.id));
            ready(Ok((before - lines.len()) as u64))
        }
        fn list_all(&self) -> impl Future<Output = Result<Vec<InventoryLine>, anyhow::Error>> + Send {
            ready(Ok(self.lines.lock().unwrap().clone()))
        }
        fn list_by_ids(&self, ids: &[i64]) -> impl Future<Output = Result<Vec<InventoryLine>, anyhow::Error>> + Send {
            let found = self.lines.lock().unwrap().iter().filter(|l| ids.contains(&l.id)).cloned().collect();
            ready(Ok(found))
        }
        fn update_location(
            &self,
            id: i64,
            storage_location_id: Option<i64>,
        ) -> impl Future<Output = Result<(), anyhow::Error>> + Send {
            let mut lines = self.lines.lock().unwrap();
            if let Some(line) = lines.iter_mut().find(|l| l.id == id) {
                line.storage_location_id = storage_location_id;
            }
            ready(Ok(()))
        }
    }

    fn rule(id: i64, priority: i64, expression: &str, location: i64) -> SortingRule {
        SortingRule {
            id,
            name: RuleName::new("r").unwrap(),
            expression: expression.to_string(),
            priority,
            storage_location_id: location,
            enabled: true,
        }
    }

    fn mythic_bolt(scryfall_id: &str, oracle_id: &str, finishes: Vec<&str>) -> CardRecord {
        CardRecord {
            scryfall_id: scryfall_id.to_string(),
            oracle_id: oracle_id.to_string(),
            name: "Lightning Bolt".to_string(),
            rarity: "mythic".to_string(),
            finishes: finishes.into_iter().map(String::from).collect(),
            prices: Prices { usd: Some("25.00".to_string()), ..Default::default() },
            ..Default::default()
        }
    }

    const SAFE: i64 = 1;
    const FOIL_BINDER: i64 = 2;

    fn standard_rules() -> Vec<SortingRule> {
        vec![
            rule(1, 1, "rarity == \"mythic\" && prices.usd > 10", SAFE),
            rule(2, 2, "treatment == \"foil\"", FOIL_BINDER),
        ]
    }

    fn pipeline_with(
        cards: Vec<CardRecord>,
        rules: Vec<SortingRule>,
        lines: Vec<InventoryLine>,
    ) -> Service<FakeCardRepo, evaluator::Service<FakeRuleRepo>, FakeInventoryRepo, FakeRuleRepo> {
        let rule_repo = FakeRuleRepo::with(rules);
        let inventory = FakeInventoryRepo {
            lines: Arc::new(Mutex::new(lines.clone())),
            next_id: Arc::new(Mutex::new(lines.iter().map(|l| l.id).max().unwrap_or(0))),
        };
        Service::new(
            FakeCardRepo::with(cards),
            evaluator::Service::new(rule_repo.clone()),
            inventory,
            rule_repo,
        )
    }

    // Scenario A: foil treatment, mythic + price rule wins over the foil rule.
    #[tokio::test]
    async fn scenario_a_high_value_rule_wins_regardless_of_treatment() {
        let pipeline = pipeline_with(
            vec![mythic_bolt("abc", "ORA", vec!["nonfoil", "foil"])],
            standard_rules(),
            vec![],
        );
        let line = pipeline
            .insert_one_copy(InsertCopyRequest {
                scryfall_id: "abc".to_string(),
                oracle_id: "ORA".to_string(),
                treatment: "foil".to_string(),
                quantity: 1,
                location_preference: LocationPreference::Auto,
            })
            .await
            .unwrap();
        assert_eq!(line.storage_location_id, Some(SAFE));
    }

    // Scenario B: same card, nonfoil treatment — still Safe.
    #[tokio::test]
    async fn scenario_b_treatment_irrelevant_to_unrelated_rule() {
        let pipeline = pipeline_with(
            vec![mythic_bolt("abc", "ORA", vec!["nonfoil", "foil"])],
            standard_rules(),
            vec![],
        );
        let line = pipeline
            .insert_one_copy(InsertCopyRequest {
                scryfall_id: "abc".to_string(),
                oracle_id: "ORA".to_string(),
                treatment: "nonfoil".to_string(),
                quantity: 1,
                location_preference: LocationPreference::Auto,
            })
            .await
            .unwrap();
        assert_eq!(line.storage_location_id, Some(SAFE));
    }

    // Scenario C: common rarity, no price, foil treatment — falls through to FoilBinder.
    #[tokio::test]
    async fn scenario_c_falls_through_to_second_rule() {
        let card = CardRecord {
            scryfall_id: "def".to_string(),
            oracle_id: "ORB".to_string(),
            rarity: "common".to_string(),
            finishes: vec!["foil".to_string()],
            ..Default::default()
        };
        let pipeline = pipeline_with(vec![card], standard_rules(), vec![]);
        let line = pipeline
            .insert_one_copy(InsertCopyRequest {
                scryfall_id: "def".to_string(),
                oracle_id: "ORB".to_string(),
                treatment: "foil".to_string(),
                quantity: 1,
                location_preference: LocationPreference::Auto,
            })
            .await
            .unwrap();
        assert_eq!(line.storage_location_id, Some(FOIL_BINDER));
    }

    // Scenario D: common rarity, no price, nonfoil treatment — no rule matches.
    #[tokio::test]
    async fn scenario_d_no_match_leaves_line_unassigned() {
        let card = CardRecord {
            scryfall_id: "ghi".to_string(),
            oracle_id: "ORC".to_string(),
            rarity: "common".to_string(),
            finishes: vec!["nonfoil".to_string()],
            ..Default::default()
        };
        let pipeline = pipeline_with(vec![card], standard_rules(), vec![]);
        let line = pipeline
            .insert_one_copy(InsertCopyRequest {
                scryfall_id: "ghi".to_string(),
                oracle_id: "ORC".to_string(),
                treatment: "nonfoil".to_string(),
                quantity: 1,
                location_preference: LocationPreference::Auto,
            })
            .await
            .unwrap();
        assert_eq!(line.storage_location_id, None);
    }

    // Scenario E: an existing copy of the same oracle card elsewhere triggers a conflict.
    #[tokio::test]
    async fn scenario_e_printing_conflict_blocks_the_write() {
        const OLD_BINDER: i64 = 99;
        let existing = InventoryLine {
            id: 1,
            scryfall_id: "other-printing".to_string(),
            oracle_id: "ORA".to_string(),
            treatment: "nonfoil".to_string(),
            quantity: 2,
            storage_location_id: Some(OLD_BINDER),
        };
        let card = mythic_bolt("xyz", "ORA", vec!["nonfoil", "foil"]);
        let pipeline = pipeline_with(vec![card], standard_rules(), vec![existing]);

        let err = pipeline
            .insert_one_copy(InsertCopyRequest {
                scryfall_id: "xyz".to_string(),
                oracle_id: "ORA".to_string(),
                treatment: "foil".to_string(),
                quantity: 1,
                location_preference: LocationPreference::Auto,
            })
            .await
            .unwrap_err();

        match err {
            InsertCopyError::Conflict(conflict) => {
                assert_eq!(conflict.oracle_id, "ORA");
                assert_eq!(conflict.existing, vec![ExistingHolding { storage_location_id: OLD_BINDER, quantity: 2 }]);
            }
            other => panic!("expected Conflict, got {other:?}"),
        }

        // No write happened.
        assert_eq!(pipeline.inventory.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unassigned_preference_skips_conflict_detection() {
        const OLD_BINDER: i64 = 99;
        let existing = InventoryLine {
            id: 1,
            scryfall_id: "other-printing".to_string(),
            oracle_id: "ORA".to_string(),
            treatment: "nonfoil".to_string(),
            quantity: 2,
            storage_location_id: Some(OLD_BINDER),
        };
        let card = mythic_bolt("xyz", "ORA", vec!["nonfoil", "foil"]);
        let pipeline = pipeline_with(vec![card], standard_rules(), vec![existing]);

        let line = pipeline
            .insert_one_copy(InsertCopyRequest {
                scryfall_id: "xyz".to_string(),
                oracle_id: "ORA".to_string(),
                treatment: "foil".to_string(),
                quantity: 1,
                location_preference: LocationPreference::Unassigned,
            })
            .await
            .unwrap();
        assert_eq!(line.storage_location_id, None);
    }

    #[tokio::test]
    async fn inserting_same_location_twice_merges_quantity() {
        let pipeline = pipeline_with(
            vec![mythic_bolt("abc", "ORA", vec!["nonfoil", "foil"])],
            standard_rules(),
            vec![],
        );
        for _ in 0..2 {
            pipeline
                .insert_one_copy(InsertCopyRequest {
                    scryfall_id: "abc".to_string(),
                    oracle_id: "ORA".to_string(),
                    treatment: "foil".to_string(),
                    quantity: 1,
                    location_preference: LocationPreference::Auto,
                })
                .await
                .unwrap();
        }
        let lines = pipeline.inventory.list_all().await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let pipeline = pipeline_with(
            vec![mythic_bolt("abc", "ORA", vec!["nonfoil", "foil"])],
            standard_rules(),
            vec![],
        );
        let err = pipeline
            .insert_one_copy(InsertCopyRequest {
                scryfall_id: "abc".to_string(),
                oracle_id: "ORA".to_string(),
                treatment: "foil".to_string(),
                quantity: 0,
                location_preference: LocationPreference::Auto,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, InsertCopyError::NonPositiveQuantity));
    }

    // Scenario F: BatchUpdatePriorities rejecting an omitted rule is exercised in
    // the rule module's own tests (`validate_priority_permutation`); the pipeline
    // doesn't own that operation.

    #[tokio::test]
    async fn batch_move_updates_every_targeted_line() {
        let lines = vec![
            InventoryLine { id: 1, scryfall_id: "a".into(), oracle_id: "OA".into(), treatment: "foil".into(), quantity: 1, storage_location_id: None },
            InventoryLine { id: 2, scryfall_id: "b".into(), oracle_id: "OB".into(), treatment: "foil".into(), quantity: 1, storage_location_id: None },
        ];
        let pipeline = pipeline_with(vec![], vec![], lines);
        let moved = pipeline.batch_move(&[1, 2], Some(5)).await.unwrap();
        assert_eq!(moved, 2);
        let all = pipeline.inventory.list_all().await.unwrap();
        assert!(all.iter().all(|l| l.storage_location_id == Some(5)));
    }

    #[tokio::test]
    async fn batch_delete_removes_every_targeted_line() {
        let lines = vec![
            InventoryLine { id: 1, scryfall_id: "a".into(), oracle_id: "OA".into(), treatment: "foil".into(), quantity: 1, storage_location_id: None },
            InventoryLine { id: 2, scryfall_id: "b".into(), oracle_id: "OB".into(), treatment: "foil".into(), quantity: 1, storage_location_id: None },
        ];
        let pipeline = pipeline_with(vec![], vec![], lines);
        let deleted = pipeline.batch_delete(&[1]).await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(pipeline.inventory.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn resort_moves_lines_whose_computed_location_changed() {
        let card = mythic_bolt("abc", "ORA", vec!["nonfoil", "foil"]);
        let line = InventoryLine {
            id: 1,
            scryfall_id: "abc".to_string(),
            oracle_id: "ORA".to_string(),
            treatment: "foil".to_string(),
            quantity: 1,
            storage_location_id: Some(999),
        };
        let pipeline = pipeline_with(vec![card], standard_rules(), vec![line]);

        let report = pipeline.resort(ResortSelector::All).await.unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(report.errors, 0);
        assert_eq!(report.movements.len(), 1);
        assert_eq!(report.movements[0].to_location_id, Some(SAFE));

        // Second run is idempotent: nothing left to move.
        let second = pipeline.resort(ResortSelector::All).await.unwrap();
        assert_eq!(second.updated, 0);
        assert!(second.movements.is_empty());
    }

    #[tokio::test]
    async fn resort_continues_past_a_missing_card() {
        let lines = vec![InventoryLine {
            id: 1,
            scryfall_id: "does-not-exist".to_string(),
            oracle_id: "ORX".to_string(),
            treatment: "foil".to_string(),
            quantity: 1,
            storage_location_id: None,
        }];
        let pipeline = pipeline_with(vec![], standard_rules(), lines);
        let report = pipeline.resort(ResortSelector::All).await.unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.errors, 1);
        assert_eq!(report.updated, 0);
    }
}
