// =============================================================================
// IMPORTS
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::domain::expr::CompileError;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("rule name cannot be empty")]
pub struct RuleNameEmptyError;

#[derive(Debug, Error)]
pub enum RuleNotFound {
    #[error("no rule with id {0}")]
    Id(i64),
}

/// Everything Rule Administration can reject on write. `EvaluationError`
/// deliberately has no variant here — that failure mode belongs to the
/// Evaluator, not to validation.
#[derive(Debug, Error)]
pub enum RuleValidationError {
    #[error(transparent)]
    Name(#[from] RuleNameEmptyError),
    #[error("rule expression is invalid: {0}")]
    Expression(#[from] CompileError),
    #[error("storage location {0} does not exist")]
    UnknownStorageLocation(i64),
    #[error("priority {priority} is already held by rule {held_by}")]
    DuplicatePriority { priority: i64, held_by: i64 },
    #[error(transparent)]
    Permutation(#[from] PriorityPermutationError),
}

#[derive(Debug, Error)]
pub enum CreateRuleError {
    #[error(transparent)]
    Validation(#[from] RuleValidationError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum UpdateRuleError {
    #[error(transparent)]
    NotFound(#[from] RuleNotFound),
    #[error(transparent)]
    Validation(#[from] RuleValidationError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum BatchPriorityError {
    #[error(transparent)]
    Validation(#[from] PriorityPermutationError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Why a `BatchUpdatePriorities` call was rejected before any write happened.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PriorityPermutationError {
    #[error("rule {0} was not included in the batch")]
    RuleOmitted(i64),
    #[error("rule id {0} appears more than once in the batch")]
    DuplicateId(i64),
    #[error("priority {0} is out of the valid 1..N range")]
    PriorityOutOfRange(i64),
    #[error("priority {0} is assigned to more than one rule in the batch")]
    DuplicatePriority(i64),
}

// =============================================================================
// DOMAIN NEWTYPES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleName(String);

impl RuleName {
    pub fn new(raw: &str) -> Result<Self, RuleNameEmptyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Err(RuleNameEmptyError)
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// MAIN DOMAIN ENTITY
// =============================================================================

/// A single sorting rule. `expression` is kept as source text, not a
/// [`CompiledProgram`](crate::domain::expr::CompiledProgram) — rules are
/// data at rest; compiling happens when the Evaluator loads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortingRule {
    pub id: i64,
    pub name: RuleName,
    pub expression: String,
    pub priority: i64,
    pub storage_location_id: i64,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateRuleRequest {
    pub name: RuleName,
    pub expression: String,
    pub storage_location_id: i64,
    pub enabled: bool,
}

/// Any field left `None` retains the rule's current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateRuleRequest {
    pub name: Option<RuleName>,
    pub expression: Option<String>,
    pub priority: Option<i64>,
    pub storage_location_id: Option<i64>,
    pub enabled: Option<bool>,
}

/// One `{id, priority}` pair in a `BatchUpdatePriorities` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityAssignment {
    pub rule_id: i64,
    pub priority: i64,
}

/// Checks that `assignments` together with `all_rule_ids` form a
/// permutation of `1..=N`: every existing rule id appears exactly once, and
/// priorities are exactly `{1..N}` with no gaps or duplicates.
pub fn validate_priority_permutation(
    assignments: &[PriorityAssignment],
    all_rule_ids: &BTreeSet<i64>,
) -> Result<(), PriorityPermutationError> {
    let n = all_rule_ids.len() as i64;

    let mut seen_ids = BTreeSet::new();
    let mut seen_priorities = BTreeSet::new();
    for assignment in assignments {
        if !seen_ids.insert(assignment.rule_id) {
            return Err(PriorityPermutationError::DuplicateId(assignment.rule_id));
        }
        if assignment.priority < 1 || assignment.priority > n {
            return Err(PriorityPermutationError::PriorityOutOfRange(assignment.priority));
        }
        if !seen_priorities.insert(assignment.priority) {
            return Err(PriorityPermutationError::DuplicatePriority(assignment.priority));
        }
    }

    for id in all_rule_ids {
        if !seen_ids.contains(id) {
            return Err(PriorityPermutationError::RuleOmitted(*id));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(ids: &[i64]) -> BTreeSet<i64> {
        ids.iter().copied().collect()
    }

    fn assignment(id: i64, priority: i64) -> PriorityAssignment {
        PriorityAssignment { rule_id: id, priority }
    }

    #[test]
    fn full_valid_permutation_accepted() {
        let all = ids(&[1, 2, 3]);
        let assignments = [assignment(1, 2), assignment(2, 1), assignment(3, 3)];
        assert_eq!(validate_priority_permutation(&assignments, &all), Ok(()));
    }

    #[test]
    fn omitted_rule_rejected() {
        let all = ids(&[1, 2, 3]);
        let assignments = [assignment(1, 2), assignment(2, 1)];
        assert_eq!(
            validate_priority_permutation(&assignments, &all),
            Err(PriorityPermutationError::RuleOmitted(3))
        );
    }

    #[test]
    fn duplicate_id_rejected() {
        let all = ids(&[1, 2]);
        let assignments = [assignment(1, 1), assignment(1, 2)];
        assert_eq!(
            validate_priority_permutation(&assignments, &all),
            Err(PriorityPermutationError::DuplicateId(1))
        );
    }

    #[test]
    fn out_of_range_priority_rejected() {
        let all = ids(&[1, 2]);
        let assignments = [assignment(1, 1), assignment(2, 5)];
        assert_eq!(
            validate_priority_permutation(&assignments, &all),
            Err(PriorityPermutationError::PriorityOutOfRange(5))
        );
    }

    #[test]
    fn duplicate_priority_rejected() {
        let all = ids(&[1, 2]);
        let assignments = [assignment(1, 1), assignment(2, 1)];
        assert_eq!(
            validate_priority_permutation(&assignments, &all),
            Err(PriorityPermutationError::DuplicatePriority(1))
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any bijection between `1..=n` rule ids and `1..=n` priorities is
        /// a valid permutation, no matter what order the shuffle lands on.
        #[test]
        fn any_permutation_of_1_to_n_is_accepted(
            (n, priorities) in (1usize..12).prop_flat_map(|n| {
                (Just(n), Just((1..=n as i64).collect::<Vec<_>>()).prop_shuffle())
            })
        ) {
            let all: BTreeSet<i64> = (1..=n as i64).collect();
            let assignments: Vec<PriorityAssignment> = (1..=n as i64)
                .zip(priorities)
                .map(|(rule_id, priority)| PriorityAssignment { rule_id, priority })
                .collect();
            prop_assert_eq!(validate_priority_permutation(&assignments, &all), Ok(()));
        }

        #[test]
        fn priority_outside_1_to_n_is_always_rejected(n in 1usize..12, bad_priority in 100i64..200) {
            let all: BTreeSet<i64> = (1..=n as i64).collect();
            let assignments: Vec<PriorityAssignment> = (1..=n as i64)
                .map(|rule_id| PriorityAssignment {
                    rule_id,
                    priority: if rule_id == 1 { bad_priority } else { rule_id },
                })
                .collect();
            prop_assert_eq!(
                validate_priority_permutation(&assignments, &all),
                Err(PriorityPermutationError::PriorityOutOfRange(bad_priority))
            );
        }
    }
}
