pub mod models;
pub mod ports;
pub mod services;

pub use models::{
    validate_priority_permutation, BatchPriorityError, CreateRuleError, CreateRuleRequest,
    PriorityAssignment, PriorityPermutationError, RuleName, RuleNameEmptyError, RuleNotFound,
    RuleValidationError, SortingRule, UpdateRuleError, UpdateRuleRequest,
};
pub use ports::RuleRepository;
pub use services::{RuleAdministration, Service};
