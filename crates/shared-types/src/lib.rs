pub mod types;

pub use types::{FileReport, OutcomeStatus, Rule, RuleOutcome};
