use serde::{Deserialize, Serialize};

/// The normalization rules, in the order the pipeline applies them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    LeaseList,
    LeaseReferenceDedup,
    FreeRentMonthly,
    TenantStatus,
    MonthToMonthTerm,
    BaseRentCleanup,
    PropertyData,
    CountrySettings,
    CountrySettingsReferences,
    BudgetAccounts,
    MlaTemplateMerge,
    MlaOverrideMerge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Applied,
    /// An expected node or attribute is missing
    SkippedStructural(String),
    /// Text that should be a number or date is not
    SkippedParse(String),
    /// A template file or directory could not be used
    Unavailable(String),
    /// The rule hit an unexpected error while mutating the tree
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub rule: Rule,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl RuleOutcome {
    pub fn applied(rule: Rule) -> Self {
        Self {
            rule,
            status: OutcomeStatus::Applied,
        }
    }

    pub fn structural(rule: Rule, reason: impl Into<String>) -> Self {
        Self {
            rule,
            status: OutcomeStatus::SkippedStructural(reason.into()),
        }
    }

    pub fn parse(rule: Rule, reason: impl Into<String>) -> Self {
        Self {
            rule,
            status: OutcomeStatus::SkippedParse(reason.into()),
        }
    }

    pub fn unavailable(rule: Rule, reason: impl Into<String>) -> Self {
        Self {
            rule,
            status: OutcomeStatus::Unavailable(reason.into()),
        }
    }

    pub fn failed(rule: Rule, reason: impl Into<String>) -> Self {
        Self {
            rule,
            status: OutcomeStatus::Failed(reason.into()),
        }
    }

    pub fn is_applied(&self) -> bool {
        self.status == OutcomeStatus::Applied
    }

    /// Message destined for the per-file diagnostic log, if any.
    /// Template problems go to the console only and parse skips are not logged.
    pub fn file_log_message(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::SkippedStructural(reason) | OutcomeStatus::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Everything the rule pipeline reported for one input file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileReport {
    pub file_name: String,
    pub outcomes: Vec<RuleOutcome>,
}

impl FileReport {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: RuleOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn extend(&mut self, outcomes: impl IntoIterator<Item = RuleOutcome>) {
        self.outcomes.extend(outcomes);
    }

    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    pub fn file_log_messages(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter_map(RuleOutcome::file_log_message)
    }
}
