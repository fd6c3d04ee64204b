// Free-rent amounts arrive as annual figures and are stored back as monthly ones
use rexml_dom::{Document, NodeId};
use shared_types::{Rule, RuleOutcome};

use crate::extractors::numeric::monthly_from_annual;

pub const FREE_RENT_ENTRIES: &str = "FreeRents/FreeRent";

/// Rewrites every `FreeRent/MonthlyAmounts` of `lease` to `amount / 12`.
/// Missing or empty amounts are left alone without an outcome.
pub fn rewrite_free_rents(doc: &mut Document, lease: NodeId) -> Vec<RuleOutcome> {
    let mut outcomes = Vec::new();

    for entry in doc.select(lease, FREE_RENT_ENTRIES) {
        let Some(amount) = doc.select_first(entry, "MonthlyAmounts") else {
            continue;
        };
        let text = doc.text(amount);
        if text.is_empty() {
            continue;
        }
        match monthly_from_annual(&text) {
            Some(monthly) => {
                doc.set_text(amount, &monthly);
                outcomes.push(RuleOutcome::applied(Rule::FreeRentMonthly));
            }
            None => outcomes.push(RuleOutcome::parse(
                Rule::FreeRentMonthly,
                format!("MonthlyAmounts \"{}\" is not a decimal", text),
            )),
        }
    }

    outcomes
}
