// Base-rent schedule cleanup for leases that are not month-to-month
use rexml_dom::{Document, NodeId};
use rust_decimal::Decimal;
use shared_types::{Rule, RuleOutcome};

use crate::extractors::numeric::parse_decimal;

pub const BASE_RENT_ENTRIES: &str = "RentalIncome/BaseRent/BaseRentEntry";

const RENT_AMOUNT: &str = "RentAmount";

/// Cleans the lease's base-rent entries.
///
/// Contract leases first lose a trailing entry whose amount is literally `0`.
/// Then, for any status, later entries repeating a non-zero amount are removed.
pub fn cleanup_base_rent(doc: &mut Document, lease: NodeId, sub_status: &str) -> Vec<RuleOutcome> {
    let entries = doc.select(lease, BASE_RENT_ENTRIES);
    if entries.is_empty() {
        return vec![RuleOutcome::structural(
            Rule::BaseRentCleanup,
            format!("<BaseRentEntry> node not found. Searched in: {}", doc.inner_xml(lease)),
        )];
    }

    let mut outcomes = Vec::new();
    if sub_status.eq_ignore_ascii_case("contract") {
        outcomes.extend(remove_trailing_zero_entry(doc, &entries));
    }
    outcomes.extend(remove_duplicate_amounts(doc, lease));
    outcomes.push(RuleOutcome::applied(Rule::BaseRentCleanup));
    outcomes
}

fn remove_trailing_zero_entry(doc: &mut Document, entries: &[NodeId]) -> Option<RuleOutcome> {
    let &last = entries.last()?;
    let Some(amount) = doc.select_first(last, RENT_AMOUNT) else {
        return Some(RuleOutcome::structural(
            Rule::BaseRentCleanup,
            format!("<RentAmount> node not found. Searched in: {}", doc.inner_xml(last)),
        ));
    };
    if doc.text(amount) == "0" {
        doc.remove(last);
    }
    None
}

fn remove_duplicate_amounts(doc: &mut Document, lease: NodeId) -> Vec<RuleOutcome> {
    let mut outcomes = Vec::new();
    let mut seen: Vec<Decimal> = Vec::new();

    for entry in doc.select(lease, BASE_RENT_ENTRIES) {
        let Some(amount_node) = doc.select_first(entry, RENT_AMOUNT) else {
            outcomes.push(RuleOutcome::structural(
                Rule::BaseRentCleanup,
                format!("<RentAmount> node not found. Searched in: {}", doc.inner_xml(entry)),
            ));
            continue;
        };
        let text = doc.text(amount_node);
        let Some(amount) = parse_decimal(&text) else {
            outcomes.push(RuleOutcome::parse(
                Rule::BaseRentCleanup,
                format!("RentAmount \"{}\" is not a decimal", text),
            ));
            continue;
        };

        if !seen.contains(&amount) {
            seen.push(amount);
        } else if !amount.is_zero() {
            doc.remove(entry);
        }
    }

    outcomes
}
