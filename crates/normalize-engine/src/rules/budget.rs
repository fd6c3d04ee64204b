// Budget reconciliation against the all-possible-accounts template
use rexml_dom::{Document, NodeId};
use shared_types::{Rule, RuleOutcome};

use crate::extractors::numeric::AccountKey;
use crate::templates::{TemplateKind, TemplateProvider};

pub const TEMPLATE_BUDGET_ENTRIES: &str = "/reXML/InputAssumptions/PropertyData/BudgetedFinancialData/BudgetEntry";

const BUDGET_ENTRIES: &str = "BudgetedFinancialData/BudgetEntry";
const ACCOUNT_REFERENCE: &str = "BudgetAccountReference";

/// Appends a copy of every template budget entry whose account is not yet in
/// the property's budget. Properties without any budget entries are left alone.
pub fn reconcile_budget(
    doc: &mut Document,
    property: NodeId,
    templates: &dyn TemplateProvider,
) -> Vec<RuleOutcome> {
    let rule = Rule::BudgetAccounts;

    let entries = doc.select(property, BUDGET_ENTRIES);
    let Some(budget) = doc.select_first(property, "BudgetedFinancialData") else {
        return Vec::new();
    };
    if entries.is_empty() {
        return Vec::new();
    }

    let template = match templates.load(TemplateKind::AllPossibleAccounts) {
        Ok(template) => template,
        Err(e) => return vec![RuleOutcome::unavailable(rule, e.to_string())],
    };
    let template_entries = template.select(template.document_node(), TEMPLATE_BUDGET_ENTRIES);
    if template_entries.is_empty() {
        return vec![RuleOutcome::unavailable(
            rule,
            format!(
                "Could not find <BudgetEntry>. Attempted path is \"{}\"",
                TEMPLATE_BUDGET_ENTRIES
            ),
        )];
    }

    let mut outcomes = Vec::new();

    // Entries without a reference count as account 0
    let existing: Vec<AccountKey> = entries
        .iter()
        .map(|&entry| match doc.select_first(entry, ACCOUNT_REFERENCE) {
            Some(reference) => AccountKey::from_reference(&doc.text(reference)),
            None => AccountKey::Numeric(0.0),
        })
        .collect();
    for key in existing.iter().filter(|k| !k.is_numeric()) {
        outcomes.push(RuleOutcome::parse(
            rule,
            format!("BudgetAccountReference {:?} is not numeric", key),
        ));
    }

    let missing: Vec<NodeId> = template_entries
        .into_iter()
        .filter(|&entry| match template.select_first(entry, ACCOUNT_REFERENCE) {
            Some(reference) => !existing.contains(&AccountKey::from_reference(&template.text(reference))),
            None => false,
        })
        .collect();

    for entry in missing {
        let copy = doc.import(&template, entry);
        doc.append_child(budget, copy);
    }

    outcomes.push(RuleOutcome::applied(rule));
    outcomes
}
