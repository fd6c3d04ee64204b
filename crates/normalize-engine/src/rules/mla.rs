// Market leasing assumptions: template merge and per-property rate overrides
use rexml_dom::{Document, NodeId};
use shared_types::{Rule, RuleOutcome};

use crate::templates::{TemplateError, TemplateKind, TemplateProvider};

pub const TEMPLATE_MLA_PATH: &str = "/reXML/InputAssumptions/PropertyData/MarketLeasingAssumptions";
pub const PROPERTY_REFERENCE_PATH: &str = "/reXML/PropertyReference";
pub const UPDATE_ENTRIES_PATH: &str = "/reXML/reXML-ENTRY";
pub const MARKET_RENT_TARGETS: &str =
    "/reXML/InputAssumptions/PropertyData/MarketLeasingAssumptions/MarketLeaseAssumptionTable/MarketRent";

const MLA_NODE: &str = "MarketLeasingAssumptions";
const SOURCE_MARKET_RENT: &str = "PropertyData/MarketLeasingAssumptions/MarketLeasingAssumptionsTable/MarketRent";
const SOURCE_NEW_RATE: &str = "NewMarketRentAnnualRate";
const SOURCE_RENEWAL_RATE: &str = "RenewalMarketAnnualRate";
const TARGET_NEW_RATE: &str = "NewMarketRentAnnualRate";
const TARGET_RENEWAL_RATE: &str = "RenewalMarketRentAnnualRate";

/// Copies the template's `MarketLeasingAssumptions` into the property.
///
/// When the property already has the subtree, the template's children are
/// appended to it, so running the merge twice leaves two copies.
pub fn merge_mla_template(
    doc: &mut Document,
    property: NodeId,
    templates: &dyn TemplateProvider,
) -> RuleOutcome {
    let rule = Rule::MlaTemplateMerge;

    let template = match templates.load(TemplateKind::MlaEntries) {
        Ok(template) => template,
        Err(e) => return RuleOutcome::unavailable(rule, e.to_string()),
    };
    let Some(source) = template.select_first(template.document_node(), TEMPLATE_MLA_PATH) else {
        return RuleOutcome::unavailable(
            rule,
            format!(
                "<MarketLeasingAssumptions> node not found in {} template. Attempted path -{}.",
                TemplateKind::MlaEntries,
                TEMPLATE_MLA_PATH
            ),
        );
    };

    match doc.select_first(property, MLA_NODE) {
        Some(existing) => {
            for &child in template.children(source) {
                let copy = doc.import(&template, child);
                doc.append_child(existing, copy);
            }
        }
        None => {
            let copy = doc.import(&template, source);
            doc.append_child(property, copy);
        }
    }
    RuleOutcome::applied(rule)
}

/// Overwrites the new and renewal market rent rates of every `MarketRent`
/// row with the values the updates template holds for `property_reference`
pub fn apply_mla_overrides(
    doc: &mut Document,
    property_reference: &str,
    templates: &dyn TemplateProvider,
) -> Vec<RuleOutcome> {
    let rule = Rule::MlaOverrideMerge;

    if property_reference.is_empty() {
        return vec![RuleOutcome::structural(rule, "PropertyReference is empty.")];
    }

    let updates = match templates.load(TemplateKind::MlaUpdates) {
        Ok(updates) => updates,
        Err(e) => return vec![override_load_failure(e)],
    };

    let entries = updates.select(updates.document_node(), UPDATE_ENTRIES_PATH);
    if entries.is_empty() {
        return vec![RuleOutcome::structural(
            rule,
            format!(
                "No <reXML-ENTRY> node found in {} template. Attempted path - {}.",
                TemplateKind::MlaUpdates,
                UPDATE_ENTRIES_PATH
            ),
        )];
    }

    let matching = entries.into_iter().find(|&entry| {
        updates
            .select_first(entry, "PropertyReference")
            .is_some_and(|reference| updates.text(reference) == property_reference)
    });
    let Some(entry) = matching else {
        return Vec::new();
    };

    let new_rate = updates.select_first(entry, &format!("{}/{}", SOURCE_MARKET_RENT, SOURCE_NEW_RATE));
    let renewal_rate = updates.select_first(entry, &format!("{}/{}", SOURCE_MARKET_RENT, SOURCE_RENEWAL_RATE));
    let targets = doc.select(doc.document_node(), MARKET_RENT_TARGETS);

    let (Some(new_rate), Some(renewal_rate)) = (new_rate, renewal_rate) else {
        return Vec::new();
    };
    if targets.is_empty() {
        return Vec::new();
    }

    for market_rent in targets {
        if let Some(target) = doc.select_first(market_rent, TARGET_NEW_RATE) {
            doc.replace_children_from(target, &updates, new_rate);
        }
        if let Some(target) = doc.select_first(market_rent, TARGET_RENEWAL_RATE) {
            doc.replace_children_from(target, &updates, renewal_rate);
        }
    }
    vec![RuleOutcome::applied(rule)]
}

/// A missing updates file is a console matter; one that exists but cannot be
/// read is an error in the merge and goes to the file log too
fn override_load_failure(error: TemplateError) -> RuleOutcome {
    if error.is_malformed() {
        RuleOutcome::failed(
            Rule::MlaOverrideMerge,
            format!("Error on merging MLAs updates. Error -{}", error),
        )
    } else {
        RuleOutcome::unavailable(Rule::MlaOverrideMerge, error.to_string())
    }
}
