// Lease-level normalization: reference dedup, free rent, tenant-status branch
use std::collections::HashSet;

use chrono::NaiveDate;
use rexml_dom::{Document, NodeId};
use shared_types::{Rule, RuleOutcome};

use crate::extractors::numeric::{month_to_month_term, parse_start_date};
use crate::rules::{base_rent, free_rent};
use crate::suffix::SuffixGenerator;

pub const LEASES_PATH: &str = "/reXML/InputAssumptions/LeaseData/Leases/Lease";

const LEASE_REFERENCE_ATTR: &str = "LeaseReference";
const NESTED_LEASE_REFERENCE: &str = "LeaseID/LeaseReference";

/// Upper bound on redraws when a generated suffix collides with a seen reference
const MAX_SUFFIX_ATTEMPTS: usize = 8;

/// Runs every lease rule over the leases of `doc`, in file order
pub fn normalize_leases(
    doc: &mut Document,
    suffixes: &mut dyn SuffixGenerator,
    today: NaiveDate,
) -> Vec<RuleOutcome> {
    let leases = doc.select(doc.document_node(), LEASES_PATH);
    if leases.is_empty() {
        return vec![RuleOutcome::structural(
            Rule::LeaseList,
            format!("<Lease> node not found. Attempted path- {} ", LEASES_PATH),
        )];
    }

    let mut seen = HashSet::new();
    let mut outcomes = Vec::new();
    for lease in leases {
        outcomes.extend(dedup_lease_reference(doc, lease, &mut seen, suffixes));
        outcomes.extend(free_rent::rewrite_free_rents(doc, lease));
        outcomes.extend(apply_tenant_status(doc, lease, today));
    }
    outcomes
}

/// Makes the lease's `LeaseReference` unique among `seen`.
///
/// The first lease carrying a value keeps it; later ones get a random suffix,
/// mirrored into `LeaseID/LeaseReference` when that element exists.
pub fn dedup_lease_reference(
    doc: &mut Document,
    lease: NodeId,
    seen: &mut HashSet<String>,
    suffixes: &mut dyn SuffixGenerator,
) -> Vec<RuleOutcome> {
    let reference = match doc.attribute(lease, LEASE_REFERENCE_ATTR) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => return Vec::new(),
    };

    if !seen.contains(&reference) {
        seen.insert(reference);
        return Vec::new();
    }

    let mut renamed = format!("{}{}", reference, suffixes.next_suffix());
    for _ in 1..MAX_SUFFIX_ATTEMPTS {
        if !seen.contains(&renamed) {
            break;
        }
        renamed = format!("{}{}", reference, suffixes.next_suffix());
    }
    doc.set_attribute(lease, LEASE_REFERENCE_ATTR, &renamed);

    let mut outcomes = Vec::new();
    match doc.select_first(lease, NESTED_LEASE_REFERENCE) {
        Some(nested) => doc.set_text(nested, &renamed),
        None => outcomes.push(RuleOutcome::structural(
            Rule::LeaseReferenceDedup,
            format!(
                "<LeaseReference> node not found. Searched in: {}",
                doc.inner_xml(lease)
            ),
        )),
    }
    seen.insert(renamed);
    outcomes.push(RuleOutcome::applied(Rule::LeaseReferenceDedup));
    outcomes
}

/// Dispatches on `TenantStatus/@SubStatus`: month-to-month leases are
/// re-termed, every other status gets its base-rent schedule cleaned
pub fn apply_tenant_status(doc: &mut Document, lease: NodeId, today: NaiveDate) -> Vec<RuleOutcome> {
    let Some(status) = doc.select_first(lease, "TenantStatus") else {
        return vec![RuleOutcome::structural(
            Rule::TenantStatus,
            format!("<TenantStatus> node not found. Searched in: {}", doc.inner_xml(lease)),
        )];
    };

    let Some(sub_status) = doc.attribute(status, "SubStatus").map(str::to_string) else {
        return vec![RuleOutcome::structural(
            Rule::TenantStatus,
            format!(
                "\"SubStatus\" attribute not found in <TenantStatus> node. Searched in: {}",
                doc.inner_xml(lease)
            ),
        )];
    };

    if sub_status.is_empty() {
        return Vec::new();
    }

    if sub_status.eq_ignore_ascii_case("M/M") {
        reterm_month_to_month(doc, lease, today).into_iter().collect()
    } else {
        base_rent::cleanup_base_rent(doc, lease, &sub_status)
    }
}

/// Rewrites `TermMonths` for a month-to-month lease with an absolute start date
pub fn reterm_month_to_month(doc: &mut Document, lease: NodeId, today: NaiveDate) -> Option<RuleOutcome> {
    let rule = Rule::MonthToMonthTerm;

    let Some(start) = doc.select_first(lease, "StartDate") else {
        return Some(RuleOutcome::structural(
            rule,
            format!(
                "<StartDate> node not found or RelativeTo attribute is null. Searched in: {}",
                doc.inner_xml(lease)
            ),
        ));
    };

    let relative_to = match doc.attribute(start, "RelativeTo") {
        Some(value) => value.to_string(),
        None => {
            return Some(RuleOutcome::structural(
                rule,
                format!(
                    "\"RelativeTo\" attribute not found in <StartDate> node. Searched in: {}",
                    doc.inner_xml(lease)
                ),
            ))
        }
    };

    match relative_to.as_str() {
        "ProjectionStart" => {
            return Some(RuleOutcome::structural(
                rule,
                format!(
                    "RelativeTo attribute is \"ProjectionStart\" Searched in: {}",
                    doc.inner_xml(start)
                ),
            ))
        }
        "Absolute" => {}
        _ => return None,
    }

    let start_text = doc.text(start);
    let Some(start_date) = parse_start_date(&start_text) else {
        return Some(RuleOutcome::parse(
            rule,
            format!("StartDate \"{}\" is not a yyyy-MM-dd date", start_text),
        ));
    };

    let Some(term) = doc.select_first(lease, "TermMonths") else {
        return Some(RuleOutcome::structural(
            rule,
            format!("<TermMonths> node not found. Searched in: {}", doc.inner_xml(start)),
        ));
    };

    let new_term = month_to_month_term(start_date, today);
    doc.set_text(term, &new_term.to_string());
    Some(RuleOutcome::applied(rule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::OutcomeStatus;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn wrap(leases: &str) -> Document {
        Document::parse(&format!(
            "<reXML><InputAssumptions><LeaseData><Leases>{}</Leases></LeaseData></InputAssumptions></reXML>",
            leases
        ))
        .unwrap()
    }

    fn lease_refs(doc: &Document) -> Vec<String> {
        doc.select(doc.document_node(), LEASES_PATH)
            .into_iter()
            .map(|l| doc.attribute(l, "LeaseReference").unwrap_or_default().to_string())
            .collect()
    }

    fn nested_refs(doc: &Document) -> Vec<String> {
        doc.select(doc.document_node(), LEASES_PATH)
            .into_iter()
            .filter_map(|l| doc.select_first(l, NESTED_LEASE_REFERENCE))
            .map(|n| doc.text(n))
            .collect()
    }

    #[test]
    fn test_duplicate_reference_gets_suffix() {
        let mut doc = wrap(
            r#"<Lease LeaseReference="L100"><LeaseID><LeaseReference>L100</LeaseReference></LeaseID></Lease>
               <Lease LeaseReference="L100"><LeaseID><LeaseReference>L100</LeaseReference></LeaseID></Lease>"#,
        );
        let mut suffixes = || "Ab12".to_string();
        normalize_leases(&mut doc, &mut suffixes, today());

        assert_eq!(lease_refs(&doc), vec!["L100", "L100Ab12"]);
        assert_eq!(nested_refs(&doc), vec!["L100", "L100Ab12"]);
    }

    #[test]
    fn test_third_duplicate_redraws_colliding_suffix() {
        let mut doc = wrap(
            r#"<Lease LeaseReference="L1"/><Lease LeaseReference="L1"/><Lease LeaseReference="L1"/>"#,
        );
        let mut draws = vec!["AAAA", "AAAA", "BBBB"].into_iter();
        let mut suffixes = move || draws.next().unwrap_or("CCCC").to_string();
        normalize_leases(&mut doc, &mut suffixes, today());

        assert_eq!(lease_refs(&doc), vec!["L1", "L1AAAA", "L1BBBB"]);
    }

    #[test]
    fn test_missing_nested_reference_is_logged() {
        let mut doc = wrap(r#"<Lease LeaseReference="L7"/><Lease LeaseReference="L7"/>"#);
        let mut suffixes = || "zzzz".to_string();
        let outcomes = normalize_leases(&mut doc, &mut suffixes, today());

        assert!(outcomes.iter().any(|o| o.rule == Rule::LeaseReferenceDedup
            && matches!(&o.status, OutcomeStatus::SkippedStructural(r) if r.starts_with("<LeaseReference> node not found"))));
        assert_eq!(lease_refs(&doc), vec!["L7", "L7zzzz"]);
    }

    #[test]
    fn test_empty_reference_is_ignored() {
        let mut doc = wrap(r#"<Lease LeaseReference=""/><Lease LeaseReference=""/>"#);
        let mut suffixes = || "zzzz".to_string();
        normalize_leases(&mut doc, &mut suffixes, today());
        assert_eq!(lease_refs(&doc), vec!["", ""]);
    }

    #[test]
    fn test_no_leases_logged() {
        let mut doc = Document::parse("<reXML><InputAssumptions/></reXML>").unwrap();
        let mut suffixes = || "zzzz".to_string();
        let outcomes = normalize_leases(&mut doc, &mut suffixes, today());
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].rule, Rule::LeaseList);
    }

    #[test]
    fn test_missing_tenant_status_skips_status_rules_only() {
        let mut doc = wrap(
            r#"<Lease><FreeRents><FreeRent><MonthlyAmounts>120</MonthlyAmounts></FreeRent></FreeRents></Lease>"#,
        );
        let mut suffixes = || "zzzz".to_string();
        let outcomes = normalize_leases(&mut doc, &mut suffixes, today());

        assert!(outcomes
            .iter()
            .any(|o| o.rule == Rule::TenantStatus && o.file_log_message().is_some()));
        let amount = doc
            .select_first(doc.document_node(), "/reXML/InputAssumptions/LeaseData/Leases/Lease/FreeRents/FreeRent/MonthlyAmounts")
            .unwrap();
        assert_eq!(doc.text(amount), "10");
    }

    #[test]
    fn test_missing_sub_status_logged() {
        let mut doc = wrap(r#"<Lease><TenantStatus>Active</TenantStatus></Lease>"#);
        let mut suffixes = || "zzzz".to_string();
        let outcomes = normalize_leases(&mut doc, &mut suffixes, today());
        assert!(matches!(
            &outcomes[0].status,
            OutcomeStatus::SkippedStructural(r) if r.starts_with("\"SubStatus\" attribute not found")
        ));
    }

    #[test]
    fn test_month_to_month_absolute_start_reterms() {
        let mut doc = wrap(
            r#"<Lease><TenantStatus SubStatus="m/m"/><StartDate RelativeTo="Absolute">2024-01-01</StartDate><TermMonths>12</TermMonths></Lease>"#,
        );
        let mut suffixes = || "zzzz".to_string();
        let outcomes = normalize_leases(&mut doc, &mut suffixes, today());

        let term = doc
            .select_first(doc.document_node(), "/reXML/InputAssumptions/LeaseData/Leases/Lease/TermMonths")
            .unwrap();
        // 60 days elapsed: 2 whole periods + 13
        assert_eq!(doc.text(term), "15");
        assert!(outcomes.iter().any(|o| o.rule == Rule::MonthToMonthTerm && o.is_applied()));
    }

    #[test]
    fn test_month_to_month_projection_start_logged() {
        let mut doc = wrap(
            r#"<Lease><TenantStatus SubStatus="M/M"/><StartDate RelativeTo="ProjectionStart">0</StartDate><TermMonths>12</TermMonths></Lease>"#,
        );
        let mut suffixes = || "zzzz".to_string();
        let outcomes = normalize_leases(&mut doc, &mut suffixes, today());

        assert!(outcomes.iter().any(|o| o.rule == Rule::MonthToMonthTerm
            && matches!(&o.status, OutcomeStatus::SkippedStructural(r) if r.contains("ProjectionStart"))));
        let term = doc
            .select_first(doc.document_node(), "/reXML/InputAssumptions/LeaseData/Leases/Lease/TermMonths")
            .unwrap();
        assert_eq!(doc.text(term), "12");
    }

    #[test]
    fn test_month_to_month_other_relative_to_is_silent() {
        let mut doc = wrap(
            r#"<Lease><TenantStatus SubStatus="M/M"/><StartDate RelativeTo="Analysis">2024-01-01</StartDate><TermMonths>12</TermMonths></Lease>"#,
        );
        let mut suffixes = || "zzzz".to_string();
        let outcomes = normalize_leases(&mut doc, &mut suffixes, today());
        assert!(outcomes.is_empty());
    }

    #[test]
    fn test_month_to_month_bad_date_not_logged_to_file() {
        let mut doc = wrap(
            r#"<Lease><TenantStatus SubStatus="M/M"/><StartDate RelativeTo="Absolute">01/01/2024</StartDate><TermMonths>12</TermMonths></Lease>"#,
        );
        let mut suffixes = || "zzzz".to_string();
        let outcomes = normalize_leases(&mut doc, &mut suffixes, today());
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0].status, OutcomeStatus::SkippedParse(_)));
        assert!(outcomes[0].file_log_message().is_none());
    }

    #[test]
    fn test_month_to_month_missing_term_logged() {
        let mut doc = wrap(
            r#"<Lease><TenantStatus SubStatus="M/M"/><StartDate RelativeTo="Absolute">2024-01-01</StartDate></Lease>"#,
        );
        let mut suffixes = || "zzzz".to_string();
        let outcomes = normalize_leases(&mut doc, &mut suffixes, today());
        assert!(matches!(
            &outcomes[0].status,
            OutcomeStatus::SkippedStructural(r) if r.starts_with("<TermMonths> node not found")
        ));
    }

    #[test]
    fn test_month_to_month_missing_start_date_logged() {
        let mut doc = wrap(r#"<Lease><TenantStatus SubStatus="M/M"/><TermMonths>12</TermMonths></Lease>"#);
        let mut suffixes = || "zzzz".to_string();
        let outcomes = normalize_leases(&mut doc, &mut suffixes, today());

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].rule, Rule::MonthToMonthTerm);
        assert!(outcomes[0]
            .file_log_message()
            .unwrap()
            .starts_with("<StartDate> node not found"));
        let term = doc
            .select_first(doc.document_node(), "/reXML/InputAssumptions/LeaseData/Leases/Lease/TermMonths")
            .unwrap();
        assert_eq!(doc.text(term), "12");
    }

    #[test]
    fn test_month_to_month_missing_relative_to_logged() {
        let mut doc = wrap(
            r#"<Lease><TenantStatus SubStatus="M/M"/><StartDate>2024-01-01</StartDate><TermMonths>12</TermMonths></Lease>"#,
        );
        let mut suffixes = || "zzzz".to_string();
        let outcomes = normalize_leases(&mut doc, &mut suffixes, today());

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            &outcomes[0].status,
            OutcomeStatus::SkippedStructural(r) if r.starts_with("\"RelativeTo\" attribute not found")
        ));
        let term = doc
            .select_first(doc.document_node(), "/reXML/InputAssumptions/LeaseData/Leases/Lease/TermMonths")
            .unwrap();
        assert_eq!(doc.text(term), "12");
    }
}
