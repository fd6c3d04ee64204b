//! Normalization rules for reXML lease and property documents
//!
//! [`Normalizer::normalize`] applies, in order:
//!
//! 1. lease rules (reference dedup, free-rent conversion, month-to-month
//!    re-terming, base-rent cleanup)
//! 2. property-data rules (country settings, settings references, budget
//!    reconciliation against a template)
//! 3. market leasing assumption template merge and per-property overrides
//!
//! Rules report what they did as [`RuleOutcome`]s instead of writing logs;
//! the caller decides where each outcome goes.

pub mod context;
pub mod extractors;
pub mod rules;
pub mod suffix;
pub mod templates;

use rexml_dom::Document;
use shared_types::{FileReport, Rule, RuleOutcome};
use tracing::debug;

pub use context::RunContext;
pub use suffix::{RandomSuffix, SuffixGenerator};
pub use templates::{
    DirectoryTemplates, InMemoryTemplates, TemplateError, TemplateFileNames, TemplateKind,
    TemplateProvider,
};

pub const PROPERTY_DATA_PATH: &str = "/reXML/InputAssumptions/PropertyData";

/// Normalizer entry point
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Apply every rule to `doc` in place
    pub fn normalize(&self, doc: &mut Document, ctx: &mut RunContext<'_>, file_name: &str) -> FileReport {
        let mut report = FileReport::new(file_name);

        report.extend(rules::leases::normalize_leases(doc, ctx.suffixes, ctx.today));

        let Some(property) = doc.select_first(doc.document_node(), PROPERTY_DATA_PATH) else {
            report.push(RuleOutcome::structural(
                Rule::PropertyData,
                format!(
                    "<PropertyData> node not found. Attempted path- {} ",
                    PROPERTY_DATA_PATH
                ),
            ));
            return report;
        };

        report.push(rules::country_settings::rewrite_country_settings(doc, property));
        report.push(rules::country_settings::ensure_country_references(doc, property));
        report.extend(rules::budget::reconcile_budget(doc, property, ctx.templates));

        report.push(rules::mla::merge_mla_template(doc, property, ctx.templates));
        if let Some(reference) = doc.select_first(doc.document_node(), rules::mla::PROPERTY_REFERENCE_PATH) {
            let reference = doc.text(reference);
            report.extend(rules::mla::apply_mla_overrides(doc, &reference, ctx.templates));
        }

        debug!(
            file = file_name,
            outcomes = report.outcomes.len(),
            applied = report.applied_count(),
            "Normalization finished"
        );
        report
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}
