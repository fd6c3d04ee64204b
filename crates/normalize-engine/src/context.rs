use chrono::NaiveDate;

use crate::suffix::SuffixGenerator;
use crate::templates::TemplateProvider;

/// Collaborators one pipeline run needs besides the document itself
pub struct RunContext<'a> {
    pub templates: &'a dyn TemplateProvider,
    pub suffixes: &'a mut dyn SuffixGenerator,
    /// Reference date for month-to-month term calculation
    pub today: NaiveDate,
}

impl<'a> RunContext<'a> {
    pub fn new(
        templates: &'a dyn TemplateProvider,
        suffixes: &'a mut dyn SuffixGenerator,
        today: NaiveDate,
    ) -> Self {
        Self {
            templates,
            suffixes,
            today,
        }
    }
}
