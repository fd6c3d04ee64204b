//! Batch driver: walks the source folder and normalizes each file
//!
//! Every input is parsed into its own document, run through the
//! [`Normalizer`] and written to the target folder. Rule outcomes are routed
//! to the console and, for structural skips and failures, to the file's
//! diagnostic log. A file that cannot be parsed or written never stops the
//! rest of the batch.

use std::path::Path;

use chrono::NaiveDate;
use normalize_engine::{DirectoryTemplates, Normalizer, RunContext, SuffixGenerator};
use shared_types::{FileReport, OutcomeStatus, RuleOutcome};
use tracing::{debug, info, warn};

use crate::config::BatchSettings;
use crate::error::BatchError;
use crate::file_log::FileLog;
use crate::io;

/// Counters for one batch run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub files_found: usize,
    pub written: usize,
    pub parse_failures: usize,
    pub write_failures: usize,
    pub reports: Vec<FileReport>,
}

pub struct BatchRunner {
    settings: BatchSettings,
    templates: DirectoryTemplates,
    normalizer: Normalizer,
    today: NaiveDate,
}

impl BatchRunner {
    pub fn new(settings: BatchSettings) -> Self {
        let templates =
            DirectoryTemplates::under_source_folder(&settings.source_dir, settings.template_names.clone());
        Self {
            settings,
            templates,
            normalizer: Normalizer::new(),
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Override the reference date used for month-to-month terms
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Process every `*.xml` file in the source folder
    pub fn run(&self, suffixes: &mut dyn SuffixGenerator) -> Result<BatchSummary, BatchError> {
        let mut summary = BatchSummary::default();
        let source_dir = &self.settings.source_dir;

        if !source_dir.is_dir() {
            warn!("Source directory (\"{}\") not found.", source_dir.display());
            return Ok(summary);
        }

        let files = io::list_input_files(source_dir)?;
        summary.files_found = files.len();
        if files.is_empty() {
            info!("No xml files found in \"{}\".", source_dir.display());
            return Ok(summary);
        }
        info!("Found {} xml file(s) in \"{}\".", files.len(), source_dir.display());

        for path in &files {
            self.process_file(path, suffixes, &mut summary);
        }

        info!(
            found = summary.files_found,
            written = summary.written,
            parse_failures = summary.parse_failures,
            write_failures = summary.write_failures,
            "Batch finished"
        );
        Ok(summary)
    }

    fn process_file(&self, path: &Path, suffixes: &mut dyn SuffixGenerator, summary: &mut BatchSummary) {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("Processing \"{}\" file...", file_name);

        let mut doc = match io::load_input(path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("{}", e);
                summary.parse_failures += 1;
                return;
            }
        };

        let log = FileLog::for_input(&self.settings.log_dir, &file_name);
        let mut ctx = RunContext::new(&self.templates, suffixes, self.today);
        let report = self.normalizer.normalize(&mut doc, &mut ctx, &file_name);
        for outcome in &report.outcomes {
            log_to_console(outcome);
        }
        for message in report.file_log_messages() {
            log.append(message);
        }

        match io::write_output(&doc, &self.settings.target_dir, &file_name) {
            Ok(written) => {
                info!("Saved \"{}\".", written.display());
                summary.written += 1;
            }
            Err(e) => {
                let message = e.to_string();
                warn!("{}", message);
                log.append(&message);
                summary.write_failures += 1;
            }
        }
        summary.reports.push(report);
    }
}

/// Template and tree failures are warnings; everything else is debug detail
fn log_to_console(outcome: &RuleOutcome) {
    match &outcome.status {
        OutcomeStatus::Applied => debug!(rule = ?outcome.rule, "Applied"),
        OutcomeStatus::SkippedParse(reason) | OutcomeStatus::SkippedStructural(reason) => {
            debug!(rule = ?outcome.rule, "{}", reason)
        }
        OutcomeStatus::Unavailable(reason) | OutcomeStatus::Failed(reason) => {
            warn!(rule = ?outcome.rule, "{}", reason)
        }
    }
}
