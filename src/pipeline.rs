use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};

use crate::config::NormalizerConfig;
use crate::error::NormalizeError;
use crate::panic_handler::{payload_message, with_panic_exit_suppressed};
use crate::parsing::markdown_renderer::MarkdownRenderer;
use crate::parsing::postprocess::InlinePostProcessor;
use crate::parsing::sanitizer::{SanitizeStats, Sanitizer};
use crate::parsing::tex_scripts::convert_sub_sup;
use crate::references::{ExtractedReferences, ReferenceTable, extract_references};
use crate::types::{NormalizedTask, TaskRecord};

/// Everything one fragment produces.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFragment {
    /// Sanitized markup; this is the persisted form of the fragment.
    pub cleaned_html: String,
    pub markdown: String,
    pub requires_attachment: bool,
    pub references: ExtractedReferences,
    pub stats: SanitizeStats,
    pub tex_scripts: usize,
}

impl NormalizedFragment {
    /// Builds the output record, carrying over the fields the input had.
    pub fn into_task(self, record: TaskRecord) -> NormalizedTask {
        NormalizedTask {
            kes: self.references.codes(),
            internal_id: record.internal_id,
            question_html_clean: self.cleaned_html,
            question_md: self.markdown,
            requires_attachment: self.requires_attachment,
            task_number: record.task_number,
            question_text: record.question_text,
            attachments: record.attachments,
            meta: record.meta,
            extra: record.extra,
        }
    }
}

/// Normalizes a bare fragment: sanitize, sub/sup to TeX, render, post-process.
pub fn normalize_fragment(
    raw_html: &str,
    category: Option<u32>,
    config: &NormalizerConfig,
) -> NormalizedFragment {
    normalize_with(&Sanitizer::new(config), raw_html, category, config)
}

fn normalize_with(
    sanitizer: &Sanitizer<'_>,
    raw_html: &str,
    category: Option<u32>,
    config: &NormalizerConfig,
) -> NormalizedFragment {
    let sanitized = sanitizer.sanitize_html(raw_html);
    let cleaned_html = sanitized.cleaned_html();

    let (root, tex_scripts) = convert_sub_sup(sanitized.root);
    let rendered = MarkdownRenderer::new(config.list_indent).render(&root);
    let markdown = InlinePostProcessor::new(config, category).process(&rendered);

    NormalizedFragment {
        cleaned_html,
        markdown,
        requires_attachment: sanitized.requires_attachment,
        references: ExtractedReferences::default(),
        stats: sanitized.stats,
        tex_scripts,
    }
}

/// Normalizes one task record, folding in what its metadata says.
pub fn normalize_task(record: &TaskRecord, config: &NormalizerConfig) -> NormalizedFragment {
    let sanitizer = Sanitizer::new(config);
    let mut fragment = normalize_with(&sanitizer, &record.question_html, record.task_number, config);

    let notice_in_text = record
        .question_text
        .as_deref()
        .is_some_and(|text| sanitizer.mentions_attachment_notice(text));
    fragment.requires_attachment |= notice_in_text || !record.attachments.is_empty();
    fragment.references = extract_references(record.classifications());

    log::debug!(
        "Normalized task {:?}: {} rewrites, {} TeX scripts, attachment: {}",
        record.internal_id,
        fragment.stats.total(),
        fragment.tex_scripts,
        fragment.requires_attachment
    );
    fragment
}

/// Batch-wide totals. Reports from separate workers combine with [`BatchReport::merge`]
/// in any order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub tasks: usize,
    pub failures: usize,
    pub requiring_attachment: usize,
    pub tex_scripts: usize,
    pub stats: SanitizeStats,
    #[serde(skip)]
    pub references: ReferenceTable,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a normalized fragment; its references are copied into the batch table.
    pub fn record(&mut self, fragment: &NormalizedFragment) {
        self.tasks += 1;
        self.tex_scripts += fragment.tex_scripts;
        self.stats += fragment.stats;
        if fragment.requires_attachment {
            self.requiring_attachment += 1;
        }
        self.references.record(fragment.references.clone());
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn merge(&mut self, other: BatchReport) {
        self.tasks += other.tasks;
        self.failures += other.failures;
        self.requiring_attachment += other.requiring_attachment;
        self.tex_scripts += other.tex_scripts;
        self.stats += other.stats;
        self.references.merge(other.references);
    }

    pub fn log_summary(&self) {
        log::info!(
            "Normalized {} tasks ({} failed, {} need attachments, {} TeX scripts)",
            self.tasks,
            self.failures,
            self.requiring_attachment,
            self.tex_scripts
        );
        for (name, count) in self.stats.entries() {
            if count > 0 {
                log::info!("  {name}: {count}");
            }
        }
        log::info!(
            "Reference table: {} codes, {} conflicts, {} unrecognized entries",
            self.references.len(),
            self.references.conflicts(),
            self.references.unrecognized()
        );
    }
}

/// Normalizes `record`, turning a panic inside the passes into a counted failure.
pub fn normalize_isolated(
    record: TaskRecord,
    config: &NormalizerConfig,
    report: &mut BatchReport,
) -> Option<NormalizedTask> {
    let outcome = with_panic_exit_suppressed(|| {
        panic::catch_unwind(AssertUnwindSafe(|| normalize_task(&record, config)))
    });

    match outcome {
        Ok(fragment) => {
            report.record(&fragment);
            Some(fragment.into_task(record))
        }
        Err(payload) => {
            let err = NormalizeError::Fragment {
                id: record.internal_id,
                reason: payload_message(payload.as_ref()),
            };
            log::error!("Skipping task: {err}");
            report.record_failure();
            None
        }
    }
}

pub fn normalize_batch(
    records: Vec<TaskRecord>,
    config: &NormalizerConfig,
) -> (Vec<NormalizedTask>, BatchReport) {
    let mut report = BatchReport::new();
    let tasks = records
        .into_iter()
        .filter_map(|record| normalize_isolated(record, config, &mut report))
        .collect();
    (tasks, report)
}
