use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::config::NormalizerConfig;
use crate::error::NormalizeError;
use crate::pipeline::{BatchReport, normalize_isolated};
use crate::types::TaskRecord;

/// Normalizes one JSONL stream of task records into another.
///
/// Blank lines are skipped. A line that is not a valid record is logged and
/// counted as a failure; the lines after it are still processed.
pub fn normalize_jsonl<R, W>(reader: R, mut writer: W, config: &NormalizerConfig) -> Result<BatchReport>
where
    R: BufRead,
    W: Write,
{
    let mut report = BatchReport::new();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.with_context(|| format!("Failed to read input line {line_number}"))?;
        if line.trim().is_empty() {
            continue;
        }

        let record: TaskRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(source) => {
                let err = NormalizeError::Record {
                    line: line_number,
                    source,
                };
                log::warn!("Skipping record: {err}");
                report.record_failure();
                continue;
            }
        };

        if let Some(task) = normalize_isolated(record, config, &mut report) {
            let json = serde_json::to_string(&task).context("Failed to serialize task")?;
            writeln!(writer, "{json}").context("Failed to write output line")?;
        }
    }

    writer.flush().context("Failed to flush output")?;
    Ok(report)
}

/// File-to-file run: tasks to `output`, the batch reference table to `references`.
pub fn run_files(
    input: &Path,
    output: &Path,
    references: &Path,
    config: &NormalizerConfig,
) -> Result<BatchReport> {
    let reader = BufReader::new(
        File::open(input).with_context(|| format!("Failed to open {}", input.display()))?,
    );
    let writer = BufWriter::new(
        File::create(output).with_context(|| format!("Failed to create {}", output.display()))?,
    );

    let report = normalize_jsonl(reader, writer, config)?;

    let json = report
        .references
        .to_json()
        .context("Failed to serialize reference table")?;
    fs::write(references, json)
        .with_context(|| format!("Failed to write {}", references.display()))?;

    report.log_summary();
    Ok(report)
}
