pub mod aggregate;
pub mod ingestion;
pub mod processing;

use metrics::counter;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::app::merge_use_case::MergeUseCase;
use crate::app::ports::FeedSource;
use crate::error::{ImporterError, Result};
use crate::output::{write_cleaned_csv, write_dataset, OutputFormat};
use crate::pipeline::aggregate::Dataset;
use crate::pipeline::ingestion::events::import_event_file;
use crate::pipeline::ingestion::incidents::read_incident_file;
use crate::pipeline::processing::classify::RuleSet;
use crate::pipeline::processing::row::{process_rows, ProcessedRows};
use crate::types::{IncidentRecord, RawRow};

/// Paths and options for one import run
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub incidents: PathBuf,
    pub events: Option<PathBuf>,
    pub output: PathBuf,
    pub format: OutputFormat,
}

/// Result of a complete import run
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub rows_read: usize,
    pub incidents_kept: usize,
    pub rows_dropped: usize,
    pub events: usize,
    pub feed_matched: usize,
    pub feed_unmatched: usize,
    pub id_collisions: Vec<String>,
    pub records: usize,
    pub months: usize,
    pub output_file: String,
}

/// Wires the row pipeline, feed merge and aggregation for one run
pub struct ImportJob {
    rules: RuleSet,
    merge: MergeUseCase,
}

impl ImportJob {
    pub fn new(rules: RuleSet, feed: Box<dyn FeedSource>) -> Self {
        Self {
            rules,
            merge: MergeUseCase::new(feed),
        }
    }

    fn process(&self, rows: &[RawRow]) -> ProcessedRows {
        let processed = process_rows(rows, &self.rules);
        counter!("importer_rows_processed_total").increment(processed.records.len() as u64);
        counter!("importer_rows_dropped_total").increment(processed.dropped as u64);
        info!(
            "Processed {} incident rows ({} dropped)",
            processed.records.len(),
            processed.dropped
        );
        processed
    }

    /// Run every stage on already-loaded inputs and return the dataset.
    pub async fn build_dataset(
        &self,
        rows: &[RawRow],
        events: Vec<IncidentRecord>,
    ) -> Result<(Dataset, ImportSummary)> {
        let processed = self.process(rows);
        let merged = self.merge.merge(processed.records).await?;
        let incidents_kept = merged.records.len();
        let event_count = events.len();
        let dataset = Dataset::build(merged.records, events);

        let summary = ImportSummary {
            rows_read: rows.len(),
            incidents_kept,
            rows_dropped: processed.dropped,
            events: event_count,
            feed_matched: merged.matched,
            feed_unmatched: merged.unmatched,
            id_collisions: dataset.collisions.clone(),
            records: dataset.data.len(),
            months: dataset.months.len(),
            output_file: String::new(),
        };
        Ok((dataset, summary))
    }

    /// Read, transform, merge, aggregate and write one import.
    #[instrument(skip(self), fields(incidents = %request.incidents.display()))]
    pub async fn run(&self, request: &ImportRequest) -> Result<ImportSummary> {
        info!("🚀 Starting import");
        let rows = read_incident_file(&request.incidents)?;
        // Events are read before the feed is fetched
        let events = match &request.events {
            Some(path) => import_event_file(path)?,
            None => Vec::new(),
        };

        let (dataset, mut summary) = self.build_dataset(&rows, events).await?;
        write_dataset(&dataset, &request.output, request.format)?;
        summary.output_file = request.output.display().to_string();
        info!("✅ Import finished");
        Ok(summary)
    }
}

/// Summary of a cleaned-CSV export
#[derive(Debug, Serialize)]
pub struct CleanSummary {
    pub rows_read: usize,
    pub rows_written: usize,
    pub rows_dropped: usize,
}

/// Run the row pipeline over an export and write each kept row back out with
/// its source columns intact and the derived columns appended.
///
/// No feed is consulted; dates stay as the export gives them.
#[instrument(skip(rules))]
pub fn clean_file(input: &Path, output: &Path, rules: &RuleSet) -> Result<CleanSummary> {
    let rows = read_incident_file(input)?;
    let processed = process_rows(&rows, rules);

    let file = File::create(output).map_err(|source| ImporterError::Input {
        path: output.display().to_string(),
        source,
    })?;
    let cleaned: Vec<(&RawRow, &IncidentRecord)> = processed
        .kept_rows
        .iter()
        .map(|&index| &rows[index])
        .zip(&processed.records)
        .collect();
    write_cleaned_csv(&cleaned, BufWriter::new(file))?;
    info!(
        "Wrote {} cleaned rows to {}",
        processed.records.len(),
        output.display()
    );

    Ok(CleanSummary {
        rows_read: rows.len(),
        rows_written: processed.records.len(),
        rows_dropped: processed.dropped,
    })
}
