use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{info, instrument};

use crate::error::Result;
use crate::pipeline::aggregate::Dataset;
use crate::types::{Classification, Enrichment, IncidentRecord, RawRow};

/// How the dataset is written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain `{"data": ..., "months": ...}` JSON
    Json,
    /// The same JSON wrapped in a single `define(...)` call
    Module,
}

impl Dataset {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_module(&self) -> Result<String> {
        Ok(format!("define({});\n", self.to_json()?))
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => self.to_json(),
            OutputFormat::Module => self.to_module(),
        }
    }
}

#[instrument(skip(dataset))]
pub fn write_dataset(dataset: &Dataset, path: &Path, format: OutputFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, dataset.render(format)?)?;
    info!("Wrote {} records to {}", dataset.data.len(), path.display());
    Ok(())
}

/// Appended after the source columns; a source column of the same name is
/// overwritten in place.
const DERIVED_COLUMNS: [&str; 12] = [
    "incident_type",
    "location",
    "occurred_on",
    "incident_category",
    "facility_type",
    "contraband_category",
    "offshore",
    "misreported_self_harm",
    "interest",
    "incident_references",
    "words_in_summary",
    "characters_in_summary",
];

/// Cleaned value for a derived column, `None` for any other column
fn derived_value(record: &IncidentRecord, column: &str) -> Option<String> {
    let classification = record.classification.as_ref();
    let enrichment = record.enrichment.as_ref();
    let label = |pick: fn(&Classification) -> &String| {
        classification.map_or_else(String::new, |c| pick(c).clone())
    };
    let derived = |pick: fn(&Enrichment) -> String| enrichment.map_or_else(String::new, pick);

    let value = match column {
        "incident_type" => record.incident_type.clone().unwrap_or_default(),
        "location" => record.location.clone().unwrap_or_default(),
        "occurred_on" => record.occurred_on.date().format("%Y-%m-%d").to_string(),
        "incident_category" => label(|c| &c.incident_category),
        "facility_type" => label(|c| &c.facility_type),
        "contraband_category" => label(|c| &c.contraband_category),
        "offshore" => derived(|e| e.offshore.to_string()),
        "misreported_self_harm" => derived(|e| e.misreported_self_harm.to_string()),
        "interest" => derived(|e| e.interest.to_string()),
        "incident_references" => derived(|e| e.incident_references.join(" ")),
        "words_in_summary" => derived(|e| e.words_in_summary.to_string()),
        "characters_in_summary" => derived(|e| e.characters_in_summary.to_string()),
        _ => return None,
    };
    Some(value)
}

/// Write each kept source row with every original column, followed by the
/// derived columns.
pub fn write_cleaned_csv<W: Write>(rows: &[(&RawRow, &IncidentRecord)], writer: W) -> Result<()> {
    let mut header: Vec<&str> = Vec::new();
    for (source, _) in rows {
        for name in source.column_names() {
            if !header.contains(&name) {
                header.push(name);
            }
        }
    }
    for column in DERIVED_COLUMNS {
        if !header.contains(&column) {
            header.push(column);
        }
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&header)?;
    for (source, record) in rows {
        let values = header.iter().map(|column| {
            derived_value(record, column)
                .unwrap_or_else(|| source.raw(column).unwrap_or_default().to_string())
        });
        csv_writer.write_record(values)?;
    }
    csv_writer.flush()?;
    Ok(())
}
