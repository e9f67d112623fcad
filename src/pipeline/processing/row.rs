use std::fmt;
use tracing::{debug, warn};

use crate::constants::{
    COL_INCIDENT_NUMBER, COL_LEVEL, COL_LOCATION, COL_LOCATION_DETAILS, COL_OCCURRED_ON,
    COL_SUMMARY, COL_TYPE, INCIDENT_COLUMNS,
};
use crate::pipeline::processing::classify::{classify, RuleSet};
use crate::pipeline::processing::dates::parse_incident_date;
use crate::pipeline::processing::enrich::enrich;
use crate::pipeline::processing::normalize::{
    normalize_id, normalize_incident_type, normalize_location,
};
use crate::types::{Classification, EventType, IncidentRecord, RawRow};

/// Why a row was left out of the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    MissingId,
    MissingDate { id: String },
    UnparseableDate { id: String, value: String },
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowRejection::MissingId => write!(f, "row has no incident number"),
            RowRejection::MissingDate { id } => write!(f, "incident {id} has no occurrence date"),
            RowRejection::UnparseableDate { id, value } => {
                write!(f, "incident {id} has unrecognized occurrence date {value:?}")
            }
        }
    }
}

/// Normalize, classify and enrich one incident row.
///
/// Depends only on the row itself and the immutable rule tables.
pub fn process_row(row: &RawRow, rules: &RuleSet) -> Result<IncidentRecord, RowRejection> {
    let id = normalize_id(row.get(COL_INCIDENT_NUMBER)).ok_or(RowRejection::MissingId)?;
    let raw_date = row
        .get(COL_OCCURRED_ON)
        .ok_or_else(|| RowRejection::MissingDate { id: id.clone() })?;
    let occurred_on =
        parse_incident_date(raw_date).ok_or_else(|| RowRejection::UnparseableDate {
            id: id.clone(),
            value: raw_date.to_string(),
        })?;

    let incident_type = normalize_incident_type(row.get(COL_TYPE));
    let location = normalize_location(row.get(COL_LOCATION));
    let summary = row.get(COL_SUMMARY).map(str::to_string);

    let classification = Classification {
        incident_category: classify(incident_type.as_deref(), &rules.incident_categories)
            .to_string(),
        facility_type: classify(location.as_deref(), &rules.facility_types).to_string(),
        contraband_category: classify(summary.as_deref(), &rules.contraband_categories)
            .to_string(),
    };

    let mut record = IncidentRecord {
        id,
        event_type: EventType::Incident,
        incident_type,
        location,
        location_details: row.get(COL_LOCATION_DETAILS).map(str::to_string),
        summary,
        level: row.get(COL_LEVEL).map(str::to_string),
        occurred_on,
        classification: Some(classification),
        enrichment: None,
        detailed_report: None,
        extra: row.remaining(&INCIDENT_COLUMNS),
    };
    record.enrichment = Some(enrich(&record));
    Ok(record)
}

/// Records kept from a batch of rows, and how many were dropped
#[derive(Debug, Default)]
pub struct ProcessedRows {
    pub records: Vec<IncidentRecord>,
    /// Input index of each kept record, parallel to `records`
    pub kept_rows: Vec<usize>,
    pub dropped: usize,
}

pub fn process_rows<'a, I>(rows: I, rules: &RuleSet) -> ProcessedRows
where
    I: IntoIterator<Item = &'a RawRow>,
{
    let mut processed = ProcessedRows::default();
    for (index, row) in rows.into_iter().enumerate() {
        match process_row(row, rules) {
            Ok(record) => {
                debug!(id = %record.id, "Processed incident row");
                processed.records.push(record);
                processed.kept_rows.push(index);
            }
            Err(rejection) => {
                // +2: one for the header, one for 1-based numbering
                warn!(row = index + 2, "Dropping incident row: {}", rejection);
                processed.dropped += 1;
            }
        }
    }
    processed
}
