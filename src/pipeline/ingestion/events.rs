use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::constants::{
    EVENT_COL_ID, EVENT_COL_INCIDENT_TYPE, EVENT_COL_LEVEL, EVENT_COL_LOCATION,
    EVENT_COL_LOCATION_DETAILS, EVENT_COL_OCCURRED_ON, EVENT_COL_SUMMARY,
};
use crate::error::{ImporterError, Result};
use crate::pipeline::ingestion::incidents::read_rows;
use crate::pipeline::processing::dates::{parse_event_date, ParsedDate};
use crate::types::{EventType, IncidentRecord, RawRow};

const EVENT_COLUMNS: [&str; 7] = [
    EVENT_COL_ID,
    EVENT_COL_OCCURRED_ON,
    EVENT_COL_INCIDENT_TYPE,
    EVENT_COL_LOCATION,
    EVENT_COL_LOCATION_DETAILS,
    EVENT_COL_SUMMARY,
    EVENT_COL_LEVEL,
];

/// Turn one events-export row into a record tagged as an event.
///
/// Fields pass through as they are; events are not classified or enriched.
/// Returns `Ok(None)` for a row with no id.
fn event_from_row(row: &RawRow, source_name: &str, line: usize) -> Result<Option<IncidentRecord>> {
    let Some(id) = row.get(EVENT_COL_ID).map(str::trim) else {
        warn!(row = line, "Dropping event row without an id");
        return Ok(None);
    };

    let raw_date = row.get(EVENT_COL_OCCURRED_ON).unwrap_or("");
    let occurred_on = match parse_event_date(raw_date) {
        ParsedDate::Parsed { value, .. } => value,
        ParsedDate::Unrecognized => {
            return Err(ImporterError::DateParse {
                source_name: source_name.to_string(),
                row: line,
                value: raw_date.to_string(),
            })
        }
    };

    let text = |column: &str| row.get(column).map(str::to_string);
    Ok(Some(IncidentRecord {
        id: id.to_string(),
        event_type: EventType::Event,
        incident_type: text(EVENT_COL_INCIDENT_TYPE),
        location: text(EVENT_COL_LOCATION),
        location_details: text(EVENT_COL_LOCATION_DETAILS),
        summary: text(EVENT_COL_SUMMARY),
        level: text(EVENT_COL_LEVEL),
        occurred_on,
        classification: None,
        enrichment: None,
        detailed_report: None,
        extra: row.remaining(&EVENT_COLUMNS),
    }))
}

/// Parse an events export. Any unrecognized `occurred_on` rejects the whole file.
pub fn import_events<R: Read>(reader: R, source_name: &str) -> Result<Vec<IncidentRecord>> {
    let rows = read_rows(reader)?;
    let mut events = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        if let Some(event) = event_from_row(row, source_name, index + 2)? {
            events.push(event);
        }
    }
    Ok(events)
}

#[instrument]
pub fn import_event_file(path: &Path) -> Result<Vec<IncidentRecord>> {
    let file = File::open(path).map_err(|source| ImporterError::Input {
        path: path.display().to_string(),
        source,
    })?;
    let events = import_events(file, &path.display().to_string())?;
    info!("Imported {} events from {}", events.len(), path.display());
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_both_date_shapes() {
        let data = "id,occurred_on,summary,source\n\
                    ev-1,05/01/09 13:45,Minister visits,hansard\n\
                    ev-2,20/01/09,Report tabled,\n";
        let events = import_events(data.as_bytes(), "events.csv").unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::Event);
        assert_eq!(
            events[0].occurred_on,
            NaiveDate::from_ymd_opt(2009, 1, 5).unwrap().and_hms_opt(13, 45, 0).unwrap()
        );
        assert_eq!(
            events[1].occurred_on,
            NaiveDate::from_ymd_opt(2009, 1, 20).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(events[0].summary.as_deref(), Some("Minister visits"));
        assert_eq!(events[0].extra.get("source").map(String::as_str), Some("hansard"));
        assert!(events[0].classification.is_none());
        assert!(events[0].enrichment.is_none());
    }

    #[test]
    fn unrecognized_date_fails_the_import() {
        let data = "id,occurred_on\nev-1,05/01/09\nev-2,January 2009\n";
        let err = import_events(data.as_bytes(), "events.csv").unwrap_err();
        match err {
            ImporterError::DateParse {
                source_name,
                row,
                value,
            } => {
                assert_eq!(source_name, "events.csv");
                assert_eq!(row, 3);
                assert_eq!(value, "January 2009");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_date_fails_the_import() {
        let data = "id,occurred_on\nev-1,\n";
        assert!(import_events(data.as_bytes(), "events.csv").is_err());
    }

    #[test]
    fn event_type_column_cannot_relabel_an_event() {
        let data = "id,occurred_on,event_type\nev-1,05/01/09,incident\n";
        let events = import_events(data.as_bytes(), "events.csv").unwrap();
        assert!(events[0].extra.is_empty());

        let json = serde_json::to_string(&events[0]).unwrap();
        assert_eq!(json.matches("\"event_type\"").count(), 1);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["event_type"], "event");
    }

    #[test]
    fn rows_without_id_are_skipped() {
        let data = "id,occurred_on\n,05/01/09\nev-2,06/01/09\n";
        let events = import_events(data.as_bytes(), "events.csv").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "ev-2");
    }
}
