use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Keys `IncidentRecord` serializes itself; pass-through columns may not reuse them
pub const RECORD_FIELDS: [&str; 18] = [
    "id",
    "event_type",
    "incident_type",
    "location",
    "location_details",
    "summary",
    "level",
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
    "detailed_report",
];

/// One input line: column name to raw value, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    columns: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(columns: Vec<(String, String)>) -> Self {
        Self { columns }
    }

    /// Build a row from parallel header and value slices
    pub fn from_record(headers: &csv::StringRecord, record: &csv::StringRecord) -> Self {
        let columns = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        Self { columns }
    }

    /// Raw value for a column; blank values read as null
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.trim().is_empty())
    }

    /// Non-blank columns whose names are not in `known`.
    ///
    /// A column named like a record field is dropped so it cannot shadow
    /// that field in the flattened output.
    pub fn remaining(&self, known: &[&str]) -> BTreeMap<String, String> {
        let mut extra = BTreeMap::new();
        for (name, value) in &self.columns {
            if known.contains(&name.as_str()) || value.trim().is_empty() {
                continue;
            }
            if RECORD_FIELDS.contains(&name.as_str()) {
                warn!(column = %name, "Dropping pass-through column that shadows a record field");
                continue;
            }
            extra.insert(name.clone(), value.clone());
        }
        extra
    }

    /// Column names in file order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Value for a column exactly as read, blanks included
    pub fn raw(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Incident,
    Event,
}

/// Labels assigned by the rule tables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub incident_category: String,
    pub facility_type: String,
    pub contraband_category: String,
}

/// Fields derived from the normalized and classified values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enrichment {
    pub offshore: bool,
    pub misreported_self_harm: bool,
    pub interest: bool,
    pub incident_references: Vec<String>,
    pub words_in_summary: usize,
    pub characters_in_summary: usize,
}

/// A processed incident or event, keyed by `id` in the final dataset.
///
/// Serialized flat: classification and enrichment keys only appear on
/// incidents, `detailed_report` only once the feed has matched the record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentRecord {
    pub id: String,
    pub event_type: EventType,
    pub incident_type: Option<String>,
    pub location: Option<String>,
    pub location_details: Option<String>,
    pub summary: Option<String>,
    pub level: Option<String>,
    /// Date-only sources carry midnight
    pub occurred_on: NaiveDateTime,
    #[serde(flatten)]
    pub classification: Option<Classification>,
    #[serde(flatten)]
    pub enrichment: Option<Enrichment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_report: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl IncidentRecord {
    pub fn incident_category(&self) -> Option<&str> {
        self.classification
            .as_ref()
            .map(|c| c.incident_category.as_str())
    }

    /// The free-text fields scanned for phrases and reference ids
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        [&self.location, &self.location_details, &self.summary]
            .into_iter()
            .filter_map(|field| field.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        RawRow::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn blank_values_read_as_null() {
        let raw = row(&[("Type", "   "), ("Location", "Perth IDC")]);
        assert_eq!(raw.get("Type"), None);
        assert_eq!(raw.get("Location"), Some("Perth IDC"));
        assert_eq!(raw.get("Missing"), None);
    }

    #[test]
    fn remaining_skips_known_and_blank_columns() {
        let raw = row(&[("Type", "x"), ("Facility", "NWP"), ("Notes", "")]);
        let extra = raw.remaining(&["Type"]);
        assert_eq!(extra.len(), 1);
        assert_eq!(extra.get("Facility").map(String::as_str), Some("NWP"));
    }

    #[test]
    fn remaining_never_shadows_record_fields() {
        let raw = row(&[
            ("event_type", "incident"),
            ("incident_category", "media"),
            ("Location", "Perth IDC"),
            ("source", "hansard"),
        ]);
        let extra = raw.remaining(&[]);
        assert_eq!(extra.len(), 2);
        assert!(extra.contains_key("Location"));
        assert!(extra.contains_key("source"));
        assert!(!extra.contains_key("event_type"));
    }

    #[test]
    fn event_records_serialize_without_incident_fields() {
        let record = IncidentRecord {
            id: "ev-1".to_string(),
            event_type: EventType::Event,
            incident_type: None,
            location: None,
            location_details: None,
            summary: Some("Senate estimates".to_string()),
            level: None,
            occurred_on: NaiveDate::from_ymd_opt(2013, 5, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            classification: None,
            enrichment: None,
            detailed_report: None,
            extra: BTreeMap::from([("source".to_string(), "hansard".to_string())]),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["event_type"], "event");
        assert_eq!(value["occurred_on"], "2013-05-01T00:00:00");
        assert_eq!(value["source"], "hansard");
        assert!(value.get("incident_category").is_none());
        assert!(value.get("detailed_report").is_none());
    }
}
