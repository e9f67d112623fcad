//! Source column names and other fixed strings shared across the importer

// Incident export columns
pub const COL_INCIDENT_NUMBER: &str = "Incident Number";
pub const COL_TYPE: &str = "Type";
pub const COL_LOCATION: &str = "Location";
pub const COL_LOCATION_DETAILS: &str = "Location Details";
pub const COL_SUMMARY: &str = "Summary";
pub const COL_OCCURRED_ON: &str = "Occurred On";
pub const COL_LEVEL: &str = "Level";

/// Columns the row pipeline consumes; everything else passes through
pub const INCIDENT_COLUMNS: [&str; 7] = [
    COL_INCIDENT_NUMBER,
    COL_TYPE,
    COL_LOCATION,
    COL_LOCATION_DETAILS,
    COL_SUMMARY,
    COL_OCCURRED_ON,
    COL_LEVEL,
];

// Events export columns
pub const EVENT_COL_ID: &str = "id";
pub const EVENT_COL_OCCURRED_ON: &str = "occurred_on";
pub const EVENT_COL_INCIDENT_TYPE: &str = "incident_type";
pub const EVENT_COL_LOCATION: &str = "location";
pub const EVENT_COL_LOCATION_DETAILS: &str = "location_details";
pub const EVENT_COL_SUMMARY: &str = "summary";
pub const EVENT_COL_LEVEL: &str = "level";

/// Label used when no rule in a table matches
pub const OTHER_LABEL: &str = "other";

/// Incident category that suppresses the misreported self-harm flag
pub const SELF_HARM_LABEL: &str = "self-harm";

/// Environment variable holding the authoritative incident feed URL
pub const FEED_URL_ENV: &str = "INCIDENT_FEED_URL";

/// Optional TOML file with feed client tunables
pub const DEFAULT_CONFIG_PATH: &str = "importer.toml";

/// Reference ids at or above this length are treated as noise
pub const MAX_REFERENCE_LEN: usize = 9;
