use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{MAX_REFERENCE_LEN, SELF_HARM_LABEL};
use crate::types::{Enrichment, IncidentRecord};

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("enrichment pattern must compile")
}

static OFFSHORE: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?i)christmas|phosphate|nauru|manus|aqua|lilac|construction camp|north west point")
});
static SELF_HARM_PHRASE: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\bself[\s-]?harm(?:s|ed|ing)?\b"));
static REFERENCE_ID: Lazy<Regex> = Lazy::new(|| pattern(r"\b1-[0-9A-Z]{5,}\b"));

/// Incident types that are routine or administrative
static UNINTERESTING_TYPE: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?i)\bminor\b|^transfer|use of observation|failure|media|complaint|serious injury",
    )
});
static AGGRESSIVE_BEHAVIOUR: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)aggressive behaviour"));
static MINOR_LEVEL: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)^\s*minor\b"));

/// Whether the location is one of the island or remote processing sites
pub fn is_offshore(location: Option<&str>) -> bool {
    location.is_some_and(|location| OFFSHORE.is_match(location))
}

/// Self-harm mentioned in the free text of an incident filed under another category.
pub fn is_misreported_self_harm(record: &IncidentRecord) -> bool {
    record.incident_category() != Some(SELF_HARM_LABEL)
        && record
            .text_fields()
            .any(|text| SELF_HARM_PHRASE.is_match(text))
}

/// Other incident ids mentioned in the free text, in first-seen order.
///
/// Tokens of `MAX_REFERENCE_LEN` characters or more are not ids.
pub fn extract_incident_references(record: &IncidentRecord) -> Vec<String> {
    let mut references: Vec<String> = Vec::new();
    for text in record.text_fields() {
        for token in REFERENCE_ID.find_iter(text).map(|m| m.as_str()) {
            if token.len() >= MAX_REFERENCE_LEN || token == record.id {
                continue;
            }
            if !references.iter().any(|seen| seen == token) {
                references.push(token.to_string());
            }
        }
    }
    references
}

pub fn is_interesting(record: &IncidentRecord) -> bool {
    let Some(incident_type) = record.incident_type.as_deref() else {
        return true;
    };
    if UNINTERESTING_TYPE.is_match(incident_type) {
        return false;
    }
    let minor_aggression = AGGRESSIVE_BEHAVIOUR.is_match(incident_type)
        && record
            .level
            .as_deref()
            .is_some_and(|level| MINOR_LEVEL.is_match(level));
    !minor_aggression
}

/// Whitespace-delimited word count and character count of the summary
pub fn summary_metrics(summary: Option<&str>) -> (usize, usize) {
    let summary = summary.unwrap_or("");
    (summary.split_whitespace().count(), summary.chars().count())
}

/// Compute every derived field for a normalized, classified record
pub fn enrich(record: &IncidentRecord) -> Enrichment {
    let (words_in_summary, characters_in_summary) = summary_metrics(record.summary.as_deref());
    Enrichment {
        offshore: is_offshore(record.location.as_deref()),
        misreported_self_harm: is_misreported_self_harm(record),
        interest: is_interesting(record),
        incident_references: extract_incident_references(record),
        words_in_summary,
        characters_in_summary,
    }
}
