//! Canonical lowercase forms for the free-text identity fields of an incident.
//!
//! Every function here is pure and treats blank input as null. Location
//! normalization is idempotent: feeding its output back in returns it unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("normalizer pattern must compile")
}

// Facility suffix glued onto the previous word, e.g. "MaribyrnongIDC"
static GLUED_SUFFIX: Lazy<Regex> = Lazy::new(|| pattern(r"([a-z])(IDC|IRH|APOD|ITA)\b"));
static NULL_TOKEN: Lazy<Regex> = Lazy::new(|| pattern(r"\bnull\b"));
static DASH_RUN: Lazy<Regex> = Lazy::new(|| pattern(r"-(?:\s*-)+"));
// Dashes, whitespace and date(-time) fragments captured ahead of the name
static LEADING_JUNK: Lazy<Regex> = Lazy::new(|| {
    pattern(r"^(?:[\s-]+|\d{1,2}/\d{1,2}/\d{2,4}(?:\s+\d{1,2}:\d{2}(?::\d{2})?)?)+")
});
static TRAILING_JUNK: Lazy<Regex> = Lazy::new(|| pattern(r"[\s-]+$"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| pattern(r"\s+"));
static ID_NULL: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)null"));

/// Known misspelled, merged or renamed facility names. A match replaces the
/// whole location; no canonical name matches a different entry.
static LOCATION_REWRITES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            pattern(r"berrimah accommodation facility minor client"),
            "berrimah accommodation facility",
        ),
        (
            pattern(r"^christmas island (?:idc|immigration detention cent(?:re|er))$"),
            "north west point idc",
        ),
        (
            pattern(r"^(?:vilawood|villiwood|villawod) idc$"),
            "villawood idc",
        ),
        (pattern(r"^sherger idc$"), "scherger idc"),
        (pattern(r"^wickhampoint(?: idc)?$"), "wickham point idc"),
    ]
});

const OBS_ROOM_VARIANT: &str = "use of obs room >24 hours";
const OBS_ROOM_CANONICAL: &str = "use of observation rm > 24 hrs";

fn collapse_whitespace(value: &str) -> String {
    WHITESPACE.replace_all(value.trim(), " ").into_owned()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

pub fn normalize_location(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let spaced = GLUED_SUFFIX.replace_all(raw, "${1} ${2}");
    let lower = spaced.to_lowercase();
    let without_nulls = NULL_TOKEN.replace_all(&lower, " ");
    let without_dashes = DASH_RUN.replace_all(&without_nulls, " ");
    let trimmed = LEADING_JUNK.replace(&without_dashes, "");
    let trimmed = TRAILING_JUNK.replace(&trimmed, "");
    let cleaned = collapse_whitespace(&trimmed);

    let canonical = LOCATION_REWRITES
        .iter()
        .find(|(re, _)| re.is_match(&cleaned))
        .map(|(_, name)| name.to_string())
        .unwrap_or(cleaned);
    non_empty(canonical)
}

pub fn normalize_incident_type(raw: Option<&str>) -> Option<String> {
    let value = collapse_whitespace(&raw?.to_lowercase());
    if value == OBS_ROOM_VARIANT {
        return Some(OBS_ROOM_CANONICAL.to_string());
    }
    non_empty(value)
}

pub fn normalize_id(raw: Option<&str>) -> Option<String> {
    let value = ID_NULL.replace_all(raw?, "");
    non_empty(value.trim().to_string())
}
