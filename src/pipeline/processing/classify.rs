use regex::{Regex, RegexBuilder};

use crate::constants::OTHER_LABEL;
use crate::error::Result;

/// A named pattern; the name is the label a match assigns
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub pattern: Regex,
}

impl Rule {
    pub fn new(name: &str, pattern: &str, case_insensitive: bool) -> Result<Self> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()?;
        Ok(Self {
            name: name.to_string(),
            pattern,
        })
    }
}

/// An ordered, immutable list of rules. Evaluation is top to bottom and the
/// first match wins, so reordering entries changes the labels produced.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn from_patterns(entries: &[(&str, &str)], case_insensitive: bool) -> Result<Self> {
        let rules = entries
            .iter()
            .map(|(name, pattern)| Rule::new(name, pattern, case_insensitive))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Every label this table can produce, `other` included
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !labels.contains(&rule.name.as_str()) {
                labels.push(&rule.name);
            }
        }
        labels.push(OTHER_LABEL);
        labels
    }
}

/// Label of the first rule whose pattern matches `value`, or `other`.
pub fn classify<'a>(value: Option<&str>, table: &'a RuleTable) -> &'a str {
    let Some(value) = value else {
        return OTHER_LABEL;
    };
    table
        .rules
        .iter()
        .find(|rule| rule.pattern.is_match(value))
        .map(|rule| rule.name.as_str())
        .unwrap_or(OTHER_LABEL)
}

/// Matched against the normalized (lowercase) incident type, case-sensitively.
pub const INCIDENT_CATEGORY_RULES: &[(&str, &str)] = &[
    ("media", r"media"),
    ("assault", r"assault|aggressive behaviour|weapon"),
    ("disturbance", r"disturbance|notification by welfare"),
    ("complaint", r"complaint"),
    ("contraband", r"contraband"),
    ("damage", r"damage|property|theft"),
    ("external-protest", r"threat-bomb|demonstration - offsite"),
    (
        "protest",
        r"protest|riot|voluntary starvation|barricade|demonstration - onsite",
    ),
    ("force", r"use of force|use of restraint"),
    ("escape", r"escape"),
    (
        "injury",
        r"death|emergency|infection|birth|accident|poisoning|public health risk",
    ),
    ("self-harm", r"self harm"),
    (
        "admin",
        r"^transfer |failure|removal - aborted|use of observation|visitor",
    ),
];

/// Matched against the normalized (lowercase) location, case-sensitively.
pub const FACILITY_TYPE_RULES: &[(&str, &str)] = &[
    ("idc", r"christmas| idc|northern|sa detention"),
    ("irh", r" irh"),
    ("apod", r" apod|phosphate|aqua|lilac"),
    ("ita", r" ita"),
];

/// Matched against the raw summary, ignoring case.
pub const CONTRABAND_CATEGORY_RULES: &[(&str, &str)] = &[
    ("weapon", r"knife|knives|blade|razor|weapon|scissors"),
    (
        "drugs",
        r"drug|cannabis|marijuana|methamphetamine|\bice\b|tablets|pills|syringe",
    ),
    ("alcohol", r"alcohol|home ?brew|spirits|beer|wine|liquor"),
    ("phone", r"mobile phone|phone|sim card"),
    ("tobacco", r"tobacco|cigarette"),
];

/// The three rule tables the row pipeline classifies with
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub incident_categories: RuleTable,
    pub facility_types: RuleTable,
    pub contraband_categories: RuleTable,
}

impl RuleSet {
    pub fn standard() -> Result<Self> {
        Ok(Self {
            incident_categories: RuleTable::from_patterns(INCIDENT_CATEGORY_RULES, false)?,
            facility_types: RuleTable::from_patterns(FACILITY_TYPE_RULES, false)?,
            contraband_categories: RuleTable::from_patterns(CONTRABAND_CATEGORY_RULES, true)?,
        })
    }
}
