use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::types::IncidentRecord;

/// Ids of the records that occurred in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    /// First day of the month
    pub month: NaiveDate,
    /// Ordered by occurrence time ascending
    pub incidents: Vec<String>,
}

/// The published artifact: every record by id, plus the month index
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub data: BTreeMap<String, IncidentRecord>,
    pub months: Vec<MonthBucket>,
    /// Ids written more than once while merging; the last write was kept
    #[serde(skip)]
    pub collisions: Vec<String>,
}

pub fn first_of_month(at: NaiveDateTime) -> NaiveDate {
    // Day 1 exists in every month
    at.date().with_day(1).unwrap_or_else(|| at.date())
}

impl Dataset {
    /// Merge incidents then events into one id-keyed map and index it by month.
    ///
    /// A repeated id overwrites the earlier record. Each overwrite is logged
    /// and listed in `collisions`.
    pub fn build(incidents: Vec<IncidentRecord>, events: Vec<IncidentRecord>) -> Self {
        let mut data: BTreeMap<String, IncidentRecord> = BTreeMap::new();
        let mut collisions = Vec::new();
        for record in incidents.into_iter().chain(events) {
            let id = record.id.clone();
            if let Some(previous) = data.insert(id.clone(), record) {
                warn!(
                    id = %id,
                    replaced = ?previous.event_type,
                    "Duplicate id, keeping the later record"
                );
                collisions.push(id);
            }
        }

        let months = group_by_month(&data);
        info!(
            "Built dataset with {} records across {} months ({} id collisions)",
            data.len(),
            months.len(),
            collisions.len()
        );
        Self {
            data,
            months,
            collisions,
        }
    }
}

fn group_by_month(data: &BTreeMap<String, IncidentRecord>) -> Vec<MonthBucket> {
    let mut grouped: BTreeMap<NaiveDate, Vec<&IncidentRecord>> = BTreeMap::new();
    for record in data.values() {
        grouped
            .entry(first_of_month(record.occurred_on))
            .or_default()
            .push(record);
    }

    grouped
        .into_iter()
        .map(|(month, mut records)| {
            records.sort_by(|a, b| a.occurred_on.cmp(&b.occurred_on).then_with(|| a.id.cmp(&b.id)));
            MonthBucket {
                month,
                incidents: records.into_iter().map(|r| r.id.clone()).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::dates::at_midnight;
    use crate::types::EventType;
    use std::collections::HashSet;

    fn record(id: &str, event_type: EventType, occurred_on: NaiveDateTime) -> IncidentRecord {
        IncidentRecord {
            id: id.to_string(),
            event_type,
            incident_type: None,
            location: None,
            location_details: None,
            summary: None,
            level: None,
            occurred_on,
            classification: None,
            enrichment: None,
            detailed_report: None,
            extra: BTreeMap::new(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        at_midnight(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn months_are_sorted_by_time_within_and_across() {
        let incidents = vec![
            record("b", EventType::Incident, day(2009, 1, 20)),
            record("z", EventType::Incident, day(2008, 12, 31)),
            record("c", EventType::Incident, day(2009, 1, 12)),
            record("a", EventType::Incident, day(2009, 1, 5)),
        ];
        let dataset = Dataset::build(incidents, Vec::new());

        assert_eq!(dataset.months.len(), 2);
        assert_eq!(dataset.months[0].month, NaiveDate::from_ymd_opt(2008, 12, 1).unwrap());
        let january = &dataset.months[1];
        assert_eq!(january.month, NaiveDate::from_ymd_opt(2009, 1, 1).unwrap());
        assert_eq!(january.incidents, vec!["a", "c", "b"]);
    }

    #[test]
    fn time_of_day_orders_records_on_the_same_day() {
        let morning = NaiveDate::from_ymd_opt(2009, 1, 5).unwrap().and_hms_opt(9, 0, 0).unwrap();
        let evening = NaiveDate::from_ymd_opt(2009, 1, 5).unwrap().and_hms_opt(21, 0, 0).unwrap();
        let dataset = Dataset::build(
            vec![record("late", EventType::Incident, evening)],
            vec![record("early", EventType::Event, morning)],
        );
        assert_eq!(dataset.months[0].incidents, vec!["early", "late"]);
    }

    #[test]
    fn later_duplicate_ids_overwrite_and_are_reported() {
        let dataset = Dataset::build(
            vec![record("x", EventType::Incident, day(2009, 1, 5))],
            vec![record("x", EventType::Event, day(2009, 2, 5))],
        );

        assert_eq!(dataset.data.len(), 1);
        assert_eq!(dataset.data["x"].event_type, EventType::Event);
        assert_eq!(dataset.collisions, vec!["x".to_string()]);
        assert_eq!(dataset.months.len(), 1);
        assert_eq!(dataset.months[0].month, NaiveDate::from_ymd_opt(2009, 2, 1).unwrap());
    }

    #[test]
    fn every_id_lands_in_exactly_one_bucket() {
        let incidents: Vec<IncidentRecord> = (1..=40)
            .map(|n| record(&format!("1-{n:05}"), EventType::Incident, day(2010, (n % 12) + 1, n % 28 + 1)))
            .collect();
        let dataset = Dataset::build(incidents, Vec::new());

        let mut seen = HashSet::new();
        for bucket in &dataset.months {
            for id in &bucket.incidents {
                assert!(seen.insert(id.clone()), "{id} appears twice");
                assert_eq!(first_of_month(dataset.data[id].occurred_on), bucket.month);
            }
        }
        assert_eq!(seen.len(), dataset.data.len());
    }
}
