use metrics::{counter, histogram};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::app::ports::{FeedEntry, FeedSource};
use crate::error::Result;
use crate::types::{EventType, IncidentRecord};

/// Outcome of reconciling processed incidents against the feed
#[derive(Debug)]
pub struct MergeResult {
    pub records: Vec<IncidentRecord>,
    pub matched: usize,
    pub unmatched: usize,
}

/// Use case for correcting incident timestamps from the authoritative feed
pub struct MergeUseCase {
    feed: Box<dyn FeedSource>,
}

impl MergeUseCase {
    pub fn new(feed: Box<dyn FeedSource>) -> Self {
        Self { feed }
    }

    /// Fetch the feed once and reconcile every incident against it by id.
    ///
    /// A fetch failure aborts the merge; there is no partial mode.
    #[instrument(skip_all, fields(incidents = incidents.len()))]
    pub async fn merge(&self, incidents: Vec<IncidentRecord>) -> Result<MergeResult> {
        let t_fetch = std::time::Instant::now();
        let entries = self.feed.fetch_entries().await?;
        histogram!("importer_feed_fetch_duration_seconds").record(t_fetch.elapsed().as_secs_f64());
        info!("Fetched {} feed entries", entries.len());

        let by_id: HashMap<&str, &FeedEntry> = entries
            .iter()
            .map(|entry| (entry.incident_id.as_str(), entry))
            .collect();

        let mut matched = 0;
        let mut records = Vec::with_capacity(incidents.len());
        for mut record in incidents {
            if record.event_type == EventType::Incident {
                if let Some(entry) = by_id.get(record.id.as_str()) {
                    apply_entry(&mut record, entry);
                    matched += 1;
                } else {
                    debug!(id = %record.id, "No feed entry, keeping export date");
                }
            }
            records.push(record);
        }

        let unmatched = records.len() - matched;
        counter!("importer_feed_matches_total").increment(matched as u64);
        counter!("importer_feed_misses_total").increment(unmatched as u64);
        info!("Feed matched {} incidents ({} unmatched)", matched, unmatched);

        Ok(MergeResult {
            records,
            matched,
            unmatched,
        })
    }
}

fn apply_entry(record: &mut IncidentRecord, entry: &FeedEntry) {
    record.occurred_on = entry.occurred_at;
    record.detailed_report = Some(entry.detailed_report);
}
