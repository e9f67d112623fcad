use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::Result;

/// Source of authoritative occurrence times for incidents
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_entries(&self) -> Result<Vec<FeedEntry>>;
}

/// One feed entry, keyed by the incident id it describes
#[derive(Clone, Debug, PartialEq)]
pub struct FeedEntry {
    pub incident_id: String,
    pub occurred_at: NaiveDateTime,
    pub detailed_report: bool,
}
