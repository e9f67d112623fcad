use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::app::ports::{FeedEntry, FeedSource};
use crate::config::FeedConfig;
use crate::error::{ImporterError, Result};
use crate::pipeline::processing::dates::{parse_feed_timestamp, ParsedDate};

/// Wire shape of one feed entry
#[derive(Debug, Deserialize)]
struct RawFeedEntry {
    incident_number: String,
    occurred_at: String,
    #[serde(default)]
    detailed_report: bool,
}

/// Decode a feed payload; any entry with an unreadable timestamp fails the whole feed.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>> {
    let raw: Vec<RawFeedEntry> = serde_json::from_slice(bytes)?;
    raw.into_iter()
        .map(|entry| match parse_feed_timestamp(&entry.occurred_at) {
            ParsedDate::Parsed { value, .. } => Ok(FeedEntry {
                incident_id: entry.incident_number.trim().to_string(),
                occurred_at: value,
                detailed_report: entry.detailed_report,
            }),
            ParsedDate::Unrecognized => Err(ImporterError::Feed {
                message: format!(
                    "unrecognized occurred_at {:?} for incident {}",
                    entry.occurred_at, entry.incident_number
                ),
            }),
        })
        .collect()
}

/// Fetches the feed over HTTP with a bounded timeout and retry budget
pub struct ReqwestFeedClient {
    client: reqwest::Client,
    config: FeedConfig,
}

impl ReqwestFeedClient {
    pub fn new(config: FeedConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    async fn get_once(&self) -> Result<Vec<u8>> {
        let resp = self.client.get(&self.config.url).send().await?;
        if !resp.status().is_success() {
            return Err(ImporterError::Feed {
                message: format!("{} responded with status {}", self.config.url, resp.status()),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }

    #[instrument(name = "feed_get_with_retry", skip(self), fields(url = %self.config.url))]
    async fn get_with_retry(&self) -> Result<Vec<u8>> {
        let max_attempts = self.config.retries + 1;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.get_once().await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if attempt >= max_attempts => {
                    return Err(ImporterError::Feed {
                        message: format!("giving up after {attempt} attempts: {e}"),
                    })
                }
                Err(e) => {
                    warn!("Feed request attempt {} failed: {}", attempt, e);
                }
            }
            tokio::time::sleep(Duration::from_millis(
                self.config.backoff_ms * u64::from(attempt),
            ))
            .await;
        }
    }
}

#[async_trait]
impl FeedSource for ReqwestFeedClient {
    async fn fetch_entries(&self) -> Result<Vec<FeedEntry>> {
        let bytes = self.get_with_retry().await?;
        let entries = parse_feed(&bytes)?;
        info!("Decoded {} entries from incident feed", entries.len());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedSettings;
    use chrono::NaiveDate;

    #[test]
    fn parses_feed_entries() {
        let body = br#"[
            {"incident_number": "1-2PQQH5", "occurred_at": "2013-10-08T14:30:00", "detailed_report": true},
            {"incident_number": " 1-2RX4AZ ", "occurred_at": "2013-10-09 08:00:00"}
        ]"#;
        let entries = parse_feed(body).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].incident_id, "1-2PQQH5");
        assert_eq!(
            entries[0].occurred_at,
            NaiveDate::from_ymd_opt(2013, 10, 8).unwrap().and_hms_opt(14, 30, 0).unwrap()
        );
        assert!(entries[0].detailed_report);
        assert_eq!(entries[1].incident_id, "1-2RX4AZ");
        assert!(!entries[1].detailed_report);
    }

    #[test]
    fn bad_timestamp_fails_the_feed() {
        let body = br#"[{"incident_number": "1-2PQQH5", "occurred_at": "last tuesday"}]"#;
        assert!(matches!(parse_feed(body), Err(ImporterError::Feed { .. })));
    }

    #[test]
    fn malformed_payload_fails_the_feed() {
        assert!(matches!(parse_feed(b"{\"oops\": 1}"), Err(ImporterError::Json(_))));
    }

    #[tokio::test]
    async fn unreachable_feed_is_fatal_after_retries() {
        let settings = FeedSettings {
            timeout_secs: 1,
            retries: 1,
            backoff_ms: 1,
        };
        // Port 9 on loopback refuses connections
        let config = FeedConfig::new("http://127.0.0.1:9/feed.json", &settings);
        let client = ReqwestFeedClient::new(config).unwrap();
        let err = client.fetch_entries().await.unwrap_err();
        assert!(matches!(err, ImporterError::Feed { .. }));
    }
}
