use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single ingested piece of content. At most one exists per fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub fingerprint: String,
    pub source_id: String,
    pub source_name: String,
    pub category: String,
    pub title: String,
    pub url: String,
    pub guid: Option<String>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub content: String,
    pub tags: Vec<String>,
    /// As reported by the source; `None` when the feed gave no parseable date.
    pub published_at: Option<DateTime<Utc>>,
    pub ingested_at: DateTime<Utc>,
}

impl ContentItem {
    /// Timestamp used for windowing and ordering.
    pub fn effective_at(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.ingested_at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Inserted,
    Replaced,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Success,
    Partial,
    Failure,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Success => "success",
            RunOutcome::Partial => "partial",
            RunOutcome::Failure => "failure",
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for RunOutcome {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(RunOutcome::Success),
            "partial" => Ok(RunOutcome::Partial),
            "failure" => Ok(RunOutcome::Failure),
            other => Err(format!("unknown run outcome `{other}`")),
        }
    }
}

/// One collection attempt against one source. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Assigned by the store on append.
    pub run_id: Option<i64>,
    pub source_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    pub items_fetched: i64,
    pub items_new: i64,
    pub items_updated: i64,
    pub items_duplicate: i64,
    pub items_stale: i64,
    pub items_rejected: i64,
    pub duration_ms: i64,
    /// Present iff `outcome != Success`.
    pub error_detail: Option<String>,
}

/// Aggregates over the full run history of one source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunRollup {
    pub runs: i64,
    pub total_items_new: i64,
    pub last_success_at: Option<DateTime<Utc>>,
    pub consecutive_failures: i64,
}
