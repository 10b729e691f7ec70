use std::time::Duration;

use serde::Serialize;

use crate::store::{RunOutcome, RunRecord};

/// Knobs for one collect invocation.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Overwrite already-known items. Applies to every selected source.
    pub force: bool,
    /// Restrict the run to one source id.
    pub only: Option<String>,
    pub concurrency: usize,
    pub fetch_timeout: Duration,
    /// Entries published before `now - max_age` are skipped.
    pub max_age: Option<Duration>,
}

impl Default for CollectOptions {
    fn default() -> Self {
        CollectOptions {
            force: false,
            only: None,
            concurrency: 4,
            fetch_timeout: Duration::from_secs(30),
            max_age: None,
        }
    }
}

// Plan envelope types
#[derive(Serialize)]
pub struct PlannedSource { pub id: String, pub name: String, #[serde(rename = "type")] pub kind: &'static str, pub url: String }

#[derive(Serialize)]
pub struct CollectPlan {
    pub sources: Vec<PlannedSource>,
    pub skipped_disabled: Vec<String>,
    pub force: bool,
    pub concurrency: usize,
    pub fetch_timeout_secs: u64,
    pub max_age_days: Option<u64>,
}

// Result envelope types
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct CollectTotals {
    pub sources: usize,
    pub fetched: i64,
    pub new: i64,
    pub updated: i64,
    pub duplicate: i64,
    pub failed: usize,
}

impl CollectTotals {
    pub fn from_runs(runs: &[RunRecord]) -> Self {
        runs.iter().fold(CollectTotals::default(), |mut t, r| {
            t.sources += 1;
            t.fetched += r.items_fetched;
            t.new += r.items_new;
            t.updated += r.items_updated;
            t.duplicate += r.items_duplicate;
            if r.outcome == RunOutcome::Failure { t.failed += 1; }
            t
        })
    }
}

#[derive(Serialize)]
pub struct CollectResult { pub totals: CollectTotals, pub runs: Vec<RunRecord> }
