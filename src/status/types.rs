use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::{RunOutcome, RunRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// Latest run succeeded.
    Ok,
    /// Latest run was partial, or failed fewer than [`FAILING_AFTER`](super::report::FAILING_AFTER) times in a row.
    Degraded,
    Failing,
    /// Never collected.
    New,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Ok => "ok",
            HealthState::Degraded => "degraded",
            HealthState::Failing => "failing",
            HealthState::New => "new",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceHealth {
    pub source_id: String,
    pub name: Option<String>,
    /// False for sources that only survive in the run history.
    pub configured: bool,
    pub enabled: bool,
    pub health: HealthState,
    pub last_outcome: Option<RunOutcome>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub consecutive_failures: i64,
    pub items_new_last_run: i64,
    pub total_items_new: i64,
    pub total_runs: i64,
    pub last_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub sources: Vec<SourceHealth>,
    pub healthy: usize,
    pub needs_attention: usize,
}

#[derive(Debug, Serialize)]
pub struct SourceStatus {
    #[serde(flatten)]
    pub health: SourceHealth,
    pub url: Option<String>,
    /// Newest first.
    pub history: Vec<RunRecord>,
}
