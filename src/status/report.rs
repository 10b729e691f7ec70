use crate::sources::SourceConfig;
use crate::status::types::{HealthState, SourceHealth, StatusSummary};
use crate::store::{RunOutcome, RunRecord, RunRollup};

/// Failure streak at which a source stops being merely degraded.
pub const FAILING_AFTER: i64 = 3;

pub fn health_state(rollup: &RunRollup, latest: Option<&RunRecord>) -> HealthState {
    match latest.map(|r| r.outcome) {
        None => HealthState::New,
        Some(RunOutcome::Success) => HealthState::Ok,
        Some(RunOutcome::Partial) => HealthState::Degraded,
        Some(RunOutcome::Failure) if rollup.consecutive_failures >= FAILING_AFTER => HealthState::Failing,
        Some(RunOutcome::Failure) => HealthState::Degraded,
    }
}

pub fn source_health(id: &str, config: Option<&SourceConfig>, rollup: &RunRollup, latest: Option<&RunRecord>) -> SourceHealth {
    SourceHealth {
        source_id: id.to_string(),
        name: config.map(|c| c.name.clone()),
        configured: config.is_some(),
        enabled: config.is_some_and(|c| c.enabled),
        health: health_state(rollup, latest),
        last_outcome: latest.map(|r| r.outcome),
        last_run_at: latest.map(|r| r.finished_at),
        last_success_at: rollup.last_success_at,
        consecutive_failures: rollup.consecutive_failures,
        items_new_last_run: latest.map_or(0, |r| r.items_new),
        total_items_new: rollup.total_items_new,
        total_runs: rollup.runs,
        last_error: latest.and_then(|r| r.error_detail.clone()),
    }
}

// New sources count toward neither total
pub fn summarize(sources: Vec<SourceHealth>) -> StatusSummary {
    let healthy = sources.iter().filter(|s| s.health == HealthState::Ok).count();
    let needs_attention = sources
        .iter()
        .filter(|s| matches!(s.health, HealthState::Degraded | HealthState::Failing))
        .count();
    StatusSummary { sources, healthy, needs_attention }
}
