//! `brief status`: per-source health derived from the run history. Read-only.

use anyhow::Result;
use clap::Args;

use crate::error::{StatusError, StoreError};
use crate::sources::{self, SourceConfig};
use crate::store::Store;
use crate::telemetry::{self};
use crate::telemetry::ops::status::Phase as StatusPhase;

pub mod report;
pub mod types;

use types::{SourceHealth, SourceStatus, StatusSummary};

#[derive(Args, Debug)]
pub struct StatusCmd {
    /// Show one source with its recent runs
    #[arg(long)] pub source: Option<String>,
    /// Number of runs listed in --source view
    #[arg(long, default_value_t = 10)] pub history: i64,
}

async fn health_of(store: &Store, id: &str, config: Option<&SourceConfig>) -> Result<SourceHealth, StoreError> {
    let rollup = store.run_rollup(id).await?;
    let latest = store.recent_runs(id, 1).await?;
    Ok(report::source_health(id, config, &rollup, latest.first()))
}

/// Every configured source in configuration order, then sources known only from history.
pub async fn status_summary(store: &Store, sources: &[SourceConfig]) -> Result<StatusSummary, StoreError> {
    let mut rows = Vec::with_capacity(sources.len());
    for s in sources {
        rows.push(health_of(store, &s.id, Some(s)).await?);
    }
    for id in store.run_source_ids().await? {
        if sources::find(sources, &id).is_none() {
            rows.push(health_of(store, &id, None).await?);
        }
    }
    Ok(report::summarize(rows))
}

pub async fn source_status(store: &Store, sources: &[SourceConfig], id: &str, history: i64) -> Result<SourceStatus, StatusError> {
    let config = sources::find(sources, id);
    let history = store.recent_runs(id, history).await?;
    if config.is_none() && history.is_empty() {
        return Err(StatusError::NotFound(id.to_string()));
    }
    let health = health_of(store, id, config).await?;
    Ok(SourceStatus { health, url: config.map(|c| c.url.clone()), history })
}

pub async fn run(store: &Store, sources: &[SourceConfig], args: StatusCmd) -> Result<()> {
    let log = telemetry::status();
    let _g = log.root_span_kv([("source", format!("{:?}", args.source)), ("history", args.history.to_string())]).entered();

    if let Some(id) = args.source.as_deref() {
        let _s = log.span(&StatusPhase::Source).entered();
        let st = source_status(store, sources, id, args.history).await?;
        print_source(&log, &st);
        if telemetry::config::json_mode() { log.result(&st)?; }
        return Ok(());
    }

    let _s = log.span(&StatusPhase::Summary).entered();
    let summary = status_summary(store, sources).await?;
    log.info("📈 Source status:");
    for h in &summary.sources {
        log.info(format!(
            "  {:<20} {:<8} last_success={}  new_last_run={}  failures={}{}",
            h.source_id,
            h.health.as_str(),
            fmt_time(h.last_success_at),
            h.items_new_last_run,
            h.consecutive_failures,
            if h.configured { "" } else { "  (not configured)" },
        ));
        if let Some(e) = &h.last_error { log.info(format!("      error: {}", e)); }
    }
    log.info(format!("  Total: {} sources, {} healthy, {} need attention", summary.sources.len(), summary.healthy, summary.needs_attention));
    if telemetry::config::json_mode() { log.result(&summary)?; }
    Ok(())
}

fn print_source(log: &crate::telemetry::ctx::LogCtx<crate::telemetry::ops::status::Status>, st: &SourceStatus) {
    let h = &st.health;
    log.info(format!("📈 Source {} ({})", h.source_id, h.name.as_deref().unwrap_or("not configured")));
    if let Some(url) = &st.url { log.info(format!("  url: {}  enabled: {}", url, h.enabled)); }
    log.info(format!("  health: {}  last run: {}  last success: {}", h.health.as_str(), fmt_time(h.last_run_at), fmt_time(h.last_success_at)));
    log.info(format!("  items new last run: {}  total new: {}  runs: {}  consecutive failures: {}", h.items_new_last_run, h.total_items_new, h.total_runs, h.consecutive_failures));
    if let Some(e) = &h.last_error { log.info(format!("  last error: {}", e)); }
    if st.history.is_empty() { log.info("  no runs yet"); return; }
    log.info("  recent runs:");
    for r in &st.history {
        log.info(format!(
            "    {}  {:<7}  fetched={} new={} dup={} ({} ms)",
            r.finished_at.format("%Y-%m-%d %H:%M:%S"),
            r.outcome.as_str(),
            r.items_fetched,
            r.items_new,
            r.items_duplicate,
            r.duration_ms
        ));
    }
}

fn fmt_time(t: Option<chrono::DateTime<chrono::Utc>>) -> String {
    t.map(|t| t.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_else(|| "never".into())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::sources::rss_source;
    use crate::status::types::HealthState;
    use crate::store::testutil::temp_store;
    use crate::store::{RunOutcome, RunRecord};
    use crate::telemetry::sink::capture::capture_json;

    fn record(id: &str, minutes_ago: i64, outcome: RunOutcome, new: i64, err: Option<&str>) -> RunRecord {
        let t = Utc::now() - Duration::minutes(minutes_ago);
        RunRecord {
            run_id: None,
            source_id: id.into(),
            started_at: t,
            finished_at: t,
            outcome,
            items_fetched: new,
            items_new: new,
            items_updated: 0,
            items_duplicate: 0,
            items_stale: 0,
            items_rejected: 0,
            duration_ms: 5,
            error_detail: err.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn three_failures_after_success_are_failing_with_latest_error() {
        let (store, _dir) = temp_store().await;
        store.append_run(&record("hn", 40, RunOutcome::Success, 7, None)).await.unwrap();
        store.append_run(&record("hn", 30, RunOutcome::Failure, 0, Some("fetch failed: HTTP 500"))).await.unwrap();
        store.append_run(&record("hn", 20, RunOutcome::Failure, 0, Some("fetch failed: HTTP 502"))).await.unwrap();
        store.append_run(&record("hn", 10, RunOutcome::Failure, 0, Some("fetch failed: timed out after 30s"))).await.unwrap();

        let summary = status_summary(&store, &[rss_source("hn")]).await.unwrap();
        let h = &summary.sources[0];
        assert_eq!(h.consecutive_failures, 3);
        assert_eq!(h.health, HealthState::Failing);
        assert_eq!(h.last_error.as_deref(), Some("fetch failed: timed out after 30s"));
        assert_eq!(h.total_items_new, 7);
        assert!(h.last_success_at.is_some());
        assert_eq!((summary.healthy, summary.needs_attention), (0, 1));
    }

    #[tokio::test]
    async fn summary_covers_new_and_history_only_sources() {
        let (store, _dir) = temp_store().await;
        store.append_run(&record("retired", 5, RunOutcome::Success, 2, None)).await.unwrap();
        let summary = status_summary(&store, &[rss_source("hn")]).await.unwrap();
        let ids: Vec<&str> = summary.sources.iter().map(|s| s.source_id.as_str()).collect();
        assert_eq!(ids, vec!["hn", "retired"]);
        assert_eq!(summary.sources[0].health, HealthState::New);
        assert!(!summary.sources[1].configured);
        assert_eq!(summary.healthy, 1);
    }

    #[tokio::test]
    async fn source_view_lists_history_newest_first_and_honors_limit() {
        let (store, _dir) = temp_store().await;
        for m in (1..=4).rev() {
            store.append_run(&record("hn", m, RunOutcome::Success, m, None)).await.unwrap();
        }
        let st = source_status(&store, &[rss_source("hn")], "hn", 3).await.unwrap();
        let news: Vec<i64> = st.history.iter().map(|r| r.items_new).collect();
        assert_eq!(news, vec![1, 2, 3]);
        assert_eq!(st.health.health, HealthState::Ok);
        assert_eq!(st.url.as_deref(), Some("https://hn.example.com/rss"));
    }

    #[tokio::test]
    async fn unknown_source_is_not_found() {
        let (store, _dir) = temp_store().await;
        let err = source_status(&store, &[rss_source("hn")], "ghost", 10).await.unwrap_err();
        assert!(matches!(err, StatusError::NotFound(id) if id == "ghost"));
        // configured but never run is fine
        let st = source_status(&store, &[rss_source("hn")], "hn", 10).await.unwrap();
        assert_eq!(st.health.health, HealthState::New);
        assert!(st.history.is_empty());
    }

    #[tokio::test]
    async fn json_mode_emits_summary_and_source_envelopes() {
        let (store, _dir) = temp_store().await;
        store.append_run(&record("hn", 5, RunOutcome::Success, 3, None)).await.unwrap();
        let sources = [rss_source("hn"), rss_source("bbc")];

        let cap = capture_json();
        run(&store, &sources, StatusCmd { source: None, history: 10 }).await.unwrap();
        run(&store, &sources, StatusCmd { source: Some("hn".into()), history: 10 }).await.unwrap();
        let got = cap.sink.taken();

        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|e| e.op == "status" && e.apply));
        let summary = got[0].result.as_ref().unwrap();
        assert_eq!(summary["healthy"], 1);
        assert_eq!(summary["sources"][0]["health"], "ok");
        assert_eq!(summary["sources"][1]["health"], "new");
        let detail = got[1].result.as_ref().unwrap();
        assert_eq!(detail["items_new_last_run"], 3);
        assert_eq!(detail["url"], "https://hn.example.com/rss");
        assert_eq!(detail["history"].as_array().map(Vec::len), Some(1));
    }
}
