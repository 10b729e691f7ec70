//! `brief collect`: fetch every enabled source, dedupe into the store, record one run per source.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;

use crate::adapter::{AdapterRegistry, RssAdapter};
use crate::error::ConfigError;
use crate::output::types::Meta;
use crate::settings::{self, Settings};
use crate::sources::SourceConfig;
use crate::store::Store;
use crate::telemetry::{self};
use crate::telemetry::ops::collect::Phase as CollectPhase;

mod orchestrator;
pub mod types;

pub use orchestrator::{collect, select};
pub use types::CollectOptions;

#[derive(Args, Debug)]
pub struct CollectCmd {
    /// Collect only this source id
    #[arg(long)] pub source: Option<String>,
    /// Re-store items that are already known
    #[arg(long, default_value_t = false)] pub force: bool,
    /// Sources fetched at once [env: BRIEF_CONCURRENCY]
    #[arg(long)] pub concurrency: Option<usize>,
    /// Per-source fetch timeout in seconds [env: BRIEF_FETCH_TIMEOUT_SECS]
    #[arg(long)] pub timeout_secs: Option<u64>,
    /// Skip entries older than this many days, 0 keeps everything [env: BRIEF_MAX_AGE_DAYS]
    #[arg(long)] pub max_age_days: Option<u64>,
    /// Replace teaser bodies with the linked article text [env: BRIEF_FETCH_ARTICLES]
    #[arg(long, default_value_t = false)] pub fetch_articles: bool,
    /// Show which sources would be collected and exit
    #[arg(long, default_value_t = false)] pub dry_run: bool,
}

impl CollectCmd {
    fn merge(&self, base: &Settings) -> Result<Settings, ConfigError> {
        let fetch_timeout = match self.timeout_secs {
            Some(0) => return Err(ConfigError::InvalidSetting { key: "--timeout-secs", value: "0".into() }),
            Some(secs) => Duration::from_secs(secs),
            None => base.fetch_timeout,
        };
        let max_age = match self.max_age_days {
            Some(days) => settings::max_age_days("--max-age-days", days)?,
            None => base.max_age,
        };
        Ok(Settings {
            concurrency: self.concurrency.unwrap_or(base.concurrency).max(1),
            fetch_timeout,
            max_age,
            fetch_articles: self.fetch_articles || base.fetch_articles,
        })
    }
}

pub async fn run(store: &Store, sources: &[SourceConfig], base: &Settings, args: CollectCmd) -> Result<()> {
    let log = telemetry::collect();
    let cfg = args.merge(base)?;
    let _g = log.root_span_kv([
        ("dry_run", args.dry_run.to_string()),
        ("force", args.force.to_string()),
        ("source", format!("{:?}", args.source)),
        ("concurrency", cfg.concurrency.to_string()),
        ("timeout_secs", cfg.fetch_timeout.as_secs().to_string()),
    ]).entered();

    let opts = CollectOptions {
        force: args.force,
        only: args.source.clone(),
        concurrency: cfg.concurrency,
        fetch_timeout: cfg.fetch_timeout,
        max_age: cfg.max_age,
    };

    if args.dry_run {
        let _s = log.span(&CollectPhase::Plan).entered();
        return plan(sources, &opts);
    }

    let adapter = RssAdapter::new(cfg.fetch_timeout, cfg.fetch_articles)?;
    let registry = AdapterRegistry::new().with(Arc::new(adapter));

    let t0 = Instant::now();
    let runs = collect(store, &registry, sources, &opts).await?;
    let totals = types::CollectTotals::from_runs(&runs);
    log.totals(totals.sources, totals.new, totals.duplicate, totals.failed);

    if telemetry::config::json_mode() {
        let meta = Meta { duration_ms: Some(t0.elapsed().as_millis()), run_ids: runs.iter().filter_map(|r| r.run_id).collect() };
        log.result_with_meta(&types::CollectResult { totals, runs }, Some(meta))?;
    }
    Ok(())
}

fn plan(sources: &[SourceConfig], opts: &CollectOptions) -> Result<()> {
    let log = telemetry::collect();
    let selected = select(sources, opts.only.as_deref())?;
    let skipped_disabled: Vec<String> = sources
        .iter()
        .filter(|s| !s.enabled && opts.only.as_deref().is_none_or(|id| s.id == id))
        .map(|s| s.id.clone())
        .collect();
    let max_age_days = opts.max_age.map(|d| d.as_secs() / 86_400);

    if telemetry::config::json_mode() {
        use types::{CollectPlan, PlannedSource};
        let plan = CollectPlan {
            sources: selected
                .iter()
                .map(|(_, s)| PlannedSource { id: s.id.clone(), name: s.name.clone(), kind: s.kind.as_str(), url: s.url.clone() })
                .collect(),
            skipped_disabled,
            force: opts.force,
            concurrency: opts.concurrency,
            fetch_timeout_secs: opts.fetch_timeout.as_secs(),
            max_age_days,
        };
        log.plan(&plan)?;
    } else {
        let mode = if opts.force { "force" } else { "dedup" };
        log.info(format!("📝 Collect plan — sources={} mode={} concurrency={} max_age_days={:?}", selected.len(), mode, opts.concurrency, max_age_days));
        for (_, s) in &selected { log.info(format!("  {} ({}) {}", s.id, s.kind.as_str(), s.url)); }
        if !skipped_disabled.is_empty() { log.info(format!("  disabled: {}", skipped_disabled.join(", "))); }
        log.info("   Drop --dry-run to execute.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::rss_source;
    use crate::store::testutil::temp_store;
    use crate::telemetry::sink::capture::capture_json;

    fn cmd() -> CollectCmd {
        CollectCmd { source: None, force: false, concurrency: None, timeout_secs: None, max_age_days: None, fetch_articles: false, dry_run: false }
    }

    #[test]
    fn flags_override_settings() {
        let base = Settings::default();
        assert_eq!(cmd().merge(&base).unwrap(), base);

        let args = CollectCmd { concurrency: Some(0), timeout_secs: Some(3), max_age_days: Some(0), fetch_articles: true, ..cmd() };
        let merged = args.merge(&base).unwrap();
        assert_eq!(merged.concurrency, 1);
        assert_eq!(merged.fetch_timeout, Duration::from_secs(3));
        assert_eq!(merged.max_age, None);
        assert!(merged.fetch_articles);
    }

    #[test]
    fn zero_timeout_and_huge_max_age_flags_are_rejected() {
        let base = Settings::default();
        let err = CollectCmd { timeout_secs: Some(0), ..cmd() }.merge(&base).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { key: "--timeout-secs", .. }));
        let err = CollectCmd { max_age_days: Some(300_000_000_000_000), ..cmd() }.merge(&base).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { key: "--max-age-days", .. }));
    }

    #[tokio::test]
    async fn dry_run_json_emits_plan_without_fetching() {
        let (store, _dir) = temp_store().await;
        let mut off = rss_source("off");
        off.enabled = false;
        let sources = vec![rss_source("hn"), off];

        let cap = capture_json();
        run(&store, &sources, &Settings::default(), CollectCmd { dry_run: true, force: true, ..cmd() }).await.unwrap();
        let got = cap.sink.taken();

        assert_eq!(got.len(), 1);
        assert_eq!((got[0].op, got[0].apply), ("collect", false));
        let plan = got[0].plan.as_ref().unwrap();
        assert_eq!(plan["sources"][0]["id"], "hn");
        assert_eq!(plan["sources"][0]["type"], "rss");
        assert_eq!(plan["skipped_disabled"][0], "off");
        assert_eq!(plan["force"], true);
        assert_eq!(plan["max_age_days"], 7);
        assert!(store.recent_runs("hn", 10).await.unwrap().is_empty());
    }
}
