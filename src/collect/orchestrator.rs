use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::{stream, StreamExt, TryStreamExt};
use tracing::Instrument;

use crate::adapter::{AdapterRegistry, FetchedBatch, RawItem, SourceAdapter};
use crate::collect::types::CollectOptions;
use crate::error::{AdapterError, CollectError, ConfigError, StoreError};
use crate::sources::SourceConfig;
use crate::store::{fingerprint, ContentItem, PutOutcome, RunOutcome, RunRecord, Store};
use crate::telemetry::{self};
use crate::telemetry::ops::collect::Phase as CollectPhase;

/// Sources a run would touch, in configuration order, paired with their config index.
/// Disabled sources are dropped even when named explicitly.
pub fn select<'a>(sources: &'a [SourceConfig], only: Option<&str>) -> Result<Vec<(usize, &'a SourceConfig)>, ConfigError> {
    if let Some(id) = only {
        if !sources.iter().any(|s| s.id == id) {
            return Err(ConfigError::UnknownSource(id.to_string()));
        }
    }
    let log = telemetry::collect();
    Ok(sources
        .iter()
        .enumerate()
        .filter(|(_, s)| only.is_none_or(|id| s.id == id))
        .filter(|(_, s)| {
            if !s.enabled && only.is_some() {
                log.warn_kv("⏸️ source is disabled, skipping", [("source_id", s.id.clone())]);
            }
            s.enabled
        })
        .collect())
}

/// Collect every selected source, at most `concurrency` at a time, and append one RunRecord each.
///
/// Adapter failures are recorded on the source's run and never escape. A store failure aborts the
/// whole invocation and drops the in-flight sources.
pub async fn collect(
    store: &Store,
    registry: &AdapterRegistry,
    sources: &[SourceConfig],
    opts: &CollectOptions,
) -> Result<Vec<RunRecord>, CollectError> {
    let selected = select(sources, opts.only.as_deref())?;
    let log = telemetry::collect();

    let mut runs: Vec<(usize, RunRecord)> = stream::iter(selected)
        .map(|(idx, source)| {
            let span = log.span_kv(&CollectPhase::Source, [("source_id", source.id.clone())]);
            async move { collect_source(store, registry, source, opts).await.map(|run| (idx, run)) }.instrument(span)
        })
        .buffer_unordered(opts.concurrency.max(1))
        .try_collect()
        .await?;

    runs.sort_by_key(|(idx, _)| *idx);
    Ok(runs.into_iter().map(|(_, run)| run).collect())
}

#[derive(Default)]
struct Tally {
    fetched: i64,
    new: i64,
    updated: i64,
    duplicate: i64,
    stale: i64,
    rejected: i64,
    first_rejection: Option<String>,
}

async fn collect_source(
    store: &Store,
    registry: &AdapterRegistry,
    source: &SourceConfig,
    opts: &CollectOptions,
) -> Result<RunRecord, StoreError> {
    let log = telemetry::collect();
    let started_at = Utc::now();
    let clock = Instant::now();

    let mut tally = Tally::default();
    let fetched = match registry.get(source.kind) {
        Some(adapter) => fetch_bounded(adapter.as_ref(), source, opts)
            .instrument(log.span(&CollectPhase::Fetch))
            .await
            .map(|batch| (adapter, batch)),
        None => Err(AdapterError::Fetch(format!("no adapter registered for type {}", source.kind.as_str()))),
    };
    let (outcome, error_detail) = match fetched {
        Err(e) => {
            log.debug(format!("{} adapter error kind={}", source.id, e.kind()));
            (RunOutcome::Failure, Some(e.to_string()))
        }
        Ok((adapter, batch)) => {
            let cutoff = opts
                .max_age
                .and_then(|age| chrono::Duration::from_std(age).ok())
                .and_then(|age| started_at.checked_sub_signed(age));
            store_batch(store, adapter.as_ref(), source, batch, cutoff, opts, &mut tally)
                .instrument(log.span(&CollectPhase::Store))
                .await?;
            judge(&tally)
        }
    };

    let finished_at = Utc::now();
    let mut run = RunRecord {
        run_id: None,
        source_id: source.id.clone(),
        started_at,
        finished_at,
        outcome,
        items_fetched: tally.fetched,
        items_new: tally.new,
        items_updated: tally.updated,
        items_duplicate: tally.duplicate,
        items_stale: tally.stale,
        items_rejected: tally.rejected,
        duration_ms: clock.elapsed().as_millis() as i64,
        error_detail,
    };
    let run_id = store.append_run(&run).instrument(log.span(&CollectPhase::Record)).await?;
    run.run_id = Some(run_id);
    log.source_summary(&run);
    Ok(run)
}

// Bounds the feed download and parse only; enrichment gets its own budget per entry.
async fn fetch_bounded(adapter: &dyn SourceAdapter, source: &SourceConfig, opts: &CollectOptions) -> Result<FetchedBatch, AdapterError> {
    match tokio::time::timeout(opts.fetch_timeout, adapter.fetch(source)).await {
        Ok(res) => res,
        Err(_) => Err(AdapterError::Fetch(format!("timed out after {}s", opts.fetch_timeout.as_secs_f64()))),
    }
}

async fn store_batch(
    store: &Store,
    adapter: &dyn SourceAdapter,
    source: &SourceConfig,
    batch: FetchedBatch,
    cutoff: Option<DateTime<Utc>>,
    opts: &CollectOptions,
    tally: &mut Tally,
) -> Result<(), StoreError> {
    let force = opts.force;
    let log = telemetry::collect();
    tally.fetched = batch.len() as i64;
    for entry in batch {
        let mut raw = match entry {
            Ok(raw) => raw,
            Err(rejected) => {
                log.debug(format!("🚫 {} rejected entry: {}", source.id, rejected.reason));
                tally.rejected += 1;
                if tally.first_rejection.is_none() {
                    tally.first_rejection = Some(rejected.reason);
                }
                continue;
            }
        };
        if let (Some(cut), Some(published)) = (cutoff, raw.published_at) {
            if published < cut {
                tally.stale += 1;
                continue;
            }
        }

        let fp = fingerprint(&raw.title, raw.identity_link());
        // cheap read first; the conditional insert in put still settles races
        if !force && store.has(&fp).await? {
            tally.duplicate += 1;
            continue;
        }
        if tokio::time::timeout(opts.fetch_timeout, adapter.enrich(&mut raw)).await.is_err() {
            log.debug(format!("{} enrichment timed out for {}", source.id, raw.url));
        }
        let item = to_content_item(source, fp, raw);
        match store.put(&item, force).await? {
            PutOutcome::Inserted => {
                tally.new += 1;
                log.debug(format!("➕ {} {}", source.id, item.title));
            }
            PutOutcome::Replaced => tally.updated += 1,
            PutOutcome::AlreadyPresent => tally.duplicate += 1,
        }
    }
    Ok(())
}

fn judge(t: &Tally) -> (RunOutcome, Option<String>) {
    let reason = t.first_rejection.as_deref().unwrap_or("unknown");
    if t.rejected > 0 && t.rejected == t.fetched {
        (RunOutcome::Failure, Some(format!("all {} entries rejected: {}", t.rejected, reason)))
    } else if t.rejected > 0 {
        (RunOutcome::Partial, Some(format!("{} of {} entries rejected: {}", t.rejected, t.fetched, reason)))
    } else {
        (RunOutcome::Success, None)
    }
}

// A missing link stays empty; the guid only feeds the fingerprint.
fn to_content_item(source: &SourceConfig, fingerprint: String, raw: RawItem) -> ContentItem {
    ContentItem {
        fingerprint,
        source_id: source.id.clone(),
        source_name: source.name.clone(),
        category: source.category.clone(),
        title: raw.title,
        url: raw.url,
        guid: raw.guid,
        author: raw.author,
        summary: raw.summary,
        content: raw.content,
        tags: raw.tags,
        published_at: raw.published_at,
        ingested_at: Utc::now(),
    }
}
