//! Read side of the store: the window handed to analysis and single-item lookups for the web UI.

use anyhow::{anyhow, Result};
use clap::Args;

use crate::store::Store;
use crate::telemetry::{self};
use crate::telemetry::ops::items::Phase as ItemsPhase;
use crate::util::time::parse_since;

pub mod types;

pub use types::SourceDetail;

/// brief items --since 48h
#[derive(Args, Debug)]
pub struct ItemsCmd {
    /// Window start: 48h, 2d, 2024-05-01 or RFC3339
    #[arg(long, default_value = "24h")] pub since: String,
    /// Only items from this source id
    #[arg(long)] pub source: Option<String>,
    /// Max rows printed (the JSON result is never truncated)
    #[arg(long, default_value_t = 50)] pub limit: usize,
}

/// brief item <fingerprint>
#[derive(Args, Debug)]
pub struct ItemCmd {
    pub fingerprint: String,
}

pub async fn source_detail(store: &Store, fingerprint: &str) -> Result<Option<SourceDetail>> {
    Ok(store.get_item_by_fingerprint(fingerprint).await?.map(SourceDetail::from))
}

pub async fn run_window(store: &Store, args: ItemsCmd) -> Result<()> {
    let log = telemetry::items();
    let _g = log.root_span_kv([("since", args.since.clone()), ("source", format!("{:?}", args.source))]).entered();
    let _s = log.span(&ItemsPhase::Window).entered();

    let since = parse_since(&args.since)?;
    let mut items = store.items_in_window(since).await?;
    if let Some(id) = args.source.as_deref() {
        items.retain(|i| i.source_id == id);
    }

    log.info(format!("🗞️ {} items since {}", items.len(), since.format("%Y-%m-%d %H:%M")));
    for i in items.iter().take(args.limit) {
        log.info(format!("  {}  [{}] {}  {}", i.effective_at().format("%m-%d %H:%M"), i.source_id, i.title, &i.fingerprint[..12.min(i.fingerprint.len())]));
    }
    if items.len() > args.limit { log.info(format!("  ... ({} more)", items.len() - args.limit)); }

    if telemetry::config::json_mode() {
        let rows: Vec<types::ItemRow> = items.iter().map(types::ItemRow::from).collect();
        log.result(&types::ItemWindow { since, total: rows.len(), items: rows })?;
    }
    Ok(())
}

pub async fn run_lookup(store: &Store, args: ItemCmd) -> Result<()> {
    let log = telemetry::items();
    let _g = log.root_span_kv([("fingerprint", args.fingerprint.clone())]).entered();
    let _s = log.span(&ItemsPhase::Lookup).entered();

    let detail = source_detail(store, args.fingerprint.trim())
        .await?
        .ok_or_else(|| anyhow!("no item with fingerprint {}", args.fingerprint))?;

    log.info(format!("📰 {}", detail.title));
    log.info(format!("  source: {}  author: {}", detail.source_name, detail.author.as_deref().unwrap_or("-")));
    log.info(format!("  published: {}", detail.published_at.map(|t| t.to_rfc3339()).unwrap_or_else(|| "unknown".into())));
    log.info(format!("  url: {}", detail.url));
    if telemetry::config::json_mode() { log.result(&detail)?; }
    Ok(())
}
