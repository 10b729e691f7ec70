use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::store::Store;
use crate::telemetry::{self};
use crate::telemetry::ops::init::Phase as InitPhase;

const STARTER_SOURCES: &str = r#"# Sources collected by `brief collect`, in this order.
sources:
  - id: hacker-news
    name: Hacker News
    type: rss
    url: https://news.ycombinator.com/rss
    category: tech
"#;

/// brief init
#[derive(Args, Debug)]
pub struct InitCmd {
    /// Also write a starter sources file when none exists
    #[arg(long, default_value_t = false)]
    pub write_sources: bool,
}

#[derive(Serialize)]
struct InitResult { dsn: String, migrated: bool, sources_written: Option<String> }

/// Create the database (if needed), apply migrations and optionally scaffold the sources file.
pub async fn run(dsn: &str, sources_path: &Path, args: InitCmd) -> Result<()> {
    let log = telemetry::init();
    let _g = log.root_span_kv([("dsn", dsn.to_string()), ("write_sources", args.write_sources.to_string())]).entered();

    {
        let _s = log.span(&InitPhase::Migrate).entered();
        let store = Store::open(dsn).await.with_context(|| format!("opening {dsn}"))?;
        store.close().await;
        log.info(format!("🗄️ Database ready at {dsn}"));
    }

    let sources_written = if args.write_sources {
        let _s = log.span(&InitPhase::Sources).entered();
        write_starter_sources(sources_path)?.then(|| sources_path.display().to_string())
    } else {
        None
    };
    match &sources_written {
        Some(p) => log.info(format!("📝 Wrote starter sources to {p}")),
        None if args.write_sources => log.info(format!("   {} already exists, left untouched", sources_path.display())),
        None => {}
    }

    if telemetry::config::json_mode() {
        log.result(&InitResult { dsn: dsn.to_string(), migrated: true, sources_written })?;
    }
    Ok(())
}

// false when the file already exists
fn write_starter_sources(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    std::fs::write(path, STARTER_SOURCES).with_context(|| format!("writing {}", path.display()))?;
    Ok(true)
}
