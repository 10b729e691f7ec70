use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Result;
use clap::Args;
use url::Url;

use crate::error::ConfigError;
use crate::store::Store;
use crate::telemetry::{self};
use crate::telemetry::ops::sources::Phase as SourcesPhase;

pub mod types;

pub use types::{SourceConfig, SourceType};

/// brief sources
#[derive(Args, Debug)]
pub struct SourcesCmd {
    /// Only list enabled sources
    #[arg(long, default_value_t = false)]
    pub enabled_only: bool,
}

/// Load and validate the ordered source list from a YAML file.
pub fn load_sources(path: &Path) -> Result<Vec<SourceConfig>, ConfigError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: display.clone(), source })?;
    parse_sources(&text, &display)
}

pub fn parse_sources(text: &str, origin: &str) -> Result<Vec<SourceConfig>, ConfigError> {
    let file: types::SourcesFile =
        serde_yaml::from_str(text).map_err(|source| ConfigError::Yaml { path: origin.to_string(), source })?;
    validate(&file.sources)?;
    Ok(file.sources)
}

fn validate(sources: &[SourceConfig]) -> Result<(), ConfigError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for (index, s) in sources.iter().enumerate() {
        if s.id.trim().is_empty() {
            return Err(ConfigError::EmptyId { index });
        }
        if !seen.insert(s.id.as_str()) {
            return Err(ConfigError::DuplicateId(s.id.clone()));
        }
        if Url::parse(&s.url).is_err() {
            return Err(ConfigError::InvalidUrl { id: s.id.clone(), url: s.url.clone() });
        }
    }
    Ok(())
}

pub fn find<'a>(sources: &'a [SourceConfig], id: &str) -> Option<&'a SourceConfig> {
    sources.iter().find(|s| s.id == id)
}

pub async fn run(store: &Store, sources: &[SourceConfig], args: SourcesCmd) -> Result<()> {
    let log = telemetry::sources();
    let _g = log.root_span_kv([("enabled_only", args.enabled_only.to_string())]).entered();
    let _s = log.span(&SourcesPhase::List).entered();

    let counts: HashMap<String, i64> = store.item_counts().await?.into_iter().collect();
    let rows: Vec<types::SourceRow> = sources
        .iter()
        .filter(|s| !args.enabled_only || s.enabled)
        .map(|s| types::SourceRow {
            id: s.id.clone(),
            name: s.name.clone(),
            kind: s.kind.as_str(),
            category: s.category.clone(),
            url: s.url.clone(),
            enabled: s.enabled,
            items_stored: counts.get(&s.id).copied().unwrap_or(0),
        })
        .collect();

    log.info("📡 Sources:");
    for r in &rows {
        log.info(format!(
            "  {}  name={}  type={}  category={}  {}  items={}  url={}",
            r.id,
            r.name,
            r.kind,
            r.category,
            if r.enabled { "enabled" } else { "disabled" },
            r.items_stored,
            r.url
        ));
    }

    if telemetry::config::json_mode() {
        log.result(&types::SourceList { sources: rows })?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn rss_source(id: &str) -> SourceConfig {
    SourceConfig {
        id: id.to_string(),
        name: format!("{id} feed"),
        kind: SourceType::Rss,
        url: format!("https://{id}.example.com/rss"),
        category: "tech".to_string(),
        enabled: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testutil::{item, temp_store};
    use crate::telemetry::sink::capture::capture_json;

    const YAML: &str = r#"
sources:
  - id: hn
    name: Hacker News
    type: rss
    url: https://news.ycombinator.com/rss
    category: tech
  - id: bbc
    name: BBC
    type: rss
    url: https://feeds.bbci.co.uk/news/rss.xml
    category: news
    enabled: false
"#;

    #[test]
    fn parses_ordered_sources_with_enabled_default() {
        let sources = parse_sources(YAML, "inline").unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].id, "hn");
        assert!(sources[0].enabled);
        assert_eq!(sources[0].kind, SourceType::Rss);
        assert!(!sources[1].enabled);
        assert_eq!(find(&sources, "bbc").map(|s| s.name.as_str()), Some("BBC"));
    }

    #[test]
    fn unknown_type_is_config_error() {
        let yaml = "sources:\n  - {id: x, name: X, type: gopher, url: 'https://x.example', category: c}\n";
        assert!(matches!(parse_sources(yaml, "inline"), Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let yaml = "sources:\n  - {id: x, name: X, type: rss, url: 'https://x.example', category: c}\n  - {id: x, name: Y, type: rss, url: 'https://y.example', category: c}\n";
        assert!(matches!(parse_sources(yaml, "inline"), Err(ConfigError::DuplicateId(id)) if id == "x"));
    }

    #[test]
    fn invalid_url_and_empty_id_are_rejected() {
        let bad_url = "sources:\n  - {id: x, name: X, type: rss, url: 'not a url', category: c}\n";
        assert!(matches!(parse_sources(bad_url, "inline"), Err(ConfigError::InvalidUrl { .. })));
        let empty = "sources:\n  - {id: ' ', name: X, type: rss, url: 'https://x.example', category: c}\n";
        assert!(matches!(parse_sources(empty, "inline"), Err(ConfigError::EmptyId { index: 0 })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_sources(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[tokio::test]
    async fn json_listing_counts_stored_items_and_filters_disabled() {
        let (store, _dir) = temp_store().await;
        store.put(&item("hn", "One", "https://hn.example.com/1"), false).await.unwrap();
        store.put(&item("hn", "Two", "https://hn.example.com/2"), false).await.unwrap();
        let mut off = rss_source("off");
        off.enabled = false;
        let sources = [rss_source("hn"), off];

        let cap = capture_json();
        run(&store, &sources, SourcesCmd { enabled_only: false }).await.unwrap();
        run(&store, &sources, SourcesCmd { enabled_only: true }).await.unwrap();
        let got = cap.sink.taken();

        assert_eq!(got.len(), 2);
        assert_eq!(got[0].op, "sources");
        let all = got[0].result.as_ref().unwrap();
        assert_eq!(all["sources"][0]["items_stored"], 2);
        assert_eq!(all["sources"][1]["enabled"], false);
        assert_eq!(got[1].result.as_ref().unwrap()["sources"].as_array().map(Vec::len), Some(1));
    }
}
