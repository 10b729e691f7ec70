//! Source adapters: fetch one external source and normalize its entries into [`RawItem`]s.
//!
//! Adapters are stateless per invocation and never retry; retry and timeout policy belongs to
//! the orchestrator, which bounds `fetch` and each `enrich` call separately.
//! One adapter is registered per [`SourceType`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AdapterError;
use crate::sources::{SourceConfig, SourceType};

pub mod extractor;
mod fetch;
pub mod rss;

pub use self::rss::RssAdapter;

/// A normalized entry, not yet fingerprinted.
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    pub guid: Option<String>,
    pub title: String,
    pub url: String,
    pub summary: Option<String>,
    pub content: String,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

impl RawItem {
    // link, else guid: what the fingerprint treats as the item's address
    pub fn identity_link(&self) -> &str {
        if !self.url.trim().is_empty() {
            return &self.url;
        }
        self.guid.as_deref().unwrap_or("")
    }
}

/// An entry the adapter could read but not normalize.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub reason: String,
}

/// Single-use result of one fetch.
#[derive(Debug, Default)]
pub struct FetchedBatch {
    entries: Vec<Result<RawItem, Rejected>>,
}

impl FetchedBatch {
    pub fn new(entries: Vec<Result<RawItem, Rejected>>) -> Self { Self { entries } }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl IntoIterator for FetchedBatch {
    type Item = Result<RawItem, Rejected>;
    type IntoIter = std::vec::IntoIter<Result<RawItem, Rejected>>;
    fn into_iter(self) -> Self::IntoIter { self.entries.into_iter() }
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn kind(&self) -> SourceType;

    async fn fetch(&self, source: &SourceConfig) -> Result<FetchedBatch, AdapterError>;

    /// Best-effort body improvement for an entry about to be stored. Never fails the run.
    async fn enrich(&self, _item: &mut RawItem) {}
}

#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<SourceType, Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.adapters.insert(adapter.kind(), adapter);
        self
    }

    pub fn get(&self, kind: SourceType) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.get(&kind).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(url: &str, guid: Option<&str>) -> RawItem {
        RawItem {
            guid: guid.map(str::to_string),
            title: "t".into(),
            url: url.into(),
            summary: None,
            content: String::new(),
            author: None,
            published_at: None,
            tags: vec![],
        }
    }

    #[test]
    fn identity_link_prefers_url_then_guid() {
        assert_eq!(raw("https://a.example/1", Some("g")).identity_link(), "https://a.example/1");
        assert_eq!(raw("  ", Some("tag:a.example,2024:1")).identity_link(), "tag:a.example,2024:1");
        assert_eq!(raw("", None).identity_link(), "");
    }

    struct Nop;

    #[async_trait]
    impl SourceAdapter for Nop {
        fn kind(&self) -> SourceType { SourceType::Rss }
        async fn fetch(&self, _source: &SourceConfig) -> Result<FetchedBatch, AdapterError> { Ok(FetchedBatch::default()) }
    }

    #[test]
    fn registry_dispatches_by_type() {
        let reg = AdapterRegistry::new();
        assert!(reg.get(SourceType::Rss).is_none());
        let reg = reg.with(Arc::new(Nop));
        assert_eq!(reg.get(SourceType::Rss).map(|a| a.kind()), Some(SourceType::Rss));
    }
}
