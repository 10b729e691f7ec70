use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rss::{Channel, Item};
use tracing::debug;

use crate::adapter::{extractor, fetch, FetchedBatch, RawItem, Rejected, SourceAdapter};
use crate::error::AdapterError;
use crate::sources::{SourceConfig, SourceType};

const USER_AGENT: &str = concat!("daily-brief/", env!("CARGO_PKG_VERSION"));
const UNTITLED: &str = "Untitled";

/// RSS 2.0 adapter. Optionally replaces teaser bodies with the linked article text.
pub struct RssAdapter {
    client: Client,
    fetch_articles: bool,
}

impl RssAdapter {
    pub fn new(timeout: Duration, fetch_articles: bool) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).user_agent(USER_AGENT).build()?;
        Ok(Self { client, fetch_articles })
    }
}

#[async_trait]
impl SourceAdapter for RssAdapter {
    fn kind(&self) -> SourceType { SourceType::Rss }

    async fn fetch(&self, source: &SourceConfig) -> Result<FetchedBatch, AdapterError> {
        let body = fetch::fetch_feed(&self.client, &source.url).await?;
        parse_feed(&body)
    }

    async fn enrich(&self, item: &mut RawItem) {
        if !self.fetch_articles || item.url.is_empty() || !extractor::needs_full_article(&item.content) {
            return;
        }
        // the feed body stays when the article cannot be read
        match fetch::fetch_article(&self.client, &item.url).await {
            Ok(html) => {
                if let Some(text) = extractor::extract_article(&html) {
                    item.content = text;
                }
            }
            Err(e) => debug!(url = %item.url, error = %e, "article fetch failed"),
        }
    }
}

/// Parse an RSS document. A malformed document fails as a whole; a malformed entry is rejected alone.
pub fn parse_feed(xml: &[u8]) -> Result<FetchedBatch, AdapterError> {
    let channel = Channel::read_from(xml).map_err(|e| AdapterError::Parse(e.to_string()))?;
    Ok(FetchedBatch::new(channel.items().iter().map(normalize_item).collect()))
}

fn normalize_item(item: &Item) -> Result<RawItem, Rejected> {
    let title = non_empty(item.title());
    let url = non_empty(item.link());
    let guid = non_empty(item.guid().map(|g| g.value()));
    if title.is_none() && url.is_none() && guid.is_none() {
        return Err(Rejected { reason: "entry has no title, link or guid".into() });
    }

    let summary = non_empty(item.description());
    let content = non_empty(item.content()).or_else(|| summary.clone()).unwrap_or_default();
    let author = non_empty(item.author()).or_else(|| {
        item.dublin_core_ext().and_then(|dc| dc.creators().first().map(String::as_str)).and_then(|s| non_empty(Some(s)))
    });
    let tags = item
        .categories()
        .iter()
        .map(|c| c.name().trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    Ok(RawItem {
        guid,
        title: title.unwrap_or_else(|| UNTITLED.to_string()),
        url: url.unwrap_or_default(),
        summary,
        content,
        author,
        published_at: extract_published_at(item),
        tags,
    })
}

pub fn extract_published_at(item: &Item) -> Option<DateTime<Utc>> {
    if let Some(pub_date) = item.pub_date() {
        if let Ok(dt) = DateTime::parse_from_rfc2822(pub_date.trim()) { return Some(dt.with_timezone(&Utc)); }
    }
    // dc:date is ISO 8601
    let dc = item.dublin_core_ext()?;
    let first = dc.dates().first()?;
    DateTime::parse_from_rfc3339(first.trim()).ok().map(|dt| dt.with_timezone(&Utc))
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:dc="http://purl.org/dc/elements/1.1/">
<channel>
  <title>Example</title>
  <link>https://news.example.com</link>
  <description>example feed</description>
  <item>
    <title>  Rust 2024 ships  </title>
    <link>https://news.example.com/rust-2024</link>
    <guid>https://news.example.com/rust-2024</guid>
    <description>Short teaser</description>
    <content:encoded><![CDATA[<p>The full body</p>]]></content:encoded>
    <author>ferris@example.com</author>
    <category>rust</category>
    <category> </category>
    <pubDate>Tue, 01 Oct 2024 10:00:00 +0200</pubDate>
  </item>
  <item>
    <link>https://news.example.com/no-title</link>
    <description>Only a description</description>
    <dc:creator>Jane Doe</dc:creator>
    <dc:date>2024-10-02T08:30:00Z</dc:date>
  </item>
  <item>
    <description>Nothing to identify this entry</description>
  </item>
  <item>
    <title>Undated</title>
    <guid isPermaLink="false">tag:news.example.com,2024:42</guid>
    <pubDate>sometime last week</pubDate>
  </item>
</channel>
</rss>"#;

    fn parsed() -> Vec<Result<RawItem, Rejected>> {
        parse_feed(FEED.as_bytes()).unwrap().into_iter().collect()
    }

    #[test]
    fn normalizes_full_entry() {
        let entries = parsed();
        assert_eq!(entries.len(), 4);
        let first = entries[0].as_ref().unwrap();
        assert_eq!(first.title, "Rust 2024 ships");
        assert_eq!(first.url, "https://news.example.com/rust-2024");
        assert_eq!(first.content, "<p>The full body</p>");
        assert_eq!(first.summary.as_deref(), Some("Short teaser"));
        assert_eq!(first.author.as_deref(), Some("ferris@example.com"));
        assert_eq!(first.tags, vec!["rust".to_string()]);
        assert_eq!(first.published_at.map(|d| d.to_rfc3339()), Some("2024-10-01T08:00:00+00:00".into()));
    }

    #[test]
    fn falls_back_to_untitled_description_and_dublin_core() {
        let entries = parsed();
        let second = entries[1].as_ref().unwrap();
        assert_eq!(second.title, "Untitled");
        assert_eq!(second.content, "Only a description");
        assert_eq!(second.author.as_deref(), Some("Jane Doe"));
        assert_eq!(second.published_at.map(|d| d.to_rfc3339()), Some("2024-10-02T08:30:00+00:00".into()));
    }

    #[test]
    fn rejects_unidentifiable_entry_without_failing_the_batch() {
        let entries = parsed();
        assert!(matches!(&entries[2], Err(r) if r.reason.contains("no title")));
    }

    #[test]
    fn unparseable_date_is_absent_and_guid_is_identity() {
        let entries = parsed();
        let fourth = entries[3].as_ref().unwrap();
        assert_eq!(fourth.published_at, None);
        assert_eq!(fourth.url, "");
        assert_eq!(fourth.identity_link(), "tag:news.example.com,2024:42");
    }

    #[test]
    fn malformed_document_is_parse_error() {
        let err = parse_feed(b"<html><body>not a feed").unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn empty_channel_is_empty_batch() {
        let xml = r#"<rss version="2.0"><channel><title>t</title><link>https://e.example</link><description>d</description></channel></rss>"#;
        assert!(parse_feed(xml.as_bytes()).unwrap().is_empty());
    }
}
