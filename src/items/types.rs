use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::ContentItem;

/// What the web UI shows for a cited item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceDetail {
    pub title: String,
    pub source_name: String,
    pub url: String,
    pub content: String,
    pub published_at: Option<DateTime<Utc>>,
    pub author: Option<String>,
}

impl From<ContentItem> for SourceDetail {
    fn from(i: ContentItem) -> Self {
        SourceDetail {
            title: i.title,
            source_name: i.source_name,
            url: i.url,
            content: i.content,
            published_at: i.published_at,
            author: i.author,
        }
    }
}

// Window listing rows omit the body
#[derive(Debug, Serialize)]
pub struct ItemRow {
    pub fingerprint: String,
    pub source_id: String,
    pub category: String,
    pub title: String,
    pub url: String,
    pub effective_at: DateTime<Utc>,
}

impl From<&ContentItem> for ItemRow {
    fn from(i: &ContentItem) -> Self {
        ItemRow {
            fingerprint: i.fingerprint.clone(),
            source_id: i.source_id.clone(),
            category: i.category.clone(),
            title: i.title.clone(),
            url: i.url.clone(),
            effective_at: i.effective_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemWindow {
    pub since: DateTime<Utc>,
    pub total: usize,
    pub items: Vec<ItemRow>,
}
