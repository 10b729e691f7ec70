use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::error::StoreError;
use crate::store::types::{ContentItem, PutOutcome};
use crate::util::time::{from_millis, to_millis};

const ITEM_COLUMNS: &str = "fingerprint, source_id, source_name, category, title, url, guid, author, \
     summary, content, tags, published_at, ingested_at";

#[derive(FromRow)]
struct ItemRow {
    fingerprint: String,
    source_id: String,
    source_name: String,
    category: String,
    title: String,
    url: String,
    guid: Option<String>,
    author: Option<String>,
    summary: Option<String>,
    content: String,
    tags: String,
    published_at: Option<i64>,
    ingested_at: i64,
}

impl TryFrom<ItemRow> for ContentItem {
    type Error = StoreError;

    fn try_from(r: ItemRow) -> Result<Self, Self::Error> {
        let corrupt = |detail: String| StoreError::Corrupt { key: r.fingerprint.clone(), detail };
        let tags: Vec<String> = serde_json::from_str(&r.tags).map_err(|e| corrupt(format!("tags: {e}")))?;
        let published_at = match r.published_at {
            Some(ms) => Some(from_millis(ms).ok_or_else(|| corrupt(format!("published_at={ms}")))?),
            None => None,
        };
        let ingested_at = from_millis(r.ingested_at).ok_or_else(|| corrupt(format!("ingested_at={}", r.ingested_at)))?;
        Ok(ContentItem {
            fingerprint: r.fingerprint,
            source_id: r.source_id,
            source_name: r.source_name,
            category: r.category,
            title: r.title,
            url: r.url,
            guid: r.guid,
            author: r.author,
            summary: r.summary,
            content: r.content,
            tags,
            published_at,
            ingested_at,
        })
    }
}

pub async fn exists(pool: &SqlitePool, fingerprint: &str) -> Result<bool, StoreError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM content_item WHERE fingerprint = ?")
        .bind(fingerprint)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

// Conditional insert: the row that lands first wins, every later caller sees rows_affected == 0.
pub async fn insert_item(pool: &SqlitePool, item: &ContentItem) -> Result<bool, StoreError> {
    let tags = encode_tags(item)?;
    let sql = format!(
        "INSERT INTO content_item ({ITEM_COLUMNS}) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT (fingerprint) DO NOTHING"
    );
    let exec = sqlx::query(&sql)
        .bind(&item.fingerprint)
        .bind(&item.source_id)
        .bind(&item.source_name)
        .bind(&item.category)
        .bind(&item.title)
        .bind(&item.url)
        .bind(&item.guid)
        .bind(&item.author)
        .bind(&item.summary)
        .bind(&item.content)
        .bind(tags)
        .bind(item.published_at.map(to_millis))
        .bind(to_millis(item.ingested_at))
        .execute(pool)
        .await?;
    Ok(exec.rows_affected() == 1)
}

// Forced overwrite. source_id, source_name and category belong to the first ingestion.
pub async fn overwrite_item(pool: &SqlitePool, item: &ContentItem) -> Result<bool, StoreError> {
    let tags = encode_tags(item)?;
    let exec = sqlx::query(
        r#"
        UPDATE content_item
           SET title        = ?,
               url          = ?,
               guid         = ?,
               author       = ?,
               summary      = ?,
               content      = ?,
               tags         = ?,
               published_at = COALESCE(?, published_at),
               ingested_at  = ?
         WHERE fingerprint = ?
        "#,
    )
    .bind(&item.title)
    .bind(&item.url)
    .bind(&item.guid)
    .bind(&item.author)
    .bind(&item.summary)
    .bind(&item.content)
    .bind(tags)
    .bind(item.published_at.map(to_millis))
    .bind(to_millis(item.ingested_at))
    .bind(&item.fingerprint)
    .execute(pool)
    .await?;
    Ok(exec.rows_affected() == 1)
}

pub async fn put_item(pool: &SqlitePool, item: &ContentItem, force: bool) -> Result<PutOutcome, StoreError> {
    if insert_item(pool, item).await? {
        return Ok(PutOutcome::Inserted);
    }
    if force && overwrite_item(pool, item).await? {
        return Ok(PutOutcome::Replaced);
    }
    Ok(PutOutcome::AlreadyPresent)
}

pub async fn get_item(pool: &SqlitePool, fingerprint: &str) -> Result<Option<ContentItem>, StoreError> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM content_item WHERE fingerprint = ?");
    let row: Option<ItemRow> = sqlx::query_as(&sql).bind(fingerprint).fetch_optional(pool).await?;
    row.map(ContentItem::try_from).transpose()
}

pub async fn items_since(pool: &SqlitePool, since: DateTime<Utc>) -> Result<Vec<ContentItem>, StoreError> {
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM content_item \
         WHERE COALESCE(published_at, ingested_at) >= ? \
         ORDER BY COALESCE(published_at, ingested_at) ASC, fingerprint ASC"
    );
    let rows: Vec<ItemRow> = sqlx::query_as(&sql).bind(to_millis(since)).fetch_all(pool).await?;
    rows.into_iter().map(ContentItem::try_from).collect()
}

pub async fn counts_by_source(pool: &SqlitePool) -> Result<Vec<(String, i64)>, StoreError> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT source_id, COUNT(*) AS cnt FROM content_item GROUP BY source_id ORDER BY source_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

fn encode_tags(item: &ContentItem) -> Result<String, StoreError> {
    serde_json::to_string(&item.tags).map_err(|e| StoreError::Corrupt { key: item.fingerprint.clone(), detail: format!("tags: {e}") })
}
