use sqlx::{FromRow, SqlitePool};

use crate::error::StoreError;
use crate::store::types::{RunOutcome, RunRecord, RunRollup};
use crate::util::time::{from_millis, to_millis};

#[derive(FromRow)]
struct RunRow {
    run_id: i64,
    source_id: String,
    started_at: i64,
    finished_at: i64,
    outcome: String,
    items_fetched: i64,
    items_new: i64,
    items_updated: i64,
    items_duplicate: i64,
    items_stale: i64,
    items_rejected: i64,
    duration_ms: i64,
    error_detail: Option<String>,
}

impl TryFrom<RunRow> for RunRecord {
    type Error = StoreError;

    fn try_from(r: RunRow) -> Result<Self, Self::Error> {
        let key = format!("run#{}", r.run_id);
        let corrupt = |detail: String| StoreError::Corrupt { key: key.clone(), detail };
        let outcome: RunOutcome = r.outcome.parse().map_err(corrupt)?;
        let started_at = from_millis(r.started_at).ok_or_else(|| corrupt(format!("started_at={}", r.started_at)))?;
        let finished_at = from_millis(r.finished_at).ok_or_else(|| corrupt(format!("finished_at={}", r.finished_at)))?;
        Ok(RunRecord {
            run_id: Some(r.run_id),
            source_id: r.source_id,
            started_at,
            finished_at,
            outcome,
            items_fetched: r.items_fetched,
            items_new: r.items_new,
            items_updated: r.items_updated,
            items_duplicate: r.items_duplicate,
            items_stale: r.items_stale,
            items_rejected: r.items_rejected,
            duration_ms: r.duration_ms,
            error_detail: r.error_detail,
        })
    }
}

pub async fn append_run(pool: &SqlitePool, run: &RunRecord) -> Result<i64, StoreError> {
    let exec = sqlx::query(
        r#"
        INSERT INTO run_record (source_id, started_at, finished_at, outcome,
            items_fetched, items_new, items_updated, items_duplicate, items_stale, items_rejected,
            duration_ms, error_detail)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&run.source_id)
    .bind(to_millis(run.started_at))
    .bind(to_millis(run.finished_at))
    .bind(run.outcome.as_str())
    .bind(run.items_fetched)
    .bind(run.items_new)
    .bind(run.items_updated)
    .bind(run.items_duplicate)
    .bind(run.items_stale)
    .bind(run.items_rejected)
    .bind(run.duration_ms)
    .bind(&run.error_detail)
    .execute(pool)
    .await?;
    Ok(exec.last_insert_rowid())
}

// newest first
pub async fn recent_runs(pool: &SqlitePool, source_id: &str, limit: i64) -> Result<Vec<RunRecord>, StoreError> {
    let rows: Vec<RunRow> = sqlx::query_as(
        r#"
        SELECT run_id, source_id, started_at, finished_at, outcome,
               items_fetched, items_new, items_updated, items_duplicate, items_stale, items_rejected,
               duration_ms, error_detail
        FROM run_record
        WHERE source_id = ?
        ORDER BY run_id DESC
        LIMIT ?
        "#,
    )
    .bind(source_id)
    .bind(limit.max(1))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(RunRecord::try_from).collect()
}

// Partial runs stored items, so they count as successes for last_success_at and end a failure streak.
pub async fn rollup(pool: &SqlitePool, source_id: &str) -> Result<RunRollup, StoreError> {
    let (runs, total_items_new, last_success_ms, consecutive_failures): (i64, i64, Option<i64>, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*),
               COALESCE(SUM(items_new), 0),
               MAX(CASE WHEN outcome != 'failure' THEN finished_at END),
               (SELECT COUNT(*) FROM run_record f
                 WHERE f.source_id = ? AND f.outcome = 'failure'
                   AND f.run_id > COALESCE((SELECT MAX(s.run_id) FROM run_record s
                                             WHERE s.source_id = ? AND s.outcome != 'failure'), 0))
        FROM run_record
        WHERE source_id = ?
        "#,
    )
    .bind(source_id)
    .bind(source_id)
    .bind(source_id)
    .fetch_one(pool)
    .await?;

    Ok(RunRollup {
        runs,
        total_items_new,
        last_success_at: last_success_ms.and_then(from_millis),
        consecutive_failures,
    })
}

pub async fn run_source_ids(pool: &SqlitePool) -> Result<Vec<String>, StoreError> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT source_id FROM run_record ORDER BY source_id")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}
