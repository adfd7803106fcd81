//! Batched persistence of merged records.
//!
//! Records are upserted by `story_id` in bounded batches, one transaction
//! per batch. A failing batch is reported with its story IDs and the run
//! moves on to the next batch; re-ingestion overwrites rows rather than
//! duplicating them.

use anyhow::Result;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::embedding::vec_to_blob;
use crate::models::StoryRecord;

/// One failed upsert transaction.
#[derive(Debug)]
pub struct BatchFailure {
    pub ids: Vec<String>,
    pub error: String,
}

/// Outcome of persisting one run's records.
#[derive(Debug, Default)]
pub struct UpsertOutcome {
    pub rows_upserted: usize,
    pub failures: Vec<BatchFailure>,
}

/// Upsert records in batches of `batch_size`. Partial success is expected:
/// the outcome lists every batch that failed, and the caller reports them.
pub async fn upsert_stories(
    pool: &SqlitePool,
    records: &[StoryRecord],
    batch_size: usize,
) -> UpsertOutcome {
    let mut outcome = UpsertOutcome::default();

    for batch in records.chunks(batch_size.max(1)) {
        match upsert_batch(pool, batch).await {
            Ok(()) => outcome.rows_upserted += batch.len(),
            Err(e) => outcome.failures.push(BatchFailure {
                ids: batch.iter().map(|r| r.story_id.clone()).collect(),
                error: e.to_string(),
            }),
        }
    }

    outcome
}

async fn upsert_batch(pool: &SqlitePool, batch: &[StoryRecord]) -> Result<()> {
    let mut tx = pool.begin().await?;
    let now = chrono::Utc::now().timestamp();

    for record in batch {
        let tags_json = serde_json::to_string(&record.tags)?;
        let embedding_blob = record.embedding.as_deref().map(vec_to_blob);

        sqlx::query(
            r#"
            INSERT INTO stories (
                story_id, rabbi_he, rabbi_en, date_he, date_en,
                title_he, title_en, body_he, body_en,
                tags, embedding, is_published, content_hash, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(story_id) DO UPDATE SET
                rabbi_he = excluded.rabbi_he,
                rabbi_en = excluded.rabbi_en,
                date_he = excluded.date_he,
                date_en = excluded.date_en,
                title_he = excluded.title_he,
                title_en = excluded.title_en,
                body_he = excluded.body_he,
                body_en = excluded.body_en,
                tags = excluded.tags,
                embedding = excluded.embedding,
                is_published = excluded.is_published,
                content_hash = excluded.content_hash,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.story_id)
        .bind(&record.rabbi_he)
        .bind(&record.rabbi_en)
        .bind(&record.date_he)
        .bind(&record.date_en)
        .bind(&record.title_he)
        .bind(&record.title_en)
        .bind(&record.body_he)
        .bind(&record.body_en)
        .bind(&tags_json)
        .bind(&embedding_blob)
        .bind(record.is_published)
        .bind(content_hash(record))
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Content hash over the textual fields, for change detection by consumers.
fn content_hash(record: &StoryRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(record.story_id.as_bytes());
    for field in [
        &record.rabbi_he,
        &record.rabbi_en,
        &record.date_he,
        &record.date_en,
        &record.title_he,
        &record.title_en,
        &record.body_he,
        &record.body_en,
    ] {
        hasher.update(field.as_deref().unwrap_or("").as_bytes());
        hasher.update([0u8]);
    }
    for tag in &record.tags {
        hasher.update(tag.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}
