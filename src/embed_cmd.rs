//! Embedding backfill over already-ingested stories.

use anyhow::{bail, Result};
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::embedding;
use crate::models::StoryRecord;

/// Find and embed stories that have a body but no embedding yet.
pub async fn run_embed_pending(
    config: &Config,
    limit: Option<usize>,
    batch_size_override: Option<usize>,
    dry_run: bool,
) -> Result<()> {
    if !config.embedding.is_enabled() {
        bail!("Embedding provider is disabled. Set [embedding] provider in config.");
    }

    let provider = embedding::create_provider(&config.embedding)?;
    let pool = db::connect(config).await?;
    let batch_size = batch_size_override.unwrap_or(config.embedding.batch_size);

    let pending = find_pending_stories(&pool, limit).await?;

    if dry_run {
        println!("embed pending (dry-run)");
        println!("  stories needing embeddings: {}", pending.len());
        pool.close().await;
        return Ok(());
    }

    if pending.is_empty() {
        println!("embed pending");
        println!("  all stories up to date");
        pool.close().await;
        return Ok(());
    }

    let total = pending.len();
    let mut embedded = 0u64;
    let mut failed = 0u64;

    let mut inputs: Vec<(String, String)> = Vec::new();
    for record in &pending {
        match embedding::embedding_input(
            record,
            config.embedding.max_chars,
            config.embedding.min_chars,
        ) {
            Some(text) => inputs.push((record.story_id.clone(), text)),
            None => failed += 1,
        }
    }

    for (batch_no, batch) in inputs.chunks(batch_size.max(1)).enumerate() {
        if batch_no > 0 && config.embedding.batch_delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(
                config.embedding.batch_delay_ms,
            ))
            .await;
        }

        let texts: Vec<String> = batch.iter().map(|(_, t)| t.clone()).collect();
        match embedding::embed_texts(provider.as_ref(), &config.embedding, &texts).await {
            Ok(vectors) => {
                for ((story_id, _), vector) in batch.iter().zip(vectors.iter()) {
                    let blob = embedding::vec_to_blob(vector);
                    if let Err(e) = store_embedding(&pool, story_id, &blob).await {
                        eprintln!("Warning: failed to store embedding for {}: {}", story_id, e);
                        failed += 1;
                    } else {
                        embedded += 1;
                    }
                }
            }
            Err(e) => {
                eprintln!("Warning: embedding batch failed: {}", e);
                failed += batch.len() as u64;
            }
        }
    }

    println!("embed pending");
    println!("  total pending: {}", total);
    println!("  embedded: {}", embedded);
    println!("  failed: {}", failed);

    pool.close().await;
    Ok(())
}

async fn find_pending_stories(
    pool: &SqlitePool,
    limit: Option<usize>,
) -> Result<Vec<StoryRecord>> {
    let limit_val = limit.unwrap_or(usize::MAX) as i64;

    let rows = sqlx::query(
        r#"
        SELECT story_id, body_he, body_en
        FROM stories
        WHERE embedding IS NULL
          AND (body_he IS NOT NULL OR body_en IS NOT NULL)
        ORDER BY story_id
        LIMIT ?
        "#,
    )
    .bind(limit_val)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| StoryRecord {
            story_id: row.get("story_id"),
            body_he: row.get("body_he"),
            body_en: row.get("body_en"),
            ..Default::default()
        })
        .collect())
}

async fn store_embedding(pool: &SqlitePool, story_id: &str, blob: &[u8]) -> Result<()> {
    sqlx::query("UPDATE stories SET embedding = ?, updated_at = ? WHERE story_id = ?")
        .bind(blob)
        .bind(chrono::Utc::now().timestamp())
        .bind(story_id)
        .execute(pool)
        .await?;
    Ok(())
}
