//! Ingestion run orchestration.
//!
//! Coordinates the full flow for one document pair: extraction →
//! segmentation → per-block field parsing → bilingual merge → date
//! normalization → text repair → embedding → batched upsert. Parsing and
//! merging never fail a run; every dropped block, orphan, and failed batch
//! is counted and reported at the end. Only an unreadable input document
//! aborts the pair.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::dates;
use crate::db;
use crate::embedding;
use crate::extract::{self, DocFormat};
use crate::merge;
use crate::models::{Language, ParsedFields, RunReport, StoryRecord};
use crate::parse_en;
use crate::parse_he;
use crate::repair;
use crate::segment;
use crate::sink;

/// Knobs for the pure (no I/O) part of the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub min_hebrew_body_chars: usize,
    pub limit: Option<usize>,
    pub publish: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            min_hebrew_body_chars: 10,
            limit: None,
            publish: false,
        }
    }
}

/// Records plus the run accounting, before embedding and persistence.
#[derive(Debug)]
pub struct PipelineOutput {
    pub records: Vec<StoryRecord>,
    pub report: RunReport,
}

/// Run the synchronous pipeline stages over two extracted texts.
///
/// Segmentation through repair involves no I/O and no shared state; this is
/// the piece exercised directly by the integration tests.
pub fn run_pipeline(english_text: &str, hebrew_text: &str, opts: &PipelineOptions) -> PipelineOutput {
    let mut report = RunReport::default();

    let en_blocks = segment::segment(english_text, Language::English);
    let he_blocks = segment::segment(hebrew_text, Language::Hebrew);
    report.en_blocks = en_blocks.len();
    report.he_blocks = he_blocks.len();

    let mut english: Vec<ParsedFields> = Vec::with_capacity(en_blocks.len());
    for block in &en_blocks {
        let fields = parse_en::parse_block(block);
        if fields.external_id.is_none() {
            report.missing_id += 1;
            continue;
        }
        english.push(fields);
    }
    report.en_parsed = english.len();

    let mut hebrew: Vec<ParsedFields> = Vec::with_capacity(he_blocks.len());
    for block in &he_blocks {
        let fields = parse_he::parse_block(block);
        if fields.external_id.is_none() {
            report.missing_id += 1;
            continue;
        }
        hebrew.push(fields);
    }
    report.he_parsed = hebrew.len();

    let outcome = merge::merge(&english, &hebrew, opts.min_hebrew_body_chars);
    report.duplicate_overwrites = outcome.duplicate_overwrites;
    report.merge_orphans = outcome.orphans;

    let mut records = outcome.records;
    if let Some(limit) = opts.limit {
        records.truncate(limit);
    }

    for record in &mut records {
        record.is_published = opts.publish;
        normalize_dates(record, &mut report);
        repair_fields(record, &mut report);
    }

    PipelineOutput { records, report }
}

/// Render `date_en`/`date_he` from the carried (day, month) pair. Both
/// strings come from one rendering call, so they cannot diverge.
fn normalize_dates(record: &mut StoryRecord, report: &mut RunReport) {
    let (Some(day), Some(month_index)) = (record.day, record.month_index) else {
        return;
    };
    let Some(month) = dates::month_by_index(month_index) else {
        return;
    };
    let (date_en, date_he) = dates::render_dates(day, month);
    record.date_en = Some(date_en);
    record.date_he = Some(date_he);
    report.dates_normalized += 1;
}

/// Apply text repair to every Hebrew field that needs it.
fn repair_fields(record: &mut StoryRecord, report: &mut RunReport) {
    for field in [
        &mut record.rabbi_he,
        &mut record.title_he,
        &mut record.body_he,
    ] {
        if let Some(value) = field {
            if repair::needs_repair(value) {
                *value = repair::repair(value);
                report.fields_repaired += 1;
            }
        }
    }
}

/// Run a full ingestion over one document pair.
pub async fn run_ingest(
    config: &Config,
    english_path: &Path,
    hebrew_path: &Path,
    dry_run: bool,
    limit: Option<usize>,
    publish: bool,
) -> Result<()> {
    let english_bytes = std::fs::read(english_path)
        .with_context(|| format!("Failed to read {}", english_path.display()))?;
    let hebrew_bytes = std::fs::read(hebrew_path)
        .with_context(|| format!("Failed to read {}", hebrew_path.display()))?;

    let english_text = extract::extract_text(&english_bytes, DocFormat::from_path(english_path))
        .with_context(|| format!("Failed to extract {}", english_path.display()))?;
    let hebrew_text = extract::extract_text(&hebrew_bytes, DocFormat::from_path(hebrew_path))
        .with_context(|| format!("Failed to extract {}", hebrew_path.display()))?;

    let opts = PipelineOptions {
        min_hebrew_body_chars: config.ingest.min_hebrew_body_chars,
        limit,
        publish,
    };
    let PipelineOutput {
        mut records,
        mut report,
    } = run_pipeline(&english_text, &hebrew_text, &opts);

    if dry_run {
        println!("ingest (dry-run)");
        print_report(&report, config, true);
        return Ok(());
    }

    embed_records(config, &mut records, &mut report).await;

    let pool = db::connect(config).await?;
    let outcome = sink::upsert_stories(&pool, &records, config.ingest.persist_batch_size).await;
    report.rows_upserted = outcome.rows_upserted;
    report.failed_batches = outcome.failures.len();
    for failure in &outcome.failures {
        eprintln!(
            "Warning: upsert batch failed ({}): {}",
            failure.ids.join(", "),
            failure.error
        );
        report.failed_ids.extend(failure.ids.iter().cloned());
    }
    pool.close().await;

    println!("ingest");
    print_report(&report, config, false);
    println!("ok");
    Ok(())
}

/// Embed each record's body, preferring Hebrew. Failures leave the vector
/// unset and are counted; they never abort the run.
async fn embed_records(config: &Config, records: &mut [StoryRecord], report: &mut RunReport) {
    if !config.embedding.is_enabled() {
        return;
    }

    let provider = match embedding::create_provider(&config.embedding) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Warning: could not create embedding provider: {}", e);
            report.embeddings_failed += records.len();
            return;
        }
    };

    let mut pending: Vec<(usize, String)> = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        match embedding::embedding_input(
            record,
            config.embedding.max_chars,
            config.embedding.min_chars,
        ) {
            Some(text) => pending.push((idx, text)),
            None => report.embeddings_failed += 1,
        }
    }

    for (batch_no, batch) in pending.chunks(config.embedding.batch_size).enumerate() {
        if batch_no > 0 && config.embedding.batch_delay_ms > 0 {
            // Fixed pause between provider calls, against rate limits.
            tokio::time::sleep(std::time::Duration::from_millis(
                config.embedding.batch_delay_ms,
            ))
            .await;
        }

        let texts: Vec<String> = batch.iter().map(|(_, t)| t.clone()).collect();
        match embedding::embed_texts(provider.as_ref(), &config.embedding, &texts).await {
            Ok(vectors) => {
                for ((idx, _), vector) in batch.iter().zip(vectors.into_iter()) {
                    records[*idx].embedding = Some(vector);
                    report.embeddings_written += 1;
                }
            }
            Err(e) => {
                eprintln!("Warning: embedding batch failed: {}", e);
                report.embeddings_failed += batch.len();
            }
        }
    }
}

fn print_report(report: &RunReport, config: &Config, dry_run: bool) {
    println!("  english blocks: {}", report.en_blocks);
    println!("  hebrew blocks: {}", report.he_blocks);
    println!("  english records parsed: {}", report.en_parsed);
    println!("  hebrew records parsed: {}", report.he_parsed);
    println!("  blocks without id: {}", report.missing_id);
    println!("  duplicate overwrites: {}", report.duplicate_overwrites);
    println!("  merge orphans: {}", report.merge_orphans);
    println!("  dates normalized: {}", report.dates_normalized);
    println!("  fields repaired: {}", report.fields_repaired);
    if dry_run {
        return;
    }
    if config.embedding.is_enabled() {
        println!("  embeddings written: {}", report.embeddings_written);
        println!("  embeddings failed: {}", report.embeddings_failed);
    }
    println!("  rows upserted: {}", report.rows_upserted);
    if report.failed_batches > 0 {
        println!("  failed batches: {}", report.failed_batches);
        println!("  failed ids: {}", report.failed_ids.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENGLISH: &str = "\
###NEW STORY###\n\
Ad0100\n\
###Rabbi: Rabbi Akiva\n\
###Date: 14 Adar\n\
###Faith###\n\
Some body text\n\
###NEW STORY###\n\
Ad0101\n\
###Rabbi: Rabbi Meir\n\
###Date: 3 Kislev\n\
Another body\n";

    const HEBREW: &str = "\
#סיפור_מספר: Ad0100###רבי עקיבא######אמונה###טז אדר פעם אחת הלך רבי עקיבא לשוק \
#סיפור_מספר: Ad0101###רבי מאיר###מעשה שהיה בימי רבי מאיר";

    #[test]
    fn full_pipeline_merges_pair() {
        let output = run_pipeline(ENGLISH, HEBREW, &PipelineOptions::default());
        assert_eq!(output.records.len(), 2);

        let first = &output.records[0];
        assert_eq!(first.story_id, "Ad0100");
        assert_eq!(first.rabbi_en.as_deref(), Some("Rabbi Akiva"));
        assert_eq!(first.rabbi_he.as_deref(), Some("רבי עקיבא"));
        assert_eq!(first.date_en.as_deref(), Some("14 Adar"));
        assert_eq!(first.date_he.as_deref(), Some("י\u{05F4}ד אדר"));
        assert_eq!(first.body_en.as_deref(), Some("Some body text"));
        assert_eq!(
            first.body_he.as_deref(),
            Some("פעם אחת הלך רבי עקיבא לשוק")
        );
        assert!(first.tags.contains(&"Faith".to_string()));
        assert!(first.tags.contains(&"אמונה".to_string()));
        assert_eq!(output.report.merge_orphans, 0);
    }

    #[test]
    fn pipeline_is_deterministic() {
        let first = run_pipeline(ENGLISH, HEBREW, &PipelineOptions::default());
        let second = run_pipeline(ENGLISH, HEBREW, &PipelineOptions::default());
        assert_eq!(first.records, second.records);
    }

    #[test]
    fn limit_truncates_records() {
        let opts = PipelineOptions {
            limit: Some(1),
            ..Default::default()
        };
        let output = run_pipeline(ENGLISH, HEBREW, &opts);
        assert_eq!(output.records.len(), 1);
    }

    #[test]
    fn idless_block_is_counted_not_fatal() {
        let english = "###NEW STORY###\njust prose with no identifier\n";
        let output = run_pipeline(english, "", &PipelineOptions::default());
        assert!(output.records.is_empty());
        assert!(output.report.missing_id >= 1);
    }

    #[test]
    fn repaired_fields_are_counted() {
        let english = "###NEW STORY###\nAd0100\nbody\n";
        let hebrew = "#סיפור_מספר: Ad0100###רבי פלוני###סיפור עם ניקוד א \u{05B8}תלוש בתוכו";
        let output = run_pipeline(english, hebrew, &PipelineOptions::default());
        assert_eq!(output.report.fields_repaired, 1);
        let body = output.records[0].body_he.as_deref().unwrap();
        assert!(!body.contains(" \u{05B8}"));
    }
}
