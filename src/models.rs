//! Core data models used throughout the pipeline.
//!
//! These types represent the blocks, parsed fields, and merged story records
//! that flow from segmentation to persistence, plus the per-run accounting
//! reported to the operator.

/// Source language of a document or block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Hebrew,
}

/// One per-story slice of an extracted document.
///
/// Blocks are contiguous and non-overlapping; each block carries its leading
/// delimiter text, so concatenating all block texts reconstructs the
/// extracted document exactly. Hebrew blocks carry the story ID captured
/// during the split itself.
#[derive(Debug, Clone)]
pub struct RawBlock {
    pub language: Language,
    pub text: String,
    /// Pre-captured story ID (Hebrew segmentation only).
    pub external_id: Option<String>,
}

/// Structured fields extracted from a single block.
///
/// A fresh value is built per block; nothing is carried over between blocks.
#[derive(Debug, Clone, Default)]
pub struct ParsedFields {
    /// Cross-language join key, e.g. `Ad0033`. Blocks without one never
    /// reach the merger.
    pub external_id: Option<String>,
    pub day: Option<u32>,
    pub month_index: Option<u32>,
    pub month_name: Option<String>,
    /// Title in the block's own language.
    pub title: Option<String>,
    /// Hebrew title, when the block carries one explicitly (the English
    /// convention tags it `koteret`; the Hebrew convention reassigns a
    /// title-prefixed first span).
    pub hebrew_title: Option<String>,
    pub rabbi: Option<String>,
    pub body: String,
    /// Insertion order preserved; duplicates allowed until the merge.
    pub tags: Vec<String>,
}

/// The bilingual merge target, keyed by `story_id`.
///
/// `day` and `month_index` are transient carriers for the date normalizer
/// and are not persisted; `date_en` and `date_he` are always rendered from
/// the same (day, month) pair, so they cannot diverge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryRecord {
    pub story_id: String,
    pub rabbi_he: Option<String>,
    pub rabbi_en: Option<String>,
    pub date_he: Option<String>,
    pub date_en: Option<String>,
    pub title_he: Option<String>,
    pub title_en: Option<String>,
    pub body_he: Option<String>,
    pub body_en: Option<String>,
    pub tags: Vec<String>,
    pub embedding: Option<Vec<f32>>,
    pub is_published: bool,
    pub day: Option<u32>,
    pub month_index: Option<u32>,
}

impl StoryRecord {
    pub fn new(story_id: String) -> Self {
        Self {
            story_id,
            ..Default::default()
        }
    }
}

/// Per-run counters surfaced to the operator after an ingestion.
///
/// Every non-fatal failure category increments a counter here; nothing is
/// swallowed without being counted.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub en_blocks: usize,
    pub he_blocks: usize,
    pub en_parsed: usize,
    pub he_parsed: usize,
    /// Blocks dropped because no story ID could be extracted.
    pub missing_id: usize,
    /// English records overwritten by a later block with the same ID.
    pub duplicate_overwrites: usize,
    /// Hebrew records with no English counterpart.
    pub merge_orphans: usize,
    pub dates_normalized: usize,
    pub fields_repaired: usize,
    pub embeddings_written: usize,
    pub embeddings_failed: usize,
    pub rows_upserted: usize,
    pub failed_batches: usize,
    /// Story IDs from batches that failed to persist.
    pub failed_ids: Vec<String>,
}
