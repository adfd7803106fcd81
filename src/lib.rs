//! # Sipur
//!
//! An ingestion and normalization pipeline for a bilingual (Hebrew/English)
//! story archive.
//!
//! Sipur reads a pair of parallel source documents — an English export and a
//! Hebrew export of the same story collection, in `.docx`, `.pdf`, or plain
//! text — segments each into per-story blocks, extracts structured fields
//! from the documents' marker micro-format, joins the two languages by the
//! shared story ID, normalizes dates into paired English/gematria renderings,
//! repairs Hebrew encoding artifacts, computes embeddings, and upserts the
//! merged records into SQLite.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌───────────────┐   ┌──────────┐
//! │  Extractor   │──▶│   Segmenter   │──▶│ Field Parsers │──▶│  Merger  │
//! │ docx/pdf/txt │   │ EN + HE split │   │    EN │ HE    │   │ ID join  │
//! └──────────────┘   └───────────────┘   └───────────────┘   └────┬─────┘
//!                                                                 │
//!                      ┌──────────┐   ┌──────────┐   ┌──────────┐ │
//!                      │  SQLite  │◀──│  Embed   │◀──│  Repair  │◀┘
//!                      │  upsert  │   │ (OpenAI) │   │ + dates  │
//!                      └──────────┘   └──────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! sipur init                                  # create database
//! sipur ingest --english en.docx --hebrew he.docx
//! sipur embed pending                         # backfill embeddings
//! sipur repair                                # audit Hebrew fields (dry-run)
//! sipur repair --apply                        # rewrite fields in place
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`extract`] | Multi-format text extraction |
//! | [`segment`] | Language-specific document segmentation |
//! | [`markers`] | Marker micro-format scanning and ID normalization |
//! | [`parse_en`] | English field parser |
//! | [`parse_he`] | Hebrew field parser |
//! | [`merge`] | Bilingual record merge |
//! | [`dates`] | Date normalization and gematria |
//! | [`repair`] | Hebrew text repair |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`ingest`] | Pipeline orchestration |
//! | [`sink`] | Batched upserts |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod config;
pub mod dates;
pub mod db;
pub mod embed_cmd;
pub mod embedding;
pub mod extract;
pub mod ingest;
pub mod markers;
pub mod merge;
pub mod migrate;
pub mod models;
pub mod parse_en;
pub mod parse_he;
pub mod repair;
pub mod repair_cmd;
pub mod segment;
pub mod sink;
