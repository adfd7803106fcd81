//! English field parser.
//!
//! English blocks keep usable line structure after extraction, so parsing is
//! line-oriented: the first line carrying the ID shape (or the phrase
//! `Story ID`) supplies the join key, marker lines are classified against
//! the recognized tag prefixes, and everything else accumulates into the
//! body. Short purely-numeric lines are page numbers and are dropped.

use regex::Regex;
use std::sync::OnceLock;

use crate::dates;
use crate::markers::{self, SpanClass};
use crate::models::{ParsedFields, RawBlock};

static RE_DAY: OnceLock<Regex> = OnceLock::new();
static RE_PAGE_NUMBER: OnceLock<Regex> = OnceLock::new();

fn day_number() -> &'static Regex {
    RE_DAY.get_or_init(|| Regex::new(r"\d{1,2}").unwrap())
}

fn page_number() -> &'static Regex {
    RE_PAGE_NUMBER.get_or_init(|| Regex::new(r"^\d{1,3}$").unwrap())
}

/// Parse one English block into a fresh set of fields.
pub fn parse_block(block: &RawBlock) -> ParsedFields {
    let mut fields = ParsedFields::default();
    let mut body_lines: Vec<&str> = Vec::new();

    for line in block.text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.contains(markers::MARKER) {
            let content = trimmed.replace(markers::MARKER, "");
            match markers::classify_en_span(&content) {
                SpanClass::RecordSentinel => {}
                SpanClass::Date(value) => parse_date_into(&mut fields, &value),
                SpanClass::TitleEn(value) => {
                    if !value.is_empty() {
                        fields.title = Some(value);
                    }
                }
                SpanClass::TitleHe(value) => {
                    if !value.is_empty() {
                        fields.hebrew_title = Some(value);
                    }
                }
                SpanClass::RabbiName(value) => {
                    if !value.is_empty() {
                        fields.rabbi = Some(value);
                    }
                }
                SpanClass::GenericTag(value) => {
                    if !value.is_empty() {
                        fields.tags.push(value);
                    }
                }
            }
            continue;
        }

        if fields.external_id.is_none() {
            if let Some(id) = markers::find_external_id(trimmed) {
                fields.external_id = Some(id);
                continue;
            }
        }

        // Page numbers leak in from PDF extraction.
        if page_number().is_match(trimmed) {
            continue;
        }

        body_lines.push(trimmed);
    }

    fields.body = body_lines.join("\n");
    fields
}

/// Extract day and month from a date tag value like `14 Adar` or
/// `the 3rd of Kislev`.
fn parse_date_into(fields: &mut ParsedFields, value: &str) {
    let mut remainder = value.to_string();
    if let Some(m) = day_number().find(value) {
        if let Ok(day) = m.as_str().parse::<u32>() {
            fields.day = Some(day);
        }
        remainder = format!("{}{}", &value[..m.start()], &value[m.end()..]);
    }

    let month = dates::month_by_name(&remainder).or_else(|| fallback_month(value));
    if let Some(month) = month {
        fields.month_index = Some(month.index);
        fields.month_name = Some(month.english.to_string());
    }
}

/// Positional fallbacks when the remainder holds no known month name:
/// the word after `of`, then the second and third whitespace tokens.
fn fallback_month(value: &str) -> Option<&'static dates::Month> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    if let Some(pos) = tokens.iter().position(|t| t.eq_ignore_ascii_case("of")) {
        if let Some(token) = tokens.get(pos + 1) {
            if let Some(month) = dates::month_by_name(token) {
                return Some(month);
            }
        }
    }
    for idx in [1, 2] {
        if let Some(token) = tokens.get(idx) {
            if let Some(month) = dates::month_by_name(token) {
                return Some(month);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;

    fn en_block(text: &str) -> RawBlock {
        RawBlock {
            language: Language::English,
            text: text.to_string(),
            external_id: None,
        }
    }

    #[test]
    fn parses_marker_fields_and_body() {
        let block = en_block("Ad0100\n###Rabbi: Rabbi Akiva\n###Date: 14 Adar\nSome body text");
        let fields = parse_block(&block);
        assert_eq!(fields.external_id.as_deref(), Some("Ad0100"));
        assert_eq!(fields.rabbi.as_deref(), Some("Rabbi Akiva"));
        assert_eq!(fields.day, Some(14));
        assert_eq!(fields.month_name.as_deref(), Some("Adar"));
        assert_eq!(fields.body, "Some body text");
    }

    #[test]
    fn sentinel_line_is_ignored() {
        let block = en_block("###NEW STORY###\nAd0001\nbody");
        let fields = parse_block(&block);
        assert_eq!(fields.external_id.as_deref(), Some("Ad0001"));
        assert_eq!(fields.body, "body");
        assert!(fields.tags.is_empty());
    }

    #[test]
    fn unknown_marker_line_becomes_tag() {
        let block = en_block("Ad0001\n###Chassidut###\n###Mussar###\nbody");
        let fields = parse_block(&block);
        assert_eq!(fields.tags, vec!["Chassidut", "Mussar"]);
    }

    #[test]
    fn story_id_phrase_line_is_excluded_from_body() {
        let block = en_block("Story ID: Ad 0033\nbody line one\nbody line two");
        let fields = parse_block(&block);
        assert_eq!(fields.external_id.as_deref(), Some("Ad0033"));
        assert_eq!(fields.body, "body line one\nbody line two");
    }

    #[test]
    fn page_numbers_are_dropped_from_body() {
        let block = en_block("Ad0001\nreal text\n123\n4567");
        let fields = parse_block(&block);
        assert_eq!(fields.body, "real text\n4567");
    }

    #[test]
    fn block_without_id_yields_none() {
        let block = en_block("just some prose\nwith no identifier");
        let fields = parse_block(&block);
        assert!(fields.external_id.is_none());
        assert!(!fields.body.is_empty());
    }

    #[test]
    fn date_fallback_word_after_of() {
        let block = en_block("Ad0001\n###Date: the 3 of Kislev");
        let fields = parse_block(&block);
        assert_eq!(fields.day, Some(3));
        assert_eq!(fields.month_index, Some(9));
    }

    #[test]
    fn koteret_line_sets_hebrew_title() {
        let block = en_block("Ad0001\n###Koteret: מעשה ברבי\nbody");
        let fields = parse_block(&block);
        assert_eq!(fields.hebrew_title.as_deref(), Some("מעשה ברבי"));
        assert_eq!(fields.title, None);
    }
}
