//! Marker micro-format scanning.
//!
//! The source documents wrap tag names and some values in a repeated-symbol
//! delimiter (`###`). The English convention marks record boundaries with a
//! literal `###NEW STORY###` sentinel; the Hebrew convention anchors records
//! with a `#סיפור_מספר:` tag followed by the story ID, ahead of an optional
//! `###סיפור חדש###` sentinel.
//!
//! This module owns the delimiter constants, the compiled patterns, story-ID
//! normalization, and the classification of marker-wrapped spans into an
//! explicit variant per recognized tag prefix.

use regex::Regex;
use std::sync::OnceLock;

/// Repeated-symbol delimiter wrapping tag names and values.
pub const MARKER: &str = "###";
/// English record-boundary sentinel content (matched case-insensitively).
pub const EN_SENTINEL: &str = "NEW STORY";
/// Hebrew record-boundary sentinel content.
pub const HE_SENTINEL: &str = "סיפור חדש";
/// Hebrew ID tag phrase ("story number").
pub const HE_ID_TAG: &str = "#סיפור_מספר";

static RE_ID_SHAPE: OnceLock<Regex> = OnceLock::new();
static RE_STORY_ID_PHRASE: OnceLock<Regex> = OnceLock::new();
static RE_HE_ID_TAG: OnceLock<Regex> = OnceLock::new();
static RE_EN_SENTINEL: OnceLock<Regex> = OnceLock::new();
static RE_MARKER_SPAN: OnceLock<Regex> = OnceLock::new();
static RE_OPEN_MARKER: OnceLock<Regex> = OnceLock::new();

/// Story-ID shape: a one/two-letter prefix directly against the digits,
/// optionally separated by a single punctuation character (`Ad0033`,
/// `Ad-0033`). Whitespace between prefix and digits is rejected here to keep
/// ordinary prose ("in 1948") out; ID lines with internal spaces still
/// resolve through [`normalize_id`] on the `Story ID` phrase path.
fn id_shape() -> &'static Regex {
    RE_ID_SHAPE
        .get_or_init(|| Regex::new(r"\b([A-Za-z]{1,2})[-_.]?(\d{2,6})\b").unwrap())
}

/// Hebrew ID tag plus identifier, as it appears at the head of a block.
pub fn he_id_tag() -> &'static Regex {
    RE_HE_ID_TAG.get_or_init(|| {
        Regex::new(&format!(
            r"{}:?\s*([A-Za-z]{{1,2}}[-_.\s]?\d{{1,6}})",
            HE_ID_TAG
        ))
        .unwrap()
    })
}

/// English record sentinel, markers included.
pub fn en_sentinel() -> &'static Regex {
    RE_EN_SENTINEL.get_or_init(|| Regex::new(r"(?i)###\s*NEW\s+STORY\s*###").unwrap())
}

/// A closed marker-delimited span. The content class deliberately admits
/// every non-marker character, including ASCII quotes and geresh/gershayim —
/// rabbi abbreviations such as `זי"ע` appear inside spans.
pub fn marker_span() -> &'static Regex {
    RE_MARKER_SPAN.get_or_init(|| Regex::new(r"###([^#]+?)###").unwrap())
}

/// An unterminated trailing marker. Limited to the next whitespace so a
/// missing closing delimiter does not swallow the story text that follows.
pub fn open_marker() -> &'static Regex {
    RE_OPEN_MARKER.get_or_init(|| Regex::new(r"###[^#\s]*").unwrap())
}

/// Canonicalize a story ID by stripping every non-alphanumeric character.
///
/// Idempotent: `normalize_id(normalize_id(x)) == normalize_id(x)`.
pub fn normalize_id(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Find the story ID carried by a line, if any.
///
/// Matches the ID shape first; failing that, a line containing the literal
/// phrase `Story ID` yields whatever alphanumeric content follows the
/// phrase, provided it normalizes to the ID shape.
pub fn find_external_id(line: &str) -> Option<String> {
    if let Some(caps) = id_shape().captures(line) {
        return Some(normalize_id(&caps[0]));
    }
    let phrase = RE_STORY_ID_PHRASE
        .get_or_init(|| Regex::new(r"(?i)story\s+id\s*:?(.*)$").unwrap());
    if let Some(caps) = phrase.captures(line) {
        let candidate = normalize_id(&caps[1]);
        if id_shape().is_match(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Classification of a marker-wrapped span, in recognition precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanClass {
    /// Record-boundary sentinel; never a field or a tag.
    RecordSentinel,
    /// `date` tag: day + month in the remainder.
    Date(String),
    /// `title` tag: English title.
    TitleEn(String),
    /// `koteret` tag: Hebrew title carried in the English document.
    TitleHe(String),
    /// `rabbi` tag.
    RabbiName(String),
    /// Any other wrapped span; its content becomes a tag.
    GenericTag(String),
}

/// Recognized English tag prefixes, checked in order; first match wins.
const EN_PREFIXES: &[(&str, fn(String) -> SpanClass)] = &[
    ("date", SpanClass::Date),
    ("title", SpanClass::TitleEn),
    ("koteret", SpanClass::TitleHe),
    ("rabbi", SpanClass::RabbiName),
];

/// Classify the content of an English marker line (markers already removed).
pub fn classify_en_span(content: &str) -> SpanClass {
    let trimmed = content.trim();
    if trimmed.eq_ignore_ascii_case(EN_SENTINEL) {
        return SpanClass::RecordSentinel;
    }
    for (prefix, make) in EN_PREFIXES {
        if let Some(rest) = strip_prefix_ci(trimmed, prefix) {
            let value = rest.trim_start_matches(':').trim().to_string();
            return make(value);
        }
    }
    SpanClass::GenericTag(trimmed.trim_end_matches(':').trim().to_string())
}

/// Case-insensitive ASCII prefix strip that never slices mid-character.
fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let mut indices = s.char_indices();
    for expected in prefix.chars() {
        let (_, c) = indices.next()?;
        if !c.eq_ignore_ascii_case(&expected) {
            return None;
        }
    }
    match indices.next() {
        Some((i, _)) => Some(&s[i..]),
        None => Some(""),
    }
}

/// Hebrew span prefixes that mark the first span as something other than a
/// rabbi name; such a span is reassigned as the Hebrew title.
pub const HE_NON_RABBI_PREFIXES: &[&str] = &["כותרת", "ביוגרפיה", "תולדות"];

/// True when a Hebrew first-span is a title/biography span, not a rabbi name.
pub fn is_he_non_rabbi(content: &str) -> bool {
    let trimmed = content.trim();
    HE_NON_RABBI_PREFIXES
        .iter()
        .any(|p| trimmed.starts_with(p))
}

/// Strip a recognized Hebrew prefix (and a following colon) from a span that
/// was reassigned as a title.
pub fn strip_he_prefix(content: &str) -> String {
    let trimmed = content.trim();
    for p in HE_NON_RABBI_PREFIXES {
        if let Some(rest) = trimmed.strip_prefix(p) {
            return rest.trim_start_matches(':').trim().to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_id_strips_punctuation() {
        assert_eq!(normalize_id("Ad-0033"), "Ad0033");
        assert_eq!(normalize_id(" Ad 0033."), "Ad0033");
    }

    #[test]
    fn normalize_id_idempotent() {
        for raw in ["Ad-0033", "x", "", "##12ab!!", "Story ID: Bc12"] {
            let once = normalize_id(raw);
            assert_eq!(normalize_id(&once), once);
        }
    }

    #[test]
    fn find_id_shape_in_line() {
        assert_eq!(find_external_id("Ad0100"), Some("Ad0100".to_string()));
        assert_eq!(find_external_id("  Ad-0100  "), Some("Ad0100".to_string()));
        assert_eq!(find_external_id("Some body text"), None);
    }

    #[test]
    fn find_id_after_story_id_phrase() {
        assert_eq!(
            find_external_id("Story ID: Ad 0033"),
            Some("Ad0033".to_string())
        );
    }

    #[test]
    fn prose_years_are_not_ids() {
        assert_eq!(find_external_id("he moved in 1948 to Jerusalem"), None);
    }

    #[test]
    fn classify_prefixes_in_precedence_order() {
        assert_eq!(
            classify_en_span("Date: 14 Adar"),
            SpanClass::Date("14 Adar".to_string())
        );
        assert_eq!(
            classify_en_span("Rabbi: Rabbi Akiva"),
            SpanClass::RabbiName("Rabbi Akiva".to_string())
        );
        assert_eq!(
            classify_en_span("KOTERET: כותרת"),
            SpanClass::TitleHe("כותרת".to_string())
        );
        assert_eq!(
            classify_en_span("Chassidut"),
            SpanClass::GenericTag("Chassidut".to_string())
        );
    }

    #[test]
    fn sentinel_is_not_a_tag() {
        assert_eq!(classify_en_span("NEW STORY"), SpanClass::RecordSentinel);
        assert_eq!(classify_en_span("new story"), SpanClass::RecordSentinel);
    }

    #[test]
    fn span_regex_tolerates_quotes_inside() {
        let caps: Vec<&str> = marker_span()
            .captures_iter("###רבי פלוני זי\"ע###")
            .map(|c| c.get(1).unwrap().as_str())
            .collect();
        assert_eq!(caps, vec!["רבי פלוני זי\"ע"]);
    }

    #[test]
    fn hebrew_id_tag_captures_identifier() {
        let caps = he_id_tag().captures("#סיפור_מספר: Ad0100###רבי###").unwrap();
        assert_eq!(normalize_id(&caps[1]), "Ad0100");
    }
}
