//! Hebrew field parser.
//!
//! Extraction of the Hebrew source rarely preserves line breaks — whole
//! documents collapse into a single run — so this parser works on the block
//! as one string. Marker-delimited spans are the only stable anchor: the
//! first span is the rabbi name (unless a title/biography prefix reassigns
//! it), every span is a tag candidate, and once the spans are cut away the
//! remainder is the story body. A leading gematria date prefix (`א' אדר`,
//! `טז אדר`) duplicates the date already known from the English side and is
//! discarded.

use regex::Regex;
use std::sync::OnceLock;

use crate::dates;
use crate::markers;
use crate::models::{ParsedFields, RawBlock};

static RE_DATE_PREFIX: OnceLock<Regex> = OnceLock::new();
static RE_HE_SENTINEL: OnceLock<Regex> = OnceLock::new();

/// Leading gematria day (one or two letters, optional embedded quote mark,
/// optional third letter) followed by a Hebrew month name. The quote is
/// optional because the corpus carries both `י"א אדר` and bare `טז אדר`
/// forms. This is a heuristic: body text that happens to open with a short
/// word before a month name will be misread as a date and stripped.
fn date_prefix() -> &'static Regex {
    RE_DATE_PREFIX.get_or_init(|| {
        let months = dates::HE_MONTH_SPELLINGS.join("|");
        let pattern = format!(
            "^\\s*[\u{05D0}-\u{05EA}]{{1,2}}[\"'\u{05F3}\u{05F4}]?[\u{05D0}-\u{05EA}]?\\s+(?:{})(?:\\s+|$)",
            months
        );
        Regex::new(&pattern).unwrap()
    })
}

fn he_sentinel() -> &'static Regex {
    RE_HE_SENTINEL.get_or_init(|| {
        Regex::new(&format!(r"###\s*{}\s*###", markers::HE_SENTINEL)).unwrap()
    })
}

/// Parse one Hebrew block into a fresh set of fields.
///
/// The block's story ID was captured by the segmenter; the tag itself is
/// stripped from the head here.
pub fn parse_block(block: &RawBlock) -> ParsedFields {
    let mut fields = ParsedFields {
        external_id: block.external_id.clone(),
        ..Default::default()
    };

    let text = markers::he_id_tag().replace(&block.text, "");
    let text = he_sentinel().replace_all(&text, "");

    let spans: Vec<String> = markers::marker_span()
        .captures_iter(&text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|s| !s.is_empty() && s != markers::HE_SENTINEL)
        .collect();

    if let Some(first) = spans.first() {
        if markers::is_he_non_rabbi(first) {
            fields.hebrew_title = Some(markers::strip_he_prefix(first));
        } else {
            fields.rabbi = Some(first.clone());
        }
    }

    for span in &spans {
        if Some(span.as_str()) != fields.rabbi.as_deref() {
            fields.tags.push(span.clone());
        }
    }

    let text = markers::marker_span().replace_all(&text, "");
    let text = markers::open_marker().replace_all(&text, "");
    let text = date_prefix().replace(&text, "");

    fields.body = text.split_whitespace().collect::<Vec<_>>().join(" ");
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;

    fn he_block(text: &str, id: Option<&str>) -> RawBlock {
        RawBlock {
            language: Language::Hebrew,
            text: text.to_string(),
            external_id: id.map(|s| s.to_string()),
        }
    }

    #[test]
    fn first_span_is_rabbi_and_date_prefix_is_stripped() {
        let block = he_block(
            "#סיפור_מספר: Ad0100###רבי עקיבא###טז אדר פעם אחת הלך רבי עקיבא לשוק",
            Some("Ad0100"),
        );
        let fields = parse_block(&block);
        assert_eq!(fields.external_id.as_deref(), Some("Ad0100"));
        assert_eq!(fields.rabbi.as_deref(), Some("רבי עקיבא"));
        assert_eq!(fields.body, "פעם אחת הלך רבי עקיבא לשוק");
    }

    #[test]
    fn quoted_gematria_prefix_is_stripped() {
        let block = he_block("#סיפור_מספר: Ad0101###רבי מאיר###י\"א ניסן מעשה שהיה", Some("Ad0101"));
        let fields = parse_block(&block);
        assert_eq!(fields.body, "מעשה שהיה");
    }

    #[test]
    fn missing_date_prefix_is_not_an_error() {
        let block = he_block("#סיפור_מספר: Ad0102###רבי מאיר###מעשה בלי תאריך", Some("Ad0102"));
        let fields = parse_block(&block);
        assert_eq!(fields.body, "מעשה בלי תאריך");
    }

    #[test]
    fn title_prefix_reassigns_first_span() {
        let block = he_block(
            "#סיפור_מספר: Ad0103###כותרת: מעשה בצדיק###גוף הסיפור כאן",
            Some("Ad0103"),
        );
        let fields = parse_block(&block);
        assert!(fields.rabbi.is_none());
        assert_eq!(fields.hebrew_title.as_deref(), Some("מעשה בצדיק"));
        // The reassigned span still counts as a tag; only the rabbi name is excluded.
        assert_eq!(fields.tags, vec!["כותרת: מעשה בצדיק"]);
    }

    #[test]
    fn rabbi_name_with_embedded_quote_survives() {
        let block = he_block(
            "#סיפור_מספר: Ad0104###רבי פלוני זי\"ע######חסידות###גוף",
            Some("Ad0104"),
        );
        let fields = parse_block(&block);
        assert_eq!(fields.rabbi.as_deref(), Some("רבי פלוני זי\"ע"));
        assert_eq!(fields.tags, vec!["חסידות"]);
    }

    #[test]
    fn sentinel_span_is_not_a_tag() {
        let block = he_block(
            "#סיפור_מספר: Ad0105###סיפור חדש######רבי מאיר###גוף",
            Some("Ad0105"),
        );
        let fields = parse_block(&block);
        assert_eq!(fields.rabbi.as_deref(), Some("רבי מאיר"));
        assert!(fields.tags.is_empty());
    }

    #[test]
    fn unterminated_marker_does_not_swallow_body() {
        let block = he_block("#סיפור_מספר: Ad0106###רבי מאיר###גוף ###תג הסיפור ממשיך", Some("Ad0106"));
        let fields = parse_block(&block);
        assert!(fields.body.contains("הסיפור ממשיך"));
        assert!(!fields.body.contains("###"));
    }

    #[test]
    fn whitespace_is_collapsed() {
        let block = he_block("#סיפור_מספר: Ad0107###רבי###גוף   עם\n\nרווחים", Some("Ad0107"));
        let fields = parse_block(&block);
        assert_eq!(fields.body, "גוף עם רווחים");
    }
}
