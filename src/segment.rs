//! Language-specific document segmentation.
//!
//! English documents are split on the case-insensitive `###NEW STORY###`
//! sentinel. Hebrew documents are split on occurrences of the
//! `#סיפור_מספר:` ID tag instead, because in that convention the identifier
//! precedes the record sentinel rather than following it; the ID is captured
//! by the split itself.
//!
//! Every block carries its leading delimiter text, so concatenating all
//! block texts reconstructs the extracted document exactly. A document with
//! no delimiter occurrences yields a single block covering the whole text.

use crate::markers;
use crate::models::{Language, RawBlock};

/// Split extracted text into per-story blocks for the given language.
pub fn segment(text: &str, language: Language) -> Vec<RawBlock> {
    match language {
        Language::English => segment_english(text),
        Language::Hebrew => segment_hebrew(text),
    }
}

fn segment_english(text: &str) -> Vec<RawBlock> {
    let starts: Vec<usize> = markers::en_sentinel()
        .find_iter(text)
        .map(|m| m.start())
        .collect();
    if starts.is_empty() {
        return vec![block(Language::English, text, None)];
    }

    let mut blocks = Vec::with_capacity(starts.len() + 1);
    if starts[0] > 0 {
        blocks.push(block(Language::English, &text[..starts[0]], None));
    }
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        blocks.push(block(Language::English, &text[start..end], None));
    }
    blocks
}

fn segment_hebrew(text: &str) -> Vec<RawBlock> {
    let matches: Vec<(usize, String)> = markers::he_id_tag()
        .captures_iter(text)
        .map(|caps| {
            let m = caps.get(0).unwrap();
            (m.start(), markers::normalize_id(&caps[1]))
        })
        .collect();
    if matches.is_empty() {
        return vec![block(Language::Hebrew, text, None)];
    }

    let mut blocks = Vec::with_capacity(matches.len() + 1);
    if matches[0].0 > 0 {
        blocks.push(block(Language::Hebrew, &text[..matches[0].0], None));
    }
    for (i, (start, id)) in matches.iter().enumerate() {
        let end = matches.get(i + 1).map(|(s, _)| *s).unwrap_or(text.len());
        blocks.push(block(Language::Hebrew, &text[*start..end], Some(id.clone())));
    }
    blocks
}

fn block(language: Language, text: &str, external_id: Option<String>) -> RawBlock {
    RawBlock {
        language,
        text: text.to_string(),
        external_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reassemble(blocks: &[RawBlock]) -> String {
        blocks.iter().map(|b| b.text.as_str()).collect()
    }

    #[test]
    fn english_splits_on_sentinel() {
        let text = "preamble\n###NEW STORY###\nfirst\n###new story###\nsecond";
        let blocks = segment(text, Language::English);
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].text.starts_with("preamble"));
        assert!(blocks[1].text.contains("first"));
        assert!(blocks[2].text.contains("second"));
    }

    #[test]
    fn english_concatenation_reconstructs_input() {
        let text = "intro ###NEW STORY### one ###New Story### two";
        let blocks = segment(text, Language::English);
        assert_eq!(reassemble(&blocks), text);
    }

    #[test]
    fn no_sentinel_yields_single_block() {
        let text = "no delimiters anywhere";
        let blocks = segment(text, Language::English);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, text);
        assert!(blocks[0].external_id.is_none());
    }

    #[test]
    fn hebrew_splits_on_id_tag_and_captures_ids() {
        let text = "#סיפור_מספר: Ad0100###רבי עקיבא###גוף ראשון #סיפור_מספר: Ad0101###רבי מאיר###גוף שני";
        let blocks = segment(text, Language::Hebrew);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].external_id.as_deref(), Some("Ad0100"));
        assert_eq!(blocks[1].external_id.as_deref(), Some("Ad0101"));
        assert_eq!(reassemble(&blocks), text);
    }

    #[test]
    fn hebrew_preamble_has_no_id() {
        let text = "הקדמה #סיפור_מספר: Ad0001###רבי###גוף";
        let blocks = segment(text, Language::Hebrew);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].external_id.is_none());
        assert_eq!(blocks[1].external_id.as_deref(), Some("Ad0001"));
        assert_eq!(reassemble(&blocks), text);
    }
}
