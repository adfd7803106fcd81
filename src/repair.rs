//! Hebrew text repair.
//!
//! Upstream extraction leaves two recurring artifacts in Hebrew text:
//! nikkud (vowel-point) combining marks detached from their base letter by a
//! stray space or non-breaking space, and invisible bidi/zero-width
//! formatting characters picked up from the source documents. [`repair`] is
//! a pure, idempotent fixup applied to every Hebrew field before
//! persistence; [`needs_repair`] is the detection predicate on its own, for
//! dry-run auditing against already-stored rows.

use unicode_normalization::UnicodeNormalization;

/// Placeholder glyph sometimes left where a mark was detached.
const DOTTED_CIRCLE: char = '\u{25CC}';

/// Hebrew nikkud combining marks (points, shin/sin dots, qamats qatan).
fn is_nikkud(c: char) -> bool {
    matches!(c, '\u{05B0}'..='\u{05BD}' | '\u{05BF}' | '\u{05C1}' | '\u{05C2}' | '\u{05C7}')
}

/// Invisible bidi-control and zero-width formatting characters.
fn is_invisible_format(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}' | '\u{2066}'..='\u{2069}' | '\u{FEFF}'
    )
}

/// Repair a Hebrew text field. Idempotent: `repair(repair(t)) == repair(t)`.
///
/// Composed (NFC) normalization runs first; Hebrew points are
/// composition-excluded, so re-normalizing repaired output is a no-op.
/// Whitespace runs separating a base character from a following nikkud mark
/// are deleted, reattaching the mark to its host letter. The dotted-circle
/// placeholder and invisible formatting characters are dropped outright.
pub fn repair(text: &str) -> String {
    let normalized: String = text
        .nfc()
        .filter(|&c| c != DOTTED_CIRCLE && !is_invisible_format(c))
        .collect();

    let chars: Vec<char> = normalized.chars().collect();
    let mut out = String::with_capacity(normalized.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_whitespace() {
            // Look past the whitespace run; drop it when a combining mark
            // follows, which reattaches the mark to the preceding letter.
            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && is_nikkud(chars[j]) {
                i = j;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// True when [`repair`] would change the text.
pub fn needs_repair(text: &str) -> bool {
    repair(text) != text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_vowel_point_is_reattached() {
        // Base letter + NBSP + qamats must collapse to letter + qamats.
        assert_eq!(repair("א\u{00A0}\u{05B8}"), "א\u{05B8}");
        assert_eq!(repair("א \u{05B8}"), "א\u{05B8}");
    }

    #[test]
    fn whitespace_run_before_mark_is_dropped_entirely() {
        assert_eq!(repair("א \u{00A0}\u{05B8}ב"), "א\u{05B8}ב");
    }

    #[test]
    fn ordinary_spaces_survive() {
        assert_eq!(repair("שלום עולם"), "שלום עולם");
    }

    #[test]
    fn dotted_circle_is_removed() {
        assert_eq!(repair("א\u{25CC}\u{05B8}"), "א\u{05B8}");
    }

    #[test]
    fn bidi_and_zero_width_are_stripped() {
        assert_eq!(repair("\u{200F}שלום\u{200E}"), "שלום");
        assert_eq!(repair("של\u{200B}ום"), "שלום");
        assert_eq!(repair("\u{FEFF}אבג"), "אבג");
    }

    #[test]
    fn repair_is_idempotent() {
        let samples = [
            "א\u{00A0}\u{05B8} שלום",
            "\u{200F}של\u{25CC}ום\u{202E}",
            "plain ascii",
            "בְּרֵאשִׁית בָּרָא",
            "",
        ];
        for s in samples {
            let once = repair(s);
            assert_eq!(repair(&once), once);
        }
    }

    #[test]
    fn clean_text_does_not_need_repair() {
        assert!(!needs_repair("שלום עולם"));
        assert!(needs_repair("א \u{05B8}"));
    }
}
