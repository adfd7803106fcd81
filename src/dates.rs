//! Date normalization: Hebrew-calendar month tables and gematria day
//! rendering.
//!
//! A story's date arrives as a day number plus a month name on the English
//! side. Both display forms are rendered from that single pair —
//! `"{day} {Month}"` in English and `"{gematria day} {month}"` in Hebrew —
//! so the two can never disagree on the day of month.

/// Hebrew geresh (U+05F3) and gershayim (U+05F4).
pub const GERESH: char = '\u{05F3}';
pub const GERSHAYIM: char = '\u{05F4}';

/// One Hebrew-calendar month. Indices run Nisan-first; Adar I and Adar II
/// are distinct entries 12 and 13, and bare "Adar" resolves to 12.
#[derive(Debug)]
pub struct Month {
    pub index: u32,
    pub english: &'static str,
    pub hebrew: &'static str,
}

pub const MONTHS: &[Month] = &[
    Month { index: 1, english: "Nisan", hebrew: "ניסן" },
    Month { index: 2, english: "Iyar", hebrew: "אייר" },
    Month { index: 3, english: "Sivan", hebrew: "סיון" },
    Month { index: 4, english: "Tammuz", hebrew: "תמוז" },
    Month { index: 5, english: "Av", hebrew: "אב" },
    Month { index: 6, english: "Elul", hebrew: "אלול" },
    Month { index: 7, english: "Tishrei", hebrew: "תשרי" },
    Month { index: 8, english: "Cheshvan", hebrew: "חשון" },
    Month { index: 9, english: "Kislev", hebrew: "כסלו" },
    Month { index: 10, english: "Tevet", hebrew: "טבת" },
    Month { index: 11, english: "Shevat", hebrew: "שבט" },
    Month { index: 12, english: "Adar", hebrew: "אדר" },
    Month { index: 13, english: "Adar II", hebrew: "אדר ב\u{05F3}" },
];

/// Recognized English spellings, most specific first. Substring matching
/// walks this list in order, so "adar ii" wins over "adar", and the
/// two-letter "av" is tried last.
const EN_ALIASES: &[(&str, u32)] = &[
    ("adar ii", 13),
    ("adar 2", 13),
    ("adar bet", 13),
    ("adar b", 13),
    ("adar i", 12),
    ("adar 1", 12),
    ("adar aleph", 12),
    ("adar", 12),
    ("marcheshvan", 8),
    ("cheshvan", 8),
    ("heshvan", 8),
    ("tishrei", 7),
    ("tishri", 7),
    ("nissan", 1),
    ("nisan", 1),
    ("iyyar", 2),
    ("iyar", 2),
    ("sivan", 3),
    ("tammuz", 4),
    ("tamuz", 4),
    ("menachem av", 5),
    ("elul", 6),
    ("kislev", 9),
    ("teves", 10),
    ("tevet", 10),
    ("shevat", 11),
    ("shvat", 11),
    ("av", 5),
];

/// Hebrew spellings accepted when stripping a gematria date prefix from
/// story text, longest first so `מרחשון` is not eaten as `חשון`.
pub const HE_MONTH_SPELLINGS: &[&str] = &[
    "מרחשון", "תשרי", "חשון", "כסלו", "טבת", "שבט", "אדר", "ניסן", "אייר",
    "סיוון", "סיון", "תמוז", "מנחם אב", "אלול", "אב",
];

/// Resolve a month by substring-matching a lowercased English fragment.
pub fn month_by_name(fragment: &str) -> Option<&'static Month> {
    let lower = fragment.to_lowercase();
    for (alias, index) in EN_ALIASES {
        if lower.contains(alias) {
            return month_by_index(*index);
        }
    }
    None
}

pub fn month_by_index(index: u32) -> Option<&'static Month> {
    MONTHS.iter().find(|m| m.index == index)
}

const UNIT_LETTERS: [char; 9] = ['א', 'ב', 'ג', 'ד', 'ה', 'ו', 'ז', 'ח', 'ט'];
const TEN_LETTERS: [char; 3] = ['י', 'כ', 'ל'];

/// Render a day of month (1–30) in gematria with standard punctuation:
/// geresh after a single letter, gershayim before the last of several.
///
/// 15 and 16 use the ט-combinations (`ט״ו`, `ט״ז`) rather than the literal
/// tens+units letters. Out-of-range days fall back to the decimal numeral.
pub fn gematria_day(day: u32) -> String {
    if !(1..=30).contains(&day) {
        return day.to_string();
    }
    let letters: Vec<char> = match day {
        15 => vec!['ט', 'ו'],
        16 => vec!['ט', 'ז'],
        _ => {
            let mut out = Vec::new();
            if day >= 10 {
                out.push(TEN_LETTERS[(day / 10 - 1) as usize]);
            }
            if day % 10 != 0 {
                out.push(UNIT_LETTERS[(day % 10 - 1) as usize]);
            }
            out
        }
    };
    let mut rendered = String::new();
    if letters.len() == 1 {
        rendered.push(letters[0]);
        rendered.push(GERESH);
    } else {
        for (i, c) in letters.iter().enumerate() {
            if i == letters.len() - 1 {
                rendered.push(GERSHAYIM);
            }
            rendered.push(*c);
        }
    }
    rendered
}

/// Numeric value of a Hebrew letter used in day numerals, if any.
#[allow(dead_code)]
fn letter_value(c: char) -> Option<u32> {
    if let Some(pos) = UNIT_LETTERS.iter().position(|&l| l == c) {
        return Some(pos as u32 + 1);
    }
    if let Some(pos) = TEN_LETTERS.iter().position(|&l| l == c) {
        return Some((pos as u32 + 1) * 10);
    }
    None
}

/// Recover a day number from a gematria rendering (quote marks ignored).
#[allow(dead_code)]
pub fn day_from_gematria(rendered: &str) -> Option<u32> {
    let mut total = 0u32;
    let mut any = false;
    for c in rendered.chars() {
        if matches!(c, GERESH | GERSHAYIM | '"' | '\'') {
            continue;
        }
        total += letter_value(c)?;
        any = true;
    }
    any.then_some(total)
}

/// Render the paired date strings for a record: `(date_en, date_he)`.
pub fn render_dates(day: u32, month: &Month) -> (String, String) {
    (
        format!("{} {}", day, month.english),
        format!("{} {}", gematria_day(day), month.hebrew),
    )
}
