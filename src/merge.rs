//! Bilingual record merge.
//!
//! English fields seed the record set, keyed by story ID; Hebrew fields are
//! merged into their counterparts. Later English blocks with a repeated ID
//! overwrite earlier ones — last write wins, as the source data has always
//! been resolved — but the overwrite count is surfaced so upstream data
//! problems stop hiding. Hebrew records with no English counterpart are
//! dropped and counted.

use std::collections::{BTreeMap, HashSet};

use crate::models::{ParsedFields, StoryRecord};

/// Result of one merge pass.
#[derive(Debug)]
pub struct MergeOutcome {
    /// Records ordered by story ID.
    pub records: Vec<StoryRecord>,
    pub duplicate_overwrites: usize,
    pub orphans: usize,
}

/// Join English and Hebrew parsed fields by story ID.
///
/// `min_hebrew_body_chars` guards against a near-empty Hebrew body
/// overwriting nothing with noise: shorter bodies leave `body_he` unset.
/// Deterministic: the same inputs always produce the same record set.
pub fn merge(
    english: &[ParsedFields],
    hebrew: &[ParsedFields],
    min_hebrew_body_chars: usize,
) -> MergeOutcome {
    let mut by_id: BTreeMap<String, StoryRecord> = BTreeMap::new();
    let mut duplicate_overwrites = 0usize;

    for fields in english {
        let Some(id) = fields.external_id.clone() else {
            continue;
        };
        if by_id.contains_key(&id) {
            duplicate_overwrites += 1;
        }
        let mut record = StoryRecord::new(id.clone());
        record.rabbi_en = fields.rabbi.clone();
        record.title_en = fields.title.clone();
        record.title_he = fields.hebrew_title.clone();
        record.day = fields.day;
        record.month_index = fields.month_index;
        record.body_en = non_empty(&fields.body);
        record.tags = fields.tags.clone();
        by_id.insert(id, record);
    }

    let mut orphans = 0usize;
    for fields in hebrew {
        let Some(id) = fields.external_id.as_deref() else {
            continue;
        };
        let Some(record) = by_id.get_mut(id) else {
            orphans += 1;
            continue;
        };
        if fields.body.chars().count() >= min_hebrew_body_chars {
            record.body_he = Some(fields.body.clone());
        }
        if fields.rabbi.is_some() {
            record.rabbi_he = fields.rabbi.clone();
        }
        if fields.hebrew_title.is_some() {
            record.title_he = fields.hebrew_title.clone();
        }
        record.tags.extend(fields.tags.iter().cloned());
    }

    let mut records: Vec<StoryRecord> = by_id.into_values().collect();
    for record in &mut records {
        dedup_tags(&mut record.tags);
    }

    MergeOutcome {
        records,
        duplicate_overwrites,
        orphans,
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Drop duplicate tags, keeping the first occurrence.
fn dedup_tags(tags: &mut Vec<String>) {
    let mut seen = HashSet::new();
    tags.retain(|t| seen.insert(t.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en(id: &str, rabbi: &str, body: &str, tags: &[&str]) -> ParsedFields {
        ParsedFields {
            external_id: Some(id.to_string()),
            rabbi: Some(rabbi.to_string()),
            body: body.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    fn he(id: &str, rabbi: &str, body: &str, tags: &[&str]) -> ParsedFields {
        ParsedFields {
            external_id: Some(id.to_string()),
            rabbi: Some(rabbi.to_string()),
            body: body.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn merges_matching_ids() {
        let outcome = merge(
            &[en("Ad0001", "Rabbi Akiva", "english body text", &["faith"])],
            &[he("Ad0001", "רבי עקיבא", "גוף עברי ארוך מספיק", &["אמונה"])],
            10,
        );
        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.rabbi_en.as_deref(), Some("Rabbi Akiva"));
        assert_eq!(record.rabbi_he.as_deref(), Some("רבי עקיבא"));
        assert_eq!(record.body_he.as_deref(), Some("גוף עברי ארוך מספיק"));
        assert_eq!(record.tags, vec!["faith", "אמונה"]);
        assert_eq!(outcome.orphans, 0);
    }

    #[test]
    fn hebrew_orphans_are_dropped_and_counted() {
        let outcome = merge(
            &[en("Ad0001", "A", "body", &[])],
            &[he("Zz9999", "ב", "גוף עברי ארוך מספיק", &[])],
            10,
        );
        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.records[0].body_he.is_none());
        assert_eq!(outcome.orphans, 1);
    }

    #[test]
    fn duplicate_english_ids_last_write_wins_and_counted() {
        let outcome = merge(
            &[
                en("Ad0001", "First", "first body", &[]),
                en("Ad0001", "Second", "second body", &[]),
            ],
            &[],
            10,
        );
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].rabbi_en.as_deref(), Some("Second"));
        assert_eq!(outcome.duplicate_overwrites, 1);
    }

    #[test]
    fn short_hebrew_body_does_not_overwrite() {
        let outcome = merge(
            &[en("Ad0001", "A", "body", &[])],
            &[he("Ad0001", "ב", "קצר", &[])],
            10,
        );
        assert!(outcome.records[0].body_he.is_none());
        assert_eq!(outcome.records[0].rabbi_he.as_deref(), Some("ב"));
    }

    #[test]
    fn empty_english_body_becomes_none() {
        let outcome = merge(&[en("Ad0001", "A", "   ", &[])], &[], 10);
        assert!(outcome.records[0].body_en.is_none());
    }

    #[test]
    fn tags_are_deduplicated() {
        let outcome = merge(
            &[en("Ad0001", "A", "body", &["faith", "faith", "torah"])],
            &[he("Ad0001", "ב", "גוף עברי ארוך מספיק", &["torah", "אמונה"])],
            10,
        );
        assert_eq!(outcome.records[0].tags, vec!["faith", "torah", "אמונה"]);
    }

    #[test]
    fn merge_is_deterministic() {
        let english = vec![
            en("Ad0002", "B", "body two", &["x"]),
            en("Ad0001", "A", "body one", &["y"]),
        ];
        let hebrew = vec![he("Ad0001", "א", "גוף עברי ארוך מספיק", &["z"])];
        let first = merge(&english, &hebrew, 10);
        let second = merge(&english, &hebrew, 10);
        assert_eq!(first.records, second.records);
    }

    #[test]
    fn records_without_ids_are_skipped() {
        let fields = ParsedFields {
            body: "no id here".to_string(),
            ..Default::default()
        };
        let outcome = merge(&[fields.clone()], &[fields], 10);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.orphans, 0);
    }
}
