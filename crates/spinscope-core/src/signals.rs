//! Signal extraction: case-insensitive keyword search over the whole text.
//!
//! Every occurrence is recorded, including overlapping ones: after a hit at
//! `pos` the search resumes one character later, not past the keyword.
//! Offsets always point into the original (un-lowered) text.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::lexicon::Lexicon;
use crate::types::{Match, Span};

/// Per-category matches for one text. Every lexicon category has an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalBundle {
    categories: BTreeMap<String, Vec<Match>>,
}

impl SignalBundle {
    /// Matches for a category; empty for unknown names.
    pub fn matches(&self, category: &str) -> &[Match] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn count(&self, category: &str) -> usize {
        self.matches(category).len()
    }

    pub fn contains_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Distinct matched keywords of a category, in first-match order.
    pub fn distinct_keywords(&self, category: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for m in self.matches(category) {
            if !out.contains(&m.keyword.as_str()) {
                out.push(&m.keyword);
            }
        }
        out
    }

    /// Positions of one keyword within a category.
    pub fn positions(&self, category: &str, keyword: &str) -> Vec<Span> {
        self.matches(category)
            .iter()
            .filter(|m| m.keyword == keyword)
            .map(Match::span)
            .collect()
    }

    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.categories
            .iter()
            .map(|(name, matches)| (name.clone(), matches.len()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(Vec::is_empty)
    }
}

/// Scan `text` against every category of `lexicon`.
pub fn extract(lexicon: &Lexicon, text: &str) -> SignalBundle {
    let folded = Folded::new(text);
    let mut categories = BTreeMap::new();

    for category in lexicon.categories() {
        let mut matches = Vec::new();
        for keyword in &category.keywords {
            for span in folded.search(keyword) {
                matches.push(Match {
                    keyword: keyword.clone(),
                    category: category.name.clone(),
                    start: span.start,
                    end: span.end,
                });
            }
        }
        categories.insert(category.name.clone(), matches);
    }

    SignalBundle { categories }
}

/// Overlap-permitting, case-insensitive positions of an arbitrary term.
pub fn find_positions(text: &str, term: &str) -> Vec<Span> {
    let needle = term.trim().to_lowercase();
    Folded::new(text).search(&needle)
}

// ── Case folding with offset mapping ──

/// Lower-cased copy of a text that remembers, for every lowered byte, which
/// original character produced it.
struct Folded {
    lower: String,
    /// `(start, end)` of the source character for each byte of `lower`.
    origin: Vec<(usize, usize)>,
}

impl Folded {
    fn new(text: &str) -> Self {
        let mut lower = String::with_capacity(text.len());
        let mut origin = Vec::with_capacity(text.len());

        for (idx, ch) in text.char_indices() {
            let end = idx + ch.len_utf8();
            for lc in ch.to_lowercase() {
                let before = lower.len();
                lower.push(lc);
                origin.extend(std::iter::repeat_n((idx, end), lower.len() - before));
            }
        }

        Self { lower, origin }
    }

    /// `needle` must already be lower-case.
    fn search(&self, needle: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        if needle.is_empty() {
            return spans;
        }

        let mut from = 0;
        while from < self.lower.len() {
            let Some(rel) = self.lower[from..].find(needle) else {
                break;
            };
            let pos = from + rel;
            let last = pos + needle.len() - 1;
            spans.push(Span {
                start: self.origin[pos].0,
                end: self.origin[last].1,
            });
            // Resume one character after the hit.
            from = pos + self.lower[pos..].chars().next().map_or(1, char::len_utf8);
        }

        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{Category, Group};

    fn lexicon(entries: &[(&str, &[&str])]) -> Lexicon {
        Lexicon::new(
            entries
                .iter()
                .map(|(name, kws)| Category::new(name, Group::Loaded, None, kws))
                .collect(),
        )
    }

    #[test]
    fn empty_text_yields_all_empty_bundle() {
        let bundle = extract(Lexicon::builtin(), "");
        assert!(bundle.is_empty());
        for category in Lexicon::builtin().categories() {
            assert!(bundle.contains_category(&category.name));
        }
    }

    #[test]
    fn case_insensitive_with_original_offsets() {
        let lex = lexicon(&[("loaded", &["evil"])]);
        let bundle = extract(&lex, "Pure EVIL here");
        let m = &bundle.matches("loaded")[0];
        assert_eq!((m.start, m.end), (5, 9));
        assert_eq!(&"Pure EVIL here"[m.start..m.end], "EVIL");
    }

    #[test]
    fn overlapping_occurrences_retained() {
        let lex = lexicon(&[("x", &["aa"])]);
        let bundle = extract(&lex, "aaaa");
        let starts: Vec<usize> = bundle.matches("x").iter().map(|m| m.start).collect();
        assert_eq!(starts, vec![0, 1, 2]);
    }

    #[test]
    fn substrings_of_words_match() {
        // "every" is found inside "everyone".
        let bundle = extract(Lexicon::builtin(), "Everyone agrees.");
        assert_eq!(bundle.distinct_keywords("absolute"), vec!["every"]);
        assert_eq!(bundle.distinct_keywords("bandwagon"), vec!["everyone"]);
    }

    #[test]
    fn offsets_survive_non_ascii_case_folding() {
        // 'İ' lowers to two characters; later offsets must still map back.
        let text = "İstanbul is a threat";
        let positions = find_positions(text, "threat");
        assert_eq!(positions.len(), 1);
        assert_eq!(&text[positions[0].start..positions[0].end], "threat");
    }

    #[test]
    fn extraction_is_deterministic() {
        let text = "Act now! This shocking crisis is a threat to our freedom. Act NOW.";
        let a = extract(Lexicon::builtin(), text);
        let b = extract(Lexicon::builtin(), text);
        assert_eq!(a, b);
        assert_eq!(a.count("urgency_high"), 3); // "act now" twice, "crisis" once
    }

    #[test]
    fn empty_keyword_is_skipped() {
        let lex = lexicon(&[("x", &[""])]);
        assert_eq!(extract(&lex, "anything").count("x"), 0);
    }

    #[test]
    fn find_positions_trims_and_lowercases() {
        let spans = find_positions("They said THEY would", "  they ");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].start, 10);
    }
}
