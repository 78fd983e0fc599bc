//! Text features that do not depend on the lexicon: pattern entities,
//! language statistics and HTML highlighting.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::types::{Entity, LanguageStats, ReadingLevel, Span, TechniqueFinding};

static CAPITALIZED_PHRASE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b"));

static SENTENCE_END: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"[.!?]+"));

pub const PATTERN_ENTITY_LABEL: &str = "MISC";
pub const PATTERN_ENTITY_CONFIDENCE: f64 = 0.5;

fn pattern(cell: &'static LazyLock<Result<Regex, regex::Error>>) -> Result<&'static Regex, CoreError> {
    cell.as_ref().map_err(|e| CoreError::Pattern(e.clone()))
}

// ── Entities ──

/// Capitalized phrases, de-duplicated in first-seen order.
///
/// Phrases of two characters or fewer are dropped. The span points at the
/// first occurrence.
pub fn pattern_entities(text: &str) -> Result<Vec<Entity>, CoreError> {
    let re = pattern(&CAPITALIZED_PHRASE)?;
    let mut seen: Vec<&str> = Vec::new();
    let mut entities = Vec::new();

    for m in re.find_iter(text) {
        let phrase = m.as_str();
        if phrase.chars().count() <= 2 || seen.contains(&phrase) {
            continue;
        }
        seen.push(phrase);
        entities.push(Entity {
            text: phrase.to_string(),
            label: PATTERN_ENTITY_LABEL.to_string(),
            confidence: Some(PATTERN_ENTITY_CONFIDENCE),
            span: Some(Span {
                start: m.start(),
                end: m.end(),
            }),
            sentiment_context: None,
            framing: None,
        });
    }

    Ok(entities)
}

// ── Language statistics ──

pub fn language_stats(text: &str) -> Result<LanguageStats, CoreError> {
    let word_count = text.split_whitespace().count();
    let sentence_count = pattern(&SENTENCE_END)?.find_iter(text).count();

    let avg_sentence_length = if sentence_count > 0 {
        word_count as f64 / sentence_count as f64
    } else {
        0.0
    };

    let reading_level = if avg_sentence_length > 20.0 {
        ReadingLevel::High
    } else if avg_sentence_length < 10.0 {
        ReadingLevel::Low
    } else {
        ReadingLevel::Medium
    };

    let total_chars = text.chars().count();
    let caps_percentage = if total_chars > 0 {
        let upper = text.chars().filter(|c| c.is_uppercase()).count();
        (upper as f64 / total_chars as f64 * 10_000.0).round() / 100.0
    } else {
        0.0
    };

    Ok(LanguageStats {
        word_count,
        sentence_count,
        avg_sentence_length,
        reading_level,
        exclamation_count: text.matches('!').count(),
        question_count: text.matches('?').count(),
        caps_percentage,
    })
}

// ── Highlighting ──

/// One region to wrap in a `<mark>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    pub span: Span,
    pub class: String,
    pub title: String,
}

impl Mark {
    pub fn new(span: Span, class: &str, title: &str) -> Self {
        Self {
            span,
            class: class.to_string(),
            title: title.to_string(),
        }
    }
}

/// Marks for every located position of every finding.
pub fn technique_marks(findings: &[TechniqueFinding]) -> Vec<Mark> {
    findings
        .iter()
        .flat_map(|f| {
            f.positions
                .iter()
                .map(|span| Mark::new(*span, "propaganda", &f.technique))
        })
        .collect()
}

/// HTML-escaped copy of `text` with the given regions wrapped in `<mark>`.
///
/// Marks are applied by earliest start, longest first. A mark that overlaps
/// one already applied, or that does not fall on character boundaries, is
/// skipped.
pub fn highlight(text: &str, marks: &[Mark]) -> String {
    let mut ordered: Vec<&Mark> = marks
        .iter()
        .filter(|m| m.span.start < m.span.end && text.get(m.span.start..m.span.end).is_some())
        .collect();
    ordered.sort_by(|a, b| {
        a.span
            .start
            .cmp(&b.span.start)
            .then(b.span.end.cmp(&a.span.end))
    });

    let mut out = String::with_capacity(text.len() + marks.len() * 48);
    let mut cursor = 0;

    for mark in ordered {
        if mark.span.start < cursor {
            continue;
        }
        out.push_str(&escape(&text[cursor..mark.span.start]));
        out.push_str(&format!(
            r#"<mark class="{}" title="{}">{}</mark>"#,
            escape(&mark.class),
            escape(&mark.title),
            escape(&text[mark.span.start..mark.span.end]),
        ));
        cursor = mark.span.end;
    }
    out.push_str(&escape(&text[cursor..]));

    out
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> Span {
        Span { start, end }
    }

    #[test]
    fn entities_deduplicated_in_order() {
        let text = "Senator Smith met Bob in Washington. Senator Smith left. Al stayed.";
        let entities = pattern_entities(text).unwrap();
        let names: Vec<&str> = entities.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(names, vec!["Senator Smith", "Bob", "Washington"]);
        assert!(entities.iter().all(|e| e.label == "MISC"));
        assert_eq!(entities[0].confidence, Some(0.5));
        assert_eq!(entities[1].span, Some(span(18, 21)));
    }

    #[test]
    fn no_entities_in_lowercase_text() {
        assert!(pattern_entities("nothing capitalized here").unwrap().is_empty());
    }

    #[test]
    fn stats_for_short_text() {
        let stats = language_stats("Stop this NOW! Why wait? We act.").unwrap();
        assert_eq!(stats.word_count, 7);
        assert_eq!(stats.sentence_count, 3);
        assert_eq!(stats.exclamation_count, 1);
        assert_eq!(stats.question_count, 1);
        assert_eq!(stats.reading_level, ReadingLevel::Low);
        // S N O W W W = 6 of 32 chars
        assert_eq!(stats.caps_percentage, 18.75);
    }

    #[test]
    fn stats_without_terminators() {
        let stats = language_stats("no punctuation at all").unwrap();
        assert_eq!(stats.sentence_count, 0);
        assert_eq!(stats.avg_sentence_length, 0.0);
        assert_eq!(language_stats("").unwrap().caps_percentage, 0.0);
    }

    #[test]
    fn long_sentences_read_high() {
        let sentence = vec!["word"; 25].join(" ") + ".";
        let stats = language_stats(&sentence).unwrap();
        assert_eq!(stats.reading_level, ReadingLevel::High);
        let medium = vec!["word"; 12].join(" ") + ".";
        assert_eq!(language_stats(&medium).unwrap().reading_level, ReadingLevel::Medium);
    }

    #[test]
    fn highlight_wraps_and_escapes() {
        let text = "Act now & <win>";
        let html = highlight(text, &[Mark::new(span(0, 7), "propaganda", "Call To Action")]);
        assert_eq!(
            html,
            r#"<mark class="propaganda" title="Call To Action">Act now</mark> &amp; &lt;win&gt;"#
        );
    }

    #[test]
    fn highlight_skips_overlaps() {
        let text = "everyone agrees";
        let html = highlight(
            text,
            &[
                Mark::new(span(0, 5), "propaganda", "Absolute"),
                Mark::new(span(0, 8), "propaganda", "Bandwagon"),
            ],
        );
        assert_eq!(
            html,
            r#"<mark class="propaganda" title="Bandwagon">everyone</mark> agrees"#
        );
    }

    #[test]
    fn highlight_ignores_bad_spans() {
        let text = "héllo";
        // 2 falls inside 'é'
        let html = highlight(text, &[Mark::new(span(0, 2), "x", "y"), Mark::new(span(9, 12), "x", "y")]);
        assert_eq!(html, "héllo");
    }
}
