//! Terminal cards for analysis results, comparisons and provider health.

use serde_json::Value;
use spinscope_core::{AnalysisResult, Provenance};
use spinscope_engine::ComparisonReport;
use spinscope_llm::HealthReport;

const MAX_LIST_ITEMS: usize = 10;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

const PROVIDER_COMPARISON_FIELDS: &[&str] = &[
    "overall_comparison",
    "manipulation_ranking",
    "common_techniques",
    "unique_patterns",
    "audience_targeting",
    "sophistication_analysis",
    "recommendations",
];

// ── Public API ──

pub fn print_analysis(result: &AnalysisResult) {
    let scores = &result.scores;
    println!(
        "=== {} risk ({:.2}) ===",
        scores.risk_level.as_str().to_uppercase(),
        scores.overall_score
    );
    println!("{}", result.narrative);
    println!();

    println!("Scores");
    row("emotional_intensity", format!("{:.2}", scores.emotional_intensity));
    row("urgency_score", format!("{:.2}", scores.urgency_score));
    row("ideological_bias", format!("{:+.2}", scores.ideological_bias));
    row("propaganda_risk", format!("{:.2}", scores.propaganda_risk));
    row("combination_bonus", format!("{:.2}", scores.combination_bonus));
    row("overall_score", format!("{:.2}", scores.overall_score));

    if !result.techniques.is_empty() {
        println!("Techniques");
        for finding in &result.techniques {
            row(
                &finding.technique,
                format!(
                    "\"{}\" (confidence {:.2}, {} hit{})",
                    finding.evidence,
                    finding.confidence,
                    finding.positions.len(),
                    if finding.positions.len() == 1 { "" } else { "s" }
                ),
            );
        }
    }

    let triggers = &result.signals.triggers;
    if !triggers.is_empty() {
        println!("Emotional Triggers");
        let groups = [
            ("fear_appeals", &triggers.fear_appeals),
            ("urgency_markers", &triggers.urgency_markers),
            ("emotional_language", &triggers.emotional_language),
            ("psychological_pressure", &triggers.psychological_pressure),
        ];
        for (name, group) in groups {
            if !group.is_empty() {
                row(name, join_limited(group.iter().map(|t| t.trigger.as_str())));
            }
        }
    }

    if !result.signals.combinations.is_empty() {
        println!("Combinations");
        for award in &result.signals.combinations {
            row(
                &format!("+{:.0}", award.bonus),
                format!("{} ({})", award.techniques.join(" + "), award.rationale),
            );
        }
    }

    if !result.entities.is_empty() {
        println!("Entities");
        row(
            "mentions",
            join_limited(result.entities.iter().map(|e| e.text.as_str())),
        );
    }

    let lang = &result.language;
    println!("Language");
    row("words", lang.word_count.to_string());
    row("sentences", lang.sentence_count.to_string());
    row(
        "avg_sentence_length",
        format!("{:.1} ({})", lang.avg_sentence_length, lang.reading_level.as_str()),
    );
    row("exclamations", lang.exclamation_count.to_string());
    row("questions", lang.question_count.to_string());
    row("caps_percentage", format!("{:.2}%", lang.caps_percentage));

    println!("Provenance");
    row("source", result.provenance.as_str().to_string());
    if let (Provenance::External, Some(ext)) = (result.provenance, &result.external) {
        row("provider", format!("{} ({})", ext.provider, ext.model));
        row("tokens_used", ext.tokens_used.to_string());
        row(
            "reported",
            format!("{:.2} ({})", ext.reported_overall, ext.reported_risk_level),
        );
    }
    row("timestamp", result.timestamp.format(TIMESTAMP_FORMAT).to_string());
}

pub fn print_comparison(report: &ComparisonReport) {
    let insights = &report.insights;
    println!("=== Comparison of {} texts ===", report.individual.len());
    println!();

    println!("Risk (highest first)");
    for entry in &insights.risk_comparison {
        row(
            &entry.label,
            format!("{:.2} ({})", entry.overall_score, entry.risk_level.as_str()),
        );
    }

    println!("Emotion / Urgency");
    for entry in &insights.emotional_comparison {
        row(
            &entry.label,
            format!("{:.2} / {:.2}", entry.emotional_intensity, entry.urgency_score),
        );
    }

    println!("Techniques");
    for entry in &insights.technique_comparison {
        let names = if entry.unique_techniques.is_empty() {
            "-".to_string()
        } else {
            join_limited(entry.unique_techniques.iter().map(String::as_str))
        };
        row(&entry.label, format!("{}: {}", entry.technique_count, names));
    }

    println!("Bias");
    for entry in &insights.bias_comparison {
        row(&entry.label, format!("{:+.2}", entry.ideological_bias));
    }

    if !insights.key_differences.is_empty() {
        println!("Key Differences");
        for diff in &insights.key_differences {
            println!("  {}", diff.description);
        }
    }

    if !insights.common_patterns.is_empty() {
        println!("Shared Techniques");
        for shared in &insights.common_patterns {
            row(&shared.technique, shared.labels.join(", "));
        }
    }

    if let Some(external) = &report.external_insights {
        println!("Provider Comparison");
        for key in PROVIDER_COMPARISON_FIELDS {
            match &external[*key] {
                Value::String(s) if !s.is_empty() => row(key, s.clone()),
                Value::Array(items) if !items.is_empty() => {
                    row(key, join_limited(items.iter().filter_map(Value::as_str)))
                }
                _ => {}
            }
        }
    }

    row("timestamp", report.timestamp.format(TIMESTAMP_FORMAT).to_string());
}

pub fn print_health(health: &HealthReport) {
    println!(
        "=== Providers: {} ({} available) ===",
        health.status.as_str(),
        health.available_providers
    );
    for provider in &health.providers {
        let state = if provider.available {
            "available"
        } else {
            "unavailable"
        };
        row(&provider.name, format!("{} [{}]", provider.model, state));
    }
}

// ── Helpers ──

fn row(key: &str, value: String) {
    println!("  {:<26} {}", key, value);
}

fn join_limited<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let items: Vec<&str> = items.collect();
    let shown = items
        .iter()
        .take(MAX_LIST_ITEMS)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    if items.len() > MAX_LIST_ITEMS {
        format!("{shown} (+{} more)", items.len() - MAX_LIST_ITEMS)
    } else {
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_lists_joined_in_full() {
        assert_eq!(join_limited(["a", "b"].into_iter()), "a, b");
        assert_eq!(join_limited(std::iter::empty()), "");
    }

    #[test]
    fn long_lists_truncated() {
        let names: Vec<String> = (0..12).map(|i| format!("n{i}")).collect();
        let joined = join_limited(names.iter().map(String::as_str));
        assert!(joined.starts_with("n0, n1"));
        assert!(joined.ends_with("n9 (+2 more)"));
    }
}
