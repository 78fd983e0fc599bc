//! Side-by-side analysis of several texts.

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use serde_json::Value;
use spinscope_core::{AnalysisResult, RiskLevel};
use spinscope_llm::{parse, prompt};
use tracing::{info, warn};

use crate::context::AnalysisContext;
use crate::error::AnalysisError;
use crate::orchestrator::{AnalyzeOptions, analyze};

pub const MIN_TEXTS: usize = 2;
pub const MAX_TEXTS: usize = 5;
/// Spread in overall score beyond which the extremes are called out.
pub const SIGNIFICANT_DIFFERENCE: f64 = 20.0;

#[derive(Debug, Clone, Serialize)]
pub struct LabelledResult {
    pub label: String,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskEntry {
    pub label: String,
    pub overall_score: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionalEntry {
    pub label: String,
    pub emotional_intensity: f64,
    pub urgency_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechniqueEntry {
    pub label: String,
    pub technique_count: usize,
    pub unique_techniques: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiasEntry {
    pub label: String,
    pub ideological_bias: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyDifference {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub highest: String,
    pub lowest: String,
    pub difference: f64,
}

/// A technique found in two or more texts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedTechnique {
    pub technique: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonInsights {
    /// Highest overall score first.
    pub risk_comparison: Vec<RiskEntry>,
    pub emotional_comparison: Vec<EmotionalEntry>,
    pub technique_comparison: Vec<TechniqueEntry>,
    pub bias_comparison: Vec<BiasEntry>,
    pub key_differences: Vec<KeyDifference>,
    pub common_patterns: Vec<SharedTechnique>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub individual: Vec<LabelledResult>,
    pub insights: ComparisonInsights,
    /// Provider-written comparison; `None` when external analysis is off or
    /// no provider produced an object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_insights: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

/// Analyze 2 to 5 texts concurrently and compare them. Missing or blank
/// labels become `Text N`. The first failing text aborts the comparison.
pub async fn compare(
    ctx: &AnalysisContext,
    texts: &[String],
    labels: &[String],
    options: &AnalyzeOptions,
) -> Result<ComparisonReport, AnalysisError> {
    if !(MIN_TEXTS..=MAX_TEXTS).contains(&texts.len()) {
        return Err(AnalysisError::InvalidInput(format!(
            "comparison needs {MIN_TEXTS} to {MAX_TEXTS} texts, got {}",
            texts.len()
        )));
    }

    let labels: Vec<String> = (0..texts.len())
        .map(|i| match labels.get(i) {
            Some(l) if !l.trim().is_empty() => l.trim().to_string(),
            _ => format!("Text {}", i + 1),
        })
        .collect();

    info!(count = texts.len(), "comparing texts");
    let (results, external_insights) = tokio::join!(
        try_join_all(texts.iter().map(|t| analyze(ctx, t, options))),
        provider_comparison(ctx, texts, &labels, options.use_external),
    );
    let results = results?;

    let individual: Vec<LabelledResult> = labels
        .into_iter()
        .zip(results)
        .map(|(label, result)| LabelledResult { label, result })
        .collect();

    Ok(ComparisonReport {
        insights: insights(&individual),
        individual,
        external_insights,
        timestamp: Utc::now(),
    })
}

/// One comparative prompt over all texts, parsed like a single analysis.
async fn provider_comparison(
    ctx: &AnalysisContext,
    texts: &[String],
    labels: &[String],
    enabled: bool,
) -> Option<Value> {
    if !enabled {
        return None;
    }

    let entries: Vec<(&str, &str)> = labels
        .iter()
        .map(String::as_str)
        .zip(texts.iter().map(String::as_str))
        .collect();
    let response = ctx
        .gateway
        .generate_with_fallback(
            &prompt::comparative_analysis(&entries),
            prompt::COMPARISON_MAX_TOKENS,
        )
        .await;
    if !response.success {
        warn!(
            error = response.error.as_deref().unwrap_or(""),
            "no provider produced a comparison"
        );
        return None;
    }

    let parsed = parse(&response.content);
    if parsed.is_none() {
        warn!(provider = %response.provider, "comparison reply held no JSON object");
    }
    parsed
}

pub fn insights(results: &[LabelledResult]) -> ComparisonInsights {
    let mut risk_comparison: Vec<RiskEntry> = results
        .iter()
        .map(|r| RiskEntry {
            label: r.label.clone(),
            overall_score: r.result.scores.overall_score,
            risk_level: r.result.scores.risk_level,
        })
        .collect();
    risk_comparison.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));

    ComparisonInsights {
        risk_comparison,
        emotional_comparison: results
            .iter()
            .map(|r| EmotionalEntry {
                label: r.label.clone(),
                emotional_intensity: r.result.scores.emotional_intensity,
                urgency_score: r.result.scores.urgency_score,
            })
            .collect(),
        technique_comparison: results
            .iter()
            .map(|r| TechniqueEntry {
                label: r.label.clone(),
                technique_count: r.result.techniques.len(),
                unique_techniques: r
                    .result
                    .technique_names()
                    .into_iter()
                    .map(String::from)
                    .collect(),
            })
            .collect(),
        bias_comparison: results
            .iter()
            .map(|r| BiasEntry {
                label: r.label.clone(),
                ideological_bias: r.result.scores.ideological_bias,
            })
            .collect(),
        key_differences: key_differences(results),
        common_patterns: shared_techniques(results),
    }
}

fn key_differences(results: &[LabelledResult]) -> Vec<KeyDifference> {
    let score = |r: &LabelledResult| r.result.scores.overall_score;

    let mut highest: Option<&LabelledResult> = None;
    let mut lowest: Option<&LabelledResult> = None;
    for r in results {
        if highest.is_none_or(|h| score(r) > score(h)) {
            highest = Some(r);
        }
        if lowest.is_none_or(|l| score(r) < score(l)) {
            lowest = Some(r);
        }
    }

    let (Some(highest), Some(lowest)) = (highest, lowest) else {
        return Vec::new();
    };
    let difference = score(highest) - score(lowest);
    if difference <= SIGNIFICANT_DIFFERENCE {
        return Vec::new();
    }

    vec![KeyDifference {
        kind: "significant_risk_difference".to_string(),
        description: format!(
            "{} shows {difference:.1} points higher risk than {}",
            highest.label, lowest.label
        ),
        highest: highest.label.clone(),
        lowest: lowest.label.clone(),
        difference,
    }]
}

/// Techniques shared by at least two distinct labels, in first-seen order.
fn shared_techniques(results: &[LabelledResult]) -> Vec<SharedTechnique> {
    let mut seen: Vec<SharedTechnique> = Vec::new();

    for r in results {
        for name in r.result.technique_names() {
            match seen.iter_mut().find(|s| s.technique == name) {
                Some(entry) => {
                    if !entry.labels.contains(&r.label) {
                        entry.labels.push(r.label.clone());
                    }
                }
                None => seen.push(SharedTechnique {
                    technique: name.to_string(),
                    labels: vec![r.label.clone()],
                }),
            }
        }
    }

    seen.retain(|s| s.labels.len() >= 2);
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::time::{Duration, Instant};

    use async_trait::async_trait;
    use spinscope_core::{
        EmotionalTriggers, LanguageStats, Provenance, ReadingLevel, ScoreRecord, SignalSummary,
        TechniqueFinding,
    };
    use spinscope_llm::gateway::DEFAULT_TIMEOUT;
    use spinscope_llm::{Gateway, Generation, Provider, ProviderError};

    const COMPARISON_REPLY: &str = r#"Here you go:
    {"overall_comparison": "The ad leans on urgency.", "manipulation_ranking": ["Ad", "Text 2"]}"#;

    /// Answers every prompt with the same reply after an optional delay.
    struct Scripted {
        reply: &'static str,
        delay: Duration,
    }

    #[async_trait]
    impl Provider for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }
        fn model(&self) -> &str {
            "scripted-1"
        }
        fn is_available(&self) -> bool {
            true
        }
        async fn generate(&self, _: &str, _: u32) -> Result<Generation, ProviderError> {
            tokio::time::sleep(self.delay).await;
            Ok(Generation {
                content: self.reply.to_string(),
                tokens_used: 10,
            })
        }
    }

    fn scripted(reply: &'static str, delay: Duration) -> AnalysisContext {
        AnalysisContext::new(Gateway::new(
            vec![Box::new(Scripted { reply, delay })],
            DEFAULT_TIMEOUT,
        ))
    }

    fn two_texts() -> Vec<String> {
        vec![
            "Act now! Everyone is joining.".to_string(),
            "The council met on Tuesday.".to_string(),
        ]
    }

    fn result(overall: f64, techniques: &[&str]) -> AnalysisResult {
        AnalysisResult {
            scores: ScoreRecord {
                emotional_intensity: overall / 2.0,
                urgency_score: 10.0,
                ideological_bias: -5.0,
                propaganda_risk: 0.0,
                combination_bonus: 0.0,
                overall_score: overall,
                risk_level: RiskLevel::Low,
            },
            techniques: techniques
                .iter()
                .map(|t| TechniqueFinding {
                    technique: t.to_string(),
                    evidence: String::new(),
                    confidence: 0.8,
                    positions: Vec::new(),
                    psychological_impact: None,
                })
                .collect(),
            signals: SignalSummary {
                category_counts: BTreeMap::new(),
                base_intensity: 0.0,
                triggers: EmotionalTriggers::default(),
                combinations: Vec::new(),
            },
            entities: Vec::new(),
            narrative: String::new(),
            provenance: Provenance::DeterministicFallback,
            language: LanguageStats {
                word_count: 0,
                sentence_count: 0,
                avg_sentence_length: 0.0,
                reading_level: ReadingLevel::Low,
                exclamation_count: 0,
                question_count: 0,
                caps_percentage: 0.0,
            },
            highlighted_text: String::new(),
            external: None,
            timestamp: Utc::now(),
        }
    }

    fn labelled(label: &str, overall: f64, techniques: &[&str]) -> LabelledResult {
        LabelledResult {
            label: label.to_string(),
            result: result(overall, techniques),
        }
    }

    fn offline() -> AnalysisContext {
        AnalysisContext::new(Gateway::new(Vec::new(), DEFAULT_TIMEOUT))
    }

    fn deterministic() -> AnalyzeOptions {
        AnalyzeOptions {
            use_external: false,
            thresholds: None,
        }
    }

    #[test]
    fn ranks_descending_and_reports_extremes_only() {
        let results = vec![
            labelled("A", 40.0, &[]),
            labelled("B", 80.0, &[]),
            labelled("C", 10.0, &[]),
        ];
        let insights = insights(&results);

        let ranked: Vec<f64> = insights.risk_comparison.iter().map(|r| r.overall_score).collect();
        assert_eq!(ranked, vec![80.0, 40.0, 10.0]);

        assert_eq!(insights.key_differences.len(), 1);
        let diff = &insights.key_differences[0];
        assert_eq!(diff.kind, "significant_risk_difference");
        assert_eq!((diff.highest.as_str(), diff.lowest.as_str()), ("B", "C"));
        assert_eq!(diff.difference, 70.0);
        assert_eq!(diff.description, "B shows 70.0 points higher risk than C");
    }

    #[test]
    fn small_spread_has_no_key_difference() {
        let results = vec![labelled("A", 30.0, &[]), labelled("B", 50.0, &[])];
        assert!(insights(&results).key_differences.is_empty());
    }

    #[test]
    fn shared_techniques_need_two_labels() {
        let results = vec![
            labelled("A", 10.0, &["Bandwagon", "Bandwagon", "Strawman"]),
            labelled("B", 10.0, &["Bandwagon", "Call To Action"]),
            labelled("C", 10.0, &["Call To Action"]),
        ];
        let insights = insights(&results);
        assert_eq!(
            insights.common_patterns,
            vec![
                SharedTechnique {
                    technique: "Bandwagon".into(),
                    labels: vec!["A".into(), "B".into()],
                },
                SharedTechnique {
                    technique: "Call To Action".into(),
                    labels: vec!["B".into(), "C".into()],
                },
            ]
        );
        assert_eq!(insights.technique_comparison[0].technique_count, 3);
        assert_eq!(
            insights.technique_comparison[0].unique_techniques,
            vec!["Bandwagon", "Strawman"]
        );
    }

    #[test]
    fn per_text_comparisons_keep_input_order() {
        let results = vec![labelled("A", 20.0, &[]), labelled("B", 60.0, &[])];
        let insights = insights(&results);
        assert_eq!(insights.emotional_comparison[1].emotional_intensity, 30.0);
        assert_eq!(insights.bias_comparison[0].label, "A");
    }

    #[tokio::test]
    async fn text_count_bounds() {
        let ctx = offline();
        let one = vec!["Only one text here.".to_string()];
        let err = compare(&ctx, &one, &[], &deterministic()).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_input");

        let six: Vec<String> = (0..6).map(|i| format!("Text number {i}.")).collect();
        assert!(compare(&ctx, &six, &[], &deterministic()).await.is_err());
    }

    #[tokio::test]
    async fn default_labels_fill_gaps() {
        let ctx = offline();
        let texts = vec![
            "Act now! Everyone is joining.".to_string(),
            "The council met on Tuesday.".to_string(),
            "Studies show the plan works.".to_string(),
        ];
        let labels = vec!["Ad".to_string(), " ".to_string()];
        let report = compare(&ctx, &texts, &labels, &deterministic()).await.unwrap();

        let names: Vec<&str> = report.individual.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(names, vec!["Ad", "Text 2", "Text 3"]);
        assert_eq!(report.insights.risk_comparison.len(), 3);
    }

    #[tokio::test]
    async fn one_failing_text_aborts() {
        let ctx = offline();
        let texts = vec!["A perfectly fine text.".to_string(), "   ".to_string()];
        let err = compare(&ctx, &texts, &[], &deterministic()).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[tokio::test]
    async fn provider_comparison_attached() {
        let ctx = scripted(COMPARISON_REPLY, Duration::ZERO);
        let report = compare(&ctx, &two_texts(), &[], &AnalyzeOptions::default())
            .await
            .unwrap();

        let external = report.external_insights.expect("comparison object");
        assert_eq!(external["overall_comparison"], "The ad leans on urgency.");
        assert_eq!(external["manipulation_ranking"][0], "Ad");
        assert_eq!(report.insights.risk_comparison.len(), 2);
    }

    #[tokio::test]
    async fn provider_comparison_absent_without_object() {
        let ctx = scripted("I would rather not compare these.", Duration::ZERO);
        let report = compare(&ctx, &two_texts(), &[], &AnalyzeOptions::default())
            .await
            .unwrap();
        assert!(report.external_insights.is_none());
        assert!(
            report
                .individual
                .iter()
                .all(|r| r.result.provenance == Provenance::DeterministicFallback)
        );

        let report = compare(&offline(), &two_texts(), &[], &AnalyzeOptions::default())
            .await
            .unwrap();
        assert!(report.external_insights.is_none());
    }

    #[tokio::test]
    async fn provider_comparison_skipped_when_external_off() {
        let ctx = scripted(COMPARISON_REPLY, Duration::ZERO);
        let report = compare(&ctx, &two_texts(), &[], &deterministic()).await.unwrap();
        assert!(report.external_insights.is_none());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("external_insights").is_none());
    }

    #[tokio::test]
    async fn analyses_run_concurrently() {
        let delay = Duration::from_millis(300);
        let ctx = scripted("{\"risk_level\": \"low\"}", delay);
        let texts: Vec<String> = (1..=5).map(|i| format!("Sample text number {i}.")).collect();

        let started = Instant::now();
        let report = compare(&ctx, &texts, &[], &AnalyzeOptions::default())
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(report.individual.len(), 5);
        // five analyses plus the comparison pass would take 1.8 s one after another
        assert!(elapsed < delay * 3, "took {elapsed:?}");
    }
}
