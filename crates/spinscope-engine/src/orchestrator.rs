//! Single-text analysis: external provider first, deterministic scoring
//! when that produces nothing usable.

use std::sync::Arc;

use chrono::Utc;
use spinscope_core::text::{Mark, highlight, language_stats, pattern_entities, technique_marks};
use spinscope_core::{
    AnalysisResult, Entity, ExternalDetail, Provenance, RiskLevel, ScoreRecord, SignalBundle,
    SignalSummary, Span, TechniqueFinding, Thresholds, compose, detect_techniques,
    emotional_intensity, emotional_triggers, extract, find_positions, ideological_bias,
    keyword_base_intensity, urgency_score,
};
use spinscope_llm::{ExternalRecord, parse, prompt};
use tracing::{debug, info, warn};

use crate::context::AnalysisContext;
use crate::error::AnalysisError;

const NO_EXPLANATION: &str = "No explanation available";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeOptions {
    pub use_external: bool,
    /// Overrides the context thresholds when well-formed.
    pub thresholds: Option<Thresholds>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            use_external: true,
            thresholds: None,
        }
    }
}

/// Analyze one text.
///
/// Provider failures and unparseable replies never surface as errors; they
/// route to the deterministic path.
pub async fn analyze(
    ctx: &AnalysisContext,
    text: &str,
    options: &AnalyzeOptions,
) -> Result<AnalysisResult, AnalysisError> {
    if text.trim().is_empty() {
        return Err(AnalysisError::InvalidInput("text must not be empty".into()));
    }

    let thresholds = ctx.thresholds.with_override(options.thresholds);

    if options.use_external {
        if let Some(result) = external(ctx, text, &thresholds).await? {
            return Ok(result);
        }
        info!("external analysis unusable, using deterministic scoring");
    }

    deterministic(ctx, text, &thresholds).await
}

// ── Deterministic path ──

async fn deterministic(
    ctx: &AnalysisContext,
    text: &str,
    thresholds: &Thresholds,
) -> Result<AnalysisResult, AnalysisError> {
    let bundle = extract(ctx.lexicon, text);
    let base = base_intensity(ctx, text, &bundle).await;
    let findings = detect_techniques(ctx.lexicon, &bundle);
    let triggers = emotional_triggers(ctx.lexicon, &bundle);

    let composite = compose(
        emotional_intensity(&bundle, base),
        urgency_score(&bundle),
        ideological_bias(&bundle),
        &findings,
        &triggers,
        thresholds,
    );
    let scores = composite.record;

    debug!(
        overall = scores.overall_score,
        risk = scores.risk_level.as_str(),
        techniques = findings.len(),
        "deterministic analysis"
    );

    Ok(AnalysisResult {
        narrative: deterministic_narrative(&scores, &findings),
        highlighted_text: highlight(text, &technique_marks(&findings)),
        entities: pattern_entities(text)?,
        language: language_stats(text)?,
        signals: SignalSummary {
            category_counts: bundle.counts(),
            base_intensity: base,
            triggers,
            combinations: composite.combinations,
        },
        scores,
        techniques: findings,
        provenance: Provenance::DeterministicFallback,
        external: None,
        timestamp: Utc::now(),
    })
}

/// Sentiment model when present and working, keyword base otherwise.
///
/// Model inference is CPU-bound and runs on the blocking pool.
async fn base_intensity(ctx: &AnalysisContext, text: &str, bundle: &SignalBundle) -> f64 {
    if let Some(model) = &ctx.sentiment {
        let name = model.name().to_string();
        let model = Arc::clone(model);
        let owned = text.to_string();

        match tokio::task::spawn_blocking(move || model.intensity(&owned)).await {
            Ok(Ok(v)) if v.is_finite() => return v.clamp(0.0, 100.0),
            Ok(Ok(v)) => warn!(model = %name, value = v, "sentiment model returned non-finite value"),
            Ok(Err(e)) => warn!(model = %name, error = %e, "sentiment model failed, using keyword base"),
            Err(e) => warn!(model = %name, error = %e, "sentiment task aborted, using keyword base"),
        }
    }
    keyword_base_intensity(bundle)
}

fn deterministic_narrative(scores: &ScoreRecord, findings: &[TechniqueFinding]) -> String {
    let mut names: Vec<&str> = Vec::new();
    for f in findings {
        if !names.contains(&f.technique.as_str()) {
            names.push(&f.technique);
        }
    }

    let techniques = if names.is_empty() {
        "No propaganda techniques detected.".to_string()
    } else {
        format!("Detected techniques: {}.", names.join(", "))
    };

    format!(
        "Rule-based analysis: {} risk (score {:.1}). {techniques}",
        scores.risk_level.as_str(),
        scores.overall_score,
    )
}

// ── External path ──

/// `Ok(None)` when no provider answered or the answer held no object.
async fn external(
    ctx: &AnalysisContext,
    text: &str,
    thresholds: &Thresholds,
) -> Result<Option<AnalysisResult>, AnalysisError> {
    let response = ctx
        .gateway
        .generate_with_fallback(&prompt::comprehensive_analysis(text), ctx.max_tokens)
        .await;
    if !response.success {
        warn!(error = response.error.as_deref().unwrap_or(""), "no provider produced an analysis");
        return Ok(None);
    }

    let Some(value) = parse(&response.content) else {
        warn!(provider = %response.provider, "provider reply held no JSON object");
        return Ok(None);
    };
    let record = ExternalRecord::from_value(&value);

    let bundle = extract(ctx.lexicon, text);
    let base = base_intensity(ctx, text, &bundle).await;
    let triggers = emotional_triggers(ctx.lexicon, &bundle);

    let findings: Vec<TechniqueFinding> = record
        .techniques
        .iter()
        .map(|t| TechniqueFinding {
            technique: t.technique.clone(),
            positions: evidence_positions(text, &t.evidence),
            evidence: t.evidence.clone(),
            confidence: TechniqueFinding::clamp_confidence(t.confidence),
            psychological_impact: t.psychological_impact.clone(),
        })
        .collect();

    let composite = compose(
        record.emotional_intensity,
        record.urgency_score,
        record.ideological_bias,
        &findings,
        &triggers,
        thresholds,
    );

    let entities = record
        .entities
        .iter()
        .map(|e| Entity {
            text: e.name.clone(),
            label: e.kind.clone(),
            confidence: None,
            span: find_positions(text, &e.name).into_iter().next(),
            sentiment_context: e.sentiment_context.clone(),
            framing: e.framing.clone(),
        })
        .collect();

    let mut marks = Vec::new();
    for term in &record.loaded_language {
        for span in find_positions(text, term) {
            marks.push(Mark::new(span, "loaded-language", "Loaded Language"));
        }
    }
    for phrase in &record.false_urgency {
        for span in find_positions(text, phrase) {
            marks.push(Mark::new(span, "false-urgency", "False Urgency"));
        }
    }

    info!(
        provider = %response.provider,
        model = %response.model,
        overall = composite.record.overall_score,
        reported = record.overall_risk_score,
        "external analysis"
    );

    let narrative = if record.detailed_explanation.is_empty() {
        NO_EXPLANATION.to_string()
    } else {
        record.detailed_explanation
    };

    Ok(Some(AnalysisResult {
        scores: composite.record,
        techniques: findings,
        signals: SignalSummary {
            category_counts: bundle.counts(),
            base_intensity: base,
            triggers,
            combinations: composite.combinations,
        },
        entities,
        narrative,
        provenance: Provenance::External,
        language: language_stats(text)?,
        highlighted_text: highlight(text, &marks),
        external: Some(ExternalDetail {
            provider: response.provider,
            model: response.model,
            tokens_used: response.tokens_used,
            reported_overall: record.overall_risk_score,
            reported_risk_level: RiskLevel::parse(&record.risk_level)
                .map(|level| level.as_str().to_string())
                .unwrap_or(record.risk_level),
            sections: record.sections,
        }),
        timestamp: Utc::now(),
    }))
}

/// Locate each comma-separated evidence fragment in the text.
fn evidence_positions(text: &str, evidence: &str) -> Vec<Span> {
    let mut spans: Vec<Span> = evidence
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .flat_map(|piece| find_positions(text, piece))
        .collect();
    spans.sort();
    spans.dedup();
    spans
}
