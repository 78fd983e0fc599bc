//! Interpretation of provider output.
//!
//! Generated text may wrap the JSON object in code fences or prose. [`parse`]
//! recovers the object when there is one; [`ExternalRecord::from_value`]
//! then reads every field leniently, substituting a default for anything
//! missing or mistyped.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

/// Fields passed through verbatim as optional educational sections.
pub const SECTION_KEYS: &[&str] = &[
    "technique_explanations",
    "improvement_suggestions",
    "media_literacy_insights",
    "cognitive_biases_exploited",
    "credibility_assessment",
    "psychological_analysis",
    "bias_analysis",
    "emotional_triggers",
];

pub const DEFAULT_RISK_LEVEL: &str = "low";
pub const DEFAULT_TECHNIQUE_CONFIDENCE: f64 = 0.8;

/// Extract a JSON object from generated text. Returns `None` when no
/// object can be recovered.
pub fn parse(raw: &str) -> Option<Value> {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let trimmed = cleaned.trim();

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && start < end
        && let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&trimmed[start..=end])
    {
        return Some(value);
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value @ Value::Object(_)) => Some(value),
        Ok(_) => {
            debug!("provider output parsed but is not an object");
            None
        }
        Err(e) => {
            debug!(error = %e, "provider output is not JSON");
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalTechnique {
    pub technique: String,
    pub confidence: f64,
    /// Quoted words, possibly several separated by commas.
    pub evidence: String,
    pub psychological_impact: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalEntity {
    pub name: String,
    pub kind: String,
    pub sentiment_context: Option<String>,
    pub framing: Option<String>,
}

/// The structured analysis a provider returned, with defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalRecord {
    pub overall_risk_score: f64,
    pub risk_level: String,
    pub emotional_intensity: f64,
    pub urgency_score: f64,
    pub ideological_bias: f64,
    pub techniques: Vec<ExternalTechnique>,
    pub entities: Vec<ExternalEntity>,
    pub loaded_language: Vec<String>,
    pub false_urgency: Vec<String>,
    pub detailed_explanation: String,
    pub sections: BTreeMap<String, Value>,
}

impl ExternalRecord {
    /// Read a record from a parsed object. Non-objects yield an all-default
    /// record.
    pub fn from_value(value: &Value) -> Self {
        let empty = Map::new();
        let obj = value.as_object().unwrap_or(&empty);

        let linguistic = obj.get("linguistic_manipulation");

        Self {
            overall_risk_score: number(obj.get("overall_risk_score")).unwrap_or(0.0),
            risk_level: string(obj.get("risk_level"))
                .unwrap_or_else(|| DEFAULT_RISK_LEVEL.to_string()),
            emotional_intensity: number(obj.get("emotional_intensity")).unwrap_or(0.0),
            urgency_score: number(obj.get("urgency_score")).unwrap_or(0.0),
            ideological_bias: number(obj.get("ideological_bias"))
                .or_else(|| number(value.pointer("/bias_analysis/ideological_bias/score")))
                .unwrap_or(0.0),
            techniques: array(obj.get("propaganda_techniques"))
                .iter()
                .filter_map(technique)
                .collect(),
            entities: array(value.pointer("/entity_analysis/entities"))
                .iter()
                .filter_map(entity)
                .collect(),
            loaded_language: strings(linguistic.and_then(|l| l.get("loaded_language"))),
            false_urgency: strings(linguistic.and_then(|l| l.get("false_urgency"))),
            detailed_explanation: string(obj.get("detailed_explanation")).unwrap_or_default(),
            sections: SECTION_KEYS
                .iter()
                .filter_map(|k| obj.get(*k).map(|v| (k.to_string(), v.clone())))
                .collect(),
        }
    }
}

// ── Lenient field readers ──

/// Numbers, or strings holding numbers. Non-finite values are rejected.
fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn array(value: Option<&Value>) -> &[Value] {
    value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

fn strings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|v| string(Some(v))).collect(),
        Some(v @ Value::String(_)) => string(Some(v)).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn technique(value: &Value) -> Option<ExternalTechnique> {
    match value {
        Value::String(name) if !name.trim().is_empty() => Some(ExternalTechnique {
            technique: name.trim().to_string(),
            confidence: DEFAULT_TECHNIQUE_CONFIDENCE,
            evidence: String::new(),
            psychological_impact: None,
        }),
        Value::Object(obj) => {
            let name = string(obj.get("technique")).or_else(|| string(obj.get("name")))?;
            Some(ExternalTechnique {
                technique: name,
                confidence: number(obj.get("confidence")).unwrap_or(DEFAULT_TECHNIQUE_CONFIDENCE),
                evidence: strings(obj.get("evidence")).join(", "),
                psychological_impact: string(obj.get("psychological_impact")),
            })
        }
        _ => None,
    }
}

fn entity(value: &Value) -> Option<ExternalEntity> {
    let obj = value.as_object()?;
    let name = string(obj.get("entity"))
        .or_else(|| string(obj.get("text")))
        .or_else(|| string(obj.get("name")))?;
    Some(ExternalEntity {
        name,
        kind: string(obj.get("type"))
            .or_else(|| string(obj.get("label")))
            .unwrap_or_else(|| "MISC".to_string()),
        sentiment_context: string(obj.get("sentiment_context")),
        framing: string(obj.get("framing_analysis")).or_else(|| string(obj.get("framing"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_inside_prose() {
        let value = parse("prose... {\"overall_risk_score\": 10} trailing").unwrap();
        assert_eq!(value["overall_risk_score"], 10);
    }

    #[test]
    fn fenced_object() {
        let raw = "Here you go:\n```json\n{\"risk_level\": \"high\"}\n```\n";
        assert_eq!(parse(raw).unwrap()["risk_level"], "high");
    }

    #[test]
    fn non_json_is_none() {
        assert!(parse("not json at all").is_none());
        assert!(parse("").is_none());
        assert!(parse("{ broken").is_none());
        assert!(parse("} backwards {").is_none());
    }

    #[test]
    fn non_object_json_is_none() {
        assert!(parse("[1, 2, 3]").is_none());
        assert!(parse("42").is_none());
        assert!(parse("\"text\"").is_none());
    }

    #[test]
    fn record_defaults_for_empty_object() {
        let record = ExternalRecord::from_value(&serde_json::json!({}));
        assert_eq!(record.overall_risk_score, 0.0);
        assert_eq!(record.risk_level, "low");
        assert!(record.techniques.is_empty());
        assert!(record.entities.is_empty());
        assert!(record.sections.is_empty());
        assert_eq!(record.detailed_explanation, "");
    }

    #[test]
    fn record_accepts_stringly_numbers() {
        let record = ExternalRecord::from_value(&serde_json::json!({
            "overall_risk_score": "72",
            "emotional_intensity": " 55.5 ",
            "urgency_score": "40%",
            "ideological_bias": "left",
        }));
        assert_eq!(record.overall_risk_score, 72.0);
        assert_eq!(record.emotional_intensity, 55.5);
        assert_eq!(record.urgency_score, 40.0);
        assert_eq!(record.ideological_bias, 0.0);
    }

    #[test]
    fn bias_falls_back_to_nested_score() {
        let record = ExternalRecord::from_value(&serde_json::json!({
            "bias_analysis": {"ideological_bias": {"score": -35}}
        }));
        assert_eq!(record.ideological_bias, -35.0);
    }

    #[test]
    fn techniques_read_leniently() {
        let record = ExternalRecord::from_value(&serde_json::json!({
            "propaganda_techniques": [
                {"technique": "Appeal to fear", "confidence": 0.9, "evidence": "shocking, devastate"},
                {"technique": "Bandwagon", "evidence": ["everyone", "all of us"]},
                "Name calling",
                {"confidence": 0.5},
                7,
            ]
        }));
        let names: Vec<&str> = record.techniques.iter().map(|t| t.technique.as_str()).collect();
        assert_eq!(names, vec!["Appeal to fear", "Bandwagon", "Name calling"]);
        assert_eq!(record.techniques[1].confidence, 0.8);
        assert_eq!(record.techniques[1].evidence, "everyone, all of us");
        assert_eq!(record.techniques[2].evidence, "");
    }

    #[test]
    fn entities_and_sections() {
        let record = ExternalRecord::from_value(&serde_json::json!({
            "entity_analysis": {"entities": [
                {"entity": "Senate", "type": "ORG", "framing_analysis": "obstacle"},
                {"type": "PERSON"},
            ]},
            "media_literacy_insights": "Ask who benefits.",
            "linguistic_manipulation": {"loaded_language": ["shocking"], "false_urgency": "act now"},
            "unrelated": true,
        }));
        assert_eq!(record.entities.len(), 1);
        assert_eq!(record.entities[0].framing.as_deref(), Some("obstacle"));
        assert_eq!(record.loaded_language, vec!["shocking"]);
        assert_eq!(record.false_urgency, vec!["act now"]);
        assert_eq!(record.sections.len(), 1);
        assert!(record.sections.contains_key("media_literacy_insights"));
    }

    #[test]
    fn canned_local_analysis_is_readable() {
        use crate::local::LocalProvider;
        use crate::provider::Provider;

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let generation = rt
            .block_on(LocalProvider.generate("propaganda check", 10))
            .unwrap();
        let record = ExternalRecord::from_value(&parse(&generation.content).unwrap());
        assert_eq!(record.overall_risk_score, 75.0);
        assert_eq!(record.risk_level, "high");
        assert_eq!(record.techniques.len(), 2);
        assert_eq!(record.loaded_language, vec!["shocking", "devastate"]);
        assert!(record.sections.contains_key("technique_explanations"));
    }
}
