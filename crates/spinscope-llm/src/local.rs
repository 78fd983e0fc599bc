//! Offline backend that always answers. It returns a fixed structured
//! analysis for analysis prompts and a fixed neutral sentence otherwise, so
//! the gateway has a last resort that needs no network.

use async_trait::async_trait;

use crate::provider::{Generation, Provider, ProviderError};

pub const LOCAL_NAME: &str = "local";
pub const LOCAL_MODEL: &str = "local-fixture";

const NEUTRAL_REPLY: &str = "This appears to be a factual statement with minimal bias indicators.";

const CANNED_ANALYSIS: &str = r#"{
  "overall_risk_score": 75,
  "risk_level": "high",
  "emotional_intensity": 85,
  "urgency_score": 60,
  "ideological_bias": -20,
  "propaganda_techniques": [
    {
      "technique": "Appeal to fear",
      "confidence": 0.9,
      "evidence": "shocking, devastate",
      "psychological_impact": "Triggers fear response to bypass critical thinking"
    },
    {
      "technique": "Bandwagon",
      "confidence": 0.8,
      "evidence": "everyone",
      "psychological_impact": "Creates social pressure to conform"
    }
  ],
  "emotional_triggers": [
    {
      "trigger_type": "fear",
      "intensity": "high",
      "evidence": "shocking revelation, devastate"
    }
  ],
  "cognitive_biases_exploited": [
    {
      "bias": "availability heuristic",
      "mechanism": "Uses vivid emotional language",
      "impact": "Makes threat seem more immediate and real"
    }
  ],
  "linguistic_manipulation": {
    "loaded_language": ["shocking", "devastate"],
    "false_urgency": [],
    "absolute_statements": ["everyone"]
  },
  "credibility_assessment": {
    "evidence_quality": "poor",
    "logical_fallacies": ["appeal to emotion"]
  },
  "psychological_analysis": {
    "target_audience": "General public",
    "persuasion_tactics": ["fear appeal", "social proof"],
    "vulnerability_exploitation": ["emotional vulnerability", "desire for belonging"]
  },
  "bias_analysis": {
    "ideological_bias": {
      "score": -20,
      "classification": "center-left",
      "evidence": ["emotional manipulation", "lack of evidence"]
    },
    "cultural_bias": {"present": false, "types": []},
    "source_bias": {
      "credibility_issues": ["No sources cited", "Emotional claims without evidence"]
    }
  },
  "entity_analysis": {"entities": []},
  "technique_explanations": {
    "success": true,
    "content": "This text uses fear-based propaganda techniques including appeal to fear and bandwagon effects. The word 'shocking' creates emotional impact while 'everyone' suggests universal agreement to pressure conformity."
  },
  "improvement_suggestions": {
    "success": true,
    "content": "To improve this text: 1) Remove emotionally charged words like 'shocking' and 'devastate', 2) Provide specific evidence instead of claiming universal impact, 3) Use neutral language and avoid absolute statements."
  },
  "media_literacy_insights": "This text demonstrates how emotional language can bypass critical thinking. Always ask: What evidence supports these claims? Who benefits from this emotional response?",
  "detailed_explanation": "This text shows high-risk propaganda characteristics with emotional manipulation techniques designed to trigger fear and social pressure. It lacks evidence and uses loaded language to bypass rational analysis."
}"#;

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalProvider;

impl LocalProvider {
    pub fn new() -> Self {
        Self
    }

    fn reply(prompt: &str) -> &'static str {
        let lower = prompt.to_lowercase();
        if lower.contains("comprehensive analysis") || lower.contains("propaganda") {
            CANNED_ANALYSIS
        } else {
            NEUTRAL_REPLY
        }
    }
}

#[async_trait]
impl Provider for LocalProvider {
    fn name(&self) -> &str {
        LOCAL_NAME
    }

    fn model(&self) -> &str {
        LOCAL_MODEL
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<Generation, ProviderError> {
        Ok(Generation {
            content: Self::reply(prompt).to_string(),
            tokens_used: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn analysis_prompt_gets_structured_reply() {
        let generation = LocalProvider::new()
            .generate("Perform a Comprehensive Analysis of this text", 100)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&generation.content).unwrap();
        assert_eq!(value["overall_risk_score"], 75);
        assert_eq!(value["propaganda_techniques"][1]["technique"], "Bandwagon");
    }

    #[tokio::test]
    async fn other_prompts_get_neutral_sentence() {
        let generation = LocalProvider::new().generate("hello", 100).await.unwrap();
        assert_eq!(generation.content, NEUTRAL_REPLY);
    }

    #[test]
    fn always_available() {
        assert!(LocalProvider.is_available());
        assert_eq!(LocalProvider.name(), "local");
    }
}
