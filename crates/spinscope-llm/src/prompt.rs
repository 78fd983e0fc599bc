//! Prompt templates for the external analysis.

/// Tokens requested for the single comprehensive call.
pub const ANALYSIS_MAX_TOKENS: u32 = 2000;
pub const COMPARISON_MAX_TOKENS: u32 = 1000;

/// Characters of each text quoted in the comparison prompt.
const EXCERPT_CHARS: usize = 200;

// ── Prompt templates ──

const ANALYSIS_SCHEMA: &str = r#"{
  "overall_risk_score": <0-100>,
  "risk_level": "<low|medium|high>",
  "emotional_intensity": <0-100>,
  "urgency_score": <0-100>,
  "ideological_bias": <-100 to +100>,
  "propaganda_techniques": [
    {
      "technique": "<name>",
      "confidence": <0-1>,
      "evidence": "<words found>",
      "psychological_impact": "<brief explanation>"
    }
  ],
  "emotional_triggers": [
    {
      "trigger_type": "<fear|anger|pride|urgency>",
      "intensity": "<high|medium|low>",
      "evidence": "<examples>"
    }
  ],
  "cognitive_biases_exploited": [
    {
      "bias": "<confirmation bias|availability heuristic|etc>",
      "mechanism": "<how it's exploited>",
      "impact": "<psychological effect>"
    }
  ],
  "linguistic_manipulation": {
    "loaded_language": ["word1", "word2"],
    "false_urgency": ["phrase1"],
    "absolute_statements": ["statement1"]
  },
  "credibility_assessment": {
    "evidence_quality": "<poor|fair|good|excellent>",
    "logical_fallacies": ["fallacy1"]
  },
  "psychological_analysis": {
    "target_audience": "<who this aims to influence>",
    "persuasion_tactics": ["<list of tactics>"],
    "vulnerability_exploitation": ["<what vulnerabilities are targeted>"]
  },
  "bias_analysis": {
    "ideological_bias": {
      "score": <-100 to +100>,
      "classification": "<political classification>",
      "evidence": ["<specific examples>"]
    },
    "cultural_bias": {
      "present": <true|false>,
      "types": ["<cultural assumptions>"]
    },
    "source_bias": {
      "credibility_issues": ["<problems with sources>"]
    }
  },
  "entity_analysis": {
    "entities": [
      {
        "entity": "<name>",
        "type": "<PERSON|ORG|LOCATION>",
        "sentiment_context": "<positive|negative|neutral>",
        "framing_analysis": "<how presented>"
      }
    ]
  },
  "technique_explanations": {
    "success": true,
    "content": "<educational explanations of detected techniques and how to recognize them>"
  },
  "improvement_suggestions": {
    "success": true,
    "content": "<specific suggestions for making the text more neutral and factual>"
  },
  "media_literacy_insights": "<insights for building critical thinking skills>",
  "detailed_explanation": "<comprehensive 3-4 sentence summary of findings>"
}"#;

/// One prompt asking for every analysis component as a single JSON object.
pub fn comprehensive_analysis(text: &str) -> String {
    format!(
        "Perform a comprehensive analysis of this text for propaganda, bias, and manipulation. \
         Include ALL analysis components in a single JSON response.\n\
         \n\
         TEXT: \"{text}\"\n\
         \n\
         Respond with ONLY this JSON structure - no additional text:\n\
         \n\
         {schema}\n",
        text = text.replace('"', "\\\""),
        schema = ANALYSIS_SCHEMA,
    )
}

const COMPARISON_SCHEMA: &str = r#"{
  "overall_comparison": "<summary of key differences>",
  "manipulation_ranking": ["<texts ranked by manipulation level>"],
  "common_techniques": ["<techniques used across multiple texts>"],
  "unique_patterns": ["<distinctive manipulation patterns>"],
  "audience_targeting": "<how different texts target different audiences>",
  "sophistication_analysis": "<comparison of manipulation sophistication>",
  "recommendations": "<which texts are most/least trustworthy and why>"
}"#;

/// One prompt comparing labelled texts, each quoted as a short excerpt.
pub fn comparative_analysis(entries: &[(&str, &str)]) -> String {
    let listing = entries
        .iter()
        .enumerate()
        .map(|(i, (label, text))| {
            let excerpt: String = text.chars().take(EXCERPT_CHARS).collect();
            format!("{}. {label}: \"{}...\"", i + 1, excerpt.replace('"', "\\\""))
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Compare these {count} texts for propaganda techniques, bias, and manipulation tactics.\n\
         \n\
         TEXTS TO COMPARE:\n\
         {listing}\n\
         \n\
         Respond with ONLY this JSON structure - no additional text:\n\
         \n\
         {schema}\n\
         \n\
         Focus on providing actionable insights for media literacy.\n",
        count = entries.len(),
        schema = COMPARISON_SCHEMA,
    )
}
