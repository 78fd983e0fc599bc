//! Evidence assembly: technique findings and emotional triggers from a signal bundle.

use serde::{Deserialize, Serialize};

use crate::lexicon::{Group, Lexicon, Tier, display_name};
use crate::signals::SignalBundle;
use crate::types::{Span, TechniqueFinding};

/// One trigger keyword with its psychological rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub trigger: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<Tier>,
    pub impact: String,
    pub positions: Vec<Span>,
}

/// The four emotional-trigger groups used by the combination bonus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionalTriggers {
    pub fear_appeals: Vec<Trigger>,
    pub urgency_markers: Vec<Trigger>,
    pub emotional_language: Vec<Trigger>,
    pub psychological_pressure: Vec<Trigger>,
}

impl EmotionalTriggers {
    /// How many of the four groups have at least one trigger.
    pub fn active_groups(&self) -> usize {
        [
            &self.fear_appeals,
            &self.urgency_markers,
            &self.emotional_language,
            &self.psychological_pressure,
        ]
        .iter()
        .filter(|g| !g.is_empty())
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_groups() == 0
    }
}

/// One finding per matched technique keyword, fixed confidence.
pub fn detect_techniques(lexicon: &Lexicon, bundle: &SignalBundle) -> Vec<TechniqueFinding> {
    let mut findings = Vec::new();

    for category in lexicon.group(Group::Technique) {
        for keyword in bundle.distinct_keywords(&category.name) {
            findings.push(TechniqueFinding {
                technique: display_name(&category.name),
                evidence: keyword.to_string(),
                confidence: TechniqueFinding::DEFAULT_CONFIDENCE,
                positions: bundle.positions(&category.name, keyword),
                psychological_impact: None,
            });
        }
    }

    findings
}

/// Group matched trigger keywords by the pressure they apply.
pub fn emotional_triggers(lexicon: &Lexicon, bundle: &SignalBundle) -> EmotionalTriggers {
    let mut triggers = EmotionalTriggers::default();

    for category in lexicon.categories() {
        let target = match category.group {
            Group::FearTrigger => &mut triggers.fear_appeals,
            Group::Urgency => &mut triggers.urgency_markers,
            Group::Emotional => &mut triggers.emotional_language,
            Group::Absolute => &mut triggers.psychological_pressure,
            _ => continue,
        };

        for keyword in bundle.distinct_keywords(&category.name) {
            target.push(Trigger {
                trigger: keyword.to_string(),
                intensity: category.tier,
                impact: impact(category.group, category.tier),
                positions: bundle.positions(&category.name, keyword),
            });
        }
    }

    triggers
}

fn impact(group: Group, tier: Option<Tier>) -> String {
    let level = tier.map(|t| t.as_str()).unwrap_or("general");
    match group {
        Group::FearTrigger => "Exploits anxiety and threat perception".to_string(),
        Group::Urgency => format!("Creates {level} pressure for immediate action"),
        Group::Emotional => format!("Bypasses rational thinking with {level} emotional appeal"),
        Group::Absolute => "Uses absolute statements to discourage critical thinking".to_string(),
        _ => String::new(),
    }
}
