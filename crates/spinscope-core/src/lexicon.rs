//! Keyword lexicon: category → keyword tables used for pattern matching.
//!
//! Categories fall into groups: emotional intensity tiers, urgency tiers,
//! fear triggers, loaded language, absolutist terms, propaganda-technique
//! keyword sets, and two ideological-lean sets. The built-in lexicon is
//! constructed once and shared read-only for the process lifetime.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Intensity tier for tiered categories (emotional and urgency).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Subtle,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Subtle => "subtle",
        }
    }
}

/// What a category measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    Emotional,
    Urgency,
    FearTrigger,
    Loaded,
    Absolute,
    Technique,
    LeanLeft,
    LeanRight,
}

/// A single lexicon category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub group: Group,
    pub tier: Option<Tier>,
    /// Lower-case keywords, in declaration order.
    pub keywords: Vec<String>,
}

impl Category {
    pub fn new(name: &str, group: Group, tier: Option<Tier>, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            group,
            tier,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

/// Ordered collection of categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    categories: Vec<Category>,
}

// ── Category names ──

pub const EMOTIONAL_HIGH: &str = "emotional_high";
pub const EMOTIONAL_MEDIUM: &str = "emotional_medium";
pub const EMOTIONAL_SUBTLE: &str = "emotional_subtle";
pub const URGENCY_HIGH: &str = "urgency_high";
pub const URGENCY_MEDIUM: &str = "urgency_medium";
pub const URGENCY_SUBTLE: &str = "urgency_subtle";
pub const FEAR_TRIGGERS: &str = "fear_triggers";
pub const LOADED: &str = "loaded";
pub const ABSOLUTE: &str = "absolute";
pub const LEAN_LEFT: &str = "lean_left";
pub const LEAN_RIGHT: &str = "lean_right";

static BUILTIN: LazyLock<Lexicon> = LazyLock::new(Lexicon::build_builtin);

impl Lexicon {
    /// Build a lexicon from explicit categories. Names must be unique; later
    /// duplicates are dropped.
    pub fn new(categories: Vec<Category>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let categories = categories
            .into_iter()
            .filter(|c| seen.insert(c.name.clone()))
            .collect();
        Self { categories }
    }

    /// The built-in lexicon, shared process-wide.
    pub fn builtin() -> &'static Lexicon {
        &BUILTIN
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Categories belonging to one group, in declaration order.
    pub fn group(&self, group: Group) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(move |c| c.group == group)
    }

    fn build_builtin() -> Self {
        use Group::*;

        Self::new(vec![
            Category::new(
                EMOTIONAL_HIGH,
                Emotional,
                Some(Tier::High),
                &[
                    "outrageous", "shocking", "devastating", "incredible", "unbelievable",
                    "terrifying", "catastrophic", "nightmare", "horrifying", "appalling",
                ],
            ),
            Category::new(
                EMOTIONAL_MEDIUM,
                Emotional,
                Some(Tier::Medium),
                &[
                    "concerning", "troubling", "alarming", "disturbing", "unsettling",
                    "worrying", "dangerous", "serious", "critical",
                ],
            ),
            Category::new(
                EMOTIONAL_SUBTLE,
                Emotional,
                Some(Tier::Subtle),
                &[
                    "questionable", "problematic", "unfortunate", "disappointing",
                    "misleading", "concerning", "notable",
                ],
            ),
            Category::new(
                URGENCY_HIGH,
                Urgency,
                Some(Tier::High),
                &[
                    "immediately", "urgent", "crisis", "emergency", "act now",
                    "time is running out", "before it's too late", "right now", "this instant",
                ],
            ),
            Category::new(
                URGENCY_MEDIUM,
                Urgency,
                Some(Tier::Medium),
                &[
                    "soon", "quickly", "don't delay", "limited time", "hurry", "fast",
                    "prompt action", "time-sensitive",
                ],
            ),
            Category::new(
                URGENCY_SUBTLE,
                Urgency,
                Some(Tier::Subtle),
                &[
                    "consider", "think about", "when convenient", "at your earliest",
                    "worth noting", "keep in mind",
                ],
            ),
            Category::new(
                FEAR_TRIGGERS,
                FearTrigger,
                None,
                &[
                    "threat", "danger", "risk", "harm", "damage", "destroy", "ruin",
                    "collapse", "failure", "loss", "attack", "invasion",
                ],
            ),
            Category::new(
                LOADED,
                Loaded,
                None,
                &[
                    "terrorist", "extremist", "radical", "dangerous", "threat", "enemy",
                    "traitor", "corrupt", "evil", "villain",
                ],
            ),
            Category::new(
                ABSOLUTE,
                Absolute,
                None,
                &[
                    "always", "never", "all", "none", "every", "completely", "totally",
                    "entirely", "absolutely", "definitely", "certainly",
                ],
            ),
            // Propaganda techniques.
            Category::new(
                "bandwagon",
                Technique,
                None,
                &[
                    "everyone", "popular", "trending", "majority", "most people",
                    "standing united", "unite", "together",
                ],
            ),
            Category::new(
                "fear_mongering",
                Technique,
                None,
                &[
                    "dangerous", "threat", "risk", "fear", "scared", "terrifying", "too late",
                    "before it's too late",
                ],
            ),
            Category::new(
                "strawman",
                Technique,
                None,
                &["claims that", "says that", "believes that", "thinks that"],
            ),
            Category::new(
                "loaded_language",
                Technique,
                None,
                &[
                    "devastating", "outrageous", "shocking", "incredible", "lies",
                    "hiding the truth", "expose",
                ],
            ),
            Category::new(
                "appeal_to_authority",
                Technique,
                None,
                &["experts say", "studies show", "research proves", "scientists agree"],
            ),
            Category::new(
                "conspiracy_theory",
                Technique,
                None,
                &[
                    "hiding", "cover up", "conspiracy", "truth",
                    "they don't want you to know",
                ],
            ),
            Category::new(
                "call_to_action",
                Technique,
                None,
                &["act now", "take action", "stand up", "fight back", "protect"],
            ),
            Category::new(
                "us_vs_them",
                Technique,
                None,
                &[
                    "our freedom", "our rights", "they", "them", "the government",
                    "establishment",
                ],
            ),
            // Ideological lean.
            Category::new(
                LEAN_LEFT,
                LeanLeft,
                None,
                &["progressive", "liberal", "equality", "social justice", "reform"],
            ),
            Category::new(
                LEAN_RIGHT,
                LeanRight,
                None,
                &["conservative", "traditional", "law and order", "free market", "patriot"],
            ),
        ])
    }
}

/// Human-readable technique name: `fear_mongering` → `Fear Mongering`.
pub fn display_name(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical technique key: lower-case, spaces and hyphens folded to `_`.
///
/// `"Fear Mongering"` and `"fear-mongering"` both become `fear_mongering`.
pub fn technique_key(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}
