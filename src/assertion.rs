//! Contextual attributes attached to a resolved entity.

use serde::{Deserialize, Serialize};

/// Whether the entity is affirmed or denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Polarity {
    #[default]
    Positive,
    Negated,
}

/// Whether the entity is stated or only suspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Uncertainty {
    #[default]
    Certain,
    Uncertain,
}

/// When the entity applies relative to the encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Temporality {
    #[default]
    Present,
    /// Historical mention ("history of", "status post")
    Past,
    /// Hypothetical or conditional mention ("if", "risk of")
    Future,
}

/// Who the entity is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Experiencer {
    #[default]
    Patient,
    Family,
    Other,
}

/// The full set of contextual attributes for one entity.
///
/// The default value is what an entity gets when no cue applies to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Assertion {
    pub polarity: Polarity,
    pub uncertainty: Uncertainty,
    pub temporality: Temporality,
    pub experiencer: Experiencer,
}

impl Assertion {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Compact form listing only the attributes that differ from the default,
/// e.g. `Assertion(Negated, Past)`, or `Assertion()` for the default.
impl std::fmt::Display for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if self.polarity != Polarity::default() {
            parts.push(format!("{:?}", self.polarity));
        }
        if self.uncertainty != Uncertainty::default() {
            parts.push(format!("{:?}", self.uncertainty));
        }
        if self.temporality != Temporality::default() {
            parts.push(format!("{:?}", self.temporality));
        }
        if self.experiencer != Experiencer::default() {
            parts.push(format!("{:?}", self.experiencer));
        }
        write!(f, "Assertion({})", parts.join(", "))
    }
}
