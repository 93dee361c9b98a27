//! Cue rule definitions and their compiled form.

use regex::{Regex, RegexBuilder};
use regex_syntax::ParserBuilder;
use serde::{Deserialize, Serialize};

use crate::{ConfigResult, ConfigurationError};

/// Scope limit used when a rule definition omits `max_scope`.
pub const DEFAULT_MAX_SCOPE: usize = 10;

/// What a cue signals about the entities in its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueCategory {
    /// "denies", "no evidence of"
    Negation,
    /// "possible", "suspicious for"
    Uncertainty,
    /// "mother", "family history of"
    Family,
    /// "history of", "status post"
    Historical,
    /// "if", "risk of"
    Hypothetical,
}

/// The entity attribute a cue category decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssertionAttribute {
    Polarity,
    Uncertainty,
    Temporality,
    Experiencer,
}

impl CueCategory {
    pub fn attribute(&self) -> AssertionAttribute {
        match self {
            Self::Negation => AssertionAttribute::Polarity,
            Self::Uncertainty => AssertionAttribute::Uncertainty,
            Self::Family => AssertionAttribute::Experiencer,
            Self::Historical | Self::Hypothetical => AssertionAttribute::Temporality,
        }
    }
}

/// Which side of the cue its scope extends to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The cue precedes the entities it modifies ("denies fever").
    Forward,
    /// The cue follows the entities it modifies ("fever was ruled out").
    Backward,
    #[default]
    Bidirectional,
}

impl Direction {
    pub fn looks_forward(&self) -> bool {
        matches!(self, Self::Forward | Self::Bidirectional)
    }

    pub fn looks_backward(&self) -> bool {
        matches!(self, Self::Backward | Self::Bidirectional)
    }
}

fn default_max_scope() -> usize {
    DEFAULT_MAX_SCOPE
}

/// True when some match of `source` can be empty (`\b`, `x*`, `^`).
fn can_match_empty(source: &str) -> bool {
    match ParserBuilder::new().case_insensitive(true).build().parse(source) {
        Ok(hir) => hir.properties().minimum_len() == Some(0),
        Err(_) => false,
    }
}

/// A cue rule as written in configuration.
///
/// ```toml
/// [[rule]]
/// pattern = "denies"
/// category = "negation"
/// direction = "forward"
/// max_scope = 5
///
/// [[rule]]
/// pattern = "but"
/// terminator = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueRuleDef {
    pub pattern: String,
    /// Treat `pattern` as a regular expression instead of a literal phrase.
    #[serde(default)]
    pub regex: bool,
    /// `None` is only valid for terminators.
    #[serde(default)]
    pub category: Option<CueCategory>,
    #[serde(default)]
    pub direction: Direction,
    /// Maximum distance in tokens between cue and entity.
    #[serde(default = "default_max_scope")]
    pub max_scope: usize,
    /// Stops other cues from reaching across this one.
    #[serde(default)]
    pub terminator: bool,
}

impl CueRuleDef {
    /// A literal phrase cue.
    pub fn literal(
        pattern: impl Into<String>,
        category: CueCategory,
        direction: Direction,
        max_scope: usize,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            regex: false,
            category: Some(category),
            direction,
            max_scope,
            terminator: false,
        }
    }

    /// A regular-expression cue.
    pub fn regex(
        pattern: impl Into<String>,
        category: CueCategory,
        direction: Direction,
        max_scope: usize,
    ) -> Self {
        Self {
            regex: true,
            ..Self::literal(pattern, category, direction, max_scope)
        }
    }

    /// A literal phrase that only terminates other cues.
    pub fn terminator(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            regex: false,
            category: None,
            direction: Direction::Bidirectional,
            max_scope: DEFAULT_MAX_SCOPE,
            terminator: true,
        }
    }

    /// Compile this definition; `index` is its position in the rule list.
    pub fn compile(&self, index: usize) -> ConfigResult<CueRule> {
        if self.category.is_none() && !self.terminator {
            return Err(ConfigurationError::MissingCategory {
                index,
                pattern: self.pattern.clone(),
            });
        }
        if self.category.is_some() && self.max_scope == 0 {
            return Err(ConfigurationError::InvalidScope {
                index,
                pattern: self.pattern.clone(),
            });
        }

        let (pattern, source) = if self.regex {
            if self.pattern.trim().is_empty() {
                return Err(ConfigurationError::EmptyPattern { index });
            }
            (CuePattern::Regex(self.pattern.clone()), self.pattern.clone())
        } else {
            let words: Vec<String> = self
                .pattern
                .split_whitespace()
                .map(regex::escape)
                .collect();
            if words.is_empty() {
                return Err(ConfigurationError::EmptyPattern { index });
            }
            (
                CuePattern::Literal(self.pattern.split_whitespace().collect::<Vec<_>>().join(" ")),
                words.join(r"\s+"),
            )
        };

        let matcher = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|source| ConfigurationError::InvalidPattern {
                index,
                pattern: self.pattern.clone(),
                source,
            })?;

        if can_match_empty(&source) || matcher.is_match("") {
            return Err(ConfigurationError::MatchesEmpty {
                index,
                pattern: self.pattern.clone(),
            });
        }

        Ok(CueRule {
            pattern,
            category: self.category,
            direction: self.direction,
            max_scope: self.max_scope,
            is_terminator: self.terminator,
            matcher,
        })
    }
}

/// The text a rule looks for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CuePattern {
    /// Whitespace-normalized phrase; any run of whitespace matches between words.
    Literal(String),
    Regex(String),
}

impl CuePattern {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(s) | Self::Regex(s) => s,
        }
    }
}

/// A compiled, immutable cue rule.
#[derive(Debug, Clone)]
pub struct CueRule {
    pattern: CuePattern,
    category: Option<CueCategory>,
    direction: Direction,
    max_scope: usize,
    is_terminator: bool,
    matcher: Regex,
}

impl CueRule {
    pub fn pattern(&self) -> &CuePattern {
        &self.pattern
    }

    /// `None` for pure terminators.
    pub fn category(&self) -> Option<CueCategory> {
        self.category
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn max_scope(&self) -> usize {
        self.max_scope
    }

    pub fn is_terminator(&self) -> bool {
        self.is_terminator
    }

    /// Case-insensitive matcher for the pattern.
    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_matches_any_whitespace_run() {
        let rule = CueRuleDef::literal("no  evidence of", CueCategory::Negation, Direction::Forward, 6)
            .compile(0)
            .unwrap();
        assert_eq!(rule.pattern(), &CuePattern::Literal("no evidence of".to_string()));
        assert!(rule.matcher().is_match("No\nevidence   OF pneumonia"));
    }

    #[test]
    fn test_literal_escapes_regex_syntax() {
        let rule = CueRuleDef::literal("s/p", CueCategory::Historical, Direction::Forward, 6)
            .compile(0)
            .unwrap();
        assert!(rule.matcher().is_match("S/P appendectomy"));

        let rule = CueRuleDef::literal("(-)", CueCategory::Negation, Direction::Backward, 2)
            .compile(0)
            .unwrap();
        assert!(rule.matcher().is_match("strep (-)"));
    }

    #[test]
    fn test_invalid_regex_fails() {
        let err = CueRuleDef::regex("rule(s out", CueCategory::Negation, Direction::Forward, 5)
            .compile(3)
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPattern { index: 3, .. }));
    }

    #[test]
    fn test_regex_matching_empty_fails() {
        for pattern in ["(no)?", r"\b", r"x*\b", "(?m)^"] {
            let err = CueRuleDef::regex(pattern, CueCategory::Negation, Direction::Forward, 5)
                .compile(0)
                .unwrap_err();
            assert!(
                matches!(err, ConfigurationError::MatchesEmpty { .. }),
                "{:?} should be rejected",
                pattern
            );
        }

        let rule = CueRuleDef::regex(r"\bno\b", CueCategory::Negation, Direction::Forward, 5).compile(0);
        assert!(rule.is_ok());
    }

    #[test]
    fn test_blank_literal_fails() {
        let err = CueRuleDef::literal("   ", CueCategory::Negation, Direction::Forward, 5)
            .compile(0)
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::EmptyPattern { index: 0 }));
    }

    #[test]
    fn test_zero_scope_fails_unless_pure_terminator() {
        let err = CueRuleDef::literal("denies", CueCategory::Negation, Direction::Forward, 0)
            .compile(0)
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidScope { .. }));

        let terminator = CueRuleDef {
            max_scope: 0,
            ..CueRuleDef::terminator("but")
        };
        assert!(terminator.compile(0).is_ok());
    }

    #[test]
    fn test_missing_category_fails() {
        let def = CueRuleDef {
            terminator: false,
            ..CueRuleDef::terminator("but")
        };
        assert!(matches!(
            def.compile(1),
            Err(ConfigurationError::MissingCategory { index: 1, .. })
        ));
    }

    #[test]
    fn test_category_attributes() {
        assert_eq!(CueCategory::Negation.attribute(), AssertionAttribute::Polarity);
        assert_eq!(CueCategory::Historical.attribute(), AssertionAttribute::Temporality);
        assert_eq!(CueCategory::Hypothetical.attribute(), AssertionAttribute::Temporality);
        assert_eq!(CueCategory::Family.attribute(), AssertionAttribute::Experiencer);
    }
}
