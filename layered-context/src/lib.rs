//! Cue-based context assertion for resolved clinical entities.
//!
//! A [`RuleTable`] holds compiled cue rules (negation, uncertainty, family,
//! historical and hypothetical cues, plus terminators). The
//! [`ContextEngine`] scans one sentence at a time and decides an
//! [`Assertion`](layered_clinical::Assertion) for every entity in it.
//!
//! ```
//! use layered_clinical::{resolve, Candidate, Polarity, Span, TokenIndex};
//! use layered_context::{assert_context, build_rule_table, CueCategory, CueRuleDef, Direction};
//!
//! let text = "Patient denies chest pain.";
//! let entities = resolve(text, vec![Candidate::new(Span::new(15, 25), "sign_symptom", 0.9, 1)]).entities;
//! let tokens = TokenIndex::new(
//!     Span::new(0, 26),
//!     vec![Span::new(0, 7), Span::new(8, 14), Span::new(15, 20), Span::new(21, 25), Span::new(25, 26)],
//! )
//! .unwrap();
//! let table = build_rule_table(vec![CueRuleDef::literal(
//!     "denies",
//!     CueCategory::Negation,
//!     Direction::Forward,
//!     5,
//! )])
//! .unwrap();
//!
//! let outcome = assert_context(text, &entities, &tokens, &table);
//! assert_eq!(outcome.annotated[0].1.polarity, Polarity::Negated);
//! ```

mod cue_rule;
mod engine;
mod errors;
mod lexicon;
mod rule_table;
mod scanner;

pub use cue_rule::{
    AssertionAttribute, CueCategory, CuePattern, CueRule, CueRuleDef, Direction, DEFAULT_MAX_SCOPE,
};
pub use engine::{assert_context, ContextEngine, ContextOutcome, CueMatch, Explanation};
pub use errors::{ConfigResult, ConfigurationError};
pub use lexicon::clinical_rule_defs;
pub use rule_table::{build_rule_table, RuleFile, RuleTable};
pub use scanner::{FoundCue, SentenceCues};
