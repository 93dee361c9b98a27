//! Context assertion: deciding polarity, uncertainty, temporality and
//! experiencer for each resolved entity.
//!
//! For every entity the engine looks at the cues found in its sentence and
//! keeps those whose scope reaches it:
//!
//! - a forward cue must end before the entity, a backward cue must start
//!   after it, a bidirectional cue may do either
//! - the token distance between the facing edges must be `<= max_scope`
//!   (adjacent tokens are one apart)
//! - no terminator may sit strictly between cue and entity
//! - a cue overlapping the entity never applies to it
//!
//! Within each attribute the closest cue wins, then the earliest-starting,
//! then the one listed first in the rule table.

use std::sync::Arc;

use layered_clinical::{
    Assertion, Entity, Experiencer, Polarity, Span, SpanDisplay, Temporality, TokenAlignmentError,
    TokenIndex, TokenRange, Uncertainty,
};
use serde::Serialize;

use crate::scanner::{FoundCue, SentenceCues};
use crate::{AssertionAttribute, CueCategory, CueRule, RuleTable};

/// A cue occurrence that reaches a particular entity.
#[derive(Debug, Clone, Copy)]
pub struct CueMatch<'t> {
    pub rule: &'t CueRule,
    pub rule_index: usize,
    pub span: Span,
    pub distance_tokens: usize,
}

impl<'t> CueMatch<'t> {
    fn from_found(found: &FoundCue<'t>, distance_tokens: usize) -> Self {
        Self {
            rule: found.rule,
            rule_index: found.rule_index,
            span: found.span,
            distance_tokens,
        }
    }

    fn precedence_key(&self) -> (usize, usize, usize) {
        (self.distance_tokens, self.span.start, self.rule_index)
    }

    /// Category of the rule; always present for a winning cue.
    pub fn category(&self) -> Option<CueCategory> {
        self.rule.category()
    }
}

/// The winning cue for each attribute of one entity.
#[derive(Debug, Clone, Default)]
pub struct Explanation<'t> {
    pub polarity: Option<CueMatch<'t>>,
    pub uncertainty: Option<CueMatch<'t>>,
    pub temporality: Option<CueMatch<'t>>,
    pub experiencer: Option<CueMatch<'t>>,
}

impl<'t> Explanation<'t> {
    fn slot_mut(&mut self, attribute: AssertionAttribute) -> &mut Option<CueMatch<'t>> {
        match attribute {
            AssertionAttribute::Polarity => &mut self.polarity,
            AssertionAttribute::Uncertainty => &mut self.uncertainty,
            AssertionAttribute::Temporality => &mut self.temporality,
            AssertionAttribute::Experiencer => &mut self.experiencer,
        }
    }

    fn offer(&mut self, category: CueCategory, candidate: CueMatch<'t>) {
        let slot = self.slot_mut(category.attribute());
        let replace = match slot {
            Some(current) => candidate.precedence_key() < current.precedence_key(),
            None => true,
        };
        if replace {
            *slot = Some(candidate);
        }
    }

    /// Winning cues in attribute order.
    pub fn winners(&self) -> impl Iterator<Item = (AssertionAttribute, &CueMatch<'t>)> {
        [
            (AssertionAttribute::Polarity, self.polarity.as_ref()),
            (AssertionAttribute::Uncertainty, self.uncertainty.as_ref()),
            (AssertionAttribute::Temporality, self.temporality.as_ref()),
            (AssertionAttribute::Experiencer, self.experiencer.as_ref()),
        ]
        .into_iter()
        .filter_map(|(attribute, winner)| winner.map(|w| (attribute, w)))
    }

    /// The assertion these winners imply; attributes without a winner keep
    /// their default.
    pub fn assertion(&self) -> Assertion {
        let mut assertion = Assertion::default();
        if self.polarity.is_some() {
            assertion.polarity = Polarity::Negated;
        }
        if self.uncertainty.is_some() {
            assertion.uncertainty = Uncertainty::Uncertain;
        }
        if let Some(category) = self.temporality.and_then(|w| w.category()) {
            assertion.temporality = match category {
                CueCategory::Hypothetical => Temporality::Future,
                _ => Temporality::Past,
            };
        }
        if self.experiencer.is_some() {
            assertion.experiencer = Experiencer::Family;
        }
        assertion
    }
}

/// Entities annotated with their assertions, plus alignment failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContextOutcome {
    /// One entry per input entity, in input order. The entity is an annotated
    /// copy carrying the same assertion.
    pub annotated: Vec<(Entity, Assertion)>,
    /// Entities that could not be aligned; they carry the default assertion.
    pub errors: Vec<TokenAlignmentError>,
}

fn attribute_name(attribute: AssertionAttribute) -> &'static str {
    match attribute {
        AssertionAttribute::Polarity => "polarity",
        AssertionAttribute::Uncertainty => "uncertainty",
        AssertionAttribute::Temporality => "temporality",
        AssertionAttribute::Experiencer => "experiencer",
    }
}

/// Token distance from `cue` to an entity if the cue's scope reaches it.
fn reach(
    cue: &FoundCue<'_>,
    entity: Span,
    entity_tokens: &TokenRange,
    cues: &SentenceCues<'_>,
) -> Option<usize> {
    let rule = cue.rule;

    if rule.direction().looks_forward() && cue.span.end <= entity.start {
        return cue
            .tokens
            .distance_to(entity_tokens)
            .filter(|distance| *distance <= rule.max_scope())
            .filter(|_| !cues.blocked(&cue.tokens, entity_tokens));
    }

    if rule.direction().looks_backward() && cue.span.start >= entity.end {
        return entity_tokens
            .distance_to(&cue.tokens)
            .filter(|distance| *distance <= rule.max_scope())
            .filter(|_| !cues.blocked(entity_tokens, &cue.tokens));
    }

    None
}

fn explain_in<'t>(
    cues: &SentenceCues<'t>,
    entity: Span,
    index: &TokenIndex,
) -> Result<Explanation<'t>, TokenAlignmentError> {
    let entity_tokens = index.align(entity)?;
    let mut explanation = Explanation::default();

    for cue in cues.attribute_cues() {
        if cue.span.overlaps(&entity) {
            continue;
        }
        let category = match cue.rule.category() {
            Some(category) => category,
            None => continue,
        };
        if let Some(distance) = reach(cue, entity, &entity_tokens, cues) {
            explanation.offer(category, CueMatch::from_found(cue, distance));
        }
    }

    Ok(explanation)
}

/// Annotate the entities of one sentence.
///
/// `text` is the whole document; `index` selects the sentence. Entities
/// that cannot be aligned to the sentence's tokens keep the default
/// assertion and their error is returned alongside.
pub fn assert_context(
    text: &str,
    entities: &[Entity],
    index: &TokenIndex,
    table: &RuleTable,
) -> ContextOutcome {
    let cues = SentenceCues::scan(text, index, table);
    let mut outcome = ContextOutcome::default();

    for entity in entities {
        let assertion = match explain_in(&cues, entity.span, index) {
            Ok(explanation) => explanation.assertion(),
            Err(err) => {
                outcome.errors.push(err);
                Assertion::default()
            }
        };
        outcome.annotated.push((entity.annotated(assertion), assertion));
    }

    tracing::debug!(
        sentence = %index.sentence(),
        entities = entities.len(),
        cues = cues.len(),
        misaligned = outcome.errors.len(),
        "asserted sentence context"
    );

    outcome
}

/// Context assertion over a shared rule table.
#[derive(Debug, Clone)]
pub struct ContextEngine {
    table: Arc<RuleTable>,
}

impl ContextEngine {
    pub fn new(table: Arc<RuleTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<RuleTable> {
        &self.table
    }

    /// See [`assert_context`].
    pub fn assert_context(&self, text: &str, entities: &[Entity], index: &TokenIndex) -> ContextOutcome {
        assert_context(text, entities, index, &self.table)
    }

    /// The winning cue behind each attribute of `entity`.
    pub fn explain(
        &self,
        text: &str,
        entity: &Entity,
        index: &TokenIndex,
    ) -> Result<Explanation<'_>, TokenAlignmentError> {
        let cues = SentenceCues::scan(text, index, &self.table);
        explain_in(&cues, entity.span, index)
    }

    /// Render the sentence with its entities, their assertions and the cues
    /// that decided them.
    pub fn display<'a>(&self, text: &'a str, entities: &[Entity], index: &TokenIndex) -> SpanDisplay<'a> {
        let cues = SentenceCues::scan(text, index, &self.table);
        let mut display = SpanDisplay::new(text, index.sentence());

        let explained: Vec<(&Entity, Option<Explanation<'_>>)> = entities
            .iter()
            .map(|entity| (entity, explain_in(&cues, entity.span, index).ok()))
            .collect();

        let mut cue_spans: Vec<(Span, CueCategory)> = explained
            .iter()
            .filter_map(|(_, explanation)| explanation.as_ref())
            .flat_map(|explanation| explanation.winners())
            .filter_map(|(_, winner)| winner.category().map(|c| (winner.span, c)))
            .collect();
        cue_spans.sort_by_key(|(span, _)| *span);
        cue_spans.dedup_by_key(|(span, _)| *span);

        for (span, category) in cue_spans {
            display.include(span, format!("{:?}", category));
        }

        for (entity, explanation) in explained {
            let assertion = explanation
                .as_ref()
                .map(Explanation::assertion)
                .unwrap_or_default();
            let links: Vec<(&'static str, Span)> = explanation
                .iter()
                .flat_map(|explanation| explanation.winners())
                .map(|(attribute, winner)| (attribute_name(attribute), winner.span))
                .collect();
            display.include_linked(entity.span, format!("{} {}", entity.label, assertion), links);
        }

        display
    }
}
