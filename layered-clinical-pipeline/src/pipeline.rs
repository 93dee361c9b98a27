//! The document pipeline: tokenization, candidate generation, conflict
//! resolution and context assertion, in that order.

use std::sync::Arc;

use layered_clinical::{Candidate, ConflictResolver, Entity, Span, TokenIndex};
use layered_context::{ContextEngine, RuleTable};
use tracing::{debug, info, info_span, warn};

use crate::{
    AnnotatedDocument, CandidateSource, PipelineConfig, PipelineError, PipelineResult, RuleTokenizer,
    Stage, Tokenizer, Warning,
};

/// Processes documents end to end.
///
/// Soft errors from any stage become [`Warning`]s on the output document and
/// processing carries on, unless `fail_on_error` is set, in which case the
/// first one aborts the document.
pub struct Pipeline {
    tokenizer: Box<dyn Tokenizer>,
    sources: Vec<Box<dyn CandidateSource>>,
    resolver: ConflictResolver,
    engine: ContextEngine,
    fail_on_error: bool,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("sources", &self.source_names())
            .field("rules", &self.engine.table().len())
            .field("fail_on_error", &self.fail_on_error)
            .finish()
    }
}

/// Collects warnings for one document, escalating when asked to.
struct WarningLog<'d> {
    doc_id: &'d str,
    fail_on_error: bool,
    warnings: Vec<Warning>,
}

impl<'d> WarningLog<'d> {
    fn record(&mut self, stage: Stage, message: impl Into<String>) -> PipelineResult<()> {
        let warning = Warning::new(stage, message);
        warn!(doc_id = self.doc_id, stage = %warning.stage, message = %warning.message, "soft error");
        if self.fail_on_error {
            return Err(PipelineError::Escalated {
                doc_id: self.doc_id.to_string(),
                warning,
            });
        }
        self.warnings.push(warning);
        Ok(())
    }
}

/// Index of the sentence containing `span`, if any.
fn sentence_of(sentences: &[TokenIndex], span: Span) -> Option<usize> {
    let after = sentences.partition_point(|index| index.sentence().start <= span.start);
    let candidate = after.checked_sub(1)?;
    sentences[candidate]
        .sentence()
        .contains(&span)
        .then_some(candidate)
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Default tokenizer, clinical dictionary and clinical cue rules.
    pub fn clinical() -> PipelineResult<Self> {
        Self::from_config(&PipelineConfig::default())
    }

    pub fn from_config(config: &PipelineConfig) -> PipelineResult<Self> {
        let mut builder = Self::builder()
            .tokenizer(RuleTokenizer::new().with_custom_abbreviations(&config.abbreviations))
            .rule_table(Arc::new(config.rule_table()?))
            .fail_on_error(config.fail_on_error);
        if let Some(dictionary) = config.dictionary.source() {
            builder = builder.source(dictionary);
        }
        builder.build()
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    pub fn rule_table(&self) -> &Arc<RuleTable> {
        self.engine.table()
    }

    /// Annotate one document.
    pub fn process(&self, doc_id: impl Into<String>, text: &str) -> PipelineResult<AnnotatedDocument> {
        let doc_id = doc_id.into();
        let span = info_span!("process_document", doc_id = %doc_id);
        let _entered = span.enter();

        let mut log = WarningLog {
            doc_id: &doc_id,
            fail_on_error: self.fail_on_error,
            warnings: Vec::new(),
        };

        let sentences = self.tokenize(text, &mut log)?;
        let candidates = self.generate_candidates(text, &mut log)?;
        let entities = self.resolve(text, candidates, &mut log)?;
        let entities = self.assert_context(text, entities, &sentences, &mut log)?;

        debug!(
            sentences = sentences.len(),
            entities = entities.len(),
            warnings = log.warnings.len(),
            "processed document"
        );

        let warnings = log.warnings;
        Ok(AnnotatedDocument {
            doc_id,
            text: text.to_string(),
            sentences: sentences.iter().map(TokenIndex::sentence).collect(),
            entities,
            warnings,
        })
    }

    /// Annotate several documents, naming them `doc_0`, `doc_1`, ...
    pub fn process_batch<I, S>(&self, texts: I) -> PipelineResult<Vec<AnnotatedDocument>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| self.process(format!("doc_{}", i), text.as_ref()))
            .collect()
    }

    fn tokenize(&self, text: &str, log: &mut WarningLog<'_>) -> PipelineResult<Vec<TokenIndex>> {
        let mut sentences: Vec<TokenIndex> = Vec::new();
        for raw in self.tokenizer.tokenize(text) {
            if let Some(last) = sentences.last().map(TokenIndex::sentence) {
                if raw.span.start < last.end {
                    log.record(
                        Stage::Tokenization,
                        format!("sentence {} overlaps sentence {}", raw.span, last),
                    )?;
                    continue;
                }
            }
            if let Err(err) = raw.span.validate(text) {
                log.record(Stage::Tokenization, err.to_string())?;
                continue;
            }
            match TokenIndex::new(raw.span, raw.tokens) {
                Ok(index) => sentences.push(index),
                Err(err) => log.record(Stage::Tokenization, err.to_string())?,
            }
        }
        debug!(sentences = sentences.len(), "tokenized");
        Ok(sentences)
    }

    fn generate_candidates(&self, text: &str, log: &mut WarningLog<'_>) -> PipelineResult<Vec<Candidate>> {
        let mut candidates = Vec::new();
        for source in &self.sources {
            match source.candidates(text) {
                Ok(found) => {
                    debug!(source = source.name(), candidates = found.len(), "generated candidates");
                    candidates.extend(found);
                }
                Err(err) => log.record(Stage::CandidateGeneration, err.to_string())?,
            }
        }
        Ok(candidates)
    }

    fn resolve(
        &self,
        text: &str,
        candidates: Vec<Candidate>,
        log: &mut WarningLog<'_>,
    ) -> PipelineResult<Vec<Entity>> {
        let resolution = self.resolver.resolve(text, candidates);
        for rejected in &resolution.rejected {
            log.record(Stage::ConflictResolution, rejected.to_string())?;
        }
        Ok(resolution.entities)
    }

    /// Entities come back in the order they went in. Entities outside every
    /// sentence keep the default assertion.
    fn assert_context(
        &self,
        text: &str,
        entities: Vec<Entity>,
        sentences: &[TokenIndex],
        log: &mut WarningLog<'_>,
    ) -> PipelineResult<Vec<Entity>> {
        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); sentences.len()];
        let mut annotated: Vec<Entity> = Vec::with_capacity(entities.len());

        for (position, entity) in entities.iter().enumerate() {
            match sentence_of(sentences, entity.span) {
                Some(sentence) => groups[sentence].push(position),
                None => log.record(
                    Stage::ContextAssertion,
                    format!("entity {} is not inside any sentence", entity.span),
                )?,
            }
            annotated.push(entity.annotated(Default::default()));
        }

        for (index, positions) in sentences.iter().zip(&groups) {
            if positions.is_empty() {
                continue;
            }
            let members: Vec<Entity> = positions.iter().map(|&p| entities[p].clone()).collect();
            let outcome = self.engine.assert_context(text, &members, index);
            for err in &outcome.errors {
                log.record(Stage::ContextAssertion, err.to_string())?;
            }
            for (&position, (entity, _)) in positions.iter().zip(outcome.annotated) {
                annotated[position] = entity;
            }
        }

        Ok(annotated)
    }
}

/// Builder for [`Pipeline`].
///
/// Defaults to a [`RuleTokenizer`], no candidate sources, the clinical cue
/// rules, and `fail_on_error` off.
#[derive(Default)]
pub struct PipelineBuilder {
    tokenizer: Option<Box<dyn Tokenizer>>,
    sources: Vec<Box<dyn CandidateSource>>,
    rule_table: Option<Arc<RuleTable>>,
    fail_on_error: bool,
}

impl PipelineBuilder {
    pub fn tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Some(Box::new(tokenizer));
        self
    }

    /// Add a candidate source; sources run in the order they are added.
    pub fn source(mut self, source: impl CandidateSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn rule_table(mut self, table: Arc<RuleTable>) -> Self {
        self.rule_table = Some(table);
        self
    }

    pub fn fail_on_error(mut self, fail_on_error: bool) -> Self {
        self.fail_on_error = fail_on_error;
        self
    }

    /// Fails only when the clinical cue rules are needed and do not build.
    pub fn build(self) -> PipelineResult<Pipeline> {
        let table = match self.rule_table {
            Some(table) => table,
            None => Arc::new(RuleTable::clinical_defaults()?),
        };
        let pipeline = Pipeline {
            tokenizer: self
                .tokenizer
                .unwrap_or_else(|| Box::new(RuleTokenizer::new())),
            sources: self.sources,
            resolver: ConflictResolver::default(),
            engine: ContextEngine::new(table),
            fail_on_error: self.fail_on_error,
        };
        info!(
            sources = ?pipeline.source_names(),
            rules = pipeline.engine.table().len(),
            fail_on_error = pipeline.fail_on_error,
            "built pipeline"
        );
        Ok(pipeline)
    }
}
