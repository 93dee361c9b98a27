//! Finding cue matches inside one sentence.

use layered_clinical::{Span, TokenIndex, TokenRange};

use crate::{CueRule, RuleTable};

/// One occurrence of a cue rule in a sentence.
#[derive(Debug, Clone, Copy)]
pub struct FoundCue<'t> {
    pub rule: &'t CueRule,
    /// Position of `rule` in its table; the last tie-breaker.
    pub rule_index: usize,
    pub span: Span,
    pub tokens: TokenRange,
}

impl<'t> FoundCue<'t> {
    pub fn is_terminator(&self) -> bool {
        self.rule.is_terminator()
    }
}

/// Every cue occurrence in one sentence, in text order.
#[derive(Debug, Clone, Default)]
pub struct SentenceCues<'t> {
    cues: Vec<FoundCue<'t>>,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// A match is whole-word unless it starts or ends in the middle of a word.
fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let matched = &text[start..end];
    let starts_in_word = matched.chars().next().map_or(false, is_word_char)
        && text[..start].chars().next_back().map_or(false, is_word_char);
    let ends_in_word = matched.chars().next_back().map_or(false, is_word_char)
        && text[end..].chars().next().map_or(false, is_word_char);
    !starts_in_word && !ends_in_word
}

fn next_char_boundary(text: &str, at: usize) -> usize {
    text[at..]
        .chars()
        .next()
        .map_or(text.len(), |c| at + c.len_utf8())
}

impl<'t> SentenceCues<'t> {
    /// Scan the sentence covered by `index` for every rule in `table`.
    ///
    /// Matches are restricted to the sentence text, so a cue can never reach
    /// into a neighbouring sentence. Matches that no token covers are
    /// skipped. Nested matches ("no" inside "no evidence of") are all kept;
    /// the engine picks the closest one per entity.
    pub fn scan(text: &str, index: &TokenIndex, table: &'t RuleTable) -> Self {
        let sentence = index.sentence();
        let sentence_text = match sentence.text(text) {
            Some(sentence_text) => sentence_text,
            None => return Self::default(),
        };

        let mut cues: Vec<FoundCue<'t>> = Vec::new();
        for (rule_index, rule) in table.rules().iter().enumerate() {
            let mut at = 0;
            while at <= sentence_text.len() {
                let found = match rule.matcher().find_at(sentence_text, at) {
                    Some(found) => found,
                    None => break,
                };

                if found.start() == found.end() {
                    if found.end() >= sentence_text.len() {
                        break;
                    }
                    at = next_char_boundary(sentence_text, found.end());
                    continue;
                }

                if !is_whole_word(sentence_text, found.start(), found.end()) {
                    at = next_char_boundary(sentence_text, found.start());
                    continue;
                }

                let span = Span::new(sentence.start + found.start(), sentence.start + found.end());
                match index.covering(span) {
                    Some(tokens) => cues.push(FoundCue {
                        rule,
                        rule_index,
                        span,
                        tokens,
                    }),
                    None => tracing::debug!(%span, "cue match has no covering token"),
                }
                at = found.end();
            }
        }

        cues.sort_by_key(|cue| (cue.span.start, cue.span.end, cue.rule_index));

        Self { cues }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FoundCue<'t>> {
        self.cues.iter()
    }

    /// Cues that set an attribute.
    pub fn attribute_cues(&self) -> impl Iterator<Item = &FoundCue<'t>> {
        self.cues.iter().filter(|cue| cue.rule.category().is_some())
    }

    pub fn terminators(&self) -> impl Iterator<Item = &FoundCue<'t>> {
        self.cues.iter().filter(|cue| cue.is_terminator())
    }

    /// True when a terminator lies strictly between `earlier` and `later`.
    pub fn blocked(&self, earlier: &TokenRange, later: &TokenRange) -> bool {
        self.terminators()
            .any(|terminator| terminator.tokens.is_between(earlier, later))
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}
