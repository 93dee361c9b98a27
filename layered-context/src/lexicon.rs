//! Built-in clinical cue lexicon.

use crate::{CueCategory, CueRuleDef, Direction};

/// Negation cues that precede the negated finding.
const NEGATION_FORWARD: &[&str] = &[
    "no",
    "not",
    "denies",
    "denied",
    "negative",
    "negative for",
    "without",
    "absent",
    "free of",
    "ruled out",
    "rules out",
    "no evidence of",
    "no signs of",
    "no symptoms of",
    "unremarkable",
    "within normal limits",
    "wnl",
    "non-contributory",
    "non-significant",
    "insignificant",
    "never",
    "none",
    "neither",
    "nor",
    "nothing",
    "refuses",
    "declines",
    "declined",
    "unable to",
    "cannot",
    "fails to",
    "failed to",
    "no complaints of",
    "no history of",
    "no known",
    "nk",
    "nka",
    "nkda",
];

/// Negation cues that follow the negated finding ("fever was ruled out").
const NEGATION_BACKWARD: &[&str] = &[
    "is ruled out",
    "was ruled out",
    "are ruled out",
    "were ruled out",
    "is negative",
    "was negative",
    "are negative",
    "were negative",
    "is absent",
    "was absent",
    "are absent",
    "were absent",
    "is unlikely",
    "was unlikely",
    "are unlikely",
    "were unlikely",
];

const UNCERTAINTY: &[&str] = &[
    "possible",
    "possibly",
    "probable",
    "probably",
    "likely",
    "may be",
    "might be",
    "could be",
    "suggest",
    "suggests",
    "suggestive of",
    "consistent with",
    "compatible with",
    "suspicious for",
    "suspect",
    "suspected",
    "questionable",
    "unclear",
    "uncertain",
    "undetermined",
    "rule out",
    "consider",
    "considering",
    "differential",
    "appears",
    "seems",
    "looks like",
    "impression of",
];

const FAMILY: &[&str] = &[
    "family history",
    "family hx",
    "fh",
    "familial",
    "hereditary",
    "mother",
    "father",
    "parent",
    "parents",
    "sibling",
    "sister",
    "brother",
    "grandmother",
    "grandfather",
    "grandparent",
    "grandparents",
    "aunt",
    "uncle",
    "cousin",
    "maternal",
    "paternal",
    "runs in family",
    "family history of",
];

const HISTORICAL: &[&str] = &[
    "history of",
    "hx of",
    "h/o",
    "past",
    "previous",
    "prior",
    "previously",
    "former",
    "old",
    "remote",
    "distant",
    "years ago",
    "months ago",
    "weeks ago",
    "days ago",
    "in the past",
    "historically",
    "chronic",
    "longstanding",
    "long-standing",
    "since",
    "status post",
    "s/p",
];

const HYPOTHETICAL: &[&str] = &[
    "if",
    "when",
    "unless",
    "should",
    "would",
    "could",
    "in case of",
    "in the event of",
    "prophylaxis",
    "prophylactic",
    "preventive",
    "prevention",
    "to prevent",
    "avoid",
    "risk of",
    "risk for",
    "predisposed to",
];

/// Clause-boundary words that stop a cue from reaching past them.
const TERMINATORS: &[&str] = &[
    "but",
    "however",
    "yet",
    "though",
    "although",
    "except",
    "aside from",
    "apart from",
    "which",
    "secondary to",
    "due to",
    "cause of",
    "etiology of",
    "reason for",
];

fn literals(
    words: &'static [&'static str],
    category: CueCategory,
    direction: Direction,
    max_scope: usize,
) -> impl Iterator<Item = CueRuleDef> {
    words
        .iter()
        .map(move |word| CueRuleDef::literal(*word, category, direction, max_scope))
}

/// Rule definitions for the built-in clinical lexicon, in table order.
pub fn clinical_rule_defs() -> Vec<CueRuleDef> {
    literals(NEGATION_FORWARD, CueCategory::Negation, Direction::Forward, 6)
        .chain(literals(NEGATION_BACKWARD, CueCategory::Negation, Direction::Backward, 3))
        .chain(literals(UNCERTAINTY, CueCategory::Uncertainty, Direction::Forward, 5))
        .chain(literals(FAMILY, CueCategory::Family, Direction::Forward, 8))
        .chain(literals(HISTORICAL, CueCategory::Historical, Direction::Forward, 6))
        .chain(literals(HYPOTHETICAL, CueCategory::Hypothetical, Direction::Forward, 5))
        .chain(TERMINATORS.iter().map(|word| CueRuleDef::terminator(*word)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_default_rule_compiles() {
        for (index, def) in clinical_rule_defs().iter().enumerate() {
            assert!(def.compile(index).is_ok(), "rule {} ({:?}) failed", index, def.pattern);
        }
    }

    #[test]
    fn test_terminators_carry_no_category() {
        let defs = clinical_rule_defs();
        let but = defs.iter().find(|d| d.pattern == "but").unwrap();
        assert!(but.terminator);
        assert_eq!(but.category, None);
    }
}
