use layered_clinical::{Entity, Span, SpanDisplay};
use serde::{Deserialize, Serialize};

use crate::Warning;

/// The output of processing one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    pub doc_id: String,
    pub text: String,
    /// Sentence spans in text order.
    pub sentences: Vec<Span>,
    /// Resolved entities in text order, each carrying its assertion.
    pub entities: Vec<Entity>,
    pub warnings: Vec<Warning>,
}

impl AnnotatedDocument {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Entities inside `sentence`.
    pub fn entities_in(&self, sentence: Span) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(move |entity| sentence.contains(&entity.span))
    }

    /// Each sentence on its own, with entities underlined and labelled with
    /// their assertions.
    pub fn display(&self) -> String {
        self.sentences
            .iter()
            .map(|sentence| {
                let mut display = SpanDisplay::new(&self.text, *sentence);
                for entity in self.entities_in(*sentence) {
                    display.include(
                        entity.span,
                        format!("{} {}", entity.label, entity.assertion_or_default()),
                    );
                }
                display.to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
