use layered_clinical::{resolve, Candidate, Entity, Span, TokenIndex};

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '/' || c == '-' || c == '\''
}

/// One sentence covering all of `text`: words, plus each punctuation mark
/// as its own token.
pub fn sentence(text: &str) -> TokenIndex {
    let mut tokens = Vec::new();
    let mut word_start = None;
    for (i, c) in text.char_indices() {
        if is_word_char(c) {
            word_start.get_or_insert(i);
            continue;
        }
        if let Some(start) = word_start.take() {
            tokens.push(Span::new(start, i));
        }
        if !c.is_whitespace() {
            tokens.push(Span::new(i, i + c.len_utf8()));
        }
    }
    if let Some(start) = word_start {
        tokens.push(Span::new(start, text.len()));
    }
    TokenIndex::new(Span::new(0, text.len()), tokens).unwrap()
}

/// Resolved entities for the given phrases, each found at its first
/// occurrence after the previous one.
pub fn entities(text: &str, phrases: &[(&str, &str)]) -> Vec<Entity> {
    let mut from = 0;
    let candidates = phrases
        .iter()
        .map(|(phrase, label)| {
            let start = from + text[from..].find(phrase).unwrap();
            from = start + phrase.len();
            Candidate::new(Span::new(start, from), *label, 0.9, 1)
        })
        .collect();
    let resolution = resolve(text, candidates);
    assert!(resolution.rejected.is_empty());
    resolution.entities
}
