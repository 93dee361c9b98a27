use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

use crate::Span;

/// Convert a zero-based index to a base-26 label: A, B, ..., Z, AA, AB, ..., AZ, BA, ...
/// Similar to Excel column naming.
fn index_to_base26_label(mut n: usize) -> String {
    let mut result = String::new();
    loop {
        let remainder = n % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// A labelled link from an included span to another span.
#[derive(Debug, Clone)]
struct Link {
    label: &'static str,
    target: Span,
}

/// Internal representation of an included span for display.
struct IncludedSpan {
    span: Span,
    value: String,
    links: Vec<Link>,
}

/// Renders one window of text (usually a sentence) with underlined spans.
///
/// ```text
/// Patient denies chest pain.
///         ╰────╯[A] Negation
///                ╰────────╯sign_symptom Assertion(Negated)
///                  └─polarity─>[A]
/// ```
pub struct SpanDisplay<'a> {
    text: &'a str,
    window: Span,
    include_spans: Vec<IncludedSpan>,
}

impl<'a> std::fmt::Display for SpanDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let opening_line = self.text.get(self.window.start..self.window.end).unwrap_or("");
        f.write_str(opening_line)?;

        let span_labels = self.build_span_labels();

        for included in self.include_spans.iter() {
            f.write_char('\n')?;

            let start_char_idx = self.column(included.span.start);
            for _ in 0..start_char_idx {
                f.write_char(' ')?;
            }

            f.write_char('╰')?;

            let end_char_idx = self.column(included.span.end);
            let char_len = end_char_idx.saturating_sub(start_char_idx);
            for _ in (start_char_idx + 1)..end_char_idx.saturating_sub(1) {
                f.write_char('─')?;
            }

            if char_len > 1 {
                f.write_char('╯')?;
            }

            if let Some(label) = span_labels.get(&included.span) {
                write!(f, "{} ", label)?;
            }

            f.write_str(&included.value)?;

            for link in &included.links {
                f.write_char('\n')?;

                let arrow_indent = start_char_idx + 2;
                for _ in 0..arrow_indent {
                    f.write_char(' ')?;
                }

                let target_str = match span_labels.get(&link.target) {
                    Some(target_label) => target_label.clone(),
                    None => format!("{}", link.target),
                };

                write!(f, "└─{}─>{}", link.label, target_str)?;
            }
        }

        Ok(())
    }
}

impl<'a> SpanDisplay<'a> {
    /// Display `window` of `text`. Spans outside the window are clamped to it.
    pub fn new(text: &'a str, window: Span) -> Self {
        SpanDisplay {
            text,
            window,
            include_spans: Vec::new(),
        }
    }

    /// Display the whole of `text`.
    pub fn whole(text: &'a str) -> Self {
        Self::new(text, Span::new(0, text.len()))
    }

    /// Display column of a byte offset, measured from the window start.
    fn column(&self, offset: usize) -> usize {
        let offset = offset.clamp(self.window.start, self.window.end);
        self.text
            .get(self.window.start..offset)
            .map(UnicodeWidthStr::width)
            .unwrap_or(0)
    }

    /// Build a map from included spans to labels like "[A]", "[B]", etc.
    /// Only spans that are targets of links get labels.
    fn build_span_labels(&self) -> HashMap<Span, String> {
        let included: HashSet<Span> = self.include_spans.iter().map(|s| s.span).collect();

        let mut targets: Vec<Span> = self
            .include_spans
            .iter()
            .flat_map(|s| &s.links)
            .map(|link| link.target)
            .filter(|target| included.contains(target))
            .collect();

        targets.sort();
        targets.dedup();

        targets
            .into_iter()
            .enumerate()
            .map(|(i, span)| (span, format!("[{}]", index_to_base26_label(i))))
            .collect()
    }

    pub fn include(&mut self, span: Span, value: impl std::fmt::Display) {
        self.include_spans.push(IncludedSpan {
            span,
            value: value.to_string(),
            links: Vec::new(),
        });
    }

    /// Include a span together with labelled arrows to other spans.
    ///
    /// Targets that are also included get a letter label; others are printed
    /// as raw offsets.
    pub fn include_linked(
        &mut self,
        span: Span,
        value: impl std::fmt::Display,
        links: impl IntoIterator<Item = (&'static str, Span)>,
    ) {
        self.include_spans.push(IncludedSpan {
            span,
            value: value.to_string(),
            links: links
                .into_iter()
                .map(|(label, target)| Link { label, target })
                .collect(),
        });
    }

    /// Takes self
    pub fn with(mut self, span: Span, value: impl std::fmt::Display) -> Self {
        self.include(span, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_to_base26_label() {
        assert_eq!(index_to_base26_label(0), "A");
        assert_eq!(index_to_base26_label(25), "Z");
        assert_eq!(index_to_base26_label(26), "AA");
        assert_eq!(index_to_base26_label(51), "AZ");
        assert_eq!(index_to_base26_label(52), "BA");
        assert_eq!(index_to_base26_label(701), "ZZ");
        assert_eq!(index_to_base26_label(702), "AAA");
    }

    #[test]
    fn test_underlines() {
        let text = "Patient denies chest pain.";
        let display = SpanDisplay::whole(text)
            .with(Span::new(8, 14), "Negation")
            .with(Span::new(25, 26), "Period");

        insta::assert_snapshot!(display, @r###"
        Patient denies chest pain.
                ╰────╯Negation
                                 ╰Period
        "###);
    }

    #[test]
    fn test_links_get_letter_labels() {
        let text = "Patient denies chest pain.";
        let mut display = SpanDisplay::whole(text);
        display.include(Span::new(8, 14), "Negation");
        display.include_linked(Span::new(15, 25), "sign_symptom", [("polarity", Span::new(8, 14))]);

        insta::assert_snapshot!(display, @r###"
        Patient denies chest pain.
                ╰────╯[A] Negation
                       ╰────────╯sign_symptom
                         └─polarity─>[A]
        "###);
    }

    #[test]
    fn test_window_offsets_columns() {
        let text = "No fever. Denies cough.";
        let display = SpanDisplay::new(text, Span::new(10, 23)).with(Span::new(17, 22), "sign_symptom");

        insta::assert_snapshot!(display, @r###"
        Denies cough.
               ╰───╯sign_symptom
        "###);
    }
}
