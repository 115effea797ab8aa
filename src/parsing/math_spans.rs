#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Plain,
    /// `$...$`
    Inline,
    /// `$$...$$`
    Display,
}

/// A run of text that is entirely prose or entirely one formula.
///
/// Math spans keep their delimiters, so joining `text` of every span gives back
/// the input unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathSpan<'a> {
    pub kind: SpanKind,
    pub text: &'a str,
    /// False only for a formula whose closing delimiter never came.
    pub terminated: bool,
}

impl<'a> MathSpan<'a> {
    pub fn is_math(&self) -> bool {
        self.kind != SpanKind::Plain
    }

    /// Formula body without its delimiters.
    pub fn inner(&self) -> &'a str {
        let width = match self.kind {
            SpanKind::Plain => return self.text,
            SpanKind::Inline => 1,
            SpanKind::Display => 2,
        };
        let end = if self.terminated {
            self.text.len().saturating_sub(width).max(width)
        } else {
            self.text.len()
        };
        &self.text[width.min(self.text.len())..end]
    }
}

/// Splits `text` into plain and math runs.
///
/// A `$` preceded by a backslash is literal. An opening delimiter without a
/// closing one turns the rest of the text into one unterminated span.
pub fn split_math_spans(text: &str) -> Vec<MathSpan<'_>> {
    let bytes = text.as_bytes();
    let escaped = |i: usize| i > 0 && bytes[i - 1] == b'\\';

    let mut spans = Vec::new();
    let mut kind = SpanKind::Plain;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' || escaped(i) {
            i += 1;
            continue;
        }
        let double = bytes.get(i + 1) == Some(&b'$');

        match kind {
            SpanKind::Plain => {
                if start < i {
                    spans.push(span(SpanKind::Plain, &text[start..i], true));
                }
                start = i;
                if double {
                    kind = SpanKind::Display;
                    i += 2;
                } else {
                    kind = SpanKind::Inline;
                    i += 1;
                }
            }
            SpanKind::Inline => {
                i += 1;
                spans.push(span(SpanKind::Inline, &text[start..i], true));
                start = i;
                kind = SpanKind::Plain;
            }
            SpanKind::Display if double => {
                i += 2;
                spans.push(span(SpanKind::Display, &text[start..i], true));
                start = i;
                kind = SpanKind::Plain;
            }
            SpanKind::Display => i += 1,
        }
    }

    if start < bytes.len() {
        let terminated = kind == SpanKind::Plain;
        if !terminated {
            log::debug!(
                "Unterminated math span at byte {start}: {:?}",
                truncate(&text[start..], 40)
            );
        }
        spans.push(span(kind, &text[start..], terminated));
    }

    spans
}

fn span(kind: SpanKind, text: &str, terminated: bool) -> MathSpan<'_> {
    MathSpan {
        kind,
        text,
        terminated,
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Applies `f` to every plain run and leaves formulas untouched.
pub fn map_plain_spans<F>(text: &str, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut out = String::with_capacity(text.len());
    for span in split_math_spans(text) {
        if span.is_math() {
            out.push_str(span.text);
        } else {
            out.push_str(&f(span.text));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<(SpanKind, &str)> {
        split_math_spans(text)
            .into_iter()
            .map(|span| (span.kind, span.text))
            .collect()
    }

    #[test]
    fn test_spans_partition_the_input() {
        let inputs = [
            "",
            "plain only",
            "$x$",
            "a $x$ b $$y$$ c",
            "Сумма $a_{1}$ и $$\\sum_{i=1}^{n} i$$.",
            "price \\$5 and $x$",
            "open $never closed",
            "$$display open",
            "$a$$b$",
        ];
        for input in inputs {
            let joined: String = split_math_spans(input).iter().map(|s| s.text).collect();
            assert_eq!(joined, input);
        }
    }

    #[test]
    fn test_inline_and_display() {
        assert_eq!(
            kinds("a $x$ b $$y$$"),
            vec![
                (SpanKind::Plain, "a "),
                (SpanKind::Inline, "$x$"),
                (SpanKind::Plain, " b "),
                (SpanKind::Display, "$$y$$"),
            ]
        );
    }

    #[test]
    fn test_escaped_dollar_is_text() {
        assert_eq!(
            kinds("cost \\$5 or $n$"),
            vec![(SpanKind::Plain, "cost \\$5 or "), (SpanKind::Inline, "$n$")]
        );
    }

    #[test]
    fn test_adjacent_inline_spans() {
        assert_eq!(
            kinds("$a$$b$"),
            vec![(SpanKind::Inline, "$a$"), (SpanKind::Inline, "$b$")]
        );
    }

    #[test]
    fn test_unterminated_span_runs_to_end() {
        let spans = split_math_spans("x = $1 + 2");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].kind, SpanKind::Inline);
        assert_eq!(spans[1].text, "$1 + 2");
        assert!(!spans[1].terminated);
        assert_eq!(spans[1].inner(), "1 + 2");
    }

    #[test]
    fn test_inner_strips_delimiters() {
        let spans = split_math_spans("$$a+b$$ and $c$");
        assert_eq!(spans[0].inner(), "a+b");
        assert_eq!(spans[2].inner(), "c");
        assert_eq!(spans[1].inner(), " and ");
    }

    #[test]
    fn test_map_plain_spans_skips_formulas() {
        let out = map_plain_spans("a1 $a1$ b1", |plain| plain.replace('1', "2"));
        assert_eq!(out, "a2 $a1$ b2");
    }
}
