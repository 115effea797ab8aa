use once_cell::sync::Lazy;
use regex::Regex;

use super::letter_items::reparagraph_letter_items;
use super::math_spans::{MathSpan, SpanKind, map_plain_spans, split_math_spans};
use crate::config::NormalizerConfig;

static FENCE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(```|~~~)").expect("valid regex"));
static ORDERED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*[0-9]+[.)]\s+").expect("valid regex"));
static NUMBER_BEFORE_EQUALS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([0-9]+)\b\s*=\s*$").expect("valid regex"));
static EQUALS_BEFORE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*=\s*([0-9]+)\b").expect("valid regex"));

/// Markdown clean-up that has to know about formulas and code.
///
/// Fenced blocks and inline code spans are passed through byte for byte; every
/// other region gets, in order: the single leading space of a line removed,
/// equalities between formulas merged, lettered sub-items re-paragraphed and,
/// for the configured category only, bare integers wrapped into formulas.
pub struct InlinePostProcessor {
    wrap_numbers: bool,
    variables: Vec<String>,
}

impl InlinePostProcessor {
    pub fn new(config: &NormalizerConfig, category: Option<u32>) -> Self {
        Self {
            wrap_numbers: config.wraps_numbers_for(category),
            variables: config.numeric_math_variables.clone(),
        }
    }

    pub fn process(&self, markdown: &str) -> String {
        let mut out = String::with_capacity(markdown.len());
        let mut buffer = String::new();
        let mut open_fence: Option<&str> = None;

        for line in markdown.split_inclusive('\n') {
            let marker = FENCE_LINE.find(line).map(|m| m.as_str());

            match (open_fence, marker) {
                (None, Some(marker)) => {
                    out.push_str(&self.process_prose(&buffer));
                    buffer.clear();
                    open_fence = Some(marker);
                    out.push_str(line);
                }
                (Some(fence), Some(marker)) if fence == marker => {
                    open_fence = None;
                    out.push_str(line);
                }
                (Some(_), _) => out.push_str(line),
                (None, None) => buffer.push_str(line),
            }
        }

        if open_fence.is_some() {
            log::debug!("Fenced block left open at end of text; passing it through");
        }
        out.push_str(&self.process_prose(&buffer));
        out
    }

    fn process_prose(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let text = strip_single_leading_space(text);
        let text = map_outside_code(&text, |segment, _| merge_equalities(segment));
        let text = reparagraph_letter_items(&text);
        if !self.wrap_numbers {
            return text;
        }

        map_outside_code(&text, |segment, at_line_start| {
            let segment = self.variables_to_math(segment);
            wrap_integers_from(&segment, at_line_start)
        })
    }

    fn variables_to_math(&self, text: &str) -> String {
        map_plain_spans(text, |plain| {
            self.variables
                .iter()
                .fold(plain.to_string(), |acc, var| {
                    acc.replace(&format!("*{var}*"), &format!("${var}$"))
                })
        })
    }
}

/// Drops the one space a line starts with, leaving deeper indentation alone.
pub fn strip_single_leading_space(text: &str) -> String {
    text.split_inclusive('\n')
        .map(|line| match line.strip_prefix(' ') {
            Some(rest) if !rest.starts_with([' ', '\t']) => rest,
            _ => line,
        })
        .collect()
}

/// Applies `f` to the text between inline code spans, telling it whether the
/// segment starts a line.
///
/// A code span opens with a run of backticks and closes with the next run of
/// the same length; an unmatched run is ordinary text.
fn map_outside_code<F>(text: &str, mut f: F) -> String
where
    F: FnMut(&str, bool) -> String,
{
    let starts_line = |at: usize| at == 0 || text[..at].ends_with('\n');
    let mut out = String::with_capacity(text.len());
    let mut plain_start = 0;
    let mut i = 0;

    while let Some(offset) = text[i..].find('`') {
        let open = i + offset;
        let run = backtick_run(text, open);

        match find_closing_run(text, open + run, run) {
            Some(close_end) => {
                out.push_str(&f(&text[plain_start..open], starts_line(plain_start)));
                out.push_str(&text[open..close_end]);
                plain_start = close_end;
                i = close_end;
            }
            None => i = open + run,
        }
    }

    out.push_str(&f(&text[plain_start..], starts_line(plain_start)));
    out
}

fn backtick_run(text: &str, start: usize) -> usize {
    text[start..].bytes().take_while(|&b| b == b'`').count()
}

fn find_closing_run(text: &str, from: usize, run: usize) -> Option<usize> {
    let mut i = from;
    while let Some(offset) = text[i..].find('`') {
        let start = i + offset;
        let len = backtick_run(text, start);
        if len == run {
            return Some(start + len);
        }
        i = start + len;
    }
    None
}

fn mergeable(span: &MathSpan<'_>) -> Option<String> {
    let inner = span.inner();
    let eligible = span.kind == SpanKind::Inline
        && span.terminated
        && !inner.is_empty()
        && !inner.contains('\n');
    eligible.then(|| inner.trim().to_string())
}

/// Folds `$A$ = $B$`, `N = $B$` and `$A$ = N` into one formula until nothing
/// more can be folded.
pub fn merge_equalities(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let merged = merge_equalities_once(&current);
        if merged == current {
            return current;
        }
        current = merged;
    }
}

fn merge_equalities_once(text: &str) -> String {
    let spans = split_math_spans(text);
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < spans.len() {
        let span = &spans[i];
        let next = spans.get(i + 1);
        let after_next = spans.get(i + 2);

        if let Some(a) = mergeable(span) {
            if let (Some(eq), Some(b)) = (next, after_next.and_then(mergeable)) {
                if eq.kind == SpanKind::Plain && eq.text.trim() == "=" {
                    out.push_str(&format!("${a} = {b}$"));
                    i += 3;
                    continue;
                }
            }

            if let Some(tail) = next.filter(|s| s.kind == SpanKind::Plain) {
                if let Some(caps) = EQUALS_BEFORE_NUMBER.captures(tail.text) {
                    let whole = caps.get(0).map_or(0, |m| m.end());
                    out.push_str(&format!("${a} = {}$", &caps[1]));
                    out.push_str(&tail.text[whole..]);
                    i += 2;
                    continue;
                }
            }
        }

        if span.kind == SpanKind::Plain {
            if let Some(b) = next.and_then(mergeable) {
                if let Some(caps) = NUMBER_BEFORE_EQUALS.captures(span.text) {
                    let start = caps.get(0).map_or(0, |m| m.start());
                    out.push_str(&span.text[..start]);
                    out.push_str(&format!("${} = {b}$", &caps[1]));
                    i += 2;
                    continue;
                }
            }
        }

        out.push_str(span.text);
        i += 1;
    }

    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Wraps every standalone integer of the formula-free parts of `text` in `$...$`.
///
/// Raw HTML tags, link destinations and numbered-list markers at the start of
/// a line are kept as they are.
pub fn wrap_standalone_integers(text: &str) -> String {
    wrap_integers_from(text, true)
}

fn wrap_integers_from(text: &str, mut at_line_start: bool) -> String {
    let mut out = String::with_capacity(text.len());

    for span in split_math_spans(text) {
        if span.is_math() {
            out.push_str(span.text);
            at_line_start = false;
            continue;
        }

        for line in span.text.split_inclusive('\n') {
            let marker_end = if at_line_start {
                ORDERED_MARKER.find(line).map_or(0, |m| m.end())
            } else {
                0
            };
            out.push_str(&line[..marker_end]);
            out.push_str(&wrap_integers_in_line(&line[marker_end..]));
            at_line_start = line.ends_with('\n');
        }
    }

    out
}

fn starts_html_tag(rest: &str) -> bool {
    rest.chars()
        .nth(1)
        .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}

/// End of a `](...)` destination whose opening parenthesis ends at `from`.
fn link_destination_end(text: &str, from: usize) -> usize {
    let mut depth = 1;
    for (offset, c) in text[from..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return from + offset + 1;
                }
            }
            _ => {}
        }
    }
    text.len()
}

fn wrap_integers_in_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while let Some(c) = text[i..].chars().next() {
        let rest = &text[i..];

        if c == '<' && starts_html_tag(rest) {
            let end = rest.find('>').map_or(text.len(), |offset| i + offset + 1);
            out.push_str(&text[i..end]);
            i = end;
            continue;
        }

        if c == ']' && rest[1..].starts_with('(') {
            let end = link_destination_end(text, i + 2);
            out.push_str(&text[i..end]);
            i = end;
            continue;
        }

        if c.is_ascii_digit() {
            let len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            let end = i + len;
            let joined_before = text[..i].chars().next_back().is_some_and(is_word_char);
            let joined_after = text[end..].chars().next().is_some_and(is_word_char);

            if joined_before || joined_after {
                out.push_str(&text[i..end]);
            } else {
                out.push('$');
                out.push_str(&text[i..end]);
                out.push('$');
            }
            i = end;
            continue;
        }

        out.push(c);
        i += c.len_utf8();
    }

    out
}
