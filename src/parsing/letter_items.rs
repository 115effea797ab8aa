use once_cell::sync::Lazy;
use regex::Regex;

use super::math_spans::{SpanKind, split_math_spans};

static LETTER_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-zА-Яа-яЁё])\)\s*(.+)$").expect("valid regex"));
static ORDERED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*[0-9]+[.)][ \t]+").expect("valid regex"));

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn is_letter_item(line: &str) -> bool {
    LETTER_ITEM.is_match(line.trim_start())
}

/// Byte ranges strictly inside display formulas that span several lines.
fn display_math_interiors(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut offset = 0;
    for span in split_math_spans(text) {
        if span.kind == SpanKind::Display && span.text.contains('\n') {
            ranges.push((offset + 1, offset + span.text.len()));
        }
        offset += span.text.len();
    }
    ranges
}

/// Width of the numbered-list marker the group should hang under, if any.
fn anchor_width(paragraph: &[&str]) -> Option<usize> {
    paragraph
        .iter()
        .rev()
        .find_map(|line| ORDERED_MARKER.find(line))
        .map(|marker| marker.end())
}

/// Turns runs of `а) ...` paragraphs into sub-paragraphs of the numbered item above.
///
/// ```text
/// 2. Pick one:            2. Pick one:
///
/// а) foo          =>         а) foo
///
/// б) bar                     б) bar
/// ```
///
/// No list marker is added; the items stay plain paragraphs indented far enough
/// to belong to the numbered item. Without a numbered item above, the items are
/// only re-spaced.
pub fn reparagraph_letter_items(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let lines: Vec<&str> = markdown.split('\n').collect();
    let line_starts: Vec<usize> = lines
        .iter()
        .scan(0, |offset, line| {
            let start = *offset;
            *offset += line.len() + 1;
            Some(start)
        })
        .collect();
    let in_formula = display_math_interiors(markdown);
    let starts_item = |index: usize| {
        let at = line_starts[index];
        is_letter_item(lines[index])
            && !in_formula.iter().any(|&(start, end)| (start..end).contains(&at))
    };

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut previous: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if is_blank(lines[i]) {
            out.push(lines[i].to_string());
            i += 1;
            continue;
        }

        let start = i;
        while i < lines.len() && !is_blank(lines[i]) {
            i += 1;
        }
        let paragraph = &lines[start..i];

        if !starts_item(start) {
            out.extend(paragraph.iter().map(|line| line.to_string()));
            previous = paragraph.to_vec();
            continue;
        }

        let indent = " ".repeat(anchor_width(&previous).unwrap_or(0));
        let mut items = vec![paragraph];
        let mut trailing_blanks;

        loop {
            let blanks_start = i;
            while i < lines.len() && is_blank(lines[i]) {
                i += 1;
            }
            trailing_blanks = i - blanks_start;

            if i >= lines.len() || !starts_item(i) {
                break;
            }

            let item_start = i;
            while i < lines.len() && !is_blank(lines[i]) {
                i += 1;
            }
            items.push(&lines[item_start..i]);
        }

        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                out.push(String::new());
            }
            out.extend(render_item(item, &indent));
        }
        if trailing_blanks > 0 {
            out.push(String::new());
        }
        previous.clear();
    }

    out.join("\n")
}

fn render_item(item: &[&str], indent: &str) -> Vec<String> {
    let mut rendered = Vec::with_capacity(item.len());
    let first = item[0].trim_start();

    match LETTER_ITEM.captures(first) {
        Some(caps) => {
            let line = format!("{indent}{}) {}", &caps[1], caps[2].trim());
            rendered.push(line.trim_end().to_string());
        }
        None => rendered.push(item[0].to_string()),
    }

    for continuation in &item[1..] {
        let line = format!("{indent}{}", continuation.trim());
        rendered.push(line.trim_end().to_string());
    }
    rendered
}
