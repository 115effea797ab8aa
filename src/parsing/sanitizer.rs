use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::ops::AddAssign;

use super::dom::{Element, Node, merge_adjacent_text};
use super::fragment_parser::parse_fragment;
use super::script_media::{ScriptMedia, classify_script, media_markup};
use crate::config::NormalizerConfig;

static IMPORT_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<\?import[^>]*?>").expect("valid regex"));

const DECORATION_TAGS: &[&str] = &["span", "font", "o:p"];

const DROP_ATTRS: &[&str] = &[
    "class",
    "style",
    "bgcolor",
    "width",
    "height",
    "align",
    "valign",
    "lang",
    "svwidth",
    "border",
    "cellpadding",
    "cellspacing",
    "nowrap",
];

const MATH_LEAF_TAGS: &[&str] = &["mo", "mi", "mn", "mtext", "msym"];
const MATH_PREFIX: &str = "m:";
const LONE_DASHES: &[&str] = &["\u{2013}", "\u{2014}"];

const EMPTY_REMOVABLE_TAGS: &[&str] = &[
    "p", "div", "span", "font", "b", "i", "strong", "em", "u", "sup", "sub",
];

const WRAPPER_TAGS: &[&str] = &["td", "tr", "tbody"];

// A round that still rewrites something after this many passes is logged and
// returned as is.
const MAX_ROUNDS: usize = 8;

/// Per-rewrite counters. Purely diagnostic; they are summed across a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeStats {
    pub import_directives_removed: usize,
    pub decorations_unwrapped: usize,
    pub line_breaks_normalized: usize,
    pub attributes_removed: usize,
    pub nbsp_replaced: usize,
    pub script_images: usize,
    pub script_archive_links: usize,
    pub scripts_dropped: usize,
    pub math_dash_replaced: usize,
    pub math_prefix_stripped: usize,
    pub empty_anchors_removed: usize,
    pub anchors_unwrapped: usize,
    pub notice_rows_removed: usize,
    pub archive_rows_removed: usize,
    pub empty_tags_removed: usize,
    pub empty_tables_removed: usize,
    pub wrappers_unwrapped: usize,
}

impl SanitizeStats {
    pub fn entries(&self) -> [(&'static str, usize); 17] {
        [
            ("import_directives_removed", self.import_directives_removed),
            ("decorations_unwrapped", self.decorations_unwrapped),
            ("line_breaks_normalized", self.line_breaks_normalized),
            ("attributes_removed", self.attributes_removed),
            ("nbsp_replaced", self.nbsp_replaced),
            ("script_images", self.script_images),
            ("script_archive_links", self.script_archive_links),
            ("scripts_dropped", self.scripts_dropped),
            ("math_dash_replaced", self.math_dash_replaced),
            ("math_prefix_stripped", self.math_prefix_stripped),
            ("empty_anchors_removed", self.empty_anchors_removed),
            ("anchors_unwrapped", self.anchors_unwrapped),
            ("notice_rows_removed", self.notice_rows_removed),
            ("archive_rows_removed", self.archive_rows_removed),
            ("empty_tags_removed", self.empty_tags_removed),
            ("empty_tables_removed", self.empty_tables_removed),
            ("wrappers_unwrapped", self.wrappers_unwrapped),
        ]
    }

    pub fn total(&self) -> usize {
        self.entries().iter().map(|(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl AddAssign for SanitizeStats {
    fn add_assign(&mut self, other: Self) {
        self.import_directives_removed += other.import_directives_removed;
        self.decorations_unwrapped += other.decorations_unwrapped;
        self.line_breaks_normalized += other.line_breaks_normalized;
        self.attributes_removed += other.attributes_removed;
        self.nbsp_replaced += other.nbsp_replaced;
        self.script_images += other.script_images;
        self.script_archive_links += other.script_archive_links;
        self.scripts_dropped += other.scripts_dropped;
        self.math_dash_replaced += other.math_dash_replaced;
        self.math_prefix_stripped += other.math_prefix_stripped;
        self.empty_anchors_removed += other.empty_anchors_removed;
        self.anchors_unwrapped += other.anchors_unwrapped;
        self.notice_rows_removed += other.notice_rows_removed;
        self.archive_rows_removed += other.archive_rows_removed;
        self.empty_tags_removed += other.empty_tags_removed;
        self.empty_tables_removed += other.empty_tables_removed;
        self.wrappers_unwrapped += other.wrappers_unwrapped;
    }
}

/// Output of one sanitizer run over a fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedFragment {
    pub root: Element,
    /// A "this task needs extra files" banner row was dropped from the markup.
    pub requires_attachment: bool,
    pub stats: SanitizeStats,
}

impl SanitizedFragment {
    pub fn cleaned_html(&self) -> String {
        self.root.serialize_children()
    }
}

/// Removes question-bank noise from a fragment.
///
/// Every rule rebuilds the child list it is given instead of editing a live
/// tree. The rules run in a fixed order; because a late rule (empty tables,
/// wrapper collapse) can leave work for an early one, the whole sequence is
/// repeated until a round rewrites nothing.
pub struct Sanitizer<'a> {
    config: &'a NormalizerConfig,
    notice: Option<Regex>,
}

impl<'a> Sanitizer<'a> {
    pub fn new(config: &'a NormalizerConfig) -> Self {
        Self {
            config,
            notice: notice_pattern(&config.attachment_notice),
        }
    }

    /// Whether `text` carries the attachment banner.
    pub fn mentions_attachment_notice(&self, text: &str) -> bool {
        self.notice.as_ref().is_some_and(|re| re.is_match(text))
    }

    pub fn sanitize_html(&self, raw_html: &str) -> SanitizedFragment {
        let mut stats = SanitizeStats::default();
        let html = strip_import_directives(raw_html, &mut stats);
        let root = parse_fragment(&html);
        let mut fragment = self.sanitize_tree(root);
        fragment.stats += stats;
        fragment
    }

    pub fn sanitize_tree(&self, root: Element) -> SanitizedFragment {
        let mut stats = SanitizeStats::default();
        let mut requires_attachment = false;
        let mut children = root.children;

        for round in 1..=MAX_ROUNDS {
            let mut round_stats = SanitizeStats::default();
            children = self.run_rules(children, &mut round_stats);
            requires_attachment |= round_stats.notice_rows_removed > 0;
            stats += round_stats;

            if round_stats.is_empty() {
                break;
            }
            if round == MAX_ROUNDS {
                log::warn!("Sanitizer still rewriting after {MAX_ROUNDS} rounds; keeping result");
            }
        }

        log::debug!(
            "Sanitized fragment with {} rewrites (attachment notice: {requires_attachment})",
            stats.total()
        );

        SanitizedFragment {
            root: Element::root(merge_adjacent_text(children)),
            requires_attachment,
            stats,
        }
    }

    fn run_rules(&self, children: Vec<Node>, stats: &mut SanitizeStats) -> Vec<Node> {
        let children = unwrap_decorations(children, stats);
        let children = normalize_line_breaks(children, stats);
        let children = strip_presentation_attrs(children, stats);
        let children = normalize_nbsp(children, stats);
        let children = rewrite_scripts(children, &self.config.asset_prefix, stats);
        let children = collapse_math(children, stats);
        let children = clean_anchors(children, stats);
        let children = self.remove_notice_rows(children, stats);
        let children = self.remove_archive_rows(children, stats);
        let children = prune_empty_tags(children, stats);
        let children = prune_empty_tables(children, stats);
        collapse_wrappers(children, stats)
    }

    fn remove_notice_rows(&self, children: Vec<Node>, stats: &mut SanitizeStats) -> Vec<Node> {
        let Some(notice) = &self.notice else {
            return children;
        };

        rewrite_bottom_up(children, &mut |element| {
            if element.name == "tr" {
                let text = element.text_content();
                if notice.is_match(&text) && notice.replace_all(&text, "").trim().is_empty() {
                    stats.notice_rows_removed += 1;
                    return Vec::new();
                }
            }
            vec![element.into_node()]
        })
    }

    fn remove_archive_rows(&self, children: Vec<Node>, stats: &mut SanitizeStats) -> Vec<Node> {
        rewrite_bottom_up(children, &mut |element| {
            if element.name == "tr" && self.is_archive_link_row(&element) {
                stats.archive_rows_removed += 1;
                return Vec::new();
            }
            vec![element.into_node()]
        })
    }

    fn is_archive_link_row(&self, row: &Element) -> bool {
        let mut anchors = Vec::new();
        collect_named(row, "a", &mut anchors);
        if anchors.is_empty() {
            return false;
        }

        let all_archives = anchors.iter().all(|anchor| {
            anchor
                .non_empty_attr("href")
                .is_some_and(|href| self.config.is_archive_asset(href))
        });

        all_archives && text_outside(row, "a").trim().is_empty()
    }
}

/// Builds a whitespace-tolerant matcher for the attachment banner.
fn notice_pattern(notice: &str) -> Option<Regex> {
    let words: Vec<String> = notice.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return None;
    }

    let pattern = format!(r"(?i){}\.?", words.join(r"\s+"));
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            log::error!("Attachment notice {notice:?} is not usable as a pattern: {e}");
            None
        }
    }
}

fn strip_import_directives(html: &str, stats: &mut SanitizeStats) -> String {
    let found = IMPORT_DIRECTIVE.find_iter(html).count();
    if found == 0 {
        return html.to_string();
    }
    stats.import_directives_removed += found;
    IMPORT_DIRECTIVE.replace_all(html, "").into_owned()
}

/// Rewrites every element below `nodes`, children first; `rewrite` returns the
/// nodes that take the element's place (itself, its children, or nothing).
fn rewrite_bottom_up<F>(nodes: Vec<Node>, rewrite: &mut F) -> Vec<Node>
where
    F: FnMut(Element) -> Vec<Node>,
{
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(_) => out.push(node),
            Node::Element(mut element) => {
                element.children = rewrite_bottom_up(element.children, rewrite);
                out.extend(rewrite(element));
            }
        }
    }
    out
}

fn map_text<F>(nodes: Vec<Node>, map: &mut F) -> Vec<Node>
where
    F: FnMut(String) -> String,
{
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Text(text) => Node::Text(map(text)),
            Node::Element(mut element) => {
                element.children = map_text(element.children, map);
                Node::Element(element)
            }
        })
        .collect()
}

fn collect_named<'e>(element: &'e Element, name: &str, out: &mut Vec<&'e Element>) {
    for child in &element.children {
        if let Node::Element(el) = child {
            if el.name == name {
                out.push(el);
            }
            collect_named(el, name, out);
        }
    }
}

fn text_outside(element: &Element, skipped: &str) -> String {
    let mut out = String::new();
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name == skipped => {}
            Node::Element(el) => out.push_str(&text_outside(el, skipped)),
        }
    }
    out
}

fn unwrap_decorations(children: Vec<Node>, stats: &mut SanitizeStats) -> Vec<Node> {
    rewrite_bottom_up(children, &mut |element| {
        let decorative = DECORATION_TAGS.contains(&element.name.as_str());
        let plain_div =
            element.name == "div" && !element.has_descendant(&|el| el.name == "table");
        if decorative || plain_div {
            stats.decorations_unwrapped += 1;
            return element.children;
        }
        vec![element.into_node()]
    })
}

fn normalize_line_breaks(children: Vec<Node>, stats: &mut SanitizeStats) -> Vec<Node> {
    rewrite_bottom_up(children, &mut |element| {
        if element.name == "br" {
            stats.line_breaks_normalized += 1;
            return vec![Node::text("\n")];
        }
        vec![element.into_node()]
    })
}

fn strip_presentation_attrs(children: Vec<Node>, stats: &mut SanitizeStats) -> Vec<Node> {
    rewrite_bottom_up(children, &mut |mut element| {
        let before = element.attrs.len();
        element
            .attrs
            .retain(|name, _| !DROP_ATTRS.contains(&name.as_str()));
        stats.attributes_removed += before - element.attrs.len();
        vec![element.into_node()]
    })
}

fn normalize_nbsp(children: Vec<Node>, stats: &mut SanitizeStats) -> Vec<Node> {
    map_text(children, &mut |text| {
        let found = text.matches('\u{a0}').count();
        if found == 0 {
            return text;
        }
        stats.nbsp_replaced += found;
        text.replace('\u{a0}', " ")
    })
}

fn rewrite_scripts(children: Vec<Node>, asset_prefix: &str, stats: &mut SanitizeStats) -> Vec<Node> {
    rewrite_bottom_up(children, &mut |element| {
        if element.name != "script" {
            return vec![element.into_node()];
        }

        match classify_script(&element.text_content()) {
            ScriptMedia::Recognized(calls) => {
                let (markup, counts) = media_markup(&calls, asset_prefix);
                stats.script_images += counts.images;
                stats.script_archive_links += counts.archive_links;
                markup
            }
            ScriptMedia::Unrecognized => {
                stats.scripts_dropped += 1;
                Vec::new()
            }
        }
    })
}

fn is_math_element(name: &str) -> bool {
    name == "math" || name == "m:math"
}

fn is_math_leaf(name: &str) -> bool {
    MATH_LEAF_TAGS.contains(&name.strip_prefix(MATH_PREFIX).unwrap_or(name))
}

/// Trimmed text of the formula's only non-empty leaf, if it has exactly one.
fn single_leaf_text(math: &Element) -> Option<String> {
    fn walk(element: &Element, leaves: &mut Vec<String>) {
        for child in &element.children {
            if let Node::Element(el) = child {
                if !el.has_element_children() {
                    if is_math_leaf(&el.name) {
                        let text = el.text_content().trim().to_string();
                        if !text.is_empty() {
                            leaves.push(text);
                        }
                    }
                } else {
                    walk(el, leaves);
                }
            }
        }
    }

    let mut leaves = Vec::new();
    walk(math, &mut leaves);
    if leaves.len() == 1 { leaves.pop() } else { None }
}

fn strip_math_prefix(element: &mut Element) -> bool {
    let mut changed = false;
    if let Some(stripped) = element.name.strip_prefix(MATH_PREFIX) {
        element.name = stripped.to_string();
        changed = true;
    }
    for child in &mut element.children {
        if let Node::Element(el) = child {
            changed |= strip_math_prefix(el);
        }
    }
    changed
}

fn collapse_math(children: Vec<Node>, stats: &mut SanitizeStats) -> Vec<Node> {
    rewrite_bottom_up(children, &mut |mut element| {
        if !is_math_element(&element.name) {
            return vec![element.into_node()];
        }

        if let Some(text) = single_leaf_text(&element) {
            if LONE_DASHES.contains(&text.as_str()) {
                stats.math_dash_replaced += 1;
                return vec![Node::text(text)];
            }
        }

        if strip_math_prefix(&mut element) {
            stats.math_prefix_stripped += 1;
        }
        vec![element.into_node()]
    })
}

fn clean_anchors(children: Vec<Node>, stats: &mut SanitizeStats) -> Vec<Node> {
    rewrite_bottom_up(children, &mut |element| {
        if element.name != "a" || element.non_empty_attr("href").is_some() {
            return vec![element.into_node()];
        }

        if !element.has_element_children() && element.text_content().trim().is_empty() {
            stats.empty_anchors_removed += 1;
            Vec::new()
        } else {
            stats.anchors_unwrapped += 1;
            element.children
        }
    })
}

fn prune_empty_tags(children: Vec<Node>, stats: &mut SanitizeStats) -> Vec<Node> {
    rewrite_bottom_up(children, &mut |element| {
        let removable = EMPTY_REMOVABLE_TAGS.contains(&element.name.as_str())
            && !element.has_element_children()
            && element.text_content().trim().is_empty();
        if removable {
            stats.empty_tags_removed += 1;
            return Vec::new();
        }
        vec![element.into_node()]
    })
}

fn prune_empty_tables(children: Vec<Node>, stats: &mut SanitizeStats) -> Vec<Node> {
    rewrite_bottom_up(children, &mut |element| {
        let empty_table = element.name == "table"
            && element.text_content().trim().is_empty()
            && !element.has_descendant(&|el| {
                el.name == "img" || el.name == "a" || is_math_element(&el.name)
            });
        if empty_table {
            stats.empty_tables_removed += 1;
            return Vec::new();
        }
        vec![element.into_node()]
    })
}

/// Unwraps a lone `td`/`tr`/`tbody` at the top level until none is left.
fn collapse_wrappers(mut children: Vec<Node>, stats: &mut SanitizeStats) -> Vec<Node> {
    loop {
        let mut significant = children
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.is_blank_text());
        let (Some((index, only)), None) = (significant.next(), significant.next()) else {
            return children;
        };

        let is_wrapper = only
            .as_element()
            .is_some_and(|el| WRAPPER_TAGS.contains(&el.name.as_str()));
        if !is_wrapper {
            return children;
        }

        if let Node::Element(wrapper) = children.remove(index) {
            children.splice(index..index, wrapper.children);
            stats.wrappers_unwrapped += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize(html: &str) -> SanitizedFragment {
        let config = NormalizerConfig::default();
        Sanitizer::new(&config).sanitize_html(html)
    }

    #[test]
    fn test_empty_bold_pruned_and_cell_collapsed() {
        let fragment = sanitize("<td><b></b><p>Hello</p></td>");
        assert_eq!(fragment.cleaned_html(), "<p>Hello</p>");
        assert_eq!(fragment.stats.empty_tags_removed, 1);
        assert_eq!(fragment.stats.wrappers_unwrapped, 1);
    }

    #[test]
    fn test_import_directive_and_decorations() {
        let fragment = sanitize(
            r##"<?import namespace = m implementation = "#default#MathPlayer"><p class="MsoNormal"><span style="x">a<font>b</font></span><o:p></o:p></p>"##,
        );
        assert_eq!(fragment.cleaned_html(), "<p>ab</p>");
        assert_eq!(fragment.stats.import_directives_removed, 1);
        assert_eq!(fragment.stats.decorations_unwrapped, 3);
        assert_eq!(fragment.stats.attributes_removed, 1);
    }

    #[test]
    fn test_div_with_table_survives() {
        let fragment = sanitize("<div><table><tr><td>1</td></tr></table></div><div>x</div>");
        assert_eq!(
            fragment.cleaned_html(),
            "<div><table><tr><td>1</td></tr></table></div>x"
        );
    }

    #[test]
    fn test_line_breaks_and_nbsp() {
        let fragment = sanitize("<p>a&nbsp;b<br>c</p>");
        assert_eq!(fragment.cleaned_html(), "<p>a b\nc</p>");
        assert_eq!(fragment.stats.nbsp_replaced, 1);
        assert_eq!(fragment.stats.line_breaks_normalized, 1);
    }

    #[test]
    fn test_keeps_structural_attributes() {
        let fragment = sanitize(r#"<p><img src="assets/x.png" width="10" alt="x"></p>"#);
        assert_eq!(
            fragment.cleaned_html(),
            r#"<p><img alt="x" src="assets/x.png"></p>"#
        );
    }

    #[test]
    fn test_script_becomes_image() {
        let fragment = sanitize("<p>See<script>ShowPictureQ('09DBE5.gif');</script></p>");
        assert_eq!(
            fragment.cleaned_html(),
            r#"<p>See<img alt="" src="assets/09DBE5.gif"></p>"#
        );
        assert_eq!(fragment.stats.script_images, 1);
        assert!(!fragment.cleaned_html().contains("script"));
    }

    #[test]
    fn test_unknown_script_dropped() {
        let fragment = sanitize("<p>x<script>track();</script></p>");
        assert_eq!(fragment.cleaned_html(), "<p>x</p>");
        assert_eq!(fragment.stats.scripts_dropped, 1);
    }

    #[test]
    fn test_math_dash_collapses() {
        let fragment = sanitize("<p>a <m:math><m:mrow><m:mo>\u{2013}</m:mo></m:mrow></m:math> b</p>");
        assert_eq!(fragment.cleaned_html(), "<p>a \u{2013} b</p>");
        assert_eq!(fragment.stats.math_dash_replaced, 1);
    }

    #[test]
    fn test_math_prefix_stripped_when_kept() {
        let fragment = sanitize("<m:math><m:mi>x</m:mi><m:mo>+</m:mo><m:mn>1</m:mn></m:math>");
        assert_eq!(
            fragment.cleaned_html(),
            "<math><mi>x</mi><mo>+</mo><mn>1</mn></math>"
        );
        assert_eq!(fragment.stats.math_prefix_stripped, 1);
    }

    #[test]
    fn test_anchor_cleanup() {
        let fragment = sanitize(
            r#"<p><a name="q1"></a>text <a name="x">kept</a> <a href="assets/a.pdf">doc</a></p>"#,
        );
        assert_eq!(
            fragment.cleaned_html(),
            r#"<p>text kept <a href="assets/a.pdf">doc</a></p>"#
        );
        assert_eq!(fragment.stats.empty_anchors_removed, 1);
        assert_eq!(fragment.stats.anchors_unwrapped, 1);
    }

    #[test]
    fn test_notice_row_removed_across_line_breaks() {
        let fragment = sanitize(
            "<table><tr><td>Для выполнения\n   задания  используйте<br>дополнительные файлы.</td></tr>\
             <tr><td>Условие</td></tr></table>",
        );
        assert!(fragment.requires_attachment);
        assert_eq!(fragment.stats.notice_rows_removed, 1);
        assert_eq!(
            fragment.cleaned_html(),
            "<table><tr><td>Условие</td></tr></table>"
        );
    }

    #[test]
    fn test_notice_row_with_other_text_kept() {
        let fragment = sanitize(
            "<table><tr><td>Для выполнения задания используйте дополнительные файлы и таблицу.</td></tr></table>",
        );
        assert!(!fragment.requires_attachment);
        assert_eq!(fragment.stats.notice_rows_removed, 0);
    }

    #[test]
    fn test_archive_link_row_removed() {
        let fragment = sanitize(
            "<table><tr><td><script>ShowPictureQ2WH('t.zip','','0','0')</script></td></tr>\
             <tr><td>Найдите сумму</td></tr></table>",
        );
        assert_eq!(fragment.stats.script_archive_links, 1);
        assert_eq!(fragment.stats.archive_rows_removed, 1);
        assert_eq!(
            fragment.cleaned_html(),
            "<table><tr><td>Найдите сумму</td></tr></table>"
        );
    }

    #[test]
    fn test_row_with_foreign_link_kept() {
        let fragment = sanitize(
            r#"<table><tr><td><a href="https://example.org/a.zip">a.zip</a></td></tr></table>"#,
        );
        assert_eq!(fragment.stats.archive_rows_removed, 0);
    }

    #[test]
    fn test_empty_table_pruned() {
        let fragment = sanitize("<p>x</p><table><tr><td> </td></tr></table>");
        assert_eq!(fragment.cleaned_html(), "<p>x</p>");
        assert_eq!(fragment.stats.empty_tables_removed, 1);
    }

    #[test]
    fn test_table_with_only_image_kept() {
        let fragment = sanitize(r#"<p>x</p><table><tr><td><img src="assets/a.png"></td></tr></table>"#);
        assert_eq!(fragment.stats.empty_tables_removed, 0);
    }

    #[test]
    fn test_wrapper_chain_collapses() {
        let fragment = sanitize("<tbody>\n<tr>\n<td><p>a</p><p>b</p></td>\n</tr>\n</tbody>");
        assert_eq!(fragment.stats.wrappers_unwrapped, 3);
        assert_eq!(fragment.cleaned_html(), "\n\n<p>a</p><p>b</p>\n\n");
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let html = r#"<td><div class="x"><table><tr><td>Для выполнения задания используйте дополнительные файлы</td></tr></table></div>
            <p><span>Число&nbsp;111<sub>10</sub></span><a name="a"></a></p><script>ShowPictureQ('a.gif')</script></td>"#;
        let first = sanitize(html);
        assert!(!first.stats.is_empty());

        let second = sanitize(&first.cleaned_html());
        assert!(second.stats.is_empty(), "{:?}", second.stats);
        assert_eq!(second.cleaned_html(), first.cleaned_html());
    }

    #[test]
    fn test_stats_add_up() {
        let mut total = SanitizeStats::default();
        total += sanitize("<td><b></b><p>Hello</p></td>").stats;
        total += sanitize("<p>a<br>b</p>").stats;
        assert_eq!(total.wrappers_unwrapped, 1);
        assert_eq!(total.line_breaks_normalized, 1);
        assert_eq!(total.total(), 3);
    }
}
