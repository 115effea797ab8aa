use once_cell::sync::Lazy;
use regex::Regex;

use super::dom::{Element, Node};

static EXTRA_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Sanitized tree to Markdown renderer.
///
/// Only the node shapes the sanitizer leaves behind need to come out right:
/// paragraphs, emphasis, links, images, lists and short code. Tables and math
/// are not converted at all; their markup is emitted verbatim so a later stage
/// (or the reader's browser) can deal with them.
///
/// # Usage
///
/// ```rust
/// use fipimark::parsing::fragment_parser::parse_fragment;
/// use fipimark::parsing::markdown_renderer::MarkdownRenderer;
///
/// let root = parse_fragment("<p>Hello <b>world</b></p>");
/// let markdown = MarkdownRenderer::new(3).render(&root);
/// assert_eq!(markdown, "Hello **world**\n");
/// ```
pub struct MarkdownRenderer {
    indent_unit: String,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(3)
    }
}

impl MarkdownRenderer {
    /// `list_indent` is the number of spaces one list nesting level adds.
    pub fn new(list_indent: usize) -> Self {
        MarkdownRenderer {
            indent_unit: " ".repeat(list_indent),
        }
    }

    /// Renders the children of `root` and normalizes the surrounding blank lines.
    pub fn render(&self, root: &Element) -> String {
        let mut output = String::new();
        self.render_children(&root.children, "", &mut output);

        let collapsed = EXTRA_BLANK_LINES.replace_all(&output, "\n\n");
        let mut markdown = collapsed.trim().to_string();
        markdown.push('\n');
        markdown
    }

    fn render_children(&self, children: &[Node], indent: &str, output: &mut String) {
        for child in children {
            self.render_node(child, indent, output);
        }
    }

    fn children_to_string(&self, element: &Element, indent: &str) -> String {
        let mut output = String::new();
        self.render_children(&element.children, indent, &mut output);
        output
    }

    fn render_node(&self, node: &Node, indent: &str, output: &mut String) {
        match node {
            Node::Text(text) => output.push_str(text),
            Node::Element(element) => self.render_element(element, indent, output),
        }
    }

    fn render_element(&self, element: &Element, indent: &str, output: &mut String) {
        match element.name.as_str() {
            "br" => output.push('\n'),
            "b" | "strong" => {
                output.push_str("**");
                self.render_children(&element.children, indent, output);
                output.push_str("**");
            }
            "i" | "em" => {
                output.push('*');
                self.render_children(&element.children, indent, output);
                output.push('*');
            }
            "code" => {
                let code = self.children_to_string(element, indent);
                output.push('`');
                output.push_str(&code.replace('`', "\\`"));
                output.push('`');
            }
            "pre" => {
                output.push_str("\n```\n");
                output.push_str(element.text_content().trim());
                output.push_str("\n```\n");
            }
            "img" => {
                let alt = element.attr("alt").unwrap_or_default();
                let src = element.attr("src").unwrap_or_default();
                output.push_str(&format!("![{alt}]({src})"));
            }
            "a" => self.render_link(element, indent, output),
            "ul" => self.render_list(element, indent, false, output),
            "ol" => self.render_list(element, indent, true, output),
            "li" => {
                output.push_str(indent);
                output.push_str("- ");
                output.push_str(&self.list_item_body(element, indent));
                output.push('\n');
            }
            "p" => self.render_paragraph(element, indent, output),
            "table" => {
                output.push_str("\n\n");
                output.push_str(&element.to_html());
                output.push_str("\n\n");
            }
            "thead" | "tbody" | "tr" | "td" | "th" | "math" | "m:math" => {
                output.push_str(&element.to_html());
            }
            _ => self.render_children(&element.children, indent, output),
        }
    }

    fn render_link(&self, element: &Element, indent: &str, output: &mut String) {
        let text = self.children_to_string(element, indent);
        let text = text.trim();

        match element.non_empty_attr("href") {
            Some(href) => {
                let label = if text.is_empty() { href } else { text };
                output.push_str(&format!("[{label}]({href})"));
            }
            None => output.push_str(text),
        }
    }

    fn render_paragraph(&self, element: &Element, indent: &str, output: &mut String) {
        let content = self.children_to_string(element, indent);
        let content = content.trim();
        if content.is_empty() {
            output.push('\n');
        } else {
            output.push_str(content);
            output.push_str("\n\n");
        }
    }

    /// The item's children one level deeper, trimmed, with inner lines re-indented.
    fn list_item_body(&self, item: &Element, indent: &str) -> String {
        let nested = format!("{indent}{}", self.indent_unit);
        let body = self.children_to_string(item, &nested);
        body.trim().replace('\n', &format!("\n{nested}"))
    }

    fn render_list(&self, list: &Element, indent: &str, ordered: bool, output: &mut String) {
        let mut items = Vec::new();
        let mut number = 1;

        for child in &list.children {
            match child {
                Node::Text(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        items.push(format!("{indent}{text}"));
                    }
                }
                Node::Element(item) if item.name == "li" => {
                    let marker = if ordered {
                        let marker = format!("{number}.");
                        number += 1;
                        marker
                    } else {
                        "-".to_string()
                    };
                    let body = self.list_item_body(item, indent);
                    items.push(format!("{indent}{marker} {body}"));
                }
                Node::Element(other) => {
                    let mut rendered = String::new();
                    self.render_element(other, indent, &mut rendered);
                    items.push(rendered);
                }
            }
        }

        output.push('\n');
        output.push_str(&items.join("\n"));
        output.push_str("\n\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::fragment_parser::parse_fragment;

    fn render(html: &str) -> String {
        MarkdownRenderer::default().render(&parse_fragment(html))
    }

    #[test]
    fn test_paragraphs_and_emphasis() {
        assert_eq!(
            render("<p>One <b>bold</b> and <i>it</i></p><p></p><p>Two</p>"),
            "One **bold** and *it*\n\nTwo\n"
        );
    }

    #[test]
    fn test_line_break_and_blank_line_collapse() {
        assert_eq!(render("<p>a<br>b</p>\n\n\n\n<p>c</p>"), "a\nb\n\nc\n");
    }

    #[test]
    fn test_code_escapes_backticks() {
        assert_eq!(render("<code>a`b</code>"), "`a\\`b`\n");
        assert_eq!(render("<pre>\n  x = 1\n</pre>"), "```\nx = 1\n```\n");
    }

    #[test]
    fn test_image_attributes_never_omitted() {
        assert_eq!(
            render(r#"<img src="assets/a.gif">"#),
            "![](assets/a.gif)\n"
        );
        assert_eq!(render("<img>"), "![]()\n");
    }

    #[test]
    fn test_link_text_fallbacks() {
        assert_eq!(
            render(r#"<a href="assets/t.zip">t.zip</a>"#),
            "[t.zip](assets/t.zip)\n"
        );
        assert_eq!(
            render(r#"<a href="assets/t.zip"> </a>"#),
            "[assets/t.zip](assets/t.zip)\n"
        );
        assert_eq!(render("<a>plain</a>"), "plain\n");
    }

    #[test]
    fn test_ordered_list_numbers_restart_per_list() {
        let markdown = render("<ol><li>a</li><li>b</li></ol><ol><li>c</li></ol>");
        assert_eq!(markdown, "1. a\n2. b\n\n1. c\n");
    }

    #[test]
    fn test_nested_list_is_indented() {
        let markdown = render("<ul><li>top<ul><li>inner</li></ul></li><li>next</li></ul>");
        assert_eq!(markdown, "- top\n      - inner\n- next\n");
    }

    #[test]
    fn test_list_item_paragraphs_reindented() {
        let markdown = render("<ol><li><p>first</p><p>second</p></li></ol>");
        assert_eq!(markdown, "1. first\n   \n   second\n");
    }

    #[test]
    fn test_table_passes_through_verbatim() {
        let html = "<p>Before</p><table><tr><td>1</td><td><b>2</b></td></tr></table><p>After</p>";
        assert_eq!(
            render(html),
            "Before\n\n<table><tr><td>1</td><td><b>2</b></td></tr></table>\n\nAfter\n"
        );
    }

    #[test]
    fn test_math_passes_through_verbatim() {
        assert_eq!(
            render("<p>Let <math><mi>x</mi></math> be</p>"),
            "Let <math><mi>x</mi></math> be\n"
        );
    }

    #[test]
    fn test_unknown_elements_are_transparent() {
        assert_eq!(render("<center><u>x</u></center>"), "x\n");
    }
}
