use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
    TokenizerResult,
};

use super::dom::{Element, Node, is_void_element, merge_adjacent_text};

/// Builds a [`Element`] tree straight from html5ever tokens.
///
/// The HTML5 tree-construction rules are not applied: question
/// bodies are table cells cut out of a larger page, and a conforming parser
/// would drop a top-level `<td>` or hoist stray cell content out of its table.
/// Nesting follows the tags as written, the way a forgiving SAX builder does.
struct FragmentSink {
    stack: Vec<Element>,
    parse_errors: usize,
}

impl FragmentSink {
    fn new() -> Self {
        Self {
            stack: vec![Element::root(Vec::new())],
            parse_errors: 0,
        }
    }

    fn current(&mut self) -> &mut Element {
        // The root is pushed in `new` and never popped.
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.current().children.push(Node::text(text));
    }

    fn close_top(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(element) = self.stack.pop() {
            self.current().children.push(Node::Element(element));
        }
    }

    fn handle_tag(&mut self, tag: Tag) -> TokenSinkResult<()> {
        let name = tag.name.to_string();
        match tag.kind {
            TagKind::StartTag => {
                let mut element = Element::new(name.as_str());
                for attr in tag.attrs {
                    element
                        .attrs
                        .insert(attr.name.local.to_string(), attr.value.to_string());
                }

                if is_void_element(&name) || tag.self_closing {
                    self.current().children.push(Node::Element(element));
                    return TokenSinkResult::Continue;
                }

                self.stack.push(element);
                match name.as_str() {
                    "script" => TokenSinkResult::RawData(RawKind::ScriptData),
                    "style" => TokenSinkResult::RawData(RawKind::Rawtext),
                    _ => TokenSinkResult::Continue,
                }
            }
            TagKind::EndTag => {
                let open_at = self
                    .stack
                    .iter()
                    .rposition(|element| element.name == name)
                    .filter(|&index| index > 0);

                match open_at {
                    Some(index) => {
                        while self.stack.len() > index {
                            self.close_top();
                        }
                    }
                    None => {
                        log::trace!("Ignoring stray end tag </{name}>");
                        self.parse_errors += 1;
                    }
                }
                TokenSinkResult::Continue
            }
        }
    }

    fn finish(&mut self) -> Element {
        while self.stack.len() > 1 {
            self.close_top();
        }
        let mut root = self
            .stack
            .pop()
            .unwrap_or_else(|| Element::root(Vec::new()));
        root.children = merge_adjacent_text(std::mem::take(&mut root.children));
        root
    }
}

impl TokenSink for FragmentSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => return self.handle_tag(tag),
            Token::CharacterTokens(text) => self.push_text(&text),
            Token::ParseError(_) => self.parse_errors += 1,
            Token::NullCharacterToken
            | Token::CommentToken(_)
            | Token::DoctypeToken(_)
            | Token::EOFToken => {}
        }
        TokenSinkResult::Continue
    }
}

/// Parses an HTML fragment under a synthetic root element.
///
/// Never fails: unclosed elements are closed at the end of input and unmatched
/// end tags are ignored, so whatever was recoverable is returned.
pub fn parse_fragment(html: &str) -> Element {
    let mut tokenizer = Tokenizer::new(FragmentSink::new(), TokenizerOpts::default());
    let mut queue = BufferQueue::default();
    queue.push_back(StrTendril::from_slice(html));
    match tokenizer.feed(&mut queue) {
        TokenizerResult::Done => {}
        // The sink never returns `TokenSinkResult::Script`, so feeding never pauses.
        TokenizerResult::Script(()) => {}
    }
    tokenizer.end();

    if tokenizer.sink.parse_errors > 0 {
        log::debug!(
            "Recovered from {} markup anomalies while parsing fragment",
            tokenizer.sink.parse_errors
        );
    }
    tokenizer.sink.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_element(root: &Element) -> &Element {
        root.children
            .iter()
            .find_map(Node::as_element)
            .expect("fragment should contain an element")
    }

    #[test]
    fn test_keeps_top_level_table_cell() {
        let root = parse_fragment("<td><b></b><p>Hello</p></td>");
        assert_eq!(root.children.len(), 1);
        let td = first_element(&root);
        assert_eq!(td.name, "td");
        assert_eq!(td.children.len(), 2);
        assert!(td.children[1].is_element_named("p"));
    }

    #[test]
    fn test_decodes_entities_and_keeps_namespaced_tags() {
        let root = parse_fragment("<m:math><m:mi>a&nbsp;&lt;&nbsp;b</m:mi></m:math><o:p></o:p>");
        let math = first_element(&root);
        assert_eq!(math.name, "m:math");
        assert_eq!(math.text_content(), "a\u{a0}<\u{a0}b");
        assert!(root.children[1].is_element_named("o:p"));
    }

    #[test]
    fn test_script_body_is_raw_text() {
        let root = parse_fragment("<script>if (a<b) ShowPictureQ('x.gif');</script>after");
        let script = first_element(&root);
        assert_eq!(script.name, "script");
        assert_eq!(script.text_content(), "if (a<b) ShowPictureQ('x.gif');");
        assert_eq!(root.children[1], Node::text("after"));
    }

    #[test]
    fn test_input_after_several_scripts_is_kept() {
        let root = parse_fragment("<script>a()</script>x<script>b()</script><p>y</p>");
        assert_eq!(
            root.serialize_children(),
            "<script>a()</script>x<script>b()</script><p>y</p>"
        );
    }

    #[test]
    fn test_recovers_from_unclosed_and_stray_tags() {
        let root = parse_fragment("<p>one<b>two</p>three</i>");
        assert_eq!(root.serialize_children(), "<p>one<b>two</b></p>three");

        let root = parse_fragment("<div><p>never closed");
        assert_eq!(root.serialize_children(), "<div><p>never closed</p></div>");
    }

    #[test]
    fn test_void_elements_take_no_children() {
        let root = parse_fragment("a<br>b<img src=\"x.png\">c");
        assert_eq!(root.children.len(), 5);
        assert!(root.children[1].is_element_named("br"));
        assert_eq!(root.children[4], Node::text("c"));
    }

    #[test]
    fn test_serialization_round_trips() {
        let html = r#"<table><tr><td>1</td><td><a href="assets/a.zip">a.zip</a></td></tr></table>"#;
        assert_eq!(parse_fragment(html).serialize_children(), html);
    }
}
