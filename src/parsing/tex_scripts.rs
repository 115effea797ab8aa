use once_cell::sync::Lazy;
use regex::Regex;

use super::dom::{Element, Node, merge_adjacent_text};

static SINGLE_MATH_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$[^$]+\$$").expect("valid regex"));
static TRAILING_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9A-Za-zА-Яа-яЁё]+)\s*$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptKind {
    Sub,
    Sup,
}

impl ScriptKind {
    fn of(name: &str) -> Option<Self> {
        match name {
            "sub" => Some(ScriptKind::Sub),
            "sup" => Some(ScriptKind::Sup),
            _ => None,
        }
    }

    fn tex(self, body: &str) -> String {
        match self {
            ScriptKind::Sub => format!("_{{{body}}}"),
            ScriptKind::Sup => format!("^{{{body}}}"),
        }
    }
}

/// Replaces every `sub`/`sup` element with a TeX script glued onto its base.
///
/// `111<sub>10</sub>` becomes the text `$111_{10}$`. Returns the rewritten
/// tree and the number of scripts converted.
pub fn convert_sub_sup(root: Element) -> (Element, usize) {
    let mut converted = 0;
    let children = convert_children(root.children, &mut converted);
    let root = Element {
        children: merge_adjacent_text(children),
        ..root
    };
    (root, converted)
}

fn convert_children(children: Vec<Node>, converted: &mut usize) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(children.len());

    for child in children {
        let mut element = match child {
            Node::Element(element) => element,
            text => {
                out.push(text);
                continue;
            }
        };

        let Some(kind) = ScriptKind::of(&element.name) else {
            element.children = convert_children(element.children, converted);
            out.push(element.into_node());
            continue;
        };

        let body = element.text_content();
        let body = body.trim();
        if body.is_empty() {
            continue;
        }

        let script = kind.tex(body);
        *converted += 1;
        if !attach_to_base(&mut out, &script) {
            out.push(Node::text(format!("${script}$")));
        }
    }

    out
}

/// Glues `script` onto the nearest preceding non-blank sibling already in `out`.
fn attach_to_base(out: &mut [Node], script: &str) -> bool {
    let Some(base) = out.iter_mut().rev().find(|node| !node.is_blank_text()) else {
        return false;
    };

    match base {
        Node::Text(text) => {
            let stripped = text.trim();
            if SINGLE_MATH_SPAN.is_match(stripped) {
                let inner = &stripped[1..stripped.len() - 1];
                let spliced = format!("${inner}{script}$");
                *text = text.replacen(stripped, &spliced, 1);
                return true;
            }

            let Some(token) = TRAILING_TOKEN.captures(text).and_then(|caps| caps.get(1)) else {
                return false;
            };
            *text = format!("{}${}{script}$", &text[..token.start()], token.as_str());
            true
        }
        Node::Element(element) => {
            let base_text = element.text_content();
            let base_text = base_text.trim();
            if base_text.is_empty() {
                return false;
            }
            *base = Node::text(format!("${base_text}{script}$"));
            true
        }
    }
}
