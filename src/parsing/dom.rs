use std::collections::BTreeMap;

/// Name of the synthetic element every parsed fragment hangs from.
pub const ROOT_NAME: &str = "#root";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

fn is_raw_text_element(name: &str) -> bool {
    matches!(name, "script" | "style")
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn is_element_named(&self, name: &str) -> bool {
        self.as_element().is_some_and(|el| el.name == name)
    }

    /// Text with nothing but whitespace (or no text at all).
    pub fn is_blank_text(&self) -> bool {
        match self {
            Node::Text(text) => text.trim().is_empty(),
            Node::Element(_) => false,
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    pub fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Element(element) => element.write_html(out),
        }
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn root(children: Vec<Node>) -> Self {
        Self {
            name: ROOT_NAME.to_string(),
            attrs: BTreeMap::new(),
            children,
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Attribute value, treating an empty string like a missing attribute.
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).filter(|value| !value.trim().is_empty())
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    pub fn has_element_children(&self) -> bool {
        self.children.iter().any(|child| child.as_element().is_some())
    }

    pub fn has_descendant(&self, pred: &dyn Fn(&Element) -> bool) -> bool {
        self.children.iter().any(|child| match child {
            Node::Element(el) => pred(el) || el.has_descendant(pred),
            Node::Text(_) => false,
        })
    }

    pub fn into_node(self) -> Node {
        Node::Element(self)
    }

    /// Serializes the element itself, its attributes and its subtree.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Serializes only the children; this is how a fragment root is persisted.
    pub fn serialize_children(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.write_html(&mut out);
        }
        out
    }

    fn write_html(&self, out: &mut String) {
        if self.name == ROOT_NAME {
            out.push_str(&self.serialize_children());
            return;
        }

        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&html_escape::encode_double_quoted_attribute(value));
            out.push('"');
        }
        out.push('>');

        if is_void_element(&self.name) {
            return;
        }

        if is_raw_text_element(&self.name) {
            for child in &self.children {
                if let Node::Text(text) = child {
                    out.push_str(text);
                }
            }
        } else {
            for child in &self.children {
                child.write_html(out);
            }
        }

        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).replace('\u{a0}', "&nbsp;")
}

/// Joins neighbouring text nodes so later passes see one run per gap.
pub fn merge_adjacent_text(children: Vec<Node>) -> Vec<Node> {
    let mut merged: Vec<Node> = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Node::Text(next) => {
                if let Some(Node::Text(prev)) = merged.last_mut() {
                    prev.push_str(&next);
                } else {
                    merged.push(Node::Text(next));
                }
            }
            Node::Element(mut element) => {
                element.children = merge_adjacent_text(element.children);
                merged.push(Node::Element(element));
            }
        }
    }
    merged.retain(|node| !matches!(node, Node::Text(text) if text.is_empty()));
    merged
}
