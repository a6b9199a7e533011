use std::fmt;

use crate::morph::{AttributeMorph, ElementMorph, Morph};

pub const DEFAULT_INDENT: usize = 4;

/// Formatting knobs threaded through every recursive render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Spaces added per nesting level, `0` meaning the default.
    pub indent: usize,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spaces per nesting level. `0` falls back to [`DEFAULT_INDENT`].
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub(crate) fn step(&self) -> usize {
        match self.indent {
            0 => DEFAULT_INDENT,
            step => step,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
        }
    }
}

pub(crate) fn pad(indent: usize) -> String {
    " ".repeat(indent)
}

/// The decompiled document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Root created by `createDocumentFragment`, renders its children only.
    Fragment(Vec<Node>),
    Element(Element),
    Text(String),
    Comment(String),
    /// Placeholder standing where a morph was created.
    Morph(Box<Morph>),
}

impl Node {
    pub fn text(contents: impl Into<String>) -> Self {
        Node::Text(contents.into())
    }

    pub fn comment(contents: impl Into<String>) -> Self {
        Node::Comment(contents.into())
    }

    pub fn morph(morph: Morph) -> Self {
        Node::Morph(Box::new(morph))
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Fragment(children) => children,
            Node::Element(element) => &element.children,
            Node::Text(_) | Node::Comment(_) | Node::Morph(_) => &[],
        }
    }

    pub fn render(&self, indent: usize, options: &RenderOptions) -> String {
        match self {
            Node::Fragment(children) => children
                .iter()
                .map(|node| node.render(indent, options))
                .collect::<Vec<_>>()
                .join("\n"),
            Node::Element(element) => element.render(indent, options),
            Node::Text(contents) => format!("{}{contents}", pad(indent)),
            Node::Comment(contents) => format!("{}<!-- {contents} -->", pad(indent)),
            Node::Morph(morph) => format!("{}{}", pad(indent), morph.render(indent, options)),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(0, &RenderOptions::default()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    /// Static attributes, known without evaluating anything.
    pub attributes: Vec<(String, String)>,
    pub attribute_morphs: Vec<AttributeMorph>,
    pub element_morphs: Vec<ElementMorph>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Overwrites an existing attribute without moving it.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn render(&self, indent: usize, options: &RenderOptions) -> String {
        let mut open = format!("<{}", self.tag);

        let attributes = self
            .attributes
            .iter()
            .map(|(k, v)| format!("{k}='{v}'"))
            .collect::<Vec<_>>()
            .join(" ");
        let attribute_morphs = self
            .attribute_morphs
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let element_morphs = self
            .element_morphs
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(" ");

        for group in [attributes, attribute_morphs, element_morphs] {
            if !group.is_empty() {
                open.push(' ');
                open.push_str(&group);
            }
        }

        let children = if self.children.is_empty() {
            String::new()
        } else {
            let inner = indent + options.step();
            let body = self
                .children
                .iter()
                .map(|node| node.render(inner, options))
                .collect::<Vec<_>>()
                .join("\n");
            format!("{body}\n")
        };

        format!("{open}>\n{children}</{}>", self.tag)
    }
}
