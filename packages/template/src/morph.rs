use std::fmt;

use crate::{
    element::{pad, Node, RenderOptions},
    types::{HelperCall, Value},
};

/// A dynamic binding recovered from a render node.
#[derive(Debug, Clone, PartialEq)]
pub enum Morph {
    /// `{{ helper params... key=value... }}` as a child.
    Inline(HelperCall),
    /// `<tag key=VALUE>`
    Attribute(AttributeMorph),
    /// `<tag {{ helper params... key=value... }}>`
    Element(ElementMorph),
    /// `{{ content }}`
    Content(String),
    /// `{{#helper ...}} ... {{else}} ... {{/helper}}`
    Block(BlockMorph),
}

impl Morph {
    pub fn render(&self, indent: usize, options: &RenderOptions) -> String {
        match self {
            Morph::Inline(call) => call.to_string(),
            Morph::Attribute(morph) => morph.to_string(),
            Morph::Element(morph) => morph.to_string(),
            Morph::Content(content) => format!("{{{{ {content} }}}}"),
            Morph::Block(block) => block.render(indent, options),
        }
    }

    pub fn morph_name(&self) -> &'static str {
        match self {
            Morph::Inline(_) => "inline",
            Morph::Attribute(_) => "attribute",
            Morph::Element(_) => "element",
            Morph::Content(_) => "content",
            Morph::Block(_) => "block",
        }
    }
}

impl fmt::Display for Morph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(0, &RenderOptions::default()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeMorph {
    pub key: String,
    pub value: Value,
}

impl AttributeMorph {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl fmt::Display for AttributeMorph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value.to_inline_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementMorph {
    pub call: HelperCall,
}

impl ElementMorph {
    pub fn new(call: HelperCall) -> Self {
        Self { call }
    }
}

impl fmt::Display for ElementMorph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.call.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockMorph {
    pub call: HelperCall,
    pub program: Node,
    pub inverse: Option<Node>,
}

impl BlockMorph {
    pub fn new(call: HelperCall, program: Node, inverse: Option<Node>) -> Self {
        Self {
            call,
            program,
            inverse,
        }
    }

    /// The opening tag is not padded; the placeholder owning the block is.
    /// `{{else}}` and the closing tag return to `indent`.
    pub fn render(&self, indent: usize, options: &RenderOptions) -> String {
        let inner = indent + options.step();

        let mut result = format!("{{{{#{} }}}}\n", self.call.signature());
        result.push_str(&self.program.render(inner, options));

        if let Some(inverse) = &self.inverse {
            result.push('\n');
            result.push_str(&pad(indent));
            result.push_str("{{else}}\n");
            result.push_str(&inverse.render(inner, options));
        }

        result.push('\n');
        result.push_str(&pad(indent));
        result.push_str(&format!("{{{{/{}}}}}", self.call.name));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Hash;

    fn call(params: Vec<Value>, hash: Hash) -> HelperCall {
        HelperCall::new("foo", params, hash)
    }

    fn bar_ten() -> Hash {
        [("bar", Value::literal(10))].into_iter().collect()
    }

    #[test]
    fn inline_renders_optional_groups() {
        assert_eq!(Morph::Inline(call(vec![], Hash::new())).to_string(), "{{ foo }}");
        assert_eq!(
            Morph::Inline(call(vec![Value::literal(10)], Hash::new())).to_string(),
            "{{ foo 10 }}"
        );
        assert_eq!(Morph::Inline(call(vec![], bar_ten())).to_string(), "{{ foo bar=10 }}");
        assert_eq!(
            Morph::Inline(call(vec![Value::literal(10)], bar_ten())).to_string(),
            "{{ foo 10 bar=10 }}"
        );
    }

    #[test]
    fn element_morph_matches_inline_layout() {
        let morph = ElementMorph::new(call(vec![Value::literal(10)], bar_ten()));
        assert_eq!(morph.to_string(), "{{ foo 10 bar=10 }}");
        assert_eq!(ElementMorph::new(call(vec![], Hash::new())).to_string(), "{{ foo }}");
    }

    #[test]
    fn attribute_morph_uses_inline_value() {
        let morph = AttributeMorph::new("foo", Value::path("bar"));
        assert_eq!(morph.to_string(), "foo={{ bar }}");
        assert_eq!(
            AttributeMorph::new("foo", Value::literal("bar")).to_string(),
            "foo='bar'"
        );
    }

    #[test]
    fn content_morph() {
        assert_eq!(Morph::Content("foo".to_string()).to_string(), "{{ foo }}");
    }

    #[test]
    fn block_without_inverse() {
        let morph = BlockMorph::new(
            HelperCall::new("if", vec![], Hash::new()),
            Node::text("foo"),
            None,
        );
        assert_eq!(
            morph.render(0, &RenderOptions::default()),
            "{{#if }}\n    foo\n{{/if}}"
        );
    }

    #[test]
    fn block_with_inverse() {
        let morph = BlockMorph::new(
            HelperCall::new("if", vec![], Hash::new()),
            Node::text("foo"),
            Some(Node::text("bar")),
        );
        assert_eq!(
            morph.render(0, &RenderOptions::default()),
            "{{#if }}\n    foo\n{{else}}\n    bar\n{{/if}}"
        );
    }

    #[test]
    fn block_respects_indentation() {
        let morph = BlockMorph::new(
            HelperCall::new("if", vec![], Hash::new()),
            Node::text("foo"),
            Some(Node::text("bar")),
        );
        assert_eq!(
            morph.render(2, &RenderOptions::default()),
            "{{#if }}\n      foo\n  {{else}}\n      bar\n  {{/if}}"
        );
    }

    #[test]
    fn block_threads_custom_step_into_bodies() {
        let morph = BlockMorph::new(
            HelperCall::new("if", vec![], Hash::new()),
            Node::text("foo"),
            Some(Node::text("bar")),
        );
        assert_eq!(
            morph.render(0, &RenderOptions::new().indent(2)),
            "{{#if }}\n  foo\n{{else}}\n  bar\n{{/if}}"
        );
    }

    #[test]
    fn block_renders_params_and_hash() {
        let with_params = BlockMorph::new(
            HelperCall::new("if", vec![Value::literal(10)], Hash::new()),
            Node::text("foo"),
            None,
        );
        assert_eq!(Morph::Block(with_params).to_string(), "{{#if 10 }}\n    foo\n{{/if}}");

        let with_hash = BlockMorph::new(
            HelperCall::new("if", vec![], bar_ten()),
            Node::text("foo"),
            None,
        );
        assert_eq!(Morph::Block(with_hash).to_string(), "{{#if bar=10 }}\n    foo\n{{/if}}");
    }
}
