//! Ember 1.x templates: the artifact drives its own rendering and calls
//! back into the hooks below, which record morphs instead of resolving
//! anything.

use id_tree::NodeId;
use log::trace;
use serde_json::Value as JsonValue;
use shave_template::{
    error::ParseError, BlockMorph, ElementMorph, Hash, HelperCall, Literal, Morph, Node, Value,
};

use crate::{
    artifact::Artifact,
    dom::{AttrMorphRef, RecordingDocument, SlotRef},
    error::{DecompileError, Result},
};

/// A hook argument: either something a hook already produced, or a raw
/// primitive the compiled code passed inline.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Raw(JsonValue),
    Value(Value),
}

impl Argument {
    pub fn into_value(self) -> Result<Value, ParseError> {
        match self {
            Argument::Value(v) => Ok(v),
            Argument::Raw(raw) => Literal::from_json(&raw).map(Value::Literal),
        }
    }
}

impl From<Value> for Argument {
    fn from(v: Value) -> Self {
        Argument::Value(v)
    }
}

impl From<JsonValue> for Argument {
    fn from(v: JsonValue) -> Self {
        Argument::Raw(v)
    }
}

macro_rules! raw_argument_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Argument {
                fn from(v: $t) -> Self {
                    Argument::Raw(JsonValue::from(v))
                }
            }
        )*
    };
}

raw_argument_from!(&str, String, bool, i32, i64, u64, f64);

fn convert_params(params: Vec<Argument>) -> Result<Vec<Value>, ParseError> {
    params.into_iter().map(Argument::into_value).collect()
}

fn convert_hash(hash: Vec<(&str, Argument)>) -> Result<Hash, ParseError> {
    let mut result = Hash::new();
    for (key, value) in hash {
        result.insert(key, value.into_value()?);
    }
    Ok(result)
}

fn helper_call(name: &str, params: Vec<Argument>, hash: Vec<(&str, Argument)>) -> Result<HelperCall> {
    Ok(HelperCall::new(name, convert_params(params)?, convert_hash(hash)?))
}

/// The `env` object handed to `render`: the recording document plus hooks.
pub struct HookEnv {
    pub dom: RecordingDocument,
}

impl HookEnv {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dom: RecordingDocument::new()?,
        })
    }

    pub fn get(&self, path: &str) -> Value {
        Value::path(path)
    }

    pub fn concat(&self, params: Vec<Argument>) -> Result<Value> {
        Ok(Value::Concat(convert_params(params)?))
    }

    pub fn subexpr(
        &self,
        name: &str,
        params: Vec<Argument>,
        hash: Vec<(&str, Argument)>,
    ) -> Result<Value> {
        Ok(Value::SubExpr(helper_call(name, params, hash)?))
    }

    pub fn inline(
        &mut self,
        slot: &SlotRef,
        name: &str,
        params: Vec<Argument>,
        hash: Vec<(&str, Argument)>,
    ) -> Result<()> {
        trace!("inline hook `{name}`");
        let call = helper_call(name, params, hash)?;
        self.dom.bind_slot(slot, Morph::Inline(call))
    }

    pub fn attribute(
        &mut self,
        morph: &AttrMorphRef,
        _element: &NodeId,
        name: &str,
        value: Argument,
    ) -> Result<()> {
        trace!("attribute hook `{name}`");
        self.dom.bind_attribute(morph, value.into_value()?)
    }

    pub fn element(
        &mut self,
        element: &NodeId,
        name: &str,
        params: Vec<Argument>,
        hash: Vec<(&str, Argument)>,
    ) -> Result<()> {
        trace!("element hook `{name}`");
        let call = helper_call(name, params, hash)?;
        self.dom.push_element_morph(element, ElementMorph::new(call))
    }

    pub fn content(&mut self, slot: &SlotRef, content: &str) -> Result<()> {
        trace!("content hook `{content}`");
        self.dom.bind_slot(slot, Morph::Content(content.to_string()))
    }

    /// Child templates are rendered with a document of their own.
    pub fn block(
        &mut self,
        slot: &SlotRef,
        name: &str,
        params: Vec<Argument>,
        hash: Vec<(&str, Argument)>,
        program: &Artifact,
        inverse: Option<&Artifact>,
    ) -> Result<()> {
        trace!("block hook `{name}`");
        let call = helper_call(name, params, hash)?;
        let program = render(program)?;
        let inverse = inverse.map(render).transpose()?;
        self.dom
            .bind_slot(slot, Morph::Block(BlockMorph::new(call, program, inverse)))
    }
}

pub fn render(artifact: &Artifact) -> Result<Node> {
    let render = artifact
        .render
        .as_ref()
        .ok_or_else(|| DecompileError::invalid_artifact("render", "is missing"))?;

    let mut env = HookEnv::new()?;
    let root = render(&JsonValue::Null, &mut env, None)?;
    env.dom.freeze(&root)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::Error;

    #[test]
    fn raw_arguments_become_literals() {
        assert_eq!(Argument::from(10).into_value(), Ok(Value::literal(10)));
        assert_eq!(Argument::from("10").into_value(), Ok(Value::literal("10")));
        assert_eq!(
            Argument::from(Value::path("foo")).into_value(),
            Ok(Value::path("foo"))
        );
        assert!(matches!(
            Argument::from(json!({ "a": 1 })).into_value(),
            Err(ParseError::Shape { .. })
        ));
    }

    #[test]
    fn value_hooks() {
        let env = HookEnv::new().unwrap();
        assert_eq!(env.get("foo.bar"), Value::path("foo.bar"));

        let concat = env
            .concat(vec!["Bar ".into(), env.get("baz").into(), " boo".into()])
            .unwrap();
        assert_eq!(concat.to_inline_string(), "\"Bar {{ baz }} boo\"");

        let sub = env
            .subexpr("baz", vec![10.into()], vec![("a", 1.into())])
            .unwrap();
        assert_eq!(sub.to_value_string(), "{{ baz 10 a=1 }}");
    }

    #[test]
    fn content_and_inline_hooks_bind_slots() {
        let artifact = Artifact::new().revision("Ember@1.13.0").render(|_, env, _| {
            let fragment = env.dom.create_document_fragment()?;
            let first = env.dom.create_morph_at(&fragment, -1, -1, None)?;
            let second = env.dom.create_morph_at(&fragment, -1, -1, None)?;
            env.content(&first, "foo")?;
            env.inline(&second, "foo", vec![10.into()], vec![("bar", "x".into())])?;
            Ok(fragment)
        });
        assert_eq!(
            render(&artifact).unwrap().to_string(),
            "{{ foo }}\n{{ foo 10 bar='x' }}"
        );
    }

    #[test]
    fn attribute_hook_wraps_raw_values() {
        let artifact = Artifact::new().render(|_, env, _| {
            let fragment = env.dom.create_document_fragment()?;
            let a = env.dom.create_element("a")?;
            env.dom.append_child(&fragment, &a)?;
            let href = env.dom.create_attr_morph(&a, "href")?;
            let title = env.dom.create_attr_morph(&a, "title")?;
            let path = env.get("url");
            env.attribute(&href, &a, "href", path.into())?;
            env.attribute(&title, &a, "title", "Home".into())?;
            Ok(fragment)
        });
        assert_eq!(
            render(&artifact).unwrap().to_string(),
            "<a href={{ url }} title='Home'>\n</a>"
        );
    }

    #[test]
    fn element_hook_targets_the_element() {
        let artifact = Artifact::new().render(|_, env, _| {
            let fragment = env.dom.create_document_fragment()?;
            let button = env.dom.create_element("button")?;
            env.dom.append_child(&fragment, &button)?;
            env.element(&button, "action", vec!["save".into()], vec![("on", "click".into())])?;
            Ok(fragment)
        });
        assert_eq!(
            render(&artifact).unwrap().to_string(),
            "<button {{ action 'save' on='click' }}>\n</button>"
        );
    }

    #[test]
    fn block_hook_renders_children() {
        let program = Artifact::new().render(|_, env, _| {
            let fragment = env.dom.create_document_fragment()?;
            let text = env.dom.create_text_node("A")?;
            env.dom.append_child(&fragment, &text)?;
            Ok(fragment)
        });
        let inverse = Artifact::new().render(|_, env, _| {
            let fragment = env.dom.create_document_fragment()?;
            let text = env.dom.create_text_node("B")?;
            env.dom.append_child(&fragment, &text)?;
            Ok(fragment)
        });
        let artifact = Artifact::new().render(move |_, env, _| {
            let fragment = env.dom.create_document_fragment()?;
            let slot = env.dom.create_morph_at(&fragment, -1, -1, None)?;
            let cond = env.get("foo");
            env.block(&slot, "if", vec![cond.into()], vec![], &program, Some(&inverse))?;
            Ok(fragment)
        });
        assert_eq!(
            render(&artifact).unwrap().to_string(),
            "{{#if foo }}\n    A\n{{else}}\n    B\n{{/if}}"
        );
    }

    #[test]
    fn missing_render_member() {
        assert!(matches!(
            render(&Artifact::new()),
            Err(Error::Decompile(DecompileError::InvalidArtifact { .. }))
        ));
    }

    #[test]
    fn non_primitive_raw_argument_is_a_shape_error() {
        let artifact = Artifact::new().render(|_, env, _| {
            let fragment = env.dom.create_document_fragment()?;
            let slot = env.dom.create_morph_at(&fragment, -1, -1, None)?;
            env.inline(&slot, "foo", vec![json!([1, 2]).into()], vec![])?;
            Ok(fragment)
        });
        assert!(matches!(
            render(&artifact),
            Err(Error::Parse(ParseError::Shape { .. }))
        ));
    }
}
