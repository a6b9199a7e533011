use std::fmt;

use id_tree::NodeId;
use serde_json::Value as JsonValue;

use crate::{
    core::hooks::HookEnv,
    dom::{MorphHandle, RecordingDocument},
    error::Result,
};

/// `render(context, env, contextualElement)`, returns the root it built.
pub type RenderFn = Box<dyn Fn(&JsonValue, &mut HookEnv, Option<&NodeId>) -> Result<NodeId>>;

/// `buildFragment(dom)`
pub type BuildFragmentFn = Box<dyn Fn(&mut RecordingDocument) -> Result<NodeId>>;

/// `buildRenderNodes(dom, fragment, contextualElement)`
pub type BuildRenderNodesFn =
    Box<dyn Fn(&mut RecordingDocument, &NodeId, Option<&NodeId>) -> Result<Vec<MorphHandle>>>;

/// A compiled template as handed to `Ember.HTMLBars.template`.
///
/// Every member is optional so that malformed artifacts can be described
/// and rejected by the interpreters.
#[derive(Default)]
pub struct Artifact {
    pub revision: Option<String>,
    pub meta: Option<JsonValue>,
    pub render: Option<RenderFn>,
    pub build_fragment: Option<BuildFragmentFn>,
    pub build_render_nodes: Option<BuildRenderNodesFn>,
    pub statements: Option<JsonValue>,
    pub templates: Option<Vec<Artifact>>,
}

impl Artifact {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn meta(mut self, meta: JsonValue) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(&JsonValue, &mut HookEnv, Option<&NodeId>) -> Result<NodeId> + 'static,
    {
        self.render = Some(Box::new(render));
        self
    }

    pub fn build_fragment<F>(mut self, build: F) -> Self
    where
        F: Fn(&mut RecordingDocument) -> Result<NodeId> + 'static,
    {
        self.build_fragment = Some(Box::new(build));
        self
    }

    pub fn build_render_nodes<F>(mut self, build: F) -> Self
    where
        F: Fn(&mut RecordingDocument, &NodeId, Option<&NodeId>) -> Result<Vec<MorphHandle>>
            + 'static,
    {
        self.build_render_nodes = Some(Box::new(build));
        self
    }

    pub fn statements(mut self, statements: JsonValue) -> Self {
        self.statements = Some(statements);
        self
    }

    /// Appends one child template.
    pub fn template(mut self, template: Artifact) -> Self {
        self.templates.get_or_insert_with(Vec::new).push(template);
        self
    }

    pub fn templates(mut self, templates: Vec<Artifact>) -> Self {
        self.templates = Some(templates);
        self
    }

    /// `revision`, falling back to `meta.revision`. Empty strings count as
    /// missing.
    pub fn revision_marker(&self) -> Option<&str> {
        let top = self.revision.as_deref().filter(|v| !v.is_empty());
        top.or_else(|| {
            self.meta
                .as_ref()?
                .get("revision")?
                .as_str()
                .filter(|v| !v.is_empty())
        })
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("revision", &self.revision)
            .field("meta", &self.meta)
            .field("render", &self.render.is_some())
            .field("build_fragment", &self.build_fragment.is_some())
            .field("build_render_nodes", &self.build_render_nodes.is_some())
            .field("statements", &self.statements)
            .field("templates", &self.templates)
            .finish()
    }
}
