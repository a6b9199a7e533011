use shave_template::RenderOptions;

use crate::module::Namespace;

/// Configuration for [`decompile`](crate::decompile).
#[derive(Debug, Clone, Default)]
pub struct DecompileOptions {
    /// Globals available to the executed code. Copied, never mutated.
    /// `require` and `module` entries here replace the injected ones.
    pub context: Namespace,

    /// Paths under the `require(...)` result where the fake `Ember` is
    /// reachable as well, e.g. `foo.Ember` for `require("ember").foo.Ember`.
    pub require_ember_paths: Vec<String>,

    /// Global paths where the fake `Ember` is defined, e.g. `Ember` or
    /// `foo.bar.Ember`. None by default.
    pub global_paths: Vec<String>,

    pub render: RenderOptions,
}

impl DecompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(mut self, context: Namespace) -> Self {
        self.context = context;
        self
    }

    pub fn require_ember_path_alias(mut self, path: impl Into<String>) -> Self {
        self.require_ember_paths.push(path.into());
        self
    }

    pub fn global_path_alias(mut self, path: impl Into<String>) -> Self {
        self.global_paths.push(path.into());
        self
    }

    /// Spaces per nesting level in the output; `0` means the default of 4.
    pub fn indent(mut self, step: usize) -> Self {
        self.render = self.render.indent(step);
        self
    }
}
