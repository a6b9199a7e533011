//! Decompiles compiled HTMLBars templates back into template source.
//!
//! The compiled module is executed by a [`Sandbox`] against a fake `Ember`
//! whose `HTMLBars.template` captures the artifact. The artifact is then
//! interpreted against a recording document and the recovered tree is
//! serialized.

use log::debug;

pub mod artifact;
pub mod core;
pub mod dom;
pub mod error;
pub mod module;
pub mod options;
pub mod sandbox;

pub use artifact::Artifact;
pub use crate::core::{hooks::HookEnv, loader::decompile_artifact};
pub use dom::{MorphHandle, RecordingDocument};
pub use error::{DecompileError, Error, Result};
pub use module::{define_path, Builtin, Global, HostValue, Namespace};
pub use options::DecompileOptions;
pub use sandbox::{safe_eval, ClosureSandbox, Environment, Sandbox};

/// Runs the compiled module `source` and returns the recovered template.
///
/// The executed code sees `require` (returning the fake `Ember`), an empty
/// `module` object and a copy of `options.context`.
pub fn decompile(source: &str, sandbox: &dyn Sandbox, options: &DecompileOptions) -> Result<String> {
    let ember = module::ember_module();

    let mut require_result = ember.clone();
    for path in &options.require_ember_paths {
        define_path(&mut require_result, ember.clone(), path)?;
    }

    let mut globals = Namespace::new();
    globals.insert("require", Global::Require(require_result));
    globals.insert("module", Namespace::new());
    globals.extend(options.context.clone());
    for path in &options.global_paths {
        define_path(&mut globals, ember.clone(), path)?;
    }

    let mut env = safe_eval(sandbox, source, &mut globals, true)?;
    let artifact = env
        .take_template()
        .ok_or(DecompileError::MissingRegistration)?;
    debug!("[{}] decompiling registered template", env.run_id());

    decompile_artifact(&artifact, &options.render)
}
