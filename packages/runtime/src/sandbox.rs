//! Execution of compiled template modules.
//!
//! Running foreign code is left to a [`Sandbox`] implementation. The
//! sandbox sees nothing but the [`Environment`]: the globals it was given
//! and the registration surface reachable through them.

use log::debug;
use uuid::Uuid;

use crate::{
    artifact::Artifact,
    error::{DecompileError, Result},
    module::{Builtin, Global, Namespace},
};

pub trait Sandbox {
    /// Runs `source` against `env`.
    fn execute(&self, source: &str, env: &mut Environment) -> Result<()>;
}

/// A [`Sandbox`] backed by a closure.
pub struct ClosureSandbox<F>
where
    F: Fn(&str, &mut Environment) -> Result<()>,
{
    func: F,
}

impl<F> ClosureSandbox<F>
where
    F: Fn(&str, &mut Environment) -> Result<()>,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Sandbox for ClosureSandbox<F>
where
    F: Fn(&str, &mut Environment) -> Result<()>,
{
    fn execute(&self, source: &str, env: &mut Environment) -> Result<()> {
        (self.func)(source, env)
    }
}

pub struct Environment {
    globals: Namespace,
    template: Option<Artifact>,
    run_id: Uuid,
}

impl Environment {
    pub fn new(globals: Namespace) -> Self {
        Self {
            globals,
            template: None,
            run_id: Uuid::new_v4(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Dotted lookup from the global scope, e.g. `Ember.HTMLBars`.
    pub fn global(&self, path: &str) -> Option<&Global> {
        self.globals.lookup(path)
    }

    pub fn set_global(&mut self, name: &str, value: impl Into<Global>) {
        self.globals.insert(name, value);
    }

    /// Calls the `require` global. The module name does not matter.
    pub fn require(&self, module: &str) -> Result<Namespace> {
        match self.globals.get("require") {
            Some(Global::Require(result)) => {
                debug!("[{}] require(`{module}`)", self.run_id);
                Ok(result.clone())
            }
            Some(other) => Err(DecompileError::NotCallable {
                name: "require".to_string(),
                expected: format!("function (found {})", other.global_name()),
            }
            .into()),
            None => Err(DecompileError::execution("`require` is not defined").into()),
        }
    }

    pub fn call(&mut self, builtin: Builtin, artifact: Artifact) -> Result<()> {
        match builtin {
            Builtin::RegisterTemplate => {
                if self.template.is_some() {
                    return Err(DecompileError::DuplicateRegistration.into());
                }
                debug!("[{}] template registered", self.run_id);
                self.template = Some(artifact);
                Ok(())
            }
            Builtin::LegacyTemplate => Err(DecompileError::LegacyTemplate.into()),
        }
    }

    /// Resolves `path` among the globals and calls it, the way
    /// `Ember.HTMLBars.template(...)` reads in a global build.
    pub fn call_global(&mut self, path: &str, artifact: Artifact) -> Result<()> {
        let builtin = match self.global(path) {
            Some(Global::Builtin(builtin)) => *builtin,
            Some(other) => {
                return Err(DecompileError::NotCallable {
                    name: path.to_string(),
                    expected: format!("function (found {})", other.global_name()),
                }
                .into())
            }
            None => {
                return Err(DecompileError::execution(format!("`{path}` is not defined")).into())
            }
        };
        self.call(builtin, artifact)
    }

    pub fn template(&self) -> Option<&Artifact> {
        self.template.as_ref()
    }

    pub fn take_template(&mut self) -> Option<Artifact> {
        self.template.take()
    }
}

/// Runs `source` in a fresh environment holding a copy of `context`. With
/// `clone == false` the global mutations of the run are written back into
/// `context`, also when the run fails.
pub fn safe_eval(
    sandbox: &dyn Sandbox,
    source: &str,
    context: &mut Namespace,
    clone: bool,
) -> Result<Environment> {
    let globals = if clone {
        context.clone()
    } else {
        std::mem::take(context)
    };

    let mut env = Environment::new(globals);
    debug!("[{}] sandbox run started", env.run_id);
    let result = sandbox.execute(source, &mut env);
    debug!("[{}] sandbox run finished, ok: {}", env.run_id, result.is_ok());

    if !clone {
        *context = env.globals.clone();
    }
    result.map(|_| env)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{error::Error, module::ember_module};

    fn assigns_foo() -> ClosureSandbox<impl Fn(&str, &mut Environment) -> Result<()>> {
        ClosureSandbox::new(|_: &str, env: &mut Environment| {
            env.set_global("foo", json!(10));
            Ok(())
        })
    }

    #[test]
    fn context_is_copied_by_default() {
        let mut context = Namespace::new();
        context.insert("bar", json!("x"));

        let env = safe_eval(&assigns_foo(), "foo = 10;", &mut context, true).unwrap();
        assert!(env.global("foo").is_some());
        assert!(env.global("bar").is_some());
        assert!(!context.contains_key("foo"));
        assert_eq!(context.len(), 1);
    }

    #[test]
    fn context_receives_mutations_without_clone() {
        let mut context = Namespace::new();
        safe_eval(&assigns_foo(), "foo = 10;", &mut context, false).unwrap();
        assert_eq!(
            context.get("foo").and_then(Global::as_data),
            Some(&json!(10))
        );
    }

    #[test]
    fn failing_run_still_writes_back() {
        let sandbox = ClosureSandbox::new(|_: &str, env: &mut Environment| {
            env.set_global("foo", json!(1));
            Err(DecompileError::execution("boom").into())
        });
        let mut context = Namespace::new();
        assert!(safe_eval(&sandbox, "", &mut context, false).is_err());
        assert!(context.contains_key("foo"));
    }

    #[test]
    fn runs_get_distinct_ids() {
        let a = Environment::new(Namespace::new());
        let b = Environment::new(Namespace::new());
        assert_ne!(a.run_id(), b.run_id());
    }

    #[test]
    fn registration_happens_once() {
        let mut env = Environment::new(Namespace::new());
        env.call(Builtin::RegisterTemplate, Artifact::new()).unwrap();
        assert!(env.template().is_some());
        assert!(matches!(
            env.call(Builtin::RegisterTemplate, Artifact::new()),
            Err(Error::Decompile(DecompileError::DuplicateRegistration))
        ));
        assert!(env.take_template().is_some());
        assert!(env.template().is_none());
    }

    #[test]
    fn legacy_registration_is_rejected() {
        let mut env = Environment::new(Namespace::new());
        let err = env
            .call(Builtin::LegacyTemplate, Artifact::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "decompile failed: Ember versions older than 1.10 are not supported."
        );
    }

    #[test]
    fn require_returns_the_carried_module() {
        let mut globals = Namespace::new();
        globals.insert("require", Global::Require(ember_module()));
        let env = Environment::new(globals);
        let ember = env.require("ember").unwrap();
        assert!(ember.lookup("HTMLBars.template").is_some());
    }

    #[test]
    fn require_must_be_callable() {
        let mut globals = Namespace::new();
        globals.insert("require", json!("nope"));
        assert!(matches!(
            Environment::new(globals).require("ember"),
            Err(Error::Decompile(DecompileError::NotCallable { .. }))
        ));
        assert!(matches!(
            Environment::new(Namespace::new()).require("ember"),
            Err(Error::Decompile(DecompileError::Execution { .. }))
        ));
    }

    #[test]
    fn call_global_resolves_paths() {
        let mut globals = Namespace::new();
        globals.insert_sub_module("Ember", ember_module());
        let mut env = Environment::new(globals);
        env.call_global("Ember.HTMLBars.template", Artifact::new()).unwrap();
        assert!(env.template().is_some());

        assert!(matches!(
            env.call_global("Ember.HTMLBars", Artifact::new()),
            Err(Error::Decompile(DecompileError::NotCallable { .. }))
        ));
        assert!(matches!(
            env.call_global("Missing.template", Artifact::new()),
            Err(Error::Decompile(DecompileError::Execution { .. }))
        ));
    }
}
