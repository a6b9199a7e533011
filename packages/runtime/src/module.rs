//! Globals visible to the code under decompilation, and the fake `Ember`
//! module injected among them.

use std::{any::Any, collections::HashMap, fmt};

use dyn_clone::DynClone;
use serde_json::Value as JsonValue;
use shave_template::parser::parse_alias_path;

use crate::error::{DecompileError, Result};

/// Opaque host object placed into the context by the caller.
pub trait HostValue: DynClone + fmt::Debug {
    fn type_name(&self) -> &str;
    fn as_any(&self) -> &dyn Any;
}

dyn_clone::clone_trait_object!(HostValue);

/// Functions provided by the fake `Ember`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `Ember.HTMLBars.template`
    RegisterTemplate,
    /// `Ember.Handlebars.template`
    LegacyTemplate,
}

#[derive(Debug, Clone)]
pub enum Global {
    Namespace(Namespace),
    Builtin(Builtin),
    /// The `require` function; every call returns the carried namespace.
    Require(Namespace),
    Data(JsonValue),
    Host(Box<dyn HostValue>),
}

impl Global {
    pub fn global_name(&self) -> &str {
        match self {
            Global::Namespace(_) => "namespace",
            Global::Builtin(_) => "builtin",
            Global::Require(_) => "require",
            Global::Data(_) => "data",
            Global::Host(v) => v.type_name(),
        }
    }

    /// `null`, `false`, `0` and `""` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Global::Data(JsonValue::Null) => false,
            Global::Data(JsonValue::Bool(v)) => *v,
            Global::Data(JsonValue::Number(v)) => v.as_f64().map_or(true, |n| n != 0.0),
            Global::Data(JsonValue::String(v)) => !v.is_empty(),
            _ => true,
        }
    }

    pub fn as_namespace(&self) -> Option<&Namespace> {
        if let Self::Namespace(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_builtin(&self) -> Option<Builtin> {
        if let Self::Builtin(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    pub fn as_data(&self) -> Option<&JsonValue> {
        if let Self::Data(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_host(&self) -> Option<&dyn HostValue> {
        if let Self::Host(v) = self {
            Some(v.as_ref())
        } else {
            None
        }
    }
}

/// JSON objects become namespaces so paths can be defined through them.
impl From<JsonValue> for Global {
    fn from(v: JsonValue) -> Self {
        match v {
            JsonValue::Object(map) => Global::Namespace(Namespace(
                map.into_iter().map(|(k, v)| (k, Global::from(v))).collect(),
            )),
            other => Global::Data(other),
        }
    }
}

impl From<Namespace> for Global {
    fn from(v: Namespace) -> Self {
        Global::Namespace(v)
    }
}

impl From<Builtin> for Global {
    fn from(v: Builtin) -> Self {
        Global::Builtin(v)
    }
}

impl From<Box<dyn HostValue>> for Global {
    fn from(v: Box<dyn HostValue>) -> Self {
        Global::Host(v)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Namespace(pub HashMap<String, Global>);

impl Namespace {
    pub fn new() -> Self {
        Self(Default::default())
    }

    pub fn insert(&mut self, k: &str, v: impl Into<Global>) {
        self.0.insert(k.to_string(), v.into());
    }

    pub fn get(&self, k: &str) -> Option<&Global> {
        self.0.get(k)
    }

    pub fn contains_key(&self, k: &str) -> bool {
        self.0.contains_key(k)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shallow merge, entries of `other` win.
    pub fn extend(&mut self, other: Namespace) {
        self.0.extend(other.0);
    }

    /// Follows a dotted path through nested namespaces.
    pub fn lookup(&self, path: &str) -> Option<&Global> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_namespace()?.get(segment)?;
        }
        Some(current)
    }

    pub fn insert_sub_module(&mut self, k: &str, v: Namespace) {
        self.insert(k, Global::Namespace(v));
    }
}

impl FromIterator<(String, Global)> for Namespace {
    fn from_iter<I: IntoIterator<Item = (String, Global)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Makes `value` reachable as `root.<path>`, creating namespaces on the
/// way. Falsy intermediate entries are replaced; any other non-namespace
/// entry is a [`DecompileError::PathConflict`]. The last segment is always
/// overwritten. An empty path does nothing.
pub fn define_path(root: &mut Namespace, value: impl Into<Global>, path: &str) -> Result<()> {
    let segments = parse_alias_path(path)?;
    let Some((last, parents)) = segments.split_last() else {
        return Ok(());
    };

    let conflict = |segment: &str| DecompileError::PathConflict {
        path: path.to_string(),
        segment: segment.to_string(),
    };

    let mut current = root;
    for segment in parents {
        let entry = current
            .0
            .entry(segment.clone())
            .or_insert_with(|| Global::Namespace(Namespace::new()));
        if entry.as_namespace().is_none() {
            if entry.is_truthy() {
                return Err(conflict(segment).into());
            }
            *entry = Global::Namespace(Namespace::new());
        }
        current = match entry {
            Global::Namespace(ns) => ns,
            _ => return Err(conflict(segment).into()),
        };
    }

    current.insert(last, value);
    Ok(())
}

/// The fake `Ember` module exposing the registration surface.
pub fn ember_module() -> Namespace {
    let mut html_bars = Namespace::new();
    html_bars.insert("template", Builtin::RegisterTemplate);

    let mut handlebars = Namespace::new();
    handlebars.insert("template", Builtin::LegacyTemplate);

    let mut ember = Namespace::new();
    ember.insert_sub_module("HTMLBars", html_bars);
    ember.insert_sub_module("Handlebars", handlebars);
    ember
}
