use std::fmt;

use serde_json::{Number, Value as JsonValue};

use crate::error::ParseError;

/// A primitive carried verbatim from the compiled template.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(Number),
    Boolean(bool),
    Null,
}

impl Literal {
    /// Wraps a decoded primitive. Arrays and objects are not literals.
    pub fn from_json(value: &JsonValue) -> Result<Self, ParseError> {
        match value {
            JsonValue::Null => Ok(Literal::Null),
            JsonValue::Bool(v) => Ok(Literal::Boolean(*v)),
            JsonValue::Number(v) => Ok(Literal::Number(v.clone())),
            JsonValue::String(v) => Ok(Literal::String(v.clone())),
            JsonValue::Array(_) => Err(ParseError::shape(
                "literal",
                "expected a primitive, got an array",
            )),
            JsonValue::Object(_) => Err(ParseError::shape(
                "literal",
                "expected a primitive, got an object",
            )),
        }
    }

    /// Text as it appears inside a concatenation: strings are not quoted.
    pub fn to_raw_string(&self) -> String {
        match self {
            Literal::String(v) => v.clone(),
            Literal::Number(v) => format_number(v),
            Literal::Boolean(v) => v.to_string(),
            Literal::Null => "null".to_string(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(v) => write!(f, "'{v}'"),
            other => write!(f, "{}", other.to_raw_string()),
        }
    }
}

// whole floats print like integers, the way the template runtime shows them
fn format_number(number: &Number) -> String {
    if number.is_f64() {
        if let Some(v) = number.as_f64() {
            if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e21 {
                return format!("{v:.0}");
            }
            return v.to_string();
        }
    }
    number.to_string()
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::String(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::String(v)
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Boolean(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::Number(Number::from(v))
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Number(Number::from(v))
    }
}

impl From<u64> for Literal {
    fn from(v: u64) -> Self {
        Literal::Number(Number::from(v))
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Number::from_f64(v).map_or(Literal::Null, Literal::Number)
    }
}

/// An expression recovered from a compiled template.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `10`, `'foo'`
    Literal(Literal),
    /// `foo.bar`
    Path(String),
    /// `"Foo {{ foo.bar }} bar"`
    Concat(Vec<Value>),
    /// `{{ helper param key=value }}`
    SubExpr(HelperCall),
}

impl Value {
    pub fn literal(value: impl Into<Literal>) -> Self {
        Value::Literal(value.into())
    }

    pub fn path(path: impl Into<String>) -> Self {
        Value::Path(path.into())
    }

    /// Renders the value in the context of `<tag attr=VALUE>`.
    pub fn to_inline_string(&self) -> String {
        match self {
            Value::Literal(v) => v.to_string(),
            Value::Path(path) => format!("{{{{ {path} }}}}"),
            Value::Concat(_) | Value::SubExpr(_) => self.to_value_string(),
        }
    }

    /// Renders the value in the context of `{{ helper key=VALUE }}`.
    pub fn to_value_string(&self) -> String {
        match self {
            Value::Literal(v) => v.to_string(),
            Value::Path(path) => path.clone(),
            Value::Concat(parts) => {
                let body: String = parts
                    .iter()
                    .map(|part| match part {
                        Value::Literal(v) => v.to_raw_string(),
                        other => other.to_inline_string(),
                    })
                    .collect();
                format!("\"{body}\"")
            }
            Value::SubExpr(call) => call.to_string(),
        }
    }
}

impl From<Literal> for Value {
    fn from(v: Literal) -> Self {
        Value::Literal(v)
    }
}

macro_rules! literal_value_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Literal(Literal::from(v))
                }
            }
        )*
    };
}

literal_value_from!(&str, String, bool, i32, i64, u64, f64);

/// Named helper arguments. Keeps insertion order, like the object the
/// template compiler emits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hash(Vec<(String, Value)>);

impl Hash {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Replaces the value in place when `key` already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Hash {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut hash = Hash::new();
        for (k, v) in iter {
            hash.insert(k, v);
        }
        hash
    }
}

/// `name params... key=value...`, shared by sub-expressions, inline,
/// element and block morphs.
#[derive(Debug, Clone, PartialEq)]
pub struct HelperCall {
    pub name: String,
    pub params: Vec<Value>,
    pub hash: Hash,
}

impl HelperCall {
    pub fn new(name: impl Into<String>, params: Vec<Value>, hash: Hash) -> Self {
        Self {
            name: name.into(),
            params,
            hash,
        }
    }

    /// The call without its mustache braces. Empty groups add no spaces.
    pub fn signature(&self) -> String {
        let mut result = self.name.clone();

        let params = self
            .params
            .iter()
            .map(Value::to_value_string)
            .collect::<Vec<_>>()
            .join(" ");
        if !params.is_empty() {
            result.push(' ');
            result.push_str(&params);
        }

        let hash = self
            .hash
            .iter()
            .map(|(k, v)| format!("{k}={}", v.to_value_string()))
            .collect::<Vec<_>>()
            .join(" ");
        if !hash.is_empty() {
            result.push(' ');
            result.push_str(&hash);
        }

        result
    }
}

impl fmt::Display for HelperCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{{ {} }}}}", self.signature())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn path_renders_braced_inline_and_bare_as_value() {
        let value = Value::path("foo.bar");
        assert_eq!(value.to_inline_string(), "{{ foo.bar }}");
        assert_eq!(value.to_value_string(), "foo.bar");
    }

    #[test]
    fn literals_render_the_same_in_both_positions() {
        let string = Value::literal("foo");
        assert_eq!(string.to_inline_string(), "'foo'");
        assert_eq!(string.to_value_string(), "'foo'");

        let number = Value::literal(10);
        assert_eq!(number.to_inline_string(), "10");
        assert_eq!(number.to_value_string(), "10");

        assert_eq!(Value::literal(true).to_value_string(), "true");
        assert_eq!(Value::literal(1.5).to_value_string(), "1.5");
        assert_eq!(Value::literal(3.0).to_value_string(), "3");
    }

    #[test]
    fn concat_of_strings() {
        let value = Value::Concat(vec![Value::literal("foo"), Value::literal("bar")]);
        assert_eq!(value.to_inline_string(), "\"foobar\"");
        assert_eq!(value.to_value_string(), "\"foobar\"");
    }

    #[test]
    fn concat_of_mixed_literals() {
        let value = Value::Concat(vec![Value::literal("foo"), Value::literal(10)]);
        assert_eq!(value.to_inline_string(), "\"foo10\"");
    }

    #[test]
    fn concat_of_single_path() {
        let value = Value::Concat(vec![Value::path("foo.bar")]);
        assert_eq!(value.to_inline_string(), "\"{{ foo.bar }}\"");
        assert_eq!(value.to_value_string(), "\"{{ foo.bar }}\"");
    }

    #[test]
    fn concat_of_mixed_values() {
        let value = Value::Concat(vec![
            Value::literal("Bar "),
            Value::path("baz"),
            Value::literal(" boo"),
        ]);
        assert_eq!(value.to_inline_string(), "\"Bar {{ baz }} boo\"");
    }

    #[test]
    fn subexpr_renders_with_params_and_hash() {
        let hash: Hash = [("a", Value::literal("10")), ("b", Value::path("foo.ten"))]
            .into_iter()
            .collect();
        let value = Value::SubExpr(HelperCall::new("baz", vec![Value::literal(10)], hash));
        assert_eq!(value.to_inline_string(), "{{ baz 10 a='10' b=foo.ten }}");
        assert_eq!(value.to_value_string(), "{{ baz 10 a='10' b=foo.ten }}");

        let nested = Value::Concat(vec![value]);
        assert_eq!(nested.to_inline_string(), "\"{{ baz 10 a='10' b=foo.ten }}\"");
    }

    #[test]
    fn hash_keeps_first_insertion_position() {
        let mut hash = Hash::new();
        hash.insert("b", Value::literal(1));
        hash.insert("a", Value::literal(2));
        hash.insert("b", Value::literal(3));

        let keys: Vec<&str> = hash.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(hash.get("b"), Some(&Value::literal(3)));
    }

    #[test]
    fn literal_from_json_rejects_containers() {
        assert_eq!(Literal::from_json(&json!("x")), Ok(Literal::from("x")));
        assert_eq!(Literal::from_json(&json!(null)), Ok(Literal::Null));
        assert!(matches!(
            Literal::from_json(&json!([1])),
            Err(ParseError::Shape { .. })
        ));
        assert!(matches!(
            Literal::from_json(&json!({ "a": 1 })),
            Err(ParseError::Shape { .. })
        ));
    }
}
