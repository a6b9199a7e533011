//! Decoding of the Ember 2.x opcode encoding.
//!
//! Statements and expressions are tagged arrays such as
//! `["inline", "foo", [["get", "bar"]], ["key", 10]]`. The leading tag is
//! matched against closed enums; anything else is an [`UnknownOpcode`]
//! error rather than a literal.
//!
//! [`UnknownOpcode`]: crate::error::ParseError::UnknownOpcode

use serde_json::Value as JsonValue;

use crate::{
    error::{OpcodeKind, ParseError},
    types::{Hash, HelperCall, Literal, Value},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionOp {
    Get,
    Concat,
    Subexpr,
}

impl ExpressionOp {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "get" => Some(Self::Get),
            "concat" => Some(Self::Concat),
            "subexpr" => Some(Self::Subexpr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementOp {
    Inline,
    Attribute,
    Element,
    Content,
    Block,
}

impl StatementOp {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "inline" => Some(Self::Inline),
            "attribute" => Some(Self::Attribute),
            "element" => Some(Self::Element),
            "content" => Some(Self::Content),
            "block" => Some(Self::Block),
            _ => None,
        }
    }
}

/// A decoded statement, applied positionally to one render node.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Inline(HelperCall),
    Attribute {
        name: String,
        value: Value,
    },
    Element(HelperCall),
    Content(String),
    Block {
        call: HelperCall,
        /// Indices into the artifact's child `templates`.
        program: Option<usize>,
        inverse: Option<usize>,
    },
}

impl Statement {
    pub fn op(&self) -> StatementOp {
        match self {
            Statement::Inline(_) => StatementOp::Inline,
            Statement::Attribute { .. } => StatementOp::Attribute,
            Statement::Element(_) => StatementOp::Element,
            Statement::Content(_) => StatementOp::Content,
            Statement::Block { .. } => StatementOp::Block,
        }
    }
}

// splits `[tag, args...]`; the tag has to be a string
fn split_tagged<'a>(
    raw: &'a JsonValue,
    context: &str,
) -> Result<(&'a str, &'a [JsonValue]), ParseError> {
    let list = raw
        .as_array()
        .ok_or_else(|| ParseError::shape(context, format!("expected an array, got `{raw}`")))?;
    let (first, rest) = list
        .split_first()
        .ok_or_else(|| ParseError::shape(context, "empty opcode array"))?;
    let tag = first
        .as_str()
        .ok_or_else(|| ParseError::shape(context, format!("opcode tag `{first}` is not a string")))?;
    Ok((tag, rest))
}

fn arg<'a>(args: &'a [JsonValue], index: usize, op: &str) -> Result<&'a JsonValue, ParseError> {
    args.get(index).ok_or_else(|| {
        ParseError::shape(
            format!("`{op}` opcode"),
            format!("missing argument #{}", index + 1),
        )
    })
}

fn string_arg(args: &[JsonValue], index: usize, op: &str) -> Result<String, ParseError> {
    let value = arg(args, index, op)?;
    value.as_str().map(str::to_string).ok_or_else(|| {
        ParseError::shape(
            format!("`{op}` opcode"),
            format!("argument #{} `{value}` is not a string", index + 1),
        )
    })
}

// template indices are numbers, `null` when the branch is absent
fn template_index(args: &[JsonValue], index: usize, op: &str) -> Result<Option<usize>, ParseError> {
    match args.get(index) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => n.as_u64().map(|v| Some(v as usize)).ok_or_else(|| {
            ParseError::shape(
                format!("`{op}` opcode"),
                format!("template index `{n}` is not a non-negative integer"),
            )
        }),
        Some(other) => Err(ParseError::shape(
            format!("`{op}` opcode"),
            format!("template index `{other}` is not a number"),
        )),
    }
}

/// A parameter or hash value: arrays are expressions, the rest literals.
pub fn parse_value(raw: &JsonValue) -> Result<Value, ParseError> {
    if raw.is_array() {
        parse_expression(raw)
    } else {
        Literal::from_json(raw).map(Value::Literal)
    }
}

pub fn parse_expression(raw: &JsonValue) -> Result<Value, ParseError> {
    let (tag, args) = split_tagged(raw, "expression")?;
    let op = ExpressionOp::from_tag(tag).ok_or_else(|| ParseError::UnknownOpcode {
        kind: OpcodeKind::Expression,
        opcode: tag.to_string(),
    })?;

    match op {
        ExpressionOp::Get => Ok(Value::Path(string_arg(args, 0, tag)?)),
        ExpressionOp::Concat => Ok(Value::Concat(parse_params(arg(args, 0, tag)?)?)),
        ExpressionOp::Subexpr => Ok(Value::SubExpr(parse_call(args, tag)?)),
    }
}

pub fn parse_params(raw: &JsonValue) -> Result<Vec<Value>, ParseError> {
    let list = raw.as_array().ok_or_else(|| {
        ParseError::shape("params", format!("expected an array, got `{raw}`"))
    })?;
    list.iter().map(parse_value).collect()
}

/// Hashes are flat `[key, value, key, value, ...]` lists.
pub fn parse_hash(raw: &JsonValue) -> Result<Hash, ParseError> {
    let list = raw
        .as_array()
        .ok_or_else(|| ParseError::shape("hash", format!("expected an array, got `{raw}`")))?;
    if list.len() % 2 != 0 {
        return Err(ParseError::shape(
            "hash",
            format!("odd number of entries ({})", list.len()),
        ));
    }

    let mut hash = Hash::new();
    for pair in list.chunks(2) {
        let key = pair[0].as_str().ok_or_else(|| {
            ParseError::shape("hash", format!("key `{}` is not a string", pair[0]))
        })?;
        hash.insert(key, parse_value(&pair[1])?);
    }
    Ok(hash)
}

// `name, params, hash` starting at args[0]
fn parse_call(args: &[JsonValue], op: &str) -> Result<HelperCall, ParseError> {
    Ok(HelperCall::new(
        string_arg(args, 0, op)?,
        parse_params(arg(args, 1, op)?)?,
        parse_hash(arg(args, 2, op)?)?,
    ))
}

/// Trailing positional elements (such as source locations) are ignored.
pub fn parse_statement(raw: &JsonValue) -> Result<Statement, ParseError> {
    let (tag, args) = split_tagged(raw, "statement")?;
    let op = StatementOp::from_tag(tag).ok_or_else(|| ParseError::UnknownOpcode {
        kind: OpcodeKind::Statement,
        opcode: tag.to_string(),
    })?;

    let statement = match op {
        StatementOp::Inline => Statement::Inline(parse_call(args, tag)?),
        StatementOp::Attribute => Statement::Attribute {
            name: string_arg(args, 0, tag)?,
            value: parse_value(arg(args, 1, tag)?)?,
        },
        StatementOp::Element => Statement::Element(parse_call(args, tag)?),
        StatementOp::Content => {
            let content = Literal::from_json(arg(args, 0, tag)?)?;
            Statement::Content(content.to_raw_string())
        }
        StatementOp::Block => Statement::Block {
            call: parse_call(args, tag)?,
            program: template_index(args, 3, tag)?,
            inverse: template_index(args, 4, tag)?,
        },
    };
    Ok(statement)
}
