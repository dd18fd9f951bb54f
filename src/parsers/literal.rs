//! Python literal evaluation
//!
//! Evaluates syntax-tree nodes built from strings, numbers,
//! `True`/`False`/`None`, lists, tuples, sets and dicts. Anything else
//! (names, calls, operators other than a sign on a number) is an error.

use super::python::node_kinds::*;
use super::python::{has_token, named_children, node_text, parse_python, strip_bom, SyntaxError};
use std::fmt::Write;
use std::iter::Peekable;
use std::str::Chars;
use tree_sitter::Node;

/// A literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    Bytes(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Set(Vec<Value>),
    /// Entries in source order; a repeated key keeps its last value
    Dict(Vec<(Value, Value)>),
}

impl Value {
    /// Look up a string key in a dict, honoring last-wins for repeated keys
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Dict(entries) => entries
                .iter()
                .rev()
                .find(|(k, _)| matches!(k, Value::Str(s) if s == key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list, tuple or set
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_dict(&self) -> bool {
        matches!(self, Value::Dict(_))
    }

    /// Python truthiness
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) | Value::Bytes(s) => !s.is_empty(),
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => !items.is_empty(),
            Value::Dict(entries) => !entries.is_empty(),
        }
    }

    /// Text as Python's `str()` would render it
    pub fn to_python_str(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.repr(),
        }
    }

    /// Text as Python's `repr()` would render it
    pub fn repr(&self) -> String {
        match self {
            Value::None => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => float_repr(*f),
            Value::Str(s) => quote(s),
            Value::Bytes(s) => format!("b{}", quote(s)),
            Value::List(items) => format!("[{}]", join_repr(items)),
            Value::Tuple(items) if items.len() == 1 => format!("({},)", items[0].repr()),
            Value::Tuple(items) => format!("({})", join_repr(items)),
            Value::Set(items) if items.is_empty() => "set()".to_string(),
            Value::Set(items) => format!("{{{}}}", join_repr(items)),
            Value::Dict(entries) => {
                let mut out = String::from("{");
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{}: {}", k.repr(), v.repr());
                }
                out.push('}');
                out
            }
        }
    }

    fn is_hashable(&self) -> bool {
        match self {
            Value::List(_) | Value::Set(_) | Value::Dict(_) => false,
            Value::Tuple(items) => items.iter().all(Value::is_hashable),
            _ => true,
        }
    }
}

fn join_repr(items: &[Value]) -> String {
    items.iter().map(Value::repr).collect::<Vec<_>>().join(", ")
}

fn quote(s: &str) -> String {
    let delimiter = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delimiter);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

/// Format a float the way Python's `repr()` does
pub fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // Rust's `{:e}` yields the shortest round-trip digits, e.g. "1.7e1"
    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..16).contains(&exponent) {
        let fixed = format!("{}", value);
        if fixed.contains('.') {
            fixed
        } else {
            format!("{}.0", fixed)
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

/// Parse text holding a single literal expression
pub fn parse_literal(source: &str) -> Result<Value, SyntaxError> {
    let source = strip_bom(source);
    let tree = parse_python(source)?;
    let root = tree.root_node();

    let statement = match named_children(&root).as_slice() {
        [] => return Err(SyntaxError::new(1, "empty input")),
        [only] => *only,
        [_, second, ..] => return Err(SyntaxError::at(second, "more than one statement")),
    };
    if statement.kind() != EXPRESSION_STATEMENT {
        return Err(SyntaxError::at(&statement, "not an expression"));
    }

    // A bare comma-separated sequence is a tuple
    let items = named_children(&statement);
    match items.as_slice() {
        [only] if !has_token(&statement, ",") => literal_value(only, source),
        _ => Ok(Value::Tuple(literal_values(&items, source)?)),
    }
}

/// Evaluate an expression node that must be a literal
pub fn literal_value(node: &Node, source: &str) -> Result<Value, SyntaxError> {
    match node.kind() {
        STRING | CONCATENATED_STRING => strings(node, source),
        INTEGER => integer(node, source),
        FLOAT => float(node, source),
        TRUE => Ok(Value::Bool(true)),
        FALSE => Ok(Value::Bool(false)),
        NONE => Ok(Value::None),
        LIST => Ok(Value::List(literal_values(&named_children(node), source)?)),
        TUPLE | EXPRESSION_LIST => Ok(Value::Tuple(literal_values(&named_children(node), source)?)),
        SET => {
            let items = literal_values(&named_children(node), source)?;
            if !items.iter().all(Value::is_hashable) {
                return Err(SyntaxError::at(node, "unhashable set element"));
            }
            Ok(Value::Set(items))
        }
        DICTIONARY => dictionary(node, source),
        PARENTHESIZED_EXPRESSION => match named_children(node).as_slice() {
            [inner] => literal_value(inner, source),
            _ => Err(SyntaxError::at(node, "malformed parenthesized expression")),
        },
        UNARY_OPERATOR => signed(node, source),
        IDENTIFIER => Err(SyntaxError::at(
            node,
            format!("name '{}' is not a literal", node_text(node, source)),
        )),
        other => Err(SyntaxError::at(node, format!("{} is not a literal", other))),
    }
}

fn literal_values(nodes: &[Node], source: &str) -> Result<Vec<Value>, SyntaxError> {
    nodes.iter().map(|node| literal_value(node, source)).collect()
}

fn dictionary(node: &Node, source: &str) -> Result<Value, SyntaxError> {
    let mut entries = Vec::new();
    for entry in named_children(node) {
        if entry.kind() != PAIR {
            return Err(SyntaxError::at(&entry, "dictionary entries must be literal pairs"));
        }
        let key = entry
            .child_by_field_name("key")
            .ok_or_else(|| SyntaxError::at(&entry, "missing dictionary key"))?;
        let value = entry
            .child_by_field_name("value")
            .ok_or_else(|| SyntaxError::at(&entry, "missing dictionary value"))?;

        let key = literal_value(&key, source)?;
        if !key.is_hashable() {
            return Err(SyntaxError::at(&entry, "unhashable dict key"));
        }
        entries.push((key, literal_value(&value, source)?));
    }
    Ok(Value::Dict(entries))
}

fn signed(node: &Node, source: &str) -> Result<Value, SyntaxError> {
    let operator = node
        .child_by_field_name("operator")
        .map(|op| node_text(&op, source));
    let argument = node
        .child_by_field_name("argument")
        .ok_or_else(|| SyntaxError::at(node, "missing operand"))?;

    match (operator, literal_value(&argument, source)?) {
        (Some("-"), Value::Int(i)) => Ok(Value::Int(-i)),
        (Some("-"), Value::Float(f)) => Ok(Value::Float(-f)),
        (Some("+"), value @ (Value::Int(_) | Value::Float(_))) => Ok(value),
        _ => Err(SyntaxError::at(node, "unary sign applies only to numbers")),
    }
}

fn integer(node: &Node, source: &str) -> Result<Value, SyntaxError> {
    let text: String = node_text(node, source)
        .chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();
    if text.ends_with('j') {
        return Err(SyntaxError::at(node, "complex literals are not supported"));
    }

    // Python 2 long suffix
    let text = text.trim_end_matches('l');
    let (radix, digits) = if let Some(digits) = text.strip_prefix("0x") {
        (16, digits)
    } else if let Some(digits) = text.strip_prefix("0o") {
        (8, digits)
    } else if let Some(digits) = text.strip_prefix("0b") {
        (2, digits)
    } else {
        (10, text)
    };

    i128::from_str_radix(digits, radix)
        .map(Value::Int)
        .map_err(|_| SyntaxError::at(node, "invalid integer literal"))
}

fn float(node: &Node, source: &str) -> Result<Value, SyntaxError> {
    let text: String = node_text(node, source).chars().filter(|c| *c != '_').collect();
    if text.ends_with(['j', 'J']) {
        return Err(SyntaxError::at(node, "complex literals are not supported"));
    }
    text.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| SyntaxError::at(node, "invalid float literal"))
}

/// A string or adjacent strings, which concatenate
fn strings(node: &Node, source: &str) -> Result<Value, SyntaxError> {
    let parts = if node.kind() == CONCATENATED_STRING {
        named_children(node)
    } else {
        vec![*node]
    };

    let mut text = String::new();
    let mut bytes = None;
    for part in &parts {
        let (value, is_bytes) = string_literal(part, source)?;
        if bytes.is_some_and(|seen| seen != is_bytes) {
            return Err(SyntaxError::at(node, "cannot mix bytes and text literals"));
        }
        bytes = Some(is_bytes);
        text.push_str(&value);
    }

    if bytes == Some(true) {
        Ok(Value::Bytes(text))
    } else {
        Ok(Value::Str(text))
    }
}

/// Decode one string node; returns the text and whether it is a bytes literal
fn string_literal(node: &Node, source: &str) -> Result<(String, bool), SyntaxError> {
    let text = node_text(node, source);
    let prefix_len = text
        .find(['\'', '"'])
        .ok_or_else(|| SyntaxError::at(node, "malformed string literal"))?;
    let (prefix, quoted) = text.split_at(prefix_len);
    let prefix = prefix.to_ascii_lowercase();

    // f-strings are evaluated at runtime and are never literals
    if prefix.contains('f') {
        return Err(SyntaxError::at(node, "f-strings are not literals"));
    }
    let raw = prefix.contains('r');
    let bytes = prefix.contains('b');

    let delimiter = if quoted.starts_with("'''") || quoted.starts_with("\"\"\"") {
        3
    } else {
        1
    };
    let body = quoted
        .get(delimiter..quoted.len().saturating_sub(delimiter))
        .ok_or_else(|| SyntaxError::at(node, "malformed string literal"))?;

    let value = if raw {
        body.to_string()
    } else {
        unescape(body, bytes, node)?
    };
    Ok((value, bytes))
}

fn unescape(body: &str, bytes: bool, node: &Node) -> Result<String, SyntaxError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            '\n' => {}
            '\r' => {
                chars.next_if_eq(&'\n');
            }
            '\\' | '\'' | '"' => out.push(escaped),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut code = escaped.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code).ok_or_else(|| SyntaxError::at(node, "invalid octal escape"))?);
            }
            'x' => out.push(hex_escape(&mut chars, 2, node)?),
            'u' if !bytes => out.push(hex_escape(&mut chars, 4, node)?),
            'U' if !bytes => out.push(hex_escape(&mut chars, 8, node)?),
            other => {
                // Unknown escapes are kept verbatim
                out.push('\\');
                out.push(other);
            }
        }
    }
    Ok(out)
}

fn hex_escape(chars: &mut Peekable<Chars>, len: usize, node: &Node) -> Result<char, SyntaxError> {
    let mut code = 0u32;
    for _ in 0..len {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| SyntaxError::at(node, "truncated hex escape"))?;
        code = code * 16 + digit;
    }
    char::from_u32(code).ok_or_else(|| SyntaxError::at(node, "invalid unicode escape"))
}
