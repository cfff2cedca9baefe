//! Minimal XML-RPC codec.
//!
//! Covers the value types Odoo exchanges: `int`/`i4`/`i8`, `boolean`,
//! `double`, `string` (also the untyped `<value>text</value>` form), `array`,
//! `struct` and the `nil` extension. `dateTime.iso8601` and `base64` are kept
//! as their raw text.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use thiserror::Error;

use brujula_core::{DomainValue, SearchDomain};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Double(f64),
    Str(String),
    Array(Vec<Value>),
    Struct(BTreeMap<String, Value>),
    Nil,
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view: Odoo sends float fields as `int` when they are whole.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Member lookup on a struct value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Struct(members) => members.get(key),
            _ => None,
        }
    }

    pub fn empty_struct() -> Self {
        Value::Struct(BTreeMap::new())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<&DomainValue> for Value {
    fn from(value: &DomainValue) -> Self {
        match value {
            DomainValue::Int(v) => Value::Int(*v),
            DomainValue::Float(v) => Value::Double(*v),
            DomainValue::Str(v) => Value::Str(v.clone()),
            DomainValue::List(items) => Value::Array(items.iter().map(Value::from).collect()),
        }
    }
}

/// A domain travels as an array of `[field, operator, value]` arrays.
impl From<&SearchDomain> for Value {
    fn from(domain: &SearchDomain) -> Self {
        Value::Array(
            domain
                .clauses()
                .iter()
                .map(|c| {
                    Value::Array(vec![
                        Value::from(c.field.as_str()),
                        Value::from(c.operator.as_str()),
                        Value::from(&c.value),
                    ])
                })
                .collect(),
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum XmlRpcError {
    #[error("malformed XML-RPC response: {0}")]
    Malformed(String),

    #[error("XML-RPC fault {code}: {message}")]
    Fault { code: i64, message: String },
}

fn malformed(msg: impl Into<String>) -> XmlRpcError {
    XmlRpcError::Malformed(msg.into())
}

// -------------------------
// Encoding
// -------------------------

/// Serialize a `<methodCall>` document.
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?><methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        write_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Int(v) => {
            let _ = write!(out, "<int>{v}</int>");
        }
        Value::Bool(v) => {
            let _ = write!(out, "<boolean>{}</boolean>", u8::from(*v));
        }
        Value::Double(v) => {
            let _ = write!(out, "<double>{v}</double>");
        }
        Value::Str(v) => {
            let _ = write!(out, "<string>{}</string>", escape(v.as_str()));
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                let _ = write!(out, "<member><name>{}</name>", escape(name.as_str()));
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

// -------------------------
// Decoding
// -------------------------

/// Parse a `<methodResponse>` into its single return value, or the fault it carries.
pub fn decode_response(xml: &str) -> Result<Value, XmlRpcError> {
    let root = parse_tree(xml)?;
    let response = root
        .child("methodResponse")
        .ok_or_else(|| malformed("missing <methodResponse>"))?;

    if let Some(fault) = response.child("fault") {
        let value = value_from_node(
            fault
                .child("value")
                .ok_or_else(|| malformed("fault without <value>"))?,
        )?;
        let code = value.get("faultCode").and_then(Value::as_i64).unwrap_or(0);
        let message = value
            .get("faultString")
            .and_then(Value::as_str)
            .unwrap_or("unknown fault")
            .to_string();
        return Err(XmlRpcError::Fault { code, message });
    }

    let value = response
        .child("params")
        .and_then(|p| p.child("param"))
        .and_then(|p| p.child("value"))
        .ok_or_else(|| malformed("missing <params><param><value>"))?;
    value_from_node(value)
}

#[derive(Debug, Default)]
struct Node {
    name: String,
    children: Vec<Node>,
    text: String,
}

impl Node {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn parse_tree(xml: &str) -> Result<Node, XmlRpcError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = vec![Node::default()];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.push(Node::named(name));
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::named(name));
                }
            }
            Ok(Event::End(_)) => {
                let node = stack.pop().ok_or_else(|| malformed("unbalanced end tag"))?;
                let parent = stack
                    .last_mut()
                    .ok_or_else(|| malformed("unbalanced end tag"))?;
                parent.children.push(node);
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| malformed(e.to_string()))?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(e.to_string())),
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(malformed("unclosed element"));
    }
    stack.pop().ok_or_else(|| malformed("empty document"))
}

fn value_from_node(node: &Node) -> Result<Value, XmlRpcError> {
    // `<value>text</value>` without a type element is a string.
    let Some(typed) = node.children.first() else {
        return Ok(Value::Str(node.text.clone()));
    };

    let text = typed.text.trim();
    match typed.name.as_str() {
        "int" | "i4" | "i8" => text
            .parse()
            .map(Value::Int)
            .map_err(|_| malformed(format!("invalid int {text:?}"))),
        "boolean" => match text {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            other => Err(malformed(format!("invalid boolean {other:?}"))),
        },
        "double" => text
            .parse()
            .map(Value::Double)
            .map_err(|_| malformed(format!("invalid double {text:?}"))),
        "string" => Ok(Value::Str(typed.text.clone())),
        "dateTime.iso8601" | "base64" => Ok(Value::Str(text.to_string())),
        "nil" => Ok(Value::Nil),
        "array" => {
            let data = typed
                .child("data")
                .ok_or_else(|| malformed("array without <data>"))?;
            data.children_named("value")
                .map(value_from_node)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children_named("member") {
                let name = member
                    .child("name")
                    .ok_or_else(|| malformed("struct member without <name>"))?;
                let value = member
                    .child("value")
                    .ok_or_else(|| malformed("struct member without <value>"))?;
                members.insert(name.text.clone(), value_from_node(value)?);
            }
            Ok(Value::Struct(members))
        }
        other => Err(malformed(format!("unsupported value type <{other}>"))),
    }
}
