//! Primitive payloads carried by terminal data objects.

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::runtime::phi::Phi;

/// Maximum regex nesting, against pathological patterns.
const REGEX_NEST_LIMIT: u32 = 10;

/// Maximum size of a compiled regex in bytes.
const REGEX_SIZE_LIMIT: usize = 100_000;

/// Runtime type tag of a data value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Int,
    Float,
    Bool,
    Char,
    String,
    Bytes,
    Regex,
    Array,
}

impl TypeTag {
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Bool => "bool",
            TypeTag::Char => "char",
            TypeTag::String => "string",
            TypeTag::Bytes => "bytes",
            TypeTag::Regex => "regex",
            TypeTag::Array => "array",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(TypeTag::Int),
            "float" => Some(TypeTag::Float),
            "bool" => Some(TypeTag::Bool),
            "char" => Some(TypeTag::Char),
            "string" => Some(TypeTag::String),
            "bytes" => Some(TypeTag::Bytes),
            "regex" => Some(TypeTag::Regex),
            "array" => Some(TypeTag::Array),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A primitive value: what dataization ends with.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
    Regex(Regex),
    /// Elements stay objects; they are dataized only on demand.
    Array(Vec<Phi>),
}

impl Value {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Bool(_) => TypeTag::Bool,
            Value::Char(_) => TypeTag::Char,
            Value::String(_) => TypeTag::String,
            Value::Bytes(_) => TypeTag::Bytes,
            Value::Regex(_) => TypeTag::Regex,
            Value::Array(_) => TypeTag::Array,
        }
    }

    /// Canonical text used for content addressing. Arrays have none.
    pub fn label(&self) -> Option<String> {
        match self {
            Value::Int(n) => Some(n.to_string()),
            Value::Float(n) => Some(format!("{:?}", n)),
            Value::Bool(b) => Some(b.to_string()),
            Value::Char(c) => Some(c.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Bytes(bytes) => Some(format!("{:?}", bytes)),
            Value::Regex(re) => Some(re.as_str().to_string()),
            Value::Array(_) => None,
        }
    }

    /// Parse the textual payload of a literal with the given type tag.
    pub fn parse(tag: TypeTag, text: &str) -> Result<Value, String> {
        match tag {
            TypeTag::Int => parse_int(text).map(Value::Int),
            TypeTag::Float => text
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| e.to_string()),
            TypeTag::Bool => match text.trim() {
                "true" | "TRUE" => Ok(Value::Bool(true)),
                "false" | "FALSE" => Ok(Value::Bool(false)),
                other => Err(format!("'{}' is neither true nor false", other)),
            },
            TypeTag::Char => {
                let text = unescape(text);
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err("a char literal holds exactly one character".to_string()),
                }
            }
            TypeTag::String => Ok(Value::String(unescape(text))),
            TypeTag::Bytes => parse_bytes(text).map(Value::Bytes),
            TypeTag::Regex => compile_regex(text).map(Value::Regex),
            TypeTag::Array => Err("arrays have no literal form".to_string()),
        }
    }

    /// Symbolic form of the value, as shown in traces and results.
    pub fn phi_term(&self) -> String {
        match self {
            Value::Int(n) => n.to_string(),
            Value::Float(n) => format!("{:?}", n),
            Value::Bool(b) => b.to_string().to_uppercase(),
            Value::Char(c) => format!("{:?}", c),
            Value::String(s) => format!("{:?}", s),
            Value::Bytes(bytes) => {
                if bytes.is_empty() {
                    "--".to_string()
                } else {
                    bytes
                        .iter()
                        .map(|b| format!("{:02X}", b))
                        .collect::<Vec<_>>()
                        .join("-")
                }
            }
            Value::Regex(re) => format!("/{}/", re.as_str()),
            Value::Array(items) => {
                let items: Vec<String> = items.iter().map(|item| item.phi_term()).collect();
                format!("*({})", items.join(", "))
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Regex(a), Value::Regex(b)) => a.as_str() == b.as_str(),
            // Elements are objects: equal only when they are the same vertices
            (Value::Array(a), Value::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Char(c) => write!(f, "{}", c),
            Value::Bool(b) => write!(f, "{}", b),
            other => write!(f, "{}", other.phi_term()),
        }
    }
}

/// Build a regex with safety limits.
pub fn compile_regex(pattern: &str) -> Result<Regex, String> {
    RegexBuilder::new(pattern)
        .nest_limit(REGEX_NEST_LIMIT)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| format!("Invalid regex pattern: {}", e))
}

/// Decimal, or hex with a `0x` prefix after an optional minus sign.
fn parse_int(text: &str) -> Result<i64, String> {
    let text = text.trim();
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let Some(hex) = unsigned.strip_prefix("0x") else {
        return text.parse::<i64>().map_err(|e| e.to_string());
    };
    if hex.starts_with(['+', '-']) {
        return Err(format!("'{}' is not a hex number", text));
    }
    let magnitude = i128::from_str_radix(hex, 16).map_err(|e| e.to_string())?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).map_err(|_| format!("'{}' does not fit in an int", text))
}

/// Bytes come as hex pairs separated by dashes or spaces; `--` is empty.
fn parse_bytes(text: &str) -> Result<Vec<u8>, String> {
    let text = text.trim();
    if text == "--" || text.is_empty() {
        return Ok(Vec::new());
    }
    text.split(|c: char| c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            u8::from_str_radix(part, 16).map_err(|_| format!("'{}' is not a hex byte", part))
        })
        .collect()
}

/// Resolve `\n`, `\r`, `\t` and `\\`; any other backslash stays as written.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
