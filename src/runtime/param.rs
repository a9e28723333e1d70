//! Parameter accessor: fetch an attribute and dataize it, optionally with a
//! type check.
//!
//! Built-in objects use it to read their arguments:
//!
//! ```ignore
//! let left = Param::named(rho, SIGMA).int()?;
//! let right = Param::named(rho, "x").int()?;
//! ```

use regex::Regex;

use crate::error::RuntimeError;
use crate::runtime::dataized::Dataized;
use crate::runtime::phi::{Phi, RHO};
use crate::runtime::value::{TypeTag, Value};

pub struct Param<'a> {
    rho: &'a Phi,
    attr: &'a str,
}

impl<'a> Param<'a> {
    /// The owner of `obj`.
    pub fn new(obj: &'a Phi) -> Self {
        Self::named(obj, RHO)
    }

    pub fn named(obj: &'a Phi, attr: &'a str) -> Self {
        Self { rho: obj, attr }
    }

    /// Fetch and dataize, whatever the type.
    pub fn weak(&self) -> Result<Value, RuntimeError> {
        Dataized::new(self.rho.attr(self.attr)?.get()?).take()
    }

    /// Fetch and dataize, failing unless the value has type `tag`.
    pub fn strong(&self, tag: TypeTag) -> Result<Value, RuntimeError> {
        let value = self.weak()?;
        if value.type_tag() != tag {
            return Err(RuntimeError::type_mismatch(
                self.attr,
                tag,
                value.type_tag(),
            ));
        }
        Ok(value)
    }

    pub fn int(&self) -> Result<i64, RuntimeError> {
        match self.strong(TypeTag::Int)? {
            Value::Int(n) => Ok(n),
            other => Err(self.mismatch(TypeTag::Int, &other)),
        }
    }

    pub fn float(&self) -> Result<f64, RuntimeError> {
        match self.strong(TypeTag::Float)? {
            Value::Float(n) => Ok(n),
            other => Err(self.mismatch(TypeTag::Float, &other)),
        }
    }

    pub fn bool(&self) -> Result<bool, RuntimeError> {
        match self.strong(TypeTag::Bool)? {
            Value::Bool(b) => Ok(b),
            other => Err(self.mismatch(TypeTag::Bool, &other)),
        }
    }

    pub fn char(&self) -> Result<char, RuntimeError> {
        match self.strong(TypeTag::Char)? {
            Value::Char(c) => Ok(c),
            other => Err(self.mismatch(TypeTag::Char, &other)),
        }
    }

    pub fn string(&self) -> Result<String, RuntimeError> {
        match self.strong(TypeTag::String)? {
            Value::String(s) => Ok(s),
            other => Err(self.mismatch(TypeTag::String, &other)),
        }
    }

    pub fn bytes(&self) -> Result<Vec<u8>, RuntimeError> {
        match self.strong(TypeTag::Bytes)? {
            Value::Bytes(bytes) => Ok(bytes),
            other => Err(self.mismatch(TypeTag::Bytes, &other)),
        }
    }

    pub fn regex(&self) -> Result<Regex, RuntimeError> {
        match self.strong(TypeTag::Regex)? {
            Value::Regex(re) => Ok(re),
            other => Err(self.mismatch(TypeTag::Regex, &other)),
        }
    }

    pub fn array(&self) -> Result<Vec<Phi>, RuntimeError> {
        match self.strong(TypeTag::Array)? {
            Value::Array(items) => Ok(items),
            other => Err(self.mismatch(TypeTag::Array, &other)),
        }
    }

    fn mismatch(&self, expected: TypeTag, found: &Value) -> RuntimeError {
        RuntimeError::type_mismatch(self.attr, expected, found.type_tag())
    }
}
