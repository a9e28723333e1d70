//! Program trees, as handed over by the parser.
//!
//! ```json
//! { "name": "app", "objects": [
//!   { "name": "app", "kind": "abstraction", "attrs": [
//!     { "name": "@", "kind": "application", "base": { "method": "plus" },
//!       "args": [ { "kind": "data", "type": "int", "value": "40" },
//!                 { "kind": "data", "type": "int", "value": "2" } ] } ] } ] }
//! ```

pub mod translate;
pub mod validation;

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::TreeError;

/// A whole program: top-level abstractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    #[serde(default)]
    pub objects: Vec<Rc<Node>>,
}

impl Program {
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    pub fn object(&self, name: &str) -> Option<&Rc<Node>> {
        self.objects
            .iter()
            .find(|node| node.name.as_deref() == Some(name))
    }

    /// The object to run: `requested` if given, else the one named like the
    /// program, else the first one.
    pub fn root(&self, requested: Option<&str>) -> Result<String, TreeError> {
        if let Some(name) = requested {
            return match self.object(name) {
                Some(_) => Ok(name.to_string()),
                None => Err(TreeError::MissingRoot(name.to_string())),
            };
        }
        if self.object(&self.name).is_some() {
            return Ok(self.name.clone());
        }
        self.objects
            .first()
            .and_then(|node| node.name.clone())
            .ok_or_else(|| TreeError::MissingRoot(self.name.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Attribute name inside an abstraction (`@` is `φ`), or binding name
    /// when used as an argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub line: usize,
    #[serde(flatten)]
    pub body: Body,
}

impl Node {
    pub fn form(&self) -> &str {
        self.name.as_deref().unwrap_or("[]")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Body {
    Abstraction {
        #[serde(default)]
        params: Vec<Parameter>,
        #[serde(default)]
        attrs: Vec<Rc<Node>>,
    },
    Application {
        base: Base,
        #[serde(default)]
        args: Vec<Rc<Node>>,
        #[serde(default)]
        copy: bool,
        #[serde(default)]
        unvar: bool,
    },
    Data {
        #[serde(rename = "type")]
        tag: String,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub vararg: bool,
}

/// What an application starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Base {
    /// A name, looked up in the enclosing scopes and then among globals.
    Ref(String),
    /// A method of the first argument.
    Method(String),
    Xi,
    Rho,
    Sigma,
    /// The arguments, as one array.
    Array,
}
