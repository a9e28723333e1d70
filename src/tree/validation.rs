//! Structural validation of program trees.
//!
//! Runs before translation, so the translator may rely on every node being
//! well formed: names where names are needed, parseable literals and no
//! clashes between attribute names.

use std::collections::HashSet;

use crate::error::TreeError;
use crate::runtime::phi::{PHI, RESERVED};
use crate::runtime::value::{TypeTag, Value};
use crate::tree::{Base, Body, Node, Program};

/// Validate a whole program.
pub fn validate(program: &Program) -> Result<(), TreeError> {
    let mut seen = HashSet::new();
    for node in &program.objects {
        let name = node.name.as_deref().ok_or(TreeError::Unnamed {
            what: "Top-level object",
            line: node.line,
        })?;
        if !matches!(node.body, Body::Abstraction { .. }) {
            return Err(TreeError::NotAnAbstraction {
                name: name.to_string(),
                line: node.line,
            });
        }
        if !seen.insert(name) {
            return Err(TreeError::DuplicateAttribute {
                object: program.name.clone(),
                attr: name.to_string(),
                line: node.line,
            });
        }
        validate_node(node)?;
    }
    Ok(())
}

/// Validate a node and everything below it.
pub fn validate_node(node: &Node) -> Result<(), TreeError> {
    match &node.body {
        Body::Abstraction { params, attrs } => {
            let mut names = HashSet::new();
            for (i, param) in params.iter().enumerate() {
                check_name(&param.name, node.line)?;
                if param.vararg && i + 1 != params.len() {
                    return Err(TreeError::MisplacedVararg {
                        name: param.name.clone(),
                        line: node.line,
                    });
                }
                if !names.insert(param.name.as_str()) {
                    return Err(duplicate(node, &param.name, node.line));
                }
            }
            for attr in attrs {
                let name = attr.name.as_deref().ok_or(TreeError::Unnamed {
                    what: "Attribute",
                    line: attr.line,
                })?;
                check_name(name, attr.line)?;
                // `@` and `φ` are the same attribute
                let key = if name == "@" { PHI } else { name };
                if !names.insert(key) {
                    return Err(duplicate(node, name, attr.line));
                }
                validate_node(attr)?;
            }
            Ok(())
        }
        Body::Application { base, args, .. } => {
            if let Base::Method(method) = base {
                if args.is_empty() {
                    return Err(TreeError::MissingReceiver {
                        method: method.clone(),
                        line: node.line,
                    });
                }
            }
            for arg in args {
                if let Some(name) = &arg.name {
                    check_name(name, arg.line)?;
                }
                validate_node(arg)?;
            }
            Ok(())
        }
        Body::Data { tag, value } => {
            let type_tag = TypeTag::from_name(tag).ok_or_else(|| TreeError::UnknownDataType {
                tag: tag.clone(),
                line: node.line,
            })?;
            Value::parse(type_tag, value)
                .map(|_| ())
                .map_err(|reason| TreeError::InvalidLiteral {
                    tag: tag.clone(),
                    text: value.clone(),
                    reason,
                    line: node.line,
                })
        }
    }
}

fn check_name(name: &str, line: usize) -> Result<(), TreeError> {
    if RESERVED.contains(&name) {
        return Err(TreeError::ReservedName {
            name: name.to_string(),
            line,
        });
    }
    Ok(())
}

fn duplicate(node: &Node, attr: &str, line: usize) -> TreeError {
    TreeError::DuplicateAttribute {
        object: node.form().to_string(),
        attr: attr.to_string(),
        line,
    }
}
