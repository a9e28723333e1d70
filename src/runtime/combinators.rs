//! Combinators: lazy views that derive a new object from an existing one.
//!
//! Each view is an object of its own, with its own vertex. Nothing happens
//! until the view is first used; then the derived object is computed once
//! and every later use goes straight to it.

use std::cell::RefCell;
use std::fmt;

use crate::error::RuntimeError;
use crate::runtime::phi::Phi;

/// How a bound value finds its slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Name(String),
    /// Among the slots still open, in declaration order.
    Position(usize),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => write!(f, "{}", name),
            Key::Position(pos) => write!(f, "α{}", pos),
        }
    }
}

#[derive(Debug)]
pub enum Combinator {
    /// A copy of `base` with one free slot written.
    With { base: Phi, key: Key, value: Phi },
    /// The attribute `name` of `base`, copied and owned by `base`.
    Method { base: Phi, name: String },
    /// A fresh copy of `base`, owner still unbound.
    Copy(Phi),
    /// An array to be spread over a vararg slot.
    Unvar(Phi),
}

impl Combinator {
    pub fn name(&self) -> &'static str {
        match self {
            Combinator::With { .. } => "with",
            Combinator::Method { .. } => "method",
            Combinator::Copy(_) => "copy",
            Combinator::Unvar(_) => "unvar",
        }
    }

    fn apply(&self) -> Result<Phi, RuntimeError> {
        match self {
            Combinator::With { base, key, value } => {
                let base = base.resolved()?;
                let copy = base.copy()?;
                if let Some(owner) = base.owner()? {
                    copy.move_to(&owner)?;
                }
                let slot = match key {
                    Key::Name(name) => copy
                        .own_attr(name)?
                        .ok_or_else(|| RuntimeError::no_such_attribute(name, copy.describe()))?,
                    Key::Position(pos) => copy.attr_at(*pos)?,
                };
                slot.put(value.clone())?;
                Ok(copy)
            }
            Combinator::Method { base, name } => {
                let base = base.resolved()?;
                let found = base.attr(name)?.get()?;
                if found.as_data().is_some() {
                    return Ok(found);
                }
                let method = found.copy()?;
                method.move_to(&base)?;
                Ok(method)
            }
            Combinator::Copy(base) => base.copy(),
            Combinator::Unvar(base) => base.resolved(),
        }
    }

    fn term(&self, depth: usize) -> String {
        match self {
            Combinator::With { base, key, value } => format!(
                "{}({} ↦ {})",
                base.term(depth + 1),
                key,
                value.term(depth + 1)
            ),
            Combinator::Method { base, name } => format!("{}.{}", base.term(depth + 1), name),
            Combinator::Copy(base) => format!("{}′", base.term(depth + 1)),
            Combinator::Unvar(base) => format!("{}...", base.term(depth + 1)),
        }
    }
}

/// A combinator together with the object it resolved to.
pub(crate) struct Lazy {
    op: Combinator,
    resolved: RefCell<Option<Phi>>,
}

impl Lazy {
    pub(crate) fn new(op: Combinator) -> Self {
        Self {
            op,
            resolved: RefCell::new(None),
        }
    }

    pub(crate) fn op(&self) -> &Combinator {
        &self.op
    }

    pub(crate) fn resolve(&self) -> Result<Phi, RuntimeError> {
        if let Some(phi) = self.resolved.borrow().as_ref() {
            return Ok(phi.clone());
        }
        let phi = self.op.apply()?;
        Ok(self.resolved.borrow_mut().get_or_insert(phi).clone())
    }

    pub(crate) fn term(&self, depth: usize) -> String {
        match self.resolved.borrow().as_ref() {
            Some(phi) => phi.term(depth),
            None => self.op.term(depth),
        }
    }
}

impl Phi {
    /// `base` with the slot at `key` written to `value`.
    pub fn with(base: &Phi, key: Key, value: Phi) -> Phi {
        Phi::lazy(
            base.vertices(),
            Combinator::With {
                base: base.clone(),
                key,
                value,
            },
        )
    }

    /// `base.name`, owned by `base`.
    pub fn method(base: &Phi, name: impl Into<String>) -> Phi {
        Phi::lazy(
            base.vertices(),
            Combinator::Method {
                base: base.clone(),
                name: name.into(),
            },
        )
    }

    pub fn copied(base: &Phi) -> Phi {
        Phi::lazy(base.vertices(), Combinator::Copy(base.clone()))
    }

    pub fn unvar(base: &Phi) -> Phi {
        Phi::lazy(base.vertices(), Combinator::Unvar(base.clone()))
    }
}
