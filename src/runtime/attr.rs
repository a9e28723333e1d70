//! Attribute slots: the storage cells inside an object.
//!
//! A slot's behavior is fixed when it is created. Only the content of a
//! `Free` slot (written at most once), the cache of a `Once` slot and the
//! items of a `Vararg` slot ever change.
//!
//! Computations receive the object that owns the slot on every call, so a
//! copied slot is rebound to its new object without touching the function.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::runtime::dataized::Dataized;
use crate::runtime::phi::Phi;
use crate::runtime::value::{TypeTag, Value};

/// A computation over the object that holds the slot.
pub type Lambda = Rc<dyn Fn(&Phi) -> Result<Phi, RuntimeError>>;

/// Depth after which φ-terms are abbreviated.
const TERM_DEPTH: usize = 6;

pub enum Attr {
    /// Empty until written, then read-only.
    Free(RefCell<Option<Phi>>),
    /// Computed on first read, then cached.
    Once {
        origin: Lambda,
        cached: RefCell<Option<Phi>>,
    },
    /// Collects any number of positional values into one array.
    Vararg(RefCell<Vec<Phi>>),
    /// Computed again on every read.
    Composite(Lambda),
}

impl Attr {
    pub fn free() -> Self {
        Attr::Free(RefCell::new(None))
    }

    /// A free slot that is already written.
    pub fn bound(phi: Phi) -> Self {
        Attr::Free(RefCell::new(Some(phi)))
    }

    pub fn once<F>(origin: F) -> Self
    where
        F: Fn(&Phi) -> Result<Phi, RuntimeError> + 'static,
    {
        Attr::Once {
            origin: Rc::new(origin),
            cached: RefCell::new(None),
        }
    }

    pub fn vararg() -> Self {
        Attr::Vararg(RefCell::new(Vec::new()))
    }

    pub fn composite<F>(origin: F) -> Self
    where
        F: Fn(&Phi) -> Result<Phi, RuntimeError> + 'static,
    {
        Attr::Composite(Rc::new(origin))
    }

    /// Read the slot named `name` of `owner`.
    pub fn get(&self, name: &str, owner: &Phi) -> Result<Phi, RuntimeError> {
        match self {
            Attr::Free(value) => value
                .borrow()
                .clone()
                .ok_or_else(|| RuntimeError::not_yet_bound(name, owner.describe())),
            Attr::Once { origin, cached } => {
                if let Some(phi) = cached.borrow().as_ref() {
                    return Ok(phi.clone());
                }
                let phi = origin(owner)?;
                Ok(cached.borrow_mut().get_or_insert(phi).clone())
            }
            Attr::Vararg(items) => Ok(Phi::data(
                owner.vertices(),
                Value::Array(items.borrow().clone()),
            )),
            Attr::Composite(origin) => origin(owner),
        }
    }

    /// Write the slot named `name` of `owner`.
    ///
    /// A vararg slot appends the value, or all elements of an unvararg'ed
    /// array; the other computed slots refuse writes.
    pub fn put(&self, name: &str, owner: &Phi, value: Phi) -> Result<(), RuntimeError> {
        match self {
            Attr::Free(slot) => {
                let mut slot = slot.borrow_mut();
                if slot.is_some() {
                    return Err(RuntimeError::already_bound(name, owner.describe()));
                }
                *slot = Some(value);
                Ok(())
            }
            Attr::Vararg(items) => {
                if value.is_unvar() {
                    let unpacked = match Dataized::new(value).take()? {
                        Value::Array(elements) => elements,
                        other => {
                            return Err(RuntimeError::type_mismatch(
                                name,
                                TypeTag::Array,
                                other.type_tag(),
                            ))
                        }
                    };
                    items.borrow_mut().extend(unpacked);
                } else {
                    items.borrow_mut().push(value);
                }
                Ok(())
            }
            Attr::Once { .. } | Attr::Composite(_) => {
                Err(RuntimeError::already_bound(name, owner.describe()))
            }
        }
    }

    /// An independent slot with the same behavior and the same content.
    ///
    /// A once slot starts over: whatever it cached was computed for the
    /// old owner.
    pub fn copy(&self) -> Attr {
        match self {
            Attr::Free(value) => Attr::Free(RefCell::new(value.borrow().clone())),
            Attr::Once { origin, .. } => Attr::Once {
                origin: origin.clone(),
                cached: RefCell::new(None),
            },
            Attr::Vararg(items) => Attr::Vararg(RefCell::new(items.borrow().clone())),
            Attr::Composite(origin) => Attr::Composite(origin.clone()),
        }
    }

    /// Whether a positional argument may still land here.
    pub fn is_open(&self) -> bool {
        match self {
            Attr::Free(value) => value.borrow().is_none(),
            Attr::Vararg(_) => true,
            _ => false,
        }
    }

    /// Expand array elements into written free slots named `0`, `1`, ...
    pub fn unpack(items: &[Phi]) -> Vec<(String, Attr)> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| (i.to_string(), Attr::bound(item.clone())))
            .collect()
    }

    pub(crate) fn term(&self, depth: usize) -> String {
        if depth > TERM_DEPTH {
            return "…".to_string();
        }
        match self {
            Attr::Free(value) => match value.borrow().as_ref() {
                Some(phi) => phi.term(depth + 1),
                None => "Ø".to_string(),
            },
            Attr::Once { cached, .. } => match cached.borrow().as_ref() {
                Some(phi) => phi.term(depth + 1),
                None => "λ".to_string(),
            },
            Attr::Vararg(items) => {
                let items: Vec<String> = items
                    .borrow()
                    .iter()
                    .map(|item| item.term(depth + 1))
                    .collect();
                format!("*({})", items.join(", "))
            }
            Attr::Composite(_) => "λ".to_string(),
        }
    }
}

impl fmt::Debug for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attr::Free(value) => match value.borrow().as_ref() {
                Some(phi) => write!(f, "Free({:?})", phi),
                None => write!(f, "Free(Ø)"),
            },
            Attr::Once { cached, .. } => match cached.borrow().as_ref() {
                Some(phi) => write!(f, "Once({:?})", phi),
                None => write!(f, "Once(λ)"),
            },
            Attr::Vararg(items) => write!(f, "Vararg({} items)", items.borrow().len()),
            Attr::Composite(_) => write!(f, "Composite(λ)"),
        }
    }
}
