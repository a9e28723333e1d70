//! Objects: the `Phi` handle and the builder for new objects.
//!
//! A `Phi` is a cheap, reference-counted handle. Three kinds stand behind
//! it: a plain object with named attribute slots, a terminal data value,
//! and a lazy combinator view that resolves to another object on demand.
//!
//! Identity is the vertex. Two handles are equal when they point at the same
//! vertex, however alike their attributes look.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::RuntimeError;
use crate::runtime::attr::Attr;
use crate::runtime::builtins;
use crate::runtime::combinators::{Combinator, Lazy};
use crate::runtime::value::{TypeTag, Value};
use crate::runtime::vertices::{Vertex, Vertices};

/// Decoratee: attributes missing on an object are looked up here.
pub const PHI: &str = "φ";
/// Data: what dataization reads.
pub const DELTA: &str = "Δ";
/// Owner, bound once by `move_to`.
pub const RHO: &str = "ρ";
/// Home: the object in whose scope this one was constructed.
pub const SIGMA: &str = "σ";
/// Self.
pub const XI: &str = "ξ";

/// Names that can never be declared as attributes.
pub const RESERVED: [&str; 3] = [RHO, SIGMA, XI];

const TERM_DEPTH: usize = 6;

#[derive(Clone)]
pub struct Phi(Rc<PhiInner>);

struct PhiInner {
    vertex: Vertex,
    vertices: Arc<Vertices>,
    kind: Kind,
}

enum Kind {
    Object(Object),
    Data(Value),
    Lazy(Lazy),
}

struct Object {
    form: String,
    home: Option<Home>,
    owner: Rc<Attr>,
    attrs: IndexMap<String, Rc<Attr>>,
}

/// Where an object was constructed.
///
/// A scope usually caches the objects built in it, so it is held weakly.
/// Data never refers back and is often a temporary, so it is held strongly.
#[derive(Clone)]
enum Home {
    Data(Phi),
    Scope(Weak<PhiInner>),
}

impl Home {
    fn of(home: &Phi) -> Self {
        match &home.0.kind {
            Kind::Data(_) => Home::Data(home.clone()),
            _ => Home::Scope(Rc::downgrade(&home.0)),
        }
    }

    fn get(&self) -> Option<Phi> {
        match self {
            Home::Data(data) => Some(data.clone()),
            Home::Scope(scope) => scope.upgrade().map(Phi),
        }
    }
}

/// A slot looked up on a concrete object, ready to be read or written.
pub struct Slot {
    name: String,
    attr: Rc<Attr>,
    owner: Phi,
}

impl Slot {
    fn new(name: &str, attr: Rc<Attr>, owner: &Phi) -> Self {
        Self {
            name: name.to_string(),
            attr,
            owner: owner.clone(),
        }
    }

    /// A read-only slot holding `value`.
    fn fixed(name: &str, value: Phi, owner: &Phi) -> Self {
        Self::new(name, Rc::new(Attr::bound(value)), owner)
    }

    pub fn get(&self) -> Result<Phi, RuntimeError> {
        self.attr.get(&self.name, &self.owner)
    }

    pub fn put(&self, value: Phi) -> Result<(), RuntimeError> {
        self.attr.put(&self.name, &self.owner, value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The object the slot was found on.
    pub fn owner(&self) -> &Phi {
        &self.owner
    }

    pub fn is_open(&self) -> bool {
        self.attr.is_open()
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} = {:?}", self.owner.describe(), self.name, self.attr)
    }
}

/// Collects the slots of a new object, in declaration order.
pub struct ObjectBuilder {
    vertices: Arc<Vertices>,
    form: String,
    home: Option<Home>,
    attrs: IndexMap<String, Rc<Attr>>,
}

impl ObjectBuilder {
    pub fn home(mut self, home: &Phi) -> Self {
        self.home = Some(Home::of(home));
        self
    }

    pub fn attr(mut self, name: &str, attr: Attr) -> Self {
        self.attrs.insert(name.to_string(), Rc::new(attr));
        self
    }

    pub fn free(self, name: &str) -> Self {
        self.attr(name, Attr::free())
    }

    pub fn bound(self, name: &str, value: Phi) -> Self {
        self.attr(name, Attr::bound(value))
    }

    pub fn vararg(self, name: &str) -> Self {
        self.attr(name, Attr::vararg())
    }

    pub fn once<F>(self, name: &str, origin: F) -> Self
    where
        F: Fn(&Phi) -> Result<Phi, RuntimeError> + 'static,
    {
        self.attr(name, Attr::once(origin))
    }

    pub fn composite<F>(self, name: &str, origin: F) -> Self
    where
        F: Fn(&Phi) -> Result<Phi, RuntimeError> + 'static,
    {
        self.attr(name, Attr::composite(origin))
    }

    pub fn build(self) -> Phi {
        let vertex = self.vertices.next();
        Phi(Rc::new(PhiInner {
            vertex,
            vertices: self.vertices,
            kind: Kind::Object(Object {
                form: self.form,
                home: self.home,
                owner: Rc::new(Attr::free()),
                attrs: self.attrs,
            }),
        }))
    }
}

impl Phi {
    /// Start building a fresh object named `form`.
    pub fn object(vertices: &Arc<Vertices>, form: impl Into<String>) -> ObjectBuilder {
        ObjectBuilder {
            vertices: vertices.clone(),
            form: form.into(),
            home: None,
            attrs: IndexMap::new(),
        }
    }

    /// A terminal data object. Equal literals share their vertex.
    pub fn data(vertices: &Arc<Vertices>, value: Value) -> Phi {
        let vertex = vertices.best(&value);
        Phi(Rc::new(PhiInner {
            vertex,
            vertices: vertices.clone(),
            kind: Kind::Data(value),
        }))
    }

    /// A literal given by its type tag name and text, as found in program
    /// trees. Its vertex comes from the tag and the canonical text.
    pub fn literal(vertices: &Arc<Vertices>, tag: &str, text: &str) -> Result<Phi, RuntimeError> {
        let type_tag =
            TypeTag::from_name(tag).ok_or_else(|| RuntimeError::unsupported_vertex_type(tag))?;
        let value = Value::parse(type_tag, text).map_err(|reason| {
            RuntimeError::new(format!("Bad {} literal '{}': {}", tag, text, reason))
        })?;
        let label = value
            .label()
            .ok_or_else(|| RuntimeError::unsupported_vertex_type(tag))?;
        let vertex = vertices.best_of(tag, &label)?;
        Ok(Phi(Rc::new(PhiInner {
            vertex,
            vertices: vertices.clone(),
            kind: Kind::Data(value),
        })))
    }

    /// A data object from the same registry as `self`.
    pub fn data_of(&self, value: Value) -> Phi {
        Phi::data(&self.0.vertices, value)
    }

    pub(crate) fn lazy(vertices: &Arc<Vertices>, op: Combinator) -> Phi {
        let vertex = vertices.next();
        Phi(Rc::new(PhiInner {
            vertex,
            vertices: vertices.clone(),
            kind: Kind::Lazy(Lazy::new(op)),
        }))
    }

    pub fn vertex(&self) -> Vertex {
        self.0.vertex
    }

    pub fn vertices(&self) -> &Arc<Vertices> {
        &self.0.vertices
    }

    /// The payload, if this is a terminal data object.
    pub fn as_data(&self) -> Option<&Value> {
        match &self.0.kind {
            Kind::Data(value) => Some(value),
            _ => None,
        }
    }

    /// Whether this is an array marked for expansion into a vararg slot.
    pub fn is_unvar(&self) -> bool {
        match &self.0.kind {
            Kind::Lazy(lazy) => matches!(lazy.op(), Combinator::Unvar(_)),
            _ => false,
        }
    }

    /// The object behind any combinator views.
    pub fn resolved(&self) -> Result<Phi, RuntimeError> {
        match &self.0.kind {
            Kind::Lazy(lazy) => lazy.resolve()?.resolved(),
            _ => Ok(self.clone()),
        }
    }

    /// Look up an attribute, synthetic names first, then the declared
    /// slots, then the decoratee.
    pub fn attr(&self, name: &str) -> Result<Slot, RuntimeError> {
        match &self.0.kind {
            Kind::Lazy(lazy) => lazy.resolve()?.attr(name),
            Kind::Data(value) => self.data_attr(value, name),
            Kind::Object(object) => {
                match name {
                    RHO => return Ok(Slot::new(RHO, object.owner.clone(), self)),
                    XI => return Ok(Slot::fixed(XI, self.clone(), self)),
                    SIGMA => {
                        return match &object.home {
                            Some(home) => match home.get() {
                                Some(home) => Ok(Slot::fixed(SIGMA, home, self)),
                                None => Err(RuntimeError::new(format!(
                                    "The home of {} is gone",
                                    self.describe()
                                ))),
                            },
                            None => Err(RuntimeError::no_such_attribute(SIGMA, self.describe())),
                        }
                    }
                    _ => {}
                }
                if let Some(attr) = object.attrs.get(name) {
                    return Ok(Slot::new(name, attr.clone(), self));
                }
                match object.attrs.get(PHI) {
                    Some(decoratee) => decoratee.get(PHI, self)?.attr(name),
                    None => Err(RuntimeError::no_such_attribute(name, self.describe())),
                }
            }
        }
    }

    /// A declared attribute of this very object; no synthetic names and no
    /// decoration.
    pub fn own_attr(&self, name: &str) -> Result<Option<Slot>, RuntimeError> {
        match &self.0.kind {
            Kind::Lazy(lazy) => lazy.resolve()?.own_attr(name),
            Kind::Data(_) => Ok(None),
            Kind::Object(object) => Ok(object
                .attrs
                .get(name)
                .map(|attr| Slot::new(name, attr.clone(), self))),
        }
    }

    /// The `pos`-th declared slot that can still take a positional value.
    pub fn attr_at(&self, pos: usize) -> Result<Slot, RuntimeError> {
        match &self.0.kind {
            Kind::Lazy(lazy) => lazy.resolve()?.attr_at(pos),
            Kind::Data(_) => Err(RuntimeError::no_such_attribute(
                format!("#{}", pos),
                self.describe(),
            )),
            Kind::Object(object) => object
                .attrs
                .iter()
                .filter(|(_, attr)| attr.is_open())
                .nth(pos)
                .map(|(name, attr)| Slot::new(name, attr.clone(), self))
                .ok_or_else(|| {
                    RuntimeError::no_such_attribute(format!("#{}", pos), self.describe())
                }),
        }
    }

    /// Names of the declared attributes, in order.
    pub fn names(&self) -> Vec<String> {
        match &self.0.kind {
            Kind::Object(object) => object.attrs.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// A new object with its own slot table and an unbound owner.
    ///
    /// Data values are immutable and copy to themselves.
    pub fn copy(&self) -> Result<Phi, RuntimeError> {
        match &self.0.kind {
            Kind::Data(_) => Ok(self.clone()),
            Kind::Lazy(lazy) => lazy.resolve()?.copy(),
            Kind::Object(object) => {
                let attrs = object
                    .attrs
                    .iter()
                    .map(|(name, attr)| (name.clone(), Rc::new(attr.copy())))
                    .collect();
                Ok(Phi(Rc::new(PhiInner {
                    vertex: self.0.vertices.next(),
                    vertices: self.0.vertices.clone(),
                    kind: Kind::Object(Object {
                        form: object.form.clone(),
                        home: object.home.clone(),
                        owner: Rc::new(Attr::free()),
                        attrs,
                    }),
                })))
            }
        }
    }

    /// Bind the owner. Fails when the owner is already bound.
    pub fn move_to(&self, owner: &Phi) -> Result<(), RuntimeError> {
        match &self.0.kind {
            Kind::Data(_) => Ok(()),
            Kind::Lazy(lazy) => lazy.resolve()?.move_to(owner),
            Kind::Object(object) => object.owner.put(RHO, self, owner.clone()),
        }
    }

    /// The owner, if bound.
    pub fn owner(&self) -> Result<Option<Phi>, RuntimeError> {
        match &self.0.kind {
            Kind::Data(_) => Ok(None),
            Kind::Lazy(lazy) => lazy.resolve()?.owner(),
            Kind::Object(object) => Ok(object.owner.get(RHO, self).ok()),
        }
    }

    pub fn home(&self) -> Option<Phi> {
        match &self.0.kind {
            Kind::Object(object) => object.home.as_ref().and_then(Home::get),
            _ => None,
        }
    }

    pub fn form(&self) -> &str {
        match &self.0.kind {
            Kind::Object(object) => &object.form,
            Kind::Data(value) => value.type_tag().name(),
            Kind::Lazy(lazy) => lazy.op().name(),
        }
    }

    /// Short identification for error messages: `ν12·app`.
    pub fn describe(&self) -> String {
        format!("{}·{}", self.0.vertex, self.form())
    }

    /// Symbolic form of the object.
    pub fn phi_term(&self) -> String {
        self.term(0)
    }

    pub(crate) fn term(&self, depth: usize) -> String {
        if depth > TERM_DEPTH {
            return "…".to_string();
        }
        match &self.0.kind {
            Kind::Data(value) => value.phi_term(),
            Kind::Lazy(lazy) => lazy.term(depth),
            Kind::Object(object) => {
                let attrs: Vec<String> = object
                    .attrs
                    .iter()
                    .map(|(name, attr)| format!("{} ↦ {}", name, attr.term(depth + 1)))
                    .collect();
                format!("{}⟦{}⟧", object.form, attrs.join(", "))
            }
        }
    }

    fn data_attr(&self, value: &Value, name: &str) -> Result<Slot, RuntimeError> {
        if name == DELTA || name == XI {
            return Ok(Slot::fixed(name, self.clone(), self));
        }
        if let Value::Array(items) = value {
            if let Ok(index) = name.parse::<usize>() {
                return match Attr::unpack(items).into_iter().nth(index) {
                    Some((name, attr)) => Ok(Slot::new(&name, Rc::new(attr), self)),
                    None => Err(RuntimeError::no_such_attribute(name, self.describe())),
                };
            }
        }
        match builtins::data::method(self, value, name) {
            Some(method) => Ok(Slot::fixed(name, method, self)),
            None => Err(RuntimeError::no_such_attribute(name, self.describe())),
        }
    }
}

impl PartialEq for Phi {
    fn eq(&self, other: &Self) -> bool {
        self.0.vertex == other.0.vertex
    }
}

impl Eq for Phi {}

impl Hash for Phi {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.vertex.hash(state);
    }
}

impl fmt::Debug for Phi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

impl fmt::Display for Phi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.phi_term())
    }
}
