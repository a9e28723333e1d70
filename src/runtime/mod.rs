//! Object runtime: objects, attribute slots, combinators and dataization.

pub mod attr;
pub mod builtins;
pub mod combinators;
pub mod dataized;
pub mod param;
pub mod phi;
pub mod value;
pub mod vertices;

#[cfg(test)]
mod tests;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::RuntimeError;

pub use attr::{Attr, Lambda};
pub use combinators::{Combinator, Key};
pub use dataized::Dataized;
pub use param::Param;
pub use phi::{ObjectBuilder, Phi, Slot, DELTA, PHI, RHO, SIGMA, XI};
pub use value::{TypeTag, Value};
pub use vertices::{Vertex, Vertices};

/// One runtime: a vertex registry and the global objects.
///
/// Objects built for a runtime refer back to it weakly, so share it as
/// `Rc<Runtime>` and keep that alive while dataizing.
#[derive(Debug)]
pub struct Runtime {
    vertices: Arc<Vertices>,
    globals: RefCell<IndexMap<String, Phi>>,
}

impl Runtime {
    /// A runtime with the built-in globals registered.
    pub fn new() -> Rc<Self> {
        Self::with_vertices(Arc::new(Vertices::new()))
    }

    /// A runtime sharing an existing registry.
    pub fn with_vertices(vertices: Arc<Vertices>) -> Rc<Self> {
        let runtime = Rc::new(Self {
            vertices,
            globals: RefCell::new(IndexMap::new()),
        });
        builtins::register_builtins(&runtime);
        runtime
    }

    pub fn vertices(&self) -> &Arc<Vertices> {
        &self.vertices
    }

    /// Define a global object, replacing any previous one with that name.
    pub fn define(&self, name: impl Into<String>, phi: Phi) {
        let name = name.into();
        tracing::trace!(%name, vertex = %phi.vertex(), "Defining global");
        self.globals.borrow_mut().insert(name, phi);
    }

    pub fn global(&self, name: &str) -> Option<Phi> {
        self.globals.borrow().get(name).cloned()
    }

    /// Names of all globals, in definition order.
    pub fn globals(&self) -> Vec<String> {
        self.globals.borrow().keys().cloned().collect()
    }

    /// Dataize a fresh copy of the global `name`.
    pub fn dataize(&self, name: &str) -> Result<Value, RuntimeError> {
        let root = self
            .global(name)
            .ok_or_else(|| RuntimeError::no_such_attribute(name, "the globals"))?;
        tracing::debug!(root = %root.describe(), "Dataizing");
        Dataized::new(root.copy()?).take()
    }
}
