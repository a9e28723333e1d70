//! Vertex registry: small integer identities for objects and literals.
//!
//! Fresh objects get a new vertex from a monotonic counter. Literal data
//! values are content-addressed: the type tag and the canonical text of the
//! value are hashed with SHA-256, so two equal literals always share a
//! vertex while a string `"42"` and an int `42` never do.
//!
//! Both kinds of keys live in one map, which keeps the numbering dense. The
//! registry is `Sync`; share it behind an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{PoisonError, RwLock};

use sha2::{Digest, Sha256};

use crate::error::RuntimeError;
use crate::runtime::value::{TypeTag, Value};

/// Identity of an object instance or of a canonical literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vertex(pub u32);

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ν{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum VertexKey {
    Next(u32),
    Content(Vec<u8>),
}

/// Collection of all vertices seen by one runtime.
#[derive(Debug, Default)]
pub struct Vertices {
    count: AtomicU32,
    seen: RwLock<HashMap<VertexKey, Vertex>>,
}

impl Vertices {
    pub fn new() -> Self {
        Self::default()
    }

    /// A vertex nobody has seen before.
    pub fn next(&self) -> Vertex {
        let ticket = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        self.register(VertexKey::Next(ticket))
    }

    /// The vertex for a data value: shared by equal literals, fresh for arrays.
    pub fn best(&self, value: &Value) -> Vertex {
        match value.label() {
            Some(label) => self.content(value.type_tag(), &label),
            None => self.next(),
        }
    }

    /// The vertex for a literal given by its type tag name and canonical text.
    ///
    /// Arrays and unknown tags can't be content-addressed.
    pub fn best_of(&self, tag: &str, label: &str) -> Result<Vertex, RuntimeError> {
        match TypeTag::from_name(tag) {
            Some(tag) if tag != TypeTag::Array => Ok(self.content(tag, label)),
            _ => Err(RuntimeError::unsupported_vertex_type(tag)),
        }
    }

    /// Number of vertices handed out so far.
    pub fn len(&self) -> usize {
        self.seen
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn content(&self, tag: TypeTag, label: &str) -> Vertex {
        let mut hasher = Sha256::new();
        hasher.update(format!("{} {}", tag.name(), label).as_bytes());
        self.register(VertexKey::Content(hasher.finalize().to_vec()))
    }

    fn register(&self, key: VertexKey) -> Vertex {
        // Fast path: already registered
        if let Some(&vertex) = self
            .seen
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return vertex;
        }
        let mut seen = self.seen.write().unwrap_or_else(PoisonError::into_inner);
        let candidate = Vertex(seen.len() as u32 + 1);
        *seen.entry(key).or_insert(candidate)
    }
}
