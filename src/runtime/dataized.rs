//! Dataization: forcing an object down to a primitive value.

use std::cell::Cell;

use tracing::Level;

use crate::error::RuntimeError;
use crate::runtime::phi::{Phi, DELTA};
use crate::runtime::value::Value;

/// Tracing target of the dataization trace.
pub const TRACE_TARGET: &str = "phic::dataized";

thread_local! {
    static LEVEL: Cell<usize> = const { Cell::new(0) };
}

/// Current dataization depth on this thread.
pub fn depth() -> usize {
    LEVEL.with(Cell::get)
}

/// Keeps the depth raised while it lives.
struct Depth {
    before: usize,
}

impl Depth {
    fn enter() -> Self {
        let before = depth();
        LEVEL.with(|level| level.set(before + 1));
        Self { before }
    }
}

impl Drop for Depth {
    fn drop(&mut self) {
        LEVEL.with(|level| level.set(self.before));
    }
}

/// An object about to be dataized.
pub struct Dataized {
    phi: Phi,
}

impl Dataized {
    pub fn new(phi: Phi) -> Self {
        Self { phi }
    }

    /// Dataize: read `Δ` until a terminal value shows up.
    ///
    /// Failures get the φ-term of this object attached, once, at the
    /// innermost dataization that saw them. Raise signals are passed on
    /// untouched.
    pub fn take(&self) -> Result<Value, RuntimeError> {
        let level = Depth::enter();
        match self.force() {
            Ok(value) => {
                if tracing::enabled!(target: TRACE_TARGET, Level::DEBUG) {
                    tracing::debug!(
                        target: TRACE_TARGET,
                        "{}𝔻( {} ) ➜ {}",
                        "·".repeat(level.before),
                        self.phi.phi_term().replace(['\n', '\t'], ""),
                        value.phi_term()
                    );
                }
                Ok(value)
            }
            Err(err) if err.is_signal() || matches!(err, RuntimeError::Failure { .. }) => Err(err),
            Err(err) => Err(RuntimeError::Failure {
                term: self.phi.phi_term(),
                source: Box::new(err),
            }),
        }
    }

    fn force(&self) -> Result<Value, RuntimeError> {
        if let Some(value) = self.phi.as_data() {
            return Ok(value.clone());
        }
        let found = match self.phi.attr(DELTA) {
            Ok(slot) => slot.get()?,
            Err(RuntimeError::NoSuchAttribute { attr, object }) if attr == DELTA => {
                return Err(RuntimeError::not_data(
                    object,
                    "there is no Δ attribute, and no φ leads to one",
                ))
            }
            Err(err) => return Err(err),
        };
        match found.as_data() {
            Some(value) => Ok(value.clone()),
            None => Err(RuntimeError::not_data(
                self.phi.describe(),
                format!("Δ holds {} instead of data", found.describe()),
            )),
        }
    }
}
