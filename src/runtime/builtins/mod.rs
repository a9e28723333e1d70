//! Built-in objects.

pub mod control;
pub mod data;

use crate::runtime::Runtime;

/// Register all built-in global objects in the given runtime.
pub fn register_builtins(runtime: &Runtime) {
    // try(main, catch, finally) - Raise, catch and clean up
    runtime.define("try", control::try_object(runtime.vertices()));
}
