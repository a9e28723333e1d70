//! phic: a runtime for a small object calculus.
//!
//! This is the library root that exports all modules.
//!
//! # Pipeline
//!
//! - **Tree**: the parser hands over a JSON program tree, which is
//!   validated before anything runs
//! - **Translation**: top-level abstractions become global objects
//! - **Dataization**: running a program forces its root object down to a
//!   primitive value

#![allow(clippy::result_large_err)]
#![allow(clippy::new_ret_no_self)]
#![allow(clippy::type_complexity)]

pub mod config;
pub mod error;
pub mod runtime;
pub mod tree;

use std::path::Path;
use std::rc::Rc;

use error::PhicError;
use runtime::{Runtime, Value};
use tree::Program;

pub use config::Config;

/// Parse a program tree from JSON.
pub fn parse(source: &str) -> Result<Program, PhicError> {
    Ok(Program::from_json(source)?)
}

/// Validate a program and install it into a fresh runtime.
pub fn load(program: &Program) -> Result<Rc<Runtime>, PhicError> {
    tree::validation::validate(program)?;
    let runtime = Runtime::new();
    tree::translate::install(&runtime, program);
    tracing::info!(
        program = %program.name,
        globals = runtime.globals().len(),
        "Loaded program"
    );
    Ok(runtime)
}

/// Load a program and dataize its root object.
///
/// Array elements in the result are objects of the runtime that is dropped
/// on return; use [`load`] and [`Runtime::dataize`] to keep it alive.
pub fn run_program(program: &Program, root: Option<&str>) -> Result<Value, PhicError> {
    let runtime = load(program)?;
    let root = program.root(root)?;
    Ok(runtime.dataize(&root)?)
}

/// Read, load and run a program file.
pub fn run_file(path: &Path, root: Option<&str>) -> Result<Value, PhicError> {
    let source = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), bytes = source.len(), "Read program");
    run_program(&parse(&source)?, root)
}

/// Read and validate a program file without running it.
pub fn check_file(path: &Path) -> Result<Program, PhicError> {
    let source = std::fs::read_to_string(path)?;
    let program = parse(&source)?;
    tree::validation::validate(&program)?;
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, TreeError};

    const FORTY_TWO: &str = r#"{
        "name": "app",
        "objects": [
            { "name": "app", "kind": "abstraction", "attrs": [
                { "name": "@", "kind": "application", "base": { "method": "times" },
                  "args": [ { "kind": "data", "type": "int", "value": "6" },
                            { "kind": "data", "type": "int", "value": "7" } ] } ] }
        ]
    }"#;

    #[test]
    fn test_run_program() {
        let program = parse(FORTY_TWO).unwrap();
        assert_eq!(run_program(&program, None).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_missing_root() {
        let program = parse(FORTY_TWO).unwrap();
        let err = run_program(&program, Some("main")).unwrap_err();
        assert!(matches!(err, PhicError::Tree(TreeError::MissingRoot(_))));
    }

    #[test]
    fn test_runtime_errors_carry_their_kind() {
        let program = parse(
            r#"{ "name": "app", "objects": [
                { "name": "app", "kind": "abstraction", "attrs": [
                    { "name": "@", "kind": "application", "base": { "method": "plus" },
                      "args": [ { "kind": "data", "type": "int", "value": "1" },
                                { "kind": "data", "type": "string", "value": "one" } ] } ] }
            ] }"#,
        )
        .unwrap();
        match run_program(&program, None).unwrap_err() {
            PhicError::Runtime(err) => assert_eq!(err.kind(), ErrorKind::TypeMismatch),
            other => panic!("Expected a runtime error, got {:?}", other),
        }
    }

    #[test]
    fn test_run_file_spreads_varargs() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("benches/programs/varargs.json");
        assert_eq!(run_file(&path, None).unwrap(), Value::Int(5));
        assert_eq!(check_file(&path).unwrap().objects.len(), 2);
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(parse("{ nope"), Err(PhicError::Json(_))));
    }

    #[test]
    fn test_try_from_the_tree() {
        // [] > app
        //   try > @
        //     [r] (r "oops" > @)
        //     [e] (e.eq "oops" > @)
        //     TRUE
        let program = parse(
            r#"{ "name": "app", "objects": [
                { "name": "app", "kind": "abstraction", "attrs": [
                    { "name": "@", "kind": "application", "base": { "ref": "try" }, "args": [
                        { "kind": "abstraction", "params": [ { "name": "r" } ], "attrs": [
                            { "name": "@", "kind": "application", "base": { "ref": "r" },
                              "args": [ { "kind": "data", "type": "string", "value": "oops" } ] } ] },
                        { "kind": "abstraction", "params": [ { "name": "e" } ], "attrs": [
                            { "name": "@", "kind": "application", "base": { "method": "eq" },
                              "args": [ { "kind": "application", "base": { "ref": "e" } },
                                        { "kind": "data", "type": "string", "value": "oops" } ] } ] },
                        { "kind": "data", "type": "bool", "value": "true" }
                    ] } ] }
            ] }"#,
        )
        .unwrap();
        assert_eq!(run_program(&program, None).unwrap(), Value::Bool(true));
    }
}
