//! The `try` object: raise, catch and finally.
//!
//! `main` gets a fresh raise object as its first argument. Dataizing that
//! raise object (after binding its `ex`) sends a signal aimed at this very
//! `try`. The signal travels up as an `Err` until the `try` whose vertex it
//! names catches it; any other `try` lets it pass.

use std::sync::Arc;

use crate::error::{RuntimeError, Signal};
use crate::runtime::combinators::Key;
use crate::runtime::dataized::Dataized;
use crate::runtime::phi::{Phi, PHI, SIGMA};
use crate::runtime::value::Value;
use crate::runtime::vertices::Vertices;

/// The `try` prototype.
pub fn try_object(vertices: &Arc<Vertices>) -> Phi {
    Phi::object(vertices, "try")
        .free("main")
        .free("catch")
        .free("finally")
        .composite(PHI, attempt)
        .build()
}

fn attempt(rho: &Phi) -> Result<Phi, RuntimeError> {
    let outcome = run_main(rho);
    let outcome = match outcome {
        Err(RuntimeError::Raise(signal)) if signal.target == rho.vertex() => {
            tracing::debug!(vertex = %rho.vertex(), "Caught {}", signal.payload.describe());
            run_catch(rho, signal.payload)
        }
        other => other,
    };
    // Runs whatever happened above; its own failure wins
    let finally = rho.attr("finally")?.get()?.copy()?;
    finally.move_to(rho)?;
    Dataized::new(finally).take()?;
    outcome.map(|value| rho.data_of(value))
}

fn run_main(rho: &Phi) -> Result<Value, RuntimeError> {
    let main = rho.attr("main")?.get()?.copy()?;
    main.move_to(rho)?;
    main.attr_at(0)?.put(raise_object(rho))?;
    Dataized::new(main).take()
}

fn run_catch(rho: &Phi, payload: Phi) -> Result<Value, RuntimeError> {
    let catch = rho.attr("catch")?.get()?.copy()?;
    catch.move_to(rho)?;
    Dataized::new(Phi::with(&catch, Key::Position(0), payload)).take()
}

/// The raise object handed to `main`, aimed at the `try` in `home`.
fn raise_object(home: &Phi) -> Phi {
    Phi::object(home.vertices(), "try.raise")
        .home(home)
        .free("ex")
        .composite(PHI, |rho| {
            let target = rho.attr(SIGMA)?.get()?;
            let payload = rho.attr("ex")?.get()?;
            Err(RuntimeError::Raise(Signal {
                target: target.vertex(),
                payload,
            }))
        })
        .build()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::error::ErrorKind;

    /// `[e] > main` whose `φ` is `e` applied to `payload`.
    fn raising_main(vertices: &Arc<Vertices>, payload: Value) -> Phi {
        let payload = Phi::data(vertices, payload);
        Phi::object(vertices, "main")
            .free("e")
            .composite(PHI, move |rho| {
                Ok(Phi::with(&rho.attr("e")?.get()?, Key::Position(0), payload.clone()))
            })
            .build()
    }

    /// `[e] > main` that never raises.
    fn quiet_main(vertices: &Arc<Vertices>, result: Value) -> Phi {
        let result = Phi::data(vertices, result);
        Phi::object(vertices, "main")
            .free("e")
            .bound(PHI, result)
            .build()
    }

    /// `[ex] > catch` that compares the payload with `expected`.
    fn catch_expecting(vertices: &Arc<Vertices>, expected: Value) -> Phi {
        let expected = Phi::data(vertices, expected);
        Phi::object(vertices, "catch")
            .free("ex")
            .composite(PHI, move |rho| {
                let eq = Phi::method(&rho.attr("ex")?.get()?, "eq");
                Ok(Phi::with(&eq, Key::Position(0), expected.clone()))
            })
            .build()
    }

    fn counting_finally(vertices: &Arc<Vertices>, calls: &Rc<Cell<usize>>) -> Phi {
        let calls = calls.clone();
        Phi::object(vertices, "finally")
            .composite(PHI, move |rho| {
                calls.set(calls.get() + 1);
                Ok(rho.data_of(Value::Bool(true)))
            })
            .build()
    }

    fn assemble(vertices: &Arc<Vertices>, main: Phi, catch: Phi, finally: Phi) -> Phi {
        let attempt = try_object(vertices);
        let attempt = Phi::with(&attempt, Key::Name("main".into()), main);
        let attempt = Phi::with(&attempt, Key::Name("catch".into()), catch);
        Phi::with(&attempt, Key::Name("finally".into()), finally)
    }

    #[test]
    fn test_raise_is_caught() {
        let vertices = Arc::new(Vertices::new());
        let calls = Rc::new(Cell::new(0));
        let attempt = assemble(
            &vertices,
            raising_main(&vertices, Value::String("boom".into())),
            catch_expecting(&vertices, Value::String("boom".into())),
            counting_finally(&vertices, &calls),
        );
        assert_eq!(Dataized::new(attempt).take().unwrap(), Value::Bool(true));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_finally_runs_without_raise() {
        let vertices = Arc::new(Vertices::new());
        let calls = Rc::new(Cell::new(0));
        let attempt = assemble(
            &vertices,
            quiet_main(&vertices, Value::Int(7)),
            catch_expecting(&vertices, Value::Int(0)),
            counting_finally(&vertices, &calls),
        );
        assert_eq!(Dataized::new(attempt).take().unwrap(), Value::Int(7));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_foreign_signal_passes_through() {
        let vertices = Arc::new(Vertices::new());
        let calls = Rc::new(Cell::new(0));
        let stranger = Phi::object(&vertices, "stranger").build();
        let payload = Phi::data(&vertices, Value::Int(1));
        let target = stranger.vertex();
        let main = Phi::object(&vertices, "main")
            .free("e")
            .composite(PHI, move |_| {
                Err(RuntimeError::Raise(Signal {
                    target,
                    payload: payload.clone(),
                }))
            })
            .build();
        let attempt = assemble(
            &vertices,
            main,
            catch_expecting(&vertices, Value::Int(1)),
            counting_finally(&vertices, &calls),
        );
        let err = Dataized::new(attempt).take().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Raise);
        match err {
            RuntimeError::Raise(signal) => assert_eq!(signal.target, stranger.vertex()),
            other => panic!("Expected the signal itself, got {:?}", other),
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_failures_are_not_caught() {
        let vertices = Arc::new(Vertices::new());
        let calls = Rc::new(Cell::new(0));
        let main = Phi::object(&vertices, "main")
            .free("e")
            .composite(PHI, |_| Err(RuntimeError::new("broken")))
            .build();
        let attempt = assemble(
            &vertices,
            main,
            catch_expecting(&vertices, Value::Int(1)),
            counting_finally(&vertices, &calls),
        );
        let err = Dataized::new(attempt).take().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::General);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_finally_failure_wins() {
        let vertices = Arc::new(Vertices::new());
        let finally = Phi::object(&vertices, "finally").free("never").build();
        let attempt = assemble(
            &vertices,
            quiet_main(&vertices, Value::Int(7)),
            catch_expecting(&vertices, Value::Int(0)),
            finally,
        );
        let err = Dataized::new(attempt).take().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotData);
    }
}
