//! End-to-end scenarios for the object runtime.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use crate::error::{ErrorKind, RuntimeError};
use crate::runtime::builtins::control::try_object;
use crate::runtime::*;

fn int(vertices: &Arc<Vertices>, n: i64) -> Phi {
    Phi::data(vertices, Value::Int(n))
}

fn ints(phi: &Phi, names: &[&str]) -> Vec<i64> {
    names
        .iter()
        .map(|name| match Dataized::new(phi.attr(name).unwrap().get().unwrap()).take() {
            Ok(Value::Int(n)) => n,
            other => panic!("Expected an int in '{}', got {:?}", name, other),
        })
        .collect()
}

/// `[args...] > f` with `1 > a` and `2 > @`.
fn varargs_function(vertices: &Arc<Vertices>) -> Phi {
    Phi::object(vertices, "f")
        .vararg("args")
        .once("a", |rho| Ok(rho.data_of(Value::Int(1))))
        .once(PHI, |rho| Ok(rho.data_of(Value::Int(2))))
        .build()
}

#[test]
fn test_copy_independence() {
    let vertices = Arc::new(Vertices::new());
    let a = Phi::object(&vertices, "a").free("s").build();
    let b = a.copy().unwrap();
    b.attr("s").unwrap().put(int(&vertices, 1)).unwrap();
    let err = a.attr("s").unwrap().get().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotYetBound);

    a.attr("s").unwrap().put(int(&vertices, 2)).unwrap();
    assert_eq!(ints(&a, &["s"]), vec![2]);
    assert_eq!(ints(&b, &["s"]), vec![1]);
}

#[test]
fn test_copy_ignores_once_slots_read_on_the_original() {
    // [a] > box
    //   [] > get
    //     ^.a > @
    let vertices = Arc::new(Vertices::new());
    let proto = Phi::object(&vertices, "box")
        .free("a")
        .once("get", |rho| {
            Ok(Phi::object(rho.vertices(), "get")
                .home(rho)
                .composite(PHI, |get| get.attr(SIGMA)?.get()?.attr("a")?.get())
                .build())
        })
        .build();
    let early = proto.attr("get").unwrap().get().unwrap();
    let err = Dataized::new(early).take().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotYetBound);

    let boxed = Phi::with(&proto, Key::Position(0), int(&vertices, 7));
    let get = boxed.attr("get").unwrap().get().unwrap();
    assert_eq!(Dataized::new(get).take().unwrap(), Value::Int(7));
}

#[test]
fn test_positional_binding() {
    let vertices = Arc::new(Vertices::new());
    let abc = Phi::object(&vertices, "abc")
        .free("a")
        .free("b")
        .free("c")
        .build();
    let bound = Phi::with(&abc, Key::Position(0), int(&vertices, 10));
    let bound = Phi::with(&bound, Key::Position(0), int(&vertices, 20));
    let bound = Phi::with(&bound, Key::Position(0), int(&vertices, 30));
    assert_eq!(ints(&bound, &["a", "b", "c"]), vec![10, 20, 30]);
}

#[test]
fn test_vararg_round_trip() {
    let vertices = Arc::new(Vertices::new());
    let f = varargs_function(&vertices);
    let array = Phi::data(
        &vertices,
        Value::Array(vec![int(&vertices, 1), int(&vertices, 2), int(&vertices, 3)]),
    );
    let called = Phi::with(&Phi::copied(&f), Key::Position(0), Phi::unvar(&array));
    let args = called.attr("args").unwrap().get().unwrap();
    assert_eq!(ints(&args, &["0", "1", "2"]), vec![1, 2, 3]);
    assert_eq!(called.resolved().unwrap().names(), f.names());
}

#[test]
fn test_vararg_collects_plain_values() {
    let vertices = Arc::new(Vertices::new());
    let f = varargs_function(&vertices);
    let mut called = Phi::copied(&f);
    for n in [7, 8] {
        called = Phi::with(&called, Key::Position(0), int(&vertices, n));
    }
    let args = called.attr("args").unwrap().get().unwrap();
    assert_eq!(ints(&args, &["0", "1"]), vec![7, 8]);
}

#[test]
fn test_unvar_needs_an_array() {
    let vertices = Arc::new(Vertices::new());
    let f = varargs_function(&vertices);
    let called = Phi::with(&f, Key::Position(0), Phi::unvar(&int(&vertices, 5)));
    let err = called.resolved().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_app_calls_object_with_varargs() {
    // (f 1 2 3).eq 2 > @
    let vertices = Arc::new(Vertices::new());
    let f = varargs_function(&vertices);
    let array = Phi::data(
        &vertices,
        Value::Array(vec![int(&vertices, 1), int(&vertices, 2), int(&vertices, 3)]),
    );
    let fvar = Phi::with(&Phi::copied(&f), Key::Position(0), Phi::unvar(&array));
    let app = Phi::with(
        &Phi::copied(&Phi::method(&fvar, "eq")),
        Key::Position(0),
        int(&vertices, 2),
    );
    assert_eq!(Dataized::new(app).take().unwrap(), Value::Bool(true));
}

#[test]
fn test_try_catch_finally() {
    let vertices = Arc::new(Vertices::new());
    let payload = Phi::data(&vertices, Value::String("payload".to_string()));
    let thrown = payload.clone();
    let main = Phi::object(&vertices, "main")
        .free("raise")
        .composite(PHI, move |rho| {
            Ok(Phi::with(
                &rho.attr("raise")?.get()?,
                Key::Name("ex".to_string()),
                thrown.clone(),
            ))
        })
        .build();
    let expected = payload.clone();
    let catch = Phi::object(&vertices, "catch")
        .free("ex")
        .composite(PHI, move |rho| {
            let caught = Param::named(rho, "ex").weak()?;
            let wanted = Dataized::new(expected.clone()).take()?;
            Ok(rho.data_of(Value::Bool(caught == wanted)))
        })
        .build();
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let finally = Phi::object(&vertices, "finally")
        .composite(PHI, move |rho| {
            counter.set(counter.get() + 1);
            Ok(rho.data_of(Value::Bool(true)))
        })
        .build();

    let attempt = Phi::with(&try_object(&vertices), Key::Position(0), main);
    let attempt = Phi::with(&attempt, Key::Position(0), catch);
    let attempt = Phi::with(&attempt, Key::Position(0), finally);
    assert_eq!(Dataized::new(attempt).take().unwrap(), Value::Bool(true));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_nested_try_reaches_the_right_target() {
    // The inner try has no business with a raise aimed at the outer one
    let vertices = Arc::new(Vertices::new());
    let inner_catches = Rc::new(Cell::new(0));
    let outer_catches = Rc::new(Cell::new(0));

    let inner_counter = inner_catches.clone();
    let outer_counter = outer_catches.clone();
    let counting_catch = move |counter: Rc<Cell<usize>>, vertices: &Arc<Vertices>| {
        Phi::object(vertices, "catch")
            .free("ex")
            .composite(PHI, move |rho| {
                counter.set(counter.get() + 1);
                rho.attr("ex")?.get()
            })
            .build()
    };
    let quiet = |vertices: &Arc<Vertices>| {
        Phi::object(vertices, "finally")
            .bound(PHI, Phi::data(vertices, Value::Bool(true)))
            .build()
    };

    let outer_main = {
        let vertices = vertices.clone();
        let inner_catch = counting_catch(inner_counter, &vertices);
        let inner_finally = quiet(&vertices);
        Phi::object(&vertices, "outer.main")
            .free("raise")
            .composite(PHI, move |rho| {
                let outer_raise = rho.attr("raise")?.get()?;
                let payload = rho.data_of(Value::Int(99));
                let inner_main = Phi::object(rho.vertices(), "inner.main")
                    .free("ignored")
                    .bound(PHI, Phi::with(&outer_raise, Key::Position(0), payload))
                    .build();
                let attempt = Phi::with(&try_object(rho.vertices()), Key::Position(0), inner_main);
                let attempt = Phi::with(&attempt, Key::Position(0), inner_catch.clone());
                Ok(Phi::with(&attempt, Key::Position(0), inner_finally.clone()))
            })
            .build()
    };

    let attempt = Phi::with(&try_object(&vertices), Key::Position(0), outer_main);
    let attempt = Phi::with(&attempt, Key::Position(0), counting_catch(outer_counter, &vertices));
    let attempt = Phi::with(&attempt, Key::Position(0), quiet(&vertices));
    assert_eq!(Dataized::new(attempt).take().unwrap(), Value::Int(99));
    assert_eq!(inner_catches.get(), 0);
    assert_eq!(outer_catches.get(), 1);
}

#[test]
fn test_uncaught_raise_escapes() {
    let vertices = Arc::new(Vertices::new());
    let raise = Phi::object(&vertices, "raise")
        .composite(PHI, |rho| {
            Err(RuntimeError::Raise(crate::error::Signal {
                target: rho.vertex(),
                payload: rho.clone(),
            }))
        })
        .build();
    let err = Dataized::new(raise).take().unwrap_err();
    assert!(err.is_signal());
}

#[test]
fn test_type_check_failure() {
    let vertices = Arc::new(Vertices::new());
    let holder = Phi::object(&vertices, "holder")
        .bound("x", Phi::data(&vertices, Value::String("42".to_string())))
        .build();
    let err = Param::named(&holder, "x").strong(TypeTag::Int).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert!(Param::named(&holder, "x").float().is_err());
}

#[test]
fn test_once_is_memoized_through_dataization() {
    let vertices = Arc::new(Vertices::new());
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let obj = Phi::object(&vertices, "obj")
        .once(PHI, move |rho| {
            counter.set(counter.get() + 1);
            Ok(rho.data_of(Value::Int(3)))
        })
        .build();
    for _ in 0..10 {
        assert_eq!(Dataized::new(obj.clone()).take().unwrap(), Value::Int(3));
    }
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_error_reports_the_forced_object() {
    let vertices = Arc::new(Vertices::new());
    let f = Phi::object(&vertices, "f")
        .free("x")
        .composite(PHI, |rho| rho.attr("x")?.get())
        .build();
    let err = Dataized::new(f).take().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotYetBound);
    assert!(err.to_string().contains("while dataizing: f⟦x ↦ Ø, φ ↦ λ⟧"));
}
