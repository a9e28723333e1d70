//! Translation of validated program trees into runtime objects.
//!
//! Abstractions become objects: parameters become free (or vararg) slots
//! and attributes become once slots that build their expression on first
//! read, with the reading object as the scope. Applications become chains
//! of combinators; literals become data objects.

use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::error::RuntimeError;
use crate::runtime::combinators::Key;
use crate::runtime::phi::{Phi, PHI, RHO, SIGMA};
use crate::runtime::value::Value;
use crate::runtime::vertices::Vertices;
use crate::runtime::Runtime;
use crate::tree::{Base, Body, Node, Parameter, Program};

/// Define every top-level object of `program` as a global of `runtime`.
pub fn install(runtime: &Rc<Runtime>, program: &Program) {
    let weak = Rc::downgrade(runtime);
    for node in &program.objects {
        if let (Some(name), Body::Abstraction { params, attrs }) = (&node.name, &node.body) {
            let phi = abstraction(&weak, runtime.vertices(), node, params, attrs, None);
            runtime.define(name.clone(), phi);
        }
    }
    tracing::debug!(
        program = %program.name,
        objects = program.objects.len(),
        "Installed program"
    );
}

/// Attribute name as written in the tree: `@` stands for `φ`.
fn attr_name(name: &str) -> &str {
    if name == "@" {
        PHI
    } else {
        name
    }
}

fn abstraction(
    runtime: &Weak<Runtime>,
    vertices: &Arc<Vertices>,
    node: &Node,
    params: &[Parameter],
    attrs: &[Rc<Node>],
    home: Option<&Phi>,
) -> Phi {
    let mut builder = Phi::object(vertices, node.form());
    if let Some(home) = home {
        builder = builder.home(home);
    }
    for param in params {
        builder = if param.vararg {
            builder.vararg(&param.name)
        } else {
            builder.free(&param.name)
        };
    }
    for attr in attrs {
        let name = attr_name(attr.name.as_deref().unwrap_or_default());
        let runtime = runtime.clone();
        let expr = attr.clone();
        builder = builder.once(name, move |rho| build(&runtime, &expr, rho));
    }
    builder.build()
}

/// Build the object for `node` inside `scope`.
fn build(runtime: &Weak<Runtime>, node: &Rc<Node>, scope: &Phi) -> Result<Phi, RuntimeError> {
    match &node.body {
        Body::Abstraction { params, attrs } => Ok(abstraction(
            runtime,
            scope.vertices(),
            node,
            params,
            attrs,
            Some(scope),
        )),
        Body::Data { tag, value } => Phi::literal(scope.vertices(), tag, value),
        Body::Application {
            base,
            args,
            copy,
            unvar,
        } => {
            let mut args = args.iter();
            let mut phi = match base {
                Base::Ref(name) => resolve(runtime, scope, attr_name(name))?,
                Base::Method(method) => {
                    let receiver = args.next().ok_or_else(|| {
                        RuntimeError::new(format!(
                            "Method '.{}' has no receiver at line {}",
                            method, node.line
                        ))
                    })?;
                    Phi::method(&build(runtime, receiver, scope)?, attr_name(method))
                }
                Base::Xi => scope.clone(),
                Base::Rho => scope.attr(RHO)?.get()?,
                Base::Sigma => scope.attr(SIGMA)?.get()?,
                Base::Array => {
                    let items = args
                        .by_ref()
                        .map(|item| build(runtime, item, scope))
                        .collect::<Result<Vec<_>, _>>()?;
                    scope.data_of(Value::Array(items))
                }
            };
            if *copy {
                phi = Phi::copied(&phi);
            }
            for arg in args {
                let value = build(runtime, arg, scope)?;
                let key = match &arg.name {
                    Some(name) => Key::Name(attr_name(name).to_string()),
                    None => Key::Position(0),
                };
                phi = Phi::with(&phi, key, value);
            }
            if *unvar {
                phi = Phi::unvar(&phi);
            }
            Ok(phi)
        }
    }
}

/// Find `name` from `scope`: its own attributes, then the home chain, then
/// a fresh copy of a global.
fn resolve(runtime: &Weak<Runtime>, scope: &Phi, name: &str) -> Result<Phi, RuntimeError> {
    if let Some(slot) = scope.own_attr(name)? {
        return slot.get();
    }
    let mut home = scope.home();
    while let Some(outer) = home {
        if outer.own_attr(name)?.is_some() {
            return Ok(Phi::method(&outer, name));
        }
        home = outer.home();
    }
    let runtime = runtime
        .upgrade()
        .ok_or_else(|| RuntimeError::new("The runtime is gone"))?;
    runtime
        .global(name)
        .map(|global| Phi::copied(&global))
        .ok_or_else(|| RuntimeError::no_such_attribute(name, scope.describe()))
}
