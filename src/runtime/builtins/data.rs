//! Methods of data values.
//!
//! Each lookup builds a fresh method object. Its home is the receiving data
//! value, its free slots are the arguments, and its `φ` computes the result.
//! Nothing is coerced: `5.plus 1.5` fails with a type mismatch.

use crate::error::RuntimeError;
use crate::runtime::param::Param;
use crate::runtime::phi::{Phi, PHI, SIGMA};
use crate::runtime::value::{TypeTag, Value};

type Body = fn(&Phi) -> Result<Phi, RuntimeError>;

struct Method {
    params: &'static [&'static str],
    body: Body,
}

impl Method {
    fn new(params: &'static [&'static str], body: Body) -> Self {
        Self { params, body }
    }
}

/// The method object `name` of the data object `data`, if its type has one.
pub fn method(data: &Phi, value: &Value, name: &str) -> Option<Phi> {
    let tag = value.type_tag();
    let found = match name {
        "eq" => Method::new(&["x"], eq),
        _ => match tag {
            TypeTag::Int => int_method(name)?,
            TypeTag::Float => float_method(name)?,
            TypeTag::Bool => bool_method(name)?,
            TypeTag::String => string_method(name)?,
            TypeTag::Bytes => bytes_method(name)?,
            TypeTag::Array => array_method(name)?,
            TypeTag::Regex => regex_method(name)?,
            TypeTag::Char => return None,
        },
    };
    let mut builder = Phi::object(data.vertices(), format!("{}.{}", tag, name)).home(data);
    for param in found.params {
        builder = builder.free(param);
    }
    Some(builder.composite(PHI, found.body).build())
}

/// The receiver of a method object.
fn this(rho: &Phi) -> Param<'_> {
    Param::named(rho, SIGMA)
}

fn arg<'a>(rho: &'a Phi, name: &'a str) -> Param<'a> {
    Param::named(rho, name)
}

// eq(x) - Same type and same value
fn eq(rho: &Phi) -> Result<Phi, RuntimeError> {
    let equal = this(rho).weak()? == arg(rho, "x").weak()?;
    Ok(rho.data_of(Value::Bool(equal)))
}

fn int_method(name: &str) -> Option<Method> {
    let method = match name {
        "plus" => Method::new(&["x"], |rho| {
            let (a, b) = (this(rho).int()?, arg(rho, "x").int()?);
            Ok(rho.data_of(Value::Int(a.wrapping_add(b))))
        }),
        "minus" => Method::new(&["x"], |rho| {
            let (a, b) = (this(rho).int()?, arg(rho, "x").int()?);
            Ok(rho.data_of(Value::Int(a.wrapping_sub(b))))
        }),
        "times" => Method::new(&["x"], |rho| {
            let (a, b) = (this(rho).int()?, arg(rho, "x").int()?);
            Ok(rho.data_of(Value::Int(a.wrapping_mul(b))))
        }),
        "div" => Method::new(&["x"], |rho| {
            let (a, b) = (this(rho).int()?, arg(rho, "x").int()?);
            if b == 0 {
                return Err(RuntimeError::new(format!("Can't divide {} by zero", a)));
            }
            Ok(rho.data_of(Value::Int(a.wrapping_div(b))))
        }),
        "lt" => Method::new(&["x"], |rho| {
            let (a, b) = (this(rho).int()?, arg(rho, "x").int()?);
            Ok(rho.data_of(Value::Bool(a < b)))
        }),
        "gt" => Method::new(&["x"], |rho| {
            let (a, b) = (this(rho).int()?, arg(rho, "x").int()?);
            Ok(rho.data_of(Value::Bool(a > b)))
        }),
        "neg" => Method::new(&[], |rho| {
            Ok(rho.data_of(Value::Int(this(rho).int()?.wrapping_neg())))
        }),
        _ => return None,
    };
    Some(method)
}

fn float_method(name: &str) -> Option<Method> {
    let method = match name {
        "plus" => Method::new(&["x"], |rho| {
            let (a, b) = (this(rho).float()?, arg(rho, "x").float()?);
            Ok(rho.data_of(Value::Float(a + b)))
        }),
        "minus" => Method::new(&["x"], |rho| {
            let (a, b) = (this(rho).float()?, arg(rho, "x").float()?);
            Ok(rho.data_of(Value::Float(a - b)))
        }),
        "times" => Method::new(&["x"], |rho| {
            let (a, b) = (this(rho).float()?, arg(rho, "x").float()?);
            Ok(rho.data_of(Value::Float(a * b)))
        }),
        "div" => Method::new(&["x"], |rho| {
            let (a, b) = (this(rho).float()?, arg(rho, "x").float()?);
            Ok(rho.data_of(Value::Float(a / b)))
        }),
        "lt" => Method::new(&["x"], |rho| {
            let (a, b) = (this(rho).float()?, arg(rho, "x").float()?);
            Ok(rho.data_of(Value::Bool(a < b)))
        }),
        "gt" => Method::new(&["x"], |rho| {
            let (a, b) = (this(rho).float()?, arg(rho, "x").float()?);
            Ok(rho.data_of(Value::Bool(a > b)))
        }),
        "neg" => Method::new(&[], |rho| {
            Ok(rho.data_of(Value::Float(-this(rho).float()?)))
        }),
        _ => return None,
    };
    Some(method)
}

fn bool_method(name: &str) -> Option<Method> {
    let method = match name {
        "not" => Method::new(&[], |rho| {
            Ok(rho.data_of(Value::Bool(!this(rho).bool()?)))
        }),
        "and" => Method::new(&["x"], |rho| {
            let (a, b) = (this(rho).bool()?, arg(rho, "x").bool()?);
            Ok(rho.data_of(Value::Bool(a && b)))
        }),
        "or" => Method::new(&["x"], |rho| {
            let (a, b) = (this(rho).bool()?, arg(rho, "x").bool()?);
            Ok(rho.data_of(Value::Bool(a || b)))
        }),
        // if(t, f) - The chosen branch, not dataized here
        "if" => Method::new(&["t", "f"], |rho| {
            let branch = if this(rho).bool()? { "t" } else { "f" };
            rho.attr(branch)?.get()
        }),
        _ => return None,
    };
    Some(method)
}

fn string_method(name: &str) -> Option<Method> {
    let method = match name {
        "length" => Method::new(&[], |rho| {
            let length = this(rho).string()?.chars().count();
            Ok(rho.data_of(Value::Int(length as i64)))
        }),
        "concat" => Method::new(&["x"], |rho| {
            let mut text = this(rho).string()?;
            text.push_str(&arg(rho, "x").string()?);
            Ok(rho.data_of(Value::String(text)))
        }),
        _ => return None,
    };
    Some(method)
}

fn bytes_method(name: &str) -> Option<Method> {
    match name {
        "size" => Some(Method::new(&[], |rho| {
            let size = this(rho).bytes()?.len();
            Ok(rho.data_of(Value::Int(size as i64)))
        })),
        _ => None,
    }
}

fn array_method(name: &str) -> Option<Method> {
    let method = match name {
        "length" => Method::new(&[], |rho| {
            let length = this(rho).array()?.len();
            Ok(rho.data_of(Value::Int(length as i64)))
        }),
        // at(i) - The element itself, not dataized here
        "at" => Method::new(&["i"], |rho| {
            let items = this(rho).array()?;
            let index = arg(rho, "i").int()?;
            usize::try_from(index)
                .ok()
                .and_then(|i| items.get(i).cloned())
                .ok_or_else(|| {
                    RuntimeError::new(format!(
                        "Index {} is out of bounds, the array has {} elements",
                        index,
                        items.len()
                    ))
                })
        }),
        _ => return None,
    };
    Some(method)
}

fn regex_method(name: &str) -> Option<Method> {
    match name {
        // match(txt) - All matched substrings, in order
        "match" => Some(Method::new(&["txt"], |rho| {
            let re = this(rho).regex()?;
            let text = arg(rho, "txt").string()?;
            let found: Vec<Phi> = re
                .find_iter(&text)
                .map(|m| rho.data_of(Value::String(m.as_str().to_string())))
                .collect();
            Ok(rho.data_of(Value::Array(found)))
        })),
        _ => None,
    }
}
