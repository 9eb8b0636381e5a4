use std::f64::consts;
use std::num::ParseFloatError;

use thiserror::Error;

use crate::eval::Context;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("expected name=value, got '{0}'")]
    MissingEquals(String),
    #[error("'{0}' is not a valid variable name")]
    InvalidName(String),
    #[error("invalid value for '{name}': {source}")]
    InvalidValue {
        name: String,
        #[source]
        source: ParseFloatError,
    },
}

fn set_const(ctx: &mut Context, key: &str, val: f64) {
    ctx.set(key, val)
}

/// Table of named constants, usable as a parent for user bindings.
pub fn create() -> Context<'static> {
    let mut ctx = Context::new();

    set_const(&mut ctx, "pi", consts::PI);
    set_const(&mut ctx, "e", consts::E);
    set_const(&mut ctx, "tau", 2.0 * consts::PI);
    set_const(&mut ctx, "inf", f64::INFINITY);
    set_const(&mut ctx, "nan", f64::NAN);

    ctx
}

fn is_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parses a `name=value` pair as given on the command line.
pub fn parse_binding(arg: &str) -> Result<(String, f64), BindingError> {
    let (name, value) = match arg.find('=') {
        Some(i) => (arg[..i].trim(), arg[i + 1..].trim()),
        None => return Err(BindingError::MissingEquals(arg.into())),
    };

    if !is_name(name) {
        return Err(BindingError::InvalidName(name.into()));
    }

    let value = value.parse().map_err(|source| BindingError::InvalidValue {
        name: name.into(),
        source,
    })?;

    Ok((name.into(), value))
}
