//! Recognized built-in functions (spec §4.4 "recognized built-ins (`rgb`,
//! `hsl`)"). Evaluated inline by `runtime::eval`; everything else falls
//! through as a `Value::FunctionCall`.

use codemap::Span;

use crate::color::Color;
use crate::error::SassResult;
use crate::value::Value;

pub(crate) const RECOGNIZED: &[&str] = &["rgb", "rgba", "hsl", "hsla"];

pub(crate) fn is_recognized(name: &str) -> bool {
    RECOGNIZED.contains(&name)
}

/// Evaluates a recognized color constructor given its already-evaluated
/// positional arguments.
pub(crate) fn call(name: &str, args: &[Value], span: Span) -> SassResult<Value> {
    match name {
        "rgb" | "rgba" => rgb(args, span),
        "hsl" | "hsla" => hsl(args, span),
        other => Err((format!("unrecognized built-in function \"{}\"", other), span).into()),
    }
}

fn as_number(v: &Value, span: Span) -> SassResult<(f64, Option<String>)> {
    match v {
        Value::Number { value, unit } => Ok((*value, unit.clone())),
        _ => Err(("expected a number".to_owned(), span).into()),
    }
}

fn channel(v: &Value, span: Span) -> SassResult<u8> {
    let (value, unit) = as_number(v, span)?;
    let value = if unit.as_deref() == Some("%") {
        value / 100.0 * 255.0
    } else {
        value
    };
    Ok(value.round().clamp(0.0, 255.0) as u8)
}

/// Accepts either three positional numerics or a single 3-element list
/// (spec §4.4 "1-arg must be a list of 3 numerics").
fn three_args<'a>(args: &'a [Value], span: Span) -> SassResult<[&'a Value; 3]> {
    match args {
        [a, b, c] => Ok([a, b, c]),
        [Value::List(items, ..)] if items.len() == 3 => Ok([&items[0], &items[1], &items[2]]),
        _ => Err(("expected 3 arguments, or a list of 3 elements".to_owned(), span).into()),
    }
}

fn rgb(args: &[Value], span: Span) -> SassResult<Value> {
    let [r, g, b] = three_args(args, span)?;
    Ok(Value::Color(Color::new_rgb(
        channel(r, span)?,
        channel(g, span)?,
        channel(b, span)?,
    )))
}

fn hsl(args: &[Value], span: Span) -> SassResult<Value> {
    let [h, s, l] = three_args(args, span)?;
    let (h, _) = as_number(h, span)?;
    let (s, _) = as_number(s, span)?;
    let (l, _) = as_number(l, span)?;
    let h = h.clamp(0.0, 360.0);
    let s = (s / 100.0).clamp(0.0, 1.0);
    let l = (l / 100.0).clamp(0.0, 1.0);
    Ok(Value::Color(Color::from_hsl(h, s, l)))
}
