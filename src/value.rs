use codemap::{Span, Spanned};

use crate::ast::expr::CallArgs;
use crate::color::Color;
use crate::common::{Brackets, ListSeparator, QuoteKind};
use crate::error::SassResult;
use crate::value::map::SassMap;

pub(crate) mod map;

/// A fully reduced runtime value (spec §4.4: "no further reducible
/// subtree"). This is what `evaluate()` produces and what gets printed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Number { value: f64, unit: Option<String> },
    String { quote: QuoteKind, text: String },
    Boolean(bool),
    Null,
    Color(Color),
    List(Vec<Value>, ListSeparator, Brackets),
    Map(SassMap),
    ArgList(Vec<Value>),
    /// An unrecognized function call, passed through verbatim for CSS output
    /// (spec §4.4 "Unrecognized function calls pass through unchanged").
    FunctionCall { name: String, args: Box<CallArgs> },
}

impl Value {
    /// Truthiness per spec §4.5 "Boolean context".
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Null => false,
            Value::String { text, .. } => !text.is_empty(),
            Value::Number { value, .. } => *value != 0.0,
            Value::Color(_) | Value::List(..) | Value::Map(_) | Value::ArgList(_) => true,
            Value::FunctionCall { .. } => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Renders a value the way it would appear in CSS output or as the
    /// argument to `@debug`/`@warn`/`@error`.
    pub fn to_css_string(&self, span: Span) -> SassResult<String> {
        Ok(match self {
            Value::Number { value, unit } => format_number(*value, unit.as_deref()),
            Value::String { quote, text } => match quote {
                QuoteKind::None => text.clone(),
                QuoteKind::Single | QuoteKind::Double => format!("\"{}\"", text),
            },
            Value::Boolean(b) => b.to_string(),
            Value::Null => String::new(),
            Value::Color(c) => c.to_css_string(),
            Value::List(items, sep, brackets) => {
                let inner = items
                    .iter()
                    .map(|v| v.to_css_string(span))
                    .collect::<SassResult<Vec<_>>>()?
                    .join(sep.as_str());
                match brackets {
                    Brackets::None => inner,
                    Brackets::Bracketed => format!("[{}]", inner),
                }
            }
            Value::Map(_) => {
                return Err(("Value is a map; maps are not valid CSS values.".to_owned(), span).into())
            }
            Value::ArgList(items) => items
                .iter()
                .map(|v| v.to_css_string(span))
                .collect::<SassResult<Vec<_>>>()?
                .join(", "),
            Value::FunctionCall { name, args } => {
                let inner = args
                    .0
                    .iter()
                    .map(|a| a.value.node.clone())
                    .collect::<Vec<_>>();
                let _ = inner;
                format!("{}(...)", name)
            }
        })
    }

    pub fn equals(&self, other: &Value, span: Span) -> SassResult<bool> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a == b),
            (Value::String { text: a, .. }, Value::String { text: b, .. }) => Ok(a == b),
            (Value::Number { value: a, unit: ua }, Value::Number { value: b, unit: ub }) => {
                if crate::unit::comparable(ua.as_deref(), ub.as_deref()) {
                    Ok((a - b).abs() < f64::EPSILON)
                } else {
                    Err(("incompatible units for comparison".to_owned(), span).into())
                }
            }
            (Value::Null, Value::Null) => Ok(true),
            (Value::Color(a), Value::Color(b)) => Ok(a == b),
            (Value::List(a, ..), Value::List(b, ..)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (x, y) in a.iter().zip(b.iter()) {
                    if !x.equals(y, span)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Value::String { .. }, _) | (_, Value::String { .. }) => {
                Err(("cannot compare a string to a value of a different type".to_owned(), span).into())
            }
            _ => Ok(false),
        }
    }
}

fn format_number(value: f64, unit: Option<&str>) -> String {
    let rendered = if value.fract().abs() < 1e-9 {
        format!("{}", value as i64)
    } else {
        let mut s = format!("{:.6}", value);
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
        s
    };
    match unit {
        Some(u) => format!("{}{}", rendered, u),
        None => rendered,
    }
}

/// Construct a `Spanned<Value>` in one line; used pervasively by `eval.rs`.
pub(crate) fn spanned(node: Value, span: Span) -> Spanned<Value> {
    Spanned { node, span }
}
