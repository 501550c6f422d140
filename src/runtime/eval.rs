//! Expression evaluation (spec §4.4): reduces an `Expr` tree to a `Value`
//! against a `Scope`, grounded on `original_source/runtime/compute.go`'s
//! `EvaluateExpr`/`EvaluateBinaryExpr`/`Compute` dispatch.

use std::sync::Arc;

use codemap::{Span, Spanned};

use crate::ast::expr::{CallArgs, Expr};
use crate::color::Color;
use crate::common::{Brackets, ListSeparator, Op, QuoteKind};
use crate::error::SassResult;
use crate::runtime::execute::{self, Flow};
use crate::runtime::Runtime;
use crate::scope::Scope;
use crate::value::map::SassMap;
use crate::value::{spanned, Value};

/// `EvaluateExpr` (spec §4.4): the entry point used everywhere a value is
/// needed -- property values, conditions, call arguments, interpolation.
pub(crate) fn evaluate(expr: &Spanned<Expr>, scope: &Scope, rt: &Runtime) -> SassResult<Spanned<Value>> {
    let span = expr.span;
    match &expr.node {
        Expr::Number { value, unit } => Ok(spanned(
            Value::Number {
                value: *value,
                unit: unit.clone(),
            },
            span,
        )),
        Expr::String {
            quote,
            body,
            contains_interpolation,
        } => {
            let text = if *contains_interpolation {
                resolve_string_interpolation(body, scope, rt, span)?
            } else {
                body.clone()
            };
            Ok(spanned(Value::String { quote: *quote, text }, span))
        }
        Expr::Boolean(b) => Ok(spanned(Value::Boolean(*b), span)),
        Expr::Null => Ok(spanned(Value::Null, span)),
        Expr::HexColor(digits) => {
            let color = Color::from_hex(digits)
                .ok_or_else(|| sass_err(&format!("invalid hex color '#{}'", digits), span))?;
            Ok(spanned(Value::Color(color), span))
        }
        Expr::RgbColor(args) | Expr::RgbaColor(args) => {
            eval_recognized_call("rgb", args, scope, rt, span)
        }
        Expr::HslColor(args) => eval_recognized_call("hsl", args, scope, rt, span),
        Expr::Variable(name) => {
            let bound = scope.lookup_var(name)?;
            Ok(spanned(bound.node, span))
        }
        Expr::List { sep, brackets, items } => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(evaluate(item, scope, rt)?.node);
            }
            Ok(spanned(Value::List(values, *sep, *brackets), span))
        }
        Expr::Map(pairs) => {
            let mut map = SassMap::new();
            for (k, v) in pairs {
                let key = evaluate(k, scope, rt)?.node;
                let value = evaluate(v, scope, rt)?.node;
                map.insert(key, value);
            }
            Ok(spanned(Value::Map(map), span))
        }
        Expr::BinaryExpr {
            op,
            left,
            right,
            in_parens,
        } => eval_binary(*op, left, right, *in_parens, scope, rt, span),
        Expr::UnaryExpr { op, operand } => eval_unary(*op, operand, scope, rt, span),
        Expr::Interpolation(inner) => {
            let value = evaluate(inner, scope, rt)?;
            let text = value.node.to_css_string(span)?;
            Ok(spanned(
                Value::String {
                    quote: QuoteKind::None,
                    text,
                },
                span,
            ))
        }
        Expr::FunctionCall { name, args } => eval_function_call(name, args, scope, rt, span),
        Expr::ListLookup { variable, index } => eval_list_lookup(variable, *index, scope, span),
        Expr::ListSlice { variable, from_index } => eval_list_slice(variable, *from_index, scope, span),
    }
}

/// `EvaluateExprInBooleanContext` (spec §4.5 "Boolean context"): used for
/// `@if`/`@while` conditions. Evaluation itself is identical to `evaluate`;
/// only the caller's interpretation of the result (`is_truthy`) differs, so
/// this is a thin, separately-named entry point matching the grounding
/// source's separate function.
pub(crate) fn evaluate_in_boolean_context(
    expr: &Spanned<Expr>,
    scope: &Scope,
    rt: &Runtime,
) -> SassResult<bool> {
    Ok(evaluate(expr, scope, rt)?.node.is_truthy())
}

fn is_plain_number(expr: &Expr) -> bool {
    matches!(expr, Expr::Number { .. })
}

fn eval_binary(
    op: Op,
    left: &Spanned<Expr>,
    right: &Spanned<Expr>,
    in_parens: bool,
    scope: &Scope,
    rt: &Runtime,
    span: Span,
) -> SassResult<Spanned<Value>> {
    // CSS-slash shape must be checked before general binary evaluation
    // (spec §4.4, grounded on `EvaluateExpr`'s `IsCssSlash` check ordering).
    if op == Op::Div && !in_parens && is_plain_number(&left.node) && is_plain_number(&right.node) {
        let l = evaluate(left, scope, rt)?;
        let r = evaluate(right, scope, rt)?;
        let text = format!("{}/{}", l.node.to_css_string(span)?, r.node.to_css_string(span)?);
        return Ok(spanned(
            Value::String {
                quote: QuoteKind::None,
                text,
            },
            span,
        ));
    }

    // `and`/`or` take the left operand's truthiness and return the *other*
    // operand's literal value when short-circuit continues (spec §4.4
    // "SCSS semantics") -- diverging from the Go original, which always
    // casts to `Boolean`; spec.md is explicit here, so its rule governs.
    if op == Op::And {
        let l = evaluate(left, scope, rt)?;
        return if l.node.is_truthy() {
            evaluate(right, scope, rt)
        } else {
            Ok(l)
        };
    }
    if op == Op::Or {
        let l = evaluate(left, scope, rt)?;
        return if l.node.is_truthy() {
            Ok(l)
        } else {
            evaluate(right, scope, rt)
        };
    }

    let l = evaluate(left, scope, rt)?;
    let r = evaluate(right, scope, rt)?;
    let value = compute(op, &l.node, &r.node, span)?;
    Ok(spanned(value, span))
}

/// `Compute` (spec §4.4, grounded on `compute.go`'s `Compute`): type-pair
/// dispatch for every non-short-circuit binary operator.
fn compute(op: Op, l: &Value, r: &Value, span: Span) -> SassResult<Value> {
    match op {
        Op::Equal => Ok(Value::Boolean(l.equals(r, span)?)),
        Op::NotEqual => Ok(Value::Boolean(!l.equals(r, span)?)),
        Op::Less | Op::LessEqual | Op::Greater | Op::GreaterEqual => compare(op, l, r, span),
        Op::Plus => add(l, r, span),
        Op::Minus => subtract(l, r, span),
        Op::Mul => multiply(l, r, span),
        Op::Div => divide(l, r, span),
        Op::Rem => remainder(l, r, span),
        Op::And | Op::Or | Op::Not => unreachable!("handled in eval_binary/eval_unary"),
    }
}

fn compare(op: Op, l: &Value, r: &Value, span: Span) -> SassResult<Value> {
    match (l, r) {
        (Value::Number { value: a, unit: ua }, Value::Number { value: b, unit: ub }) => {
            if !crate::unit::comparable(ua.as_deref(), ub.as_deref()) {
                return Err(("incompatible units for comparison".to_owned(), span).into());
            }
            let result = match op {
                Op::Less => a < b,
                Op::LessEqual => a <= b,
                Op::Greater => a > b,
                Op::GreaterEqual => a >= b,
                _ => unreachable!(),
            };
            Ok(Value::Boolean(result))
        }
        _ => Err(("comparison operators only apply to numbers".to_owned(), span).into()),
    }
}

fn add(l: &Value, r: &Value, span: Span) -> SassResult<Value> {
    match (l, r) {
        (Value::Number { value: a, unit: ua }, Value::Number { value: b, unit: ub }) => {
            let unit = crate::unit::additive_unit(ua.as_deref(), ub.as_deref())
                .map_err(|_| sass_err("incompatible units for addition", span))?;
            Ok(Value::Number {
                value: a + b,
                unit: unit.map(str::to_owned),
            })
        }
        (Value::Color(c), Value::Number { value: n, .. }) | (Value::Number { value: n, .. }, Value::Color(c)) => {
            Ok(Value::Color(c.apply_channelwise(*n, |a, b| a + b)))
        }
        // literal-concat (spec §4.2 "Additive (+ -, also literal-concat)").
        (Value::String { .. }, _) | (_, Value::String { .. }) => {
            let quote = if let Value::String { quote, .. } = l { *quote } else { QuoteKind::None };
            let text = format!("{}{}", l.to_css_string(span)?, r.to_css_string(span)?);
            Ok(Value::String { quote, text })
        }
        _ => Err(sass_err("undefined operation \"+\" for these operand types", span)),
    }
}

fn subtract(l: &Value, r: &Value, span: Span) -> SassResult<Value> {
    match (l, r) {
        (Value::Number { value: a, unit: ua }, Value::Number { value: b, unit: ub }) => {
            let unit = crate::unit::additive_unit(ua.as_deref(), ub.as_deref())
                .map_err(|_| sass_err("incompatible units for subtraction", span))?;
            Ok(Value::Number {
                value: a - b,
                unit: unit.map(str::to_owned),
            })
        }
        (Value::Color(c), Value::Number { value: n, .. }) => {
            Ok(Value::Color(c.apply_channelwise(*n, |a, b| a - b)))
        }
        _ => Err(sass_err("undefined operation \"-\" for these operand types", span)),
    }
}

fn multiply(l: &Value, r: &Value, span: Span) -> SassResult<Value> {
    match (l, r) {
        (Value::Number { value: a, unit: ua }, Value::Number { value: b, unit: ub }) => {
            let unit = crate::unit::mul_unit(ua.as_deref(), ub.as_deref())
                .map_err(|_| sass_err("only one operand of a multiplication may carry a unit", span))?;
            Ok(Value::Number {
                value: a * b,
                unit: unit.map(str::to_owned),
            })
        }
        (Value::Color(c), Value::Number { value: n, .. }) | (Value::Number { value: n, .. }, Value::Color(c)) => {
            Ok(Value::Color(c.apply_channelwise(*n, |a, b| a * b)))
        }
        _ => Err(sass_err("undefined operation \"*\" for these operand types", span)),
    }
}

fn divide(l: &Value, r: &Value, span: Span) -> SassResult<Value> {
    match (l, r) {
        (Value::Number { value: a, unit: ua }, Value::Number { value: b, unit: ub }) => {
            let unit = crate::unit::div_unit(ua.as_deref(), ub.as_deref());
            Ok(Value::Number {
                value: a / b,
                unit: unit.map(str::to_owned),
            })
        }
        (Value::Color(c), Value::Number { value: n, .. }) => {
            Ok(Value::Color(c.apply_channelwise(*n, |a, b| a / b)))
        }
        _ => Err(sass_err("undefined operation \"/\" for these operand types", span)),
    }
}

fn remainder(l: &Value, r: &Value, span: Span) -> SassResult<Value> {
    match (l, r) {
        (Value::Number { value: a, unit: ua }, Value::Number { value: b, unit: ub }) => {
            let unit = crate::unit::div_unit(ua.as_deref(), ub.as_deref());
            Ok(Value::Number {
                value: a % b,
                unit: unit.map(str::to_owned),
            })
        }
        _ => Err(sass_err("undefined operation \"%\" for these operand types", span)),
    }
}

fn eval_unary(op: Op, operand: &Spanned<Expr>, scope: &Scope, rt: &Runtime, span: Span) -> SassResult<Spanned<Value>> {
    let v = evaluate(operand, scope, rt)?;
    let value = match op {
        Op::Not => Value::Boolean(!v.node.is_truthy()),
        Op::Plus => v.node,
        Op::Minus => match v.node {
            Value::Number { value, unit } => Value::Number { value: -value, unit },
            Value::Color(c) => Value::Color(c.apply_channelwise(-1.0, |a, b| a * b)),
            _ => return Err(("undefined operation \"-x\" for a non-number".to_owned(), span).into()),
        },
        _ => unreachable!("handled in eval_binary"),
    };
    Ok(spanned(value, span))
}

fn eval_recognized_call(
    name: &str,
    args: &CallArgs,
    scope: &Scope,
    rt: &Runtime,
    span: Span,
) -> SassResult<Spanned<Value>> {
    let mut values = Vec::with_capacity(args.0.len());
    for arg in &args.0 {
        values.push(evaluate(&arg.value, scope, rt)?.node);
    }
    let value = crate::builtin::call(name, &values, span)?;
    Ok(spanned(value, span))
}

fn eval_function_call(
    name: &str,
    args: &CallArgs,
    scope: &Scope,
    rt: &Runtime,
    span: Span,
) -> SassResult<Spanned<Value>> {
    let lname = name.to_ascii_lowercase();

    if lname == "content-exists" {
        return Ok(spanned(Value::Boolean(rt.has_content()), span));
    }

    if crate::builtin::is_recognized(&lname) {
        return eval_recognized_call(&lname, args, scope, rt, span);
    }

    if let Some(func) = scope.lookup_function(name) {
        let aligned = crate::parser::args::apply_call_arguments(&func.args, args, span)?;
        let call_scope = Scope::child_of(scope);
        for (param, arg) in func.args.0.iter().zip(aligned.0.iter()) {
            let value = evaluate(&arg.value, scope, rt)?;
            call_scope.insert_var(&param.name, value);
        }
        return match execute::execute_block(&func.body, &call_scope, rt)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal(_) => Err((
                format!("Function \"{}\" finished without @return.", name),
                span,
            )
                .into()),
        };
    }

    // Unrecognized function calls pass through unchanged (spec §4.4).
    Ok(spanned(
        Value::FunctionCall {
            name: name.to_owned(),
            args: Box::new(args.clone()),
        },
        span,
    ))
}

fn list_items(v: &Value, variable: &str, span: Span) -> SassResult<Vec<Value>> {
    match v {
        Value::List(items, ..) => Ok(items.clone()),
        Value::ArgList(items) => Ok(items.clone()),
        _ => Err((format!("\"{}\" is not a list", variable), span).into()),
    }
}

fn eval_list_lookup(variable: &str, index: i64, scope: &Scope, span: Span) -> SassResult<Spanned<Value>> {
    let bound = scope.lookup_var(variable)?;
    let items = list_items(&bound.node, variable, span)?;
    if index < 0 || index as usize >= items.len() {
        return Err((
            format!(
                "{} lookup is out of bounds, idx = {}, len = {}",
                variable,
                index,
                items.len()
            ),
            span,
        )
            .into());
    }
    Ok(spanned(items[index as usize].clone(), span))
}

fn eval_list_slice(variable: &str, from_index: i64, scope: &Scope, span: Span) -> SassResult<Spanned<Value>> {
    let bound = scope.lookup_var(variable)?;
    let items = list_items(&bound.node, variable, span)?;
    let len = items.len() as i64;
    if from_index > len {
        return Err((
            format!("{} lookup is out of bounds, idx = {}, len = {}", variable, from_index, len),
            span,
        )
            .into());
    }
    let start = from_index.max(0) as usize;
    let tail = items.get(start..).map(<[Value]>::to_vec).unwrap_or_default();
    Ok(spanned(Value::List(tail, ListSeparator::Space, Brackets::None), span))
}

/// Resolves `#{ ... }` islands embedded in a string body (spec §4.1
/// "Interpolation islands are carried through and marked on the containing
/// token"): re-lexes and re-parses each island as an expression, evaluates
/// it, and splices its CSS rendering back into the literal text.
fn resolve_string_interpolation(body: &str, scope: &Scope, rt: &Runtime, span: Span) -> SassResult<String> {
    let mut out = String::new();
    let mut rest = body;
    while let Some(start) = rest.find("#{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let mut depth = 1usize;
        let mut end = after.len();
        for (i, c) in after.char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = i;
                        break;
                    }
                }
                _ => {}
            }
        }
        let island_src = &after[..end];
        let value = evaluate_island(island_src, scope, rt, span)?;
        out.push_str(&value.to_css_string(span)?);
        rest = if end < after.len() { &after[end + 1..] } else { "" };
    }
    out.push_str(rest);
    Ok(out)
}

fn evaluate_island(src: &str, scope: &Scope, rt: &Runtime, span: Span) -> SassResult<Value> {
    let file = rt
        .codemap
        .borrow_mut()
        .add_file("<interpolation>".to_owned(), src.to_owned());
    let tokens = crate::lexer::lex(src, Arc::clone(&file))?;
    let mut parser = crate::parser::Parser::new(tokens, src, file, "<interpolation>".to_owned());
    let expr = parser.parse_expr()?;
    let _ = span;
    Ok(evaluate(&expr, scope, rt)?.node)
}

fn sass_err(msg: &str, span: Span) -> crate::error::SassError {
    (msg.to_owned(), span).into()
}
