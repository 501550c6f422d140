//! Statement execution (spec §4.5): walks a `DeclBlock`, evaluating
//! assignments and control flow, and producing the flattened-but-not-yet-
//! selector-joined statement list that `expand.rs` consumes next.

use codemap::{Span, Spanned};

use crate::ast::selector::{
    ComplexSelector, ComplexSelectorItem, ComplexSelectorList, CompoundSelector, SimpleSelector,
};
use crate::ast::*;
use crate::common::QuoteKind;
use crate::error::SassResult;
use crate::runtime::{eval, Runtime};
use crate::scope::Scope;
use crate::value::Value;

const WHILE_ITERATION_CAP: u32 = 10_000;

/// Result of executing one statement (spec §4.5's `(StmtList, error)`
/// contract, plus the `@return` control-flow signal). Only a function
/// body's own `execute_block` call (in `runtime::eval`'s function-call
/// evaluation) may consume a `Flow::Return`; every other body-execution
/// boundary (rule set, mixin include, media query, at-root, font-face, the
/// top level) treats a `Return` reaching it as an error.
pub(crate) enum Flow {
    Normal(Vec<Spanned<Stmt>>),
    Return(Spanned<Value>),
}

/// Top-level entry point: executes a whole parsed file/import and rejects a
/// stray `@return` (mirrors the teacher's own "This at-rule is not allowed
/// here" handling for a return reaching the outermost level).
pub(crate) fn execute_block_flat(
    stmts: &[Spanned<Stmt>],
    scope: &Scope,
    rt: &Runtime,
) -> SassResult<Vec<Spanned<Stmt>>> {
    match execute_stmts(stmts, scope, rt)? {
        Flow::Normal(out) => Ok(out),
        Flow::Return(v) => Err(("@return is only allowed within function bodies".to_owned(), v.span).into()),
    }
}

pub(crate) fn execute_block(block: &DeclBlock, scope: &Scope, rt: &Runtime) -> SassResult<Flow> {
    execute_stmts(&block.0, scope, rt)
}

fn execute_stmts(stmts: &[Spanned<Stmt>], scope: &Scope, rt: &Runtime) -> SassResult<Flow> {
    let mut out = Vec::new();
    for stmt in stmts {
        match execute_stmt(stmt, scope, rt)? {
            Flow::Normal(mut produced) => out.append(&mut produced),
            Flow::Return(v) => return Ok(Flow::Return(v)),
        }
    }
    Ok(Flow::Normal(out))
}

/// Body-execution boundary: runs `block` in a child scope and turns a
/// bubbled-up `@return` into an error, for contexts that are never inside a
/// function body (rule sets, included mixins, media/at-root/font-face).
fn execute_body_boundary(block: &DeclBlock, scope: &Scope, rt: &Runtime) -> SassResult<Vec<Spanned<Stmt>>> {
    match execute_block(block, scope, rt)? {
        Flow::Normal(out) => Ok(out),
        Flow::Return(v) => Err(("@return is only allowed within function bodies".to_owned(), v.span).into()),
    }
}

fn execute_stmt(stmt: &Spanned<Stmt>, scope: &Scope, rt: &Runtime) -> SassResult<Flow> {
    let span = stmt.span;
    match &stmt.node {
        Stmt::Assign(a) => execute_assign(a, scope, rt),
        Stmt::If(i) => execute_if(i, scope, rt),
        Stmt::For(f) => execute_for(f, scope, rt),
        Stmt::While(w) => execute_while(w, scope, rt),
        Stmt::Mixin(m) => {
            scope.insert_mixin(&m.name, m.clone());
            Ok(Flow::Normal(Vec::new()))
        }
        Stmt::Include(inc) => execute_include(inc, scope, rt, span),
        Stmt::Function(f) => {
            scope.insert_function(&f.name, f.clone());
            Ok(Flow::Normal(Vec::new()))
        }
        Stmt::Return(r) => {
            let value = eval::evaluate(&r.0, scope, rt)?;
            Ok(Flow::Return(value))
        }
        Stmt::Import(import) => execute_import(import, scope, rt, span),
        Stmt::CssImport(_) => Ok(Flow::Normal(vec![stmt.clone()])),
        Stmt::MediaQuery(m) => {
            let child = Scope::child_of(scope);
            let body = DeclBlock(execute_body_boundary(&m.body, &child, rt)?);
            Ok(Flow::Normal(vec![Spanned {
                node: Stmt::MediaQuery(MediaQueryStmt {
                    query: m.query.clone(),
                    body,
                }),
                span,
            }]))
        }
        Stmt::Extend(_) => Ok(Flow::Normal(vec![stmt.clone()])),
        Stmt::AtRoot(a) => {
            let child = Scope::child_of(scope);
            let body = DeclBlock(execute_body_boundary(&a.0, &child, rt)?);
            Ok(Flow::Normal(vec![Spanned {
                node: Stmt::AtRoot(AtRootStmt(body)),
                span,
            }]))
        }
        Stmt::Log(l) => execute_log(l, scope, rt, span),
        Stmt::Content(_) => execute_content(scope, rt, span),
        Stmt::Charset(_) => Ok(Flow::Normal(vec![stmt.clone()])),
        Stmt::FontFace(f) => {
            let child = Scope::child_of(scope);
            let body = DeclBlock(execute_body_boundary(&f.0, &child, rt)?);
            Ok(Flow::Normal(vec![Spanned {
                node: Stmt::FontFace(FontFaceStmt(body)),
                span,
            }]))
        }
        Stmt::Property(p) => execute_property(p, scope, rt, span),
        Stmt::RuleSet(r) => execute_rule_set(r, scope, rt, span),
    }
}

/// `AssignStmt` (spec §4.5): always overwrites, even under `!default` --
/// the Go grounding source's `executeAssignStmt` does an unconditional
/// `scope.Insert` with no default-check, and spec §4.5 itself flags full
/// `!default` semantics as "a known gap"; `!global` does control which
/// scope is written to.
fn execute_assign(a: &AssignStmt, scope: &Scope, rt: &Runtime) -> SassResult<Flow> {
    let value = eval::evaluate(&a.value, scope, rt)?;
    let target = if a.global { scope.global() } else { scope };
    target.insert_var(&a.name, value);
    Ok(Flow::Normal(Vec::new()))
}

fn execute_if(i: &IfStmt, scope: &Scope, rt: &Runtime) -> SassResult<Flow> {
    for branch in &i.branches {
        if eval::evaluate_in_boolean_context(&branch.cond, scope, rt)? {
            let child = Scope::child_of(scope);
            return execute_block(&branch.body, &child, rt);
        }
    }
    if let Some(else_body) = &i.else_body {
        let child = Scope::child_of(scope);
        return execute_block(else_body, &child, rt);
    }
    Ok(Flow::Normal(Vec::new()))
}

fn as_loop_bound(value: &Spanned<Value>) -> SassResult<(i64, Option<String>)> {
    match &value.node {
        Value::Number { value, unit } => Ok((*value as i64, unit.clone())),
        _ => Err(("@for bounds must be numbers".to_owned(), value.span).into()),
    }
}

fn execute_for(f: &ForStmt, scope: &Scope, rt: &Runtime) -> SassResult<Flow> {
    let from_val = eval::evaluate(&f.from, scope, rt)?;
    let to_val = eval::evaluate(&f.to, scope, rt)?;
    let (from_n, unit) = as_loop_bound(&from_val)?;
    let (to_n, _) = as_loop_bound(&to_val)?;

    let step: i64 = if from_n <= to_n { 1 } else { -1 };
    let mut i = from_n;
    let mut out = Vec::new();

    loop {
        let still_running = if f.inclusive {
            if step > 0 { i <= to_n } else { i >= to_n }
        } else if step > 0 {
            i < to_n
        } else {
            i > to_n
        };
        if !still_running {
            break;
        }

        let child = Scope::child_of(scope);
        child.insert_var(
            &f.variable,
            Spanned {
                node: Value::Number {
                    value: i as f64,
                    unit: unit.clone(),
                },
                span: f.from.span,
            },
        );
        match execute_block(&f.body, &child, rt)? {
            Flow::Normal(mut produced) => out.append(&mut produced),
            Flow::Return(v) => return Ok(Flow::Return(v)),
        }
        i += step;
    }

    Ok(Flow::Normal(out))
}

/// `WhileStmt` (spec §4.5, §5): the condition is evaluated in the same
/// child scope the body runs in, and that scope is reused across
/// iterations -- a variable a loop body mutates (e.g. `$i: $i + 1`) stays
/// visible to the next condition check, the way a plain `while` loop reuses
/// its enclosing frame.
fn execute_while(w: &WhileStmt, scope: &Scope, rt: &Runtime) -> SassResult<Flow> {
    let child = Scope::child_of(scope);
    let mut out = Vec::new();
    let mut iterations = 0u32;
    loop {
        if !eval::evaluate_in_boolean_context(&w.cond, &child, rt)? {
            break;
        }
        iterations += 1;
        if iterations > WHILE_ITERATION_CAP {
            return Err((
                format!("@while exceeded the {}-iteration safety cap", WHILE_ITERATION_CAP),
                w.cond.span,
            )
                .into());
        }
        match execute_block(&w.body, &child, rt)? {
            Flow::Normal(mut produced) => out.append(&mut produced),
            Flow::Return(v) => return Ok(Flow::Return(v)),
        }
    }
    Ok(Flow::Normal(out))
}

fn execute_include(inc: &IncludeStmt, scope: &Scope, rt: &Runtime, span: Span) -> SassResult<Flow> {
    let mixin = scope.lookup_mixin(&inc.name)?;
    let aligned = crate::parser::args::apply_call_arguments(&mixin.args, &inc.args, span)?;
    let call_scope = Scope::child_of(scope);
    for (param, arg) in mixin.args.0.iter().zip(aligned.0.iter()) {
        let value = eval::evaluate(&arg.value, scope, rt)?;
        call_scope.insert_var(&param.name, value);
    }

    let pushed = inc.content.is_some();
    if let Some(content) = &inc.content {
        rt.push_content(content.clone());
    }
    let result = execute_body_boundary(&mixin.body, &call_scope, rt);
    if pushed {
        rt.pop_content();
    }
    Ok(Flow::Normal(result?))
}

fn execute_import(import: &ImportStmt, scope: &Scope, rt: &Runtime, span: Span) -> SassResult<Flow> {
    let mut out = Vec::new();
    for path in &import.0 {
        let source_file = rt.current_file();
        let resolved = crate::imports::resolve(&source_file, path, rt.fs)?;

        if !rt.enter_import(&resolved) {
            return Err((format!("import cycle detected while resolving '{}'", path), span).into());
        }

        let read_result = rt.fs.read(&resolved).map_err(crate::error::SassError::from);
        let exec_result = read_result.and_then(|contents| {
            rt.push_file(resolved.clone());
            let parsed = crate::runtime::parse_source(rt, &contents, &resolved);
            let result = parsed.and_then(|stmts| execute_block_flat(&stmts, scope, rt));
            rt.pop_file();
            result
        });

        rt.exit_import(&resolved);
        out.extend(exec_result?);
    }
    Ok(Flow::Normal(out))
}

fn execute_log(l: &LogStmt, scope: &Scope, rt: &Runtime, span: Span) -> SassResult<Flow> {
    let value = eval::evaluate(&l.message, scope, rt)?;
    let text = value.node.to_css_string(span)?;
    match l.level {
        LogLevel::Debug => rt.debug(&text),
        LogLevel::Warn => rt.warn(&text),
        LogLevel::Error => return Err(crate::error::SassError::user(text, span)),
    }
    Ok(Flow::Normal(Vec::new()))
}

fn execute_content(scope: &Scope, rt: &Runtime, span: Span) -> SassResult<Flow> {
    let block = rt
        .current_content()
        .ok_or_else(|| crate::error::SassError::name("no content block was passed to this mixin".to_owned(), span))?;
    // Dynamic scoping: the content block runs as a child of whatever scope
    // is current at the `@content` call site, not a closure captured at the
    // `@include` site (spec.md and the Go original are both silent on
    // mixin/content closure semantics; this mirrors how the block's own
    // free variables are expected to resolve against the including context).
    let child = Scope::child_of(scope);
    execute_block(&block, &child, rt)
}

fn execute_property(p: &Property, scope: &Scope, rt: &Runtime, span: Span) -> SassResult<Flow> {
    let name = resolve_to_literal_exprs(&p.name, scope, rt)?;
    let values = resolve_to_literal_exprs(&p.values, scope, rt)?;
    Ok(Flow::Normal(vec![Spanned {
        node: Stmt::Property(Property { name, values }),
        span,
    }]))
}

fn resolve_to_literal_exprs(
    exprs: &[Spanned<expr::Expr>],
    scope: &Scope,
    rt: &Runtime,
) -> SassResult<Vec<Spanned<expr::Expr>>> {
    exprs
        .iter()
        .map(|e| {
            let value = eval::evaluate(e, scope, rt)?;
            let text = value.node.to_css_string(e.span)?;
            Ok(Spanned {
                node: expr::Expr::String {
                    quote: QuoteKind::None,
                    body: text,
                    contains_interpolation: false,
                },
                span: e.span,
            })
        })
        .collect()
}

fn execute_rule_set(r: &RuleSet, scope: &Scope, rt: &Runtime, span: Span) -> SassResult<Flow> {
    let selectors = resolve_selector_list(&r.selectors, scope, rt, span)?;
    let child = Scope::child_of(scope);
    let body = DeclBlock(execute_body_boundary(&r.body, &child, rt)?);
    Ok(Flow::Normal(vec![Spanned {
        node: Stmt::RuleSet(RuleSet { selectors, body }),
        span,
    }]))
}

/// Resolves `#{ ... }` islands inside a selector (spec §4.1 "Interpolation
/// ... in selectors"): these survive parsing as `SimpleSelector::Interpolation`
/// and are reduced to literal text here, once a scope is available.
fn resolve_selector_list(
    list: &ComplexSelectorList,
    scope: &Scope,
    rt: &Runtime,
    span: Span,
) -> SassResult<ComplexSelectorList> {
    let mut out = Vec::with_capacity(list.0.len());
    for complex in &list.0 {
        let mut items = Vec::with_capacity(complex.0.len());
        for item in &complex.0 {
            let compound = match &item.compound {
                Some(c) => Some(resolve_compound(c, scope, rt, span)?),
                None => None,
            };
            items.push(ComplexSelectorItem {
                combinator: item.combinator,
                compound,
            });
        }
        out.push(ComplexSelector(items));
    }
    Ok(ComplexSelectorList(out))
}

fn resolve_compound(
    compound: &CompoundSelector,
    scope: &Scope,
    rt: &Runtime,
    span: Span,
) -> SassResult<CompoundSelector> {
    let mut simples = Vec::with_capacity(compound.0.len());
    for simple in &compound.0 {
        match simple {
            SimpleSelector::Interpolation(expr) => {
                let spanned_expr = Spanned {
                    node: (**expr).clone(),
                    span,
                };
                let value = eval::evaluate(&spanned_expr, scope, rt)?;
                simples.push(SimpleSelector::Type(value.node.to_css_string(span)?));
            }
            other => simples.push(other.clone()),
        }
    }
    Ok(CompoundSelector(simples))
}
