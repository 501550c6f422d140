//! Tree expander (spec §4.6): flattens nested rule sets, applying the
//! parent-selector join and Cartesian product over selector lists, and
//! hoists CSS `@import`s to the front of the output.

use codemap::Spanned;

use crate::ast::selector::{join_selector_lists, ComplexSelectorList};
use crate::ast::{DeclBlock, MediaQueryStmt, RuleSet, Stmt};
use crate::error::SassResult;
use crate::runtime::Runtime;

/// One printable unit; the pretty-printer separates consecutive groups with
/// a blank line. Usually a single statement, except the first group, which
/// absorbs every hoisted CSS `@import`.
pub(crate) type OutputGroup = Vec<Spanned<Stmt>>;

pub(crate) fn expand(stmts: &[Spanned<Stmt>], rt: &Runtime) -> SassResult<Vec<OutputGroup>> {
    let mut css_imports = Vec::new();
    let mut rest = Vec::new();
    for stmt in stmts {
        match &stmt.node {
            Stmt::CssImport(_) => css_imports.push(stmt.clone()),
            _ => rest.push(stmt.clone()),
        }
    }

    let mut groups = expand_block(None, &rest, rt)?;
    if !css_imports.is_empty() {
        match groups.first_mut() {
            Some(first) => {
                let mut merged = css_imports;
                merged.append(first);
                *first = merged;
            }
            None => groups.push(css_imports),
        }
    }
    Ok(groups)
}

fn expand_block(
    parent: Option<&ComplexSelectorList>,
    stmts: &[Spanned<Stmt>],
    rt: &Runtime,
) -> SassResult<Vec<OutputGroup>> {
    let mut groups = Vec::new();
    let mut collector: OutputGroup = Vec::new();

    for stmt in stmts {
        match &stmt.node {
            Stmt::Property(_) | Stmt::CssImport(_) => collector.push(stmt.clone()),
            Stmt::RuleSet(r) => {
                flush(parent, &mut collector, &mut groups)?;
                let joined = match parent {
                    Some(p) => join_selector_lists(p, &r.selectors, stmt.span)?,
                    None => r.selectors.clone(),
                };
                let nested = expand_block(Some(&joined), &r.body.0, rt)?;
                groups.extend(nested);
            }
            Stmt::MediaQuery(m) => {
                flush(parent, &mut collector, &mut groups)?;
                let nested = expand_block(parent, &m.body.0, rt)?;
                let flattened: Vec<Spanned<Stmt>> = nested.into_iter().flatten().collect();
                groups.push(vec![Spanned {
                    node: Stmt::MediaQuery(MediaQueryStmt {
                        query: m.query.clone(),
                        body: DeclBlock(flattened),
                    }),
                    span: stmt.span,
                }]);
            }
            Stmt::AtRoot(a) => {
                flush(parent, &mut collector, &mut groups)?;
                // `@at-root` escapes any ancestor selector, so the body is
                // re-expanded with no parent context and its groups are
                // spliced straight into the output rather than nested.
                let nested = expand_block(None, &a.0 .0, rt)?;
                groups.extend(nested);
            }
            Stmt::Charset(_) | Stmt::FontFace(_) => {
                flush(parent, &mut collector, &mut groups)?;
                groups.push(vec![stmt.clone()]);
            }
            Stmt::Extend(_) => {
                rt.debug("@extend inheritance resolution is not implemented; directive dropped");
            }
            _ => {
                return Err((
                    "internal error: a control-flow statement survived execution".to_owned(),
                    stmt.span,
                )
                    .into());
            }
        }
    }

    flush(parent, &mut collector, &mut groups)?;
    Ok(groups)
}

/// Flushes the accumulated `Property`/`CssImport` run as a new rule set
/// carrying `parent`'s selector list (spec §4.6 steps 1-2, 4). Produces
/// nothing for an empty collector (empty rule sets produce no output).
fn flush(
    parent: Option<&ComplexSelectorList>,
    collector: &mut OutputGroup,
    groups: &mut Vec<OutputGroup>,
) -> SassResult<()> {
    if collector.is_empty() {
        return Ok(());
    }
    let flushed = std::mem::take(collector);
    let selectors = match parent {
        Some(selectors) => selectors.clone(),
        None => {
            return Err((
                "properties are not allowed at the root of a document".to_owned(),
                flushed[0].span,
            )
                .into());
        }
    };
    let span = flushed[0].span;
    groups.push(vec![Spanned {
        node: Stmt::RuleSet(RuleSet {
            selectors,
            body: DeclBlock(flushed),
        }),
        span,
    }]);
    Ok(())
}
