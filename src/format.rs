//! Pretty printer (spec §6 "Output"): renders the tree expander's
//! `OutputGroup`s as CSS text. Rule sets print as
//! `<selectors> {\n  <property>: <values>;\n  ...\n}`, blank lines separate
//! top-level groups, and a trailing newline terminates non-empty output.

use codemap::Spanned;

use crate::ast::Stmt;
use crate::common::QuoteKind;
use crate::error::SassResult;
use crate::runtime::expand::OutputGroup;

const INDENT: &str = "  ";

pub(crate) fn print_stylesheet(groups: &[OutputGroup]) -> SassResult<String> {
    let mut rendered_groups = Vec::with_capacity(groups.len());
    for group in groups {
        rendered_groups.push(render_stmt_list(group, 0)?);
    }
    let body = rendered_groups.join("\n\n");
    if body.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!("{}\n", body))
    }
}

fn render_stmt_list(stmts: &[Spanned<Stmt>], indent: usize) -> SassResult<String> {
    let mut lines = Vec::with_capacity(stmts.len());
    for stmt in stmts {
        lines.push(render_stmt(stmt, indent)?);
    }
    Ok(lines.join("\n"))
}

fn render_stmt(stmt: &Spanned<Stmt>, indent: usize) -> SassResult<String> {
    let pad = INDENT.repeat(indent);
    match &stmt.node {
        Stmt::RuleSet(r) => {
            let selectors = r.selectors.to_css_string();
            if r.body.0.is_empty() {
                return Ok(format!("{}{} {{\n{}}}", pad, selectors, pad));
            }
            let inner = render_stmt_list(&r.body.0, indent + 1)?;
            Ok(format!("{}{} {{\n{}\n{}}}", pad, selectors, inner, pad))
        }
        Stmt::Property(p) => {
            let name: String = p
                .name
                .iter()
                .map(literal_text)
                .collect::<SassResult<Vec<_>>>()?
                .join("");
            let values = p
                .values
                .iter()
                .map(literal_text)
                .collect::<SassResult<Vec<_>>>()?
                .join(" ");
            Ok(format!("{}{}: {};", pad, name, values))
        }
        Stmt::CssImport(c) => Ok(format!("{}@import {};", pad, c.0)),
        Stmt::MediaQuery(m) => {
            // Genuine `@media` queries store only the parenthesized params;
            // unknown at-rules passed through this same variant already
            // bake their own `@keyword` prefix into `query` (spec §9).
            let header = if m.query.trim_start().starts_with('@') {
                m.query.trim().to_owned()
            } else {
                format!("@media {}", m.query.trim())
            };
            if m.body.0.is_empty() {
                return Ok(format!("{}{} {{\n{}}}", pad, header, pad));
            }
            let inner = render_stmt_list(&m.body.0, indent + 1)?;
            Ok(format!("{}{} {{\n{}\n{}}}", pad, header, inner, pad))
        }
        Stmt::Charset(c) => Ok(format!("{}@charset \"{}\";", pad, c.0)),
        Stmt::FontFace(f) => {
            if f.0 .0.is_empty() {
                return Ok(format!("{}@font-face {{\n{}}}", pad, pad));
            }
            let inner = render_stmt_list(&f.0 .0, indent + 1)?;
            Ok(format!("{}@font-face {{\n{}\n{}}}", pad, inner, pad))
        }
        other => Err((
            format!("internal error: cannot print statement {:?} produced by tree expansion", other),
            stmt.span,
        )
            .into()),
    }
}

fn literal_text(expr: &Spanned<crate::ast::expr::Expr>) -> SassResult<String> {
    match &expr.node {
        crate::ast::expr::Expr::String { quote, body, .. } => Ok(match quote {
            QuoteKind::None => body.clone(),
            QuoteKind::Single => format!("'{}'", body),
            QuoteKind::Double => format!("\"{}\"", body),
        }),
        other => Err((
            format!("internal error: non-literal expression {:?} survived execution", other),
            expr.span,
        )
            .into()),
    }
}
