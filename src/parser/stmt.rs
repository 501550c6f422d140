//! Statement-level parsing: top-level dispatch, at-rules, rule sets,
//! properties (spec §4.2 "Statement dispatch").

use codemap::{Span, Spanned};

use crate::ast::expr::Expr;
use crate::ast::{
    AssignStmt, AtRootStmt, CharsetStmt, ContentStmt, CssImportStmt, DeclBlock, ExtendStmt,
    FontFaceStmt, ForStmt, FunctionStmt, IfBranch, IfStmt, IncludeStmt, LogLevel, LogStmt,
    MediaQueryStmt, MixinStmt, Property, ReturnStmt, RuleSet, Stmt, WhileStmt,
};
use crate::error::SassResult;
use crate::parser::Parser;
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    pub fn parse_stylesheet(&mut self) -> SassResult<Vec<Spanned<Stmt>>> {
        self.parse_block_contents()
    }

    /// Parses statements until EOF or an enclosing `}` (the caller is
    /// expected to have already consumed the opening `{`, if any).
    fn parse_block_contents(&mut self) -> SassResult<Vec<Spanned<Stmt>>> {
        let mut out = Vec::new();
        loop {
            self.skip_trivia();
            if self.is_eof() || self.peek_is_char('}') {
                break;
            }
            if self.peek_is_char(';') {
                self.bump();
                continue;
            }
            if let Some(stmt) = self.parse_stmt()? {
                out.push(stmt);
            }
        }
        Ok(out)
    }

    fn parse_braced_block(&mut self) -> SassResult<DeclBlock> {
        self.expect_char('{')?;
        let stmts = self.parse_block_contents()?;
        self.expect_char('}')?;
        Ok(DeclBlock(stmts))
    }

    /// Dispatch one statement (spec §4.2 "Statement dispatch").
    fn parse_stmt(&mut self) -> SassResult<Option<Spanned<Stmt>>> {
        let start = self.current_span();
        match self.peek().kind {
            TokenKind::AtRule => self.parse_at_rule(),
            TokenKind::Variable => {
                let stmt = self.parse_assignment()?;
                self.eat_optional_semicolon();
                Ok(Some(Spanned {
                    node: Stmt::Assign(stmt),
                    span: start.merge(self.prev_span()),
                }))
            }
            _ => {
                if self.looks_like_property() {
                    let prop = self.parse_property()?;
                    self.eat_optional_semicolon();
                    Ok(Some(Spanned {
                        node: Stmt::Property(prop),
                        span: start.merge(self.prev_span()),
                    }))
                } else {
                    let rule_set = self.parse_rule_set()?;
                    Ok(Some(Spanned {
                        node: Stmt::RuleSet(rule_set),
                        span: start.merge(self.prev_span()),
                    }))
                }
            }
        }
    }

    fn eat_optional_semicolon(&mut self) {
        if self.peek_is_char(';') {
            self.bump();
        }
    }

    /// Property-vs-selector disambiguation (spec §4.1). Scans forward from
    /// the current position without consuming tokens: a `:` at paren-depth 0
    /// followed by a value before the next `{`/`;`/`}` marks a property; a
    /// bare `{` first marks a selector.
    fn looks_like_property(&self) -> bool {
        let mut offset = 0usize;
        let mut depth = 0i32;
        loop {
            let tok = self.peek_n(offset);
            match tok.kind {
                TokenKind::Eof => return false,
                TokenKind::Char('(') => depth += 1,
                TokenKind::Char(')') => depth -= 1,
                TokenKind::Char('{') if depth == 0 => return false,
                TokenKind::Char('}') if depth == 0 => return true,
                TokenKind::Char(';') if depth == 0 => return true,
                TokenKind::Char(':') if depth == 0 => {
                    // A colon immediately followed by an identifier with no
                    // gap is a pseudo-class colon (`&:hover`); only a colon
                    // with trailing whitespace before its value marks a
                    // property (spec §4.1).
                    let colon_high = tok.span.high();
                    let next = self.peek_n(offset + 1);
                    if next.span.low() > colon_high {
                        return true;
                    }
                }
                _ => {}
            }
            offset += 1;
            if offset > 4096 {
                return false;
            }
        }
    }

    fn parse_assignment(&mut self) -> SassResult<AssignStmt> {
        let name_tok = self.expect(TokenKind::Variable, "expected variable name")?;
        self.expect_char(':')?;
        let value = self.parse_expr()?;
        let mut default = false;
        let mut global = false;
        loop {
            if self.peek_is_char('!') {
                self.bump();
                let flag = self.expect_ident_text()?;
                match flag.as_str() {
                    "default" => default = true,
                    "global" => global = true,
                    "optional" | "important" => {}
                    other => {
                        return Err((format!("Unknown flag !{}.", other), self.prev_span()).into())
                    }
                }
                continue;
            }
            break;
        }
        Ok(AssignStmt {
            name: name_tok.text,
            value,
            default,
            global,
        })
    }

    fn parse_rule_set(&mut self) -> SassResult<RuleSet> {
        let selectors = self.parse_selector_list()?;
        let body = self.parse_braced_block()?;
        Ok(RuleSet { selectors, body })
    }

    fn parse_property(&mut self) -> SassResult<Property> {
        let name = self.parse_property_name()?;
        self.expect_char(':')?;
        if self.peek_is_char('{') {
            // nested declaration block, e.g. `border: { width: 1px; }`.
            // Parsed but discarded (spec §9 "Nested declaration blocks").
            self.parse_braced_block()?;
            return Ok(Property {
                name,
                values: Vec::new(),
            });
        }
        let value = self.parse_expr()?;
        let values = match value.node {
            Expr::List { sep: crate::common::ListSeparator::Space, items, .. } => items,
            other => vec![Spanned { node: other, span: value.span }],
        };
        Ok(Property { name, values })
    }

    fn parse_property_name(&mut self) -> SassResult<Vec<Spanned<Expr>>> {
        let mut parts = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Ident => {
                    let tok = self.bump();
                    parts.push(Spanned {
                        node: Expr::String {
                            quote: crate::common::QuoteKind::None,
                            body: tok.text,
                            contains_interpolation: false,
                        },
                        span: tok.span,
                    });
                }
                TokenKind::InterpolationStart => {
                    let span = self.current_span();
                    self.bump();
                    let inner = self.parse_expr()?;
                    self.expect(TokenKind::InterpolationEnd, "expected '}'")?;
                    parts.push(Spanned {
                        node: Expr::Interpolation(Box::new(inner)),
                        span,
                    });
                }
                TokenKind::Char('-') => {
                    let tok = self.bump();
                    parts.push(Spanned {
                        node: Expr::String {
                            quote: crate::common::QuoteKind::None,
                            body: tok.text,
                            contains_interpolation: false,
                        },
                        span: tok.span,
                    });
                }
                _ => break,
            }
        }
        if parts.is_empty() {
            return Err(("expected a property name", self.current_span()).into());
        }
        Ok(parts)
    }

    // -- at-rules --------------------------------------------------------

    fn parse_at_rule(&mut self) -> SassResult<Option<Spanned<Stmt>>> {
        let start = self.current_span();
        let tok = self.bump();
        let keyword = tok.text.to_ascii_lowercase();
        let stmt = match keyword.as_str() {
            "if" => Stmt::If(self.parse_if()?),
            "for" => Stmt::For(self.parse_for()?),
            "while" => Stmt::While(self.parse_while()?),
            "mixin" => Stmt::Mixin(self.parse_mixin()?),
            "include" => Stmt::Include(self.parse_include()?),
            "function" => Stmt::Function(self.parse_function()?),
            "return" => {
                let expr = self.parse_expr()?;
                self.eat_optional_semicolon();
                Stmt::Return(ReturnStmt(expr))
            }
            "import" => return self.parse_import(start),
            "media" => Stmt::MediaQuery(self.parse_media()?),
            "extend" => {
                let sel = self.parse_selector_list()?;
                self.eat_optional_semicolon();
                Stmt::Extend(ExtendStmt(sel))
            }
            "at-root" => {
                let body = self.parse_braced_block()?;
                Stmt::AtRoot(AtRootStmt(body))
            }
            "content" => {
                self.eat_optional_semicolon();
                Stmt::Content(ContentStmt)
            }
            "debug" => Stmt::Log(self.parse_log(LogLevel::Debug)?),
            "warn" => Stmt::Log(self.parse_log(LogLevel::Warn)?),
            "error" => Stmt::Log(self.parse_log(LogLevel::Error)?),
            "charset" => {
                let tok = self.expect(TokenKind::String, "expected a charset string")?;
                self.eat_optional_semicolon();
                Stmt::Charset(CharsetStmt(tok.text[1..tok.text.len() - 1].to_owned()))
            }
            "font-face" => {
                let body = self.parse_braced_block()?;
                Stmt::FontFace(FontFaceStmt(body))
            }
            "else" => {
                return Err(("'@else' with no matching '@if'", start).into());
            }
            other => {
                // Unknown at-rules (e.g. `@page`, `@supports`, vendor rules)
                // are parsed as a media-query-shaped passthrough (spec §9
                // "execute only what the conformance corpus exercises").
                let params = self.parse_at_rule_params()?;
                let body = if self.peek_is_char('{') {
                    self.parse_braced_block()?
                } else {
                    self.eat_optional_semicolon();
                    DeclBlock::new()
                };
                Stmt::MediaQuery(MediaQueryStmt {
                    query: format!("@{} {}", other, params).trim().to_owned(),
                    body,
                })
            }
        };
        Ok(Some(Spanned {
            node: stmt,
            span: start.merge(self.prev_span()),
        }))
    }

    fn parse_at_rule_params(&mut self) -> SassResult<String> {
        let start = self.cursor();
        while !self.peek_is_char('{') && !self.peek_is_char(';') && !self.is_eof() {
            self.bump();
        }
        Ok(self.text_between(start, self.cursor()))
    }

    fn parse_log(&mut self, level: LogLevel) -> SassResult<LogStmt> {
        let message = self.parse_expr()?;
        self.eat_optional_semicolon();
        Ok(LogStmt { level, message })
    }

    fn parse_if(&mut self) -> SassResult<IfStmt> {
        let cond = self.parse_expr()?;
        let body = self.parse_braced_block()?;
        let mut branches = vec![IfBranch { cond, body }];
        let mut else_body = None;

        loop {
            let mark = self.remember();
            if self.peek().kind == TokenKind::AtRule && self.peek().text.eq_ignore_ascii_case("else") {
                self.bump();
                self.skip_trivia();
                if self.peek_is_ident("if") {
                    // `@else if` appears in the source as two tokens: the
                    // lexer already split `@else` off as one `AtRule` token,
                    // so `if` here is a plain identifier.
                    self.bump();
                    let cond = self.parse_expr()?;
                    let body = self.parse_braced_block()?;
                    branches.push(IfBranch { cond, body });
                    continue;
                }
                if self.peek_is_char('{') {
                    else_body = Some(self.parse_braced_block()?);
                    break;
                }
                self.rollback(mark);
                break;
            }
            break;
        }

        Ok(IfStmt {
            branches,
            else_body,
        })
    }

    fn parse_for(&mut self) -> SassResult<ForStmt> {
        let var_tok = self.expect(TokenKind::Variable, "expected loop variable")?;
        self.expect_ident_keyword("from")?;
        let from = self.parse_expr()?;
        let inclusive = if self.peek_is_ident("through") {
            self.bump();
            true
        } else {
            self.expect_ident_keyword("to")?;
            false
        };
        let to = self.parse_expr()?;
        let body = self.parse_braced_block()?;
        Ok(ForStmt {
            variable: var_tok.text,
            from,
            to,
            inclusive,
            body,
        })
    }

    fn parse_while(&mut self) -> SassResult<WhileStmt> {
        let cond = self.parse_expr()?;
        let body = self.parse_braced_block()?;
        Ok(WhileStmt { cond, body })
    }

    fn expect_ident_keyword(&mut self, kw: &str) -> SassResult<()> {
        if self.peek_is_ident(kw) {
            self.bump();
            Ok(())
        } else {
            Err((format!("expected '{}'", kw), self.current_span()).into())
        }
    }

    fn parse_mixin(&mut self) -> SassResult<MixinStmt> {
        let name = self.expect_ident_text()?;
        let args = if self.peek_is_char('(') {
            self.parse_argument_list()?
        } else {
            crate::ast::expr::ArgumentList::default()
        };
        let body = self.parse_braced_block()?;
        let accepts_content = contains_content_stmt(&body);
        Ok(MixinStmt {
            name,
            args,
            body,
            accepts_content,
        })
    }

    fn parse_include(&mut self) -> SassResult<IncludeStmt> {
        let name = self.expect_ident_text()?;
        let args = if self.peek_is_char('(') {
            Box::new(self.parse_call_arguments()?)
        } else {
            Box::new(crate::ast::expr::CallArgs::new())
        };
        let content = if self.peek_is_char('{') {
            Some(self.parse_braced_block()?)
        } else {
            self.eat_optional_semicolon();
            None
        };
        Ok(IncludeStmt {
            name,
            args,
            content,
        })
    }

    fn parse_function(&mut self) -> SassResult<FunctionStmt> {
        let name = self.expect_ident_text()?;
        let args = self.parse_argument_list()?;
        let body = self.parse_braced_block()?;
        Ok(FunctionStmt { name, args, body })
    }

    fn parse_media(&mut self) -> SassResult<MediaQueryStmt> {
        let query = self.parse_at_rule_params()?;
        let body = self.parse_braced_block()?;
        Ok(MediaQueryStmt { query, body })
    }

    /// Distinguishes a plain CSS `@import` from an SCSS `@import`
    /// (spec §4.2 "Import parsing").
    fn parse_import(&mut self, start: Span) -> SassResult<Option<Spanned<Stmt>>> {
        let is_url_form = self.peek_is_ident("url");
        let is_css_string = self.peek().kind == TokenKind::String && {
            let tok = self.peek();
            is_css_import_target(&tok.text[1..tok.text.len() - 1])
        };

        if is_url_form || is_css_string {
            let rest_start = self.cursor();
            while !self.peek_is_char(';') && !self.is_eof() {
                self.bump();
            }
            let rest = self.text_between(rest_start, self.cursor());
            self.eat_optional_semicolon();
            return Ok(Some(Spanned {
                node: Stmt::CssImport(CssImportStmt(rest)),
                span: start.merge(self.prev_span()),
            }));
        }

        let mut paths = Vec::new();
        loop {
            let tok = self.expect(TokenKind::String, "expected an import path")?;
            paths.push(tok.text[1..tok.text.len() - 1].to_owned());
            if self.peek_is_char(',') {
                self.bump();
                continue;
            }
            break;
        }
        self.eat_optional_semicolon();
        Ok(Some(Spanned {
            node: Stmt::Import(crate::ast::ImportStmt(paths)),
            span: start.merge(self.prev_span()),
        }))
    }
}

fn is_css_import_target(name: &str) -> bool {
    name.ends_with(".css") || name.starts_with("http://") || name.starts_with("https://") || name.starts_with("//")
}

fn contains_content_stmt(body: &DeclBlock) -> bool {
    body.0.iter().any(|s| match &s.node {
        Stmt::Content(_) => true,
        Stmt::RuleSet(rs) => contains_content_stmt(&rs.body),
        Stmt::If(i) => {
            i.branches.iter().any(|b| contains_content_stmt(&b.body))
                || i.else_body.as_ref().map_or(false, contains_content_stmt)
        }
        _ => false,
    })
}
