//! Selector parsing (spec §4.2 "Selector parsing").

use crate::ast::selector::{
    ComplexSelector, ComplexSelectorItem, ComplexSelectorList, CompoundSelector, SimpleSelector,
};
use crate::common::Combinator;
use crate::error::SassResult;
use crate::parser::Parser;
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    /// A comma separated list of complex selectors.
    pub(crate) fn parse_selector_list(&mut self) -> SassResult<ComplexSelectorList> {
        let mut out = vec![self.parse_complex_selector()?];
        while self.peek_is_char(',') {
            self.bump();
            self.skip_trivia();
            out.push(self.parse_complex_selector()?);
        }
        Ok(ComplexSelectorList(out))
    }

    fn parse_complex_selector(&mut self) -> SassResult<ComplexSelector> {
        let mut items = Vec::new();

        // A leading combinator is allowed (spec §4.2), becoming an item with
        // no compound.
        if let Some(comb) = self.try_parse_combinator() {
            items.push(ComplexSelectorItem {
                combinator: Some(comb),
                compound: None,
            });
            self.skip_trivia();
        }

        loop {
            let compound = self.parse_compound_selector()?;
            items.push(ComplexSelectorItem {
                combinator: None,
                compound: Some(compound),
            });

            let had_space = self.skip_trivia();
            if let Some(comb) = self.try_parse_combinator() {
                items.push(ComplexSelectorItem {
                    combinator: Some(comb),
                    compound: None,
                });
                self.skip_trivia();
                continue;
            }
            if had_space && self.starts_compound_selector() {
                // whitespace between two compounds with no explicit symbol
                // is itself the descendant combinator (spec §4.1 "Selectors"
                // state).
                items.push(ComplexSelectorItem {
                    combinator: Some(Combinator::Descendant),
                    compound: None,
                });
                continue;
            }
            break;
        }

        // merge adjacent (combinator, None) / (None, Some(compound)) pairs
        // produced above into single items, matching the AST shape of §3.
        Ok(merge_items(items))
    }

    fn try_parse_combinator(&mut self) -> Option<Combinator> {
        match self.peek().kind {
            TokenKind::Char('>') => {
                self.bump();
                Some(Combinator::Child)
            }
            TokenKind::Char('+') => {
                self.bump();
                Some(Combinator::NextSibling)
            }
            TokenKind::Char('~') => {
                self.bump();
                Some(Combinator::FollowingSibling)
            }
            _ => None,
        }
    }

    fn starts_compound_selector(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Ident
                | TokenKind::HexColor
                | TokenKind::InterpolationStart
                | TokenKind::Char('.')
                | TokenKind::Char('#')
                | TokenKind::Char('*')
                | TokenKind::Char('&')
                | TokenKind::Char('[')
                | TokenKind::Char(':')
        )
    }

    fn parse_compound_selector(&mut self) -> SassResult<CompoundSelector> {
        let mut simples = Vec::new();
        let mut first = true;
        loop {
            match self.peek().kind {
                TokenKind::Char('&') => {
                    if !first {
                        return Err((
                            "the parent selector '&' is only allowed at the start of a compound selector",
                            self.current_span(),
                        )
                            .into());
                    }
                    self.bump();
                    simples.push(SimpleSelector::Parent);
                }
                TokenKind::Char('*') => {
                    self.bump();
                    simples.push(SimpleSelector::Universal);
                }
                TokenKind::Char('.') => {
                    self.bump();
                    let name = self.expect_ident_text()?;
                    simples.push(SimpleSelector::Class(name));
                }
                TokenKind::Char('#') => {
                    self.bump();
                    let name = self.expect_ident_text()?;
                    simples.push(SimpleSelector::Id(name));
                }
                TokenKind::Char('[') => {
                    simples.push(self.parse_attribute_selector()?);
                }
                TokenKind::Char(':') => {
                    simples.push(self.parse_pseudo_selector()?);
                }
                TokenKind::Ident => {
                    let tok = self.bump();
                    simples.push(SimpleSelector::Type(tok.text));
                }
                TokenKind::InterpolationStart => {
                    let expr = self.parse_interpolation_island_expr()?;
                    simples.push(SimpleSelector::Interpolation(Box::new(expr.node)));
                }
                _ => break,
            }
            first = false;
        }
        if simples.is_empty() {
            return Err(("expected a selector", self.current_span()).into());
        }
        Ok(CompoundSelector(simples))
    }

    fn parse_interpolation_island_expr(&mut self) -> SassResult<codemap::Spanned<crate::ast::expr::Expr>> {
        self.expect(TokenKind::InterpolationStart, "expected '#{'")?;
        let inner = self.parse_expr()?;
        self.expect(TokenKind::InterpolationEnd, "expected '}'")?;
        Ok(inner)
    }

    fn parse_attribute_selector(&mut self) -> SassResult<SimpleSelector> {
        self.expect_char('[')?;
        let name = self.expect_ident_text()?;
        let op = match self.peek().kind {
            TokenKind::Char('=') => {
                self.bump();
                Some("=".to_owned())
            }
            TokenKind::Char('~') if self.peek_n(1).is_char('=') => {
                self.bump();
                self.bump();
                Some("~=".to_owned())
            }
            TokenKind::Char('|') if self.peek_n(1).is_char('=') => {
                self.bump();
                self.bump();
                Some("|=".to_owned())
            }
            TokenKind::Char('^') if self.peek_n(1).is_char('=') => {
                self.bump();
                self.bump();
                Some("^=".to_owned())
            }
            TokenKind::Char('$') if self.peek_n(1).is_char('=') => {
                self.bump();
                self.bump();
                Some("$=".to_owned())
            }
            TokenKind::Char('*') if self.peek_n(1).is_char('=') => {
                self.bump();
                self.bump();
                Some("*=".to_owned())
            }
            _ => None,
        };
        let value = if op.is_some() {
            Some(self.parse_attribute_value()?)
        } else {
            None
        };
        self.expect_char(']')?;
        Ok(SimpleSelector::Attribute { name, op, value })
    }

    fn parse_attribute_value(&mut self) -> SassResult<String> {
        match self.peek().kind {
            TokenKind::String => {
                let tok = self.bump();
                Ok(tok.text[1..tok.text.len() - 1].to_owned())
            }
            _ => self.expect_ident_text(),
        }
    }

    fn parse_pseudo_selector(&mut self) -> SassResult<SimpleSelector> {
        self.expect_char(':')?;
        if self.peek_is_char(':') {
            self.bump();
        }
        let name = self.expect_ident_text()?;
        if self.peek_is_char('(') {
            self.bump();
            let mut depth = 1;
            let start = self.current_span();
            let args_start = self.cursor();
            while depth > 0 {
                match self.peek().kind {
                    TokenKind::Char('(') => depth += 1,
                    TokenKind::Char(')') => depth -= 1,
                    TokenKind::Eof => {
                        return Err(("unterminated functional pseudo-class", start).into())
                    }
                    _ => {}
                }
                if depth > 0 {
                    self.bump();
                }
            }
            let args = self.text_between(args_start, self.cursor());
            self.expect_char(')')?;
            return Ok(SimpleSelector::FunctionalPseudo { name, args });
        }
        Ok(SimpleSelector::Pseudo(name))
    }
}

/// Folds the linear `(combinator?, compound?)` stream produced by
/// `parse_complex_selector` into the `ComplexSelectorItem` shape where a
/// combinator and the compound it precedes live in the same item, matching
/// the `ComplexSelector` invariant of spec §3.
fn merge_items(items: Vec<ComplexSelectorItem>) -> ComplexSelector {
    let mut out: Vec<ComplexSelectorItem> = Vec::new();
    let mut pending_combinator: Option<Combinator> = None;
    let mut leading = true;
    for item in items {
        match (item.combinator, item.compound) {
            (Some(c), None) => pending_combinator = Some(c),
            (None, Some(compound)) => {
                out.push(ComplexSelectorItem {
                    combinator: if leading { None } else { pending_combinator.take() },
                    compound: Some(compound),
                });
                leading = false;
            }
            _ => unreachable!("merge_items only sees pure combinator or pure compound items"),
        }
    }
    if let Some(c) = pending_combinator {
        out.push(ComplexSelectorItem {
            combinator: Some(c),
            compound: None,
        });
    }
    ComplexSelector(out)
}
