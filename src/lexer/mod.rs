//! The lexer (spec §4.1): a state machine over the source bytes that emits
//! an immutable token stream consumed once by the parser (spec §9 "do not
//! stream tokens one-at-a-time into the parser" -- so we materialize the
//! whole `Vec<Token>` up front here rather than exposing an `Iterator`).

use std::sync::Arc;

use codemap::{File, Span};

use crate::error::SassResult;
use crate::token::{Token, TokenKind};

const UNITS: &[&str] = &[
    "px", "em", "rem", "pt", "ex", "cm", "mm", "in", "pc", "vh", "vw", "vmin", "vmax", "deg",
    "rad", "grad", "turn", "s", "ms", "fr", "ch", "q",
];

pub(crate) struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    file: Arc<File>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file: Arc<File>) -> Self {
        Lexer {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            file,
        }
    }

    fn span(&self, start: usize, end: usize) -> Span {
        self.file.span.subspan(start as u64, end as u64)
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(offset)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.source[self.pos..].starts_with(s)
    }

    pub fn tokenize(mut self) -> SassResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            match self.peek() {
                None => break,
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.starts_with("//") => self.eat_line_comment(),
                Some('/') if self.starts_with("/*") => {
                    let tok = self.eat_block_comment()?;
                    tokens.push(tok);
                }
                Some('#') if self.starts_with("#{") => {
                    tokens.extend(self.eat_interpolation()?);
                }
                Some('$') => tokens.push(self.eat_variable()?),
                Some('@') => tokens.push(self.eat_at_keyword()?),
                Some('"') | Some('\'') => tokens.push(self.eat_string()?),
                Some('#') => tokens.push(self.eat_hex_color()?),
                Some(c) if c.is_ascii_digit() || (c == '.' && self.peek_at(1).map_or(false, |d| d.is_ascii_digit())) => {
                    tokens.push(self.eat_number()?);
                }
                Some(c) if is_ident_start(c) => tokens.push(self.eat_ident()),
                Some(c) => {
                    let start = self.pos;
                    self.bump();
                    tokens.push(Token::new(
                        TokenKind::Char(c),
                        c.to_string(),
                        self.span(start, self.pos),
                    ));
                }
            }
        }
        let eof_span = self.span(self.pos, self.pos);
        tokens.push(Token::new(TokenKind::Eof, String::new(), eof_span));
        Ok(tokens)
    }

    fn eat_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn eat_block_comment(&mut self) -> SassResult<Token> {
        let start = self.pos;
        self.bump();
        self.bump();
        loop {
            match self.peek() {
                None => {
                    return Err(("unterminated block comment", self.span(start, self.pos)).into())
                }
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.bump();
                    self.bump();
                    break;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        let text = self.source[start..self.pos].to_owned();
        Ok(Token::new(TokenKind::Comment, text, self.span(start, self.pos)))
    }

    fn eat_variable(&mut self) -> SassResult<Token> {
        let start = self.pos;
        self.bump(); // `$`
        while let Some(c) = self.peek() {
            if is_ident_char(c) {
                self.bump();
            } else {
                break;
            }
        }
        if self.pos == start + 1 {
            return Err(("expected identifier after '$'", self.span(start, self.pos)).into());
        }
        let text = self.source[start + 1..self.pos].to_owned();
        Ok(Token::new(TokenKind::Variable, text, self.span(start, self.pos)))
    }

    fn eat_at_keyword(&mut self) -> SassResult<Token> {
        let start = self.pos;
        self.bump(); // `@`
        while let Some(c) = self.peek() {
            if is_ident_char(c) {
                self.bump();
            } else {
                break;
            }
        }
        if self.pos == start + 1 {
            return Err(("expected identifier after '@'", self.span(start, self.pos)).into());
        }
        let text = self.source[start + 1..self.pos].to_owned();
        Ok(Token::new(TokenKind::AtRule, text, self.span(start, self.pos)))
    }

    fn eat_string(&mut self) -> SassResult<Token> {
        let start = self.pos;
        let quote = self.bump().unwrap();
        let mut contains_interpolation = false;
        loop {
            match self.peek() {
                None => return Err(("unterminated string", self.span(start, self.pos)).into()),
                Some(c) if c == quote => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some('#') if self.peek_at(1) == Some('{') => {
                    contains_interpolation = true;
                    self.bump();
                    self.bump();
                    let mut depth = 1;
                    while depth > 0 {
                        match self.bump() {
                            None => {
                                return Err(("unterminated interpolation in string", self.span(start, self.pos)).into())
                            }
                            Some('{') => depth += 1,
                            Some('}') => depth -= 1,
                            _ => {}
                        }
                    }
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        let text = self.source[start..self.pos].to_owned();
        Ok(Token::new(TokenKind::String, text, self.span(start, self.pos))
            .with_interpolation(contains_interpolation))
    }

    fn eat_hex_color(&mut self) -> SassResult<Token> {
        let start = self.pos;
        self.bump(); // `#`
        let digit_start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_hexdigit() {
                self.bump();
            } else {
                break;
            }
        }
        let len = self.pos - digit_start;
        if !matches!(len, 3 | 4 | 6 | 8) {
            return Err((
                format!("expected 3, 4, 6, or 8 hex digits in color literal, found {}", len),
                self.span(start, self.pos),
            )
                .into());
        }
        let text = self.source[start..self.pos].to_owned();
        Ok(Token::new(TokenKind::HexColor, text, self.span(start, self.pos)))
    }

    fn eat_number(&mut self) -> SassResult<Token> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.bump();
            } else {
                break;
            }
        }
        if self.peek() == Some('.') && self.peek_at(1).map_or(false, |c| c.is_ascii_digit()) {
            self.bump();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let save = self.pos;
            self.bump();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.bump();
            }
            if self.peek().map_or(false, |c| c.is_ascii_digit()) {
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        self.bump();
                    } else {
                        break;
                    }
                }
            } else {
                self.pos = save;
            }
        }
        // optional unit: a known unit, or `%`.
        if self.peek() == Some('%') {
            self.bump();
        } else {
            for unit in UNITS {
                if self.starts_with(unit) {
                    let after = self.pos + unit.len();
                    let follows_ident = self.source[after..].chars().next().map_or(false, is_ident_char);
                    if !follows_ident {
                        self.pos = after;
                        break;
                    }
                }
            }
        }
        let text = self.source[start..self.pos].to_owned();
        Ok(Token::new(TokenKind::Number, text, self.span(start, self.pos)))
    }

    fn eat_ident(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_ident_char(c) {
                self.bump();
            } else if c == '#' && self.peek_at(1) == Some('{') {
                // interpolation island inside an identifier, e.g. `.foo-#{$i}`
                self.bump();
                self.bump();
                let mut depth = 1;
                while depth > 0 {
                    match self.bump() {
                        None => break,
                        Some('{') => depth += 1,
                        Some('}') => depth -= 1,
                        _ => {}
                    }
                }
            } else {
                break;
            }
        }
        let text = self.source[start..self.pos].to_owned();
        Token::new(TokenKind::Ident, text, self.span(start, self.pos))
            .with_interpolation(text.contains("#{"))
    }

    /// Lexes `#{ ... }` as `InterpolationStart`, the inner tokens (recursively
    /// lexed in expression context), `InterpolationEnd` (spec §4.1).
    fn eat_interpolation(&mut self) -> SassResult<Vec<Token>> {
        let mut out = Vec::new();
        let start = self.pos;
        self.bump();
        self.bump();
        out.push(Token::new(
            TokenKind::InterpolationStart,
            "#{".to_owned(),
            self.span(start, self.pos),
        ));

        let inner_start = self.pos;
        let mut depth = 1;
        while depth > 0 {
            match self.peek() {
                None => return Err(("unterminated interpolation", self.span(start, self.pos)).into()),
                Some('{') => {
                    depth += 1;
                    self.bump();
                }
                Some('}') => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    self.bump();
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        let inner_src = &self.source[inner_start..self.pos];
        let inner_lexer = Lexer::new(inner_src, Arc::clone(&self.file));
        let mut inner_tokens = inner_lexer.tokenize()?;
        inner_tokens.pop(); // drop the inner Eof
        out.extend(inner_tokens);

        let end_start = self.pos;
        self.bump(); // `}`
        out.push(Token::new(
            TokenKind::InterpolationEnd,
            "}".to_owned(),
            self.span(end_start, self.pos),
        ));
        Ok(out)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

/// Top-level entry point: lex `source` (already registered as `file` in a
/// `codemap::CodeMap`) into a flat token vector.
pub(crate) fn lex(source: &str, file: Arc<File>) -> SassResult<Vec<Token>> {
    Lexer::new(source, file).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemap::CodeMap;

    fn lex_str(s: &str) -> Vec<Token> {
        let mut map = CodeMap::new();
        let file = map.add_file("test.scss".into(), s.into());
        lex(s, file).unwrap()
    }

    #[test]
    fn lexes_number_with_unit() {
        let toks = lex_str("12px");
        assert_eq!(toks[0].kind, TokenKind::Number);
        assert_eq!(toks[0].text, "12px");
    }

    #[test]
    fn lex_parse_idempotence_of_positions() {
        let src = "$a: 1px + 2em;";
        let toks = lex_str(src);
        for tok in &toks {
            if tok.kind == TokenKind::Eof {
                continue;
            }
            let (lo, hi) = (tok.span.low(), tok.span.high());
            assert_eq!(&src[lo as usize..hi as usize], tok.text);
        }
    }

    #[test]
    fn rejects_bad_hex_length() {
        let mut map = CodeMap::new();
        let file = map.add_file("test.scss".into(), "#ab".into());
        assert!(lex("#ab", file).is_err());
    }
}
