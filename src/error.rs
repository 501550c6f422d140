use std::fmt;

use codemap::Span;

use crate::common::fallback_span;

/// The taxonomy of failures the pipeline can produce (spec §7). All variants
/// are fatal except the ones that never reach here (`@warn`/`@debug` go
/// through the printer callbacks directly and never become an `Err`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Parse,
    Name,
    Type,
    Range,
    Import,
    UserError,
}

#[derive(Debug, Clone)]
pub struct SassError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
    /// Filename and 1-based line/column the error's span resolves to, once
    /// a file's source text is available to resolve it against (spec.md:106
    /// "lex errors...report the line/column", :143 "parse errors carry the
    /// offending token and its line/column"). `None` until
    /// [`SassError::with_position`] attaches one, which happens for every
    /// lex/parse error as it leaves `runtime::parse_source`.
    position: Option<(String, u32, u32)>,
}

pub type SassResult<T> = Result<T, SassError>;

impl SassError {
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S, span: Span) -> Self {
        SassError {
            kind,
            message: message.into(),
            span,
            position: None,
        }
    }

    /// Resolves `self.span` into a 1-based line/column within `source` and
    /// records it alongside `filename`, the way
    /// `examples/MidasLamb-grass/src/lib.rs`'s `debug`/`warn`/`error`
    /// printers format `"{file}:{line}"`. `file_low` is the byte offset
    /// this file's text starts at within the job's `CodeMap` (see
    /// `codemap::File::span`); a span outside `[file_low, file_low +
    /// source.len())` belongs to a different file (or has no single point
    /// of origin, e.g. an I/O error) and is left unresolved. A no-op if a
    /// position is already attached.
    pub(crate) fn with_position(mut self, filename: &str, source: &str, file_low: u64) -> Self {
        if self.position.is_some() {
            return self;
        }
        let offset = self.span.low();
        if offset < file_low {
            return self;
        }
        let rel = (offset - file_low) as usize;
        if rel > source.len() {
            return self;
        }
        let prefix = &source[..rel];
        let line = prefix.matches('\n').count() as u32 + 1;
        let column = match prefix.rfind('\n') {
            Some(idx) => prefix[idx + 1..].chars().count() as u32 + 1,
            None => prefix.chars().count() as u32 + 1,
        };
        self.position = Some((filename.to_owned(), line, column));
        self
    }

    pub fn lex<S: Into<String>>(message: S, span: Span) -> Self {
        Self::new(ErrorKind::Lex, message, span)
    }

    pub fn parse<S: Into<String>>(message: S, span: Span) -> Self {
        Self::new(ErrorKind::Parse, message, span)
    }

    pub fn name<S: Into<String>>(message: S, span: Span) -> Self {
        Self::new(ErrorKind::Name, message, span)
    }

    pub fn type_<S: Into<String>>(message: S, span: Span) -> Self {
        Self::new(ErrorKind::Type, message, span)
    }

    pub fn range<S: Into<String>>(message: S, span: Span) -> Self {
        Self::new(ErrorKind::Range, message, span)
    }

    pub fn import<S: Into<String>>(message: S, span: Span) -> Self {
        Self::new(ErrorKind::Import, message, span)
    }

    pub fn user<S: Into<String>>(message: S, span: Span) -> Self {
        Self::new(ErrorKind::UserError, message, span)
    }
}

impl fmt::Display for SassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.message)?;
        if let Some((file, line, column)) = &self.position {
            write!(f, "\n{}:{}:{}", file, line, column)?;
        }
        Ok(())
    }
}

impl std::error::Error for SassError {}

impl From<(&str, Span)> for SassError {
    fn from((msg, span): (&str, Span)) -> Self {
        SassError::parse(msg, span)
    }
}

impl From<(String, Span)> for SassError {
    fn from((msg, span): (String, Span)) -> Self {
        SassError::parse(msg, span)
    }
}

impl From<std::io::Error> for SassError {
    fn from(e: std::io::Error) -> Self {
        SassError::import(e.to_string(), fallback_span())
    }
}

impl From<std::string::FromUtf8Error> for SassError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        SassError::lex(e.to_string(), fallback_span())
    }
}
