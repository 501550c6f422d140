use std::cell::RefCell;

use codemap::{CodeMap, Span};

thread_local!(
    /// A process-wide (per-thread) codemap used to mint a placeholder span for
    /// values that are synthesized at runtime rather than read off the token
    /// stream (e.g. the result of `rgb()`, an empty selector). Mirrors the
    /// `GLOBAL_SCOPE` thread-local pattern already used for variable scoping.
    static FALLBACK_MAP: RefCell<CodeMap> = RefCell::new({
        let mut map = CodeMap::new();
        map.add_file("".into(), "".into());
        map
    })
);

/// Returns a `Span` with no useful position information, for values that have
/// no single point of origin in the source text.
pub(crate) fn fallback_span() -> Span {
    FALLBACK_MAP.with(|m| m.borrow().find_file("").unwrap().span)
}

/// Separator of a `Value::List`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSeparator {
    Space,
    Comma,
}

impl ListSeparator {
    pub const fn as_str(self) -> &'static str {
        match self {
            ListSeparator::Space => " ",
            ListSeparator::Comma => ", ",
        }
    }
}

/// Whether a list literal was written with `[ ... ]` brackets. Sass tracks
/// this even though plain CSS never prints the brackets; we carry it through
/// for round-trip fidelity of the internal representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brackets {
    None,
    Bracketed,
}

/// Combinator between two compound selectors (spec §3, GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    FollowingSibling,
}

impl Combinator {
    pub const fn as_str(self) -> &'static str {
        match self {
            Combinator::Descendant => " ",
            Combinator::Child => " > ",
            Combinator::NextSibling => " + ",
            Combinator::FollowingSibling => " ~ ",
        }
    }
}

/// Binary operators recognized by the expression grammar (spec §4.2 item 3-6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Plus,
    Minus,
    Mul,
    Div,
    Rem,
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    And,
    Or,
    Not,
}

/// Quote style of a `Value::String`/`Expr::String`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteKind {
    None,
    Single,
    Double,
}
