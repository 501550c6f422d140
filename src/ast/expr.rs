use codemap::Spanned;

use crate::common::{Brackets, ListSeparator, Op, QuoteKind};

/// A parsed, not-yet-evaluated expression node (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Number {
        value: f64,
        unit: Option<String>,
    },
    String {
        quote: QuoteKind,
        body: String,
        contains_interpolation: bool,
    },
    Boolean(bool),
    Null,
    HexColor(String),
    RgbColor(Box<CallArgs>),
    RgbaColor(Box<CallArgs>),
    HslColor(Box<CallArgs>),
    Variable(String),
    List {
        sep: ListSeparator,
        brackets: Brackets,
        items: Vec<Spanned<Expr>>,
    },
    Map(Vec<(Spanned<Expr>, Spanned<Expr>)>),
    BinaryExpr {
        op: Op,
        left: Box<Spanned<Expr>>,
        right: Box<Spanned<Expr>>,
        in_parens: bool,
    },
    UnaryExpr {
        op: Op,
        operand: Box<Spanned<Expr>>,
    },
    Interpolation(Box<Spanned<Expr>>),
    FunctionCall {
        name: String,
        args: Box<CallArgs>,
    },
    ListLookup {
        variable: String,
        index: i64,
    },
    ListSlice {
        variable: String,
        from_index: i64,
    },
}

impl Expr {
    pub fn in_parens(self, span: codemap::Span) -> Spanned<Expr> {
        match self {
            Expr::BinaryExpr {
                op, left, right, ..
            } => Spanned {
                node: Expr::BinaryExpr {
                    op,
                    left,
                    right,
                    in_parens: true,
                },
                span,
            },
            e => Spanned { node: e, span },
        }
    }
}

/// Declares a single mixin/function parameter (spec §4.2 "Call arguments").
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Argument {
    pub name: String,
    pub default: Option<Spanned<Expr>>,
    pub is_variadic: bool,
}

/// A prototype's full parameter list, order-preserving.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ArgumentList(pub Vec<Argument>);

/// A single argument at a call site.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CallArgument {
    pub name: Option<String>,
    pub value: Spanned<Expr>,
    pub is_variadic: bool,
}

/// The full argument list at a call site, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CallArgs(pub Vec<CallArgument>);

impl CallArgs {
    pub fn new() -> Self {
        CallArgs(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_named(&self) -> bool {
        self.0.iter().any(|a| a.name.is_some())
    }

    pub fn has_variadic(&self) -> bool {
        self.0.iter().any(|a| a.is_variadic)
    }
}
