pub(crate) mod expr;
pub(crate) mod selector;

use codemap::Spanned;

use crate::ast::expr::{CallArgs, Expr};
use crate::ast::selector::ComplexSelectorList;

/// A block of statements, as found inside `{ ... }` (spec §3 invariant: only
/// `Property`, `RuleSet`, `IncludeStmt`, control-flow and assignment nodes
/// survive parsing into here).
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct DeclBlock(pub Vec<Spanned<Stmt>>);

impl DeclBlock {
    pub fn new() -> Self {
        DeclBlock(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RuleSet {
    pub selectors: ComplexSelectorList,
    pub body: DeclBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Property {
    pub name: Vec<Spanned<Expr>>,
    pub values: Vec<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AssignStmt {
    pub name: String,
    pub value: Spanned<Expr>,
    pub default: bool,
    pub global: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IfBranch {
    pub cond: Spanned<Expr>,
    pub body: DeclBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IfStmt {
    pub branches: Vec<IfBranch>,
    pub else_body: Option<DeclBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ForStmt {
    pub variable: String,
    pub from: Spanned<Expr>,
    pub to: Spanned<Expr>,
    pub inclusive: bool,
    pub body: DeclBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WhileStmt {
    pub cond: Spanned<Expr>,
    pub body: DeclBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MixinStmt {
    pub name: String,
    pub args: expr::ArgumentList,
    pub body: DeclBlock,
    pub accepts_content: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IncludeStmt {
    pub name: String,
    pub args: Box<CallArgs>,
    pub content: Option<DeclBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FunctionStmt {
    pub name: String,
    pub args: expr::ArgumentList,
    pub body: DeclBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReturnStmt(pub Spanned<Expr>);

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ImportStmt(pub Vec<String>);

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CssImportStmt(pub String);

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MediaQueryStmt {
    pub query: String,
    pub body: DeclBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExtendStmt(pub ComplexSelectorList);

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AtRootStmt(pub DeclBlock);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogLevel {
    Debug,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LogStmt {
    pub level: LogLevel,
    pub message: Spanned<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ContentStmt;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CharsetStmt(pub String);

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FontFaceStmt(pub DeclBlock);

/// The tagged sum of every statement kind the parser can emit (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Stmt {
    RuleSet(RuleSet),
    Assign(AssignStmt),
    If(IfStmt),
    For(ForStmt),
    While(WhileStmt),
    Mixin(MixinStmt),
    Include(IncludeStmt),
    Function(FunctionStmt),
    Return(ReturnStmt),
    Import(ImportStmt),
    CssImport(CssImportStmt),
    MediaQuery(MediaQueryStmt),
    Extend(ExtendStmt),
    AtRoot(AtRootStmt),
    Log(LogStmt),
    Content(ContentStmt),
    Charset(CharsetStmt),
    FontFace(FontFaceStmt),
    Property(Property),
}
