//! Ties scope, evaluation, execution, and tree expansion together into a
//! single compilation job (spec §5 "Scheduling model": lex → parse →
//! execute → expand → print, sequentially, single-threaded).

pub(crate) mod eval;
pub(crate) mod execute;
pub(crate) mod expand;

use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::Arc;

use codemap::{CodeMap, Spanned};

use crate::ast::Stmt;
use crate::error::SassResult;
use crate::fs::Fs;
use crate::scope::Scope;

/// Per-job state threaded through evaluation and execution: the filesystem
/// abstraction, the import-cycle guard, and the `@debug`/`@warn`/`@content`
/// printer and content-block contracts (spec §5, §6).
pub(crate) struct Runtime<'a> {
    pub fs: &'a dyn Fs,
    pub codemap: RefCell<CodeMap>,
    /// Resolved absolute paths currently being imported, for cycle detection
    /// (spec §5 "Import cycle prevention").
    currently_executing: RefCell<HashSet<String>>,
    debug_print: RefCell<Box<dyn FnMut(&str) + 'a>>,
    warn_print: RefCell<Box<dyn FnMut(&str) + 'a>>,
    /// Stack of content blocks available to `@content`/`content-exists()`
    /// (spec §9 "`@content` supported for mixins given a block").
    content_stack: RefCell<Vec<crate::ast::DeclBlock>>,
    /// Stack of source filenames, for `@import`'s relative resolution
    /// (spec §4.7); the entry file is pushed once by `compile`, and each
    /// nested `@import` pushes the file it resolved to for its own duration.
    file_stack: RefCell<Vec<String>>,
}

impl<'a> Runtime<'a> {
    pub fn new(
        fs: &'a dyn Fs,
        debug_print: Box<dyn FnMut(&str) + 'a>,
        warn_print: Box<dyn FnMut(&str) + 'a>,
    ) -> Self {
        Runtime {
            fs,
            codemap: RefCell::new(CodeMap::new()),
            currently_executing: RefCell::new(HashSet::new()),
            debug_print: RefCell::new(debug_print),
            warn_print: RefCell::new(warn_print),
            content_stack: RefCell::new(Vec::new()),
            file_stack: RefCell::new(Vec::new()),
        }
    }

    pub fn debug(&self, msg: &str) {
        log::debug!("{}", msg);
        (self.debug_print.borrow_mut())(msg);
    }

    pub fn warn(&self, msg: &str) {
        log::warn!("{}", msg);
        (self.warn_print.borrow_mut())(msg);
    }

    pub fn enter_import(&self, resolved_path: &str) -> bool {
        self.currently_executing
            .borrow_mut()
            .insert(resolved_path.to_owned())
    }

    pub fn exit_import(&self, resolved_path: &str) {
        self.currently_executing.borrow_mut().remove(resolved_path);
    }

    pub fn push_content(&self, block: crate::ast::DeclBlock) {
        self.content_stack.borrow_mut().push(block);
    }

    pub fn pop_content(&self) {
        self.content_stack.borrow_mut().pop();
    }

    pub fn current_content(&self) -> Option<crate::ast::DeclBlock> {
        self.content_stack.borrow().last().cloned()
    }

    pub fn has_content(&self) -> bool {
        !self.content_stack.borrow().is_empty()
    }

    pub fn push_file(&self, filename: String) {
        self.file_stack.borrow_mut().push(filename);
    }

    pub fn pop_file(&self) {
        self.file_stack.borrow_mut().pop();
    }

    pub fn current_file(&self) -> String {
        self.file_stack.borrow().last().cloned().unwrap_or_default()
    }
}

/// Parses `source` (already read from `fs` or passed in directly) under
/// `filename`, executes it against `scope`, and returns the flat, unexpanded
/// statement list (spec §4.5). Shared by the top-level entry point and
/// `@import` execution, which both need "parse then execute in the current
/// scope" (spec §9 "`@import` execution is lexically transparent").
pub(crate) fn parse_source(
    rt: &Runtime,
    source: &str,
    filename: &str,
) -> SassResult<Vec<Spanned<Stmt>>> {
    let file = rt
        .codemap
        .borrow_mut()
        .add_file(filename.to_owned(), source.to_owned());
    let file_low = file.span.low();
    let tokens = crate::lexer::lex(source, Arc::clone(&file))
        .map_err(|e| e.with_position(filename, source, file_low))?;
    let mut parser = crate::parser::Parser::new(tokens, source, file, filename.to_owned());
    parser
        .parse_stylesheet()
        .map_err(|e| e.with_position(filename, source, file_low))
}

pub(crate) fn compile(
    rt: &Runtime,
    source: &str,
    filename: &str,
) -> SassResult<Vec<expand::OutputGroup>> {
    let parsed = parse_source(rt, source, filename)?;
    let global = Scope::new();
    rt.push_file(filename.to_owned());
    let executed = execute::execute_block_flat(&parsed, &global, rt);
    rt.pop_file();
    expand::expand(&executed?, rt)
}
