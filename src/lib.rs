//! # grasscss
//! A single-pass SCSS-to-CSS compiler: lex, parse, execute, flatten nested
//! rule sets, pretty-print.
//!
//! All functionality is exposed through [`StyleSheet`] and [`Options`].
//!
//! ## Use as library
//! ```no_run
//! use std::io::{BufWriter, stdout};
//! use grasscss::{SassResult, StyleSheet};
//!
//! fn main() -> SassResult<()> {
//!     let mut buf = BufWriter::new(stdout());
//!     StyleSheet::from_path("input.scss")?.print_as_css(&mut buf)
//! }
//! ```
//!
//! ## Use as binary
//! ```bash
//! cargo install grasscss
//! grass input.scss
//! ```

use std::fmt::{self, Display};
use std::io::Write;
use std::path::Path;

pub use crate::error::{SassError, SassResult};
pub use crate::fs::{FileKind, Fs, MemoryFileSystem, RealFileSystem};

pub(crate) mod ast;
pub(crate) mod builtin;
pub(crate) mod color;
pub(crate) mod common;
pub(crate) mod error;
pub(crate) mod format;
pub(crate) mod fs;
pub(crate) mod imports;
pub(crate) mod lexer;
pub(crate) mod parser;
pub(crate) mod runtime;
pub(crate) mod scope;
pub(crate) mod token;
pub(crate) mod unit;
pub(crate) mod value;

/// Knobs for a single compilation job (spec §6): which filesystem to read
/// imports from, and where `@debug`/`@warn` output goes. Defaults to the
/// real OS filesystem and `eprintln!`-based printers, the way the teacher's
/// bare `StyleSheet::new`/`from_path` constructors behaved before this callback
/// contract existed.
pub struct Options<'a> {
    fs: &'a dyn Fs,
    debug_print: Box<dyn FnMut(&str) + 'a>,
    warn_print: Box<dyn FnMut(&str) + 'a>,
}

impl<'a> Options<'a> {
    #[inline]
    pub fn new() -> Self {
        Options {
            fs: &RealFileSystem,
            debug_print: Box::new(|msg| eprintln!("Debug: {}", msg)),
            warn_print: Box::new(|msg| eprintln!("Warning: {}", msg)),
        }
    }

    #[inline]
    #[must_use]
    pub fn fs(mut self, fs: &'a dyn Fs) -> Self {
        self.fs = fs;
        self
    }

    #[inline]
    #[must_use]
    pub fn debug_callback(mut self, callback: impl FnMut(&str) + 'a) -> Self {
        self.debug_print = Box::new(callback);
        self
    }

    #[inline]
    #[must_use]
    pub fn warn_callback(mut self, callback: impl FnMut(&str) + 'a) -> Self {
        self.warn_print = Box::new(callback);
        self
    }
}

impl<'a> Default for Options<'a> {
    #[inline]
    fn default() -> Self {
        Options::new()
    }
}

impl<'a> std::fmt::Debug for Options<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options").finish_non_exhaustive()
    }
}

/// A compiled stylesheet: already-rendered CSS text (spec §4.6-§6 pipeline
/// run to completion). Holding the rendered string rather than the AST
/// keeps the public surface a thin print target, matching the teacher's own
/// `StyleSheet` + `print_as_css`/`Display` contract.
#[derive(Debug, Clone)]
pub struct StyleSheet(String);

impl Display for StyleSheet {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StyleSheet {
    /// Compiles `input` as if it were a file named `stdin`, using the
    /// default [`Options`].
    #[inline]
    pub fn new(input: &str) -> SassResult<StyleSheet> {
        Self::compile_with(input, "stdin", Options::new())
    }

    /// Compiles `input` under `options` (custom filesystem and/or
    /// `@debug`/`@warn` callbacks), as if it were a file named `stdin`.
    #[inline]
    pub fn new_with_options(input: &str, options: Options<'_>) -> SassResult<StyleSheet> {
        Self::compile_with(input, "stdin", options)
    }

    /// Reads and compiles the file at `p` from the real filesystem.
    #[inline]
    pub fn from_path(p: impl AsRef<Path>) -> SassResult<StyleSheet> {
        let path = p.as_ref();
        let filename = path.to_string_lossy().into_owned();
        let contents = std::fs::read_to_string(path)?;
        Self::compile_with(&contents, &filename, Options::new())
    }

    /// Reads and compiles `path` through `options.fs`, so it can resolve
    /// against a [`MemoryFileSystem`] or any other custom [`Fs`].
    #[inline]
    pub fn from_path_with_options(path: &str, options: Options<'_>) -> SassResult<StyleSheet> {
        let contents = options.fs.read(path)?;
        Self::compile_with(&contents, path, options)
    }

    fn compile_with(source: &str, filename: &str, options: Options<'_>) -> SassResult<StyleSheet> {
        let Options {
            fs,
            debug_print,
            warn_print,
        } = options;
        let rt = runtime::Runtime::new(fs, debug_print, warn_print);
        let groups = runtime::compile(&rt, source, filename)?;
        let css = format::print_stylesheet(&groups)?;
        Ok(StyleSheet(css))
    }

    /// Writes the already-rendered CSS to `buf`.
    ///
    /// ```no_run
    /// use std::io::{BufWriter, stdout};
    /// use grasscss::{SassResult, StyleSheet};
    ///
    /// fn main() -> SassResult<()> {
    ///     let mut buf = BufWriter::new(stdout());
    ///     StyleSheet::from_path("input.scss")?.print_as_css(&mut buf)
    /// }
    /// ```
    #[inline]
    pub fn print_as_css<W: Write>(self, buf: &mut W) -> SassResult<()> {
        buf.write_all(self.0.as_bytes())?;
        Ok(())
    }
}
