//! The filesystem contract consumed by the import resolver (spec §6
//! "Filesystem contract (consumed)"). The core only ever reads; it never
//! writes or watches. Implementations must be safe to use concurrently
//! across files even though this crate itself is single-threaded (spec §5).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
}

/// Abstract read-only directory (spec §6). Implement this to compile from
/// sources other than the local disk (embedded assets, a virtual file tree).
pub trait Fs: std::fmt::Debug {
    fn stat(&self, path: &str) -> Option<FileKind>;
    fn read(&self, path: &str) -> std::io::Result<String>;

    fn is_file(&self, path: &str) -> bool {
        self.stat(path) == Some(FileKind::File)
    }

    fn is_dir(&self, path: &str) -> bool {
        self.stat(path) == Some(FileKind::Directory)
    }
}

/// Backs reads with the real operating-system filesystem, the way the
/// teacher's `StyleSheet::from_path` calls `std::fs::read` directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl Fs for RealFileSystem {
    fn stat(&self, path: &str) -> Option<FileKind> {
        let meta = fs::metadata(path).ok()?;
        Some(if meta.is_dir() {
            FileKind::Directory
        } else {
            FileKind::File
        })
    }

    fn read(&self, path: &str) -> std::io::Result<String> {
        fs::read_to_string(path)
    }
}

/// An in-memory filesystem for tests and for embedding compilation in a
/// context where files aren't addressable on disk. Paths are always
/// slash-separated (spec §6).
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: BTreeMap<String, String>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        MemoryFileSystem {
            files: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(normalize(&path.into()), contents.into());
    }
}

fn normalize(path: &str) -> String {
    PathBuf::from(path)
        .to_string_lossy()
        .replace('\\', "/")
}

impl Fs for MemoryFileSystem {
    fn stat(&self, path: &str) -> Option<FileKind> {
        let path = normalize(path);
        if self.files.contains_key(&path) {
            return Some(FileKind::File);
        }
        let prefix = format!("{}/", path.trim_end_matches('/'));
        if self.files.keys().any(|k| k.starts_with(&prefix)) {
            return Some(FileKind::Directory);
        }
        None
    }

    fn read(&self, path: &str) -> std::io::Result<String> {
        let path = normalize(path);
        self.files.get(&path).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("no such file: {}", path))
        })
    }
}

pub(crate) fn dirname(path: &str) -> String {
    match Path::new(path).parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_string_lossy().replace('\\', "/"),
        _ => ".".to_owned(),
    }
}

pub(crate) fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn join(base: &str, child: &str) -> String {
    if child.is_empty() {
        return base.to_owned();
    }
    if base.is_empty() || base == "." {
        return child.to_owned();
    }
    format!("{}/{}", base.trim_end_matches('/'), child)
}
