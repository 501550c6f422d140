//! Import name resolution (spec §4.7), grounded on
//! `original_source/util/resolve.go`.

use crate::error::SassResult;
use crate::fs::{basename, dirname, join, Fs};

const IMPORT_EXTENSIONS: [&str; 2] = [".import.scss", ".import.sass"];
const EXTENSIONS: [&str; 3] = [".scss", ".sass", ".css"];

fn has_supported_extension(name: &str) -> bool {
    IMPORT_EXTENSIONS.iter().chain(EXTENSIONS.iter()).any(|ext| name.ends_with(ext))
}

/// Resolve `import_name`, written inside `source_file`, to a concrete path in
/// `fsys`. Implements the cascade of spec §4.7 verbatim.
pub(crate) fn resolve(
    source_file: &str,
    import_name: &str,
    fsys: &dyn Fs,
) -> SassResult<String> {
    let base = dirname(source_file);
    let dir = dirname(import_name);
    let leaf = basename(import_name);
    let span = crate::common::fallback_span();

    // Step 1: explicit extension -- strict, no further probing either way.
    if has_supported_extension(import_name) {
        let full = join(&base, import_name);
        if fsys.is_file(&full) {
            return Ok(full);
        }
        if fsys.is_dir(&full) {
            return Err(crate::error::SassError::import(
                format!("cannot import directory with extension '{}'", import_name),
                span,
            ));
        }
        return Err(crate::error::SassError::import(
            format!("could not find file '{}' relative to '{}'", import_name, source_file),
            span,
        ));
    }

    let dir_base = join(&base, &dir);

    // Step 2: partial-extension sibling files.
    for ext in IMPORT_EXTENSIONS {
        for prefix in ["", "_"] {
            let candidate = join(&dir_base, &format!("{}{}{}", prefix, leaf, ext));
            if fsys.is_file(&candidate) {
                return Ok(candidate);
            }
        }
    }

    // Step 3: nested index files, only when the import name has a `/`.
    if import_name.contains('/') {
        let nested_dir = join(&dir_base, &leaf);
        if fsys.is_dir(&nested_dir) {
            for prefix in ["_index", "index"] {
                for ext in IMPORT_EXTENSIONS {
                    let candidate = join(&nested_dir, &format!("{}{}", prefix, ext));
                    if fsys.is_file(&candidate) {
                        return Ok(candidate);
                    }
                }
            }
            for prefix in ["_index", "index"] {
                for ext in [".scss", ".sass"] {
                    let candidate = join(&nested_dir, &format!("{}{}", prefix, ext));
                    if fsys.is_file(&candidate) {
                        return Ok(candidate);
                    }
                }
            }
        }
    }

    // Step 4: plain extensions.
    for ext in EXTENSIONS {
        for prefix in ["", "_"] {
            let candidate = join(&dir_base, &format!("{}{}{}", prefix, leaf, ext));
            if fsys.is_file(&candidate) {
                return Ok(candidate);
            }
        }
    }

    // Step 5: index files directly under `base/import_name`.
    let dir_path = join(&base, import_name);
    if fsys.is_dir(&dir_path) {
        for prefix in ["_index", "index"] {
            for ext in IMPORT_EXTENSIONS {
                let candidate = join(&dir_path, &format!("{}{}", prefix, ext));
                if fsys.is_file(&candidate) {
                    return Ok(candidate);
                }
            }
        }
        for prefix in ["_index", "index"] {
            for ext in [".scss", ".sass"] {
                let candidate = join(&dir_path, &format!("{}{}", prefix, ext));
                if fsys.is_file(&candidate) {
                    return Ok(candidate);
                }
            }
        }
    }

    Err(crate::error::SassError::import(
        format!(
            "could not resolve import path '{}' relative to '{}': no such file or directory",
            import_name, source_file
        ),
        span,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;

    #[test]
    fn resolves_partial_sibling() {
        let mut fsys = MemoryFileSystem::new();
        fsys.add("a.scss", "");
        fsys.add("_b.scss", "");
        assert_eq!(resolve("a.scss", "b", &fsys).unwrap(), "_b.scss");
    }

    #[test]
    fn resolves_nested_index() {
        let mut fsys = MemoryFileSystem::new();
        fsys.add("a.scss", "");
        fsys.add("foo/_index.scss", "");
        assert_eq!(resolve("a.scss", "foo", &fsys).unwrap(), "foo/_index.scss");
    }

    #[test]
    fn rejects_directory_with_extension() {
        let mut fsys = MemoryFileSystem::new();
        fsys.add("a.scss", "");
        fsys.add("with.dots.scss/_index.scss", "");
        assert!(resolve("a.scss", "with.dots.scss", &fsys).is_err());
    }

    #[test]
    fn explicit_extension_does_not_fall_through() {
        let mut fsys = MemoryFileSystem::new();
        fsys.add("a.scss", "");
        // Only the underscored partial exists, not the exact name -- since
        // an explicit extension was given, we must not probe further.
        fsys.add("_b.scss", "");
        assert!(resolve("a.scss", "b.scss", &fsys).is_err());
    }
}
