//! Path resolution for library and include paths.
//!
//! Paths in a library map may be relative, start with `~`, or reference
//! environment variables (`$PDK_ROOT/libs/io.gds`, `${HOME}/cells.gds`).
//! [`resolve_path`] turns them into absolute, normalized paths.
//!
//! Missing targets are not an error here. Existence is checked by the
//! resolver, which reports it as an issue.

use crate::error::{LibraryMapError, Result};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("Invalid environment variable regex")
});

/// Resolve `path` against `base_folder` into an absolute path.
///
/// 1. `~` and environment variables are expanded
/// 2. a relative result is joined under `base_folder`
/// 3. symlinks in the existing part of the path are resolved, `.` is dropped and
///    `..` steps out of the directory a symlink points to, not the link's parent
///
/// # Errors
///
/// Only malformed input fails: an empty path or one containing a NUL byte.
pub fn resolve_path(path: &Utf8Path, base_folder: &Utf8Path) -> Result<Utf8PathBuf> {
    let expanded = expand_path(path.as_str())?;

    let joined = if expanded.is_absolute() {
        expanded
    } else {
        absolute_base(base_folder)?.join(expanded)
    };

    Ok(canonicalize_components(&joined))
}

/// Expand a leading `~` and any `$VAR` / `${VAR}` references.
///
/// Unknown variables are left untouched.
pub fn expand_path(path: &str) -> Result<Utf8PathBuf> {
    if path.is_empty() {
        return Err(LibraryMapError::InvalidPath {
            path: path.to_string(),
            reason: "path is empty",
        });
    }
    if path.contains('\0') {
        return Err(LibraryMapError::InvalidPath {
            path: path.to_string(),
            reason: "path contains a NUL byte",
        });
    }

    let with_home = expand_home(path)?;
    let expanded = ENV_VAR_PATTERN.replace_all(&with_home, |caps: &Captures| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
    });

    Ok(Utf8PathBuf::from(expanded.into_owned()))
}

fn expand_home(path: &str) -> Result<String> {
    let rest = if path == "~" {
        ""
    } else if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        rest
    } else {
        return Ok(path.to_string());
    };

    let Some(home) = dirs::home_dir() else {
        tracing::debug!("No home directory known, leaving {} unexpanded", path);
        return Ok(path.to_string());
    };
    let home = Utf8PathBuf::try_from(home).map_err(|e| LibraryMapError::NonUtf8Path(e.into_path_buf()))?;

    if rest.is_empty() {
        Ok(home.into_string())
    } else {
        Ok(home.join(rest).into_string())
    }
}

fn absolute_base(base_folder: &Utf8Path) -> Result<Utf8PathBuf> {
    if base_folder.is_absolute() {
        return Ok(base_folder.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| LibraryMapError::io(base_folder, e))?;
    let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| LibraryMapError::NonUtf8Path(e.into_path_buf()))?;
    Ok(cwd.join(base_folder))
}

/// Walk `path` component by component, canonicalizing before every `..`.
///
/// `path` must be absolute. A `..` at the root stays at the root.
fn canonicalize_components(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                out = canonicalize_existing_prefix(&out);
                out.pop();
            }
            other => out.push(other.as_str()),
        }
    }
    canonicalize_existing_prefix(&out)
}

/// Canonicalize the longest existing ancestor of `path` and re-append the rest.
fn canonicalize_existing_prefix(path: &Utf8Path) -> Utf8PathBuf {
    let mut existing = path;
    let mut missing: Vec<&str> = Vec::new();

    loop {
        if let Ok(canonical) = existing.canonicalize_utf8() {
            let mut result = canonical;
            for name in missing.iter().rev() {
                result.push(name);
            }
            return result;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}
