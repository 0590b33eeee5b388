//! Model argument resolution.
//!
//! whisper-server is started from its own directory and given the model as
//! a path relative to that directory when possible. The argument must be
//! plain ASCII: the server binary crashes on anything else, and it gives no
//! diagnostic when it does.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use super::error::PathError;

/// A model argument that is safe to pass to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModelArg {
    /// Value passed after `-m`.
    pub model_arg: String,
    /// Directory the server is started in (the executable's parent).
    pub working_dir: PathBuf,
}

/// Derive the `-m` argument for `model`, relative to the directory of `executable`.
///
/// Falls back to the absolute model path when the two live on different
/// filesystem roots (different drive letters on Windows). Fails with
/// [`PathError::UnsupportedPathEncoding`] if the result is not pure ASCII.
pub fn resolve_model_arg(executable: &Path, model: &Path) -> Result<ResolvedModelArg, PathError> {
    if !executable.is_absolute() {
        return Err(PathError::NotAbsolute(executable.to_path_buf()));
    }
    if !model.is_absolute() {
        return Err(PathError::NotAbsolute(model.to_path_buf()));
    }

    let working_dir = executable
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .ok_or_else(|| PathError::NoParentDirectory(executable.to_path_buf()))?;

    let candidate = if same_root(working_dir, model) {
        relative_path(working_dir, model)
    } else {
        model.to_path_buf()
    };

    // Invalid UTF-16/UTF-8 sequences become U+FFFD here and are rejected below
    let model_arg = candidate.to_string_lossy().into_owned();
    if !model_arg.is_ascii() {
        return Err(PathError::UnsupportedPathEncoding { path: model_arg });
    }

    Ok(ResolvedModelArg {
        model_arg,
        working_dir: working_dir.to_path_buf(),
    })
}

/// Whether two absolute paths share a filesystem root.
///
/// On Windows this compares the path prefix (`C:`, `\\server\share`)
/// case-insensitively. Unix has a single root, so any two absolute paths match.
pub fn same_root(a: &Path, b: &Path) -> bool {
    match (root_prefix(a), root_prefix(b)) {
        (Some(x), Some(y)) => names_equal(x, y),
        (None, None) => true,
        _ => false,
    }
}

fn root_prefix(path: &Path) -> Option<&OsStr> {
    match path.components().next() {
        Some(Component::Prefix(prefix)) => Some(prefix.as_os_str()),
        _ => None,
    }
}

/// Lexical relative path from `base_dir` to `target`.
///
/// `.` segments are dropped and `..` segments are folded before comparing.
/// Returns `.` when both name the same location.
pub fn relative_path(base_dir: &Path, target: &Path) -> PathBuf {
    let base = normalize(base_dir);
    let target = normalize(target);

    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| names_equal(a, b))
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for part in &target[common..] {
        relative.push(part);
    }

    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}

fn normalize(path: &Path) -> Vec<&OsStr> {
    let mut parts: Vec<&OsStr> = Vec::new();
    let mut anchored = 0;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                parts.push(component.as_os_str());
                anchored = parts.len();
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.len() > anchored {
                    parts.pop();
                }
            }
            Component::Normal(name) => parts.push(name),
        }
    }

    parts
}

#[cfg(windows)]
fn names_equal(a: &OsStr, b: &OsStr) -> bool {
    a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
}

#[cfg(not(windows))]
fn names_equal(a: &OsStr, b: &OsStr) -> bool {
    a == b
}
