//! Lexical helpers for `/`-separated paths relative to the build root.
//!
//! Addresses and manifest entries refer to files by build-root-relative
//! strings, so these helpers never touch the filesystem.

use std::path::Path;

/// Join two relative paths, treating an empty base as the build root.
pub fn join(base: &str, rel: &str) -> String {
    if base.is_empty() || base == "." {
        normalize(rel)
    } else if rel.is_empty() {
        normalize(base)
    } else {
        normalize(&format!("{}/{}", base, rel))
    }
}

/// Everything before the final `/`, or `""` for a bare file name.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Everything after the final `/`.
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Collapse `.` and `..` segments and redundant separators.
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Compute `path` relative to `start` without filesystem access.
/// Returns `"."` when both are the same location.
pub fn relpath(path: &str, start: &str) -> String {
    let path = normalize(path);
    let start = normalize(start);
    let path_parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let start_parts: Vec<&str> = start.split('/').filter(|s| !s.is_empty()).collect();

    let common = path_parts
        .iter()
        .zip(start_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = std::iter::repeat("..").take(start_parts.len() - common).collect();
    parts.extend(&path_parts[common..]);

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Render a filesystem path under `root` as a `/`-separated relative string.
///
/// Returns `None` when `path` is not inside `root`.
pub fn to_relative_string(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

#[cfg(test)]
#[path = "paths_test.rs"]
mod tests;
