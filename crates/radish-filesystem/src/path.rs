//! Path helpers shared by the pak engine and resource providers

use std::path::{Path, PathBuf};

/// Fold a logical path into its lookup key
///
/// Logical paths are compared without regard to case.
pub fn normalize_logical_path(path: &str) -> String {
    path.to_lowercase()
}

/// File name without its final extension, or an empty string
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Containing directory, or an empty path for bare file names
pub fn directory_name(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Remove `suffix` from the end of `s` once, if present
pub fn trim_suffix<'a>(s: &'a str, suffix: &str) -> &'a str {
    s.strip_suffix(suffix).unwrap_or(s)
}
