//! Canonical names for comparing catalog titles with files on disk.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Component, Path};

lazy_static! {
    static ref ILLEGAL: Regex = Regex::new(r#"[/:*?"<>|]"#).unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Replaces path-illegal characters with a space, collapses whitespace and trims.
pub fn normalize(text: &str) -> String {
    let replaced = ILLEGAL.replace_all(text, " ");
    WHITESPACE.replace_all(&replaced, " ").trim().to_string()
}

/// Folder name for a playlist, or `None` when the normalized name is empty
/// or would not stay a single directory below the library root (`.`, `..`).
pub fn folder_name(playlist_name: &str) -> Option<String> {
    let name = normalize(playlist_name);
    let mut components = Path::new(&name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(name),
        _ => None,
    }
}

/// Normalized name of a file on disk, without its extension.
pub fn normalize_file_name(name: impl AsRef<Path>) -> String {
    let name = name.as_ref();
    let stem = name
        .file_stem()
        .unwrap_or_else(|| name.as_os_str())
        .to_string_lossy();
    normalize(&stem)
}
