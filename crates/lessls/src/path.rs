//
// path.rs
//
// Lexical path normalization and document-relative display paths
//

use std::path::{Component, Path, PathBuf};

use url::Url;

/// Resolve `.` and `..` components without touching the filesystem.
///
/// `..` only pops a preceding normal segment, so a root or prefix is never
/// removed. Imports may point at files that do not exist yet, which is why
/// this stays lexical instead of canonicalizing.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                } else if components.is_empty() {
                    components.push(component);
                }
            }
            Component::CurDir => {}
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Resolve an import target against the directory of the importing document.
pub fn resolve_import(document: &Path, target: &str) -> PathBuf {
    let dir = document.parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&dir.join(target))
}

/// Path of `symbols_path` as shown next to a suggestion made in
/// `current_path`: relative to the current document's directory with forward
/// slashes, or `current` for the document itself.
pub fn document_display_path(current_path: &Path, symbols_path: &Path) -> String {
    if current_path == symbols_path {
        return "current".to_string();
    }

    let base = current_path.parent().unwrap_or_else(|| Path::new(""));
    let relative = relative_path(base, symbols_path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Lexical `target` relative to `base`, climbing with `..` where the two
/// diverge. Falls back to `target` when they share no root.
fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base: Vec<Component> = base.components().collect();
    let target_components: Vec<Component> = target.components().collect();

    let common = base
        .iter()
        .zip(target_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let base_is_rooted = matches!(
        base.first(),
        Some(Component::RootDir | Component::Prefix(_))
    );
    if common == 0 && base_is_rooted {
        return target.to_path_buf();
    }

    let mut result = PathBuf::new();
    for _ in common..base.len() {
        result.push("..");
    }
    for component in &target_components[common..] {
        result.push(component);
    }
    result
}

/// Filesystem path of a `file://` URI.
pub fn uri_to_path(uri: &Url) -> Option<PathBuf> {
    uri.to_file_path().ok()
}

/// `file://` URI of an absolute path.
pub fn path_to_uri(path: &Path) -> Option<Url> {
    Url::from_file_path(path).ok()
}
