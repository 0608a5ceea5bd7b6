//
// symbols/import.rs
//
// Classification of `@import` targets
//

use std::path::Path;

/// File extension that marks a stylesheet as scannable.
pub const LESS_EXTENSION: &str = "less";

/// An `@import` target as written in a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Target path, with `.less` appended when it had no extension
    pub filepath: String,
    /// Plain CSS import, passed through untouched by the compiler
    pub is_css: bool,
    /// Target depends on runtime interpolation or a glob
    pub is_dynamic: bool,
}

impl Import {
    /// Whether the target can be resolved to a single stylesheet on disk.
    pub fn is_resolvable(&self) -> bool {
        !self.is_css && !self.is_dynamic
    }
}

/// Classify the raw literal of an import statement.
///
/// `literal` is the quoted string or `url(...)` text; `options` is the
/// parenthesized option list (`(reference, css)`), if any.
pub fn classify_import(literal: &str, options: Option<&str>) -> Import {
    let target = unquote(unwrap_url(literal.trim()));

    let has_css_option = options
        .map(|opts| {
            opts.trim_matches(|c| c == '(' || c == ')')
                .split(',')
                .any(|opt| opt.trim() == "css")
        })
        .unwrap_or(false);

    let is_dynamic = target.contains("@{") || target.contains(['*', '?', '[']);

    let extension = Path::new(target)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let is_css = has_css_option || extension.as_deref() == Some("css");

    let filepath = match extension.as_deref() {
        Some(LESS_EXTENSION) => target.to_string(),
        _ if is_css || is_dynamic => target.to_string(),
        _ => format!("{}.{}", target, LESS_EXTENSION),
    };

    Import {
        filepath,
        is_css,
        is_dynamic,
    }
}

fn unwrap_url(text: &str) -> &str {
    match text.strip_prefix("url(") {
        Some(inner) => inner.strip_suffix(')').unwrap_or(inner).trim(),
        None => text,
    }
}

fn unquote(text: &str) -> &str {
    let text = text
        .strip_prefix('"')
        .or_else(|| text.strip_prefix('\''))
        .unwrap_or(text);
    text.strip_suffix('"')
        .or_else(|| text.strip_suffix('\''))
        .unwrap_or(text)
}
