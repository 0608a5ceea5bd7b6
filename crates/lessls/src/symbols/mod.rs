//
// symbols/mod.rs
//
// Variables, mixins and imports declared by a stylesheet
//

mod extract;
mod import;
mod scope;


use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub use extract::extract_symbols;
pub use import::{classify_import, Import, LESS_EXTENSION};
pub use scope::{resolve_at_offset, symbols_at_offset, symbols_from_text};

use crate::path::resolve_import;
use crate::syntax::TextPosition;

/// One `@name: value` binding, or a mixin parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Name without the `@` sigil
    pub name: String,
    /// Right-hand side text; `None` for a parameter without a default
    pub value: Option<String>,
    /// Byte offset of the declaration start
    pub offset: usize,
    pub position: TextPosition,
    /// Owning mixin, set only for mixin parameters
    pub mixin: Option<String>,
}

/// A mixin declaration (`.name(@params) { ... }`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mixin {
    /// Selector token used as the mixin's identifier, e.g. `.button`
    pub name: String,
    pub parameters: Vec<Variable>,
    /// Space-joined selectors of the enclosing rulesets, outermost first.
    /// `None` at the stylesheet root or when a selector uses `&` or
    /// interpolation.
    pub parent: Option<String>,
    pub offset: usize,
    pub position: TextPosition,
}

impl Mixin {
    /// Name as it would be called from outside its namespace.
    pub fn qualified_name(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{} {}", parent, self.name),
            None => self.name.clone(),
        }
    }
}

/// Symbols of one document, before they are tied to a path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Symbols {
    pub variables: Vec<Variable>,
    pub mixins: Vec<Mixin>,
    /// Statically resolvable imports, in document order
    pub imports: Vec<Import>,
}

impl Symbols {
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.mixins.is_empty() && self.imports.is_empty()
    }

    /// Sort variables so the nearest preceding declaration comes first.
    pub(crate) fn sort_nearest_first(&mut self) {
        self.variables.sort_by(|a, b| b.offset.cmp(&a.offset));
        self.mixins.sort_by(|a, b| b.offset.cmp(&a.offset));
    }
}

/// Symbols of one document on disk or in the editor.
///
/// Records are immutable once built; a re-parse produces a new record that
/// replaces the old one in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolsRecord {
    pub document: PathBuf,
    pub variables: Vec<Variable>,
    pub mixins: Vec<Mixin>,
    /// Import targets resolved against the document's directory
    pub imports: Vec<PathBuf>,
    /// Modification time of the file when it was read; `None` for unsaved
    /// editor content
    pub last_modified: Option<SystemTime>,
}

impl SymbolsRecord {
    pub fn new(document: PathBuf, symbols: Symbols, last_modified: Option<SystemTime>) -> Self {
        let imports = symbols
            .imports
            .iter()
            .map(|import| resolve_import(&document, &import.filepath))
            .collect();

        Self {
            document,
            variables: symbols.variables,
            mixins: symbols.mixins,
            imports,
            last_modified,
        }
    }

    /// Whether this document's `@import` list names `path`.
    pub fn imports_document(&self, path: &Path) -> bool {
        self.imports.iter().any(|import| import == path)
    }

    /// Whether the record was built from a file at least as new as `mtime`.
    pub fn is_fresh(&self, mtime: SystemTime) -> bool {
        matches!(self.last_modified, Some(stamp) if stamp >= mtime)
    }
}
