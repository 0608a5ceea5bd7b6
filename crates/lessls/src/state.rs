//
// state.rs
//
// Server state shared by the LSP handlers
//

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};

use crate::cache::WorkspaceCache;
use crate::config::ScannerConfig;
use crate::document::Document;
use crate::fs::{DiskFileSystem, FileSystem};
use crate::path::uri_to_path;
use crate::scanner::{CurrentDocument, Scanner};

/// Global LSP state
pub struct WorldState {
    pub documents: HashMap<Url, Document>,
    pub workspace_root: Option<PathBuf>,
    pub config: ScannerConfig,
    pub cache: Arc<WorkspaceCache>,
    pub fs: Arc<dyn FileSystem>,
}

/// Everything a query needs, detached from the state so the scan can run
/// without holding the state lock.
pub struct QueryContext {
    pub scanner: Scanner,
    pub root: Option<PathBuf>,
    pub current: CurrentDocument,
    pub position: Position,
}

impl WorldState {
    pub fn new() -> Self {
        Self::with_file_system(Arc::new(DiskFileSystem))
    }

    pub fn with_file_system(fs: Arc<dyn FileSystem>) -> Self {
        let config = ScannerConfig::default();

        log::info!("Initializing scanner configuration with defaults:");
        log::info!("  scanner_depth: {}", config.scanner_depth);
        log::info!("  scanner_exclude: {:?}", config.scanner_exclude);
        log::info!("  scan_imported_files: {}", config.scan_imported_files);
        log::info!(
            "  scan_imported_files_depth: {}",
            config.scan_imported_files_depth
        );

        Self {
            documents: HashMap::new(),
            workspace_root: None,
            config,
            cache: Arc::new(WorkspaceCache::new()),
            fs,
        }
    }

    pub fn open_document(&mut self, uri: Url, text: &str, version: Option<i32>) {
        self.documents.insert(uri, Document::new(text, version));
    }

    /// Forget an open document and its cached symbols. The next scan reads
    /// the file from disk again.
    pub fn close_document(&mut self, uri: &Url) {
        self.documents.remove(uri);
        if let Some(path) = uri_to_path(uri) {
            self.cache.drop_entry(&path);
        }
    }

    pub fn apply_change(&mut self, uri: &Url, change: TextDocumentContentChangeEvent) {
        if let Some(doc) = self.documents.get_mut(uri) {
            doc.apply_change(change);
        }
    }

    pub fn get_document(&self, uri: &Url) -> Option<&Document> {
        self.documents.get(uri)
    }

    pub fn scanner(&self) -> Scanner {
        Scanner::new(
            Arc::clone(&self.fs),
            Arc::clone(&self.cache),
            self.config.clone(),
        )
    }

    /// Snapshot the open document at `uri` for a query at `position`.
    ///
    /// `None` when the document is not open or is not a file.
    pub fn query_context(&self, uri: &Url, position: Position) -> Option<QueryContext> {
        let doc = self.get_document(uri)?;
        let path = uri_to_path(uri)?;

        Some(QueryContext {
            scanner: self.scanner(),
            root: self.workspace_root.clone(),
            current: CurrentDocument {
                path,
                text: doc.text(),
                offset: Some(doc.offset_at(position)),
            },
            position,
        })
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryContext {
    /// Byte offset of the cursor in the current text.
    pub fn offset(&self) -> usize {
        self.current.offset.unwrap_or(self.current.text.len())
    }
}
