//
// fs.rs
//
// Filesystem capability used by the scanner
//

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use regex::Regex;
use walkdir::WalkDir;

use crate::symbols::LESS_EXTENSION;

/// A stylesheet found while walking the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Non-blocking access to the files the scanner needs.
///
/// The scanner only ever talks to the disk through this trait, so tests can
/// count or fake reads.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// All `.less` files under `root`, at most `depth` directories deep,
    /// skipping anything `filter` excludes. Entries that could not be read
    /// come back as errors in place.
    async fn walk_stylesheets(
        &self,
        root: &Path,
        depth: usize,
        filter: &ExcludeFilter,
    ) -> Vec<io::Result<FileEntry>>;

    /// Modification time of `path`
    async fn modified(&self, path: &Path) -> io::Result<SystemTime>;

    /// Contents of `path`. Invalid UTF-8 is replaced rather than rejected.
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFileSystem;

#[async_trait]
impl FileSystem for DiskFileSystem {
    async fn walk_stylesheets(
        &self,
        root: &Path,
        depth: usize,
        filter: &ExcludeFilter,
    ) -> Vec<io::Result<FileEntry>> {
        let root = root.to_path_buf();
        let filter = filter.clone();

        match tokio::task::spawn_blocking(move || walk_blocking(&root, depth, &filter)).await {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("Workspace walk failed: {err}");
                vec![Err(io::Error::new(io::ErrorKind::Other, err))]
            }
        }
    }

    async fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        tokio::fs::metadata(path).await?.modified()
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = tokio::fs::read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn walk_blocking(root: &Path, depth: usize, filter: &ExcludeFilter) -> Vec<io::Result<FileEntry>> {
    // Files sit one level below the deepest directory walked
    let walker = WalkDir::new(root)
        .max_depth(depth.saturating_add(1))
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !filter.is_excluded(entry.path()));

    let mut entries = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                entries.push(Err(io::Error::from(err)));
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_stylesheet(entry.path()) {
            continue;
        }
        let modified = entry
            .metadata()
            .map_err(io::Error::from)
            .and_then(|metadata| metadata.modified());
        entries.push(modified.map(|modified| FileEntry {
            path: entry.into_path(),
            modified,
        }));
    }
    entries
}

/// Whether `path` names a LESS stylesheet.
pub fn is_stylesheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(LESS_EXTENSION))
}

/// Compiled `scannerExclude` patterns.
///
/// A directory-name pattern such as `**/node_modules` also excludes
/// everything below that directory. `*` does not cross `/`.
#[derive(Debug, Clone)]
pub struct ExcludeFilter {
    set: GlobSet,
}

impl ExcludeFilter {
    /// Compile `patterns`, skipping (and logging) any that are invalid.
    pub fn new(patterns: &[String]) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in expand_patterns(patterns) {
            match GlobBuilder::new(&pattern).literal_separator(true).build() {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(err) => log::warn!("Ignoring invalid exclude pattern '{}': {}", pattern, err),
            }
        }
        let set = builder.build().unwrap_or_else(|err| {
            log::warn!("Failed to compile exclude patterns: {}", err);
            GlobSet::empty()
        });
        Self { set }
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        self.set.is_match(path)
    }
}

impl Default for ExcludeFilter {
    fn default() -> Self {
        Self::new(&[])
    }
}

/// Add `pattern/**` for every `**/name` pattern.
fn expand_patterns(patterns: &[String]) -> Vec<String> {
    let directory_pattern = Regex::new(r"^\*\*/[\w.-]+/?$").ok();
    let mut expanded = Vec::with_capacity(patterns.len() * 2);

    for pattern in patterns {
        expanded.push(pattern.clone());
        let is_directory_name = directory_pattern
            .as_ref()
            .is_some_and(|re| re.is_match(pattern));
        if is_directory_name {
            expanded.push(format!("{}/**", pattern.trim_end_matches('/')));
        }
    }
    expanded
}
