//
// scanner.rs
//
// Workspace scan with import closure and mtime-based reuse
//

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use anyhow::{Context, Result};
use tokio::task::JoinSet;

use crate::cache::WorkspaceCache;
use crate::config::ScannerConfig;
use crate::fs::{ExcludeFilter, FileSystem};
use crate::symbols::{symbols_from_text, SymbolsRecord};

/// The document being edited, with content that may not be saved yet.
#[derive(Debug, Clone)]
pub struct CurrentDocument {
    pub path: PathBuf,
    pub text: String,
    /// Cursor offset; when set, symbols scoped to the cursor are included
    pub offset: Option<usize>,
}

/// Builds the list of symbol records a query runs against.
///
/// Cheap to construct: it only holds handles to the filesystem and cache
/// plus a copy of the settings, so callers build one per request.
pub struct Scanner {
    fs: Arc<dyn FileSystem>,
    cache: Arc<WorkspaceCache>,
    config: ScannerConfig,
}

#[derive(Debug, Default)]
struct ScanStats {
    parsed: usize,
    reused: usize,
    imported: usize,
    skipped: usize,
}

impl Scanner {
    pub fn new(fs: Arc<dyn FileSystem>, cache: Arc<WorkspaceCache>, config: ScannerConfig) -> Self {
        Self { fs, cache, config }
    }

    pub fn cache(&self) -> &Arc<WorkspaceCache> {
        &self.cache
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Collect symbol records for the workspace at `root`.
    ///
    /// 1. The current document, if any, is extracted from its in-memory text
    ///    and its stale cache entry dropped.
    /// 2. Every stylesheet under `root` is reused from the cache when its
    ///    record is at least as new as the file, and read otherwise.
    /// 3. Once all of those are in, `@import` targets not yet seen are
    ///    followed breadth-first, even outside `root`.
    ///
    /// Direct records come first, imported ones after. I/O errors skip the
    /// affected file unless `show_errors` is set, in which case the first
    /// one is returned.
    pub async fn scan(
        &self,
        root: Option<&Path>,
        current: Option<&CurrentDocument>,
    ) -> Result<Vec<Arc<SymbolsRecord>>> {
        let start = Instant::now();
        let mut stats = ScanStats::default();
        let mut records = Vec::new();

        if let Some(doc) = current {
            self.cache.drop_entry(&doc.path);
            let symbols = symbols_from_text(&doc.text, doc.offset);
            records.push(Arc::new(SymbolsRecord::new(doc.path.clone(), symbols, None)));
        }

        if let Some(root) = root {
            self.scan_directory(root, current, &mut records, &mut stats)
                .await?;
        }

        let imported = if self.config.scan_imported_files {
            self.scan_imported_files(&records, &mut stats).await?
        } else {
            Vec::new()
        };
        stats.imported = imported.len();
        records.extend(imported);

        log::info!(
            "Scanned {} documents ({} parsed, {} cached, {} imported, {} skipped) in {:?}",
            records.len(),
            stats.parsed,
            stats.reused,
            stats.imported,
            stats.skipped,
            start.elapsed()
        );

        Ok(records)
    }

    async fn scan_directory(
        &self,
        root: &Path,
        current: Option<&CurrentDocument>,
        records: &mut Vec<Arc<SymbolsRecord>>,
        stats: &mut ScanStats,
    ) -> Result<()> {
        let filter = ExcludeFilter::new(&self.config.scanner_exclude);
        let entries = self
            .fs
            .walk_stylesheets(root, self.config.scanner_depth, &filter)
            .await;

        let mut tasks = JoinSet::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let err = anyhow::Error::new(err)
                        .context(format!("Failed to scan {}", root.display()));
                    self.swallow_or_fail(err, stats)?;
                    continue;
                }
            };

            if current.is_some_and(|doc| doc.path == entry.path) {
                continue;
            }

            if let Some(cached) = self.cache.get_if_fresh(&entry.path, entry.modified) {
                log::trace!("Reusing cached symbols for {}", entry.path.display());
                stats.reused += 1;
                records.push(cached);
                continue;
            }

            let fs = Arc::clone(&self.fs);
            let cache = Arc::clone(&self.cache);
            tasks.spawn(async move { load_record(fs, cache, entry.path, Some(entry.modified)).await });
        }

        // Every direct file is in before imports are looked at
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(record)) => {
                    stats.parsed += 1;
                    records.push(record);
                }
                Ok(Err(err)) => self.swallow_or_fail(err, stats)?,
                Err(err) => self.swallow_or_fail(anyhow::Error::new(err), stats)?,
            }
        }

        Ok(())
    }

    /// Breadth-first closure over the `@import` edges of `seeds`.
    async fn scan_imported_files(
        &self,
        seeds: &[Arc<SymbolsRecord>],
        stats: &mut ScanStats,
    ) -> Result<Vec<Arc<SymbolsRecord>>> {
        let mut known: HashSet<PathBuf> = seeds.iter().map(|r| r.document.clone()).collect();
        let mut frontier: Vec<Arc<SymbolsRecord>> = seeds.to_vec();
        let mut imported = Vec::new();
        let mut nesting = 0;

        // Depth guard against cyclic or runaway import chains
        while !frontier.is_empty() && nesting < self.config.scan_imported_files_depth {
            let targets: Vec<PathBuf> = frontier
                .iter()
                .flat_map(|record| record.imports.iter())
                .filter(|path| known.insert((*path).clone()))
                .cloned()
                .collect();

            if targets.is_empty() {
                break;
            }

            let mut tasks = JoinSet::new();
            for target in targets {
                let fs = Arc::clone(&self.fs);
                let cache = Arc::clone(&self.cache);
                tasks.spawn(async move { resolve_import_record(fs, cache, target).await });
            }

            let mut next = Vec::new();
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(Ok(record)) => next.push(record),
                    Ok(Err(err)) => self.swallow_or_fail(err, stats)?,
                    Err(err) => self.swallow_or_fail(anyhow::Error::new(err), stats)?,
                }
            }

            imported.extend(next.iter().cloned());
            frontier = next;
            nesting += 1;
        }

        if !frontier.is_empty() && nesting == self.config.scan_imported_files_depth {
            log::debug!(
                "Stopped following imports after {} levels",
                self.config.scan_imported_files_depth
            );
        }

        Ok(imported)
    }

    fn swallow_or_fail(&self, err: anyhow::Error, stats: &mut ScanStats) -> Result<()> {
        if self.config.show_errors {
            return Err(err);
        }
        log::warn!("{:#}", err);
        stats.skipped += 1;
        Ok(())
    }
}

/// Reuse the cached record for an imported file when fresh, else load it.
async fn resolve_import_record(
    fs: Arc<dyn FileSystem>,
    cache: Arc<WorkspaceCache>,
    path: PathBuf,
) -> Result<Arc<SymbolsRecord>> {
    let modified = fs
        .modified(&path)
        .await
        .with_context(|| format!("Failed to stat imported file {}", path.display()))?;

    if let Some(cached) = cache.get_if_fresh(&path, modified) {
        log::trace!("Reusing cached symbols for import {}", path.display());
        return Ok(cached);
    }

    load_record(fs, cache, path, Some(modified)).await
}

/// Read and extract one file, then store the record in the cache.
async fn load_record(
    fs: Arc<dyn FileSystem>,
    cache: Arc<WorkspaceCache>,
    path: PathBuf,
    modified: Option<SystemTime>,
) -> Result<Arc<SymbolsRecord>> {
    let modified = match modified {
        Some(modified) => modified,
        None => fs
            .modified(&path)
            .await
            .with_context(|| format!("Failed to stat {}", path.display()))?,
    };

    let text = fs
        .read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    log::trace!("Parsing {}", path.display());
    let symbols = symbols_from_text(&text, None);
    let record = Arc::new(SymbolsRecord::new(path.clone(), symbols, Some(modified)));
    cache.set(path, Arc::clone(&record));

    Ok(record)
}
