//
// cache.rs
//
// Workspace cache of per-document symbol records
//

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use crate::symbols::SymbolsRecord;

/// Symbol records keyed by absolute document path.
///
/// Records are stored behind `Arc` and replaced wholesale, so a reader holds
/// either the old record or the new one, never a mix. A poisoned lock is
/// treated as an empty cache rather than a crash.
pub struct WorkspaceCache {
    inner: RwLock<HashMap<PathBuf, Arc<SymbolsRecord>>>,
    /// Monotonic version counter, bumped on every mutation
    version: AtomicU64,
}

impl std::fmt::Debug for WorkspaceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceCache")
            .field("len", &self.len())
            .field("version", &self.version())
            .finish()
    }
}

impl Default for WorkspaceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceCache {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            version: AtomicU64::new(0),
        }
    }

    /// Get current version
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    fn increment_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get(&self, path: &Path) -> Option<Arc<SymbolsRecord>> {
        self.inner.read().ok()?.get(path).cloned()
    }

    /// Get the record for `path` if it was extracted from a file at least as
    /// new as `mtime`.
    pub fn get_if_fresh(&self, path: &Path, mtime: SystemTime) -> Option<Arc<SymbolsRecord>> {
        self.get(path).filter(|record| record.is_fresh(mtime))
    }

    /// Store a record, replacing any previous one for the same path.
    pub fn set(&self, path: PathBuf, record: Arc<SymbolsRecord>) {
        let version = self.increment_version();
        if let Ok(mut guard) = self.inner.write() {
            log::trace!("Caching symbols for {} (version {})", path.display(), version);
            guard.insert(path, record);
        }
    }

    /// Remove the record for `path`. Removing a missing path is a no-op.
    pub fn drop_entry(&self, path: &Path) {
        if let Ok(mut guard) = self.inner.write() {
            if guard.remove(path).is_some() {
                self.increment_version();
                log::trace!("Dropped cached symbols for {}", path.display());
            }
        }
    }

    /// Clear every record. Called once at shutdown.
    pub fn dispose(&self) {
        if let Ok(mut guard) = self.inner.write() {
            let count = guard.len();
            guard.clear();
            self.increment_version();
            log::info!("Disposed workspace cache ({} records)", count);
        }
    }

    /// Snapshot of all records, in no particular order.
    pub fn entries(&self) -> Vec<Arc<SymbolsRecord>> {
        self.inner
            .read()
            .map(|guard| guard.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|guard| guard.contains_key(path))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
