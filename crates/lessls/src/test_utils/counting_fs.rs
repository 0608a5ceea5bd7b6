//
// test_utils/counting_fs.rs
//
// Filesystem wrapper that counts content reads
//

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::SystemTime;

use async_trait::async_trait;

use crate::fs::{ExcludeFilter, FileEntry, FileSystem};

/// Delegates to an inner [`FileSystem`] and counts `read_to_string` calls,
/// so tests can check that unchanged files are not read twice.
#[derive(Debug, Default)]
pub struct CountingFileSystem<F> {
    inner: F,
    reads: AtomicUsize,
}

impl<F: FileSystem> CountingFileSystem<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            reads: AtomicUsize::new(0),
        }
    }

    /// Number of file contents read so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<F: FileSystem> FileSystem for CountingFileSystem<F> {
    async fn walk_stylesheets(
        &self,
        root: &Path,
        depth: usize,
        filter: &ExcludeFilter,
    ) -> Vec<io::Result<FileEntry>> {
        self.inner.walk_stylesheets(root, depth, filter).await
    }

    async fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        self.inner.modified(path).await
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_to_string(path).await
    }
}
