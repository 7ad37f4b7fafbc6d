//! Dual-tree index coordinator.
//!
//! Every registration lands in both trees: the red-black tree keyed by
//! filename for exact-match lookup, the B+ tree keyed by path for ordered
//! listing. Validation is the only failable step of an insert and runs
//! before either tree is touched, so a rejected entry leaves no partial
//! registration in just one tree.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::bptree::{BPlusTree, RangeScan};
use super::entry::FileEntry;
use super::rbtree::RedBlackTree;
use super::IndexError;

/// B+ tree order used when no explicit order is configured.
pub const DEFAULT_ORDER: usize = 4;

/// Persisted layout: the tree order plus every entry. Load rebuilds both
/// trees by replaying the (already sorted) inserts.
#[derive(Debug, Serialize, Deserialize)]
struct IndexSnapshot {
    order: usize,
    entries: Vec<FileEntry>,
}

/// Composite index over both trees, holding each tree's root and nothing
/// of their node internals.
#[derive(Debug)]
pub struct FileIndex {
    by_name: RedBlackTree<String, FileEntry>,
    by_path: BPlusTree<String, FileEntry>,
}

impl FileIndex {
    /// An empty index whose B+ tree uses the given order (`m >= 3`).
    pub fn new(order: usize) -> Result<Self, IndexError> {
        Ok(Self {
            by_name: RedBlackTree::new(),
            by_path: BPlusTree::new(order)?,
        })
    }

    /// Number of indexed paths.
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// `true` when nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Register `entry` in both trees.
    ///
    /// Re-registering a name or path updates the stored entry in place.
    /// A malformed entry is rejected before either tree is touched (both
    /// registrations happen or neither does).
    pub fn insert(&mut self, entry: FileEntry) -> Result<(), IndexError> {
        entry.validate()?;
        debug!(name = %entry.name, path = %entry.path, "indexing entry");
        self.by_name.insert(entry.name.clone(), entry.clone());
        self.by_path.insert(entry.path.clone(), entry);
        Ok(())
    }

    /// Strict insert-if-absent: rejects an entry whose name or path is
    /// already registered.
    pub fn insert_new(&mut self, entry: FileEntry) -> Result<(), IndexError> {
        entry.validate()?;
        if self.by_name.contains(entry.name.as_str()) {
            return Err(IndexError::DuplicateKeyConflict { key: entry.name });
        }
        if self.by_path.get(entry.path.as_str()).is_some() {
            return Err(IndexError::DuplicateKeyConflict { key: entry.path });
        }
        self.insert(entry)
    }

    /// Exact-match lookup by filename, routed to the red-black tree.
    ///
    /// A miss is a normal outcome, reported as `None`.
    pub fn find_by_name(&self, name: &str) -> Option<&FileEntry> {
        self.by_name.get(name)
    }

    /// Ordered listing of entries with paths in `[low, high]`, routed to
    /// the B+ tree leaf chain.
    pub fn list_range<'a>(
        &'a self,
        low: &str,
        high: &'a str,
    ) -> RangeScan<'a, String, FileEntry, str> {
        self.by_path.range(low, high)
    }

    /// Every indexed entry in ascending path order.
    pub fn list_all(&self) -> RangeScan<'_, String, FileEntry> {
        self.by_path.iter()
    }

    /// Persist the index to `path`.
    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        let snapshot = IndexSnapshot {
            order: self.by_path.order(),
            entries: self
                .by_path
                .iter()
                .map(|(_, entry)| entry.clone())
                .collect(),
        };
        let bytes = bincode::serialize(&snapshot)?;
        fs::write(path, bytes)?;
        info!(
            path = %path.display(),
            entries = snapshot.entries.len(),
            "saved index snapshot"
        );
        Ok(())
    }

    /// Rebuild an index from a snapshot written by [`FileIndex::save`].
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let bytes = fs::read(path)?;
        let snapshot: IndexSnapshot = bincode::deserialize(&bytes)?;

        let mut index = Self::new(snapshot.order)?;
        let entries = snapshot.entries.len();
        for entry in snapshot.entries {
            index.insert(entry)?;
        }

        info!(path = %path.display(), entries, "loaded index snapshot");
        Ok(index)
    }
}
