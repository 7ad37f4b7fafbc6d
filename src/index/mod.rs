//! Dual-index engine: a red-black tree for exact-match filename lookup
//! and a B+ tree for ordered, range-capable path listing, composed by a
//! coordinator that keeps both consistent under every insert.
//!
//! The engines are single-threaded and synchronous. Embedded in a
//! concurrent host, each logical index requires the usual single-writer /
//! multi-reader discipline: searches and scans may share a reader lock but
//! must never overlap an insert, since rebalancing and splitting touch
//! arbitrarily many nodes.

mod bptree;
mod coordinator;
mod entry;
mod rbtree;

pub use bptree::{BPlusTree, RangeScan, MIN_ORDER};
pub use coordinator::{FileIndex, DEFAULT_ORDER};
pub use entry::{FileEntry, FileMetadata};
pub use rbtree::RedBlackTree;

use thiserror::Error;

/// Errors raised by the index engines and their coordinator.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A key was structurally unusable (e.g. an empty filename).
    #[error("malformed key: {which} must not be empty")]
    MalformedKey {
        /// Which key failed validation.
        which: &'static str,
    },

    /// Strict insert-if-absent found the key already registered.
    #[error("duplicate key conflict: '{key}' is already indexed")]
    DuplicateKeyConflict {
        /// The conflicting key.
        key: String,
    },

    /// Requested B+ tree order is below the supported minimum.
    #[error("invalid order {order}: a B+ tree requires order >= 3")]
    InvalidOrder {
        /// The rejected order.
        order: usize,
    },

    /// A structural invariant failed an internal audit. Indicates an
    /// implementation bug, never a caller error.
    #[error("tree invariant violation: {detail}")]
    TreeInvariantViolation {
        /// Which invariant failed, and where.
        detail: String,
    },

    /// A persisted snapshot could not be read or written.
    #[error("index snapshot I/O failed: {0}")]
    Snapshot(#[from] std::io::Error),

    /// A persisted snapshot could not be decoded.
    #[error("index snapshot is corrupt: {0}")]
    CorruptSnapshot(#[from] bincode::Error),
}
