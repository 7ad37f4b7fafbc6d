//! Index entry and metadata types.

use serde::{Deserialize, Serialize};

use super::IndexError;

/// Metadata stored against every indexed file or directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Size in bytes of the stored payload.
    pub size: u64,
    /// Byte offset of the payload within its storage location.
    pub offset: u64,
    /// Whether the stored payload is Huffman-compressed.
    pub compressed: bool,
}

impl FileMetadata {
    /// Metadata for an uncompressed payload stored at offset 0.
    pub fn plain(size: u64) -> Self {
        Self {
            size,
            offset: 0,
            compressed: false,
        }
    }
}

/// One file or directory registration: both lookup keys plus metadata.
///
/// The filename keys the exact-match index; the full path keys the ordered
/// index. Exactly one logical entry exists per unique key in each tree;
/// re-registering a key updates it in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Exact-match lookup key.
    pub name: String,
    /// Ordered-listing key.
    pub path: String,
    /// Stored metadata.
    pub metadata: FileMetadata,
}

impl FileEntry {
    /// Bundle keys and metadata into an entry. Validation happens at
    /// insertion time, not here.
    pub fn new(name: impl Into<String>, path: impl Into<String>, metadata: FileMetadata) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            metadata,
        }
    }

    /// Reject keys the trees must never see.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.name.is_empty() {
            return Err(IndexError::MalformedKey { which: "name" });
        }
        if self.path.is_empty() {
            return Err(IndexError::MalformedKey { which: "path" });
        }
        Ok(())
    }
}
