//! # stowage: local file organization and space-efficient storage
//!
//! Two independent algorithmic engines form the core of this crate:
//!
//! 1. **Huffman coder** ([`huffman`]): builds a prefix-code tree from
//!    symbol frequencies, encodes arbitrary byte streams into bit-packed
//!    self-describing containers, and decodes them back byte-exact.
//! 2. **Dual-index engine** ([`index`]): a red-black tree for exact-match
//!    filename lookup and a B+ tree for ordered, range-capable path
//!    listing, kept consistent by a coordinator under every insert.
//!
//! Everything else (argument parsing, command dispatch, reading and
//! writing plain files) is thin orchestration living in the CLI binary.
//!
//! ## Usage Example
//!
//! ```
//! use stowage::huffman::{compress, decompress};
//! use stowage::index::{FileEntry, FileIndex, FileMetadata, DEFAULT_ORDER};
//!
//! let stream = compress(b"to be or not to be")?;
//! assert_eq!(decompress(&stream)?, b"to be or not to be");
//!
//! let mut index = FileIndex::new(DEFAULT_ORDER)?;
//! index.insert(FileEntry::new(
//!     "hamlet.txt",
//!     "/plays/hamlet.txt",
//!     FileMetadata::plain(stream.compressed_len() as u64),
//! ))?;
//! assert!(index.find_by_name("hamlet.txt").is_some());
//! # Ok::<(), anyhow::Error>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod huffman;
pub mod index;

// Re-exports for convenience
pub use huffman::{compress, decompress, CodecError, CompressedStream, FrequencyTable};
pub use index::{BPlusTree, FileEntry, FileIndex, FileMetadata, IndexError, RedBlackTree};
