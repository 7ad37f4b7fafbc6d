//! Huffman compression engine.
//!
//! Turns arbitrary byte streams into a compact bit-packed representation
//! and back, byte-exact. Three layers, leaf-first: a frequency model
//! ([`FrequencyTable`]), a deterministic code tree with its derived code
//! table ([`CodeTree`], [`CodeTable`]), and the codec itself
//! ([`compress`] / [`decompress`]) producing self-describing
//! [`CompressedStream`] containers.

mod codec;
mod frequency;
mod tree;

pub use codec::{compress, compress_with_table, decompress, CodecError, CompressedStream};
pub use frequency::{FrequencyError, FrequencyTable};
pub use tree::{CodeNode, CodeTable, CodeTree, CodeWord, NodeId};
