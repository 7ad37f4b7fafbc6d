//! Encode/decode operations over the code tree, plus the persisted
//! container format.
//!
//! A compressed stream is self-describing: it carries the symbol
//! frequencies its tree was built from, the exact original length, and the
//! exact bit count of the payload. Decoding reruns the deterministic tree
//! builder on the stored table, so no side channel is needed and padding
//! bits in the final byte can never be mistaken for symbols.

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::frequency::{FrequencyError, FrequencyTable};
use super::tree::{CodeNode, CodeTree};

/// Magic bytes opening every persisted compressed stream.
const STREAM_MAGIC: [u8; 4] = *b"STWG";

/// Errors raised by the compression codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The frequency model rejected the input.
    #[error(transparent)]
    Frequency(#[from] FrequencyError),

    /// Input contained a symbol the supplied frequency table does not cover.
    #[error("symbol {symbol:#04x} at position {position} is not covered by the frequency table")]
    UnknownSymbol {
        /// The uncovered symbol.
        symbol: u8,
        /// Byte offset where it was observed.
        position: usize,
    },

    /// The stream is structurally damaged and cannot be decoded.
    #[error("corrupt stream: {reason}")]
    CorruptStream {
        /// What the decoder observed.
        reason: String,
    },

    /// The container layout failed to serialize.
    #[error("container encoding failed: {0}")]
    Container(#[from] bincode::Error),
}

fn corrupt(reason: impl Into<String>) -> CodecError {
    CodecError::CorruptStream {
        reason: reason.into(),
    }
}

/// Self-describing compressed stream.
///
/// Created by [`compress`], consumed by [`decompress`]; immutable once
/// produced. The serialized form ([`CompressedStream::to_bytes`]) is the
/// on-disk container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedStream {
    magic: [u8; 4],
    symbols: Vec<(u8, u64)>,
    original_len: u64,
    payload_bits: u64,
    payload: Vec<u8>,
}

impl CompressedStream {
    /// Number of bytes in the original, uncompressed input.
    pub fn original_len(&self) -> u64 {
        self.original_len
    }

    /// Exact number of meaningful bits in the payload.
    pub fn payload_bits(&self) -> u64 {
        self.payload_bits
    }

    /// Number of payload bytes (including final-byte padding).
    pub fn compressed_len(&self) -> usize {
        self.payload.len()
    }

    /// The embedded symbol table, in ascending symbol order.
    pub fn symbols(&self) -> &[(u8, u64)] {
        &self.symbols
    }

    /// Serialize into the persisted container form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize and validate a persisted container.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let stream: CompressedStream =
            bincode::deserialize(bytes).map_err(|err| corrupt(err.to_string()))?;

        if stream.magic != STREAM_MAGIC {
            return Err(corrupt("bad magic bytes"));
        }
        if stream.payload_bits as usize > stream.payload.len() * 8 {
            return Err(corrupt(format!(
                "declared {} payload bits but only {} are stored",
                stream.payload_bits,
                stream.payload.len() * 8
            )));
        }

        Ok(stream)
    }
}

/// Compress `input` with an estimated frequency model.
///
/// The round-trip contract holds for every non-empty input:
/// `decompress(&compress(x)?)? == x`.
pub fn compress(input: &[u8]) -> Result<CompressedStream, CodecError> {
    let table = FrequencyTable::estimate(input)?;
    compress_with_table(input, &table)
}

/// Compress `input` against a caller-supplied frequency model.
///
/// Every symbol of `input` must be covered by `table`; symbols in the
/// table but absent from the input merely widen the code tree.
pub fn compress_with_table(
    input: &[u8],
    table: &FrequencyTable,
) -> Result<CompressedStream, CodecError> {
    let tree = CodeTree::build(table);
    let codes = tree.derive_code_table();

    let mut payload: BitVec<u8, Msb0> = BitVec::with_capacity(input.len() * 8);
    for (position, &symbol) in input.iter().enumerate() {
        let code = codes
            .code(symbol)
            .ok_or(CodecError::UnknownSymbol { symbol, position })?;
        payload.extend_from_bitslice(code);
    }

    debug!(
        original_bytes = input.len(),
        payload_bits = payload.len(),
        distinct_symbols = table.len(),
        "encoded stream"
    );

    Ok(CompressedStream {
        magic: STREAM_MAGIC,
        symbols: table.iter().collect(),
        original_len: input.len() as u64,
        payload_bits: payload.len() as u64,
        payload: payload.into_vec(),
    })
}

/// Decode `stream` back to the original byte sequence.
///
/// Rebuilds the code tree from the embedded table with the same
/// deterministic builder used by [`compress`], then walks payload bits
/// root-to-leaf, emitting a symbol and resetting at each leaf, until the
/// recorded original length is satisfied.
pub fn decompress(stream: &CompressedStream) -> Result<Vec<u8>, CodecError> {
    let table = FrequencyTable::from_counts(stream.symbols.iter().copied())?;
    let tree = CodeTree::build(&table);

    let payload_bits = stream.payload_bits as usize;
    if payload_bits > stream.payload.len() * 8 {
        return Err(corrupt(format!(
            "declared {} payload bits but only {} are stored",
            payload_bits,
            stream.payload.len() * 8
        )));
    }
    let bits = &BitSlice::<u8, Msb0>::from_slice(&stream.payload)[..payload_bits];
    let mut cursor = bits.iter().by_vals();

    let mut output = Vec::with_capacity(stream.original_len as usize);

    if let CodeNode::Leaf { symbol, .. } = *tree.node(tree.root()) {
        // Lone-leaf tree: every bit is the 1-bit code `0`.
        while (output.len() as u64) < stream.original_len {
            match cursor.next() {
                Some(false) => output.push(symbol),
                Some(true) => return Err(corrupt("set bit in a single-symbol stream")),
                None => return Err(corrupt("bits exhausted before original length was reached")),
            }
        }
    } else {
        let mut node = tree.root();
        while (output.len() as u64) < stream.original_len {
            let Some(bit) = cursor.next() else {
                return Err(corrupt("bits exhausted before original length was reached"));
            };

            node = match *tree.node(node) {
                CodeNode::Internal { left, right, .. } => {
                    if bit {
                        right
                    } else {
                        left
                    }
                }
                // Unreachable for trees built here; a malformed tree
                // reference must abort the decode, not loop.
                CodeNode::Leaf { .. } => return Err(corrupt("decode walk ran off a leaf")),
            };

            if let CodeNode::Leaf { symbol, .. } = *tree.node(node) {
                output.push(symbol);
                node = tree.root();
            }
        }
    }

    if cursor.next().is_some() {
        return Err(corrupt("trailing bits after the recorded original length"));
    }

    debug!(
        original_bytes = output.len(),
        payload_bits, "decoded stream"
    );

    Ok(output)
}
