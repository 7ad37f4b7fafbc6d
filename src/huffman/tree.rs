//! Code tree construction and code table derivation.
//!
//! Nodes live in a flat arena addressed by integer handles, so the merge
//! loop only ever reassigns indices. The tree is full by construction:
//! every internal node owns exactly two children, and leaves correspond
//! 1:1 with the distinct symbols of the frequency table. That shape is
//! what guarantees the prefix property of the derived code table.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use bitvec::prelude::*;

use super::frequency::FrequencyTable;

/// Handle into the code-tree arena.
pub type NodeId = usize;

/// Variable-length code word: the root-to-leaf bit path of one symbol.
pub type CodeWord = BitVec<u8, Msb0>;

/// One node of the code tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeNode {
    /// Terminal node carrying exactly one symbol and its frequency.
    Leaf {
        /// The coded symbol.
        symbol: u8,
        /// Occurrence count of the symbol.
        weight: u64,
    },
    /// Merge node carrying the summed weight of its subtree.
    Internal {
        /// Summed weight of both children.
        weight: u64,
        /// Child reached on a 0 bit.
        left: NodeId,
        /// Child reached on a 1 bit.
        right: NodeId,
    },
}

impl CodeNode {
    fn weight(&self) -> u64 {
        match *self {
            CodeNode::Leaf { weight, .. } | CodeNode::Internal { weight, .. } => weight,
        }
    }
}

/// Huffman code tree stored in a flat arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTree {
    nodes: Vec<CodeNode>,
    root: NodeId,
}

impl CodeTree {
    /// Build the code tree by repeatedly merging the two lightest fragments.
    ///
    /// Ties are broken by arrival order: leaves are seeded in ascending
    /// symbol order, merged fragments numbered afterwards in creation
    /// order. Identical frequency tables therefore always produce
    /// bit-identical trees, which is what lets the decoder rebuild the
    /// exact tree from the stored table alone.
    ///
    /// A single-symbol table yields a lone-leaf tree; the symbol's code is
    /// the 1-bit string `0` by convention (see [`CodeTree::derive_code_table`]).
    pub fn build(table: &FrequencyTable) -> Self {
        let mut nodes: Vec<CodeNode> = Vec::with_capacity(2 * table.len());
        let mut heap: BinaryHeap<Reverse<(u64, u64, NodeId)>> =
            BinaryHeap::with_capacity(table.len());
        let mut seq: u64 = 0;

        for (symbol, weight) in table.iter() {
            let id = nodes.len();
            nodes.push(CodeNode::Leaf { symbol, weight });
            heap.push(Reverse((weight, seq, id)));
            seq += 1;
        }

        let root = loop {
            let Some(Reverse((left_weight, _, left))) = heap.pop() else {
                unreachable!("frequency tables are non-empty by construction");
            };
            let Some(Reverse((right_weight, _, right))) = heap.pop() else {
                break left;
            };

            let id = nodes.len();
            let weight = left_weight + right_weight;
            nodes.push(CodeNode::Internal { weight, left, right });
            heap.push(Reverse((weight, seq, id)));
            seq += 1;
        };

        CodeTree { nodes, root }
    }

    /// Handle of the root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Access a node by handle.
    pub fn node(&self, id: NodeId) -> &CodeNode {
        &self.nodes[id]
    }

    /// Number of leaves, i.e. distinct symbols covered by the tree.
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, CodeNode::Leaf { .. }))
            .count()
    }

    /// Total weight carried at the root (the modeled stream length).
    pub fn total_weight(&self) -> u64 {
        self.nodes[self.root].weight()
    }

    /// Derive the code table: 0 for a step to the left child, 1 for a step
    /// to the right child, accumulated root-to-leaf.
    ///
    /// A lone-leaf tree assigns its sole symbol the 1-bit code `0` (a
    /// zero-length path would make the encoded stream unmeasurable).
    pub fn derive_code_table(&self) -> CodeTable {
        let mut codes: BTreeMap<u8, CodeWord> = BTreeMap::new();

        match self.nodes[self.root] {
            CodeNode::Leaf { symbol, .. } => {
                codes.insert(symbol, bitvec![u8, Msb0; 0]);
            }
            CodeNode::Internal { .. } => {
                let mut path = CodeWord::new();
                self.assign_codes(self.root, &mut path, &mut codes);
            }
        }

        CodeTable { codes }
    }

    fn assign_codes(&self, id: NodeId, path: &mut CodeWord, codes: &mut BTreeMap<u8, CodeWord>) {
        match self.nodes[id] {
            CodeNode::Leaf { symbol, .. } => {
                codes.insert(symbol, path.clone());
            }
            CodeNode::Internal { left, right, .. } => {
                path.push(false);
                self.assign_codes(left, path, codes);
                path.pop();

                path.push(true);
                self.assign_codes(right, path, codes);
                path.pop();
            }
        }
    }
}

/// Mapping from symbol to its variable-length code word.
///
/// The prefix property (no code word is a prefix of another) is guaranteed
/// structurally by the full shape of the generating tree and is never
/// re-checked here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeTable {
    codes: BTreeMap<u8, CodeWord>,
}

impl CodeTable {
    /// Code word assigned to `symbol`, if the symbol was modeled.
    pub fn code(&self, symbol: u8) -> Option<&CodeWord> {
        self.codes.get(&symbol)
    }

    /// Number of coded symbols.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// `true` when no symbol is coded.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Iterate `(symbol, code)` pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &CodeWord)> + '_ {
        self.codes.iter().map(|(&symbol, code)| (symbol, code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(counts: &[(u8, u64)]) -> FrequencyTable {
        FrequencyTable::from_counts(counts.iter().copied()).expect("table should validate")
    }

    #[test]
    fn tree_is_full_and_covers_all_symbols() {
        let tree = CodeTree::build(&table(&[(b'a', 3), (b'b', 1), (b'c', 2), (b'd', 7)]));
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(tree.total_weight(), 13);

        // Full tree over n leaves has exactly n - 1 internal nodes.
        let internal = tree
            .nodes
            .iter()
            .filter(|node| matches!(node, CodeNode::Internal { .. }))
            .count();
        assert_eq!(internal, 3);
    }

    #[test]
    fn tie_break_follows_arrival_order() {
        // Equal weights: 'a' and 'b' arrive first and merge first; 'c' then
        // pairs with the merged fragment, landing on the 0 branch because
        // its weight (1) is below the fragment's (2).
        let codes = CodeTree::build(&table(&[(b'a', 1), (b'b', 1), (b'c', 1)])).derive_code_table();
        let c = codes.code(b'c').expect("coded");
        assert_eq!(c.len(), 1);
        assert!(!c[0]);
        assert_eq!(codes.code(b'a').map(|c| c.len()), Some(2));
        assert_eq!(codes.code(b'b').map(|c| c.len()), Some(2));
    }

    #[test]
    fn identical_tables_build_identical_trees() {
        let frequencies = table(&[(b'x', 4), (b'y', 4), (b'z', 4), (b'w', 2)]);
        let first = CodeTree::build(&frequencies);
        let second = CodeTree::build(&frequencies);
        assert_eq!(first, second);
        assert_eq!(first.derive_code_table(), second.derive_code_table());
    }

    #[test]
    fn single_symbol_gets_one_bit_code() {
        let codes = CodeTree::build(&table(&[(b'a', 42)])).derive_code_table();
        let code = codes.code(b'a').expect("symbol should be coded");
        assert_eq!(code.len(), 1);
        assert!(!code[0]);
    }

    #[test]
    fn heavier_symbols_get_shorter_codes() {
        let codes =
            CodeTree::build(&table(&[(b'a', 100), (b'b', 1), (b'c', 1)])).derive_code_table();
        let heavy = codes.code(b'a').map(|c| c.len()).expect("coded");
        let light = codes.code(b'b').map(|c| c.len()).expect("coded");
        assert!(heavy < light);
    }
}
