//! Arena-backed red-black tree for exact-match lookup.
//!
//! Nodes live in a flat `Vec` addressed by integer handles; rotations are
//! index reassignments, and parent back-references are explicit fields
//! updated together with the child links. Absent children are `None` and
//! count as black.
//!
//! Three invariants hold between operations: the root is black, no red
//! node has a red child, and every root-to-nil path carries the same
//! number of black nodes. [`RedBlackTree::check_invariants`] audits all
//! three (test/debug support).

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

use super::IndexError;

type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone)]
struct RbNode<K, V> {
    key: K,
    value: V,
    color: Color,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// Ordered map with O(log n) worst-case insert and search, no delete.
///
/// Entries are append/update only: inserting an existing key replaces its
/// value in place without allocating a node.
#[derive(Debug, Clone)]
pub struct RedBlackTree<K, V> {
    nodes: Vec<RbNode<K, V>>,
    root: Option<NodeId>,
}

impl<K: Ord, V> RedBlackTree<K, V> {
    /// An empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` when no key is stored.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert `key` with `value`, rebalancing up to the root.
    ///
    /// Returns the previous value when the key was already present (the
    /// value is replaced in place; no duplicate node is created).
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut parent: Option<NodeId> = None;
        let mut cursor = self.root;
        let mut went_left = false;

        while let Some(id) = cursor {
            parent = Some(id);
            match key.cmp(&self.nodes[id].key) {
                Ordering::Less => {
                    cursor = self.nodes[id].left;
                    went_left = true;
                }
                Ordering::Greater => {
                    cursor = self.nodes[id].right;
                    went_left = false;
                }
                Ordering::Equal => {
                    return Some(std::mem::replace(&mut self.nodes[id].value, value));
                }
            }
        }

        let id = self.nodes.len();
        self.nodes.push(RbNode {
            key,
            value,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        });

        match parent {
            None => self.root = Some(id),
            Some(p) if went_left => self.nodes[p].left = Some(id),
            Some(p) => self.nodes[p].right = Some(id),
        }

        self.fix_insert(id);
        debug_assert_eq!(self.color(self.root), Color::Black);
        None
    }

    /// Strict insert-if-absent variant.
    pub fn insert_new(&mut self, key: K, value: V) -> Result<(), IndexError>
    where
        K: fmt::Display,
    {
        if self.get(&key).is_some() {
            return Err(IndexError::DuplicateKeyConflict {
                key: key.to_string(),
            });
        }
        self.insert(key, value);
        Ok(())
    }

    /// Exact-match search. A miss is a normal outcome, reported as `None`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            match key.cmp(self.nodes[id].key.borrow()) {
                Ordering::Less => cursor = self.nodes[id].left,
                Ordering::Greater => cursor = self.nodes[id].right,
                Ordering::Equal => return Some(&self.nodes[id].value),
            }
        }
        None
    }

    /// `true` when `key` is stored.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Audit the three red-black invariants plus BST ordering.
    ///
    /// A violation indicates an implementation bug, never a caller error;
    /// release builds are expected to make this unreachable.
    pub fn check_invariants(&self) -> Result<(), IndexError> {
        if self.color(self.root) != Color::Black {
            return Err(IndexError::TreeInvariantViolation {
                detail: "root is red".to_string(),
            });
        }
        self.audit(self.root)?;
        Ok(())
    }

    /// Returns the black-height of the audited subtree.
    fn audit(&self, node: Option<NodeId>) -> Result<usize, IndexError> {
        let Some(id) = node else {
            // Nil leaves are black.
            return Ok(1);
        };
        let n = &self.nodes[id];

        if n.color == Color::Red
            && (self.color(n.left) == Color::Red || self.color(n.right) == Color::Red)
        {
            return Err(IndexError::TreeInvariantViolation {
                detail: format!("red node {id} has a red child"),
            });
        }
        if let Some(l) = n.left {
            if self.nodes[l].key >= n.key {
                return Err(IndexError::TreeInvariantViolation {
                    detail: format!("left child of node {id} is not smaller"),
                });
            }
        }
        if let Some(r) = n.right {
            if self.nodes[r].key <= n.key {
                return Err(IndexError::TreeInvariantViolation {
                    detail: format!("right child of node {id} is not larger"),
                });
            }
        }

        let left_height = self.audit(n.left)?;
        let right_height = self.audit(n.right)?;
        if left_height != right_height {
            return Err(IndexError::TreeInvariantViolation {
                detail: format!("black-height mismatch under node {id}"),
            });
        }

        Ok(left_height + usize::from(n.color == Color::Black))
    }

    fn color(&self, node: Option<NodeId>) -> Color {
        node.map_or(Color::Black, |id| self.nodes[id].color)
    }

    fn rotate_left(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x].right else {
            debug_assert!(false, "rotate_left requires a right child");
            return;
        };

        self.nodes[x].right = self.nodes[y].left;
        if let Some(child) = self.nodes[y].left {
            self.nodes[child].parent = Some(x);
        }

        self.nodes[y].parent = self.nodes[x].parent;
        match self.nodes[x].parent {
            None => self.root = Some(y),
            Some(p) if self.nodes[p].left == Some(x) => self.nodes[p].left = Some(y),
            Some(p) => self.nodes[p].right = Some(y),
        }

        self.nodes[y].left = Some(x);
        self.nodes[x].parent = Some(y);
    }

    fn rotate_right(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x].left else {
            debug_assert!(false, "rotate_right requires a left child");
            return;
        };

        self.nodes[x].left = self.nodes[y].right;
        if let Some(child) = self.nodes[y].right {
            self.nodes[child].parent = Some(x);
        }

        self.nodes[y].parent = self.nodes[x].parent;
        match self.nodes[x].parent {
            None => self.root = Some(y),
            Some(p) if self.nodes[p].right == Some(x) => self.nodes[p].right = Some(y),
            Some(p) => self.nodes[p].left = Some(y),
        }

        self.nodes[y].right = Some(x);
        self.nodes[x].parent = Some(y);
    }

    /// Restore the invariants after attaching the red node `k`, climbing
    /// toward the root with recolorings and at most two rotations per
    /// level.
    fn fix_insert(&mut self, mut k: NodeId) {
        while let Some(p) = self.nodes[k].parent {
            if self.nodes[p].color == Color::Black {
                break;
            }
            // A red parent is never the root, so the grandparent exists.
            let Some(gp) = self.nodes[p].parent else {
                break;
            };

            if Some(p) == self.nodes[gp].left {
                let uncle = self.nodes[gp].right;
                if self.color(uncle) == Color::Red {
                    if let Some(u) = uncle {
                        self.nodes[u].color = Color::Black;
                    }
                    self.nodes[p].color = Color::Black;
                    self.nodes[gp].color = Color::Red;
                    k = gp;
                } else {
                    if Some(k) == self.nodes[p].right {
                        k = p;
                        self.rotate_left(k);
                    }
                    if let Some(p) = self.nodes[k].parent {
                        self.nodes[p].color = Color::Black;
                        if let Some(g) = self.nodes[p].parent {
                            self.nodes[g].color = Color::Red;
                            self.rotate_right(g);
                        }
                    }
                }
            } else {
                let uncle = self.nodes[gp].left;
                if self.color(uncle) == Color::Red {
                    if let Some(u) = uncle {
                        self.nodes[u].color = Color::Black;
                    }
                    self.nodes[p].color = Color::Black;
                    self.nodes[gp].color = Color::Red;
                    k = gp;
                } else {
                    if Some(k) == self.nodes[p].left {
                        k = p;
                        self.rotate_right(k);
                    }
                    if let Some(p) = self.nodes[k].parent {
                        self.nodes[p].color = Color::Black;
                        if let Some(g) = self.nodes[p].parent {
                            self.nodes[g].color = Color::Red;
                            self.rotate_left(g);
                        }
                    }
                }
            }
        }

        if let Some(root) = self.root {
            self.nodes[root].color = Color::Black;
        }
    }
}

impl<K: Ord, V> Default for RedBlackTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_search_finds_the_value() {
        let mut tree = RedBlackTree::new();
        for key in ["m", "c", "g", "a", "r", "t", "z"] {
            tree.insert(key.to_string(), format!("/files/{key}"));
        }

        assert_eq!(tree.get("g"), Some(&"/files/g".to_string()));
        assert_eq!(tree.get("x"), None);
        assert_eq!(tree.len(), 7);
        tree.check_invariants().expect("invariants should hold");
    }

    #[test]
    fn reinserting_a_key_updates_in_place() {
        let mut tree = RedBlackTree::new();
        assert_eq!(tree.insert("a".to_string(), 1), None);
        assert_eq!(tree.insert("a".to_string(), 2), Some(1));
        assert_eq!(tree.get("a"), Some(&2));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn sequential_inserts_stay_balanced() {
        let mut tree = RedBlackTree::new();
        for i in 0..256u32 {
            tree.insert(i, i * 10);
            tree.check_invariants().expect("invariants should hold");
        }
        for i in 0..256u32 {
            assert_eq!(tree.get(&i), Some(&(i * 10)));
        }
    }

    #[test]
    fn reverse_and_zigzag_inserts_stay_balanced() {
        let mut tree = RedBlackTree::new();
        for i in (0..128u32).rev() {
            tree.insert(i, ());
        }
        for i in [200u32, 150, 175, 160, 170, 165] {
            tree.insert(i, ());
        }
        tree.check_invariants().expect("invariants should hold");
    }

    #[test]
    fn insert_new_rejects_duplicates() {
        let mut tree = RedBlackTree::new();
        tree.insert_new("report.txt".to_string(), 1)
            .expect("first insert should succeed");
        let err = tree.insert_new("report.txt".to_string(), 2);
        assert!(matches!(
            err,
            Err(IndexError::DuplicateKeyConflict { key }) if key == "report.txt"
        ));
        assert_eq!(tree.get("report.txt"), Some(&1));
    }
}
