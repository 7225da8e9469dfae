//! In-memory verkle trie with lazy commitment propagation.
//!
//! Inserts only touch values and dirty flags. `commit` walks the dirty part
//! of the trie bottom-up: leaves fold their changed value slots into their
//! sub-commitments, internal nodes fold the changed child scalars into their
//! own commitment. A clean subtree is never revisited.

use std::sync::Arc;

use ff::Field;
use pedersen::Committer;
use primitives::{map_to_scalar, Commitment, Key, Point, RootHash, Scalar, Value};
use tracing::{debug, trace};

use crate::node::{InternalNode, LeafNode, Node, NodeId};
use crate::params::NODE_WIDTH;
use crate::TrieError;

const ROOT: NodeId = NodeId(0);

#[derive(Clone, Debug)]
pub struct VerkleTrie {
    committer: Arc<Committer>,
    nodes: Vec<Node>,
    len: usize,
}

impl VerkleTrie {
    /// Empty trie over `committer`'s basis.
    pub fn new(committer: Arc<Committer>) -> Result<Self, TrieError> {
        if committer.width() < NODE_WIDTH {
            return Err(TrieError::BasisTooNarrow { width: committer.width(), required: NODE_WIDTH });
        }
        Ok(Self { committer, nodes: vec![Node::Internal(InternalNode::new(0))], len: 0 })
    }

    pub fn committer(&self) -> &Arc<Committer> { &self.committer }

    /// Number of stored (key, value) pairs.
    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    pub fn node_count(&self) -> usize { self.nodes.len() }

    pub fn root_id(&self) -> NodeId { ROOT }

    /// # Panics
    /// If `id` was not issued by this trie.
    pub fn node(&self, id: NodeId) -> &Node {
        self.nodes
            .get(id.index())
            .unwrap_or_else(|| panic!("dangling node id {} (arena holds {})", id.0, self.nodes.len()))
    }

    /// Whether any node still has changes not folded into its commitment.
    pub fn is_dirty(&self) -> bool { self.node(ROOT).is_dirty() }

    /// Insert raw key/value bytes. Both must be exactly 32 bytes long;
    /// on error the trie is left untouched.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), TrieError> {
        let key = Key::try_from(key).map_err(TrieError::InvalidKey)?;
        let value = Value::try_from(value).map_err(TrieError::InvalidValue)?;
        self.insert_kv(key, value);
        Ok(())
    }

    pub fn insert_batch<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (Key, Value)>,
    {
        for (key, value) in entries {
            self.insert_kv(key, value);
        }
    }

    /// Upsert `value` under `key`, returning the value it replaced.
    pub fn insert_kv(&mut self, key: Key, value: Value) -> Option<Value> {
        let stem = key.stem();
        let mut parent = ROOT;
        let mut depth = 0;
        loop {
            let slot = stem.0[depth];
            let child = {
                let node = self.internal_mut(parent);
                node.dirty = true;
                node.children[slot as usize]
            };

            let Some(child) = child else {
                let mut leaf = LeafNode::new(stem);
                leaf.set(key.suffix(), value);
                let id = self.push(Node::Leaf(leaf));
                self.internal_mut(parent).children[slot as usize] = Some(id);
                self.len += 1;
                debug!(depth, stem = %stem.to_hex(), "created leaf");
                return None;
            };

            match &mut self.nodes[child.index()] {
                Node::Internal(_) => {
                    parent = child;
                    depth += 1;
                }
                Node::Leaf(leaf) if leaf.stem == stem => {
                    let old = leaf.set(key.suffix(), value);
                    if old.is_none() {
                        self.len += 1;
                    }
                    return old;
                }
                Node::Leaf(leaf) => {
                    let other = leaf.stem;
                    let split_at = stem.common_prefix_len(&other);
                    debug!(depth, split_at, "splitting stems");

                    // Chain of internal nodes for the bytes both stems share
                    // below `depth`, ending with the branch at `split_at`.
                    let mut attach = (parent, slot);
                    for d in depth + 1..=split_at {
                        let id = self.push(Node::Internal(InternalNode::new(d)));
                        let (p, s) = attach;
                        self.internal_mut(p).children[s as usize] = Some(id);
                        attach = (id, stem.0[d]);
                    }
                    let branch = attach.0;

                    let mut leaf = LeafNode::new(stem);
                    leaf.set(key.suffix(), value);
                    let new_leaf = self.push(Node::Leaf(leaf));
                    let node = self.internal_mut(branch);
                    node.children[other.0[split_at] as usize] = Some(child);
                    node.children[stem.0[split_at] as usize] = Some(new_leaf);
                    self.len += 1;
                    return None;
                }
            }
        }
    }

    pub fn get(&self, key: &Key) -> Option<Value> {
        let stem = key.stem();
        let mut id = ROOT;
        for byte in stem.0 {
            let Node::Internal(node) = self.node(id) else { return None };
            id = node.children[byte as usize]?;
            if let Node::Leaf(leaf) = self.node(id) {
                return if leaf.stem == stem { leaf.value(key.suffix()).copied() } else { None };
            }
        }
        None
    }

    /// Fold every pending change into the cached commitments.
    pub fn commit(&mut self) -> Result<(), TrieError> {
        let refreshed = self.commit_node(ROOT)?;
        if refreshed > 0 {
            debug!(refreshed, nodes = self.nodes.len(), "committed trie");
        }
        Ok(())
    }

    pub fn root_commitment(&mut self) -> Result<Commitment, TrieError> {
        self.commit()?;
        Ok(self.node(ROOT).commitment())
    }

    pub fn root_hash(&mut self) -> Result<RootHash, TrieError> {
        self.commit()?;
        Ok(RootHash::from_scalar(&self.node(ROOT).hash()))
    }

    /// Root hash as of the last commit; `None` while changes are pending.
    pub fn committed_root_hash(&self) -> Option<RootHash> {
        let root = self.node(ROOT);
        (!root.is_dirty()).then(|| RootHash::from_scalar(&root.hash()))
    }

    /// Root commitment rebuilt from the stored values, bypassing every cache.
    pub fn recompute_root_commitment(&self) -> Result<Commitment, TrieError> {
        Ok(Commitment::from_point(&self.recompute(ROOT)?))
    }

    /// Check every cached commitment against a full recomputation.
    pub fn verify_integrity(&self) -> Result<(), TrieError> {
        if self.is_dirty() {
            return Err(TrieError::Uncommitted);
        }
        self.verify_node(ROOT).map(|_| ())
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn internal_mut(&mut self, id: NodeId) -> &mut InternalNode {
        match &mut self.nodes[id.index()] {
            Node::Internal(node) => node,
            Node::Leaf(_) => panic!("node {} is a leaf where an internal node was linked", id.0),
        }
    }

    /// Returns the number of nodes whose commitment was refreshed.
    fn commit_node(&mut self, id: NodeId) -> Result<usize, TrieError> {
        let committer = Arc::clone(&self.committer);
        let children: Vec<(u8, NodeId)> = match &mut self.nodes[id.index()] {
            Node::Leaf(leaf) => {
                if !leaf.is_dirty() {
                    return Ok(0);
                }
                leaf.commit(&committer)?;
                return Ok(1);
            }
            Node::Internal(node) if !node.dirty => return Ok(0),
            Node::Internal(node) => node.children().collect(),
        };

        let mut refreshed = 0;
        let mut scalars = Vec::with_capacity(children.len());
        for (slot, child) in children {
            refreshed += self.commit_node(child)?;
            scalars.push((slot, self.nodes[child.index()].hash()));
        }

        let node = self.internal_mut(id);
        for (slot, scalar) in scalars {
            if node.fold_child(&committer, slot as usize, scalar)? {
                trace!(node = id.0, slot, depth = node.depth, "folded child delta");
            }
        }
        node.seal();
        Ok(refreshed + 1)
    }

    fn recompute(&self, id: NodeId) -> Result<Point, TrieError> {
        match self.node(id) {
            Node::Leaf(leaf) => Ok(leaf.recompute(&self.committer)?),
            Node::Internal(node) => {
                let mut scalars = vec![Scalar::ZERO; NODE_WIDTH];
                for (slot, child) in node.children() {
                    scalars[slot as usize] = map_to_scalar(&self.recompute(child)?);
                }
                Ok(self.committer.try_commit(&scalars)?)
            }
        }
    }

    /// Recomputes the subtree at `id`, failing on the first cached
    /// commitment that disagrees.
    fn verify_node(&self, id: NodeId) -> Result<Point, TrieError> {
        let node = self.node(id);
        let fresh = match node {
            Node::Leaf(leaf) => leaf.recompute(&self.committer)?,
            Node::Internal(internal) => {
                let mut scalars = vec![Scalar::ZERO; NODE_WIDTH];
                for (slot, child) in internal.children() {
                    scalars[slot as usize] = map_to_scalar(&self.verify_node(child)?);
                }
                self.committer.try_commit(&scalars)?
            }
        };
        if fresh != node.point() {
            return Err(TrieError::CommitmentMismatch { node: id.0 });
        }
        Ok(fresh)
    }
}

impl Default for VerkleTrie {
    fn default() -> Self {
        Self {
            committer: Committer::default_shared(),
            nodes: vec![Node::Internal(InternalNode::new(0))],
            len: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pedersen::CommitterConfig;

    fn key(stem_byte: u8, suffix: u8) -> Key {
        let mut k = [stem_byte; 32];
        k[31] = suffix;
        Key(k)
    }

    #[test]
    fn rejects_narrow_basis() {
        let narrow = Arc::new(Committer::new(CommitterConfig { width: 4, ..Default::default() }));
        assert_eq!(
            VerkleTrie::new(narrow).unwrap_err(),
            TrieError::BasisTooNarrow { width: 4, required: NODE_WIDTH }
        );
    }

    #[test]
    fn same_stem_shares_one_leaf() {
        let mut trie = VerkleTrie::default();
        trie.insert_kv(key(1, 0), Value([1; 32]));
        trie.insert_kv(key(1, 9), Value([2; 32]));
        assert_eq!(trie.node_count(), 2);
        assert_eq!(trie.len(), 2);
        let root = trie.node(trie.root_id()).as_internal().unwrap();
        let leaf = trie.node(root.child(1).unwrap()).as_leaf().unwrap();
        assert_eq!(leaf.len(), 2);
    }

    #[test]
    fn overwrite_returns_previous_value() {
        let mut trie = VerkleTrie::default();
        assert_eq!(trie.insert_kv(key(1, 0), Value([1; 32])), None);
        assert_eq!(trie.insert_kv(key(1, 0), Value([2; 32])), Some(Value([1; 32])));
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.get(&key(1, 0)), Some(Value([2; 32])));
    }

    #[test]
    fn split_builds_chain_to_first_difference() {
        let mut trie = VerkleTrie::default();
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        a[3] = 1;
        b[3] = 2;
        trie.insert_kv(Key(a), Value([1; 32]));
        trie.insert_kv(Key(b), Value([2; 32]));

        // root -> depth 1 -> depth 2 -> depth 3 branch -> two leaves
        assert_eq!(trie.node_count(), 6);
        let mut id = trie.root_id();
        for depth in 0..3 {
            let node = trie.node(id).as_internal().unwrap();
            assert_eq!(node.depth(), depth);
            assert_eq!(node.children().count(), 1);
            id = node.child(0).unwrap();
        }
        let branch = trie.node(id).as_internal().unwrap();
        assert_eq!(branch.depth(), 3);
        assert!(trie.node(branch.child(1).unwrap()).is_leaf());
        assert!(trie.node(branch.child(2).unwrap()).is_leaf());
    }

    #[test]
    fn get_misses_on_absent_key_and_stem_mismatch() {
        let mut trie = VerkleTrie::default();
        trie.insert_kv(key(1, 0), Value([1; 32]));
        assert_eq!(trie.get(&key(1, 1)), None);
        assert_eq!(trie.get(&key(2, 0)), None);
        let mut near = key(1, 0);
        near.0[30] = 0xff;
        assert_eq!(trie.get(&near), None);
    }

    #[test]
    fn commit_is_idempotent() {
        let mut trie = VerkleTrie::default();
        trie.insert_kv(key(1, 0), Value([1; 32]));
        assert_eq!(trie.committed_root_hash(), None);
        let first = trie.root_hash().unwrap();
        assert_eq!(trie.committed_root_hash(), Some(first));
        assert_eq!(trie.commit_node(ROOT).unwrap(), 0);
        assert_eq!(trie.root_hash().unwrap(), first);
    }

    #[test]
    fn only_touched_path_is_refreshed() {
        let mut trie = VerkleTrie::default();
        trie.insert_kv(key(1, 0), Value([1; 32]));
        trie.insert_kv(key(2, 0), Value([2; 32]));
        trie.commit().unwrap();
        trie.insert_kv(key(2, 1), Value([3; 32]));
        // leaf 2 and the root
        assert_eq!(trie.commit_node(ROOT).unwrap(), 2);
        trie.verify_integrity().unwrap();
    }

    #[test]
    fn integrity_check_catches_stale_cache() {
        let mut trie = VerkleTrie::default();
        trie.insert_kv(key(1, 0), Value([1; 32]));
        trie.insert_kv(key(2, 0), Value([2; 32]));
        trie.commit().unwrap();
        trie.insert_kv(key(2, 0), Value([5; 32]));
        assert_eq!(trie.verify_integrity(), Err(TrieError::Uncommitted));

        trie.commit().unwrap();
        if let Node::Leaf(leaf) = &mut trie.nodes[2] {
            leaf.values[0] = Some(Value([6; 32]));
        }
        assert_eq!(trie.verify_integrity(), Err(TrieError::CommitmentMismatch { node: 2 }));
    }
}
