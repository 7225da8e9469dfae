//! Arena node types and their commitment arithmetic.

use std::collections::BTreeMap;

use ff::Field;
use group::Group;
use pedersen::{Committer, PedersenError};
use primitives::{map_to_scalar, scalar_from_le_bytes_mod_order, Commitment, Point, Scalar, Stem, Value};

use crate::params::{
    LEAF_C1_POS, LEAF_C2_POS, LEAF_MARKER_POS, LEAF_STEM_POS, NODE_WIDTH, SUFFIXES_PER_SUBCOMMITMENT,
};

/// Index of a node in its trie's arena.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(&self) -> usize { self.0 as usize }
}

#[derive(Clone, Debug)]
pub enum Node {
    Internal(InternalNode),
    Leaf(LeafNode),
}

impl Node {
    pub fn is_leaf(&self) -> bool { matches!(self, Node::Leaf(_)) }

    pub fn is_internal(&self) -> bool { matches!(self, Node::Internal(_)) }

    pub fn as_internal(&self) -> Option<&InternalNode> {
        match self {
            Node::Internal(n) => Some(n),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Node::Leaf(l) => Some(l),
            Node::Internal(_) => None,
        }
    }

    /// Whether the cached commitment lags behind the node's contents.
    pub fn is_dirty(&self) -> bool {
        match self {
            Node::Internal(n) => n.dirty,
            Node::Leaf(l) => l.is_dirty(),
        }
    }

    /// Scalar image of the cached commitment (what the parent folds in).
    pub(crate) fn hash(&self) -> Scalar {
        match self {
            Node::Internal(n) => n.hash,
            Node::Leaf(l) => l.hash,
        }
    }

    pub(crate) fn point(&self) -> Point {
        match self {
            Node::Internal(n) => n.commitment,
            Node::Leaf(l) => l.commitment,
        }
    }

    pub fn commitment(&self) -> Commitment { Commitment::from_point(&self.point()) }
}

/// 256 child slots plus a commitment over the children's scalars.
#[derive(Clone, Debug)]
pub struct InternalNode {
    pub(crate) depth: usize,
    pub(crate) children: Box<[Option<NodeId>; NODE_WIDTH]>,
    /// Child scalars as last folded into `commitment`.
    pub(crate) child_scalars: Box<[Scalar; NODE_WIDTH]>,
    pub(crate) commitment: Point,
    pub(crate) hash: Scalar,
    pub(crate) dirty: bool,
}

impl InternalNode {
    pub(crate) fn new(depth: usize) -> Self {
        Self {
            depth,
            children: Box::new([None; NODE_WIDTH]),
            child_scalars: Box::new([Scalar::ZERO; NODE_WIDTH]),
            commitment: Point::identity(),
            hash: Scalar::ZERO,
            dirty: true,
        }
    }

    pub fn depth(&self) -> usize { self.depth }

    pub fn child(&self, slot: u8) -> Option<NodeId> { self.children[slot as usize] }

    /// Occupied slots in ascending order.
    pub fn children(&self) -> impl Iterator<Item = (u8, NodeId)> + '_ {
        self.children.iter().enumerate().filter_map(|(i, c)| c.map(|id| (i as u8, id)))
    }

    /// Fold a child's new scalar into the commitment as a delta.
    pub(crate) fn fold_child(
        &mut self,
        committer: &Committer,
        slot: usize,
        scalar: Scalar,
    ) -> Result<bool, PedersenError> {
        let old = self.child_scalars[slot];
        if old == scalar {
            return Ok(false);
        }
        self.commitment = committer.update(&self.commitment, slot, &old, &scalar)?;
        self.child_scalars[slot] = scalar;
        Ok(true)
    }

    pub(crate) fn seal(&mut self) {
        self.hash = map_to_scalar(&self.commitment);
        self.dirty = false;
    }
}

/// Stem bundle: up to 256 values sharing a 31-byte stem.
///
/// Values at suffixes 0..128 are committed in `c1`, 128..256 in `c2`, each
/// as a (low, high) scalar pair; the stem commitment then binds
/// `[1, stem, hash(c1), hash(c2)]`.
#[derive(Clone, Debug)]
pub struct LeafNode {
    pub(crate) stem: Stem,
    pub(crate) values: Box<[Option<Value>; NODE_WIDTH]>,
    pub(crate) c1: Point,
    pub(crate) c2: Point,
    pub(crate) c1_hash: Scalar,
    pub(crate) c2_hash: Scalar,
    pub(crate) commitment: Point,
    pub(crate) hash: Scalar,
    /// Suffix -> value as of the last commit, for every slot touched since.
    pub(crate) pending: BTreeMap<u8, Option<Value>>,
    /// False until the first commit computes everything from scratch.
    pub(crate) committed: bool,
}

impl LeafNode {
    pub(crate) fn new(stem: Stem) -> Self {
        Self {
            stem,
            values: Box::new([None; NODE_WIDTH]),
            c1: Point::identity(),
            c2: Point::identity(),
            c1_hash: Scalar::ZERO,
            c2_hash: Scalar::ZERO,
            commitment: Point::identity(),
            hash: Scalar::ZERO,
            pending: BTreeMap::new(),
            committed: false,
        }
    }

    pub fn stem(&self) -> &Stem { &self.stem }

    pub fn value(&self, suffix: u8) -> Option<&Value> { self.values[suffix as usize].as_ref() }

    pub fn len(&self) -> usize { self.values.iter().filter(|v| v.is_some()).count() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub(crate) fn is_dirty(&self) -> bool { !self.committed || !self.pending.is_empty() }

    /// Upsert a value, returning the previous one.
    pub(crate) fn set(&mut self, suffix: u8, value: Value) -> Option<Value> {
        let old = self.values[suffix as usize].replace(value);
        if self.committed {
            // Only the value seen at the last commit matters for the delta.
            self.pending.entry(suffix).or_insert(old);
        }
        old
    }

    /// Bring the cached commitments up to date with the stored values.
    pub(crate) fn commit(&mut self, committer: &Committer) -> Result<(), PedersenError> {
        if !self.committed {
            let (c1, c2) = self.suffix_commitments(committer)?;
            self.c1 = c1;
            self.c2 = c2;
            self.c1_hash = map_to_scalar(&c1);
            self.c2_hash = map_to_scalar(&c2);
            self.commitment = stem_commitment(committer, &self.stem, self.c1_hash, self.c2_hash)?;
            self.hash = map_to_scalar(&self.commitment);
            self.pending.clear();
            self.committed = true;
            return Ok(());
        }
        if self.pending.is_empty() {
            return Ok(());
        }

        for (suffix, old) in std::mem::take(&mut self.pending) {
            let (old_lo, old_hi) = value_scalars(old.as_ref());
            let (new_lo, new_hi) = value_scalars(self.values[suffix as usize].as_ref());
            let pos = 2 * (suffix as usize % SUFFIXES_PER_SUBCOMMITMENT);
            let sub = if (suffix as usize) < SUFFIXES_PER_SUBCOMMITMENT {
                &mut self.c1
            } else {
                &mut self.c2
            };
            *sub = committer.update(sub, pos, &old_lo, &new_lo)?;
            *sub = committer.update(sub, pos + 1, &old_hi, &new_hi)?;
        }

        let c1_hash = map_to_scalar(&self.c1);
        let c2_hash = map_to_scalar(&self.c2);
        self.commitment = committer.update(&self.commitment, LEAF_C1_POS, &self.c1_hash, &c1_hash)?;
        self.commitment = committer.update(&self.commitment, LEAF_C2_POS, &self.c2_hash, &c2_hash)?;
        self.c1_hash = c1_hash;
        self.c2_hash = c2_hash;
        self.hash = map_to_scalar(&self.commitment);
        Ok(())
    }

    /// `(c1, c2)` computed from the stored values alone.
    pub(crate) fn suffix_commitments(&self, committer: &Committer) -> Result<(Point, Point), PedersenError> {
        let mut c1 = vec![Scalar::ZERO; NODE_WIDTH];
        let mut c2 = vec![Scalar::ZERO; NODE_WIDTH];
        for (suffix, value) in self.values.iter().enumerate() {
            let Some(value) = value else { continue };
            let (lo, hi) = value_scalars(Some(value));
            let target = if suffix < SUFFIXES_PER_SUBCOMMITMENT { &mut c1 } else { &mut c2 };
            let pos = 2 * (suffix % SUFFIXES_PER_SUBCOMMITMENT);
            target[pos] = lo;
            target[pos + 1] = hi;
        }
        Ok((committer.try_commit(&c1)?, committer.try_commit(&c2)?))
    }

    /// Stem commitment computed from scratch, ignoring every cache.
    pub(crate) fn recompute(&self, committer: &Committer) -> Result<Point, PedersenError> {
        let (c1, c2) = self.suffix_commitments(committer)?;
        stem_commitment(committer, &self.stem, map_to_scalar(&c1), map_to_scalar(&c2))
    }
}

/// `Commit([1, stem, c1_hash, c2_hash])`.
fn stem_commitment(
    committer: &Committer,
    stem: &Stem,
    c1_hash: Scalar,
    c2_hash: Scalar,
) -> Result<Point, PedersenError> {
    let mut v = [Scalar::ZERO; 4];
    v[LEAF_MARKER_POS] = Scalar::ONE;
    v[LEAF_STEM_POS] = scalar_from_le_bytes_mod_order(&stem.0);
    v[LEAF_C1_POS] = c1_hash;
    v[LEAF_C2_POS] = c2_hash;
    committer.try_commit(&v)
}

/// Low/high scalar pair for a value slot. The low half carries a 2^128
/// marker so that a stored zero value differs from an empty slot.
pub fn value_scalars(value: Option<&Value>) -> (Scalar, Scalar) {
    match value {
        None => (Scalar::ZERO, Scalar::ZERO),
        Some(v) => {
            let mut lo = [0u8; 17];
            lo[..16].copy_from_slice(v.low_half());
            lo[16] = 1;
            (scalar_from_le_bytes_mod_order(&lo), scalar_from_le_bytes_mod_order(v.high_half()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stem(b: u8) -> Stem { Stem([b; 31]) }

    #[test]
    fn zero_value_differs_from_empty_slot() {
        let (lo, hi) = value_scalars(Some(&Value([0u8; 32])));
        assert_ne!(lo, Scalar::ZERO);
        assert_eq!(hi, Scalar::ZERO);
        assert_eq!(value_scalars(None), (Scalar::ZERO, Scalar::ZERO));
    }

    #[test]
    fn value_halves_are_little_endian() {
        let mut raw = [0u8; 32];
        raw[0] = 2;
        raw[16] = 3;
        let (lo, hi) = value_scalars(Some(&Value(raw)));
        let marker = scalar_from_le_bytes_mod_order(&[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(lo, Scalar::from(2u64) + marker);
        assert_eq!(hi, Scalar::from(3u64));
    }

    #[test]
    fn leaf_delta_matches_recomputation() {
        let committer = Committer::default_shared();
        let mut leaf = LeafNode::new(stem(7));
        leaf.set(0, Value([1u8; 32]));
        leaf.set(200, Value([2u8; 32]));
        leaf.commit(&committer).unwrap();
        assert_eq!(leaf.commitment, leaf.recompute(&committer).unwrap());

        // Overwrite in c1, fresh insert in c2, then touch the same slot twice.
        leaf.set(0, Value([9u8; 32]));
        leaf.set(255, Value([3u8; 32]));
        leaf.set(255, Value([4u8; 32]));
        assert!(leaf.is_dirty());
        leaf.commit(&committer).unwrap();
        assert!(!leaf.is_dirty());
        assert_eq!(leaf.commitment, leaf.recompute(&committer).unwrap());
        assert_eq!(leaf.c1, leaf.suffix_commitments(&committer).unwrap().0);
    }

    #[test]
    fn rewriting_same_value_keeps_commitment() {
        let committer = Committer::default_shared();
        let mut leaf = LeafNode::new(stem(1));
        leaf.set(5, Value([5u8; 32]));
        leaf.commit(&committer).unwrap();
        let before = leaf.commitment;
        leaf.set(5, Value([5u8; 32]));
        leaf.commit(&committer).unwrap();
        assert_eq!(leaf.commitment, before);
    }

    #[test]
    fn stem_is_bound() {
        let committer = Committer::default_shared();
        let mut a = LeafNode::new(stem(1));
        let mut b = LeafNode::new(stem(2));
        a.set(0, Value([1u8; 32]));
        b.set(0, Value([1u8; 32]));
        a.commit(&committer).unwrap();
        b.commit(&committer).unwrap();
        assert_ne!(a.commitment, b.commitment);
    }

    #[test]
    fn internal_fold_matches_full_commit() {
        let committer = Committer::default_shared();
        let mut node = InternalNode::new(0);
        assert!(node.fold_child(&committer, 3, Scalar::from(10u64)).unwrap());
        assert!(node.fold_child(&committer, 3, Scalar::from(11u64)).unwrap());
        assert!(!node.fold_child(&committer, 3, Scalar::from(11u64)).unwrap());
        node.fold_child(&committer, 200, Scalar::from(12u64)).unwrap();
        assert_eq!(node.commitment, committer.commit(&node.child_scalars[..]));
        node.seal();
        assert!(!node.dirty);
        assert_eq!(node.hash, map_to_scalar(&node.commitment));
    }
}
