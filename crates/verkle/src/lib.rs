//! Verkle trie over Pedersen vector commitments.
//!
//! A 256-ary radix trie keyed by 32-byte keys. Keys sharing their first 31
//! bytes (the stem) live in one leaf bundle; every subtree is bound to a
//! single commitment whose scalar image is what the parent commits to.

pub mod node;
pub mod trie;
pub mod keys;
pub mod code;

use pedersen::PedersenError;
use primitives::CodecError;
use thiserror::Error;

pub use node::{InternalNode, LeafNode, Node, NodeId};
pub use trie::VerkleTrie;
pub use keys::TreeKeyDeriver;

/// Trie layout (fixed for every trie sharing a basis).
pub mod params {
    pub use primitives::{KEY_LEN, STEM_LEN, VALUE_LEN};

    /// Child slots per internal node; also the minimum basis width.
    pub const NODE_WIDTH: usize = 256;
    /// Suffixes covered by each of the two leaf sub-commitments.
    pub const SUFFIXES_PER_SUBCOMMITMENT: usize = NODE_WIDTH / 2;

    /// Positions inside a leaf's stem commitment.
    pub const LEAF_MARKER_POS: usize = 0;
    pub const LEAF_STEM_POS: usize = 1;
    pub const LEAF_C1_POS: usize = 2;
    pub const LEAF_C2_POS: usize = 3;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrieError {
    #[error("insertion failed: invalid key: {0}")]
    InvalidKey(CodecError),
    #[error("insertion failed: invalid value: {0}")]
    InvalidValue(CodecError),
    #[error("basis width {width} is narrower than the node width {required}")]
    BasisTooNarrow { width: usize, required: usize },
    #[error(transparent)]
    Pedersen(#[from] PedersenError),
    #[error("cached commitment of node {node} differs from full recomputation")]
    CommitmentMismatch { node: u32 },
    #[error("trie has uncommitted changes")]
    Uncommitted,
}
