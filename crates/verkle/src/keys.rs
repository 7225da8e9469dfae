//! Account tree-key derivation.
//!
//! An account's header fields, its first 64 storage slots and its code
//! chunks are packed under a handful of stems; everything else spreads over
//! the main storage range. Integers (`tree_index`, `slot`) are 32-byte
//! big-endian.

use std::sync::Arc;

use pedersen::{Committer, PedersenError};
use primitives::{encode_scalar, map_to_scalar, scalar_from_le_bytes_mod_order, Key, Scalar, STEM_LEN};

pub type Address = [u8; 32];
pub type U256Bytes = [u8; 32];

/// Leading scalar of every key-derivation commitment: `2 + 256 * len(input)`
/// for the 64-byte (address, tree index) input, as in EIP-6800. Clients that
/// encode the length as 16 derive different keys.
pub const KEY_DOMAIN: u64 = 2 + 256 * 64;

pub const VERSION_LEAF_KEY: u8 = 0;
pub const BALANCE_LEAF_KEY: u8 = 1;
pub const NONCE_LEAF_KEY: u8 = 2;
pub const CODE_KECCAK_LEAF_KEY: u8 = 3;
pub const CODE_SIZE_LEAF_KEY: u8 = 4;

pub const HEADER_STORAGE_OFFSET: u64 = 64;
pub const CODE_OFFSET: u64 = 128;

#[derive(Clone, Debug)]
pub struct TreeKeyDeriver {
    committer: Arc<Committer>,
}

impl TreeKeyDeriver {
    pub fn new(committer: Arc<Committer>) -> Self { Self { committer } }

    /// Key for `(address, tree_index)` with suffix 0.
    pub fn base_key(&self, address: &Address, tree_index: &U256Bytes) -> Result<Key, PedersenError> {
        let input = [
            Scalar::from(KEY_DOMAIN),
            scalar_from_le_bytes_mod_order(&address[..16]),
            scalar_from_le_bytes_mod_order(&address[16..]),
            be_half_as_scalar(&tree_index[16..]),
            be_half_as_scalar(&tree_index[..16]),
        ];
        let point = self.committer.try_commit(&input)?;
        let mut key = encode_scalar(&map_to_scalar(&point));
        key[STEM_LEN] = 0;
        Ok(Key(key))
    }

    fn tree_key(&self, address: &Address, tree_index: &U256Bytes, suffix: u8) -> Result<Key, PedersenError> {
        Ok(Key::new(self.base_key(address, tree_index)?.stem(), suffix))
    }

    fn header_key(&self, address: &Address, leaf: u8) -> Result<Key, PedersenError> {
        self.tree_key(address, &[0u8; 32], leaf)
    }

    pub fn version_key(&self, address: &Address) -> Result<Key, PedersenError> {
        self.header_key(address, VERSION_LEAF_KEY)
    }

    pub fn balance_key(&self, address: &Address) -> Result<Key, PedersenError> {
        self.header_key(address, BALANCE_LEAF_KEY)
    }

    pub fn nonce_key(&self, address: &Address) -> Result<Key, PedersenError> {
        self.header_key(address, NONCE_LEAF_KEY)
    }

    pub fn code_keccak_key(&self, address: &Address) -> Result<Key, PedersenError> {
        self.header_key(address, CODE_KECCAK_LEAF_KEY)
    }

    pub fn code_size_key(&self, address: &Address) -> Result<Key, PedersenError> {
        self.header_key(address, CODE_SIZE_LEAF_KEY)
    }

    /// Slots below 64 share the header stem; the rest are offset by 256^31.
    pub fn storage_key(&self, address: &Address, slot: &U256Bytes) -> Result<Key, PedersenError> {
        let mut pos = *slot;
        let header_slot = slot[..31].iter().all(|b| *b == 0)
            && u64::from(slot[31]) < CODE_OFFSET - HEADER_STORAGE_OFFSET;
        if header_slot {
            pos[31] += HEADER_STORAGE_OFFSET as u8;
        } else {
            pos[0] = pos[0].wrapping_add(1);
        }
        self.position_key(address, &pos)
    }

    pub fn code_chunk_key(&self, address: &Address, chunk_id: u64) -> Result<Key, PedersenError> {
        let pos = u128::from(chunk_id) + u128::from(CODE_OFFSET);
        let mut bytes = [0u8; 32];
        bytes[16..].copy_from_slice(&pos.to_be_bytes());
        self.position_key(address, &bytes)
    }

    /// `pos / 256` selects the stem, `pos % 256` the suffix.
    fn position_key(&self, address: &Address, pos: &U256Bytes) -> Result<Key, PedersenError> {
        let mut tree_index = [0u8; 32];
        tree_index[1..].copy_from_slice(&pos[..31]);
        self.tree_key(address, &tree_index, pos[31])
    }
}

/// A 16-byte big-endian half read as a little-endian field element.
fn be_half_as_scalar(half: &[u8]) -> Scalar {
    let mut le = [0u8; 16];
    le.copy_from_slice(half);
    le.reverse();
    scalar_from_le_bytes_mod_order(&le)
}
