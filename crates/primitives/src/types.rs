//! Fixed-width keys, values and commitment encodings.

use serde::{Deserialize, Serialize};

use crate::curve::{decode_point, encode_point, encode_scalar, Point, Scalar};
use crate::encode::{encode_hex, fixed_from_slice, CodecError};

pub const KEY_LEN: usize = 32;
pub const VALUE_LEN: usize = 32;
/// Stem = every key byte except the last.
pub const STEM_LEN: usize = KEY_LEN - 1;

/// 32-byte trie key: 31-byte stem followed by a one-byte suffix.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Debug, Default,
)]
pub struct Key(pub [u8; KEY_LEN]);

/// 32-byte trie value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug, Default)]
pub struct Value(pub [u8; VALUE_LEN]);

/// Shared prefix of every key living in the same leaf bundle.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Debug, Default,
)]
pub struct Stem(pub [u8; STEM_LEN]);

/// Compressed encoding of a commitment point.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug, Default)]
pub struct Commitment(pub [u8; 32]);

/// Little-endian encoding of the scalar derived from a root commitment.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug, Default)]
pub struct RootHash(pub [u8; 32]);

impl Key {
    pub fn new(stem: Stem, suffix: u8) -> Self {
        let mut out = [0u8; KEY_LEN];
        out[..STEM_LEN].copy_from_slice(&stem.0);
        out[STEM_LEN] = suffix;
        Key(out)
    }

    pub fn stem(&self) -> Stem {
        let mut out = [0u8; STEM_LEN];
        out.copy_from_slice(&self.0[..STEM_LEN]);
        Stem(out)
    }

    pub fn suffix(&self) -> u8 { self.0[STEM_LEN] }

    /// Byte selecting the child slot at `depth`.
    pub fn byte_at(&self, depth: usize) -> u8 { self.0[depth] }

    pub fn to_hex(&self) -> String { encode_hex(&self.0) }
}

impl TryFrom<&[u8]> for Key {
    type Error = CodecError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        fixed_from_slice::<KEY_LEN>(bytes).map(Key)
    }
}

impl From<[u8; KEY_LEN]> for Key {
    fn from(bytes: [u8; KEY_LEN]) -> Self { Key(bytes) }
}

impl Value {
    pub fn to_hex(&self) -> String { encode_hex(&self.0) }

    /// Lower 16 bytes (little-endian half used for the low leaf scalar).
    pub fn low_half(&self) -> &[u8] { &self.0[..VALUE_LEN / 2] }

    /// Upper 16 bytes.
    pub fn high_half(&self) -> &[u8] { &self.0[VALUE_LEN / 2..] }
}

impl TryFrom<&[u8]> for Value {
    type Error = CodecError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        fixed_from_slice::<VALUE_LEN>(bytes).map(Value)
    }
}

impl From<[u8; VALUE_LEN]> for Value {
    fn from(bytes: [u8; VALUE_LEN]) -> Self { Value(bytes) }
}

impl Stem {
    /// Number of leading bytes shared with `other`.
    pub fn common_prefix_len(&self, other: &Stem) -> usize {
        self.0.iter().zip(other.0.iter()).take_while(|(a, b)| a == b).count()
    }

    pub fn to_hex(&self) -> String { encode_hex(&self.0) }
}

impl Commitment {
    pub fn from_point(p: &Point) -> Self { Commitment(encode_point(p)) }

    /// Decode back into a group element.
    pub fn to_point(&self) -> Result<Point, CodecError> {
        decode_point(&self.0).ok_or(CodecError::InvalidPoint)
    }

    pub fn to_hex(&self) -> String { encode_hex(&self.0) }
}

impl RootHash {
    pub fn from_scalar(s: &Scalar) -> Self { RootHash(encode_scalar(s)) }

    pub fn to_hex(&self) -> String { encode_hex(&self.0) }
}

impl core::fmt::Display for RootHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl core::fmt::Display for Commitment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_splits_into_stem_and_suffix() {
        let mut raw = [0u8; 32];
        for (i, b) in raw.iter_mut().enumerate() { *b = i as u8; }
        let key = Key(raw);
        assert_eq!(key.suffix(), 31);
        assert_eq!(key.stem().0[30], 30);
        assert_eq!(Key::new(key.stem(), key.suffix()), key);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = Key::try_from(&[0u8; 31][..]).unwrap_err();
        assert_eq!(err, CodecError::InvalidLength { expected: 32, actual: 31 });
        assert!(Value::try_from(&[0u8; 33][..]).is_err());
        assert!(Value::try_from(&[7u8; 32][..]).is_ok());
    }

    #[test]
    fn common_prefix_stops_at_first_difference() {
        let a = Stem([1u8; STEM_LEN]);
        let mut b = a;
        b.0[2] = 9;
        assert_eq!(a.common_prefix_len(&b), 2);
        assert_eq!(a.common_prefix_len(&a), STEM_LEN);
    }

    #[test]
    fn root_hash_serializes_as_byte_array() {
        let json = serde_json::to_string(&RootHash([0u8; 32])).unwrap();
        assert!(json.starts_with('['));
    }
}
