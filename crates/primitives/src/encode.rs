//! Hex and fixed-width byte codecs.

use thiserror::Error;

use crate::curve::{decode_scalar, Scalar, SCALAR_LEN};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    #[error("scalar is not canonical (not below the field modulus)")]
    NonCanonicalScalar,
    #[error("bytes do not encode a curve point")]
    InvalidPoint,
}

pub fn encode_hex(bytes: &[u8]) -> String { hex::encode(bytes) }

/// Decode a hex string, tolerating an optional `0x` prefix.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, CodecError> {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(digits).map_err(|e| CodecError::InvalidHex(format!("{e} in {s:?}")))
}

pub fn fixed_from_slice<const N: usize>(bytes: &[u8]) -> Result<[u8; N], CodecError> {
    if bytes.len() != N {
        return Err(CodecError::InvalidLength { expected: N, actual: bytes.len() });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

pub fn decode_hex_fixed<const N: usize>(s: &str) -> Result<[u8; N], CodecError> {
    fixed_from_slice::<N>(&decode_hex(s)?)
}

/// Decode a canonical little-endian scalar from hex. Non-canonical
/// encodings are rejected rather than reduced.
pub fn scalar_from_hex(s: &str) -> Result<Scalar, CodecError> {
    let bytes = decode_hex_fixed::<SCALAR_LEN>(s)?;
    decode_scalar(&bytes).ok_or(CodecError::NonCanonicalScalar)
}
