//! Pallas aliases and scalar/point byte conversions.
//!
//! Everything above this module talks in terms of `Scalar` and `Point`; the
//! concrete curve is only named here.

use ff::{FromUniformBytes, PrimeField};
use group::GroupEncoding;
use pasta_curves::pallas;

/// Scalar field of the commitment group.
pub type Scalar = pallas::Scalar;

/// Commitment group element (projective).
pub type Point = pallas::Point;

/// Affine form, used for stored bases.
pub type Affine = pallas::Affine;

/// Byte length of a canonical scalar encoding (little-endian).
pub const SCALAR_LEN: usize = 32;
/// Byte length of a compressed point encoding.
pub const POINT_LEN: usize = 32;

/// Interpret up to 64 little-endian bytes as an integer and reduce it
/// modulo the scalar field order.
pub fn scalar_from_le_bytes_mod_order(bytes: &[u8]) -> Scalar {
    assert!(bytes.len() <= 64, "cannot reduce more than 64 bytes, got {}", bytes.len());
    let mut wide = [0u8; 64];
    wide[..bytes.len()].copy_from_slice(bytes);
    <Scalar as FromUniformBytes<64>>::from_uniform_bytes(&wide)
}

/// Canonical 32-byte little-endian encoding of a scalar.
pub fn encode_scalar(s: &Scalar) -> [u8; SCALAR_LEN] {
    let repr = s.to_repr();
    let mut out = [0u8; SCALAR_LEN];
    out.copy_from_slice(repr.as_ref());
    out
}

/// Decode a canonical scalar; `None` when the integer is not below the modulus.
pub fn decode_scalar(bytes: &[u8; SCALAR_LEN]) -> Option<Scalar> {
    Option::from(Scalar::from_repr(*bytes))
}

/// Encode a point to its 32-byte compressed representation.
pub fn encode_point(p: &Point) -> [u8; POINT_LEN] {
    let bytes = p.to_bytes();
    let mut out = [0u8; POINT_LEN];
    out.copy_from_slice(bytes.as_ref());
    out
}

/// Decode a point from its 32-byte compressed representation.
pub fn decode_point(bytes: &[u8; POINT_LEN]) -> Option<Point> {
    Option::from(Point::from_bytes(bytes))
}
