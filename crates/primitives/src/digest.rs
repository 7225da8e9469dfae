//! Commitment-to-scalar map used to bind a child commitment into its parent.

use blake2b_simd::Params as Blake2bParams;
use ff::{Field, FromUniformBytes};
use group::Group;

use crate::curve::{encode_point, Point, Scalar};

/// Domain separator for BLAKE2b-512 (personal is exactly 16 bytes).
const DS_COMMITMENT_TO_SCALAR: &[u8; 16] = b"verkle/c2s\0\0\0\0\0\0"; // 10 + 6 = 16

/// Map a commitment to the scalar field.
///
/// The identity maps to zero, so an empty subtree contributes nothing to its
/// parent. Every other point is hashed from its compressed encoding with
/// BLAKE2b-512 and wide-reduced.
pub fn map_to_scalar(point: &Point) -> Scalar {
    if bool::from(point.is_identity()) {
        return Scalar::ZERO;
    }
    let bytes = encode_point(point);
    let hash = Blake2bParams::new()
        .hash_length(64)
        .personal(DS_COMMITMENT_TO_SCALAR)
        .hash(&bytes);
    let mut wide = [0u8; 64];
    wide.copy_from_slice(hash.as_bytes());
    <Scalar as FromUniformBytes<64>>::from_uniform_bytes(&wide)
}
