//! Pedersen vector commitments over Pallas for the verkle trie.
//!
//! A commitment to `v = (v_0, .., v_{n-1})` is `C = sum_i v_i * G_i` for a
//! fixed, deterministically derived basis `G`. The same basis must be used by
//! every trie whose roots are compared.

pub mod crs;
pub mod msm;
pub mod committer;
pub mod harness;

use thiserror::Error;

pub use committer::Committer;
pub use crs::CommitterConfig;

/// Basis parameters (defaults shared by every trie in the process).
pub mod params {
    /// Number of generators; one per trie node slot.
    pub const DEFAULT_WIDTH: usize = 256;
    /// Seed fed to hash-to-curve when deriving generators.
    pub const DEFAULT_SEED: &str = "eth_verkle_oct_2021";
    /// Hash-to-curve domain prefix.
    pub const H2C_DOMAIN: &str = "verkle/pedersen-basis";
    /// Below this many non-zero terms the MSM stays on the calling thread.
    pub const PAR_THRESHOLD: usize = 64;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PedersenError {
    #[error("vector of {len} scalars exceeds basis width {width}")]
    VectorTooLong { len: usize, width: usize },
    #[error("basis index {index} out of range for width {width}")]
    IndexOutOfRange { index: usize, width: usize },
}
