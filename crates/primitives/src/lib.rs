//! Curve adapter and fixed-width types shared by the Pedersen committer and
//! the verkle trie.

pub mod curve;
pub mod types;
pub mod encode;
pub mod digest;

// Re-export all public items from modules for convenience
pub use curve::*;
pub use types::*;
pub use encode::*;
pub use digest::*;
