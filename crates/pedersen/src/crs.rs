//! Deterministic basis derivation.

use pasta_curves::arithmetic::CurveExt;
use group::prime::PrimeCurveAffine;
use group::Curve;
use primitives::{Affine, Point};
use serde::{Deserialize, Serialize};

use crate::params::{DEFAULT_SEED, DEFAULT_WIDTH, H2C_DOMAIN};

/// Inputs that fully determine a basis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitterConfig {
    pub seed: String,
    pub width: usize,
}

impl Default for CommitterConfig {
    fn default() -> Self {
        Self { seed: DEFAULT_SEED.to_owned(), width: DEFAULT_WIDTH }
    }
}

/// Derive generator `idx` as H2C(seed || le(idx)).
///
/// Hash-to-curve leaves no known discrete log relation between generators,
/// which is what makes the commitment binding.
pub fn derive_base(seed: &[u8], idx: u32) -> Affine {
    let hasher = Point::hash_to_curve(H2C_DOMAIN);
    hasher(&base_message(seed, idx)).to_affine()
}

fn base_message(seed: &[u8], idx: u32) -> Vec<u8> {
    let mut msg = Vec::with_capacity(seed.len() + 4);
    msg.extend_from_slice(seed);
    msg.extend_from_slice(&idx.to_le_bytes());
    msg
}

/// Derive the full basis G_0..G_{width-1}.
pub fn derive_bases(config: &CommitterConfig) -> Vec<Affine> {
    let hasher = Point::hash_to_curve(H2C_DOMAIN);
    let seed = config.seed.as_bytes();
    let points: Vec<Point> = (0..config.width as u32)
        .map(|idx| hasher(&base_message(seed, idx)))
        .collect();
    let mut bases = vec![Affine::identity(); points.len()];
    Point::batch_normalize(&points, &mut bases);
    bases
}
