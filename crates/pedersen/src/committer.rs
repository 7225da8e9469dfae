//! Full and incremental Pedersen vector commitments.

use std::sync::Arc;

use group::prime::PrimeCurveAffine;
use group::Group;
use once_cell::sync::Lazy;
use primitives::{Affine, Point, Scalar};
use tracing::debug;

use crate::crs::{derive_bases, CommitterConfig};
use crate::msm::msm;
use crate::PedersenError;

/// Process-wide committer over the default basis, derived on first use.
static SHARED_COMMITTER: Lazy<Arc<Committer>> =
    Lazy::new(|| Arc::new(Committer::new(CommitterConfig::default())));

/// Immutable basis plus commit/update operations. Cheap to share via `Arc`.
#[derive(Clone, Debug)]
pub struct Committer {
    config: CommitterConfig,
    bases: Vec<Affine>,
}

impl Committer {
    pub fn new(config: CommitterConfig) -> Self {
        let bases = derive_bases(&config);
        debug!(width = config.width, seed = %config.seed, "derived pedersen basis");
        Self { config, bases }
    }

    /// Shared committer over the default basis.
    pub fn default_shared() -> Arc<Committer> {
        Arc::clone(&SHARED_COMMITTER)
    }

    pub fn config(&self) -> &CommitterConfig { &self.config }

    pub fn width(&self) -> usize { self.bases.len() }

    pub fn bases(&self) -> &[Affine] { &self.bases }

    /// Commit to `scalars`, zero-padded to the basis width.
    pub fn try_commit(&self, scalars: &[Scalar]) -> Result<Point, PedersenError> {
        if scalars.len() > self.width() {
            return Err(PedersenError::VectorTooLong { len: scalars.len(), width: self.width() });
        }
        Ok(msm(&self.bases, scalars))
    }

    /// Like [`Committer::try_commit`], for callers whose vector length is
    /// fixed by construction.
    ///
    /// # Panics
    /// If `scalars` is longer than the basis.
    pub fn commit(&self, scalars: &[Scalar]) -> Point {
        assert!(
            scalars.len() <= self.width(),
            "vector of {} scalars exceeds basis width {}",
            scalars.len(),
            self.width()
        );
        msm(&self.bases, scalars)
    }

    /// Commit to a sparse vector given as (index, scalar) pairs. Repeated
    /// indices accumulate.
    pub fn commit_sparse(&self, entries: &[(usize, Scalar)]) -> Result<Point, PedersenError> {
        let mut acc = Point::identity();
        for (index, scalar) in entries {
            acc += self.scalar_mul(*index, scalar)?;
        }
        Ok(acc)
    }

    /// `scalar * G_index`.
    pub fn scalar_mul(&self, index: usize, scalar: &Scalar) -> Result<Point, PedersenError> {
        let base = self
            .bases
            .get(index)
            .ok_or(PedersenError::IndexOutOfRange { index, width: self.width() })?;
        Ok(base.to_curve() * scalar)
    }

    /// `commitment + (new - old) * G_index`: the commitment after slot
    /// `index` changed from `old` to `new`.
    pub fn update(
        &self,
        commitment: &Point,
        index: usize,
        old: &Scalar,
        new: &Scalar,
    ) -> Result<Point, PedersenError> {
        if old == new {
            return Ok(*commitment);
        }
        Ok(*commitment + self.scalar_mul(index, &(*new - *old))?)
    }
}

impl Default for Committer {
    fn default() -> Self { Self::new(CommitterConfig::default()) }
}
