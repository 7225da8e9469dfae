//! Windowed Pippenger multi-scalar multiplication.

use ff::{Field, PrimeField};
use group::prime::PrimeCurveAffine;
use group::{Curve, Group};
use primitives::{encode_scalar, Affine, Point, Scalar};
use rayon::prelude::*;

use crate::params::PAR_THRESHOLD;

/// Heuristic window size based on the number of non-zero terms.
fn optimal_window(n: usize) -> usize {
    match n {
        0..=32 => 3,
        33..=128 => 5,
        129..=512 => 7,
        513..=2048 => 11,
        _ => 13,
    }
}

/// Extract the w-bit window `win` from a scalar's little-endian bytes.
#[inline]
fn window_value(bytes_le: &[u8; 32], win: usize, w: usize) -> usize {
    let start = win * w;
    let mut acc = 0usize;
    for i in 0..w {
        let bit_idx = start + i;
        let byte = bit_idx >> 3;
        if byte >= 32 { break; }
        let b = (bytes_le[byte] >> (bit_idx & 7)) & 1;
        acc |= (b as usize) << i;
    }
    acc
}

/// Bucket sum for a single window: sum_j j * B_j.
fn window_sum(terms: &[(Affine, [u8; 32])], win: usize, w: usize) -> Point {
    let bucket_len = (1usize << w) - 1;
    let mut buckets = vec![Point::identity(); bucket_len];
    for (base, le) in terms {
        let val = window_value(le, win, w);
        if val == 0 { continue; }
        buckets[val - 1] += base.to_curve();
    }
    // Summation by parts: running sum from high bucket to low.
    let mut running = Point::identity();
    let mut sum = Point::identity();
    for b in buckets.iter().rev() {
        running += b;
        sum += running;
    }
    sum
}

/// Compute sum_i scalars[i] * bases[i] over the common prefix of both slices.
pub fn msm(bases: &[Affine], scalars: &[Scalar]) -> Point {
    let terms: Vec<(Affine, [u8; 32])> = bases
        .iter()
        .zip(scalars.iter())
        .filter(|(_, s)| !bool::from(s.is_zero()))
        .map(|(b, s)| (*b, encode_scalar(s)))
        .collect();
    if terms.is_empty() {
        return Point::identity();
    }

    let w = optimal_window(terms.len());
    let num_bits = Scalar::NUM_BITS as usize;
    let num_windows = (num_bits + w - 1) / w;

    let sums: Vec<Point> = if terms.len() >= PAR_THRESHOLD {
        (0..num_windows).into_par_iter().map(|win| window_sum(&terms, win, w)).collect()
    } else {
        (0..num_windows).map(|win| window_sum(&terms, win, w)).collect()
    };

    // Horner over windows, high to low.
    let mut acc = Point::identity();
    for s in sums.iter().rev() {
        for _ in 0..w { acc = acc.double(); }
        acc += s;
    }
    acc
}

/// Straightforward double-and-add reference, used to cross-check `msm`.
pub fn msm_reference(bases: &[Affine], scalars: &[Scalar]) -> Affine {
    let mut acc = Point::identity();
    for (b, s) in bases.iter().zip(scalars.iter()) {
        acc += b.to_curve() * s;
    }
    acc.to_affine()
}
