//! Lagrange interpolation at x = 0.
//!
//! Any `k` correct points on a degree `k - 1` polynomial give back the same
//! constant term, whatever their order and whichever subset is chosen. No
//! consistency check is made: points that do not lie on one polynomial
//! silently produce a wrong secret, so callers must only pass authenticated
//! shares.

use std::collections::HashSet;

use num_bigint::BigUint;
use num_traits::One;

use crate::error::{CryptoError, Result};
use crate::field::{mod_add, mod_inverse, mod_mul, mod_neg, mod_sub};

/// A point (x, y) on the sharing polynomial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePoint {
    pub x: BigUint,
    pub y: BigUint,
}

impl SharePoint {
    pub fn new(x: impl Into<BigUint>, y: impl Into<BigUint>) -> Self {
        Self { x: x.into(), y: y.into() }
    }
}

/// Recover the polynomial's constant term from `points` modulo `p`:
///
/// `secret = Σ_i y_i · Π_{j≠i} (−x_j) · (x_i − x_j)^{-1}  (mod p)`
///
/// Fails with `DegenerateShareSet` when `points` is empty or two points
/// share an x coordinate (mod p).
pub fn reconstruct(points: &[SharePoint], p: &BigUint) -> Result<BigUint> {
    if points.is_empty() {
        return Err(CryptoError::DegenerateShareSet);
    }

    let mut seen = HashSet::with_capacity(points.len());
    for point in points {
        if !seen.insert(&point.x % p) {
            return Err(CryptoError::DegenerateShareSet);
        }
    }

    let mut secret = BigUint::default();
    for (i, pi) in points.iter().enumerate() {
        let mut numerator = BigUint::one();
        let mut denominator = BigUint::one();

        for (j, pj) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            numerator = mod_mul(&numerator, &mod_neg(&pj.x, p), p);
            denominator = mod_mul(&denominator, &mod_sub(&pi.x, &pj.x, p), p);
        }

        // Distinct x values already checked, so this only fails for a non-prime p.
        let basis = mod_mul(&numerator, &mod_inverse(&denominator, p)?, p);
        secret = mod_add(&secret, &mod_mul(&pi.y, &basis, p), p);
    }

    Ok(secret)
}
