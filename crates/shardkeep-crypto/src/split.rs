//! Sender-side splitting: a random polynomial with the secret as constant
//! term, evaluated at x = 1..=n.

use num_bigint::BigUint;

use crate::error::{CryptoError, Result};
use crate::field::{mod_add, mod_mul};
use crate::keys::random_nonzero_below;
use crate::reconstruct::SharePoint;

/// Evaluate `coeffs[0] + coeffs[1]·x + … (mod p)`.
pub fn eval_polynomial(coeffs: &[BigUint], x: &BigUint, p: &BigUint) -> BigUint {
    // Horner from the highest coefficient down.
    coeffs
        .iter()
        .rev()
        .fold(BigUint::default(), |acc, c| mod_add(&mod_mul(&acc, x, p), c, p))
}

/// Split `secret` into `share_count` points, any `threshold` of which
/// recover it.
pub fn split_secret(
    secret: &BigUint,
    share_count: u32,
    threshold: u32,
    p: &BigUint,
) -> Result<Vec<SharePoint>> {
    if threshold == 0 {
        return Err(CryptoError::InvalidSharing("threshold must be at least 1".into()));
    }
    if share_count < threshold {
        return Err(CryptoError::InvalidSharing(format!(
            "{} shares cannot meet a threshold of {}",
            share_count, threshold
        )));
    }
    if secret >= p {
        return Err(CryptoError::InvalidSharing("secret must be below the field prime".into()));
    }

    let mut coeffs = Vec::with_capacity(threshold as usize);
    coeffs.push(secret.clone());
    for _ in 1..threshold {
        coeffs.push(random_nonzero_below(p));
    }

    let shares = (1..=share_count)
        .map(|x| {
            let x = BigUint::from(x);
            let y = eval_polynomial(&coeffs, &x, p);
            SharePoint { x, y }
        })
        .collect();

    Ok(shares)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::field_prime;
    use crate::keys::random_below;
    use crate::reconstruct::reconstruct;

    #[test]
    fn evaluates_small_polynomial() {
        let p = BigUint::from(97u32);
        let coeffs = [BigUint::from(42u32), BigUint::from(17u32)];
        let ys: Vec<BigUint> = (1u32..=3)
            .map(|x| eval_polynomial(&coeffs, &BigUint::from(x), &p))
            .collect();
        assert_eq!(ys, vec![BigUint::from(59u32), BigUint::from(76u32), BigUint::from(93u32)]);
    }

    #[test]
    fn every_threshold_subset_recovers_the_secret() {
        let p = field_prime();
        let secret = random_below(&p);
        let shares = split_secret(&secret, 5, 3, &p).unwrap();

        for a in 0..5 {
            for b in (a + 1)..5 {
                for c in (b + 1)..5 {
                    let subset = [shares[a].clone(), shares[b].clone(), shares[c].clone()];
                    assert_eq!(reconstruct(&subset, &p).unwrap(), secret);
                }
            }
        }
    }

    #[test]
    fn too_few_shares_do_not_recover_the_secret() {
        let p = field_prime();
        let secret = random_below(&p);
        let shares = split_secret(&secret, 4, 3, &p).unwrap();
        assert_ne!(reconstruct(&shares[..2], &p).unwrap(), secret);
    }

    #[test]
    fn threshold_one_hands_out_the_secret() {
        let p = field_prime();
        let secret = BigUint::from(1234u32);
        let shares = split_secret(&secret, 2, 1, &p).unwrap();
        assert!(shares.iter().all(|s| s.y == secret));
    }

    #[test]
    fn rejects_bad_parameters() {
        let p = field_prime();
        let secret = BigUint::from(1u32);
        assert!(matches!(split_secret(&secret, 3, 0, &p), Err(CryptoError::InvalidSharing(_))));
        assert!(matches!(split_secret(&secret, 2, 3, &p), Err(CryptoError::InvalidSharing(_))));
        assert!(matches!(split_secret(&p, 3, 2, &p), Err(CryptoError::InvalidSharing(_))));
    }
}
