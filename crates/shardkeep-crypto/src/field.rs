//! Arithmetic in the prime field used for secret sharing.
//!
//! Values are arbitrary-precision; every operation reduces its inputs first
//! and returns a value in `[0, p)`. Nothing here is constant-time.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};
use shardkeep_types::constants::PRIME_BYTES;

use crate::error::{CryptoError, Result};

/// The field modulus shared with senders.
pub fn field_prime() -> BigUint {
    BigUint::from_bytes_be(&PRIME_BYTES)
}

pub fn mod_add(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
    ((a % p) + (b % p)) % p
}

pub fn mod_sub(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
    // Lift by p so the unsigned subtraction never underflows.
    ((a % p) + p - (b % p)) % p
}

pub fn mod_mul(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
    ((a % p) * (b % p)) % p
}

/// Additive inverse, `-a mod p`.
pub fn mod_neg(a: &BigUint, p: &BigUint) -> BigUint {
    mod_sub(&BigUint::zero(), a, p)
}

/// Multiplicative inverse via the extended Euclidean algorithm.
///
/// Fails with `NotInvertible` when `gcd(a, p) != 1`, which includes
/// `a ≡ 0 (mod p)`.
pub fn mod_inverse(a: &BigUint, p: &BigUint) -> Result<BigUint> {
    if p.is_zero() {
        return Err(CryptoError::NotInvertible);
    }

    let modulus = BigInt::from(p.clone());
    let (mut old_r, mut r) = (BigInt::from(a % p), modulus.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());

    // old_s * a ≡ old_r and s * a ≡ r (mod p) hold on every iteration.
    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    if !old_r.is_one() {
        return Err(CryptoError::NotInvertible);
    }

    // The Bezout coefficient may be negative.
    let (_, inverse) = old_s.mod_floor(&modulus).into_parts();
    Ok(inverse)
}
