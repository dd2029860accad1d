//! # Field Arithmetic
//!
//! Modular arithmetic helpers over the secp256k1 prime `p` and group
//! order `n`. The reductions here use the mathematician's modulus: results
//! always land in `[0, m)`, including for negative inputs. That property
//! is load-bearing — point subtraction and recovery both feed negative
//! intermediates through these functions.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};

/// Euclidean remainder of `a` modulo `m`, in `[0, m)` for positive `m`.
pub fn modulo(a: &BigInt, m: &BigInt) -> BigInt {
    a.mod_floor(m)
}

/// `base^exp mod m`. The base is reduced first so negative inputs behave.
pub fn pow_mod(base: &BigInt, exp: &BigInt, m: &BigInt) -> BigInt {
    base.mod_floor(m).modpow(exp, m)
}

/// Modular inverse of `a` modulo `m` via the extended Euclidean algorithm.
///
/// `inv(0, m) == 0` by convention; non-invertible inputs also collapse to
/// zero. Callers working modulo a prime only hit the zero case for zero
/// itself.
pub fn inv(a: &BigInt, m: &BigInt) -> BigInt {
    let reduced = a.mod_floor(m);
    if reduced.is_zero() {
        return BigInt::zero();
    }
    let gcd = reduced.extended_gcd(m);
    if !gcd.gcd.is_one() {
        return BigInt::zero();
    }
    gcd.x.mod_floor(m)
}
