//! # secp256k1 Arithmetic
//!
//! Point arithmetic on `y² = x³ + 7` over GF(p), the curve DigiByte shares
//! with Bitcoin. Scalar multiplication runs in Jacobian coordinates so the
//! inner loop needs no field inversions; a single inversion converts back
//! to affine at the end.
//!
//! ## Infinity
//!
//! Affine infinity is the `(0, 0)` sentinel, which is not a curve point so
//! it can never collide with a real one. In Jacobian form any point with
//! `y = 0` is treated as infinity, matching the doubling formula which
//! produces `(0, 0, 0)` there.

use lazy_static::lazy_static;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use super::field::{inv, modulo};

/// Curve coefficient `b` in `y² = x³ + b`. (`a` is zero.)
pub const CURVE_B: u32 = 7;

lazy_static! {
    /// The field prime `p = 2²⁵⁶ − 2³² − 977`.
    pub static ref P: BigInt = BigInt::parse_bytes(
        b"fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f",
        16,
    )
    .expect("field prime constant parses");

    /// The group order `n`.
    pub static ref N: BigInt = BigInt::parse_bytes(
        b"fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141",
        16,
    )
    .expect("group order constant parses");

    /// The generator point `G`.
    pub static ref G: AffinePoint = AffinePoint {
        x: BigInt::parse_bytes(
            b"79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
            16,
        )
        .expect("generator x constant parses"),
        y: BigInt::parse_bytes(
            b"483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8",
            16,
        )
        .expect("generator y constant parses"),
    };
}

/// A point in affine coordinates. `(0, 0)` is the point at infinity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffinePoint {
    pub x: BigInt,
    pub y: BigInt,
}

impl AffinePoint {
    pub fn new(x: BigInt, y: BigInt) -> Self {
        Self { x, y }
    }

    /// The `(0, 0)` infinity sentinel.
    pub fn infinity() -> Self {
        Self {
            x: BigInt::zero(),
            y: BigInt::zero(),
        }
    }

    pub fn is_infinity(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// Whether the coordinates satisfy `y² ≡ x³ + 7 (mod p)`. The infinity
    /// sentinel does not.
    pub fn is_on_curve(&self) -> bool {
        let lhs = &self.y * &self.y;
        let rhs = &self.x * &self.x * &self.x + BigInt::from(CURVE_B);
        modulo(&(lhs - rhs), &P).is_zero()
    }

    pub fn to_jacobian(&self) -> JacobianPoint {
        JacobianPoint {
            x: self.x.clone(),
            y: self.y.clone(),
            z: BigInt::one(),
        }
    }
}

/// A point in Jacobian coordinates: the affine equivalent is
/// `(x / z², y / z³)`. `y = 0` encodes infinity.
#[derive(Debug, Clone)]
pub struct JacobianPoint {
    pub x: BigInt,
    pub y: BigInt,
    pub z: BigInt,
}

impl JacobianPoint {
    fn infinity() -> Self {
        Self {
            x: BigInt::zero(),
            y: BigInt::zero(),
            z: BigInt::one(),
        }
    }

    pub fn is_infinity(&self) -> bool {
        self.y.is_zero()
    }

    /// Point doubling. With `a = 0` the slope term is just `3x²`.
    pub fn double(&self) -> JacobianPoint {
        if self.y.is_zero() {
            return JacobianPoint {
                x: BigInt::zero(),
                y: BigInt::zero(),
                z: BigInt::zero(),
            };
        }
        let ysq = modulo(&(&self.y * &self.y), &P);
        let s = modulo(&(BigInt::from(4u32) * &self.x * &ysq), &P);
        let m = modulo(&(BigInt::from(3u32) * &self.x * &self.x), &P);
        let x = modulo(&(&m * &m - BigInt::from(2u32) * &s), &P);
        let y = modulo(&(&m * (&s - &x) - BigInt::from(8u32) * &ysq * &ysq), &P);
        let z = modulo(&(BigInt::from(2u32) * &self.y * &self.z), &P);
        JacobianPoint { x, y, z }
    }

    /// Point addition. Falls back to doubling when both inputs project to
    /// the same affine point, and to infinity when they are negatives.
    pub fn add(&self, other: &JacobianPoint) -> JacobianPoint {
        if self.y.is_zero() {
            return other.clone();
        }
        if other.y.is_zero() {
            return self.clone();
        }
        let z1sq = modulo(&(&self.z * &self.z), &P);
        let z2sq = modulo(&(&other.z * &other.z), &P);
        let u1 = modulo(&(&self.x * &z2sq), &P);
        let u2 = modulo(&(&other.x * &z1sq), &P);
        let s1 = modulo(&(&self.y * &z2sq * &other.z), &P);
        let s2 = modulo(&(&other.y * &z1sq * &self.z), &P);
        if u1 == u2 {
            if s1 != s2 {
                return JacobianPoint::infinity();
            }
            return self.double();
        }
        let h = &u2 - &u1;
        let r = &s2 - &s1;
        let h2 = modulo(&(&h * &h), &P);
        let h3 = modulo(&(&h2 * &h), &P);
        let u1h2 = modulo(&(&u1 * &h2), &P);
        let x = modulo(&(&r * &r - &h3 - BigInt::from(2u32) * &u1h2), &P);
        let y = modulo(&(&r * (&u1h2 - &x) - &s1 * &h3), &P);
        let z = modulo(&(&h * &self.z * &other.z), &P);
        JacobianPoint { x, y, z }
    }

    /// Double-and-add scalar multiplication. The scalar is normalized
    /// modulo `n`, so negatives wrap; zero yields infinity.
    pub fn mul(&self, k: &BigInt) -> JacobianPoint {
        if self.y.is_zero() || k.is_zero() {
            return JacobianPoint::infinity();
        }
        if k.is_one() {
            return self.clone();
        }
        if k.is_negative() || *k >= *N {
            return self.mul(&modulo(k, &N));
        }
        let halved = self.mul(&(k >> 1usize));
        let doubled = halved.double();
        if k.is_odd() {
            doubled.add(self)
        } else {
            doubled
        }
    }

    /// Projects back to affine coordinates. Infinity maps to the `(0, 0)`
    /// sentinel because `inv(0, p) == 0`.
    pub fn to_affine(&self) -> AffinePoint {
        let zinv = inv(&self.z, &P);
        let zinv2 = modulo(&(&zinv * &zinv), &P);
        let zinv3 = modulo(&(&zinv2 * &zinv), &P);
        AffinePoint {
            x: modulo(&(&self.x * &zinv2), &P),
            y: modulo(&(&self.y * &zinv3), &P),
        }
    }
}

/// `k·point` in affine form.
pub fn scalar_mul(point: &AffinePoint, k: &BigInt) -> AffinePoint {
    point.to_jacobian().mul(k).to_affine()
}

/// `a + b` in affine form.
pub fn point_add(a: &AffinePoint, b: &AffinePoint) -> AffinePoint {
    a.to_jacobian().add(&b.to_jacobian()).to_affine()
}
