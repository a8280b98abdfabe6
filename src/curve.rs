//! The elliptic-curve group the wcPRF is built over (`g`, order `q`), and
//! the scalars drawn from `[0, q)`.
//!
//! The heavy lifting — field and group arithmetic — is delegated to the
//! `p256` crate (secp256r1, the curve named in §8's end-to-end scenarios);
//! per §1 this is explicitly an external collaborator's responsibility.
//! `CurvePoint`/`Scalar` exist only to give that arithmetic the
//! fixed-length wire encoding and thread-safe-multiplication surface the
//! protocol core needs.

use {
    p256::{
        elliptic_curve::{
            group::Group,
            sec1::{FromEncodedPoint, ToEncodedPoint},
            Field,
        },
        AffinePoint,
        EncodedPoint,
        ProjectivePoint,
    },
    rand_core::{CryptoRng, RngCore},
    zeroize::Zeroize,
    std::{
        fmt,
        hash::{Hash, Hasher},
        ops::{Add, AddAssign, Mul},
    },
};

/// Uncompressed SEC1 point encoding length: `0x04 || x(32) || y(32)`.
pub const POINT_BYTE_LEN: usize = 65;

/// A point in the curve group `pp.g` generates.
#[derive(Clone, Copy, Debug)]
pub struct CurvePoint(ProjectivePoint);

impl CurvePoint {
    /// The group generator `g`.
    pub fn generator() -> Self {
        Self(ProjectivePoint::generator())
    }

    pub fn identity() -> Self {
        Self(ProjectivePoint::identity())
    }

    /// Multiply by a scalar. Not guaranteed to be usable concurrently
    /// from multiple threads without external synchronisation; see
    /// [`Self::threadsafe_mul`] for the parallel-path variant.
    pub fn mul(&self, scalar: &Scalar) -> Self {
        Self(self.0 * scalar.0)
    }

    /// The thread-safe scalar-multiplication variant required by the
    /// parallel-pipelined mode (§5): `p256`'s arithmetic has no shared
    /// mutable state, so this is the same computation as [`Self::mul`],
    /// exposed under its own name per the §4.B/§5 contract.
    pub fn threadsafe_mul(&self, scalar: &Scalar) -> Self {
        self.mul(scalar)
    }

    pub fn to_bytes(self) -> [u8; POINT_BYTE_LEN] {
        let encoded = self.0.to_affine().to_encoded_point(false);
        let mut out = [0u8; POINT_BYTE_LEN];
        out.copy_from_slice(encoded.as_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8; POINT_BYTE_LEN]) -> Option<Self> {
        let encoded = EncodedPoint::from_bytes(bytes).ok()?;
        let affine = AffinePoint::from_encoded_point(&encoded);
        Option::<AffinePoint>::from(affine).map(|p| Self(ProjectivePoint::from(p)))
    }

    pub(crate) fn from_affine(affine: AffinePoint) -> Self {
        Self(ProjectivePoint::from(affine))
    }
}

impl PartialEq for CurvePoint {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for CurvePoint {}

/// A hashable representation: the canonical (affine) encoding is hashed,
/// since two distinct `ProjectivePoint` representations can denote the
/// same group element.
impl Hash for CurvePoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl Add for CurvePoint {
    type Output = CurvePoint;

    fn add(self, rhs: Self) -> Self::Output {
        CurvePoint(self.0 + rhs.0)
    }
}

impl AddAssign for CurvePoint {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Mul<&Scalar> for CurvePoint {
    type Output = CurvePoint;

    fn mul(self, rhs: &Scalar) -> Self::Output {
        CurvePoint::mul(&self, rhs)
    }
}

impl fmt::Display for CurvePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.to_bytes() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// A scalar uniformly drawn from `[0, q)`, `q` the group order.
/// Not `Copy`: a `Scalar` is always either `k1` or `k2`, the wcPRF's
/// own secret key, so its lifetime must end in zeroization rather than
/// silent duplication (see [`Drop`] below).
#[derive(Clone)]
pub struct Scalar(p256::Scalar);

impl Scalar {
    /// `GenRandomBigIntLessThan(order)`.
    pub fn random(rng: &mut (impl RngCore + CryptoRng)) -> Self {
        Self(p256::Scalar::random(rng))
    }
}

impl Mul<CurvePoint> for &Scalar {
    type Output = CurvePoint;

    fn mul(self, rhs: CurvePoint) -> Self::Output {
        rhs.mul(self)
    }
}

impl zeroize::Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0 = p256::Scalar::ZERO;
    }
}

impl Drop for Scalar {
    fn drop(&mut self) {
        self.zeroize();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn generator_round_trips_through_wire_encoding() {
        let g = CurvePoint::generator();
        let bytes = g.to_bytes();
        assert_eq!(CurvePoint::from_bytes(&bytes), Some(g));
    }

    #[test]
    fn commutativity_of_scalar_multiplication() {
        let mut rng = thread_rng();
        let k1 = Scalar::random(&mut rng);
        let k2 = Scalar::random(&mut rng);
        let g = CurvePoint::generator();
        assert_eq!(g.mul(&k1).mul(&k2), g.mul(&k2).mul(&k1));
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        let garbage = [0xffu8; POINT_BYTE_LEN];
        assert!(CurvePoint::from_bytes(&garbage).is_none());
    }
}
