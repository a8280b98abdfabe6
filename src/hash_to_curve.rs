//! Component B: deterministic map from a [`Block`] to a curve point.
//!
//! `BlockToECPoint` must behave like a random oracle for the protocol's
//! security (§4.B). It is built by try-and-increment: expand the input
//! block under a fixed AES key into a candidate 256-bit x-coordinate,
//! attempt SEC1 point decompression with a fixed sign bit, and retry with
//! the next counter value on failure. Termination is probabilistic in
//! O(1) expected iterations, since roughly half of all field elements are
//! valid x-coordinates of a curve point.

use {
    crate::{
        aes::{ecb_enc, EncSchedule},
        block::Block,
        curve::CurvePoint,
    },
    p256::{elliptic_curve::point::DecompressPoint, AffinePoint, FieldBytes},
    subtle::Choice,
};

/// Holds the AES schedule expanded under [`Block::FIX_AES_ENC_KEY`].
///
/// Building the schedule is the only setup cost of hash-to-curve; this
/// type exists so callers (in particular the bulk-parallel path) pay it
/// once instead of once per candidate block. It owns no interior
/// mutability, so it is `Send + Sync` and safe to share across threads —
/// the concrete realisation of the "thread-safe variant" the contract
/// asks for.
#[derive(Clone)]
pub struct HashContext {
    schedule: EncSchedule,
}

impl Default for HashContext {
    fn default() -> Self {
        Self::new()
    }
}

impl HashContext {
    pub fn new() -> Self {
        Self { schedule: EncSchedule::new(Block::FIX_AES_ENC_KEY) }
    }

    /// `BlockToECPoint`.
    pub fn block_to_ec_point(&self, b: Block) -> CurvePoint {
        for counter in 0u64.. {
            if let Some(point) = self.try_candidate(b, counter) {
                return point;
            }
        }
        unreachable!("a valid x-coordinate is found after O(1) expected iterations")
    }

    /// `ThreadSafeBlockToECPoint`: identical computation, callable
    /// concurrently from multiple threads since `HashContext` has no
    /// shared mutable state.
    pub fn threadsafe_block_to_ec_point(&self, b: Block) -> CurvePoint {
        self.block_to_ec_point(b)
    }

    fn try_candidate(&self, b: Block, counter: u64) -> Option<CurvePoint> {
        let x = self.candidate_x(b, counter);
        let field_bytes = *FieldBytes::from_slice(&x);
        let affine = AffinePoint::decompress(&field_bytes, Choice::from(0));
        Option::<AffinePoint>::from(affine).map(CurvePoint::from_affine)
    }

    /// Expand `b` (tweaked by `counter`) into a 32-byte candidate
    /// x-coordinate via two AES-128 applications under the fixed key.
    fn candidate_x(&self, b: Block, counter: u64) -> [u8; 32] {
        let tweak = Block::from_counter(counter);
        let mut halves = [b.xor(tweak), b.xor(tweak).xor(Block([0xff; 16]))];
        ecb_enc(&self.schedule, &mut halves);
        let mut out = [0u8; 32];
        out[..16].copy_from_slice(halves[0].as_bytes());
        out[16..].copy_from_slice(halves[1].as_bytes());
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn deterministic() {
        let ctx = HashContext::new();
        let b = Block::from_counter(123);
        assert_eq!(ctx.block_to_ec_point(b), ctx.block_to_ec_point(b));
    }

    #[test]
    fn distinct_inputs_map_to_distinct_points_with_overwhelming_probability() {
        let ctx = HashContext::new();
        let a = ctx.block_to_ec_point(Block::from_counter(1));
        let b = ctx.block_to_ec_point(Block::from_counter(2));
        assert_ne!(a, b);
    }

    #[test]
    fn threadsafe_variant_agrees_with_sequential() {
        let ctx = HashContext::new();
        let b = Block::from_counter(999);
        assert_eq!(ctx.block_to_ec_point(b), ctx.threadsafe_block_to_ec_point(b));
    }
}
