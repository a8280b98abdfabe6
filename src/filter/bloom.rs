//! Bloom filter: bit array plus a double-hashing family standing in for
//! `k` independent hash functions, per §4.C.

use crate::{
    curve::CurvePoint,
    error::{self, Error},
    filter::Filter,
    rng::DeterministicRng,
};

const KEY_A: [u8; 32] = *b"psu-bloom-filter-hash-a-key-0000";
const KEY_B: [u8; 32] = *b"psu-bloom-filter-hash-b-key-0000";

/// `m` bits addressed by `k` hash functions, sized from a target
/// capacity `n` and false-positive probability `p` via the textbook
/// formulas `m = ceil(-n ln p / (ln 2)^2)`, `k = ceil((m/n) ln 2)`.
pub struct BloomFilter {
    m: u64,
    k: u64,
    bits: Vec<u8>,
}

impl BloomFilter {
    pub fn with_false_positive_probability(capacity: usize, p: f64) -> error::Result<Self> {
        if !(0.0 < p && p < 1.0) {
            return Err(Error::config_error("BloomFilter::new", "false-positive probability must lie in (0, 1)"));
        }
        let n = capacity.max(1) as f64;
        let ln2 = std::f64::consts::LN_2;
        let m = (-(n * p.ln()) / (ln2 * ln2)).ceil().max(8.0) as u64;
        let k = ((m as f64 / n) * ln2).ceil().max(1.0) as u64;
        Ok(Self { m, k, bits: vec![0u8; Self::byte_len(m)] })
    }

    fn byte_len(m: u64) -> usize {
        ((m + 7) / 8) as usize
    }

    fn positions(&self, item: &CurvePoint) -> impl Iterator<Item = u64> + '_ {
        let bytes = item.to_bytes();
        let ha = u64::from_le_bytes(blake3::keyed_hash(&KEY_A, &bytes).as_bytes()[..8].try_into().unwrap());
        let hb = u64::from_le_bytes(blake3::keyed_hash(&KEY_B, &bytes).as_bytes()[..8].try_into().unwrap());
        // Kirsch-Mitzenmacher double hashing: g_i(x) = h_a(x) + i * h_b(x).
        (0..self.k).map(move |i| ha.wrapping_add(i.wrapping_mul(hb)) % self.m)
    }

    fn set_bit(&mut self, pos: u64) {
        let byte = (pos / 8) as usize;
        let bit = (pos % 8) as u8;
        self.bits[byte] |= 1 << bit;
    }

    fn bit_is_set(&self, pos: u64) -> bool {
        let byte = (pos / 8) as usize;
        let bit = (pos % 8) as u8;
        self.bits[byte] & (1 << bit) != 0
    }

    fn insert_one(&mut self, item: &CurvePoint) {
        for pos in self.positions(item).collect::<Vec<_>>() {
            self.set_bit(pos);
        }
    }
}

impl Filter for BloomFilter {
    /// The Bloom construction never needs randomness — each item's bit
    /// positions are a pure function of the item — so `rng` goes unused
    /// here, but the trait still takes it: the caller dispatches on
    /// [`super::FilterType`] without knowing which construction it built.
    fn build(capacity: usize, p: f64, items: &[CurvePoint], _rng: &mut DeterministicRng) -> error::Result<Self> {
        let mut filter = Self::with_false_positive_probability(capacity, p)?;
        for item in items {
            filter.insert_one(item);
        }
        Ok(filter)
    }

    fn contains(&self, item: &CurvePoint) -> bool {
        self.positions(item).all(|pos| self.bit_is_set(pos))
    }

    fn object_size(&self) -> usize {
        8 + 8 + self.bits.len()
    }

    fn write_object(&self, buf: &mut [u8]) {
        assert_eq!(buf.len(), self.object_size());
        buf[0..8].copy_from_slice(&self.m.to_le_bytes());
        buf[8..16].copy_from_slice(&self.k.to_le_bytes());
        buf[16..].copy_from_slice(&self.bits);
    }

    fn read_object(buf: &[u8]) -> error::Result<Self> {
        if buf.len() < 16 {
            return Err(Error::config_error("BloomFilter::read_object", "buffer shorter than header"));
        }
        let m = u64::from_le_bytes(buf[0..8].try_into().unwrap());
        let k = u64::from_le_bytes(buf[8..16].try_into().unwrap());
        let expected = 16 + Self::byte_len(m);
        if buf.len() != expected {
            return Err(Error::config_error("BloomFilter::read_object", "buffer length does not match header"));
        }
        Ok(Self { m, k, bits: buf[16..].to_vec() })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::thread_rng;

    fn random_points(n: usize) -> Vec<CurvePoint> {
        let mut rng = thread_rng();
        (0..n).map(|_| CurvePoint::generator().mul(&crate::curve::Scalar::random(&mut rng))).collect()
    }

    #[test]
    fn no_false_negatives() {
        let items = random_points(200);
        let mut rng = DeterministicRng::from_seed([1u8; 32]);
        let filter = BloomFilter::build(items.len(), crate::filter::DEFAULT_FALSE_POSITIVE_PROBABILITY, &items, &mut rng).unwrap();
        for item in &items {
            assert!(filter.contains(item));
        }
    }

    #[test]
    fn round_trips_through_wire_encoding() {
        let items = random_points(32);
        let mut rng = DeterministicRng::from_seed([2u8; 32]);
        let filter = BloomFilter::build(items.len(), crate::filter::DEFAULT_FALSE_POSITIVE_PROBABILITY, &items, &mut rng).unwrap();
        let mut buf = vec![0u8; filter.object_size()];
        filter.write_object(&mut buf);
        let restored = BloomFilter::read_object(&buf).unwrap();
        for item in &items {
            assert!(restored.contains(item));
        }
    }

    #[test]
    fn rejects_probability_out_of_range() {
        assert!(BloomFilter::with_false_positive_probability(10, 0.0).is_err());
        assert!(BloomFilter::with_false_positive_probability(10, 1.0).is_err());
    }
}
