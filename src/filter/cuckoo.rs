//! Cuckoo filter: partial-key cuckoo hashing over fixed-size buckets of
//! fingerprints, per §4.C. Traded off against the Bloom filter for a
//! smaller on-wire size at the same false-positive target, at the cost
//! of a (bounded) chance of build failure under adversarial load.

use crate::{
    curve::CurvePoint,
    error::{self, Error},
    filter::Filter,
    rng::DeterministicRng,
};
use rand::Rng;

const SLOTS_PER_BUCKET: u64 = 4;
const MAX_KICKS: u32 = 500;
const TARGET_LOAD_FACTOR: f64 = 0.95;

const KEY_FINGERPRINT: [u8; 32] = *b"psu-cuckoo-filter-fp-key-0000000";
const KEY_INDEX1: [u8; 32] = *b"psu-cuckoo-filter-i1-key-0000000";
const KEY_INDEX2: [u8; 32] = *b"psu-cuckoo-filter-i2-key-0000000";

/// `0` is the empty-slot sentinel; fingerprints are masked to
/// `fingerprint_bits` bits and forced nonzero.
pub struct CuckooFilter {
    num_buckets: u64,
    fingerprint_bits: u32,
    max_kicks: u32,
    slots: Vec<u32>,
}

impl CuckooFilter {
    pub fn with_false_positive_probability(capacity: usize, p: f64) -> error::Result<Self> {
        if !(0.0 < p && p < 1.0) {
            return Err(Error::config_error("CuckooFilter::new", "false-positive probability must lie in (0, 1)"));
        }
        let fingerprint_bits = (((1.0 / p).log2().ceil() + (2.0 * SLOTS_PER_BUCKET as f64).log2().ceil()) as u32)
            .clamp(1, 31);
        let buckets_needed = ((capacity.max(1) as f64) / (SLOTS_PER_BUCKET as f64 * TARGET_LOAD_FACTOR)).ceil() as u64;
        let num_buckets = buckets_needed.max(1).next_power_of_two();
        Ok(Self {
            num_buckets,
            fingerprint_bits,
            max_kicks: MAX_KICKS,
            slots: vec![0u32; (num_buckets * SLOTS_PER_BUCKET) as usize],
        })
    }

    fn fingerprint(&self, item: &CurvePoint) -> u32 {
        let bytes = item.to_bytes();
        let raw = u32::from_le_bytes(blake3::keyed_hash(&KEY_FINGERPRINT, &bytes).as_bytes()[..4].try_into().unwrap());
        let mask = (1u32 << self.fingerprint_bits) - 1;
        let fp = raw & mask;
        if fp == 0 { 1 } else { fp }
    }

    fn index1(&self, item: &CurvePoint) -> u64 {
        let bytes = item.to_bytes();
        let h = u64::from_le_bytes(blake3::keyed_hash(&KEY_INDEX1, &bytes).as_bytes()[..8].try_into().unwrap());
        h % self.num_buckets
    }

    /// `i2 = i1 XOR (H'(fp) mod B)`: partial-key cuckoo hashing, so an
    /// element can be relocated knowing only its bucket and fingerprint.
    fn alt_index(&self, index: u64, fingerprint: u32) -> u64 {
        let h = u64::from_le_bytes(blake3::keyed_hash(&KEY_INDEX2, &fingerprint.to_le_bytes()).as_bytes()[..8].try_into().unwrap());
        index ^ (h % self.num_buckets)
    }

    fn bucket(&self, index: u64) -> &[u32] {
        let start = (index * SLOTS_PER_BUCKET) as usize;
        &self.slots[start..start + SLOTS_PER_BUCKET as usize]
    }

    fn bucket_mut(&mut self, index: u64) -> &mut [u32] {
        let start = (index * SLOTS_PER_BUCKET) as usize;
        &mut self.slots[start..start + SLOTS_PER_BUCKET as usize]
    }

    fn bucket_contains(&self, index: u64, fingerprint: u32) -> bool {
        self.bucket(index).contains(&fingerprint)
    }

    fn try_place(&mut self, index: u64, fingerprint: u32) -> bool {
        for slot in self.bucket_mut(index) {
            if *slot == 0 {
                *slot = fingerprint;
                return true;
            }
        }
        false
    }

    fn insert_one(&mut self, item: &CurvePoint, rng: &mut DeterministicRng) -> error::Result<()> {
        let fingerprint = self.fingerprint(item);
        let i1 = self.index1(item);
        let i2 = self.alt_index(i1, fingerprint);

        // Idempotent: an element already present is not duplicated.
        if self.bucket_contains(i1, fingerprint) || self.bucket_contains(i2, fingerprint) {
            return Ok(());
        }
        if self.try_place(i1, fingerprint) || self.try_place(i2, fingerprint) {
            return Ok(());
        }

        let mut index = if rng.gen::<bool>() { i1 } else { i2 };
        let mut fingerprint = fingerprint;
        for _ in 0..self.max_kicks {
            let slot = rng.gen_range(0..SLOTS_PER_BUCKET as usize);
            std::mem::swap(&mut fingerprint, &mut self.bucket_mut(index)[slot]);
            index = self.alt_index(index, fingerprint);
            if self.try_place(index, fingerprint) {
                return Ok(());
            }
        }
        Err(Error::filter_overflow("CuckooFilter::insert", "eviction chain exceeded the bound without finding a free slot"))
    }
}

impl Filter for CuckooFilter {
    fn build(capacity: usize, p: f64, items: &[CurvePoint], rng: &mut DeterministicRng) -> error::Result<Self> {
        let mut filter = Self::with_false_positive_probability(capacity, p)?;
        for item in items {
            filter.insert_one(item, rng)?;
        }
        Ok(filter)
    }

    fn contains(&self, item: &CurvePoint) -> bool {
        let fingerprint = self.fingerprint(item);
        let i1 = self.index1(item);
        let i2 = self.alt_index(i1, fingerprint);
        self.bucket_contains(i1, fingerprint) || self.bucket_contains(i2, fingerprint)
    }

    fn object_size(&self) -> usize {
        8 + 4 + 4 + self.slots.len() * 4
    }

    fn write_object(&self, buf: &mut [u8]) {
        assert_eq!(buf.len(), self.object_size());
        buf[0..8].copy_from_slice(&self.num_buckets.to_le_bytes());
        buf[8..12].copy_from_slice(&self.fingerprint_bits.to_le_bytes());
        buf[12..16].copy_from_slice(&self.max_kicks.to_le_bytes());
        for (chunk, slot) in buf[16..].chunks_exact_mut(4).zip(&self.slots) {
            chunk.copy_from_slice(&slot.to_le_bytes());
        }
    }

    fn read_object(buf: &[u8]) -> error::Result<Self> {
        if buf.len() < 16 {
            return Err(Error::config_error("CuckooFilter::read_object", "buffer shorter than header"));
        }
        let num_buckets = u64::from_le_bytes(buf[0..8].try_into().unwrap());
        let fingerprint_bits = u32::from_le_bytes(buf[8..12].try_into().unwrap());
        let max_kicks = u32::from_le_bytes(buf[12..16].try_into().unwrap());
        let expected = 16 + (num_buckets * SLOTS_PER_BUCKET) as usize * 4;
        if buf.len() != expected {
            return Err(Error::config_error("CuckooFilter::read_object", "buffer length does not match header"));
        }
        let slots = buf[16..].chunks_exact(4).map(|c| u32::from_le_bytes(c.try_into().unwrap())).collect();
        Ok(Self { num_buckets, fingerprint_bits, max_kicks, slots })
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
        let mut rng = DeterministicRng::from_seed([3u8; 32]);
        let filter = CuckooFilter::build(items.len(), crate::filter::DEFAULT_FALSE_POSITIVE_PROBABILITY, &items, &mut rng).unwrap();
        for item in &items {
            assert!(filter.contains(item));
        }
    }

    #[test]
    fn round_trips_through_wire_encoding() {
        let items = random_points(32);
        let mut rng = DeterministicRng::from_seed([4u8; 32]);
        let filter = CuckooFilter::build(items.len(), crate::filter::DEFAULT_FALSE_POSITIVE_PROBABILITY, &items, &mut rng).unwrap();
        let mut buf = vec![0u8; filter.object_size()];
        filter.write_object(&mut buf);
        let restored = CuckooFilter::read_object(&buf).unwrap();
        for item in &items {
            assert!(restored.contains(item));
        }
    }

    #[test]
    fn repeated_insert_is_idempotent() {
        let items = random_points(8);
        let mut rng = DeterministicRng::from_seed([5u8; 32]);
        let mut filter =
            CuckooFilter::with_false_positive_probability(items.len(), crate::filter::DEFAULT_FALSE_POSITIVE_PROBABILITY).unwrap();
        for item in &items {
            filter.insert_one(item, &mut rng).unwrap();
            filter.insert_one(item, &mut rng).unwrap();
        }
        for item in &items {
            assert!(filter.contains(item));
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_filter_layout() {
        let items = random_points(64);
        let mut rng_a = DeterministicRng::from_seed([9u8; 32]);
        let mut rng_b = DeterministicRng::from_seed([9u8; 32]);
        let a = CuckooFilter::build(items.len(), crate::filter::DEFAULT_FALSE_POSITIVE_PROBABILITY, &items, &mut rng_a).unwrap();
        let b = CuckooFilter::build(items.len(), crate::filter::DEFAULT_FALSE_POSITIVE_PROBABILITY, &items, &mut rng_b).unwrap();
        assert_eq!(a.slots, b.slots);
    }
}
