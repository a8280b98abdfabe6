//! Component C: approximate-membership filters used to compress the
//! sender's `BlockToECPoint` image before it crosses the wire (§3, §4.C).
//!
//! Both filters share one contract: insert a batch of points once at
//! build time, then answer membership queries against the built filter.
//! Neither filter ever removes an element, matching how the protocol
//! uses them (build once per run, discard after the union is computed).

mod bloom;
mod cuckoo;

pub use bloom::BloomFilter;
pub use cuckoo::CuckooFilter;

use crate::{curve::CurvePoint, rng::DeterministicRng};

/// Target false-positive probability used by both filter constructions
/// when the caller does not name one explicitly. `2^-20`, i.e. `p =
/// 2^(-lambda/2)` for a 40-bit statistical security parameter, per
/// §4.C's sizing guidance.
pub const DEFAULT_FALSE_POSITIVE_PROBABILITY: f64 = 1.0 / (1u64 << 20) as f64;

/// Which membership-test strategy a run uses for §4.E.3 step 3. Carried
/// in [`crate::psu::Pp`] so both parties agree without it ever crossing
/// the wire (Design Notes §9: "do not leak the variant into the wire
/// format"). Only `Bloom`/`Cuckoo` go through the [`Filter`] trait;
/// `Shuffle` is a permuted vector tested via a plain hash set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FilterType {
    Shuffle,
    Bloom,
    Cuckoo,
}

/// Common surface both filter constructions expose. Kept small and
/// non-generic over the element type: the protocol only ever filters
/// curve points, so there is no call for a type parameter here.
pub trait Filter: Sized {
    /// Build a filter sized for `capacity` elements at false-positive
    /// target `p`, then insert all of `items`. Takes the run's injected
    /// RNG handle rather than reaching for a global one, so a build that
    /// needs randomness (cuckoo eviction) stays reproducible under a
    /// deterministic seed like every other draw in the crate.
    fn build(capacity: usize, p: f64, items: &[CurvePoint], rng: &mut DeterministicRng) -> crate::error::Result<Self>;

    /// Test `item` for membership. May return `true` for an item never
    /// inserted (false positive); never returns `false` for an item
    /// that was inserted (no false negatives).
    fn contains(&self, item: &CurvePoint) -> bool;

    /// Size in bytes of [`Self::write_object`]'s output.
    fn object_size(&self) -> usize;

    /// Serialize into `buf`, which must be exactly [`Self::object_size`]
    /// bytes long.
    fn write_object(&self, buf: &mut [u8]);

    /// Deserialize a filter previously produced by [`Self::write_object`].
    fn read_object(buf: &[u8]) -> crate::error::Result<Self>;
}

/// Dispatches on [`FilterType`] without the protocol core matching on a
/// concrete filter type at each call site (Design Notes §9).
pub enum FilterTable {
    Bloom(BloomFilter),
    Cuckoo(CuckooFilter),
}

impl FilterTable {
    pub fn build(
        filter_type: FilterType,
        capacity: usize,
        p: f64,
        items: &[CurvePoint],
        rng: &mut DeterministicRng,
    ) -> crate::error::Result<Self> {
        match filter_type {
            FilterType::Bloom => Ok(Self::Bloom(BloomFilter::build(capacity, p, items, rng)?)),
            FilterType::Cuckoo => Ok(Self::Cuckoo(CuckooFilter::build(capacity, p, items, rng)?)),
            FilterType::Shuffle => {
                Err(crate::error::Error::config_error("FilterTable::build", "shuffle mode does not use a filter"))
            }
        }
    }

    pub fn contains(&self, item: &CurvePoint) -> bool {
        match self {
            Self::Bloom(f) => f.contains(item),
            Self::Cuckoo(f) => f.contains(item),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Bloom(f) => {
                let mut buf = vec![0u8; f.object_size()];
                f.write_object(&mut buf);
                buf
            }
            Self::Cuckoo(f) => {
                let mut buf = vec![0u8; f.object_size()];
                f.write_object(&mut buf);
                buf
            }
        }
    }

    pub fn from_bytes(filter_type: FilterType, bytes: &[u8]) -> crate::error::Result<Self> {
        match filter_type {
            FilterType::Bloom => Ok(Self::Bloom(BloomFilter::read_object(bytes)?)),
            FilterType::Cuckoo => Ok(Self::Cuckoo(CuckooFilter::read_object(bytes)?)),
            FilterType::Shuffle => {
                Err(crate::error::Error::config_error("FilterTable::from_bytes", "shuffle mode has no filter payload"))
            }
        }
    }
}
