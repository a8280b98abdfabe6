//! The "what" of §4.E.3, shared by all three modes; each mode module
//! supplies only the "how" (one-shot vector exchange, element-at-a-time
//! interleaving, or bulk-parallel vector exchange).

use {
    crate::{
        block::Block,
        bulk,
        curve::{CurvePoint, Scalar},
        error::{Error, Result},
        filter::{FilterTable, FilterType},
        hash_to_curve::HashContext,
        net::Channel,
        psu::Pp,
        rng::DeterministicRng,
    },
    rand_core::RngCore,
    std::collections::HashSet,
};

/// `H(blocks[i]) * k`, sequentially.
pub fn hash_and_scale(hctx: &HashContext, blocks: &[Block], k: &Scalar) -> Vec<CurvePoint> {
    blocks.iter().map(|&b| hctx.block_to_ec_point(b).mul(k)).collect()
}

/// The bulk-parallel, thread-safe variant parallel-pipelined mode
/// requires (§5: "all curve calls on that path must be the thread-safe
/// variants").
pub fn hash_and_scale_parallel(hctx: &HashContext, blocks: &[Block], k: &Scalar) -> Vec<CurvePoint> {
    bulk::for_each_indexed(blocks.len(), |i| hctx.threadsafe_block_to_ec_point(blocks[i]).threadsafe_mul(k))
}

/// `points[i] * k`, sequentially.
pub fn scale(points: &[CurvePoint], k: &Scalar) -> Vec<CurvePoint> {
    points.iter().map(|&p| p.mul(k)).collect()
}

pub fn scale_parallel(points: &[CurvePoint], k: &Scalar) -> Vec<CurvePoint> {
    bulk::for_each_indexed(points.len(), |i| points[i].threadsafe_mul(k))
}

/// Fisher-Yates. §4.E.5: the sender must permute `Fk1k2_Y` before
/// sending it in shuffle mode, or the Fk2_Y/Fk1k2_Y correspondence
/// leaks the order of `Y`.
pub fn shuffle(points: &mut [CurvePoint], rng: &mut DeterministicRng) {
    for i in (1..points.len()).rev() {
        let j = (rng.next_u64() % (i as u64 + 1)) as usize;
        points.swap(i, j);
    }
}

/// `b_i`: `true` ("not found", needs OT) iff `candidates[i]` fails the
/// membership test.
pub fn choice_bits(candidates: &[CurvePoint], membership: impl Fn(&CurvePoint) -> bool) -> Vec<bool> {
    candidates.iter().map(|p| !membership(p)).collect()
}

/// The `shuffle`-mode membership structure: a plain hash set over the
/// received (permuted) points.
pub fn point_set(points: &[CurvePoint]) -> HashSet<CurvePoint> {
    points.iter().copied().collect()
}

/// `U = {hex(y) : y in Y} U {hex(z) : z in recovered, z != ZERO}` (§4.E.3 step 6).
pub fn union(y: &[Block], recovered: &[Block]) -> HashSet<String> {
    let mut u: HashSet<String> = y.iter().map(Block::to_hex_string).collect();
    u.extend(recovered.iter().filter(|&&z| z != Block::ZERO).map(Block::to_hex_string));
    u
}

/// The built membership structure, whichever `FilterType` produced it
/// (Design Notes §9's dispatch-at-the-top polymorphism).
pub enum Membership {
    Points(HashSet<CurvePoint>),
    Filter(FilterTable),
}

impl Membership {
    pub fn contains(&self, p: &CurvePoint) -> bool {
        match self {
            Self::Points(set) => set.contains(p),
            Self::Filter(table) => table.contains(p),
        }
    }
}

/// Sender side of §4.E.3 step 3: permute-and-send for `shuffle`, or
/// build-serialize-and-send a filter for `bloom`/`cuckoo`.
pub fn send_membership_structure(
    channel: &mut impl Channel,
    pp: &Pp,
    rng: &mut DeterministicRng,
    fk1k2_y: &mut [CurvePoint],
) -> Result<()> {
    match pp.filter_type {
        FilterType::Shuffle => {
            shuffle(fk1k2_y, rng);
            channel.send_points(fk1k2_y)
        }
        FilterType::Bloom | FilterType::Cuckoo => {
            let table = FilterTable::build(pp.filter_type, fk1k2_y.len(), pp.false_positive_probability, fk1k2_y, rng)?;
            let bytes = table.to_bytes();
            channel.send_integer(bytes.len() as u64)?;
            channel.send_bytes(&bytes)
        }
    }
}

/// Receiver side of §4.E.3 step 3.
pub fn receive_membership_structure(channel: &mut impl Channel, pp: &Pp) -> Result<Membership> {
    match pp.filter_type {
        FilterType::Shuffle => Ok(Membership::Points(point_set(&channel.receive_points()?))),
        FilterType::Bloom | FilterType::Cuckoo => {
            let len = channel.receive_integer()? as usize;
            let bytes = channel.receive_bytes()?;
            if bytes.len() != len {
                return Err(Error::protocol_abort("receiver:recv-filter", "declared filter size does not match received payload"));
            }
            Ok(Membership::Filter(FilterTable::from_bytes(pp.filter_type, &bytes)?))
        }
    }
}
