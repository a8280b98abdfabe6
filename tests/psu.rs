//! End-to-end scenarios (§8): both roles driven across a real
//! `DuplexChannel` on separate threads, for every combination of mode
//! and membership strategy the crate supports. Scenario 4 (`|X| = |Y| =
//! 2^16`) is `#[ignore]`d — it is correct by the same code path as the
//! smaller Cuckoo scenario, just slower to run on every commit.

use psu::{
    block::Block,
    error::Result,
    filter::FilterType,
    hash_to_curve::HashContext,
    net::DuplexChannel,
    ot,
    psu::{batched, parallel_pipelined, pipelined, Pp, DEFAULT_LAMBDA},
    rng::DeterministicRng,
};
use std::{collections::HashSet, thread};

/// `X` and `Y` sharing exactly `intersection` elements, with the rest
/// drawn from disjoint counter ranges so they can never collide.
fn build_sets(x_len: usize, y_len: usize, intersection: usize) -> (Vec<Block>, Vec<Block>) {
    let shared: Vec<Block> = (0..intersection as u64).map(Block::from_counter).collect();
    let mut x = shared.clone();
    x.extend((intersection..x_len).map(|i| Block::from_counter(1_000_000 + i as u64)));
    let mut y = shared;
    y.extend((intersection..y_len).map(|i| Block::from_counter(2_000_000 + i as u64)));
    (x, y)
}

/// Drives one mode's `sender`/`receiver` pair over a real `DuplexChannel`
/// split across two threads. `sender_fn`/`receiver_fn` are the mode
/// module's own function items — passing them here lets type inference
/// monomorphize their `impl Channel` parameter against `DuplexChannel`.
fn run_scenario<SF, RF>(x: Vec<Block>, y: Vec<Block>, filter_type: FilterType, sender_fn: SF, receiver_fn: RF) -> HashSet<String>
where
    SF: FnOnce(&mut DuplexChannel, &Pp, &HashContext, &mut DeterministicRng, &[Block], &ot::SenderSetup) -> Result<()> + Send + 'static,
    RF: FnOnce(&mut DuplexChannel, &Pp, &HashContext, &mut DeterministicRng, &[Block], &ot::ReceiverSetup) -> Result<HashSet<String>>,
{
    let pp = Pp::setup(filter_type, DEFAULT_LAMBDA);
    let mut rng = rand::thread_rng();
    let (sender_setup, receiver_setup) = ot::setup(&mut rng).unwrap();
    let (mut sender_channel, mut receiver_channel) = DuplexChannel::pair();

    let sender_thread = thread::spawn(move || {
        let hctx = HashContext::new();
        let mut rng = DeterministicRng::from_entropy();
        sender_fn(&mut sender_channel, &pp, &hctx, &mut rng, &x, &sender_setup).unwrap();
    });

    let hctx = HashContext::new();
    let mut rng = DeterministicRng::from_entropy();
    let union = receiver_fn(&mut receiver_channel, &pp, &hctx, &mut rng, &y, &receiver_setup).unwrap();

    sender_thread.join().unwrap();
    union
}

#[test]
fn scenario_1_batched_shuffle() {
    let (x, y) = build_sets(16, 16, 8);
    let union = run_scenario(x, y, FilterType::Shuffle, batched::sender, batched::receiver);
    assert_eq!(union.len(), 24);
}

#[test]
fn scenario_2_pipelined_shuffle() {
    let (x, y) = build_sets(1024, 1024, 0);
    let union = run_scenario(x, y, FilterType::Shuffle, pipelined::sender, pipelined::receiver);
    assert_eq!(union.len(), 2048);
}

#[test]
fn scenario_3_batched_bloom() {
    let (x, y) = build_sets(1024, 1024, 1024);
    let union = run_scenario(x, y, FilterType::Bloom, batched::sender, batched::receiver);
    // Bloom false positives can only shrink |U| below |X ∪ Y| (a
    // spurious "found" suppresses an OT recovery that would have added
    // a duplicate of an already-present Y element anyway), never grow
    // it, so the exact value is the ceiling and a small slack the floor.
    assert!(union.len() <= 1024);
    assert!(union.len() as f64 >= 1024.0 * 0.99);
}

#[test]
#[ignore]
fn scenario_4_parallel_pipelined_cuckoo() {
    let (x, y) = build_sets(1 << 16, 1 << 16, 1 << 15);
    let union = run_scenario(x, y, FilterType::Cuckoo, parallel_pipelined::sender, parallel_pipelined::receiver);
    let expected = 3 * (1 << 15);
    assert!(union.len() <= expected);
    assert!(union.len() as f64 >= expected as f64 * 0.99);
}

#[test]
fn scenario_5_batched_shuffle_singleton() {
    let (x, y) = build_sets(1, 0, 0);
    let union = run_scenario(x, y, FilterType::Shuffle, batched::sender, batched::receiver);
    assert_eq!(union.len(), 1);
}

#[test]
fn scenario_6_parallel_pipelined_shuffle() {
    let (x, y) = build_sets(256, 256, 128);
    let union = run_scenario(x, y, FilterType::Shuffle, parallel_pipelined::sender, parallel_pipelined::receiver);
    assert_eq!(union.len(), 384);
}

/// Property 8: the three modes agree on the resulting union for the
/// same inputs, even though they take different wire paths to get there.
#[test]
fn mode_equivalence() {
    let (x, y) = build_sets(64, 64, 32);

    let batched_union = run_scenario(x.clone(), y.clone(), FilterType::Shuffle, batched::sender, batched::receiver);
    let pipelined_union = run_scenario(x.clone(), y.clone(), FilterType::Shuffle, pipelined::sender, pipelined::receiver);
    let parallel_union = run_scenario(x, y, FilterType::Shuffle, parallel_pipelined::sender, parallel_pipelined::receiver);

    assert_eq!(batched_union, pipelined_union);
    assert_eq!(batched_union, parallel_union);
}

/// Invariant 1 (shuffle mode, p = 0): the union always contains exactly
/// `X ∪ Y`, no more and no less.
#[test]
fn shuffle_mode_has_no_false_positives() {
    let (x, y) = build_sets(100, 100, 37);
    let expected: HashSet<String> = x.iter().chain(&y).map(Block::to_hex_string).collect();
    let union = run_scenario(x, y, FilterType::Shuffle, batched::sender, batched::receiver);
    assert_eq!(union, expected);
}
