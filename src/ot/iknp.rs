//! Semi-honest IKNP OT extension (§4.D): `CSP` base OTs bootstrap an
//! arbitrary number of 1-out-of-2 OTs, using the AES engine from
//! [`crate::aes`] as the correlation-robust PRG. Both the plain variant
//! (`Send`/`Receive`, arbitrary message pairs) and the one-sided variant
//! (`OnesidedSend`/`OnesidedReceive`, where message `0` is always the
//! all-zero block and so never needs to cross the wire) are exposed —
//! the PSU protocol only ever uses the one-sided form.

use {
    crate::{
        aes::{ecb_enc, EncSchedule},
        block::Block,
        error::Result,
        ot::base::{BaseOtReceiver, BaseOtSender},
    },
    rand::Rng,
    rand_core::{CryptoRng, RngCore},
    zeroize::{Zeroize, ZeroizeOnDrop},
};

/// Computational security parameter: the number of base OTs, and
/// therefore the bit width of a matrix row/column. Fixed at 128 so a
/// full row or column of the IKNP matrix fits in one [`Block`].
pub const CSP: usize = 128;

fn random_block(rng: &mut (impl RngCore + CryptoRng)) -> Block {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    Block(bytes)
}

fn num_blocks_for(count: usize) -> usize {
    (count + CSP - 1) / CSP
}

/// Expand `seed` into `count` pseudorandom bits, packed into
/// `ceil(count / 128)` blocks, via AES-128 in counter mode keyed by the
/// seed.
fn prg_expand(seed: Block, count: usize) -> Vec<Block> {
    let schedule = EncSchedule::new(seed);
    let mut blocks: Vec<Block> = (0..num_blocks_for(count) as u64).map(Block::from_counter).collect();
    ecb_enc(&schedule, &mut blocks);
    blocks
}

fn pack_bits(bits: &[bool]) -> Vec<Block> {
    let mut blocks = vec![Block::ZERO; num_blocks_for(bits.len())];
    for (i, &bit) in bits.iter().enumerate() {
        if bit {
            blocks[i / CSP].0[(i % CSP) / 8] |= 1 << ((i % CSP) % 8);
        }
    }
    blocks
}

fn get_bit(blocks: &[Block], i: usize) -> bool {
    let byte = blocks[i / CSP].0[(i % CSP) / 8];
    (byte >> ((i % CSP) % 8)) & 1 == 1
}

fn set_bit(block: &mut Block, bit: usize) {
    block.0[bit / 8] |= 1 << (bit % 8);
}

fn xor_blocks(a: &[Block], b: &[Block]) -> Vec<Block> {
    a.iter().zip(b).map(|(x, y)| x.xor(*y)).collect()
}

fn xor3_blocks(a: &[Block], b: &[Block], c: &[Block]) -> Vec<Block> {
    a.iter().zip(b).zip(c).map(|((x, y), z)| x.xor(*y).xor(*z)).collect()
}

/// Transpose `CSP` bit-packed columns into `count` rows, each row the
/// `CSP`-bit vector of "this column's bit at position `i`", packed into
/// one [`Block`] since `CSP == 128`.
fn transpose(columns: &[Vec<Block>], count: usize) -> Vec<Block> {
    let mut rows = vec![Block::ZERO; count];
    for (j, column) in columns.iter().enumerate() {
        for (i, row) in rows.iter_mut().enumerate() {
            if get_bit(column, i) {
                set_bit(row, j);
            }
        }
    }
    rows
}

fn correlation_robust_hash(index: usize, block: Block) -> Block {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(index as u64).to_le_bytes());
    hasher.update(block.as_bytes());
    let hash = hasher.finalize();
    Block(hash.as_bytes()[..16].try_into().unwrap())
}

/// The OT-extension sender's base-OT material: a random `CSP`-bit
/// string `s` and, for each column, the seed chosen by `s_j`. Both are
/// live protocol secrets for as long as `self` lives, so they are
/// zeroized as soon as it is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SenderSetup {
    s_bits: Vec<bool>,
    seeds: Vec<Block>,
}

/// The OT-extension receiver's base-OT material: both seeds of every
/// column, since as the base-OT sender it chose them both.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ReceiverSetup {
    seed_pairs: Vec<[Block; 2]>,
}

/// `OtePp::Setup`: run `CSP` base OTs to bootstrap the extension. Both
/// sides of the base OT are simulated in one call — a real deployment
/// instead drives [`BaseOtSender`]/[`BaseOtReceiver`] across the wire
/// and calls this crate's base-OT primitives directly on each side.
pub fn setup(rng: &mut (impl RngCore + CryptoRng)) -> Result<(SenderSetup, ReceiverSetup)> {
    let mut s_bits = Vec::with_capacity(CSP);
    let mut seeds = Vec::with_capacity(CSP);
    let mut seed_pairs = Vec::with_capacity(CSP);

    for _ in 0..CSP {
        let seed0 = random_block(rng);
        let seed1 = random_block(rng);
        let choice = rng.gen::<bool>();

        let base_sender = BaseOtSender::new(rng);
        let (base_receiver, reply) = BaseOtReceiver::new(rng, &base_sender.public_key(), choice)?;
        let blinded = base_sender.send(&reply, [seed0, seed1])?;
        let chosen = base_receiver.derive(blinded);

        s_bits.push(choice);
        seeds.push(chosen);
        seed_pairs.push([seed0, seed1]);
    }

    Ok((SenderSetup { s_bits, seeds }, ReceiverSetup { seed_pairs }))
}

/// The correction vectors the receiver sends after extending: one
/// `u_j = t0_j XOR t1_j XOR r` per column.
pub struct ExtendMessage {
    pub u: Vec<Vec<Block>>,
}

/// Per-index keys held by the extension sender, one pair `(K0, K1)`.
/// One-time-pad keys, so they get the same zeroize-on-drop treatment as
/// the setup material they are derived from.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SenderKeys {
    key_pairs: Vec<(Block, Block)>,
}

/// Per-index keys held by the extension receiver, one `K_{r_i}` per
/// index plus the choice bits themselves (needed to pick `e0` vs `e1`).
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ReceiverKeys {
    keys: Vec<Block>,
    choices: Vec<bool>,
}

impl ReceiverSetup {
    /// `Extend` on the receiver side: derive this extension's keys and
    /// the `ExtendMessage` to send to the sender.
    pub fn extend(&self, choices: &[bool]) -> (ReceiverKeys, ExtendMessage) {
        let count = choices.len();
        let r = pack_bits(choices);

        let mut columns_t0 = Vec::with_capacity(CSP);
        let mut u = Vec::with_capacity(CSP);
        for [seed0, seed1] in &self.seed_pairs {
            let t0 = prg_expand(*seed0, count);
            let t1 = prg_expand(*seed1, count);
            u.push(xor3_blocks(&t0, &t1, &r));
            columns_t0.push(t0);
        }

        let rows = transpose(&columns_t0, count);
        let keys = (0..count).map(|i| correlation_robust_hash(i, rows[i])).collect();

        (ReceiverKeys { keys, choices: choices.to_vec() }, ExtendMessage { u })
    }
}

impl SenderSetup {
    /// `Extend` on the sender side: consume the receiver's
    /// `ExtendMessage` and derive this extension's key pairs.
    pub fn extend(&self, msg: &ExtendMessage, count: usize) -> SenderKeys {
        let s_block = pack_bits(&self.s_bits)[0];

        let mut columns_q = Vec::with_capacity(CSP);
        for (j, seed) in self.seeds.iter().enumerate() {
            let t = prg_expand(*seed, count);
            let q = if self.s_bits[j] { xor_blocks(&t, &msg.u[j]) } else { t };
            columns_q.push(q);
        }

        let rows = transpose(&columns_q, count);
        let key_pairs = (0..count)
            .map(|i| {
                let k0 = correlation_robust_hash(i, rows[i]);
                let k1 = correlation_robust_hash(i, rows[i].xor(s_block));
                (k0, k1)
            })
            .collect();

        SenderKeys { key_pairs }
    }
}

impl SenderKeys {
    /// `Send`: one-time-pad both messages of every pair under this
    /// index's two keys.
    pub fn send(&self, messages: &[(Block, Block)]) -> Vec<(Block, Block)> {
        self.key_pairs
            .iter()
            .zip(messages)
            .map(|((k0, k1), (m0, m1))| (k0.xor(*m0), k1.xor(*m1)))
            .collect()
    }

    /// `OnesidedSend`: only the choice-`1` message is ever meaningful
    /// (choice-`0` is always [`Block::ZERO`]), so only its ciphertext
    /// needs to cross the wire.
    pub fn onesided_send(&self, messages_for_one: &[Block]) -> Vec<Block> {
        self.key_pairs.iter().zip(messages_for_one).map(|((_, k1), m)| k1.xor(*m)).collect()
    }
}

impl ReceiverKeys {
    /// `Receive`: recover `m_{r_i}` for every index.
    pub fn receive(&self, ciphertexts: &[(Block, Block)]) -> Vec<Block> {
        self.keys
            .iter()
            .zip(&self.choices)
            .zip(ciphertexts)
            .map(|((k, &choice), (e0, e1))| k.xor(if choice { *e1 } else { *e0 }))
            .collect()
    }

    /// `OnesidedReceive`: recover the choice-`1` message when
    /// `choices[i]` is set, else the implicit [`Block::ZERO`].
    pub fn onesided_receive(&self, ciphertexts: &[Block]) -> Vec<Block> {
        self.keys
            .iter()
            .zip(&self.choices)
            .zip(ciphertexts)
            .map(|((k, &choice), e1)| if choice { k.xor(*e1) } else { Block::ZERO })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{thread_rng, Rng};

    #[test]
    fn plain_extension_recovers_chosen_messages() {
        let mut rng = thread_rng();
        let (sender_setup, receiver_setup) = setup(&mut rng).unwrap();

        let count = 1000;
        let choices: Vec<bool> = (0..count).map(|_| rng.gen()).collect();
        let messages: Vec<(Block, Block)> =
            (0..count).map(|i| (Block::from_counter(2 * i as u64), Block::from_counter(2 * i as u64 + 1))).collect();

        let (receiver_keys, extend_msg) = receiver_setup.extend(&choices);
        let sender_keys = sender_setup.extend(&extend_msg, count);

        let ciphertexts = sender_keys.send(&messages);
        let recovered = receiver_keys.receive(&ciphertexts);

        for i in 0..count {
            let expected = if choices[i] { messages[i].1 } else { messages[i].0 };
            assert_eq!(recovered[i], expected);
        }
    }

    #[test]
    fn onesided_extension_recovers_zero_or_chosen_message() {
        let mut rng = thread_rng();
        let (sender_setup, receiver_setup) = setup(&mut rng).unwrap();

        let count = 513; // not a multiple of CSP, exercises the rounding path
        let choices: Vec<bool> = (0..count).map(|_| rng.gen()).collect();
        let messages_for_one: Vec<Block> = (0..count).map(|i| Block::from_counter(i as u64)).collect();

        let (receiver_keys, extend_msg) = receiver_setup.extend(&choices);
        let sender_keys = sender_setup.extend(&extend_msg, count);

        let ciphertexts = sender_keys.onesided_send(&messages_for_one);
        let recovered = receiver_keys.onesided_receive(&ciphertexts);

        for i in 0..count {
            let expected = if choices[i] { messages_for_one[i] } else { Block::ZERO };
            assert_eq!(recovered[i], expected);
        }
    }
}
