//! AES-128 round-key schedule and batched ECB/CBC, as specified in §4.A.

use crate::{
    block::Block,
    cipher::block::aes::{inv_mix_columns, inv_shift_rows, inv_sub_bytes, key_expansion, mix_columns, shift_rows, sub_bytes},
};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of AES-128 rounds. Fixed, per the data model: "a round count
/// (fixed at 10 for 128-bit keys)".
pub const ROUND_NUM: usize = 10;

/// A fixed IV used only to chain [`cbc_enc`]/[`cbc_dec`] for hashing
/// purposes; this crate never uses CBC for confidentiality, so the IV
/// does not need to be secret or unpredictable.
pub const FIXED_IV: Block = Block([0x42; 16]);

/// AES-128 encryption round keys: `K_0 ..= K_10`. Zeroized on drop, since
/// every round key is derivable from the user key that produced it.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncSchedule {
    round_keys: [Block; ROUND_NUM + 1],
}

/// AES-128 decryption round keys, derived from an [`EncSchedule`] by the
/// equivalent-inverse-cipher transform: `InvMixColumns` is applied to
/// rounds `1..=9`, and rounds `0` and `10` are the encryption schedule's
/// last and first round keys respectively.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DecSchedule {
    round_keys: [Block; ROUND_NUM + 1],
}

impl EncSchedule {
    /// `SetEncKey`: expand a 128-bit user key into 11 round keys.
    pub fn new(user_key: Block) -> Self {
        let w = key_expansion::<4, ROUND_NUM, 16, { 4 * (ROUND_NUM + 1) * 4 }>(user_key.0);
        let mut round_keys = [Block::ZERO; ROUND_NUM + 1];
        for (i, chunk) in w.chunks_exact(16).enumerate() {
            let mut b = [0u8; 16];
            b.copy_from_slice(chunk);
            round_keys[i] = Block(b);
        }
        Self { round_keys }
    }
}

impl DecSchedule {
    /// `SetDecKey`: equivalent to building an encryption schedule and
    /// inverting it.
    pub fn new(user_key: Block) -> Self {
        Self::from_enc(&EncSchedule::new(user_key))
    }

    fn from_enc(enc: &EncSchedule) -> Self {
        let mut round_keys = [Block::ZERO; ROUND_NUM + 1];
        round_keys[0] = enc.round_keys[ROUND_NUM];
        round_keys[ROUND_NUM] = enc.round_keys[0];
        for round in 1..ROUND_NUM {
            let mut state = enc.round_keys[ROUND_NUM - round].0;
            inv_mix_columns(&mut state);
            round_keys[round] = Block(state);
        }
        Self { round_keys }
    }
}

/// `ECBEnc`: in-place, batched over `blocks`. Rounds are the outer loop
/// and blocks the inner loop, exposing instruction-level parallelism
/// across the batch.
pub fn ecb_enc(schedule: &EncSchedule, blocks: &mut [Block]) {
    for b in blocks.iter_mut() {
        *b = b.xor(schedule.round_keys[0]);
    }
    for j in 1..ROUND_NUM {
        for b in blocks.iter_mut() {
            let mut state = b.0;
            sub_bytes(&mut state);
            shift_rows(&mut state);
            mix_columns(&mut state);
            *b = Block(state).xor(schedule.round_keys[j]);
        }
    }
    for b in blocks.iter_mut() {
        let mut state = b.0;
        sub_bytes(&mut state);
        shift_rows(&mut state);
        *b = Block(state).xor(schedule.round_keys[ROUND_NUM]);
    }
}

/// `ECBDec`: in-place, batched over `blocks`. The final round always uses
/// `roundkey[ROUND_NUM]`, applied explicitly rather than via a loop
/// variable left over from the main round loop (see the Open Questions
/// resolution in DESIGN.md).
pub fn ecb_dec(schedule: &DecSchedule, blocks: &mut [Block]) {
    for b in blocks.iter_mut() {
        *b = b.xor(schedule.round_keys[0]);
    }
    for j in 1..ROUND_NUM {
        for b in blocks.iter_mut() {
            let mut state = b.0;
            inv_shift_rows(&mut state);
            inv_sub_bytes(&mut state);
            inv_mix_columns(&mut state);
            *b = Block(state).xor(schedule.round_keys[j]);
        }
    }
    for b in blocks.iter_mut() {
        let mut state = b.0;
        inv_shift_rows(&mut state);
        inv_sub_bytes(&mut state);
        *b = Block(state).xor(schedule.round_keys[ROUND_NUM]);
    }
}

/// `CBCEnc`: chain `blocks` in place over the ECB primitive, starting
/// from [`FIXED_IV`].
pub fn cbc_enc(schedule: &EncSchedule, blocks: &mut [Block]) {
    let mut prev = FIXED_IV;
    for b in blocks.iter_mut() {
        *b = b.xor(prev);
        ecb_enc(schedule, std::slice::from_mut(b));
        prev = *b;
    }
}

/// `CBCDec`: inverse of [`cbc_enc`].
pub fn cbc_dec(schedule: &DecSchedule, blocks: &mut [Block]) {
    let mut prev = FIXED_IV;
    for b in blocks.iter_mut() {
        let ciphertext = *b;
        ecb_dec(schedule, std::slice::from_mut(b));
        *b = b.xor(prev);
        prev = ciphertext;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn key() -> Block {
        Block::from_counter(0x0123_4567_89ab_cdef)
    }

    #[test]
    fn ecb_round_trip() {
        let enc = EncSchedule::new(key());
        let dec = DecSchedule::new(key());
        let mut blocks: Vec<Block> = (0..37).map(Block::from_counter).collect();
        let original = blocks.clone();
        ecb_enc(&enc, &mut blocks);
        assert_ne!(blocks, original);
        ecb_dec(&dec, &mut blocks);
        assert_eq!(blocks, original);
    }

    #[test]
    fn cbc_round_trip() {
        let enc = EncSchedule::new(key());
        let dec = DecSchedule::new(key());
        let mut blocks: Vec<Block> = (0..11).map(Block::from_counter).collect();
        let original = blocks.clone();
        cbc_enc(&enc, &mut blocks);
        assert_ne!(blocks, original);
        cbc_dec(&dec, &mut blocks);
        assert_eq!(blocks, original);
    }

    #[test]
    fn ecb_matches_fips197_test_vector() {
        // FIPS-197 Appendix B.
        let key = Block([
            0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf,
            0x4f, 0x3c,
        ]);
        let plaintext = Block([
            0x32, 0x43, 0xf6, 0xa8, 0x88, 0x5a, 0x30, 0x8d, 0x31, 0x31, 0x98, 0xa2, 0xe0, 0x37,
            0x07, 0x34,
        ]);
        let expected = Block([
            0x39, 0x25, 0x84, 0x1d, 0x02, 0xdc, 0x09, 0xfb, 0xdc, 0x11, 0x85, 0x97, 0x19, 0x6a,
            0x0b, 0x32,
        ]);
        let enc = EncSchedule::new(key);
        let mut blocks = [plaintext];
        ecb_enc(&enc, &mut blocks);
        assert_eq!(blocks[0], expected);
    }
}
