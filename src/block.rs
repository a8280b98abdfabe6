//! The 128-bit [`Block`], the common carrier for set elements, AES blocks,
//! and PRG output throughout this crate.

use {
    std::fmt,
    zeroize::Zeroize,
};

/// A 128-bit value.
///
/// `Block` is used interchangeably as a set element, an AES plaintext or
/// ciphertext, and a chunk of PRG output. It has no semantic meaning of its
/// own beyond "16 bytes"; every component attaches its own interpretation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Zeroize)]
pub struct Block(pub [u8; 16]);

impl Block {
    /// The all-zero block, used as the OT dummy message in the one-sided
    /// variant (see [`crate::ot`]).
    pub const ZERO: Block = Block([0u8; 16]);

    /// The fixed AES key used for deterministic hashing paths (hash-to-curve
    /// and the IKNP correlation-robust hash). Fixed, public, and never
    /// secret: any party can compute `ECBEnc` under this key.
    pub const FIX_AES_ENC_KEY: Block = Block([
        0x3d, 0x1f, 0x6a, 0x8e, 0xc4, 0x27, 0x9b, 0x05, 0x71, 0xe3, 0xaa, 0x4c, 0x60, 0x19, 0xd8,
        0xf2,
    ]);

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn xor(self, rhs: Self) -> Self {
        let mut out = [0u8; 16];
        for i in 0..16 {
            out[i] = self.0[i] ^ rhs.0[i];
        }
        Block(out)
    }

    /// A block built from a little-endian counter, used to derive distinct
    /// AES inputs from a single seed (e.g. in hash-to-curve's
    /// try-and-increment loop and the IKNP PRG expansion).
    pub fn from_counter(counter: u64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&counter.to_le_bytes());
        Block(bytes)
    }

    /// Canonical string representation used when building the final
    /// union set `U` (`Block::ToString` in the original protocol).
    pub fn to_hex_string(&self) -> String {
        let mut s = String::with_capacity(32);
        for b in self.0 {
            s.push_str(&format!("{b:02x}"));
        }
        s
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({})", self.to_hex_string())
    }
}

impl From<[u8; 16]> for Block {
    fn from(bytes: [u8; 16]) -> Self {
        Block(bytes)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_is_all_zero_bytes() {
        assert_eq!(Block::ZERO.0, [0u8; 16]);
    }

    #[test]
    fn xor_is_involution() {
        let a = Block::from_counter(7);
        let b = Block::from_counter(42);
        assert_eq!(a.xor(b).xor(b), a);
    }

    #[test]
    fn hex_string_round_trips_length() {
        let b = Block::from_counter(1);
        assert_eq!(b.to_hex_string().len(), 32);
    }
}
