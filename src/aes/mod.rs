//! Component A: AES key schedule plus batched ECB/CBC over [`Block`]s.
//!
//! This is deliberately a separate engine from the generic
//! [`crate::cipher::block::aes`] software routines it is built on: those
//! operate on one 16-byte array at a time and know nothing about round-key
//! reuse, while this module expands a key once into a [`Schedule`] and
//! applies it across a whole vector of blocks with the round-major,
//! block-minor loop order described in §4.A of the design.

mod schedule;

pub use schedule::{cbc_dec, cbc_enc, ecb_dec, ecb_enc, DecSchedule, EncSchedule, ROUND_NUM};
