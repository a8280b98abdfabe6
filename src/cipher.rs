//! Block-cipher primitives.
//!
//! The batched, schedule-oriented engine in [`crate::aes`] — what the
//! rest of the crate (hash-to-curve, the OT extension's PRG) actually
//! calls — is built on [`block::aes`]'s AES-128 routines. `Aes192` and
//! `Aes256` are carried alongside it as the same family of primitive,
//! though nothing in the protocol core currently drives them.

pub mod block;

pub use block::{Aes128, Aes192, Aes256, BlockCipher, BlockDecrypt, BlockEncrypt};
