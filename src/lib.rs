//! Two-party private set union from a weak commutative PRF and a
//! one-sided OT extension.
//!
//! Components, bottom-up: [`aes`]/[`cipher`] (A), [`hash_to_curve`] (B),
//! [`filter`] (C), [`ot`] (D), [`psu`] (E). [`net`] carries the wire
//! protocol between them; [`block`], [`curve`], [`rng`], [`bulk`], and
//! [`error`] are the shared primitives all five lean on. [`config`] is
//! ambient driver configuration, not part of the protocol core itself.

pub mod aes;
pub mod block;
pub mod bulk;
pub mod cipher;
pub mod config;
pub mod curve;
pub mod error;
pub mod filter;
pub mod hash_to_curve;
pub mod net;
pub mod ot;
pub mod psu;
pub mod rng;

pub use {
    block::Block,
    cipher::{Aes128, Aes192, Aes256, BlockCipher, BlockDecrypt, BlockEncrypt},
    curve::{CurvePoint, Scalar},
    error::{Error, Result},
    filter::{BloomFilter, CuckooFilter, Filter, FilterTable, FilterType},
    hash_to_curve::HashContext,
    net::{Channel, DuplexChannel, TcpChannel},
    psu::{Pp, DEFAULT_LAMBDA},
};
