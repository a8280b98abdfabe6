//! The error taxonomy of §7: every fallible step in the protocol core
//! returns one of these four kinds, tagged with the §4.E.3 step name it
//! failed at.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// A fatal condition raised by the PSU core or one of its components.
///
/// All four kinds are fatal to the current run (§7 propagation policy):
/// the run aborts, secrets are zeroised by their `Drop` impls, and the
/// channel is closed. Nothing is retried at this layer.
#[derive(Debug, Error)]
pub enum Error {
    /// The peer closed the connection or sent a malformed wire message.
    #[error("protocol aborted at step `{step}`: {detail}")]
    ProtocolAbort { step: &'static str, detail: String },

    /// A Cuckoo filter insertion exhausted its eviction-chain bound.
    #[error("filter overflow at step `{step}`: {detail} (raise filter capacity)")]
    FilterOverflow { step: &'static str, detail: String },

    /// A received point failed to decode or does not lie on the curve.
    #[error("curve error at step `{step}`: {detail}")]
    CurveError { step: &'static str, detail: String },

    /// `filter_type` was not one of `shuffle`/`bloom`/`cuckoo`, or the two
    /// parties' public parameters otherwise disagree.
    #[error("configuration error at step `{step}`: {detail}")]
    ConfigError { step: &'static str, detail: String },
}

impl Error {
    pub fn protocol_abort(step: &'static str, detail: impl Into<String>) -> Self {
        Error::ProtocolAbort { step, detail: detail.into() }
    }

    pub fn filter_overflow(step: &'static str, detail: impl Into<String>) -> Self {
        Error::FilterOverflow { step, detail: detail.into() }
    }

    pub fn curve_error(step: &'static str, detail: impl Into<String>) -> Self {
        Error::CurveError { step, detail: detail.into() }
    }

    pub fn config_error(step: &'static str, detail: impl Into<String>) -> Self {
        Error::ConfigError { step, detail: detail.into() }
    }

    /// The §4.E.3 step name this error was raised at, for diagnostics.
    pub fn step(&self) -> &'static str {
        match self {
            Error::ProtocolAbort { step, .. }
            | Error::FilterOverflow { step, .. }
            | Error::CurveError { step, .. }
            | Error::ConfigError { step, .. } => step,
        }
    }
}
