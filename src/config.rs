//! Session/run configuration. `Pp` (built by `psu::Setup`) is the
//! protocol-level public parameters both parties must agree on;
//! `RunConfig` is the ambient, non-protocol configuration a driver
//! program layers on top (which mode to run, log verbosity) — the kind
//! of thing `spec.md` §6 calls "opaque, not part of this specification"
//! when it's persisted, but which still needs an in-process shape.

use serde::{Deserialize, Serialize};

/// Which of the three execution modes (§4.E.2) a run uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Batched,
    Pipelined,
    ParallelPipelined,
}

/// Non-protocol knobs a driver program sets before invoking a role
/// function. Never sent over the wire; both parties may choose
/// independently (e.g. one side logging more verbosely than the other).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    pub mode: Mode,
    /// `tracing_subscriber::EnvFilter`-compatible directive string,
    /// e.g. `"psu=debug"`.
    pub log_filter: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { mode: Mode::Batched, log_filter: "psu=info".to_string() }
    }
}

/// Install a `tracing_subscriber` global subscriber from `filter`.
/// Idempotent: a second call is a silent no-op, so tests that each spin
/// up a party in-process don't panic on "already set".
pub fn init_tracing(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter.to_string()))
        .try_init();
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn run_config_round_trips_through_json() {
        let config = RunConfig { mode: Mode::ParallelPipelined, log_filter: "psu=trace".to_string() };
        let json = serde_json::to_string(&config).unwrap();
        let restored: RunConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.mode, Mode::ParallelPipelined);
        assert_eq!(restored.log_filter, "psu=trace");
    }
}
