//! Relay safeguard.
//!
//! Mechanical relays chatter when toggled rapidly, so every switch on a
//! pair must be separated by a minimum dwell time. [`GuardedRelay`]
//! couples a relay port with the pair-scoped timestamp of the last
//! successful switch and refuses writes that arrive too early.
//!
//! ## Drop semantics
//!
//! A refused switch is a **silent no-op**: no write happens, no error is
//! raised, the dwell timestamp stays put. Callers must re-derive their
//! desired configuration from the channel's logical state instead of
//! assuming the request landed — the position-reached reconciler
//! eventually retries the transition when the PWM ramp completes.

use log::{debug, warn};

use crate::app::ports::{PortError, RelayPort};

/// Outcome of a guarded switch request.
///
/// Tri-state rather than a boolean so callers and tests can tell
/// "nothing happened" apart from "happened but the port failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Outputs were written; the dwell timestamp advanced.
    Applied,
    /// Dwell time had not elapsed; the request was silently discarded.
    Dropped,
    /// The relay port failed; logged and absorbed, timestamp unchanged.
    Failed,
}

/// A relay pair plus the dwell-guard state scoped to it.
///
/// The last-switch timestamp lives alongside the pair it protects — one
/// `GuardedRelay` per physical module, shared by every channel that
/// writes to it. It is initialised to the construction instant, so the
/// first switch after startup also waits out the dwell time.
pub struct GuardedRelay<R> {
    relay: R,
    guard_ms: u64,
    last_switch_ms: u64,
}

impl<R: RelayPort> GuardedRelay<R> {
    /// Wrap `relay` with a `guard_ms` dwell guard, seeding the timestamp
    /// with `now_ms`.
    pub fn new(relay: R, guard_ms: u64, now_ms: u64) -> Self {
        Self {
            relay,
            guard_ms,
            last_switch_ms: now_ms,
        }
    }

    /// Read the live pair state.
    pub fn read(&mut self) -> Result<(bool, bool), PortError> {
        self.relay.get_state()
    }

    /// Write both outputs if the dwell time since the last successful
    /// switch has elapsed.
    ///
    /// Guard check, write, and timestamp update form one critical
    /// section; on a shared pair the caller holds the pair mutex across
    /// this call.
    pub fn try_switch(&mut self, out1: bool, out2: bool, now_ms: u64) -> SwitchOutcome {
        let elapsed = now_ms.saturating_sub(self.last_switch_ms);
        if elapsed < self.guard_ms {
            debug!("relay switch dropped, only {elapsed} ms since last switch");
            return SwitchOutcome::Dropped;
        }
        match self.relay.set_state(out1, out2) {
            Ok(()) => {
                self.last_switch_ms = now_ms;
                SwitchOutcome::Applied
            }
            Err(e) => {
                warn!("relay write failed: {e}");
                SwitchOutcome::Failed
            }
        }
    }

    /// Timestamp (ms) of the last applied switch.
    pub fn last_switch_ms(&self) -> u64 {
        self.last_switch_ms
    }

    /// The configured dwell interval in milliseconds.
    pub fn guard_ms(&self) -> u64 {
        self.guard_ms
    }

    /// Access the underlying port (diagnostics, tests).
    pub fn relay(&self) -> &R {
        &self.relay
    }
}
