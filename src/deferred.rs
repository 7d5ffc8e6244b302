//! Deferred relay switching.
//!
//! An alternative debounce strategy to the hard drop in
//! [`crate::safeguard`]: instead of refusing an early switch outright, a
//! pending write is armed and applied once the dwell delay has elapsed.
//! A newer request for the same pair supersedes whatever was pending;
//! cancellation discards the pending write entirely — there is no
//! partial apply.
//!
//! The main control flow does not use this mechanism; it exists for
//! callers that prefer last-writer-wins debouncing over silent drops
//! (e.g. a physical wall switch bouncing on contact).

use log::debug;

use crate::app::ports::RelayPort;
use crate::safeguard::{GuardedRelay, SwitchOutcome};

#[derive(Debug, Clone, Copy)]
struct Pending {
    out1: bool,
    out2: bool,
    due_ms: u64,
}

/// A cancellable, superseding pending switch for one relay pair.
pub struct DeferredSwitch {
    delay_ms: u64,
    pending: Option<Pending>,
}

impl DeferredSwitch {
    /// One instance per relay pair, applying `delay_ms` after `schedule`.
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    /// Arm a pending write, superseding any earlier one for this pair.
    pub fn schedule(&mut self, out1: bool, out2: bool, now_ms: u64) {
        if self.pending.is_some() {
            debug!("superseding pending relay switch");
        }
        self.pending = Some(Pending {
            out1,
            out2,
            due_ms: now_ms.saturating_add(self.delay_ms),
        });
    }

    /// Discard the pending write, if any.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply the pending write once due. Still routed through the pair's
    /// dwell guard — the deferral delays the request, it does not bypass
    /// the safeguard.
    pub fn poll<R: RelayPort>(
        &mut self,
        pair: &mut GuardedRelay<R>,
        now_ms: u64,
    ) -> Option<SwitchOutcome> {
        let entry = self.pending?;
        if now_ms < entry.due_ms {
            return None;
        }
        self.pending = None;
        Some(pair.try_switch(entry.out1, entry.out2, now_ms))
    }
}
