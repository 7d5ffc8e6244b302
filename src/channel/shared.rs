//! Shared relay topology.
//!
//! A PWM controller with its own relay module can switch two half-bridge
//! stripes between DIMMED and ON with a single remotely-controlled pair:
//! each logical channel owns exactly one of the two outputs. Writing the
//! pair is read-modify-write — the sibling's output must be read live
//! immediately before every write so it is carried over unchanged.
//!
//! The pair (with its dwell guard) sits behind a mutex shared by both
//! channels: read, guard check, write, and timestamp update form one
//! critical section, so concurrent requests from the two channels cannot
//! tear each other's bits.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{Level, debug, log_enabled, warn};

use crate::app::ports::RelayPort;
use crate::channel::{ChannelState, RelaySwitch};
use crate::safeguard::{GuardedRelay, SwitchOutcome};

/// Which of the pair's outputs a channel owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaySlot {
    Out1,
    Out2,
}

impl RelaySlot {
    fn bit(self, state: (bool, bool)) -> bool {
        match self {
            Self::Out1 => state.0,
            Self::Out2 => state.1,
        }
    }
}

/// A guarded relay pair multiplexed between two channels.
pub type SharedPair<R> = Arc<Mutex<GuardedRelay<R>>>;

/// Wrap a guarded pair for sharing between two [`SharedRelay`] switches.
pub fn share<R: RelayPort>(pair: GuardedRelay<R>) -> SharedPair<R> {
    Arc::new(Mutex::new(pair))
}

/// One channel's half of a shared relay pair.
pub struct SharedRelay<R> {
    pair: SharedPair<R>,
    slot: RelaySlot,
}

impl<R: RelayPort> SharedRelay<R> {
    pub fn new(pair: SharedPair<R>, slot: RelaySlot) -> Self {
        Self { pair, slot }
    }

    fn lock(&self) -> MutexGuard<'_, GuardedRelay<R>> {
        self.pair.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: RelayPort> RelaySwitch for SharedRelay<R> {
    fn seed_state(&mut self) -> ChannelState {
        let mut pair = self.lock();
        match pair.read() {
            // The assigned output alone encodes this channel's state: set
            // means the half-module is bypassed to GND. A shared channel
            // is never seeded Off.
            Ok(state) if self.slot.bit(state) => ChannelState::On,
            Ok(_) => ChannelState::Dimmed,
            Err(e) => {
                warn!("relay state read failed, seeding Off: {e}");
                ChannelState::Off
            }
        }
    }

    fn apply(&mut self, target: ChannelState, now_ms: u64) -> SwitchOutcome {
        let mut pair = self.lock();

        // Read the live state first so the sibling's output survives.
        let live = match pair.read() {
            Ok(state) => state,
            Err(e) => {
                warn!("relay pair read failed, switch aborted: {e}");
                return SwitchOutcome::Failed;
            }
        };

        let own = target == ChannelState::On;
        let (out1, out2) = match self.slot {
            RelaySlot::Out1 => (own, live.1),
            RelaySlot::Out2 => (live.0, own),
        };
        let outcome = pair.try_switch(out1, out2, now_ms);

        if log_enabled!(Level::Debug) {
            if let Ok((o1, o2)) = pair.read() {
                debug!("shared pair now ({o1}, {o2}) after {target:?} via {:?}", self.slot);
            }
        }
        outcome
    }
}
