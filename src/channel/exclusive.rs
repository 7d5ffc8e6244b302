//! Exclusive relay topology.
//!
//! The channel owns its dual-relay module outright, so a requested state
//! maps onto both outputs at once. Bit mapping for this deployment:
//!
//! | state  | out1 (bypass) | out2 (dimmer) |
//! |--------|---------------|---------------|
//! | On     | true          | true          |
//! | Dimmed | false         | true          |
//! | Off    | false         | false         |

use log::warn;

use crate::app::ports::RelayPort;
use crate::channel::{ChannelState, RelaySwitch};
use crate::safeguard::{GuardedRelay, SwitchOutcome};

/// A relay pair owned by exactly one channel.
pub struct ExclusiveRelay<R> {
    pair: GuardedRelay<R>,
}

impl<R: RelayPort> ExclusiveRelay<R> {
    pub fn new(pair: GuardedRelay<R>) -> Self {
        Self { pair }
    }

    /// Access the guarded pair (diagnostics, tests).
    pub fn pair(&self) -> &GuardedRelay<R> {
        &self.pair
    }
}

impl<R: RelayPort> RelaySwitch for ExclusiveRelay<R> {
    fn seed_state(&mut self) -> ChannelState {
        match self.pair.read() {
            // out1 closed: bypass to GND.
            Ok((true, _)) => ChannelState::On,
            // out2 closed: routed through the dimmer.
            Ok((false, true)) => ChannelState::Dimmed,
            Ok((false, false)) => ChannelState::Off,
            Err(e) => {
                warn!("relay state read failed, seeding Off: {e}");
                ChannelState::Off
            }
        }
    }

    fn apply(&mut self, target: ChannelState, now_ms: u64) -> SwitchOutcome {
        let (out1, out2) = match target {
            ChannelState::On => (true, true),
            ChannelState::Dimmed => (false, true),
            ChannelState::Off => (false, false),
        };
        self.pair.try_switch(out1, out2, now_ms)
    }
}
