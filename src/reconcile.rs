//! Position-reached reconciliation.
//!
//! A channel commanded into `Dimmed` keeps ramping after the call
//! returns. When the ramp lands on an extreme, the PWM controller's
//! completion event promotes or demotes the channel into the discrete
//! relay states without the caller tracking ramp completion:
//!
//! * position `<= 1`       → request `Off`
//! * position `== steps`   → request `On`
//! * anything in between   → no action
//!
//! Registration is per-channel opt-in; events for unregistered servo
//! channels are ignored. The service routes the resulting transition
//! request through the same guarded entry point as direct calls, so a
//! completion racing a dwell window is dropped like any other switch.

use crate::channel::ChannelState;

/// Index of a channel within the service's channel table.
pub type ChannelId = usize;

struct Entry {
    servo_channel: u8,
    channel: ChannelId,
}

/// Registry mapping PWM controller channels to logical channels.
#[derive(Default)]
pub struct Reconciler {
    entries: Vec<Entry>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opt `channel` into reconciliation for events on `servo_channel`.
    pub fn register(&mut self, servo_channel: u8, channel: ChannelId) {
        self.entries.push(Entry {
            servo_channel,
            channel,
        });
    }

    pub fn is_registered(&self, servo_channel: u8) -> bool {
        self.channel_for(servo_channel).is_some()
    }

    /// The logical channel registered for `servo_channel`, if any.
    pub fn channel_for(&self, servo_channel: u8) -> Option<ChannelId> {
        self.entries
            .iter()
            .find(|e| e.servo_channel == servo_channel)
            .map(|e| e.channel)
    }

    /// The relay state a completed ramp position maps to, if any.
    pub fn target_for(position: i16, pwm_steps: i16) -> Option<ChannelState> {
        if position <= 1 {
            Some(ChannelState::Off)
        } else if position == pwm_steps {
            Some(ChannelState::On)
        } else {
            None
        }
    }
}
