//! Dimmable channel core.
//!
//! One channel owns one PWM output and drives it through a three-state
//! machine:
//!
//! ```text
//!             set_brightness(0<v<steps)
//!       ┌──────────────────────────────────┐
//!       │                                  ▼
//!    ┌──────┐  v >= steps   ┌────┐      ┌────────┐
//!    │ Off  │──────────────▶│ On │      │ Dimmed │
//!    └──────┘               └────┘      └────────┘
//!       ▲                      │ any v      │ position-reached
//!       └──────────────────────┘◀───────────┘ 0 / steps
//! ```
//!
//! Relay transitions are requested through a [`RelaySwitch`], which maps
//! a target state onto the channel's relay pair topology and routes the
//! write through the dwell safeguard. A dropped or failed request leaves
//! the logical state unchanged; the PWM target is written regardless, so
//! the position-reached reconciler can retry the transition once the
//! ramp completes.

pub mod exclusive;
pub mod shared;

use log::{debug, info, warn};

use crate::app::ports::{PortError, ServoPort};
use crate::config::SystemConfig;
use crate::safeguard::SwitchOutcome;

// ---------------------------------------------------------------------------
// Channel state
// ---------------------------------------------------------------------------

/// The channel's belief about which power path its relay pair encodes.
///
/// May diverge transiently from the physical relay state when a
/// safeguard drop occurs; the reconciler closes the gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChannelState {
    /// Supply disconnected.
    Off = 0,
    /// Supply routed through the PWM dimmer.
    Dimmed = 1,
    /// Supply bypassed straight to ground — full brightness.
    On = 2,
}

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// Maps a requested logical state onto relay pair outputs.
///
/// The two implementations differ only in topology: an
/// [`exclusive::ExclusiveRelay`] owns its pair outright, a
/// [`shared::SharedRelay`] multiplexes one pair between two channels.
pub trait RelaySwitch {
    /// Read the live relay state and derive the channel's initial
    /// logical state. Port failures are absorbed; the fallback is an
    /// explicit [`ChannelState::Off`].
    fn seed_state(&mut self) -> ChannelState;

    /// Request the relay configuration encoding `target`, guarded by the
    /// pair's dwell safeguard.
    fn apply(&mut self, target: ChannelState, now_ms: u64) -> SwitchOutcome;
}

/// The channel surface consumed by the service layer and the reconciler.
pub trait DimmableChannel {
    /// Display label; not used in any control logic.
    fn name(&self) -> &str;

    /// The PWM controller channel number this channel dims with — the
    /// identity that position-reached events carry.
    fn servo_channel(&self) -> u8;

    /// Current logical state.
    fn state(&self) -> ChannelState;

    /// Change the brightness in `0..=pwm_steps` steps.
    fn set_brightness(&mut self, brightness: i16, now_ms: u64);

    /// Request a relay transition to `target`.
    ///
    /// Returns `None` when the channel already is in `target` (no relay
    /// write, no dwell update); otherwise the safeguard's outcome. The
    /// logical state moves only on [`SwitchOutcome::Applied`].
    fn change_state(&mut self, target: ChannelState, now_ms: u64) -> Option<SwitchOutcome>;

    /// The PWM-commanded position in native steps. Reports `pwm_steps`
    /// while bypassed to `On`; falls back to `0` when the read fails.
    fn duty_cycle(&mut self) -> i16;

    /// Brightness as an 8-bit colour value.
    fn color(&mut self) -> u8;

    /// Change the brightness via an 8-bit colour value.
    fn set_color(&mut self, color: u8, now_ms: u64);
}

// ---------------------------------------------------------------------------
// LedChannel
// ---------------------------------------------------------------------------

/// A channel that owns its relay pair outright.
pub type ExclusiveRelayChannel<S, R> = LedChannel<S, exclusive::ExclusiveRelay<R>>;

/// A channel multiplexing one relay pair with a sibling channel.
pub type SharedRelayChannel<S, R> = LedChannel<S, shared::SharedRelay<R>>;

/// One dimmable stripe: a PWM output plus a relay switch topology.
pub struct LedChannel<S, W> {
    name: String,
    servo: S,
    servo_channel: u8,
    pwm_steps: i16,
    state: ChannelState,
    switch: W,
}

impl<S: ServoPort, W: RelaySwitch> LedChannel<S, W> {
    /// Construct the channel: seed the logical state from the live relay
    /// read, then configure the PWM output. Port failures during setup
    /// are logged and absorbed — the channel still comes up and recovers
    /// once the device is reachable.
    pub fn new(
        name: impl Into<String>,
        servo: S,
        servo_channel: u8,
        mut switch: W,
        config: &SystemConfig,
    ) -> Self {
        let state = switch.seed_state();
        let mut channel = Self {
            name: name.into(),
            servo,
            servo_channel,
            pwm_steps: config.pwm_steps,
            state,
            switch,
        };
        if let Err(e) = channel.configure_servo(config) {
            warn!("{}: servo setup failed: {e}", channel.name);
        }
        channel
    }

    fn configure_servo(&mut self, config: &SystemConfig) -> Result<(), PortError> {
        self.servo.set_period(config.pwm_period_us)?;
        self.servo.set_pulse_width_bounds(1, config.pwm_period_us)?;
        self.servo.set_degree_range(0, config.pwm_steps)?;
        self.servo.set_acceleration(config.pwm_acceleration)?;
        self.servo.set_velocity(config.pwm_velocity)?;
        self.servo.enable()
    }

    /// Transmit a ramp target, clamped to the step range.
    fn set_servo(&mut self, target: i16) {
        let target = target.clamp(0, self.pwm_steps);
        if let Err(e) = self.servo.set_position(target) {
            warn!("{}: position write failed: {e}", self.name);
        }
    }
}

impl<S: ServoPort, W: RelaySwitch> DimmableChannel for LedChannel<S, W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn servo_channel(&self) -> u8 {
        self.servo_channel
    }

    fn state(&self) -> ChannelState {
        self.state
    }

    fn set_brightness(&mut self, brightness: i16, now_ms: u64) {
        debug!("{}.set_brightness({brightness}) in {:?}", self.name, self.state);
        match self.state {
            ChannelState::Off => {
                if brightness == 0 {
                    return;
                }
                if brightness >= self.pwm_steps {
                    self.change_state(ChannelState::On, now_ms);
                    self.set_servo(self.pwm_steps);
                } else {
                    self.change_state(ChannelState::Dimmed, now_ms);
                    self.set_servo(brightness);
                }
            }
            // The PWM extremes do not force a relay transition here; only
            // the position-reached event does.
            ChannelState::Dimmed => self.set_servo(brightness),
            // Once bypassed, any brightness command forces a full
            // power-down before dimming becomes possible again.
            ChannelState::On => {
                self.change_state(ChannelState::Off, now_ms);
                self.set_servo(0);
            }
        }
    }

    fn change_state(&mut self, target: ChannelState, now_ms: u64) -> Option<SwitchOutcome> {
        if target == self.state {
            return None;
        }
        let outcome = self.switch.apply(target, now_ms);
        match outcome {
            SwitchOutcome::Applied => {
                info!("{}: {:?} -> {:?}", self.name, self.state, target);
                self.state = target;
            }
            SwitchOutcome::Dropped => {
                debug!("{}: switch to {:?} dropped", self.name, target);
            }
            SwitchOutcome::Failed => {
                warn!("{}: switch to {:?} failed", self.name, target);
            }
        }
        Some(outcome)
    }

    fn duty_cycle(&mut self) -> i16 {
        if self.state == ChannelState::On {
            return self.pwm_steps;
        }
        match self.servo.get_position() {
            Ok(position) => position,
            Err(e) => {
                warn!("{}: position read failed, reporting 0: {e}", self.name);
                0
            }
        }
    }

    fn color(&mut self) -> u8 {
        if self.state == ChannelState::On {
            return 255;
        }
        let duty = self.duty_cycle();
        ((255.0 * f64::from(duty)) / f64::from(self.pwm_steps)).round() as u8
    }

    fn set_color(&mut self, color: u8, now_ms: u64) {
        let brightness =
            ((f64::from(color) * f64::from(self.pwm_steps)) / 255.0).round() as i16;
        self.set_brightness(brightness, now_ms);
    }
}
