//! Channel service — the hexagonal core.
//!
//! [`LedService`] is the single serialized owner of every channel. GUI
//! calls, wall-switch commands, and position-reached events all funnel
//! through it on one execution context, so relay requests on a pair are
//! strictly ordered and `logical_state` is never mutated from a callback
//! context.
//!
//! ```text
//!  ChannelCommand ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!                     │        LedService        │
//!  EventQueue ───────▶│  channels · reconciler   │──▶ ServoPort / RelayPort
//!                     └─────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::{Result, bail};
use log::{info, warn};

use crate::adapters::time::MonotonicClock;
use crate::channel::{ChannelState, DimmableChannel};
use crate::config::SystemConfig;
use crate::events::{EventQueue, PositionEvent};
use crate::reconcile::{ChannelId, Reconciler};
use crate::safeguard::SwitchOutcome;

use super::commands::ChannelCommand;
use super::events::AppEvent;
use super::ports::EventSink;

/// The application service orchestrating all channels.
pub struct LedService {
    channels: Vec<Box<dyn DimmableChannel>>,
    reconciler: Reconciler,
    queue: Arc<EventQueue>,
    clock: MonotonicClock,
    pwm_steps: i16,
}

impl LedService {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            channels: Vec::new(),
            reconciler: Reconciler::new(),
            queue: Arc::new(EventQueue::new()),
            clock: MonotonicClock::new(),
            pwm_steps: config.pwm_steps,
        }
    }

    // ── Wiring ────────────────────────────────────────────────

    /// Register a channel. `reconcile` opts it into position-reached
    /// reconciliation; channels on a different dimming topology leave it
    /// off and keep their relay handling fully command-driven.
    pub fn add_channel(
        &mut self,
        channel: Box<dyn DimmableChannel>,
        reconcile: bool,
    ) -> Result<ChannelId> {
        let id = self.channels.len();
        if reconcile {
            let servo_channel = channel.servo_channel();
            if self.reconciler.is_registered(servo_channel) {
                bail!("servo channel {servo_channel} already registered for reconciliation");
            }
            self.reconciler.register(servo_channel, id);
        }
        self.channels.push(channel);
        Ok(id)
    }

    /// Handle for the hardware-binding layer: its position-reached
    /// callback pushes completions here.
    pub fn event_queue(&self) -> Arc<EventQueue> {
        Arc::clone(&self.queue)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Announce readiness. Channels seed their state at construction, so
    /// there is nothing else to kick off.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        info!("LedService started with {} channels", self.channels.len());
        sink.emit(&AppEvent::Started {
            channels: self.channels.len(),
        });
    }

    // ── GUI-facing surface ────────────────────────────────────

    pub fn set_brightness(&mut self, channel: ChannelId, brightness: i16) {
        let now_ms = self.clock.uptime_ms();
        match self.channels.get_mut(channel) {
            Some(ch) => ch.set_brightness(brightness, now_ms),
            None => warn!("set_brightness on unknown channel {channel}"),
        }
    }

    pub fn set_color(&mut self, channel: ChannelId, color: u8) {
        let now_ms = self.clock.uptime_ms();
        match self.channels.get_mut(channel) {
            Some(ch) => ch.set_color(color, now_ms),
            None => warn!("set_color on unknown channel {channel}"),
        }
    }

    pub fn duty_cycle(&mut self, channel: ChannelId) -> Option<i16> {
        self.channels.get_mut(channel).map(|ch| ch.duty_cycle())
    }

    pub fn color(&mut self, channel: ChannelId) -> Option<u8> {
        self.channels.get_mut(channel).map(|ch| ch.color())
    }

    pub fn state(&self, channel: ChannelId) -> Option<ChannelState> {
        self.channels.get(channel).map(|ch| ch.state())
    }

    pub fn name(&self, channel: ChannelId) -> Option<&str> {
        self.channels.get(channel).map(|ch| ch.name())
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (GUI, wall switch, serial).
    pub fn handle_command(&mut self, command: &ChannelCommand, sink: &mut impl EventSink) {
        match *command {
            ChannelCommand::SetBrightness {
                channel,
                brightness,
            } => {
                let before = self.state(channel);
                self.set_brightness(channel, brightness);
                self.emit_if_moved(channel, before, sink);
            }
            ChannelCommand::SetColor { channel, color } => {
                let before = self.state(channel);
                self.set_color(channel, color);
                self.emit_if_moved(channel, before, sink);
            }
            ChannelCommand::ChangeState { channel, target } => {
                self.request_transition(channel, target, sink);
            }
        }
    }

    // ── Position-reached reconciliation ───────────────────────

    /// Drain the completion queue through the same serialized entry
    /// point as direct calls. Run this from the main loop whenever the
    /// transport signals activity (or periodically).
    pub fn process_events(&mut self, sink: &mut impl EventSink) {
        let queue = Arc::clone(&self.queue);
        while let Some(event) = queue.pop() {
            self.reconcile_event(event, sink);
        }
    }

    fn reconcile_event(&mut self, event: PositionEvent, sink: &mut impl EventSink) {
        // Channels that never opted in are deliberately ignored.
        let Some(channel) = self.reconciler.channel_for(event.servo_channel) else {
            return;
        };
        let Some(target) = Reconciler::target_for(event.position, self.pwm_steps) else {
            return;
        };
        self.request_transition(channel, target, sink);
    }

    // ── Internal ──────────────────────────────────────────────

    fn request_transition(
        &mut self,
        channel: ChannelId,
        target: ChannelState,
        sink: &mut impl EventSink,
    ) {
        let now_ms = self.clock.uptime_ms();
        let Some(ch) = self.channels.get_mut(channel) else {
            warn!("transition request for unknown channel {channel}");
            return;
        };
        let from = ch.state();
        match ch.change_state(target, now_ms) {
            Some(SwitchOutcome::Applied) => sink.emit(&AppEvent::StateChanged {
                channel,
                from,
                to: target,
            }),
            Some(SwitchOutcome::Dropped) => sink.emit(&AppEvent::SwitchDropped {
                channel,
                requested: target,
            }),
            Some(SwitchOutcome::Failed) => sink.emit(&AppEvent::SwitchFailed {
                channel,
                requested: target,
            }),
            None => {}
        }
    }

    fn emit_if_moved(
        &self,
        channel: ChannelId,
        before: Option<ChannelState>,
        sink: &mut impl EventSink,
    ) {
        let after = self.state(channel);
        if let (Some(from), Some(to)) = (before, after) {
            if from != to {
                sink.emit(&AppEvent::StateChanged { channel, from, to });
            }
        }
    }
}
