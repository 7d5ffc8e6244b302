//! Outbound application events.
//!
//! The [`LedService`](super::service::LedService) emits these through
//! the [`EventSink`](super::ports::EventSink) port. Adapters on the
//! other side decide what to do with them — log to serial, refresh a
//! GUI status line, etc.

use crate::channel::ChannelState;
use crate::reconcile::ChannelId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries the channel count).
    Started { channels: usize },

    /// A channel's logical state moved.
    StateChanged {
        channel: ChannelId,
        from: ChannelState,
        to: ChannelState,
    },

    /// A relay transition request was refused by the dwell safeguard.
    SwitchDropped {
        channel: ChannelId,
        requested: ChannelState,
    },

    /// A relay transition request failed at the hardware port.
    SwitchFailed {
        channel: ChannelId,
        requested: ChannelState,
    },
}
