//! Inbound commands to the channel service.
//!
//! These represent actions requested by the outside world (GUI sliders,
//! colour picker, a physical wall switch input) that the
//! [`LedService`](super::service::LedService) interprets and acts upon.

use crate::channel::ChannelState;
use crate::reconcile::ChannelId;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy)]
pub enum ChannelCommand {
    /// Set a channel's brightness in duty-cycle steps.
    SetBrightness {
        channel: ChannelId,
        brightness: i16,
    },

    /// Set a channel's brightness as an 8-bit colour value.
    SetColor { channel: ChannelId, color: u8 },

    /// Request a relay transition directly (wall-switch input).
    ChangeState {
        channel: ChannelId,
        target: ChannelState,
    },
}
