//! Port traits — the hexagonal boundary between the channel core and the outside world.
//!
//! ```text
//!   Hardware binding ──▶ Port trait ──▶ LedService (domain)
//! ```
//!
//! The hardware-binding layer (out of scope for this crate) implements
//! [`ServoPort`] and [`RelayPort`] against the real bus. The domain core
//! consumes them via generics, so the channel state machine never touches
//! a transport directly.
//!
//! Port calls may block on I/O with a bounded timeout; both error
//! variants are recoverable conditions that the channel layer logs and
//! absorbs (see [`crate::channel`]).

// ───────────────────────────────────────────────────────────────
// Servo port (domain → PWM hardware)
// ───────────────────────────────────────────────────────────────

/// One PWM output on the servo controller.
///
/// An implementation is bound to a single physical channel; the degree
/// range is configured so that a commanded position equals a duty-cycle
/// step in `0..=pwm_steps`.
pub trait ServoPort {
    /// Set the base PWM period in microseconds.
    fn set_period(&mut self, period_us: u32) -> Result<(), PortError>;

    /// Set the minimum and maximum pulse width in microseconds.
    fn set_pulse_width_bounds(&mut self, min_us: u32, max_us: u32) -> Result<(), PortError>;

    /// Set the logical position range mapped onto the pulse-width bounds.
    fn set_degree_range(&mut self, min: i16, max: i16) -> Result<(), PortError>;

    /// Set the ramp acceleration (`0xFFFF` = effectively instantaneous).
    fn set_acceleration(&mut self, accel: u16) -> Result<(), PortError>;

    /// Set the ramp velocity in steps per second.
    fn set_velocity(&mut self, velocity: u16) -> Result<(), PortError>;

    /// Enable the PWM output.
    fn enable(&mut self) -> Result<(), PortError>;

    /// Command the ramp target position.
    fn set_position(&mut self, target: i16) -> Result<(), PortError>;

    /// Read back the current ramp position.
    fn get_position(&mut self) -> Result<i16, PortError>;
}

// ───────────────────────────────────────────────────────────────
// Relay port (domain → relay hardware)
// ───────────────────────────────────────────────────────────────

/// A dual-relay module: two independent boolean outputs.
///
/// Outputs are read-modify-write at the hardware level — `set_state`
/// always writes both, so callers that own only one output must read the
/// live state first to preserve the other (see
/// [`SharedRelay`](crate::channel::shared::SharedRelay)).
pub trait RelayPort {
    /// Read both outputs.
    fn get_state(&mut self) -> Result<(bool, bool), PortError>;

    /// Write both outputs.
    fn set_state(&mut self, out1: bool, out2: bool) -> Result<(), PortError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, GUI
/// status line, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors a hardware port can return.
///
/// Both variants are treated identically by the channel layer: logged
/// and absorbed, never propagated as a fatal error. The control surface
/// stays responsive even when one device is unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortError {
    /// The device did not respond within the transport's deadline.
    Timeout,
    /// The transport to the device stack is severed.
    NotConnected,
}

impl core::fmt::Display for PortError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timeout => write!(f, "device timed out"),
            Self::NotConnected => write!(f, "transport not connected"),
        }
    }
}

impl std::error::Error for PortError {}
