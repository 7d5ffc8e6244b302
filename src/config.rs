//! System configuration parameters
//!
//! All tunable parameters for the stripe controller. Values are fixed
//! constants supplied at construction time; nothing here is persisted.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- PWM ---
    /// Number of discrete steps the dimmer range is divided into
    pub pwm_steps: i16,
    /// Base period of the PWM signal in microseconds
    pub pwm_period_us: u32,
    /// Maximum ramp velocity in steps/s — determines the time needed to
    /// fully dim a stripe
    pub pwm_velocity: u16,
    /// Ramp acceleration (0xFFFF = effectively instantaneous)
    pub pwm_acceleration: u16,

    // --- Relay ---
    /// Minimum dwell time between two switch operations on one relay
    /// pair (milliseconds)
    pub relay_safeguard_ms: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // PWM
            pwm_steps: 100,
            pwm_period_us: 1000, // 1 kHz
            pwm_velocity: 20,    // full sweep in 5 s
            pwm_acceleration: 0xFFFF,

            // Relay
            relay_safeguard_ms: 1000,
        }
    }
}
