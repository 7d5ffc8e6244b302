//! Shared in-memory hardware doubles for unit tests.
//!
//! Both mocks hand out cloneable handles (`Arc<Mutex<_>>` inside) so a
//! test can keep inspecting state after moving the mock into a channel.

use std::sync::{Arc, Mutex, PoisonError};

use crate::app::ports::{PortError, RelayPort, ServoPort};

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── MockServo ─────────────────────────────────────────────────

#[derive(Default)]
struct ServoInner {
    period_us: u32,
    pulse_bounds: (u32, u32),
    degree_range: (i16, i16),
    acceleration: u16,
    velocity: u16,
    enabled: bool,
    position: i16,
    targets: Vec<i16>,
    fail_reads: bool,
    fail_writes: bool,
}

/// Recording servo port double.
#[derive(Clone, Default)]
pub(crate) struct MockServo {
    inner: Arc<Mutex<ServoInner>>,
}

impl MockServo {
    /// History of commanded ramp targets.
    pub(crate) fn targets(&self) -> Vec<i16> {
        lock(&self.inner).targets.clone()
    }

    pub(crate) fn last_target(&self) -> Option<i16> {
        lock(&self.inner).targets.last().copied()
    }

    /// Simulate the ramp having reached `position` (read-back value).
    pub(crate) fn set_feedback(&self, position: i16) {
        lock(&self.inner).position = position;
    }

    pub(crate) fn enabled(&self) -> bool {
        lock(&self.inner).enabled
    }

    pub(crate) fn configured(&self) -> (u32, (u32, u32), (i16, i16), u16, u16) {
        let s = lock(&self.inner);
        (
            s.period_us,
            s.pulse_bounds,
            s.degree_range,
            s.acceleration,
            s.velocity,
        )
    }

    pub(crate) fn set_fail_reads(&self, fail: bool) {
        lock(&self.inner).fail_reads = fail;
    }

    pub(crate) fn set_fail_writes(&self, fail: bool) {
        lock(&self.inner).fail_writes = fail;
    }
}

impl ServoPort for MockServo {
    fn set_period(&mut self, period_us: u32) -> Result<(), PortError> {
        let mut s = lock(&self.inner);
        if s.fail_writes {
            return Err(PortError::Timeout);
        }
        s.period_us = period_us;
        Ok(())
    }

    fn set_pulse_width_bounds(&mut self, min_us: u32, max_us: u32) -> Result<(), PortError> {
        lock(&self.inner).pulse_bounds = (min_us, max_us);
        Ok(())
    }

    fn set_degree_range(&mut self, min: i16, max: i16) -> Result<(), PortError> {
        lock(&self.inner).degree_range = (min, max);
        Ok(())
    }

    fn set_acceleration(&mut self, accel: u16) -> Result<(), PortError> {
        lock(&self.inner).acceleration = accel;
        Ok(())
    }

    fn set_velocity(&mut self, velocity: u16) -> Result<(), PortError> {
        lock(&self.inner).velocity = velocity;
        Ok(())
    }

    fn enable(&mut self) -> Result<(), PortError> {
        lock(&self.inner).enabled = true;
        Ok(())
    }

    fn set_position(&mut self, target: i16) -> Result<(), PortError> {
        let mut s = lock(&self.inner);
        if s.fail_writes {
            return Err(PortError::Timeout);
        }
        s.targets.push(target);
        s.position = target;
        Ok(())
    }

    fn get_position(&mut self) -> Result<i16, PortError> {
        let s = lock(&self.inner);
        if s.fail_reads {
            return Err(PortError::NotConnected);
        }
        Ok(s.position)
    }
}

// ── MockRelay ─────────────────────────────────────────────────

#[derive(Default)]
struct RelayInner {
    state: (bool, bool),
    writes: Vec<(bool, bool)>,
    reads: usize,
    fail_reads: bool,
    fail_writes: bool,
}

/// Recording dual-relay double.
#[derive(Clone, Default)]
pub(crate) struct MockRelay {
    inner: Arc<Mutex<RelayInner>>,
}

impl MockRelay {
    pub(crate) fn with_state(out1: bool, out2: bool) -> Self {
        let relay = Self::default();
        lock(&relay.inner).state = (out1, out2);
        relay
    }

    pub(crate) fn state(&self) -> (bool, bool) {
        lock(&self.inner).state
    }

    pub(crate) fn writes(&self) -> Vec<(bool, bool)> {
        lock(&self.inner).writes.clone()
    }

    pub(crate) fn write_count(&self) -> usize {
        lock(&self.inner).writes.len()
    }

    pub(crate) fn read_count(&self) -> usize {
        lock(&self.inner).reads
    }

    pub(crate) fn set_fail_reads(&self, fail: bool) {
        lock(&self.inner).fail_reads = fail;
    }

    pub(crate) fn set_fail_writes(&self, fail: bool) {
        lock(&self.inner).fail_writes = fail;
    }
}

impl RelayPort for MockRelay {
    fn get_state(&mut self) -> Result<(bool, bool), PortError> {
        let mut r = lock(&self.inner);
        r.reads += 1;
        if r.fail_reads {
            return Err(PortError::Timeout);
        }
        Ok(r.state)
    }

    fn set_state(&mut self, out1: bool, out2: bool) -> Result<(), PortError> {
        let mut r = lock(&self.inner);
        if r.fail_writes {
            return Err(PortError::NotConnected);
        }
        r.state = (out1, out2);
        r.writes.push((out1, out2));
        Ok(())
    }
}
