//! Position-reached event queue.
//!
//! The PWM controller reports ramp completion asynchronously, on the
//! transport's callback context. Events cross over to the service's
//! execution context through this bounded queue:
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ transport        │────▶│  EventQueue  │────▶│  LedService  │
//! │ callback thread  │     │  (bounded)   │     │  (consumer)  │
//! └──────────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! The queue never blocks the producer: when full, the newest event is
//! dropped. That is safe here because reconciliation is level-based —
//! the next completed ramp produces a fresh event with the same
//! information.

use std::sync::{Mutex, PoisonError};

use heapless::Deque;
use log::warn;

/// Maximum number of pending events.
pub const EVENT_QUEUE_CAP: usize = 32;

/// A PWM ramp completed moving to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionEvent {
    /// PWM controller channel number the event belongs to.
    pub servo_channel: u8,
    /// Final ramp position in duty-cycle steps.
    pub position: i16,
}

/// Bounded, thread-safe queue of [`PositionEvent`]s.
pub struct EventQueue {
    inner: Mutex<Deque<PositionEvent, EVENT_QUEUE_CAP>>,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Deque::new()),
        }
    }

    fn queue(&self) -> std::sync::MutexGuard<'_, Deque<PositionEvent, EVENT_QUEUE_CAP>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push an event. Safe to call from the transport callback context.
    /// Returns `false` if the queue was full (event dropped).
    pub fn push(&self, event: PositionEvent) -> bool {
        if self.queue().push_back(event).is_err() {
            warn!("position event queue full, dropping {event:?}");
            return false;
        }
        true
    }

    /// Pop the oldest pending event.
    pub fn pop(&self) -> Option<PositionEvent> {
        self.queue().pop_front()
    }

    /// Drain all pending events into a callback, in FIFO order.
    pub fn drain(&self, mut handler: impl FnMut(PositionEvent)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.queue().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
