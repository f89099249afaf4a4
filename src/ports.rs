//! Port traits — the boundary between the animation core and the outside
//! world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LedAnimator (domain)
//! ```
//!
//! The animator consumes these via generics at each `update()` call, so the
//! core never touches hardware directly and runs unchanged under a simulated
//! clock on the host.

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: hardware timer → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds since boot, wrapping at `u32::MAX`.
///
/// Implementations must be monotonic apart from the 32-bit wrap; all
/// elapsed-time comparisons in the core use wrapping subtraction and stay
/// correct across the wrap.
pub trait MonotonicClock {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// LED output port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// One exclusively-owned 8-bit PWM duty channel.
///
/// The channel is configured (carrier frequency, resolution) before the
/// first write; see [`crate::drivers::hw_init`]. Between `update()` calls
/// no other component may write the same channel.
pub trait LedOutput {
    /// Set the duty value: 0 (off) – 255 (full brightness).
    fn write_duty(&mut self, duty: u8);
}

// ───────────────────────────────────────────────────────────────
// Host-side test doubles
// ───────────────────────────────────────────────────────────────

/// Manually-advanced clock for deterministic tests.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct SimClock {
    now: core::cell::Cell<u32>,
}

#[cfg(not(target_os = "espidf"))]
impl SimClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: core::cell::Cell::new(start_ms),
        }
    }

    /// Advance the clock, wrapping at `u32::MAX` like the hardware timer.
    pub fn advance(&self, delta_ms: u32) {
        self.now.set(self.now.get().wrapping_add(delta_ms));
    }
}

#[cfg(not(target_os = "espidf"))]
impl MonotonicClock for SimClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

/// Records every duty write for assertion in tests.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct DutyRecorder {
    pub writes: Vec<u8>,
}

#[cfg(not(target_os = "espidf"))]
impl DutyRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<u8> {
        self.writes.last().copied()
    }
}

#[cfg(not(target_os = "espidf"))]
impl LedOutput for DutyRecorder {
    fn write_duty(&mut self, duty: u8) {
        self.writes.push(duty);
    }
}
