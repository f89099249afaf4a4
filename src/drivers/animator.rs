//! Status-LED animation engine.
//!
//! Maps the device's operating mode onto a continuously-evolving PWM
//! brightness pattern. The main loop calls [`LedAnimator::update`] on every
//! iteration; the engine reads the monotonic clock, advances at most one
//! pattern step, and writes at most one duty value. It never sleeps — every
//! pause in a pattern is a stored resume-not-before timestamp checked at the
//! top of the next call, so the surrounding cooperative loop (audio capture,
//! networking, button handling) is never stalled.
//!
//! ## Patterns
//!
//! | State          | Cadence | Shape                                        |
//! |----------------|---------|----------------------------------------------|
//! | Idle           | 20 ms   | ±1 breathe 0–80, 300 ms hold at the bottom   |
//! | Recording      | 8 ms    | ±10 pulse 50–255                             |
//! | Processing     | 30 ms   | sine sweep, full range                       |
//! | Uploading      | 100 ms  | 0/255 square wave                            |
//! | Success        | 150 ms  | 3 full flashes, then hands back to Idle      |
//! | Error          | 50 ms   | 0/255 square wave until cleared externally   |
//! | Connecting     | 200 ms  | double blink, 600 ms gap between bursts      |
//! | Listening      | 40 ms   | slow sine wave, 20–180                       |
//! | BrutalFeedback | 100 ms  | 500 ms dark lead-in, 6 sharp flashes, then   |
//! |                |         | hands back to Listening                      |
//! | LowBattery     | 1000 ms | dim 0/100 blink                              |
//!
//! Success and BrutalFeedback are self-terminating: they command their own
//! transition as part of `update()`, so the surrounding firmware never needs
//! a timer to clear a "just succeeded" indicator.

use log::debug;

use crate::ports::{LedOutput, MonotonicClock};

// ── Cadences (minimum gap between visible steps, ms) ──────────

const IDLE_CADENCE_MS: u32 = 20;
const RECORDING_CADENCE_MS: u32 = 8;
const PROCESSING_CADENCE_MS: u32 = 30;
const UPLOADING_CADENCE_MS: u32 = 100;
const SUCCESS_CADENCE_MS: u32 = 150;
const ERROR_CADENCE_MS: u32 = 50;
const CONNECTING_CADENCE_MS: u32 = 200;
const LISTENING_CADENCE_MS: u32 = 40;
const BRUTAL_CADENCE_MS: u32 = 100;
const LOW_BATTERY_CADENCE_MS: u32 = 1000;

// ── Pattern envelope bounds and pauses ────────────────────────

const IDLE_CEILING: i16 = 80;
const IDLE_BOTTOM_HOLD_MS: u32 = 300;
const RECORDING_FLOOR: i16 = 50;
const CONNECTING_BURST_GAP_MS: u32 = 600;
const BRUTAL_LEAD_IN_MS: u32 = 500;
const LOW_BATTERY_DUTY: i16 = 100;

/// Number of on/off half-flashes in the self-terminating patterns.
const FLASH_TICKS: u32 = 6;

/// Device operating modes with a distinct LED pattern.
///
/// Closed set — the engine is structurally incapable of holding an invalid
/// state, which is why `update()` has no error path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    Recording,
    Processing,
    Uploading,
    Success,
    Error,
    Connecting,
    Listening,
    BrutalFeedback,
    LowBattery,
}

/// The animation engine. Stack-allocated, no heap, single-threaded.
///
/// Created once at boot and mutated exclusively through [`set_state`]
/// (externally driven transitions) and [`update`] (pattern progress plus
/// the self-terminating transitions).
///
/// [`set_state`]: LedAnimator::set_state
/// [`update`]: LedAnimator::update
pub struct LedAnimator {
    current: AnimationState,
    /// Timestamp of the last duty write for the current pattern's cadence.
    last_update_ms: u32,
    /// Pattern-specific progress counter: flash count, burst phase, or wave
    /// sample index. Reset to 0 on every transition.
    step: u32,
    /// Working brightness. Kept as i16 so ramp arithmetic can overshoot the
    /// band before clamping; always clamped to the pattern band (and thus to
    /// 0–255) before it reaches the PWM channel.
    brightness: i16,
    /// Ramp direction for the oscillating patterns (true = ascending).
    direction: bool,
    /// Deferred-start marker: no pattern step happens before this time.
    /// Cleared on every transition, like `step`.
    resume_at_ms: Option<u32>,
}

impl LedAnimator {
    pub fn new() -> Self {
        Self {
            current: AnimationState::Idle,
            last_update_ms: 0,
            step: 0,
            brightness: 0,
            direction: true,
            resume_at_ms: None,
        }
    }

    /// The active pattern.
    pub fn state(&self) -> AnimationState {
        self.current
    }

    /// Progress counter of the active pattern (exposed for tests and the
    /// diagnostics dump; meaning is pattern-specific).
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Switch to a new pattern.
    ///
    /// Idempotent: a redundant call with the current state is a no-op, so an
    /// in-progress animation is never restarted by repeated mode
    /// notifications. Brightness, direction, and the cadence timestamp are
    /// deliberately left alone — each pattern re-derives them on its first
    /// qualifying tick.
    pub fn set_state(&mut self, new_state: AnimationState) {
        if self.current == new_state {
            return;
        }
        debug!("led animation: {:?} -> {:?}", self.current, new_state);
        self.current = new_state;
        self.step = 0;
        self.resume_at_ms = None;
    }

    /// Advance the active pattern by at most one step.
    ///
    /// Call from the cooperative loop on every iteration, at least as often
    /// as the fastest cadence (8 ms). Returns without side effects when the
    /// pattern is not yet due; never blocks.
    pub fn update(&mut self, clock: &impl MonotonicClock, led: &mut impl LedOutput) {
        let now = clock.now_ms();
        match self.current {
            AnimationState::Idle => self.breathe(now, led),
            AnimationState::Recording => self.recording_pulse(now, led),
            AnimationState::Processing => self.processing_wave(now, led),
            AnimationState::Uploading => {
                self.square_wave(now, UPLOADING_CADENCE_MS, 255, led);
            }
            AnimationState::Success => self.success_flash(now, led),
            AnimationState::Error => {
                self.square_wave(now, ERROR_CADENCE_MS, 255, led);
            }
            AnimationState::Connecting => self.connecting_burst(now, led),
            AnimationState::Listening => self.listening_wave(now, led),
            AnimationState::BrutalFeedback => self.brutal_feedback(now, led),
            AnimationState::LowBattery => {
                self.square_wave(now, LOW_BATTERY_CADENCE_MS, LOW_BATTERY_DUTY, led);
            }
        }
    }

    // ── Shared step bookkeeping ───────────────────────────────

    /// True while a deferred-start marker is still in the future.
    /// Clears the marker once the resume time is reached.
    fn pause_active(&mut self, now: u32) -> bool {
        match self.resume_at_ms {
            Some(resume_at) => {
                if time_reached(now, resume_at) {
                    self.resume_at_ms = None;
                    false
                } else {
                    true
                }
            }
            None => false,
        }
    }

    /// Cadence gate: wraparound-safe check that `cadence_ms` has elapsed
    /// since the last visible step. Stamps `last_update_ms` when due.
    fn due(&mut self, now: u32, cadence_ms: u32) -> bool {
        if now.wrapping_sub(self.last_update_ms) >= cadence_ms {
            self.last_update_ms = now;
            true
        } else {
            false
        }
    }

    /// Clamp the working brightness into the pattern band and write it out.
    fn emit(&mut self, led: &mut impl LedOutput, floor: i16, ceiling: i16) {
        self.brightness = self.brightness.clamp(floor, ceiling);
        led.write_duty(self.brightness as u8);
    }

    // ── Idle: gentle breathing ────────────────────────────────

    fn breathe(&mut self, now: u32, led: &mut impl LedOutput) {
        if self.pause_active(now) || !self.due(now, IDLE_CADENCE_MS) {
            return;
        }
        if self.direction {
            self.brightness += 1;
            if self.brightness >= IDLE_CEILING {
                self.direction = false;
            }
        } else {
            self.brightness -= 1;
            if self.brightness <= 0 {
                self.direction = true;
                // Hold dark at the bottom of the breath without blocking.
                self.resume_at_ms = Some(now.wrapping_add(IDLE_BOTTOM_HOLD_MS));
            }
        }
        self.emit(led, 0, IDLE_CEILING);
    }

    // ── Recording: fast urgent pulse ──────────────────────────

    fn recording_pulse(&mut self, now: u32, led: &mut impl LedOutput) {
        if !self.due(now, RECORDING_CADENCE_MS) {
            return;
        }
        if self.direction {
            self.brightness += 10;
            if self.brightness >= 255 {
                self.direction = false;
            }
        } else {
            self.brightness -= 10;
            if self.brightness <= RECORDING_FLOOR {
                self.direction = true;
            }
        }
        // Entering from a dimmer pattern lands on the band floor first.
        self.emit(led, RECORDING_FLOOR, 255);
    }

    // ── Processing / Listening: sinusoidal sweeps ─────────────

    fn processing_wave(&mut self, now: u32, led: &mut impl LedOutput) {
        if !self.due(now, PROCESSING_CADENCE_MS) {
            return;
        }
        self.step = self.step.wrapping_add(1);
        let phase = self.step as f32 * 0.1;
        self.brightness = ((phase.sin() + 1.0) * 127.0) as i16;
        self.emit(led, 0, 255);
    }

    fn listening_wave(&mut self, now: u32, led: &mut impl LedOutput) {
        if !self.due(now, LISTENING_CADENCE_MS) {
            return;
        }
        self.step = self.step.wrapping_add(1);
        let phase = self.step as f32 * 0.05;
        self.brightness = ((phase.sin() + 1.0) * 80.0 + 20.0) as i16;
        self.emit(led, 0, 255);
    }

    // ── Uploading / Error / LowBattery: square waves ──────────

    fn square_wave(&mut self, now: u32, cadence_ms: u32, on_duty: i16, led: &mut impl LedOutput) {
        if !self.due(now, cadence_ms) {
            return;
        }
        self.brightness = if self.brightness == 0 { on_duty } else { 0 };
        self.emit(led, 0, 255);
    }

    // ── Success: three flashes, then back to Idle ─────────────

    fn success_flash(&mut self, now: u32, led: &mut impl LedOutput) {
        if self.step >= FLASH_TICKS {
            self.set_state(AnimationState::Idle);
            return;
        }
        if !self.due(now, SUCCESS_CADENCE_MS) {
            return;
        }
        self.brightness = if self.step % 2 == 1 { 255 } else { 0 };
        self.step += 1;
        self.emit(led, 0, 255);
    }

    // ── Connecting: double blink with a gap between bursts ────

    fn connecting_burst(&mut self, now: u32, led: &mut impl LedOutput) {
        if self.pause_active(now) || !self.due(now, CONNECTING_CADENCE_MS) {
            return;
        }
        match self.step {
            0 | 2 => self.brightness = 255,
            1 | 3 => self.brightness = 0,
            _ => {
                // End of burst: stay dark, rewind the phase, and defer the
                // next burst instead of sleeping through the gap.
                self.brightness = 0;
                self.step = 0;
                self.resume_at_ms = Some(now.wrapping_add(CONNECTING_BURST_GAP_MS));
                self.emit(led, 0, 255);
                return;
            }
        }
        self.step += 1;
        self.emit(led, 0, 255);
    }

    // ── BrutalFeedback: dramatic lead-in, sharp flashes ───────

    fn brutal_feedback(&mut self, now: u32, led: &mut impl LedOutput) {
        if self.step == 0 {
            // Dark lead-in before the verdict, encoded as a deferred start.
            self.brightness = 0;
            self.emit(led, 0, 255);
            self.resume_at_ms = Some(now.wrapping_add(BRUTAL_LEAD_IN_MS));
            self.last_update_ms = now;
            self.step = 1;
            return;
        }
        if self.step > FLASH_TICKS {
            self.set_state(AnimationState::Listening);
            return;
        }
        if self.pause_active(now) || !self.due(now, BRUTAL_CADENCE_MS) {
            return;
        }
        self.brightness = if self.step % 2 == 1 { 255 } else { 0 };
        self.step += 1;
        self.emit(led, 0, 255);
    }
}

impl Default for LedAnimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraparound-safe "has `deadline` passed" check: true when `now` is within
/// half the u32 range at or after `deadline`.
fn time_reached(now: u32, deadline: u32) -> bool {
    now.wrapping_sub(deadline) < u32::MAX / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{DutyRecorder, SimClock};

    /// Drive `updates` loop iterations, advancing the clock `step_ms` each
    /// time, and collect every duty write.
    fn run(
        anim: &mut LedAnimator,
        clock: &SimClock,
        led: &mut DutyRecorder,
        updates: usize,
        step_ms: u32,
    ) {
        for _ in 0..updates {
            clock.advance(step_ms);
            anim.update(clock, led);
        }
    }

    #[test]
    fn starts_idle_with_zeroed_counters() {
        let anim = LedAnimator::new();
        assert_eq!(anim.state(), AnimationState::Idle);
        assert_eq!(anim.step(), 0);
    }

    #[test]
    fn all_states_make_progress_under_fast_polling() {
        let states = [
            AnimationState::Idle,
            AnimationState::Recording,
            AnimationState::Processing,
            AnimationState::Uploading,
            AnimationState::Success,
            AnimationState::Error,
            AnimationState::Connecting,
            AnimationState::Listening,
            AnimationState::BrutalFeedback,
            AnimationState::LowBattery,
        ];
        for state in states {
            let clock = SimClock::new(0);
            let mut led = DutyRecorder::new();
            let mut anim = LedAnimator::new();
            anim.set_state(state);
            run(&mut anim, &clock, &mut led, 2000, 7);
            assert!(
                !led.writes.is_empty(),
                "{state:?} produced no writes in 14 s"
            );
        }
    }

    #[test]
    fn set_state_is_idempotent_mid_pattern() {
        let clock = SimClock::new(0);
        let mut led = DutyRecorder::new();
        let mut anim = LedAnimator::new();
        anim.set_state(AnimationState::Processing);
        run(&mut anim, &clock, &mut led, 10, 30);
        let mid_step = anim.step();
        assert!(mid_step > 0);

        // Redundant call: step must survive.
        anim.set_state(AnimationState::Processing);
        assert_eq!(anim.step(), mid_step);

        // Real transition: step resets.
        anim.set_state(AnimationState::Listening);
        assert_eq!(anim.step(), 0);
    }

    #[test]
    fn idle_breathes_between_0_and_80_with_bottom_hold() {
        let clock = SimClock::new(0);
        let mut led = DutyRecorder::new();
        let mut anim = LedAnimator::new();

        // Ascend: strictly +1 per 20 ms tick up to the ceiling.
        run(&mut anim, &clock, &mut led, 80, 20);
        assert_eq!(led.writes, (1..=80).collect::<Vec<u8>>());

        // Descend back to 0.
        run(&mut anim, &clock, &mut led, 80, 20);
        assert_eq!(led.last(), Some(0));
        let descent = &led.writes[80..];
        assert_eq!(descent, (0..80).rev().collect::<Vec<u8>>().as_slice());

        // Bottom hold: nothing for the next 280 ms...
        let writes_before = led.writes.len();
        run(&mut anim, &clock, &mut led, 14, 20);
        assert_eq!(led.writes.len(), writes_before, "hold must stay dark");

        // ...and the ramp restarts once 300 ms have passed.
        run(&mut anim, &clock, &mut led, 1, 20);
        assert_eq!(led.last(), Some(1));
    }

    #[test]
    fn recording_ramps_within_band() {
        let clock = SimClock::new(0);
        let mut led = DutyRecorder::new();
        let mut anim = LedAnimator::new();
        anim.set_state(AnimationState::Recording);
        run(&mut anim, &clock, &mut led, 500, 8);
        for &d in &led.writes {
            assert!((50..=255).contains(&d), "recording wrote {d} outside 50-255");
        }
        // The pulse actually reaches both bounds.
        assert!(led.writes.contains(&255));
        assert!(led.writes.contains(&50));
    }

    #[test]
    fn idle_to_recording_first_tick_is_ramp_start() {
        let clock = SimClock::new(0);
        let mut led = DutyRecorder::new();
        let mut anim = LedAnimator::new();

        // A little idle breathing first (duty well below 50).
        run(&mut anim, &clock, &mut led, 5, 20);
        assert!(led.last().unwrap() < 50);

        anim.set_state(AnimationState::Recording);
        clock.advance(8);
        anim.update(&clock, &mut led);
        assert!(
            led.last().unwrap() >= 50,
            "first recording tick must start at the band floor, got {:?}",
            led.last()
        );
    }

    #[test]
    fn success_flashes_six_times_then_returns_to_idle() {
        let clock = SimClock::new(0);
        let mut led = DutyRecorder::new();
        let mut anim = LedAnimator::new();
        anim.set_state(AnimationState::Success);

        for i in 0..6 {
            clock.advance(150);
            anim.update(&clock, &mut led);
            let expected = if i % 2 == 1 { 255 } else { 0 };
            assert_eq!(led.last(), Some(expected), "flash tick {i}");
            assert_eq!(anim.state(), AnimationState::Success);
        }

        // Seventh qualifying tick: hand control back to Idle.
        clock.advance(150);
        anim.update(&clock, &mut led);
        assert_eq!(anim.state(), AnimationState::Idle);
        assert_eq!(anim.step(), 0);
    }

    #[test]
    fn brutal_feedback_lead_in_then_flashes_then_listening() {
        let clock = SimClock::new(0);
        let mut led = DutyRecorder::new();
        let mut anim = LedAnimator::new();
        anim.set_state(AnimationState::BrutalFeedback);

        // First update writes dark immediately, regardless of elapsed time.
        anim.update(&clock, &mut led);
        assert_eq!(led.last(), Some(0));

        // Nothing more until the 500 ms lead-in has passed.
        let writes_before = led.writes.len();
        run(&mut anim, &clock, &mut led, 99, 5); // 495 ms
        assert_eq!(led.writes.len(), writes_before);

        // Six sharp flashes at 100 ms cadence, starting bright.
        run(&mut anim, &clock, &mut led, 1, 5); // crosses 500 ms
        assert_eq!(led.last(), Some(255));
        for _ in 0..5 {
            run(&mut anim, &clock, &mut led, 20, 5); // 100 ms per flash
        }
        assert_eq!(anim.step(), 7);

        clock.advance(5);
        anim.update(&clock, &mut led);
        assert_eq!(anim.state(), AnimationState::Listening);
    }

    #[test]
    fn error_and_recording_never_self_terminate() {
        for state in [AnimationState::Error, AnimationState::Recording] {
            let clock = SimClock::new(0);
            let mut led = DutyRecorder::new();
            let mut anim = LedAnimator::new();
            anim.set_state(state);
            run(&mut anim, &clock, &mut led, 10_000, 50);
            assert_eq!(anim.state(), state, "{state:?} must not self-terminate");
        }
    }

    #[test]
    fn error_toggles_full_brightness() {
        let clock = SimClock::new(0);
        let mut led = DutyRecorder::new();
        let mut anim = LedAnimator::new();
        anim.set_state(AnimationState::Error);
        run(&mut anim, &clock, &mut led, 8, 50);
        assert_eq!(led.writes, vec![255, 0, 255, 0, 255, 0, 255, 0]);
    }

    #[test]
    fn low_battery_blinks_dim() {
        let clock = SimClock::new(0);
        let mut led = DutyRecorder::new();
        let mut anim = LedAnimator::new();
        anim.set_state(AnimationState::LowBattery);
        run(&mut anim, &clock, &mut led, 6, 1000);
        assert_eq!(led.writes, vec![100, 0, 100, 0, 100, 0]);
    }

    #[test]
    fn connecting_double_blink_with_burst_gap() {
        let clock = SimClock::new(0);
        let mut led = DutyRecorder::new();
        let mut anim = LedAnimator::new();
        anim.set_state(AnimationState::Connecting);

        // One full burst: on, off, on, off, off(+gap).
        run(&mut anim, &clock, &mut led, 5, 200);
        assert_eq!(led.writes, vec![255, 0, 255, 0, 0]);

        // Gap: dark for 600 ms.
        let writes_before = led.writes.len();
        run(&mut anim, &clock, &mut led, 2, 200); // 400 ms into the gap
        assert_eq!(led.writes.len(), writes_before);

        // Next burst restarts at phase 0 (bright).
        run(&mut anim, &clock, &mut led, 1, 200); // 600 ms reached
        assert_eq!(led.last(), Some(255));
    }

    #[test]
    fn connecting_phase_resets_on_reentry() {
        let clock = SimClock::new(0);
        let mut led = DutyRecorder::new();
        let mut anim = LedAnimator::new();
        anim.set_state(AnimationState::Connecting);

        // Partway through a burst...
        run(&mut anim, &clock, &mut led, 2, 200);
        assert!(anim.step() > 0);

        // ...leave and come back: the burst starts over at phase 0.
        anim.set_state(AnimationState::Idle);
        anim.set_state(AnimationState::Connecting);
        assert_eq!(anim.step(), 0);
        clock.advance(200);
        anim.update(&clock, &mut led);
        assert_eq!(led.last(), Some(255));
    }

    #[test]
    fn listening_wave_stays_in_band() {
        let clock = SimClock::new(0);
        let mut led = DutyRecorder::new();
        let mut anim = LedAnimator::new();
        anim.set_state(AnimationState::Listening);
        run(&mut anim, &clock, &mut led, 1000, 40);
        for &d in &led.writes {
            assert!((20..=180).contains(&d), "listening wrote {d} outside 20-180");
        }
    }

    #[test]
    fn cadence_survives_u32_clock_wrap() {
        let clock = SimClock::new(u32::MAX - 30);
        let mut led = DutyRecorder::new();
        let mut anim = LedAnimator::new();
        anim.set_state(AnimationState::Error);

        // Stamp a write just before the wrap, then cross it.
        clock.advance(10); // u32::MAX - 20
        anim.update(&clock, &mut led);
        let writes_before = led.writes.len();
        assert!(writes_before > 0);

        clock.advance(25); // wraps past 0
        anim.update(&clock, &mut led);
        clock.advance(50);
        anim.update(&clock, &mut led);
        assert!(
            led.writes.len() > writes_before,
            "square wave must keep toggling across the clock wrap"
        );
    }

    #[test]
    fn rapid_polling_between_cadences_is_silent() {
        let clock = SimClock::new(0);
        let mut led = DutyRecorder::new();
        let mut anim = LedAnimator::new();
        anim.set_state(AnimationState::Uploading);

        clock.advance(100);
        anim.update(&clock, &mut led);
        let writes_before = led.writes.len();

        // 99 polls inside one cadence window: no side effects.
        run(&mut anim, &clock, &mut led, 99, 1);
        assert_eq!(led.writes.len(), writes_before);
    }
}
