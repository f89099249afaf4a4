//! Candor status-LED firmware — main entry point.
//!
//! Cooperative single-threaded loop:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  boot: logger → hw_init → startup flourish (blocking)│
//! │                                                      │
//! │  loop every 4 ms:                                    │
//! │    button.tick()  ── gestures ──▶ animator.set_state │
//! │    animator.update(clock, led)  ──▶ LEDC duty        │
//! │    transition log (advisory)                         │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The startup flourish and the button-ack flash are the only blocking
//! sequences, and both run at moments where nothing else needs the CPU
//! (pre-loop, or immediately after a user gesture on this bench build).
//! Everything that must coexist with other subsystems goes through the
//! non-blocking animator.

#![deny(unused_must_use)]

use std::thread::sleep;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{error, info};

use candor::adapters::time::Esp32Clock;
use candor::config::SystemConfig;
use candor::diagnostics::TransitionLog;
use candor::drivers::animator::{AnimationState, LedAnimator};
use candor::drivers::button::{ButtonDriver, ButtonEvent};
use candor::drivers::{hw_init, one_shots};
use candor::drivers::status_led::StatusLed;
use candor::pins;
use candor::ports::MonotonicClock;

/// Short-press walk order on the bench build: each press moves the LED to
/// the next pattern so every state can be eyeballed without a host script.
/// Success and BrutalFeedback hand control back on their own.
const DEMO_WALK: [AnimationState; 9] = [
    AnimationState::Idle,
    AnimationState::Recording,
    AnimationState::Processing,
    AnimationState::Uploading,
    AnimationState::Success,
    AnimationState::Connecting,
    AnimationState::Listening,
    AnimationState::BrutalFeedback,
    AnimationState::LowBattery,
];

/// Diagnostic history dump interval.
const DIAG_DUMP_INTERVAL_MS: u32 = 30_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("Candor LED subsystem v{}", env!("CARGO_PKG_VERSION"));

    let config = SystemConfig::default();
    config.validate().context("invalid system config")?;

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    if let Err(e) = hw_init::init_isr_service() {
        error!("ISR service init failed: {} — continuing without button", e);
    }

    let clock = Esp32Clock::new();
    let mut led = StatusLed::new(config.led_channel);
    let mut button = ButtonDriver::new(pins::BUTTON_GPIO);
    let mut animator = LedAnimator::new();
    let mut transitions = TransitionLog::new();

    // ── 3. Startup flourish ───────────────────────────────────
    // Deliberately blocking: nothing else is running yet. Once the loop
    // starts, only the non-blocking animator touches the channel.
    one_shots::startup_animation(&mut led);

    info!("System ready. Entering cooperative loop.");

    // ── 4. Cooperative loop ───────────────────────────────────
    let tick = Duration::from_millis(config.loop_interval_ms as u64);
    let mut walk_index = 0usize;
    let mut last_dump_ms = clock.now_ms();

    loop {
        sleep(tick);
        let now_ms = clock.now_ms();
        let state_before = animator.state();

        // Button gestures drive external transitions.
        match button.tick(now_ms) {
            Some(ButtonEvent::ShortPress) => {
                one_shots::flash_button_press(&mut led);
                walk_index = (walk_index + 1) % DEMO_WALK.len();
                animator.set_state(DEMO_WALK[walk_index]);
            }
            Some(ButtonEvent::LongPress) => {
                // Held fault indication; cleared by the next short press.
                animator.set_state(AnimationState::Error);
            }
            None => {}
        }

        // Advance the active pattern (non-blocking, at most one duty write).
        animator.update(&clock, &mut led);

        // Advisory transition history — catches both button-driven and
        // self-terminating transitions.
        if animator.state() != state_before {
            transitions.record(now_ms, state_before, animator.state());
        }

        if now_ms.wrapping_sub(last_dump_ms) >= DIAG_DUMP_INTERVAL_MS {
            last_dump_ms = now_ms;
            transitions.dump();
        }
    }
}
