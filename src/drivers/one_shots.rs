//! Blocking one-shot LED effects.
//!
//! These sequences write the LED channel directly and sleep between steps,
//! so they are **incompatible with the cooperative loop**: run them only
//! before the loop starts (startup flourish) or at moments where no sibling
//! subsystem needs the CPU (discrete event flashes). Anything that must
//! coexist with audio or networking goes through
//! [`LedAnimator`](crate::drivers::animator::LedAnimator) instead.

use std::thread::sleep;
use std::time::Duration;

use log::info;

use crate::ports::LedOutput;

/// Boot flourish: three full fade-in/out cycles followed by five quick
/// full-brightness flashes, ending dark. Blocks for roughly 1.5 s.
pub fn startup_animation(led: &mut impl LedOutput) {
    info!("startup animation");

    for _ in 0..3 {
        for duty in (0..=255u16).step_by(5) {
            led.write_duty(duty as u8);
            sleep(Duration::from_millis(3));
        }
        for duty in (0..=255u16).rev().step_by(5) {
            led.write_duty(duty as u8);
            sleep(Duration::from_millis(3));
        }
    }

    for _ in 0..5 {
        led.write_duty(255);
        sleep(Duration::from_millis(50));
        led.write_duty(0);
        sleep(Duration::from_millis(50));
    }

    led.write_duty(0);
}

/// Brief full-brightness pulse acknowledging a button press. Blocks 50 ms.
pub fn flash_button_press(led: &mut impl LedOutput) {
    led.write_duty(255);
    sleep(Duration::from_millis(50));
    led.write_duty(0);
}

/// Double fade acknowledging Wi-Fi association. Blocks roughly 700 ms.
///
/// Not called on the bench build (no Wi-Fi stack is wired up); the
/// companion firmware's connectivity subsystem invokes this from its
/// got-IP handler.
pub fn flash_wifi_connected(led: &mut impl LedOutput) {
    for _ in 0..2 {
        for duty in (0..=255u16).step_by(3) {
            led.write_duty(duty as u8);
            sleep(Duration::from_millis(2));
        }
        for duty in (0..=255u16).rev().step_by(3) {
            led.write_duty(duty as u8);
            sleep(Duration::from_millis(2));
        }
    }
}
