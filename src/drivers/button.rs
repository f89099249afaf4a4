//! ISR-debounced button driver with short and long press detection.
//!
//! ## Hardware
//!
//! Active-low momentary switch with internal pull-up. GPIO fires on the
//! falling edge; the ISR records the raw timestamp into an atomic, and the
//! `tick()` method (called from the cooperative loop) runs the debounce +
//! gesture state machine.
//!
//! | Gesture     | Condition       | Action in main loop            |
//! |-------------|-----------------|--------------------------------|
//! | Short press | Release < 2 s   | toggle recording + ack flash   |
//! | Long press  | Hold >= 2 s     | force error pattern (bench)    |

use core::sync::atomic::{AtomicU32, Ordering};

use crate::drivers::hw_init;

const DEBOUNCE_MS: u32 = 50;
const LONG_PRESS_MS: u32 = 2000;

/// Raw ISR timestamp (milliseconds since boot, truncated to u32).
/// Written by the ISR, read by the main loop.
static BUTTON_ISR_TIMESTAMP: AtomicU32 = AtomicU32::new(0);

/// Called from the GPIO ISR on the falling edge.
pub fn button_isr_handler(now_ms: u32) {
    BUTTON_ISR_TIMESTAMP.store(now_ms.max(1), Ordering::Release);
}

/// Button events emitted after gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    Debounce { since_ms: u32 },
    Pressed { since_ms: u32 },
}

pub struct ButtonDriver {
    gpio: i32,
    state: GestureState,
    last_isr_ms: u32,
}

impl ButtonDriver {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            state: GestureState::Idle,
            last_isr_ms: 0,
        }
    }

    /// Call from the cooperative loop on every iteration.
    /// `now_ms` is the current monotonic time in milliseconds.
    /// Returns a classified gesture event, if any.
    pub fn tick(&mut self, now_ms: u32) -> Option<ButtonEvent> {
        let isr_ms = BUTTON_ISR_TIMESTAMP.load(Ordering::Acquire);
        let new_press = isr_ms != self.last_isr_ms && isr_ms != 0;

        match self.state {
            GestureState::Idle => {
                if new_press {
                    self.last_isr_ms = isr_ms;
                    self.state = GestureState::Debounce { since_ms: now_ms };
                }
                None
            }
            GestureState::Debounce { since_ms } => {
                if now_ms.wrapping_sub(since_ms) < DEBOUNCE_MS {
                    return None;
                }
                // Still held after the debounce window counts as a press;
                // a bounce that released already is discarded.
                if self.is_held() {
                    self.state = GestureState::Pressed { since_ms };
                } else {
                    self.state = GestureState::Idle;
                }
                None
            }
            GestureState::Pressed { since_ms } => {
                if self.is_held() {
                    if now_ms.wrapping_sub(since_ms) >= LONG_PRESS_MS {
                        self.state = GestureState::Idle;
                        return Some(ButtonEvent::LongPress);
                    }
                    None
                } else {
                    self.state = GestureState::Idle;
                    Some(ButtonEvent::ShortPress)
                }
            }
        }
    }

    /// Active-low: held while the GPIO reads low.
    fn is_held(&self) -> bool {
        !hw_init::gpio_read(self.gpio)
    }
}
