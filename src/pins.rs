//! GPIO / peripheral pin assignments for the Candor companion board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Status LED (single white LED, LEDC-dimmed)
// ---------------------------------------------------------------------------

/// Status LED anode, driven through the LEDC PWM peripheral.
pub const STATUS_LED_GPIO: i32 = 21;

/// LEDC channel reserved for the status LED.  Exclusively owned by the
/// animation engine once the cooperative loop starts.
pub const STATUS_LED_LEDC_CHANNEL: u32 = 0;

/// LEDC timer backing the status-LED channel.
pub const STATUS_LED_LEDC_TIMER: u32 = 0;

/// LEDC carrier frequency for the status LED (5 kHz — flicker-free).
pub const LED_PWM_FREQ_HZ: u32 = 5_000;

/// LEDC duty resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;

// ---------------------------------------------------------------------------
// User button (active-low with internal pull-up)
// ---------------------------------------------------------------------------

/// Momentary push-button: toggles recording, long press forces the error
/// pattern for bench testing.
pub const BUTTON_GPIO: i32 = 0;
