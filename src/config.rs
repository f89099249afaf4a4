//! System configuration parameters
//!
//! All tunable parameters for the Candor status-LED subsystem. The defaults
//! match the companion board schematic; values can be overridden by the
//! surrounding firmware before peripheral bring-up.

use serde::{Deserialize, Serialize};

use crate::pins;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Status LED ---
    /// GPIO driving the status LED.
    pub led_gpio: i32,
    /// LEDC channel reserved for the status LED.
    pub led_channel: u32,
    /// LEDC carrier frequency (Hz).
    pub led_pwm_freq_hz: u32,
    /// LEDC duty resolution (bits).
    pub led_resolution_bits: u32,

    // --- Timing ---
    /// Cooperative loop period (milliseconds). Must be at most half the
    /// shortest pattern cadence (8 ms recording pulse) so no visible step
    /// is skipped.
    pub loop_interval_ms: u32,

    // --- Battery ---
    /// Battery percentage at which the low-battery pattern takes over.
    pub low_battery_percent: u8,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            led_gpio: pins::STATUS_LED_GPIO,
            led_channel: pins::STATUS_LED_LEDC_CHANNEL,
            led_pwm_freq_hz: pins::LED_PWM_FREQ_HZ,
            led_resolution_bits: pins::PWM_RESOLUTION_BITS,

            loop_interval_ms: 4, // 250 Hz — services the 8 ms recording pulse
            low_battery_percent: 15,
        }
    }
}

impl SystemConfig {
    /// Range-check the configuration. Called once at boot; a failure here
    /// means the overriding firmware handed us nonsense.
    pub fn validate(&self) -> crate::Result<()> {
        if self.led_resolution_bits != 8 {
            return Err(crate::Error::Config("LED duty resolution must be 8-bit"));
        }
        if self.led_pwm_freq_hz < 1_000 {
            return Err(crate::Error::Config("LED carrier below 1 kHz flickers"));
        }
        if self.loop_interval_ms == 0 || self.loop_interval_ms > 8 {
            return Err(crate::Error::Config(
                "loop interval must be 1-8 ms to service the recording pulse",
            ));
        }
        if self.low_battery_percent > 100 {
            return Err(crate::Error::Config("battery threshold above 100%"));
        }
        Ok(())
    }
}
