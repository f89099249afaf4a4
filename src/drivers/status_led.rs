//! Status LED driver.
//!
//! One LEDC PWM channel drives the single white status LED.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the LEDC duty register via hw_init.
//! On host/test: tracks the last duty in-memory only.

use crate::drivers::hw_init;
use crate::ports::LedOutput;

pub struct StatusLed {
    channel: u32,
    current: u8,
}

impl StatusLed {
    pub fn new(channel: u32) -> Self {
        Self {
            channel,
            current: 0,
        }
    }

    pub fn set_duty(&mut self, duty: u8) {
        hw_init::ledc_set(self.channel, duty);
        self.current = duty;
    }

    pub fn off(&mut self) {
        self.set_duty(0);
    }

    /// Last duty written to the channel.
    pub fn current_duty(&self) -> u8 {
        self.current
    }
}

impl LedOutput for StatusLed {
    fn write_duty(&mut self, duty: u8) {
        self.set_duty(duty);
    }
}
