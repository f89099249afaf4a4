//! Adapters binding the port traits to the ESP32-S3 platform.

pub mod time;
