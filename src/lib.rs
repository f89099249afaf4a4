//! Candor firmware library.
//!
//! Exposes the pure-logic modules for host-side testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module, so the crate
//! builds on x86_64 with `--no-default-features` for `cargo test`.

#![deny(unused_must_use)]

pub mod config;
pub mod diagnostics;
pub mod pins;
pub mod ports;

mod error;

pub mod adapters;
pub mod drivers;

pub use error::{Error, Result};
