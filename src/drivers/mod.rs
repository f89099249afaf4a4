//! Status-LED animation engine, peripheral drivers, and hardware glue.

pub mod animator;
pub mod button;
pub mod hw_init;
pub mod one_shots;
pub mod status_led;
