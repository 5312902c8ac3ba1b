//! Hardware Abstraction Layer (ESP-IDF only).
//!
//! Thin wrappers around ESP-IDF peripherals.
//! Burst logic stays in core modules, HAL is just I/O.

pub mod clock;
pub mod led;
pub mod rmt;

pub use clock::EspClock;
pub use led::{BoardIndicator, GpioIndicator, RgbIndicator};
pub use rmt::RmtSequencer;
