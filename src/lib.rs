//! # RustOokOpener
//!
//! Charge-port latch transmitter: a fixed OOK sequence clocked out by the
//! ESP32 RMT peripheral at exactly 400 µs per symbol.
//!
//! ## Architecture
//!
//! ```text
//! DOMAIN_SIGNAL ─encode─▶ SIGNAL_WORDS ─▶ TransmissionController ─enqueue─▶ WordFifo
//!   (333 bits)            (11 words)        (burst FSM, task)                 │
//!                                               │                             ▼
//!                                          FeedbackSink             RMT sequencer ─▶ GPIO
//!                                          (status LED)             (hardware clock)
//! ```
//!
//! - The controller only produces words; the sequencer alone owns the line
//! - Timing comes from the RMT clock divider, never from software delays
//! - Indicator failures are logged and counted, never propagated
//!
//! Everything outside `hal` builds and tests on the host.

#![cfg_attr(not(test), no_std)]

pub mod clock;
pub mod config;
pub mod controller;
pub mod encoder;
pub mod error;
pub mod fault;
pub mod feedback;
pub mod fifo;
pub mod log_globals;
pub mod logging;
pub mod sequencer;
pub mod signal;
pub mod uart_logger;

#[cfg(target_os = "espidf")]
pub mod hal;

pub use config::{BoardProfile, TransmitConfig};
pub use controller::{BurstReport, Diagnostics, State, TransmissionController};
pub use error::ConfigError;
pub use fault::{FaultCode, FaultState};
pub use feedback::{FeedbackSink, IdlePattern};
pub use fifo::WordFifo;
pub use log_globals::TX_LOG_STREAM;
pub use sequencer::{SimulatedSequencer, SymbolSequencer, SymbolTiming};
pub use signal::{DOMAIN_SIGNAL, SIGNAL_WORDS};
