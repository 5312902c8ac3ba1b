//! Module: sequencer
//!
//! Purpose: The hardware symbol sequencer seam. Once started, a sequencer
//! clocks one bit per symbol period onto its output line, draining a word
//! FIFO LSB-first, independent of how fast the controller runs.
//!
//! Architecture:
//! - [`SymbolSequencer`]: the capability the controller drives
//! - [`SymbolTiming`]: exact symbol period as RMT clock divider + tick count
//! - [`OutputShifter`]: per-tick bit emitter shared by every implementation
//! - [`SimulatedSequencer`]: virtual-time implementation for host tests
//! - `hal::rmt::RmtSequencer`: ESP32 RMT implementation (device only)
//!
//! Timing is never produced by software delays. The period is
//! `divider * ticks / 80 MHz` and is fixed at `start()`.

pub mod shifter;
pub mod sim;

pub use shifter::{OutputShifter, SequencerStats, IDLE_LEVEL};
pub use sim::SimulatedSequencer;

use crate::error::ConfigError;

/// RMT source clock (APB).
pub const RMT_SOURCE_CLOCK_HZ: u32 = 80_000_000;

/// Largest RMT clock divider.
pub const MAX_CLOCK_DIVIDER: u32 = 255;

/// Largest duration an RMT pulse can hold (15-bit field).
pub const MAX_PULSE_TICKS: u32 = 32_767;

/// Hardware symbol sequencer.
///
/// # Contract
///
/// - `start()` binds the output pin and begins clocking. It fails fast on a
///   bad pin or an unreachable frequency and never runs with approximate timing.
/// - `enqueue()` appends one word. On a full FIFO it blocks until the
///   sequencer frees a slot. Words are never dropped or reordered.
/// - On FIFO starvation the line is held at [`IDLE_LEVEL`] (low).
pub trait SymbolSequencer {
    /// Bind `output_pin` and start emitting one bit per `1 / frequency_hz` seconds.
    fn start(&mut self, frequency_hz: u32, output_pin: u8) -> Result<SymbolTiming, ConfigError>;

    /// Append a word, blocking while the FIFO is full.
    fn enqueue(&mut self, word: u32);

    /// Append an all-zero word so the line is low after the last symbol.
    fn flush_to_zero(&mut self) {
        self.enqueue(0);
    }

    /// Symbol periods emitted at idle level because the FIFO was empty.
    fn starved_ticks(&self) -> u32 {
        0
    }
}

/// Exact symbol timing in RMT clock units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymbolTiming {
    /// Requested symbol rate.
    pub frequency_hz: u32,
    /// RMT clock divider (1..=255).
    pub clock_divider: u8,
    /// RMT ticks in one symbol period (1..=32767).
    pub ticks_per_symbol: u16,
}

impl SymbolTiming {
    /// Find the finest divider that expresses `frequency_hz` exactly.
    ///
    /// 2500 Hz resolves to divider 1 with 32000 ticks, i.e. 400 µs.
    pub const fn for_frequency(frequency_hz: u32) -> Result<Self, ConfigError> {
        if frequency_hz == 0 {
            return Err(ConfigError::UnachievableFrequency { frequency_hz });
        }

        let mut divider = 1u32;
        while divider <= MAX_CLOCK_DIVIDER {
            let step = divider as u64 * frequency_hz as u64;
            if RMT_SOURCE_CLOCK_HZ as u64 % step == 0 {
                let ticks = RMT_SOURCE_CLOCK_HZ as u64 / step;
                if ticks >= 1 && ticks <= MAX_PULSE_TICKS as u64 {
                    return Ok(Self {
                        frequency_hz,
                        clock_divider: divider as u8,
                        ticks_per_symbol: ticks as u16,
                    });
                }
            }
            divider += 1;
        }

        Err(ConfigError::UnachievableFrequency { frequency_hz })
    }

    /// Symbol period in nanoseconds.
    #[inline]
    pub const fn period_ns(&self) -> u64 {
        self.clock_divider as u64 * self.ticks_per_symbol as u64 * 1_000_000_000
            / RMT_SOURCE_CLOCK_HZ as u64
    }

    /// Symbol period in microseconds.
    #[inline]
    pub const fn period_us(&self) -> u64 {
        self.period_ns() / 1000
    }

    /// Air time of `symbols` consecutive symbols in nanoseconds.
    #[inline]
    pub const fn duration_ns(&self, symbols: u64) -> u64 {
        symbols * self.period_ns()
    }
}

/// Check that `pin` exists and can drive an output on the target chip.
///
/// ESP32-S3: GPIO0..=21 and GPIO33..=48 (22..=25 do not exist, 26..=32 are
/// taken by SPI flash/PSRAM). ESP32-P4: GPIO0..=54.
pub const fn validate_output_pin(pin: u8) -> Result<(), ConfigError> {
    let valid = if cfg!(feature = "esp32p4") {
        pin <= 54
    } else {
        pin <= 21 || (pin >= 33 && pin <= 48)
    };

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidPin { pin })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_for_symbol_rate() {
        let timing = SymbolTiming::for_frequency(2500).unwrap();
        assert_eq!(timing.clock_divider, 1);
        assert_eq!(timing.ticks_per_symbol, 32_000);
        assert_eq!(timing.period_ns(), 400_000);
        assert_eq!(timing.period_us(), 400);
    }

    #[test]
    fn test_low_frequency_needs_divider() {
        // 80 MHz / 1000 Hz = 80000 ticks, too many for d=1
        let timing = SymbolTiming::for_frequency(1000).unwrap();
        assert_eq!(timing.clock_divider, 4);
        assert_eq!(timing.ticks_per_symbol, 20_000);
        assert_eq!(timing.period_ns(), 1_000_000);
    }

    #[test]
    fn test_unreachable_frequencies() {
        assert_eq!(
            SymbolTiming::for_frequency(0),
            Err(ConfigError::UnachievableFrequency { frequency_hz: 0 })
        );
        // 80e6 is not divisible by 3 at any divider
        assert!(SymbolTiming::for_frequency(3).is_err());
        // Above the source clock
        assert!(SymbolTiming::for_frequency(160_000_000).is_err());
        // Exact but too slow: 80e6 / 255 / 32767 < 10 Hz
        assert!(SymbolTiming::for_frequency(5).is_err());
    }

    #[test]
    fn test_duration_has_no_drift() {
        let timing = SymbolTiming::for_frequency(2500).unwrap();
        assert_eq!(timing.duration_ns(333 * 10), 3330 * 400_000);
    }

    #[test]
    #[cfg(not(feature = "esp32p4"))]
    fn test_esp32s3_pins() {
        assert!(validate_output_pin(0).is_ok());
        assert!(validate_output_pin(21).is_ok());
        assert!(validate_output_pin(48).is_ok());
        assert_eq!(validate_output_pin(22), Err(ConfigError::InvalidPin { pin: 22 }));
        assert!(validate_output_pin(30).is_err());
        assert!(validate_output_pin(49).is_err());
    }
}
