//! Module: config
//!
//! Purpose: Transmitter configuration, built once at startup and passed by
//! reference to the controller. No ambient globals.
//!
//! Architecture:
//! - [`BoardProfile`]: resolved board wiring (selected by cargo feature)
//! - [`TransmitConfig`]: everything the core needs (pin, rate, repeats, cooldown)
//! - [`nvs`]: optional persisted overrides for repeat count and cooldown
//!
//! Safety: Safe. Plain `Copy` values, validated before use.

pub mod nvs;

pub use nvs::ConfigOverrides;

use crate::error::ConfigError;
use crate::feedback::IdlePattern;
use crate::sequencer::{validate_output_pin, SymbolTiming};
use crate::signal::{COOLDOWN_MS, REPEAT_COUNT, SYMBOL_RATE_HZ};

/// Upper bound accepted for `repeat_count` overrides.
pub const MAX_REPEAT_COUNT: u32 = 100;

/// Upper bound accepted for `cooldown_ms` overrides.
pub const MAX_COOLDOWN_MS: u32 = 60_000;

/// How the status indicator is wired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndicatorWiring {
    /// No indicator fitted.
    None,
    /// Single LED toggled per pass.
    Single { pin: u8, active_low: bool },
    /// RGB LED: red shows passes, blue blinks during cooldown.
    Rgb { red: u8, green: u8, blue: u8, active_low: bool },
}

impl IndicatorWiring {
    /// True if the indicator uses `pin`.
    pub fn uses_pin(&self, pin: u8) -> bool {
        match *self {
            IndicatorWiring::None => false,
            IndicatorWiring::Single { pin: led, .. } => led == pin,
            IndicatorWiring::Rgb { red, green, blue, .. } => {
                red == pin || green == pin || blue == pin
            }
        }
    }
}

/// Supported board wirings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardProfile {
    /// Dev board with one active-high status LED.
    DevKit,
    /// Board with an active-low RGB LED.
    RgbLed,
}

impl BoardProfile {
    /// Profile chosen at build time.
    pub const fn selected() -> Self {
        if cfg!(feature = "rgb-indicator") {
            BoardProfile::RgbLed
        } else {
            BoardProfile::DevKit
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BoardProfile::DevKit => "devkit",
            BoardProfile::RgbLed => "rgb-led",
        }
    }
}

/// Resolved transmitter configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransmitConfig {
    /// GPIO driven by the sequencer.
    pub output_pin: u8,
    /// Symbol rate.
    pub frequency_hz: u32,
    /// Passes over the word stream per burst.
    pub repeat_count: u32,
    /// Minimum quiet time after each burst.
    pub cooldown_ms: u32,
    /// Extra wait after each pass's indicator update (0 = back-to-back).
    pub pass_delay_ms: u32,
    /// Indicator pattern played during cooldown.
    pub idle_pattern: IdlePattern,
    pub indicator: IndicatorWiring,
}

impl TransmitConfig {
    /// Defaults for a board profile.
    pub const fn for_board(board: BoardProfile) -> Self {
        match board {
            BoardProfile::DevKit => Self {
                output_pin: 4,
                frequency_hz: SYMBOL_RATE_HZ,
                repeat_count: REPEAT_COUNT,
                cooldown_ms: COOLDOWN_MS,
                pass_delay_ms: 0,
                idle_pattern: IdlePattern::SolidOff,
                indicator: IndicatorWiring::Single { pin: 2, active_low: false },
            },
            BoardProfile::RgbLed => Self {
                output_pin: 4,
                frequency_hz: SYMBOL_RATE_HZ,
                repeat_count: REPEAT_COUNT,
                cooldown_ms: 2000,
                pass_delay_ms: 0,
                idle_pattern: IdlePattern::Blink { count: 2, on_ms: 500, off_ms: 500 },
                indicator: IndicatorWiring::Rgb { red: 18, green: 19, blue: 20, active_low: true },
            },
        }
    }

    /// Apply persisted overrides. Out-of-range values are ignored.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(repeat_count) = overrides.repeat_count {
            if (1..=MAX_REPEAT_COUNT).contains(&repeat_count) {
                self.repeat_count = repeat_count;
            }
        }
        if let Some(cooldown_ms) = overrides.cooldown_ms {
            if cooldown_ms <= MAX_COOLDOWN_MS {
                self.cooldown_ms = cooldown_ms;
            }
        }
        self
    }

    /// Check everything that must hold before the sequencer is bound.
    ///
    /// Returns the exact symbol timing the sequencer will run at.
    pub fn validate(&self) -> Result<SymbolTiming, ConfigError> {
        if self.repeat_count == 0 {
            return Err(ConfigError::InvalidRepeatCount);
        }
        validate_output_pin(self.output_pin)?;
        if self.indicator.uses_pin(self.output_pin) {
            return Err(ConfigError::PinConflict { pin: self.output_pin });
        }
        SymbolTiming::for_frequency(self.frequency_hz)
    }

    /// Words queued per burst for a stream of `words_per_pass` words.
    pub const fn words_per_burst(&self, words_per_pass: usize) -> u64 {
        self.repeat_count as u64 * words_per_pass as u64 + 1
    }
}

impl Default for TransmitConfig {
    fn default() -> Self {
        Self::for_board(BoardProfile::selected())
    }
}
