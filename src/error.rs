//! Configuration error types
//!
//! Every variant is fatal at startup: without a valid sequencer binding the
//! transmitter has nothing to drive. Backpressure and indicator trouble are
//! not errors and never show up here.

/// Startup configuration error with code and message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// C01: Output pin missing or not output-capable on this chip
    InvalidPin { pin: u8 },
    /// C02: Output pin already wired to an indicator
    PinConflict { pin: u8 },
    /// C03: No clock divider yields an exact symbol period
    UnachievableFrequency { frequency_hz: u32 },
    /// C04: Repeat count must be at least 1
    InvalidRepeatCount,
    /// C05: Sequencer was already started
    AlreadyStarted,
    /// C06: Peripheral driver rejected the configuration (raw ESP-IDF code)
    Driver { code: i32 },
}

impl ConfigError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPin { .. } => "C01",
            Self::PinConflict { .. } => "C02",
            Self::UnachievableFrequency { .. } => "C03",
            Self::InvalidRepeatCount => "C04",
            Self::AlreadyStarted => "C05",
            Self::Driver { .. } => "C06",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidPin { .. } => "invalid output pin",
            Self::PinConflict { .. } => "output pin shared with indicator",
            Self::UnachievableFrequency { .. } => "frequency not reachable by clock divider",
            Self::InvalidRepeatCount => "repeat count must be >= 1",
            Self::AlreadyStarted => "sequencer already started",
            Self::Driver { .. } => "driver error",
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())?;
        match self {
            Self::InvalidPin { pin } | Self::PinConflict { pin } => write!(f, " (GPIO{})", pin),
            Self::UnachievableFrequency { frequency_hz } => write!(f, " ({} Hz)", frequency_hz),
            Self::Driver { code } => write!(f, " (esp_err {})", code),
            Self::InvalidRepeatCount | Self::AlreadyStarted => Ok(()),
        }
    }
}

#[cfg(target_os = "espidf")]
impl From<esp_idf_svc::sys::EspError> for ConfigError {
    fn from(e: esp_idf_svc::sys::EspError) -> Self {
        ConfigError::Driver { code: e.code() }
    }
}
