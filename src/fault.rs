//! Runtime fault record.
//!
//! Configuration errors stop the firmware before the first burst and are
//! reported through [`crate::error::ConfigError`]. What lands here happens
//! while transmitting and never stops it: the fault is kept for
//! diagnostics only.
//!
//! The most recent fault is packed into one word so a reader on another
//! task always sees a code together with its own data:
//!
//! ```text
//!  31      24 23                     0
//! ┌─────────┬────────────────────────┐
//! │  code   │  data (saturates)      │
//! └─────────┴────────────────────────┘
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

const DATA_BITS: u32 = 24;
const DATA_MAX: u32 = (1 << DATA_BITS) - 1;

/// Runtime fault codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    None = 0,

    /// Status indicator call failed. Data: failed calls in the burst.
    IndicatorFailure = 1,

    /// FIFO ran dry inside a burst, leaving an idle gap in the waveform.
    /// Data: starved symbol periods in the burst.
    FifoStarved = 2,
}

impl FaultCode {
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => FaultCode::IndicatorFailure,
            2 => FaultCode::FifoStarved,
            _ => FaultCode::None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FaultCode::None => "none",
            FaultCode::IndicatorFailure => "indicator failure",
            FaultCode::FifoStarved => "fifo starved",
        }
    }
}

/// Last fault plus per-kind totals since boot.
///
/// Written by the controller once per burst, readable from any task.
pub struct FaultState {
    last: AtomicU32,
    indicator_failures: AtomicU32,
    starved_ticks: AtomicU32,
    bursts_affected: AtomicU32,
}

impl FaultState {
    pub const fn new() -> Self {
        Self {
            last: AtomicU32::new(0),
            indicator_failures: AtomicU32::new(0),
            starved_ticks: AtomicU32::new(0),
            bursts_affected: AtomicU32::new(0),
        }
    }

    /// Record a fault, replacing the last one and adding `data` to its total.
    pub fn record(&self, code: FaultCode, data: u32) {
        let total = match code {
            FaultCode::None => return,
            FaultCode::IndicatorFailure => &self.indicator_failures,
            FaultCode::FifoStarved => &self.starved_ticks,
        };
        total.fetch_add(data, Ordering::Relaxed);
        self.bursts_affected.fetch_add(1, Ordering::Relaxed);

        let packed = ((code as u32) << DATA_BITS) | data.min(DATA_MAX);
        self.last.store(packed, Ordering::Release);
    }

    /// Most recent fault and its data.
    pub fn snapshot(&self) -> (FaultCode, u32) {
        let packed = self.last.load(Ordering::Acquire);
        (FaultCode::from_raw((packed >> DATA_BITS) as u8), packed & DATA_MAX)
    }

    #[inline]
    pub fn last(&self) -> FaultCode {
        self.snapshot().0
    }

    #[inline]
    pub fn data(&self) -> u32 {
        self.snapshot().1
    }

    /// Sum of all data recorded under `code` since boot.
    pub fn total(&self, code: FaultCode) -> u32 {
        match code {
            FaultCode::None => 0,
            FaultCode::IndicatorFailure => self.indicator_failures.load(Ordering::Relaxed),
            FaultCode::FifoStarved => self.starved_ticks.load(Ordering::Relaxed),
        }
    }

    /// Number of `record` calls since boot.
    pub fn count(&self) -> u32 {
        self.bursts_affected.load(Ordering::Relaxed)
    }

    /// Forget the last fault. Totals are kept.
    pub fn clear(&self) {
        self.last.store(0, Ordering::Release);
    }
}

impl Default for FaultState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_fault_replaced_totals_kept() {
        let fault = FaultState::new();
        assert_eq!(fault.snapshot(), (FaultCode::None, 0));

        fault.record(FaultCode::IndicatorFailure, 3);
        fault.record(FaultCode::FifoStarved, 12);
        fault.record(FaultCode::IndicatorFailure, 2);

        assert_eq!(fault.snapshot(), (FaultCode::IndicatorFailure, 2));
        assert_eq!(fault.total(FaultCode::IndicatorFailure), 5);
        assert_eq!(fault.total(FaultCode::FifoStarved), 12);
        assert_eq!(fault.count(), 3);

        fault.clear();
        assert_eq!(fault.last(), FaultCode::None);
        assert_eq!(fault.total(FaultCode::FifoStarved), 12);
    }

    #[test]
    fn test_none_is_not_recorded() {
        let fault = FaultState::new();
        fault.record(FaultCode::None, 7);
        assert_eq!(fault.count(), 0);
        assert_eq!(fault.data(), 0);
    }

    #[test]
    fn test_data_saturates_in_packed_word() {
        let fault = FaultState::new();
        fault.record(FaultCode::FifoStarved, u32::MAX);
        assert_eq!(fault.snapshot(), (FaultCode::FifoStarved, DATA_MAX));
        assert_eq!(fault.total(FaultCode::FifoStarved), u32::MAX);
    }

    #[test]
    fn test_raw_codes() {
        for code in [FaultCode::None, FaultCode::IndicatorFailure, FaultCode::FifoStarved] {
            assert_eq!(FaultCode::from_raw(code as u8), code);
        }
        assert_eq!(FaultCode::from_raw(200), FaultCode::None);
        assert_eq!(FaultCode::FifoStarved.label(), "fifo starved");
    }
}
