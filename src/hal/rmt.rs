//! RMT-backed symbol sequencer.
//!
//! The RMT peripheral clocks pulses out of its own memory block, refilled
//! from an interrupt. The refill source is an endless iterator that runs the
//! [`OutputShifter`] over the shared [`WordFifo`]: every RMT item carries two
//! pulses, one symbol period each.
//!
//! ```text
//! Controller ──enqueue()──▶ WordFifo ──ISR refill──▶ RMT mem ──▶ GPIO
//!  (task, may block)        (static)   2 bits/item    80 MHz / divider
//! ```
//!
//! The iterator never returns `None`: an empty FIFO produces idle-low
//! symbols, so the channel keeps running and the next word starts on a
//! symbol boundary. The channel idle level is also low.

use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::AnyOutputPin;
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::rmt::config::TransmitConfig;
use esp_idf_svc::hal::rmt::{PinState, Pulse, PulseTicks, RmtChannel, Symbol, TxRmtDriver};

use crate::error::ConfigError;
use crate::fifo::WordFifo;
use crate::sequencer::{
    validate_output_pin, OutputShifter, SequencerStats, SymbolSequencer, SymbolTiming,
};

/// How long a blocked `enqueue()` sleeps before retrying.
/// One word is 12.8 ms on air at 2.5 kHz, so one tick never starves the line.
const BACKPRESSURE_POLL_MS: u32 = 1;

/// Endless ISR-side symbol source.
struct RmtSymbols {
    fifo: &'static WordFifo,
    stats: &'static SequencerStats,
    shifter: OutputShifter,
    high: Pulse,
    low: Pulse,
}

impl RmtSymbols {
    #[inline]
    fn pulse(&self, level: bool) -> Pulse {
        if level {
            self.high
        } else {
            self.low
        }
    }
}

impl Iterator for RmtSymbols {
    type Item = Symbol;

    #[inline]
    fn next(&mut self) -> Option<Symbol> {
        let first = self.shifter.tick(self.fifo, self.stats);
        let second = self.shifter.tick(self.fifo, self.stats);
        Some(Symbol::new(self.pulse(first), self.pulse(second)))
    }
}

/// Symbol sequencer on one RMT TX channel.
pub struct RmtSequencer<C>
where
    C: Peripheral + 'static,
    C::P: RmtChannel,
{
    channel: Option<C>,
    driver: Option<TxRmtDriver<'static>>,
    fifo: &'static WordFifo,
    stats: &'static SequencerStats,
}

impl<C> RmtSequencer<C>
where
    C: Peripheral + 'static,
    C::P: RmtChannel,
{
    /// Wrap an RMT channel. Nothing runs until [`SymbolSequencer::start`].
    pub fn new(channel: C, fifo: &'static WordFifo, stats: &'static SequencerStats) -> Self {
        Self {
            channel: Some(channel),
            driver: None,
            fifo,
            stats,
        }
    }

    /// Words still queued for the hardware.
    pub fn pending_words(&self) -> usize {
        self.fifo.len()
    }
}

impl<C> SymbolSequencer for RmtSequencer<C>
where
    C: Peripheral + 'static,
    C::P: RmtChannel,
{
    fn start(&mut self, frequency_hz: u32, output_pin: u8) -> Result<SymbolTiming, ConfigError> {
        if self.driver.is_some() {
            return Err(ConfigError::AlreadyStarted);
        }
        validate_output_pin(output_pin)?;
        let timing = SymbolTiming::for_frequency(frequency_hz)?;
        let channel = self.channel.take().ok_or(ConfigError::AlreadyStarted)?;

        // SAFETY: pin number was validated for this chip and from here on
        // only the RMT driver touches it.
        let pin = unsafe { AnyOutputPin::new(output_pin as i32) };

        let config = TransmitConfig::new()
            .clock_divider(timing.clock_divider)
            .idle(Some(PinState::Low));
        let mut driver = TxRmtDriver::new(channel, pin, &config)?;

        let ticks = PulseTicks::new(timing.ticks_per_symbol)?;
        driver.start_iter(RmtSymbols {
            fifo: self.fifo,
            stats: self.stats,
            shifter: OutputShifter::new(),
            high: Pulse::new(PinState::High, ticks),
            low: Pulse::new(PinState::Low, ticks),
        })?;

        self.driver = Some(driver);
        Ok(timing)
    }

    fn enqueue(&mut self, word: u32) {
        let mut word = word;
        while let Err(rejected) = self.fifo.try_push(word) {
            word = rejected;
            FreeRtos::delay_ms(BACKPRESSURE_POLL_MS);
        }
    }

    fn starved_ticks(&self) -> u32 {
        self.stats.starved_ticks()
    }
}
