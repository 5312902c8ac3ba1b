//! Virtual-time sequencer for host testing.
//!
//! Runs the same [`OutputShifter`] as the RMT ISR, but one tick at a time
//! under caller control. A blocked `enqueue()` advances ticks until a slot
//! frees, which is exactly what the hardware does while the producer waits.
//! `run_for_ns()` keeps the line running while the producer sleeps.
//!
//! Every emitted level is reported to the probe with its tick index, so
//! tests can rebuild the waveform and its timestamps (`tick * period_ns`).

use super::shifter::{OutputShifter, SequencerStats};
use super::{validate_output_pin, SymbolSequencer, SymbolTiming};
use crate::error::ConfigError;
use crate::fifo::{WordFifo, DEFAULT_FIFO_WORDS};

/// Probe that ignores the line.
pub type NoProbe = fn(u64, bool);

fn ignore_line(_tick: u64, _level: bool) {}

/// Simulated sequencer with an owned FIFO and a line probe.
pub struct SimulatedSequencer<P = NoProbe, const N: usize = DEFAULT_FIFO_WORDS> {
    fifo: WordFifo<N>,
    stats: SequencerStats,
    shifter: OutputShifter,
    probe: P,
    timing: Option<SymbolTiming>,
    output_pin: Option<u8>,
    level: bool,
    ticks: u64,
    enqueued: u64,
    flushes: u64,
    blocked_ticks: u64,
    // Air time owed by `run_for_ns` that is shorter than one symbol
    owed_ns: u64,
}

impl<const N: usize> SimulatedSequencer<NoProbe, N> {
    /// Simulator whose line is not observed.
    pub fn new() -> Self {
        Self::with_probe(ignore_line as NoProbe)
    }
}

impl<const N: usize> Default for SimulatedSequencer<NoProbe, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: FnMut(u64, bool), const N: usize> SimulatedSequencer<P, N> {
    /// Simulator reporting `(tick, level)` for every symbol period.
    pub fn with_probe(probe: P) -> Self {
        Self {
            fifo: WordFifo::<N>::new(),
            stats: SequencerStats::new(),
            shifter: OutputShifter::new(),
            probe,
            timing: None,
            output_pin: None,
            level: super::IDLE_LEVEL,
            ticks: 0,
            enqueued: 0,
            flushes: 0,
            blocked_ticks: 0,
            owed_ns: 0,
        }
    }

    /// Emit one symbol period.
    pub fn tick(&mut self) -> bool {
        self.level = self.shifter.tick(&self.fifo, &self.stats);
        (self.probe)(self.ticks, self.level);
        self.ticks += 1;
        self.level
    }

    /// Emit `count` symbol periods.
    pub fn run_ticks(&mut self, count: u64) {
        for _ in 0..count {
            self.tick();
        }
    }

    /// Keep the line running for `ns` of air time, as the hardware does
    /// while the producer sleeps. No-op before `start()`.
    ///
    /// Returns the number of ticks it took.
    pub fn run_for_ns(&mut self, ns: u64) -> u64 {
        let timing = match self.timing {
            Some(timing) => timing,
            None => return 0,
        };
        let start = self.ticks;
        self.owed_ns += ns;
        while self.owed_ns >= timing.period_ns() {
            self.tick();
            self.owed_ns -= timing.period_ns();
        }
        self.ticks - start
    }

    /// Tick until the FIFO is empty and the last word is fully shifted out.
    ///
    /// Returns the number of ticks it took.
    pub fn drain(&mut self) -> u64 {
        let start = self.ticks;
        while !self.fifo.is_empty() || self.shifter.is_mid_word() {
            self.tick();
        }
        self.ticks - start
    }

    /// Timing bound by `start()`, if started.
    pub fn timing(&self) -> Option<SymbolTiming> {
        self.timing
    }

    /// Pin bound by `start()`, if started.
    pub fn output_pin(&self) -> Option<u8> {
        self.output_pin
    }

    /// Current line level.
    pub fn level(&self) -> bool {
        self.level
    }

    /// Symbol periods emitted so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated air time so far, zero before `start()`.
    pub fn elapsed_ns(&self) -> u64 {
        self.timing.map_or(0, |t| t.duration_ns(self.ticks))
    }

    /// Words accepted by `enqueue()`, flush words included.
    pub fn enqueued_words(&self) -> u64 {
        self.enqueued
    }

    /// Calls to `flush_to_zero()`.
    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    /// Ticks spent draining while `enqueue()` waited on a full FIFO.
    pub fn blocked_ticks(&self) -> u64 {
        self.blocked_ticks
    }

    /// Words waiting in the FIFO.
    pub fn pending_words(&self) -> usize {
        self.fifo.len()
    }

    pub fn stats(&self) -> &SequencerStats {
        &self.stats
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }
}

impl<P: FnMut(u64, bool), const N: usize> SymbolSequencer for SimulatedSequencer<P, N> {
    fn start(&mut self, frequency_hz: u32, output_pin: u8) -> Result<SymbolTiming, ConfigError> {
        if self.timing.is_some() {
            return Err(ConfigError::AlreadyStarted);
        }
        validate_output_pin(output_pin)?;
        let timing = SymbolTiming::for_frequency(frequency_hz)?;

        self.timing = Some(timing);
        self.output_pin = Some(output_pin);
        Ok(timing)
    }

    fn enqueue(&mut self, word: u32) {
        let mut word = word;
        while let Err(rejected) = self.fifo.try_push(word) {
            word = rejected;
            self.tick();
            self.blocked_ticks += 1;
        }
        self.enqueued += 1;
    }

    fn flush_to_zero(&mut self) {
        self.enqueue(0);
        self.flushes += 1;
    }

    fn starved_ticks(&self) -> u32 {
        self.stats.starved_ticks()
    }
}
