//! Transmission controller finite state machine.
//!
//! Orchestrates bursts: `repeat_count` passes over the word stream, one
//! explicit zero word, then a cooldown window. Runs forever.
//!
//! ```text
//!        ┌──────┐  start   ┌──────────────┐  all passes  ┌──────────┐
//!   ┌──▶ │ Idle │ ───────▶ │ Transmitting │ ───────────▶ │ Flushing │
//!   │    └──────┘          └──────────────┘              └──────────┘
//!   │                        │  ▲ one pass per step            │ zero word
//!   │                        └──┘                              ▼
//!   │                                                   ┌──────────┐
//!   └────────────────────── cooldown elapsed ────────── │ Cooldown │
//!                                                       └──────────┘
//! ```
//!
//! The controller only ever blocks in `enqueue()` (FIFO backpressure) or in
//! its own clock waits. Symbol timing belongs to the sequencer, so none of
//! that blocking reaches the line.
//!
//! Indicator failures are logged, counted and recorded in [`FaultState`];
//! they never change the state sequence.
//!
//! FIFO starvation is counted from the first word of a burst up to the
//! flush word. Once the flush word is queued the line is expected to go
//! idle, so starved ticks during cooldown are not a fault.

use core::fmt::Debug;

use crate::clock::{ms_until, Clock};
use crate::config::TransmitConfig;
use crate::error::ConfigError;
use crate::fault::{FaultCode, FaultState};
use crate::feedback::{FeedbackSink, IdlePattern};
use crate::logging::LogStream;
use crate::sequencer::{SymbolSequencer, SymbolTiming};
use crate::{tx_debug, tx_info, tx_warn};

/// Controller state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Idle,
    Transmitting,
    Flushing,
    Cooldown,
}

/// Summary of one completed burst.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BurstReport {
    /// Burst number since boot, starting at 1.
    pub burst: u32,
    /// Passes over the word stream.
    pub passes: u32,
    /// Words handed to the sequencer, flush word included.
    pub words_enqueued: u64,
    /// Time from the flush word to the end of cooldown.
    pub cooldown_us: i64,
    /// Indicator calls that failed.
    pub feedback_errors: u32,
    /// Idle ticks the sequencer emitted before the flush word was queued.
    pub starved_ticks: u32,
}

/// Where the controller reports what it did.
#[derive(Clone, Copy)]
pub struct Diagnostics<'a> {
    pub log: &'a LogStream,
    pub fault: &'a FaultState,
}

/// Burst state machine over a sequencer, an indicator and a clock.
///
/// # Example
///
/// ```
/// use rust_ook_opener::clock::Clock;
/// use rust_ook_opener::config::TransmitConfig;
/// use rust_ook_opener::controller::{Diagnostics, TransmissionController};
/// use rust_ook_opener::fault::FaultState;
/// use rust_ook_opener::feedback::NoFeedback;
/// use rust_ook_opener::logging::LogStream;
/// use rust_ook_opener::sequencer::SimulatedSequencer;
/// use rust_ook_opener::signal::SIGNAL_WORDS;
///
/// struct Virtual(i64);
/// impl Clock for Virtual {
///     fn now_us(&self) -> i64 { self.0 }
///     fn delay_ms(&mut self, ms: u32) { self.0 += ms as i64 * 1000; }
/// }
///
/// let log = LogStream::new();
/// let fault = FaultState::new();
/// let config = TransmitConfig::default();
/// let sim: SimulatedSequencer = SimulatedSequencer::new();
///
/// let mut tx = TransmissionController::new(
///     &config, &SIGNAL_WORDS, sim, NoFeedback, Virtual(0),
///     Diagnostics { log: &log, fault: &fault },
/// ).unwrap();
///
/// let report = tx.run_burst();
/// assert_eq!(report.words_enqueued, 10 * 11 + 1);
/// ```
pub struct TransmissionController<'a, S, F, C>
where
    S: SymbolSequencer,
    F: FeedbackSink,
    C: Clock,
{
    config: &'a TransmitConfig,
    words: &'a [u32],
    sequencer: S,
    feedback: F,
    clock: C,
    diag: Diagnostics<'a>,
    timing: SymbolTiming,

    // FSM state
    state: State,
    passes: u32,

    // Current burst bookkeeping
    burst: u32,
    burst_words: u64,
    feedback_errors: u32,
    starved_at_start: u32,
    burst_starved: u32,
    cooldown_started_us: i64,

    report: BurstReport,
}

impl<'a, S, F, C> TransmissionController<'a, S, F, C>
where
    S: SymbolSequencer,
    F: FeedbackSink,
    C: Clock,
{
    /// Validate `config`, start the sequencer and park in `Idle`.
    ///
    /// `words` is the precomputed word stream, sent unchanged every pass.
    /// Any configuration problem is returned before a single word is queued.
    pub fn new(
        config: &'a TransmitConfig,
        words: &'a [u32],
        mut sequencer: S,
        feedback: F,
        clock: C,
        diag: Diagnostics<'a>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let timing = sequencer.start(config.frequency_hz, config.output_pin)?;

        tx_info!(
            diag.log,
            clock.now_us(),
            "tx ready: GPIO{} {} Hz ({} us/symbol), {} words x {} passes",
            config.output_pin,
            timing.frequency_hz,
            timing.period_us(),
            words.len(),
            config.repeat_count
        );

        let mut controller = Self {
            config,
            words,
            sequencer,
            feedback,
            clock,
            diag,
            timing,
            state: State::Idle,
            passes: 0,
            burst: 0,
            burst_words: 0,
            feedback_errors: 0,
            starved_at_start: 0,
            burst_starved: 0,
            cooldown_started_us: 0,
            report: BurstReport::default(),
        };

        let result = controller.feedback.set_activity(false);
        controller.note_feedback(result, "init");

        Ok(controller)
    }

    /// Do the current state's work and move to the next state.
    pub fn step(&mut self) -> State {
        self.state = match self.state {
            State::Idle => self.begin_burst(),
            State::Transmitting => self.transmit_pass(),
            State::Flushing => self.flush(),
            State::Cooldown => self.cooldown(),
        };
        self.state
    }

    /// Step until the current (or next) burst has finished its cooldown.
    pub fn run_burst(&mut self) -> BurstReport {
        while self.step() != State::Idle {}
        self.report
    }

    /// Transmit bursts forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.run_burst();
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Passes completed in the current burst.
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Report of the last completed burst.
    pub fn last_report(&self) -> BurstReport {
        self.report
    }

    /// Timing the sequencer was started with.
    pub fn timing(&self) -> SymbolTiming {
        self.timing
    }

    pub fn sequencer(&self) -> &S {
        &self.sequencer
    }

    pub fn sequencer_mut(&mut self) -> &mut S {
        &mut self.sequencer
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // --- State handlers ---

    fn begin_burst(&mut self) -> State {
        self.burst = self.burst.wrapping_add(1);
        self.passes = 0;
        self.burst_words = 0;
        self.feedback_errors = 0;
        self.burst_starved = 0;

        tx_debug!(self.diag.log, self.clock.now_us(), "burst {} start", self.burst);
        State::Transmitting
    }

    fn transmit_pass(&mut self) -> State {
        let words = self.words;
        for (i, &word) in words.iter().enumerate() {
            self.sequencer.enqueue(word);
            if self.passes == 0 && i == 0 {
                // The line was idle before this word; count starvation from here.
                self.starved_at_start = self.sequencer.starved_ticks();
            }
        }
        self.burst_words += words.len() as u64;
        self.passes += 1;

        let result = self.feedback.pass_complete();
        self.note_feedback(result, "pass");

        if self.config.pass_delay_ms > 0 {
            self.clock.delay_ms(self.config.pass_delay_ms);
        }

        if self.passes >= self.config.repeat_count {
            State::Flushing
        } else {
            State::Transmitting
        }
    }

    fn flush(&mut self) -> State {
        self.sequencer.flush_to_zero();
        // Nothing after the flush word can starve the burst itself.
        self.burst_starved = self
            .sequencer
            .starved_ticks()
            .wrapping_sub(self.starved_at_start);
        self.burst_words += 1;
        self.cooldown_started_us = self.clock.now_us();

        let result = self.feedback.set_activity(false);
        self.note_feedback(result, "activity off");
        let result = self.feedback.set_idle(false);
        self.note_feedback(result, "idle off");

        State::Cooldown
    }

    fn cooldown(&mut self) -> State {
        if let IdlePattern::Blink { count, on_ms, off_ms } = self.config.idle_pattern {
            for _ in 0..count {
                let result = self.feedback.set_idle(true);
                self.note_feedback(result, "idle on");
                self.clock.delay_ms(on_ms);

                let result = self.feedback.set_idle(false);
                self.note_feedback(result, "idle off");
                self.clock.delay_ms(off_ms);
            }
        }

        // Whatever the pattern and the indicator cost, the window is a lower bound.
        let deadline_us = self.cooldown_started_us + self.config.cooldown_ms as i64 * 1000;
        let remaining_ms = ms_until(self.clock.now_us(), deadline_us);
        if remaining_ms > 0 {
            self.clock.delay_ms(remaining_ms);
        }

        let now = self.clock.now_us();
        let starved = self.burst_starved;

        if self.feedback_errors > 0 {
            self.diag.fault.record(FaultCode::IndicatorFailure, self.feedback_errors);
        }
        if starved > 0 {
            self.diag.fault.record(FaultCode::FifoStarved, starved);
            tx_warn!(
                self.diag.log,
                now,
                "burst {}: fifo starved {} ticks",
                self.burst,
                starved
            );
        }

        self.report = BurstReport {
            burst: self.burst,
            passes: self.passes,
            words_enqueued: self.burst_words,
            cooldown_us: now - self.cooldown_started_us,
            feedback_errors: self.feedback_errors,
            starved_ticks: starved,
        };

        tx_info!(
            self.diag.log,
            now,
            "burst {} done: {} passes, {} words",
            self.burst,
            self.passes,
            self.burst_words
        );

        State::Idle
    }

    fn note_feedback<E: Debug>(&mut self, result: Result<(), E>, what: &str) {
        if let Err(e) = result {
            self.feedback_errors = self.feedback_errors.saturating_add(1);
            tx_warn!(
                self.diag.log,
                self.clock.now_us(),
                "indicator {} failed: {:?}",
                what,
                e
            );
        }
    }
}
