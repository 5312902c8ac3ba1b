//! Per-tick output shifter.
//!
//! One call to [`OutputShifter::tick`] is one symbol period on the line.
//! Words are taken from the FIFO only when the previous word's 32 bits are
//! used up, then shifted out LSB first.
//!
//! ```text
//! FIFO: [w0][w1]...      tick:  0    1    2   ...  31   32   33
//!                        bit:   w0.0 w0.1 w0.2 ... w0.31 w1.0 w1.1
//! ```
//!
//! If the FIFO is empty at a word boundary the tick emits [`IDLE_LEVEL`] and
//! is counted as starved; the next tick tries again.
//!
//! RT-safe: no allocation, no blocking, callable from the RMT ISR.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::encoder::WORD_BITS;
use crate::fifo::WordFifo;

/// Line level while the FIFO is starved (carrier off).
pub const IDLE_LEVEL: bool = false;

/// Counters updated from the shifter, read from task context.
pub struct SequencerStats {
    words_consumed: AtomicU32,
    starved_ticks: AtomicU32,
}

impl SequencerStats {
    pub const fn new() -> Self {
        Self {
            words_consumed: AtomicU32::new(0),
            starved_ticks: AtomicU32::new(0),
        }
    }

    /// Words taken out of the FIFO since boot.
    #[inline]
    pub fn words_consumed(&self) -> u32 {
        self.words_consumed.load(Ordering::Relaxed)
    }

    /// Ticks emitted at idle level because the FIFO was empty.
    #[inline]
    pub fn starved_ticks(&self) -> u32 {
        self.starved_ticks.load(Ordering::Relaxed)
    }
}

impl Default for SequencerStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Bit emitter state between ticks.
#[derive(Clone, Copy, Debug, Default)]
pub struct OutputShifter {
    word: u32,
    remaining: u32,
}

impl OutputShifter {
    pub const fn new() -> Self {
        Self { word: 0, remaining: 0 }
    }

    /// Produce the line level for the next symbol period.
    #[inline]
    pub fn tick<const N: usize>(&mut self, fifo: &WordFifo<N>, stats: &SequencerStats) -> bool {
        if self.remaining == 0 {
            match fifo.pop() {
                Some(word) => {
                    self.word = word;
                    self.remaining = WORD_BITS;
                    stats.words_consumed.fetch_add(1, Ordering::Relaxed);
                }
                None => {
                    stats.starved_ticks.fetch_add(1, Ordering::Relaxed);
                    return IDLE_LEVEL;
                }
            }
        }

        let bit = self.word & 1 != 0;
        self.word >>= 1;
        self.remaining -= 1;
        bit
    }

    /// True while a word is partially shifted out.
    #[inline]
    pub fn is_mid_word(&self) -> bool {
        self.remaining != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shifts_lsb_first() {
        let fifo = WordFifo::<4>::new();
        let stats = SequencerStats::new();
        let mut shifter = OutputShifter::new();

        fifo.try_push(0b1101).unwrap();

        let bits: Vec<bool> = (0..32).map(|_| shifter.tick(&fifo, &stats)).collect();
        assert_eq!(&bits[..4], &[true, false, true, true]);
        assert!(bits[4..].iter().all(|&b| !b));
        assert!(!shifter.is_mid_word());
        assert_eq!(stats.words_consumed(), 1);
        assert_eq!(stats.starved_ticks(), 0);
    }

    #[test]
    fn test_starvation_holds_idle() {
        let fifo = WordFifo::<4>::new();
        let stats = SequencerStats::new();
        let mut shifter = OutputShifter::new();

        for _ in 0..5 {
            assert_eq!(shifter.tick(&fifo, &stats), IDLE_LEVEL);
        }
        assert_eq!(stats.starved_ticks(), 5);

        // Next word starts on the very next tick
        fifo.try_push(1).unwrap();
        assert!(shifter.tick(&fifo, &stats));
        assert_eq!(stats.starved_ticks(), 5);
    }

    #[test]
    fn test_no_starvation_between_back_to_back_words() {
        let fifo = WordFifo::<4>::new();
        let stats = SequencerStats::new();
        let mut shifter = OutputShifter::new();

        fifo.try_push(u32::MAX).unwrap();
        fifo.try_push(u32::MAX).unwrap();

        assert!((0..64).all(|_| shifter.tick(&fifo, &stats)));
        assert_eq!(stats.starved_ticks(), 0);
        assert_eq!(stats.words_consumed(), 2);
    }
}
