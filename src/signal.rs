//! Module: signal
//!
//! Purpose: The fixed charge-port OOK sequence and its burst parameters.
//!
//! The sequence is a domain constant: 333 symbols at 2.5 kHz (400 µs each),
//! one element per symbol period, `1` = carrier on. It is packed into
//! 32-bit words at compile time, so nothing is computed at boot.
//!
//! Safety: Safe. Constants only.

use crate::encoder::{pack, word_count, WORD_BITS};

/// Symbol rate of the latch signal.
pub const SYMBOL_RATE_HZ: u32 = 2500;

/// Passes over the word stream per burst.
pub const REPEAT_COUNT: u32 = 10;

/// Quiet window after each burst.
pub const COOLDOWN_MS: u32 = 3000;

/// Number of symbols in [`DOMAIN_SIGNAL`].
pub const SIGNAL_LEN: usize = 333;

/// Number of FIFO words per pass.
pub const SIGNAL_WORD_COUNT: usize = word_count(SIGNAL_LEN, WORD_BITS);

/// Charge-port opener sequence, one entry per symbol.
#[rustfmt::skip]
pub const DOMAIN_SIGNAL: [u8; SIGNAL_LEN] = [
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 1, 0, 1, 0, 1, 1, 0, 0, 1,
    0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0, 1,
    0, 0, 1, 1, 0, 1, 0, 0, 1, 0, 1, 1, 0, 1, 0, 1, 0, 0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 0, 1, 1, 0, 1, 0, 0, 1, 1, 0,
    0, 1, 0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 0, 1, 0, 1, 1, 0, 0, 0, 1, 0, 1, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0, 0, 1, 1, 0,
    0, 1, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0, 1, 0, 0, 1, 1, 0, 1, 0, 0,
    1, 0, 1, 1, 0, 1, 0, 1, 0, 0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 0, 1, 1, 0, 1, 0, 0, 1, 1, 0, 0, 1, 0, 1, 0, 1, 0, 1,
    1, 0, 1, 0, 0, 1, 0, 1, 1, 0, 0, 0, 1, 0, 1, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0, 0, 1,
    1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 0, 1, 1, 0, 1, 0, 0, 1, 1, 0, 1, 0, 0, 1, 0, 1, 1, 0, 1, 0, 1,
    0, 0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 0, 1, 1, 0, 1, 0, 0, 1, 1, 0, 0, 1, 0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 0, 1, 0, 1,
];

/// [`DOMAIN_SIGNAL`] packed LSB-first into sequencer words.
pub const SIGNAL_WORDS: [u32; SIGNAL_WORD_COUNT] = pack::<SIGNAL_LEN, SIGNAL_WORD_COUNT>(&DOMAIN_SIGNAL);

/// Meaningful bits in the final word of a pass.
pub const LAST_WORD_BITS: u32 = (SIGNAL_LEN % WORD_BITS as usize) as u32;
