//! Module: encoder
//!
//! Purpose: Packs an OOK bit sequence into the 32-bit words the sequencer
//! FIFO accepts.
//!
//! Packing rule:
//! - The sequence is cut into consecutive chunks of `width` bits
//! - Bit `i` of chunk `k` lands in bit position `i` of word `k` (LSB first)
//! - Unused high-order positions of the final word stay zero
//!
//! ```text
//! bits:  1 0 1 1            width 32
//! word:  0b...0000_1101  =  13
//! ```
//!
//! The trailing zeros of the last word are what separates two passes on air,
//! so a pass of the domain signal always ends with a low interval.
//!
//! Safety: Safe. Pure functions, no allocation.

/// Native word width of the sequencer FIFO.
pub const WORD_BITS: u32 = 32;

/// Number of words needed for `len` bits at `width` bits per word.
#[inline]
pub const fn word_count(len: usize, width: u32) -> usize {
    let width = clamp_width(width) as usize;
    len / width + (len % width != 0) as usize
}

#[inline]
const fn clamp_width(width: u32) -> u32 {
    if width == 0 {
        1
    } else if width > WORD_BITS {
        WORD_BITS
    } else {
        width
    }
}

/// Encode a bit sequence into a word stream.
///
/// Any non-zero element counts as a `1`. `width` is clamped to `1..=32`.
/// Always succeeds; an empty input yields no words.
///
/// # Example
///
/// ```
/// use rust_ook_opener::encoder::encode;
///
/// let words: Vec<u32> = encode(&[1, 0, 1, 1], 32).collect();
/// assert_eq!(words, [13]);
/// ```
pub fn encode(bits: &[u8], width: u32) -> Words<'_> {
    let width = clamp_width(width) as usize;
    Words {
        chunks: bits.chunks(width),
    }
}

/// Iterator over packed words, created by [`encode`].
#[derive(Clone, Debug)]
pub struct Words<'a> {
    chunks: core::slice::Chunks<'a, u8>,
}

impl<'a> Iterator for Words<'a> {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        self.chunks.next().map(pack_chunk)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl<'a> ExactSizeIterator for Words<'a> {}

#[inline]
fn pack_chunk(chunk: &[u8]) -> u32 {
    chunk
        .iter()
        .enumerate()
        .fold(0u32, |word, (i, &bit)| if bit != 0 { word | (1 << i) } else { word })
}

/// Compile-time packing at the native 32-bit width.
///
/// `W` must equal `word_count(N, 32)`; a mismatch fails const evaluation.
///
/// ```
/// use rust_ook_opener::encoder::pack;
///
/// const WORDS: [u32; 1] = pack::<4, 1>(&[1, 0, 1, 1]);
/// assert_eq!(WORDS, [13]);
/// ```
pub const fn pack<const N: usize, const W: usize>(bits: &[u8; N]) -> [u32; W] {
    assert!(W == word_count(N, WORD_BITS), "word array length does not match bit count");

    let mut words = [0u32; W];
    let mut i = 0;
    while i < N {
        if bits[i] != 0 {
            words[i / WORD_BITS as usize] |= 1 << (i % WORD_BITS as usize);
        }
        i += 1;
    }
    words
}

/// Unpack `len` bits from a word stream, LSB first.
///
/// Inverse of [`encode`] for the same `width`. Asking for more bits than the
/// words carry yields only the bits available.
pub fn unpack(words: &[u32], width: u32, len: usize) -> impl Iterator<Item = u8> + '_ {
    let width = clamp_width(width) as usize;
    words
        .iter()
        .flat_map(move |&word| (0..width).map(move |i| ((word >> i) & 1) as u8))
        .take(len)
}
