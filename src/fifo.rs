//! Lock-free SPSC (Single Producer, Single Consumer) rings.
//!
//! [`SpscRing`] carries any `Copy` item. Two instances exist in the firmware:
//!
//! ```text
//! Controller ──try_push()──▶ WordFifo ──pop()──▶ OutputShifter (RMT ISR)
//!  (task)                    (u32 words)          (one bit per tick)
//!
//! tx_info!() ──try_push()──▶ LogStream ──pop()──▶ UART drain thread
//!                            (LogEntry)
//! ```
//!
//! # Rules
//!
//! - Exactly one producer and one consumer per ring
//! - Items are never overwritten or reordered
//! - A full ring hands the item back; blocking or dropping is the caller's call
//! - Only atomic operations for synchronization

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU32, Ordering};

/// Default FIFO depth: 16 words.
/// At 2.5 kHz one word lasts 12.8 ms, so a full FIFO holds ~205 ms of signal.
pub const DEFAULT_FIFO_WORDS: usize = 16;

/// Word FIFO between the controller and the sequencer.
pub type WordFifo<const N: usize = DEFAULT_FIFO_WORDS> = SpscRing<u32, N>;

/// Bounded lock-free ring.
///
/// # Safety
///
/// Slots are only touched through the indices:
/// - the producer writes the slot at `tail`, then publishes `tail` (`Release`)
/// - the consumer reads the slot at `head` after loading `tail` (`Acquire`),
///   then frees it by publishing `head` (`Release`)
///
/// A slot is read only after it was written, so no uninitialized item is
/// ever observed.
pub struct SpscRing<T: Copy, const N: usize> {
    slots: UnsafeCell<[MaybeUninit<T>; N]>,
    /// Next slot to read (monotonic, wraps via mask).
    head: AtomicU32,
    /// Next slot to write (monotonic, wraps via mask).
    tail: AtomicU32,
}

// SAFETY: Single producer, single consumer, atomic coordination.
unsafe impl<T: Copy + Send, const N: usize> Sync for SpscRing<T, N> {}
unsafe impl<T: Copy + Send, const N: usize> Send for SpscRing<T, N> {}

impl<T: Copy, const N: usize> SpscRing<T, N> {
    const MASK: usize = N - 1;

    /// Create an empty ring.
    ///
    /// # Panics
    ///
    /// Panics at compile time if N is not a power of 2.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "ring depth must be power of 2");

        Self {
            // SAFETY: an array of `MaybeUninit` needs no initialization.
            slots: UnsafeCell::new(unsafe { MaybeUninit::uninit().assume_init() }),
            head: AtomicU32::new(0),
            tail: AtomicU32::new(0),
        }
    }

    /// Append an item (producer side).
    ///
    /// Hands the item back as `Err` if the ring is full. Never blocks.
    #[inline]
    pub fn try_push(&self, item: T) -> Result<(), T> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if tail.wrapping_sub(head) >= N as u32 {
            return Err(item);
        }

        // SAFETY: the consumer cannot see this slot until `tail` is published.
        unsafe {
            (*self.slots.get())[(tail as usize) & Self::MASK].write(item);
        }

        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Take the oldest item (consumer side).
    ///
    /// Returns `None` if the ring is empty. Safe to call from interrupt context.
    #[inline]
    pub fn pop(&self) -> Option<T> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        if head == tail {
            return None;
        }

        // SAFETY: the slot was written before `tail` moved past it and is not
        // rewritten until `head` moves past it.
        let item = unsafe { (*self.slots.get())[(head as usize) & Self::MASK].assume_init_read() };

        self.head.store(head.wrapping_add(1), Ordering::Release);
        Some(item)
    }

    /// Items waiting.
    #[inline]
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        tail.wrapping_sub(head) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= N
    }

    /// Ring depth in items.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T: Copy, const N: usize> Default for SpscRing<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
