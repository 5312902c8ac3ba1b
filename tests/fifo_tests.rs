//! Word FIFO tests with the shifter as consumer

use std::sync::Arc;
use std::thread;

use rust_ook_opener::fifo::{WordFifo, DEFAULT_FIFO_WORDS};
use rust_ook_opener::sequencer::{OutputShifter, SequencerStats, IDLE_LEVEL};

#[test]
fn test_default_capacity() {
    let fifo: WordFifo = WordFifo::new();
    assert_eq!(fifo.capacity(), DEFAULT_FIFO_WORDS);
    assert!(fifo.is_empty());
    assert_eq!(fifo.len(), 0);
}

#[test]
fn test_fill_and_drain_keeps_order() {
    let fifo = WordFifo::<8>::new();
    for round in 0..3u32 {
        for i in 0..8 {
            fifo.try_push(round * 100 + i).unwrap();
        }
        assert!(fifo.is_full());
        assert_eq!(fifo.try_push(999), Err(999));

        let drained: Vec<u32> = std::iter::from_fn(|| fifo.pop()).collect();
        assert_eq!(drained, (0..8).map(|i| round * 100 + i).collect::<Vec<_>>());
    }
}

#[test]
fn test_shifter_thread_sees_every_bit() {
    // Producer thread blocks on a full FIFO; consumer thread plays the ISR.
    const WORDS: u32 = 2_000;

    let fifo = Arc::new(WordFifo::<4>::new());
    let stats = Arc::new(SequencerStats::new());

    let producer = {
        let fifo = Arc::clone(&fifo);
        thread::spawn(move || {
            for i in 0..WORDS {
                let word = i.wrapping_mul(0x9E37_79B9);
                while fifo.try_push(word).is_err() {
                    thread::yield_now();
                }
            }
        })
    };

    let consumer = {
        let fifo = Arc::clone(&fifo);
        let stats = Arc::clone(&stats);
        thread::spawn(move || {
            let mut shifter = OutputShifter::new();
            let mut words = Vec::with_capacity(WORDS as usize);
            let mut current = 0u32;
            let mut bit = 0u32;

            while stats.words_consumed() < WORDS || shifter.is_mid_word() {
                let before = stats.words_consumed();
                let starved_before = stats.starved_ticks();
                let level = shifter.tick(&*fifo, &stats);

                if stats.starved_ticks() != starved_before {
                    assert_eq!(level, IDLE_LEVEL);
                    thread::yield_now();
                    continue;
                }
                if stats.words_consumed() != before {
                    current = 0;
                    bit = 0;
                }
                if level {
                    current |= 1 << bit;
                }
                bit += 1;
                if bit == 32 {
                    words.push(current);
                }
            }
            words
        })
    };

    producer.join().unwrap();
    let words = consumer.join().unwrap();

    assert_eq!(words.len(), WORDS as usize);
    for (i, &word) in words.iter().enumerate() {
        assert_eq!(word, (i as u32).wrapping_mul(0x9E37_79B9), "word {}", i);
    }
}
