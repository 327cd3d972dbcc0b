//! Change-Notification Channel
#![allow(unsafe_code)] // Required for the lock-free ring buffer
//!
//! ## Overview
//!
//! State-changed notifications are pushed onto a bounded queue rather than
//! dispatched through callbacks. The polling loop (or an interrupt-fed
//! attribute) produces [`ChangeEvent`]s; a telemetry/export task consumes
//! them on its own schedule. This decouples producer timing from consumer
//! latency and removes the re-entrancy hazards of inline delegates: a slow
//! consumer can never stall a fetch cycle.
//!
//! ## Algorithm
//!
//! A ring buffer with atomic head/tail pointers, single producer and single
//! consumer:
//!
//! ```text
//! ┌─────┬─────┬─────┬─────┬─────┬─────┬─────┬─────┐
//! │  0  │  1  │  2  │  3  │  4  │  5  │  6  │  7  │
//! └─────┴─────┴─────┴─────┴─────┴─────┴─────┴─────┘
//!          ↑                       ↑
//!        tail                    head
//!        (next read)          (next write)
//! ```
//!
//! - `push`: load tail (Acquire), write the slot, publish head (Release).
//! - `pop`: load head (Acquire), read the slot, publish tail (Release).
//!
//! When the queue is full, `push` drops the event and counts the drop; there
//! is no backpressure here: the caller chooses the capacity and
//! monitors [`ChangeQueue::dropped`].

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::state::InlineString;
use crate::time::Timestamp;

/// One attribute change, as observed by a fetch cycle or an edge callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeEvent {
    /// Which sensor produced the change.
    pub sensor_id: InlineString,
    /// Attribute telemetry key.
    pub key: InlineString,
    /// New value in physical units.
    pub value: f64,
    /// New value in scaled telemetry encoding.
    pub scaled: i64,
    /// Value held before the change, if any.
    pub previous: Option<f64>,
    /// How long the previous value was held, in milliseconds.
    pub held_ms: u64,
    /// When the change was observed.
    pub timestamp: Timestamp,
}

/// Bounded single-producer single-consumer change queue.
///
/// `N` must be a power of two; one slot is sacrificed to distinguish full
/// from empty, so a queue of 64 holds 63 events.
pub struct ChangeQueue<const N: usize> {
    /// Ring buffer storage; interior mutability coordinated by the atomics.
    buffer: UnsafeCell<[MaybeUninit<ChangeEvent>; N]>,
    /// Next write position (producer owned).
    head: AtomicUsize,
    /// Next read position (consumer owned).
    tail: AtomicUsize,
    /// Events dropped because the queue was full.
    dropped: AtomicU32,
}

// One producer and one consumer may touch the queue from different threads;
// the Acquire/Release pairs on head/tail order the slot accesses.
unsafe impl<const N: usize> Sync for ChangeQueue<N> {}

impl<const N: usize> ChangeQueue<N> {
    /// New empty queue. Usable in a `static`.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "queue capacity must be a power of two");
        Self {
            // An array of MaybeUninit needs no initialization.
            buffer: UnsafeCell::new(unsafe { MaybeUninit::uninit().assume_init() }),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push an event. Returns `false` (and counts a drop) when full.
    ///
    /// Safe for exactly one producer at a time.
    pub fn push(&self, event: ChangeEvent) -> bool {
        let head = self.head.load(Ordering::Acquire);
        let next_head = (head + 1) & (N - 1);

        if next_head == self.tail.load(Ordering::Acquire) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        unsafe {
            (*self.buffer.get())[head].write(event);
        }
        self.head.store(next_head, Ordering::Release);
        true
    }

    /// Pop the oldest event, if any.
    ///
    /// Safe for exactly one consumer at a time.
    pub fn pop(&self) -> Option<ChangeEvent> {
        let tail = self.tail.load(Ordering::Acquire);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }

        let event = unsafe { (*self.buffer.get())[tail].assume_init_read() };
        self.tail.store((tail + 1) & (N - 1), Ordering::Release);
        Some(event)
    }

    /// Events currently queued.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail) & (N - 1)
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total events dropped since construction.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for ChangeQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
