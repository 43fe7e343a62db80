//! Append-only slot arena backing a pool's free lists.
//!
//! Slots are addressed by `u32` index and live in segments of 32, 64, 128, …
//! slots. A segment is allocated the first time an index inside it is
//! reserved and is never moved or freed while the arena lives, so a slot
//! reference obtained from an index stays valid for the arena's lifetime.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use parking_lot::Mutex;

/// Index value meaning "no slot".
pub(crate) const NIL: u32 = u32::MAX;

const FIRST_SEGMENT_BITS: u32 = 5;
const FIRST_SEGMENT_LEN: usize = 1 << FIRST_SEGMENT_BITS;
const SEGMENT_COUNT: usize = 27;

/// Total number of slots an arena can hand out; always below [`NIL`].
pub(crate) const CAPACITY: u32 = (FIRST_SEGMENT_LEN as u32) * ((1 << SEGMENT_COUNT) - 1);

/// One arena entry: a free-list link and the parked payload of an idle block.
pub(crate) struct Slot {
    pub(crate) next: AtomicU32,
    // Only the thread that owns the slot (the one that popped it, or the
    // holder of the block) touches the cell, so the lock is never contended.
    parked: Mutex<Option<Box<[u8]>>>,
}

impl Slot {
    fn new() -> Self {
        Self {
            next: AtomicU32::new(NIL),
            parked: Mutex::new(None),
        }
    }

    /// Store an idle block's payload in the slot.
    pub(crate) fn park(&self, payload: Box<[u8]>) {
        let previous = self.parked.lock().replace(payload);
        debug_assert!(previous.is_none(), "slot already held a payload");
    }

    /// Take the parked payload back out.
    pub(crate) fn unpark(&self) -> Option<Box<[u8]>> {
        self.parked.lock().take()
    }
}

pub(crate) struct SlotArena {
    segments: [OnceLock<Box<[Slot]>>; SEGMENT_COUNT],
    reserved: AtomicU32,
}

impl SlotArena {
    pub(crate) fn new() -> Self {
        Self {
            segments: std::array::from_fn(|_| OnceLock::new()),
            reserved: AtomicU32::new(0),
        }
    }

    /// Map a slot index to its (segment, offset) position.
    fn locate(index: u32) -> (usize, usize) {
        let bucket = (index >> FIRST_SEGMENT_BITS) + 1;
        let segment = (u32::BITS - 1 - bucket.leading_zeros()) as usize;
        let offset = index as usize - FIRST_SEGMENT_LEN * ((1 << segment) - 1);
        (segment, offset)
    }

    /// Slot at `index`, if it has been reserved and published.
    pub(crate) fn get(&self, index: u32) -> Option<&Slot> {
        let (segment, offset) = Self::locate(index);
        self.segments.get(segment)?.get()?.get(offset)
    }

    /// Reserve a never-used slot, growing the arena by one segment if needed.
    ///
    /// Returns `None` once [`CAPACITY`] slots have been handed out.
    pub(crate) fn reserve(&self) -> Option<(u32, &Slot)> {
        let index = self
            .reserved
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                (n < CAPACITY).then_some(n + 1)
            })
            .ok()?;
        let (segment, offset) = Self::locate(index);
        let slots = self.segments[segment]
            .get_or_init(|| (0..FIRST_SEGMENT_LEN << segment).map(|_| Slot::new()).collect());
        Some((index, &slots[offset]))
    }

    /// Number of slots handed out so far.
    pub(crate) fn reserved(&self) -> u32 {
        self.reserved.load(Ordering::Relaxed)
    }
}
