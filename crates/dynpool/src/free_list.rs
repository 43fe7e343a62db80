//! Lock-free Treiber stack of slot indices.
//!
//! The head packs a slot index (low 32 bits) with a version stamp (high 32
//! bits) that advances on every successful exchange. A slot popped and pushed
//! back between another thread's load and compare-exchange therefore no
//! longer matches that thread's expected head, which closes the ABA window of
//! a plain pointer stack. The stamp wraps after 2^32 exchanges.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::utils::{Backoff, CachePadded};

use crate::arena::{Slot, SlotArena, NIL};

#[inline]
fn pack(stamp: u32, index: u32) -> u64 {
    (u64::from(stamp) << 32) | u64::from(index)
}

#[inline]
#[allow(clippy::cast_possible_truncation)]
fn unpack(head: u64) -> (u32, u32) {
    ((head >> 32) as u32, head as u32)
}

pub(crate) struct TaggedStack {
    head: CachePadded<AtomicU64>,
}

impl TaggedStack {
    pub(crate) fn new() -> Self {
        Self {
            head: CachePadded::new(AtomicU64::new(pack(0, NIL))),
        }
    }

    /// Push the slot at `index` onto the stack.
    pub(crate) fn push(&self, index: u32, slot: &Slot) {
        let backoff = Backoff::new();
        let mut head = self.head.load(Ordering::Acquire);
        loop {
            let (stamp, top) = unpack(head);
            slot.next.store(top, Ordering::Relaxed);
            match self.head.compare_exchange_weak(
                head,
                pack(stamp.wrapping_add(1), index),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(current) => {
                    head = current;
                    backoff.spin();
                }
            }
        }
    }

    /// Pop the top slot, or `None` when the stack is empty.
    pub(crate) fn pop<'a>(&self, arena: &'a SlotArena) -> Option<(u32, &'a Slot)> {
        let backoff = Backoff::new();
        let mut head = self.head.load(Ordering::Acquire);
        loop {
            let (stamp, top) = unpack(head);
            if top == NIL {
                return None;
            }
            // An index only reaches a stack after its slot was published.
            let slot = arena.get(top)?;
            let next = slot.next.load(Ordering::Acquire);
            match self.head.compare_exchange_weak(
                head,
                pack(stamp.wrapping_add(1), next),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some((top, slot)),
                Err(current) => {
                    head = current;
                    backoff.spin();
                }
            }
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        unpack(self.head.load(Ordering::Acquire)).1 == NIL
    }
}
