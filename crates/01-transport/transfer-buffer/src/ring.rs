//! Fixed-capacity slot ring and the state flags that travel with it.
//!
//! ```text
//!   pop_cursor            push_cursor
//!       v                      v
//! +-----+-----+-----+-----+-----+-----+
//! |  -  |  a  |  b  |  c  |  -  |  -  |   capacity = 6, len = 3
//! +-----+-----+-----+-----+-----+-----+
//! ```
//!
//! Cursors advance modulo capacity. When they meet, `full` and `empty`
//! disambiguate: the last mutation decides which one holds. Every field is
//! only touched under the buffer's lock, so one lock acquisition always sees
//! a consistent snapshot of the ring and its flags.

use crate::error::{BufferFailure, RingFault};

pub(crate) struct Ring<T> {
    slots: Box<[Option<T>]>,
    push_cursor: usize,
    pop_cursor: usize,
    full: bool,
    empty: bool,
    pub(crate) finished: bool,
    pub(crate) waiting_pusher: bool,
    pub(crate) failure: Option<BufferFailure>,
}

impl<T> Ring<T> {
    /// `capacity` must be non-zero; the buffer validates it before construction.
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "ring capacity must be non-zero");
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            push_cursor: 0,
            pop_cursor: 0,
            full: false,
            empty: true,
            finished: false,
            waiting_pusher: false,
            failure: None,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn len(&self) -> usize {
        if self.full {
            self.capacity()
        } else {
            (self.push_cursor + self.capacity() - self.pop_cursor) % self.capacity()
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.full
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.empty
    }

    pub(crate) fn push_cursor(&self) -> usize {
        self.push_cursor
    }

    pub(crate) fn pop_cursor(&self) -> usize {
        self.pop_cursor
    }

    /// Stores `value` at the push cursor and advances it. Returns the slot index written.
    pub(crate) fn write(&mut self, value: T, is_final: bool) -> Result<usize, RingFault> {
        let index = self.push_cursor;
        let slot = &mut self.slots[index];
        if slot.is_some() {
            return Err(RingFault::SlotOccupied { index });
        }
        *slot = Some(value);

        self.push_cursor = (index + 1) % self.capacity();
        self.full = self.push_cursor == self.pop_cursor;
        self.empty = false;
        if is_final {
            self.finished = true;
        }
        Ok(index)
    }

    /// Takes the value at the pop cursor and advances it.
    pub(crate) fn read(&mut self) -> Result<T, RingFault> {
        let index = self.pop_cursor;
        let value = self.slots[index]
            .take()
            .ok_or(RingFault::SlotVacant { index })?;

        self.pop_cursor = (index + 1) % self.capacity();
        self.empty = self.pop_cursor == self.push_cursor;
        self.full = false;
        Ok(value)
    }
}
