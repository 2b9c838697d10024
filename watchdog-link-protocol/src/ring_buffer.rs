//! Fixed-capacity circular byte buffer.
//!
//! Backs both directions of the link. A single producer appends bytes (either
//! directly with [`RingBuffer::enqueue`] or through the two-phase
//! [`RingBuffer::reserve_tail`] / [`RingBuffer::commit_tail`] pair used from
//! interrupt context) and a single consumer drains them in order.
//!
//! `count` is the only source of truth for fullness: `head == tail` holds
//! both when the buffer is empty and when it is full.

/// Errors reported by ring buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RingBufferError {
    /// No free slot for another byte
    Full,
    /// `commit_tail` called without an outstanding reservation
    NoReservation,
    /// `commit_tail` would exceed capacity; the reserved byte is lost
    Overflow,
}

/// Circular byte buffer with compile-time capacity `N`
#[derive(Debug, Clone)]
pub struct RingBuffer<const N: usize> {
    buf: [u8; N],
    head: usize,
    tail: usize,
    count: usize,
    reserved: bool,
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RingBuffer<N> {
    const CAPACITY: usize = {
        assert!(N > 0, "RingBuffer capacity must be > 0");
        N
    };

    /// Create an empty buffer
    pub const fn new() -> Self {
        let _ = Self::CAPACITY;
        Self {
            buf: [0; N],
            head: 0,
            tail: 0,
            count: 0,
            reserved: false,
        }
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        Self::CAPACITY
    }

    /// Number of bytes currently held
    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub const fn is_full(&self) -> bool {
        self.count == N
    }

    /// Number of bytes that can still be enqueued
    #[inline]
    pub const fn free(&self) -> usize {
        N - self.count
    }

    /// Drop all held bytes and any outstanding reservation
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
        self.reserved = false;
    }

    /// Append one byte
    ///
    /// Fails with [`RingBufferError::Full`] without touching any state when
    /// the buffer already holds `N` bytes.
    pub fn enqueue(&mut self, byte: u8) -> Result<(), RingBufferError> {
        debug_assert!(!self.reserved, "enqueue while a tail reservation is pending");

        if self.is_full() {
            return Err(RingBufferError::Full);
        }

        self.buf[self.tail] = byte;
        self.tail = (self.tail + 1) % N;
        self.count += 1;
        Ok(())
    }

    /// Append as many bytes from `data` as fit
    ///
    /// Returns the number of bytes appended.
    pub fn enqueue_slice(&mut self, data: &[u8]) -> usize {
        debug_assert!(!self.reserved, "enqueue_slice while a tail reservation is pending");

        let n = data.len().min(self.free());
        for &byte in &data[..n] {
            self.buf[self.tail] = byte;
            self.tail = (self.tail + 1) % N;
        }
        self.count += n;
        n
    }

    /// Append all of `data` or nothing
    pub fn enqueue_all(&mut self, data: &[u8]) -> Result<(), RingBufferError> {
        if data.len() > self.free() {
            return Err(RingBufferError::Full);
        }
        self.enqueue_slice(data);
        Ok(())
    }

    /// Remove and return the oldest byte
    pub fn dequeue(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }

        let byte = self.buf[self.head];
        self.head = (self.head + 1) % N;
        self.count -= 1;
        Some(byte)
    }

    /// Remove up to `out.len()` bytes into `out`, oldest first
    pub fn dequeue_into(&mut self, out: &mut [u8]) -> usize {
        let n = self.peek_all_ordered(out);
        self.consume(n)
    }

    /// Oldest byte without removing it
    pub fn peek(&self) -> Option<u8> {
        if self.is_empty() {
            None
        } else {
            Some(self.buf[self.head])
        }
    }

    /// Copy held bytes in dequeue order into `target` without consuming them
    ///
    /// Copies `min(len, target.len())` bytes and returns that count.
    pub fn peek_all_ordered(&self, target: &mut [u8]) -> usize {
        let n = self.count.min(target.len());
        let first = n.min(N - self.head);
        target[..first].copy_from_slice(&self.buf[self.head..self.head + first]);
        target[first..n].copy_from_slice(&self.buf[..n - first]);
        n
    }

    /// Discard up to `n` of the oldest bytes, returning how many were dropped
    pub fn consume(&mut self, n: usize) -> usize {
        let n = n.min(self.count);
        self.head = (self.head + n) % N;
        self.count -= n;
        n
    }

    /// Get the slot the next byte will occupy
    ///
    /// The producer writes exactly one byte through the returned reference and
    /// then calls [`commit_tail`](Self::commit_tail) to publish it. Only one
    /// reservation may be outstanding at a time; only one producer may use this
    /// pair on a given buffer.
    pub fn reserve_tail(&mut self) -> Result<&mut u8, RingBufferError> {
        debug_assert!(!self.reserved, "reserve_tail called twice without commit_tail");

        if self.is_full() {
            return Err(RingBufferError::Full);
        }

        self.reserved = true;
        Ok(&mut self.buf[self.tail])
    }

    /// Publish the byte written into the reserved slot
    pub fn commit_tail(&mut self) -> Result<(), RingBufferError> {
        if !self.reserved {
            return Err(RingBufferError::NoReservation);
        }
        self.reserved = false;

        if self.is_full() {
            return Err(RingBufferError::Overflow);
        }

        self.tail = (self.tail + 1) % N;
        self.count += 1;
        Ok(())
    }

    /// Whether a reservation is waiting for `commit_tail`
    #[inline]
    pub const fn has_reservation(&self) -> bool {
        self.reserved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_enqueue_dequeue_fifo() {
        let mut rb = RingBuffer::<4>::new();
        assert!(rb.is_empty());
        rb.enqueue(1).unwrap();
        rb.enqueue(2).unwrap();
        rb.enqueue(3).unwrap();
        assert_eq!(rb.len(), 3);
        assert_eq!(rb.dequeue(), Some(1));
        assert_eq!(rb.dequeue(), Some(2));
        assert_eq!(rb.dequeue(), Some(3));
        assert_eq!(rb.dequeue(), None);
    }

    #[test]
    fn test_enqueue_full_does_not_mutate() {
        let mut rb = RingBuffer::<3>::new();
        for b in 0..3 {
            rb.enqueue(b).unwrap();
        }
        let (tail, count, head) = (rb.tail, rb.count, rb.head);

        assert_eq!(rb.enqueue(0xFF), Err(RingBufferError::Full));
        assert_eq!(rb.tail, tail);
        assert_eq!(rb.count, count);
        assert_eq!(rb.head, head);
        assert_eq!(rb.dequeue(), Some(0));
    }

    #[test]
    fn test_full_and_empty_share_cursor_position() {
        let mut rb = RingBuffer::<2>::new();
        rb.enqueue(7).unwrap();
        rb.enqueue(8).unwrap();
        assert_eq!(rb.head, rb.tail);
        assert!(rb.is_full());
        rb.consume(2);
        assert_eq!(rb.head, rb.tail);
        assert!(rb.is_empty());
    }

    #[test]
    fn test_peek_all_ordered_across_wrap() {
        let mut rb = RingBuffer::<4>::new();
        rb.enqueue_all(&[1, 2, 3]).unwrap();
        rb.consume(2);
        rb.enqueue_all(&[4, 5, 6]).unwrap();

        let mut out = [0u8; 8];
        let n = rb.peek_all_ordered(&mut out);
        assert_eq!(&out[..n], &[3, 4, 5, 6]);
        // Non-destructive
        assert_eq!(rb.len(), 4);
        assert_eq!(rb.peek(), Some(3));
    }

    #[test]
    fn test_peek_all_ordered_short_target() {
        let mut rb = RingBuffer::<4>::new();
        rb.enqueue_all(&[9, 8, 7]).unwrap();
        let mut out = [0u8; 2];
        assert_eq!(rb.peek_all_ordered(&mut out), 2);
        assert_eq!(out, [9, 8]);
    }

    #[test]
    fn test_enqueue_all_is_all_or_nothing() {
        let mut rb = RingBuffer::<4>::new();
        rb.enqueue(1).unwrap();
        assert_eq!(rb.enqueue_all(&[2, 3, 4, 5]), Err(RingBufferError::Full));
        assert_eq!(rb.len(), 1);
        assert_eq!(rb.enqueue_slice(&[2, 3, 4, 5]), 3);
        assert!(rb.is_full());
    }

    #[test]
    fn test_dequeue_into() {
        let mut rb = RingBuffer::<8>::new();
        rb.enqueue_all(b"abcdef").unwrap();
        let mut out = [0u8; 4];
        assert_eq!(rb.dequeue_into(&mut out), 4);
        assert_eq!(&out, b"abcd");
        assert_eq!(rb.len(), 2);
    }

    #[test]
    fn test_reserve_commit() {
        let mut rb = RingBuffer::<2>::new();
        *rb.reserve_tail().unwrap() = 0x42;
        assert!(rb.has_reservation());
        // Not visible until committed
        assert!(rb.is_empty());
        rb.commit_tail().unwrap();
        assert_eq!(rb.len(), 1);
        assert_eq!(rb.dequeue(), Some(0x42));
    }

    #[test]
    fn test_commit_without_reserve() {
        let mut rb = RingBuffer::<2>::new();
        assert_eq!(rb.commit_tail(), Err(RingBufferError::NoReservation));
        assert!(rb.is_empty());
    }

    #[test]
    fn test_commit_overflow_when_filled_behind_reservation() {
        let mut rb = RingBuffer::<1>::new();
        *rb.reserve_tail().unwrap() = 0xAA;

        // A second writer fills the buffer while the slot is still reserved
        rb.buf[rb.tail] = 0x55;
        rb.tail = (rb.tail + 1) % 1;
        rb.count += 1;

        assert_eq!(rb.commit_tail(), Err(RingBufferError::Overflow));
        assert_eq!(rb.len(), 1);
        assert!(!rb.has_reservation());
        assert!(rb.tail < 1 && rb.head < 1);
        assert_eq!(rb.dequeue(), Some(0x55));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "tail reservation is pending")]
    fn test_bulk_enqueue_during_reservation_asserts() {
        let mut rb = RingBuffer::<4>::new();
        let _ = rb.reserve_tail().unwrap();
        rb.enqueue_all(&[1, 2]).unwrap();
    }

    #[test]
    fn test_reserve_when_full() {
        let mut rb = RingBuffer::<1>::new();
        rb.enqueue(1).unwrap();
        assert_eq!(rb.reserve_tail(), Err(RingBufferError::Full));
        assert!(!rb.has_reservation());
        assert_eq!(rb.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut rb = RingBuffer::<4>::new();
        rb.enqueue_all(&[1, 2]).unwrap();
        let _ = rb.reserve_tail().unwrap();
        rb.clear();
        assert!(rb.is_empty());
        assert!(!rb.has_reservation());
        assert_eq!(rb.free(), 4);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Enqueue(u8),
        Dequeue,
        Reserve(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<u8>().prop_map(Op::Enqueue),
            Just(Op::Dequeue),
            any::<u8>().prop_map(Op::Reserve),
        ]
    }

    proptest! {
        #[test]
        fn prop_matches_bounded_queue_model(ops in prop::collection::vec(op(), 0..200)) {
            let mut rb = RingBuffer::<5>::new();
            let mut model = std::collections::VecDeque::new();

            for op in ops {
                match op {
                    Op::Enqueue(b) | Op::Reserve(b) if model.len() == 5 => {
                        prop_assert!(rb.enqueue(b).is_err());
                    }
                    Op::Enqueue(b) => {
                        rb.enqueue(b).unwrap();
                        model.push_back(b);
                    }
                    Op::Reserve(b) => {
                        *rb.reserve_tail().unwrap() = b;
                        rb.commit_tail().unwrap();
                        model.push_back(b);
                    }
                    Op::Dequeue => {
                        prop_assert_eq!(rb.dequeue(), model.pop_front());
                    }
                }
                prop_assert_eq!(rb.len(), model.len());
                prop_assert!(rb.head < 5 && rb.tail < 5);
            }
        }
    }
}
