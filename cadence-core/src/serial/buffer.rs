//! Bounded byte queues

use heapless::Deque;

use crate::error::Error;

/// FIFO of at most `N` bytes
///
/// One side is filled by the foreground, the other drained by the tick
/// handler (or the reverse for receive). Callers share it through
/// [`Shared`](crate::Shared), so every method sees a consistent head, tail
/// and length.
#[derive(Debug, Clone)]
pub struct ByteQueue<const N: usize> {
    inner: Deque<u8, N>,
}

impl<const N: usize> Default for ByteQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ByteQueue<N> {
    pub const fn new() -> Self {
        Self {
            inner: Deque::new(),
        }
    }

    /// Append every byte of `bytes` or none of them
    ///
    /// Leaves the queue untouched and returns [`Error::CapacityExceeded`]
    /// when there is not room for all of them.
    pub fn push_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if bytes.len() > self.free() {
            return Err(Error::CapacityExceeded);
        }
        for &byte in bytes {
            self.inner
                .push_back(byte)
                .map_err(|_| Error::CapacityExceeded)?;
        }
        Ok(())
    }

    /// Append one byte; hands it back if the queue is full
    pub fn push(&mut self, byte: u8) -> Result<(), u8> {
        self.inner.push_back(byte)
    }

    pub fn pop(&mut self) -> Option<u8> {
        self.inner.pop_front()
    }

    pub fn peek(&self) -> Option<u8> {
        self.inner.front().copied()
    }

    /// Move up to `buf.len()` bytes out of the queue, oldest first
    pub fn read_into(&mut self, buf: &mut [u8]) -> usize {
        let mut n = 0;
        for slot in buf.iter_mut() {
            match self.inner.pop_front() {
                Some(byte) => {
                    *slot = byte;
                    n += 1;
                }
                None => break,
            }
        }
        n
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }

    /// Bytes that can still be pushed
    pub fn free(&self) -> usize {
        N - self.inner.len()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Iterate over the queued bytes, oldest first, without removing them
    pub fn iter(&self) -> impl Iterator<Item = &u8> {
        self.inner.iter()
    }
}
