use std::{
    cmp,
    io::{self, Read},
};

pub(crate) const CAPACITY: usize = 1 << 13;

/// A fixed-capacity window over an underlying reader.
///
/// Valid data lives in `buf[start..end]`. Consuming moves `start` forward;
/// refilling appends at `end`, backshifting first when the tail would run
/// out of room.
#[derive(Debug)]
pub(crate) struct Buffer {
    buf: Box<[u8]>,
    /// Start of the valid data. Never greater than `self.end`.
    start: usize,
    /// End of the valid data + 1. Never greater than [`CAPACITY`].
    end: usize,
}

impl Buffer {
    pub(crate) fn new() -> Buffer {
        Buffer {
            buf: vec![0; CAPACITY].into_boxed_slice(),
            start: 0,
            end: 0,
        }
    }

    #[inline]
    fn data_len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub(crate) fn data(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    #[inline]
    pub(crate) fn consume(&mut self, n: usize) {
        self.start = cmp::min(self.start + n, self.end);
    }

    fn backshift(&mut self) {
        self.buf.copy_within(self.start..self.end, 0);
        self.end -= self.start;
        self.start = 0;
    }

    /// Fills the buffer until it holds at least `n` bytes and returns the
    /// data. The returned slice is shorter than `n` only at the end of the
    /// source.
    pub(crate) fn ensure(&mut self, n: usize, mut r: impl Read) -> io::Result<&[u8]> {
        debug_assert!(n <= CAPACITY);

        if self.data_len() < n && self.end + n > CAPACITY {
            self.backshift();
        }

        while self.data_len() < n {
            let read = r.read(&mut self.buf[self.end..])?;
            if read == 0 {
                break;
            }
            self.end += read;
        }

        Ok(self.data())
    }
}
