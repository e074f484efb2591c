use std::cmp;
use std::collections::VecDeque;

use bytes::Bytes;

/// Received but not yet consumed body bytes.
///
/// Chunks are stored as the transport handed them over, `append` never copies.
/// Positions are absolute offsets into everything appended so far, which lets a
/// mark outlive the eager dropping of consumed chunks.
#[derive(Debug, Default)]
pub struct ByteAccumulator {
    chunks: VecDeque<Bytes>,
    /// absolute position of the first byte of `chunks[0]`
    base: usize,
    read_pos: usize,
    write_pos: usize,
    mark: Option<usize>,
}

impl ByteAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk to the tail, taking ownership of it.
    pub fn append(&mut self, chunk: Bytes) {
        if chunk.is_empty() {
            return;
        }
        self.write_pos += chunk.len();
        self.chunks.push_back(chunk);
    }

    /// Number of bytes that can be read without waiting.
    #[inline]
    pub fn readable(&self) -> usize {
        self.write_pos - self.read_pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.readable() == 0
    }

    /// Copies up to `dst.len()` bytes from the head into `dst`, returns how many were copied.
    pub fn read_into(&mut self, dst: &mut [u8]) -> usize {
        let len = cmp::min(dst.len(), self.readable());
        let mut copied = 0;
        let mut chunk_start = self.base;

        for chunk in &self.chunks {
            if copied == len {
                break;
            }

            let chunk_end = chunk_start + chunk.len();
            let pos = self.read_pos + copied;
            if pos < chunk_end {
                let offset = pos - chunk_start;
                let n = cmp::min(chunk.len() - offset, len - copied);
                dst[copied..copied + n].copy_from_slice(&chunk[offset..offset + n]);
                copied += n;
            }
            chunk_start = chunk_end;
        }

        self.advance(copied);
        copied
    }

    pub fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        (self.read_into(&mut byte) == 1).then_some(byte[0])
    }

    /// Discards up to `n` bytes, returns how many were discarded.
    pub fn skip(&mut self, n: usize) -> usize {
        let n = cmp::min(n, self.readable());
        self.advance(n);
        n
    }

    /// Remembers the current read position, replacing any earlier mark.
    pub fn mark(&mut self) {
        self.mark = Some(self.read_pos);
    }

    /// Moves the read position back to the mark. Without a mark this does nothing.
    pub fn reset(&mut self) {
        if let Some(mark) = self.mark {
            self.read_pos = mark;
        }
    }

    fn advance(&mut self, n: usize) {
        self.read_pos += n;
        self.discard_consumed();
    }

    fn discard_consumed(&mut self) {
        let keep_from = self.mark.map_or(self.read_pos, |mark| cmp::min(mark, self.read_pos));
        while let Some(front) = self.chunks.front() {
            if self.base + front.len() > keep_from {
                break;
            }
            self.base += front.len();
            self.chunks.pop_front();
        }
    }

    #[cfg(test)]
    fn retained_chunks(&self) -> usize {
        self.chunks.len()
    }
}
