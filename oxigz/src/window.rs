//! Read-ahead window over decompressed data.

/// Decompressed bytes that have been produced but not yet handed out.
///
/// `buf[..cursor]` has already been consumed; it is kept until the next
/// [`extend`](Self::extend) so a caller can [`unread`](Self::unread) into it.
/// The logical stream offset is `start + cursor`, so the remaining window size
/// is always `buf.len() - (offset - start)`.
#[derive(Debug, Default, Clone)]
pub(crate) struct ReadAhead {
    buf: Vec<u8>,
    /// Stream offset of `buf[0]`.
    start: u64,
    cursor: usize,
}

impl ReadAhead {
    /// Logical offset of the next byte to hand out.
    pub(crate) fn offset(&self) -> u64 {
        self.start + self.cursor as u64
    }

    /// Bytes available without decompressing more.
    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.cursor
    }

    /// Append freshly decompressed bytes, dropping the consumed prefix.
    pub(crate) fn extend(&mut self, data: &[u8]) {
        self.buf.drain(..self.cursor);
        self.start += self.cursor as u64;
        self.cursor = 0;
        self.buf.extend_from_slice(data);
    }

    /// Hand out up to `n` bytes.
    pub(crate) fn consume(&mut self, n: usize) -> Vec<u8> {
        let n = n.min(self.remaining());
        let out = self.buf[self.cursor..self.cursor + n].to_vec();
        self.cursor += n;
        out
    }

    /// Look at up to `n` bytes without consuming them.
    pub(crate) fn peek(&self, n: usize) -> &[u8] {
        let n = n.min(self.remaining());
        &self.buf[self.cursor..self.cursor + n]
    }

    /// Put back the last `n` consumed bytes.
    pub(crate) fn unread(&mut self, n: usize) {
        debug_assert!(n <= self.cursor, "unread past the start of the window");
        self.cursor -= n.min(self.cursor);
    }

    /// Consume through the next newline if it is already buffered.
    pub(crate) fn take_line(&mut self) -> Option<Vec<u8>> {
        let newline = self.buf[self.cursor..].iter().position(|&b| b == b'\n')?;
        Some(self.consume(newline + 1))
    }

    /// Forget everything and restart at offset zero.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
