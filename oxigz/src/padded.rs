//! Pushback reader over a forward-only byte source.
//!
//! GZIP decoding regularly reads past the point it actually needed: a chunk
//! handed to the decompressor may contain the member trailer and the start of
//! the next member. [`PaddedReader`] lets those bytes be pushed back so the
//! next read sees them again, without requiring the source to seek.

use std::io::{self, Read, Seek, SeekFrom};

/// Pushback state.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    /// Reads are served from `data[pos..]` before touching the source.
    Buffered { data: Vec<u8>, pos: usize },
    /// The pushback buffer has been crossed; reads go to the source.
    Direct,
}

/// A reader that can replay bytes pushed back with [`prepend`](Self::prepend).
#[derive(Debug)]
pub struct PaddedReader<R> {
    inner: R,
    pending: Pending,
}

impl<R> PaddedReader<R> {
    /// Wrap `inner` with an empty pushback buffer.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Pending::Direct,
        }
    }

    /// Wrap `inner`, serving `prefix` before any byte of the source.
    pub fn with_prefix(inner: R, prefix: Vec<u8>) -> Self {
        Self {
            inner,
            pending: Pending::Buffered {
                data: prefix,
                pos: 0,
            },
        }
    }

    /// Push `bytes` back so they are returned by the next read.
    ///
    /// With `reuse_previous`, bytes that were just read out of the current
    /// buffer are re-exposed by moving the cursor back instead of copying.
    /// The caller guarantees they are the most recently read bytes.
    pub fn prepend(&mut self, bytes: &[u8], reuse_previous: bool) {
        if let Pending::Buffered { data, pos } = &mut self.pending {
            if reuse_previous && bytes.len() <= *pos {
                *pos -= bytes.len();
            } else {
                let mut replay = bytes.to_vec();
                replay.extend_from_slice(&data[*pos..]);
                *data = replay;
                *pos = 0;
            }
        } else {
            self.pending = Pending::Buffered {
                data: bytes.to_vec(),
                pos: 0,
            };
        }
    }

    /// Bytes still waiting in the pushback buffer.
    pub fn unused(&self) -> &[u8] {
        match &self.pending {
            Pending::Buffered { data, pos } => &data[*pos..],
            Pending::Direct => &[],
        }
    }

    /// Take the bytes still waiting in the pushback buffer.
    ///
    /// Subsequent reads go straight to the source.
    pub fn take_unused(&mut self) -> Vec<u8> {
        match std::mem::replace(&mut self.pending, Pending::Direct) {
            Pending::Buffered { mut data, pos } => data.split_off(pos),
            Pending::Direct => Vec::new(),
        }
    }

    /// Whether reads are currently served straight from the source.
    pub fn is_direct(&self) -> bool {
        self.pending == Pending::Direct
    }

    /// Get a reference to the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Get a mutable reference to the underlying source.
    ///
    /// Reading from it directly bypasses any pushed-back bytes.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> PaddedReader<R> {
    /// Read up to `size` bytes; fewer only at end of input.
    pub fn read(&mut self, size: usize) -> io::Result<Vec<u8>> {
        if let Pending::Buffered { data, pos } = &mut self.pending {
            if size <= data.len() - *pos {
                let start = *pos;
                *pos += size;
                return Ok(data[start..*pos].to_vec());
            }
        }

        // Crossing the end of the buffer switches to direct reads.
        let mut out = self.take_unused();
        let wanted = size - out.len();
        (&mut self.inner).take(wanted as u64).read_to_end(&mut out)?;
        Ok(out)
    }
}

impl<R: Seek> PaddedReader<R> {
    /// Seek the logical read position.
    ///
    /// A relative seek landing inside the pushback buffer only moves the
    /// cursor. Anything else drops the buffer and seeks the source, adjusting
    /// relative offsets for the bytes that were still buffered.
    pub fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        let buffered = match (&mut self.pending, target) {
            (Pending::Buffered { data, pos }, SeekFrom::Current(delta)) => {
                let moved = *pos as i64 + delta;
                if (0..=data.len() as i64).contains(&moved) {
                    *pos = moved as usize;
                    let ahead = (data.len() - *pos) as u64;
                    return Ok(self.inner.stream_position()?.saturating_sub(ahead));
                }
                data.len() - *pos
            }
            (Pending::Buffered { data, pos }, _) => data.len() - *pos,
            (Pending::Direct, _) => 0,
        };

        self.pending = Pending::Direct;
        let target = match target {
            SeekFrom::Current(delta) => SeekFrom::Current(delta - buffered as i64),
            other => other,
        };
        self.inner.seek(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(data: &[u8]) -> PaddedReader<Cursor<Vec<u8>>> {
        PaddedReader::new(Cursor::new(data.to_vec()))
    }

    #[test]
    fn test_direct_read() {
        let mut r = reader(b"abcdef");
        assert_eq!(r.read(4).unwrap(), b"abcd");
        assert_eq!(r.read(4).unwrap(), b"ef");
        assert!(r.read(4).unwrap().is_empty());
        assert!(r.is_direct());
    }

    #[test]
    fn test_prefix_then_source() {
        let mut r = PaddedReader::with_prefix(Cursor::new(b"world".to_vec()), b"hello ".to_vec());
        assert_eq!(r.read(3).unwrap(), b"hel");
        assert!(!r.is_direct());
        assert_eq!(r.read(6).unwrap(), b"lo wor");
        assert!(r.is_direct());
        assert_eq!(r.read(10).unwrap(), b"ld");
    }

    #[test]
    fn test_exact_drain_stays_buffered() {
        let mut r = PaddedReader::with_prefix(Cursor::new(b"tail".to_vec()), b"head".to_vec());
        assert_eq!(r.read(4).unwrap(), b"head");
        assert!(!r.is_direct());
        assert!(r.unused().is_empty());
        assert_eq!(r.read(4).unwrap(), b"tail");
    }

    #[test]
    fn test_unbounded_read_from_buffer() {
        let mut r = PaddedReader::with_prefix(Cursor::new(b"tail".to_vec()), b"head".to_vec());
        assert_eq!(r.read(1).unwrap(), b"h");
        assert_eq!(r.read(usize::MAX).unwrap(), b"eadtail");
        assert!(r.is_direct());
    }

    #[test]
    fn test_prepend_after_direct() {
        let mut r = reader(b"0123456789");
        let chunk = r.read(8).unwrap();
        r.prepend(&chunk[5..], true);
        assert_eq!(r.unused(), b"567");
        assert_eq!(r.read(5).unwrap(), b"56789");
    }

    #[test]
    fn test_prepend_reuses_cursor() {
        let mut r = PaddedReader::with_prefix(Cursor::new(Vec::new()), b"abcdef".to_vec());
        let chunk = r.read(4).unwrap();
        r.prepend(&chunk[2..], true);
        assert_eq!(r.unused(), b"cdef");
        assert_eq!(r.read(6).unwrap(), b"cdef");
    }

    #[test]
    fn test_prepend_without_reuse_keeps_remaining() {
        let mut r = PaddedReader::with_prefix(Cursor::new(Vec::new()), b"abcdef".to_vec());
        assert_eq!(r.read(2).unwrap(), b"ab");
        r.prepend(b"XY", false);
        assert_eq!(r.read(10).unwrap(), b"XYcdef");
    }

    #[test]
    fn test_take_unused() {
        let mut r = PaddedReader::with_prefix(Cursor::new(b"!".to_vec()), b"abc".to_vec());
        assert_eq!(r.read(1).unwrap(), b"a");
        assert_eq!(r.take_unused(), b"bc");
        assert!(r.is_direct());
        assert!(r.take_unused().is_empty());
        assert_eq!(r.read(5).unwrap(), b"!");
    }

    #[test]
    fn test_seek_within_buffer() {
        let mut r = reader(b"0123456789");
        let chunk = r.read(6).unwrap();
        r.prepend(&chunk[2..], true);
        // Logical position is 2, source position is 6.
        assert_eq!(r.seek(SeekFrom::Current(2)).unwrap(), 4);
        assert_eq!(r.read(2).unwrap(), b"45");
    }

    #[test]
    fn test_seek_outside_buffer_forwards() {
        let mut r = reader(b"0123456789");
        let chunk = r.read(6).unwrap();
        r.prepend(&chunk[2..], true);
        assert_eq!(r.seek(SeekFrom::Current(5)).unwrap(), 7);
        assert!(r.is_direct());
        assert_eq!(r.read(10).unwrap(), b"789");

        assert_eq!(r.seek(SeekFrom::Start(0)).unwrap(), 0);
        assert_eq!(r.read(3).unwrap(), b"012");
    }
}
