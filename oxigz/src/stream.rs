//! Mode-dispatching stream over a reader or a writer.
//!
//! Code that receives "a gzip stream" without knowing its direction uses
//! [`GzipStream`]. Every operation is available on both variants; the ones
//! that make no sense for the current mode fail with
//! [`OxiGzError::UnsupportedOperation`].

use crate::reader::GzipReader;
use crate::writer::{GzipOptions, GzipWriter};
use oxigz_core::error::{OxiGzError, Result};
use oxigz_core::traits::FlushMode;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Resolve a seek request against the current offset.
pub(crate) fn resolve_seek(pos: SeekFrom, offset: u64) -> Result<u64> {
    match pos {
        SeekFrom::Start(target) => Ok(target),
        SeekFrom::Current(delta) => offset
            .checked_add_signed(delta)
            .ok_or_else(|| OxiGzError::unsupported("seek to a negative offset")),
        SeekFrom::End(_) => Err(OxiGzError::unsupported("seek from end")),
    }
}

/// How a path is opened by [`GzipStream::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Decompress an existing file.
    Read,
    /// Create or truncate the file and write one member.
    Write,
    /// Add one member to the end of the file, creating it if needed.
    Append,
}

/// Direction of an open stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Decompressing.
    Read,
    /// Compressing.
    Write,
}

/// A GZIP stream in either direction.
#[derive(Debug)]
pub enum GzipStream<S> {
    /// Decompressing stream.
    Read(GzipReader<S>),
    /// Compressing stream.
    Write(GzipWriter<S>),
}

impl GzipStream<File> {
    /// Open `path` in the given mode.
    ///
    /// `options` only applies to writing; the header filename defaults to
    /// `path`.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode, options: GzipOptions) -> Result<Self> {
        let path = path.as_ref();
        match mode {
            OpenMode::Read => GzipReader::open(path).map(Self::Read),
            OpenMode::Write => GzipWriter::create(path, options).map(Self::Write),
            OpenMode::Append => {
                let file = OpenOptions::new().append(true).create(true).open(path)?;
                GzipWriter::new(file, options.with_default_filename(path)).map(Self::Write)
            }
        }
    }
}

impl<S> GzipStream<S> {
    /// Direction of the stream.
    pub fn mode(&self) -> StreamMode {
        match self {
            Self::Read(_) => StreamMode::Read,
            Self::Write(_) => StreamMode::Write,
        }
    }

    /// Name of the underlying resource, if known.
    pub fn name(&self) -> &str {
        match self {
            Self::Read(reader) => reader.name(),
            Self::Write(writer) => writer.name(),
        }
    }

    /// Uncompressed bytes read or written so far.
    pub fn offset(&self) -> u64 {
        match self {
            Self::Read(reader) => reader.offset(),
            Self::Write(writer) => writer.offset(),
        }
    }

    /// Whether the stream has been closed.
    pub fn is_closed(&self) -> bool {
        match self {
            Self::Read(reader) => reader.is_closed(),
            Self::Write(writer) => writer.is_closed(),
        }
    }

    /// Get a reference to the underlying resource, unless closed.
    pub fn get_ref(&self) -> Option<&S> {
        match self {
            Self::Read(reader) => reader.get_ref(),
            Self::Write(writer) => writer.get_ref(),
        }
    }

    /// Release the resource, finishing the member when writing.
    pub fn close(&mut self) -> Result<()> {
        match self {
            Self::Read(reader) => {
                reader.close();
                Ok(())
            }
            Self::Write(writer) => writer.close(),
        }
    }

    fn reader(&mut self, operation: &str) -> Result<&mut GzipReader<S>> {
        match self {
            Self::Read(reader) => Ok(reader),
            Self::Write(_) => Err(OxiGzError::unsupported(format!(
                "{operation}() on write-only stream"
            ))),
        }
    }
}

impl<S: Write> GzipStream<S> {
    /// Compress `data` into the stream.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        match self {
            Self::Read(_) => Err(OxiGzError::unsupported("write() on read-only stream")),
            Self::Write(writer) => writer.write(data),
        }
    }

    /// Force a flush boundary. A no-op on open read streams.
    pub fn flush(&mut self, mode: FlushMode) -> Result<()> {
        match self {
            Self::Read(reader) if reader.is_closed() => {
                Err(OxiGzError::unsupported("flush() on closed stream"))
            }
            Self::Read(_) => Ok(()),
            Self::Write(writer) => writer.flush(mode),
        }
    }
}

impl<S: Read> GzipStream<S> {
    /// Read up to `size` decompressed bytes.
    pub fn read(&mut self, size: usize) -> Result<Vec<u8>> {
        self.reader("read")?.read(size)
    }

    /// Read everything up to the end of the last member.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        self.reader("read")?.read_all()
    }

    /// Look at upcoming decompressed bytes without consuming them.
    pub fn peek(&mut self, n: usize) -> Result<&[u8]> {
        self.reader("peek")?.peek(n)
    }

    /// Read one line of at most `limit` bytes.
    pub fn readline(&mut self, limit: Option<usize>) -> Result<Vec<u8>> {
        self.reader("readline")?.readline(limit)
    }
}

impl<S: Read + Seek> GzipStream<S> {
    /// Return to the start of a read stream.
    pub fn rewind(&mut self) -> Result<()> {
        self.reader("rewind")?.rewind()
    }
}

impl<S: Read + Write + Seek> GzipStream<S> {
    /// Move to an uncompressed offset.
    ///
    /// Read streams replay from the start for backward targets; write streams
    /// only move forward.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        match self {
            Self::Read(reader) => reader.seek(pos),
            Self::Write(writer) => writer.seek(pos),
        }
    }
}

impl<S> From<GzipReader<S>> for GzipStream<S> {
    fn from(reader: GzipReader<S>) -> Self {
        Self::Read(reader)
    }
}

impl<S> From<GzipWriter<S>> for GzipStream<S> {
    fn from(writer: GzipWriter<S>) -> Self {
        Self::Write(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigz_core::ErrorKind;
    use std::io::Cursor;

    #[test]
    fn test_resolve_seek() {
        assert_eq!(resolve_seek(SeekFrom::Start(7), 3).unwrap(), 7);
        assert_eq!(resolve_seek(SeekFrom::Current(-3), 3).unwrap(), 0);
        assert_eq!(resolve_seek(SeekFrom::Current(4), 3).unwrap(), 7);
        assert!(resolve_seek(SeekFrom::Current(-4), 3).is_err());
        assert!(resolve_seek(SeekFrom::End(0), 3).is_err());
    }

    #[test]
    fn test_mode_dispatch() {
        let writer = GzipWriter::new(Cursor::new(Vec::new()), GzipOptions::new()).unwrap();
        let mut stream = GzipStream::from(writer);
        assert_eq!(stream.mode(), StreamMode::Write);
        stream.write(b"line one\nline two\n").unwrap();

        let err = stream.read(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert_eq!(stream.rewind().unwrap_err().kind(), ErrorKind::Unsupported);

        let GzipStream::Write(writer) = stream else {
            unreachable!()
        };
        let data = writer.finish().unwrap().into_inner();

        let mut stream = GzipStream::from(GzipReader::new(Cursor::new(data)));
        assert_eq!(stream.mode(), StreamMode::Read);
        assert_eq!(stream.readline(None).unwrap(), b"line one\n");
        assert_eq!(stream.offset(), 9);
        assert_eq!(stream.write(b"x").unwrap_err().kind(), ErrorKind::Unsupported);
        stream.flush(FlushMode::Sync).unwrap();

        stream.close().unwrap();
        stream.close().unwrap();
        assert!(stream.is_closed());
        let err = stream.flush(FlushMode::Sync).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert_eq!(stream.read(1).unwrap_err().kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_read_only_source() {
        let packed = crate::compress(b"borrowed\nbytes\n", 6).unwrap();
        let mut stream = GzipStream::from(GzipReader::new(Cursor::new(packed.as_slice())));

        assert_eq!(stream.peek(1).unwrap(), b"borrowed\nbytes\n");
        assert_eq!(stream.readline(None).unwrap(), b"borrowed\n");
        stream.rewind().unwrap();
        assert_eq!(stream.read_all().unwrap(), b"borrowed\nbytes\n");
        stream.close().unwrap();
        assert!(stream.get_ref().is_none());
    }

    #[test]
    fn test_finish_flush_rejected_through_stream() {
        let writer = GzipWriter::new(Vec::new(), GzipOptions::new()).unwrap();
        let mut stream = GzipStream::from(writer);
        stream.write(b"abc").unwrap();
        let err = stream.flush(FlushMode::Finish).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        stream.flush(FlushMode::Full).unwrap();

        let GzipStream::Write(writer) = stream else {
            unreachable!()
        };
        assert_eq!(crate::decompress(&writer.finish().unwrap()).unwrap(), b"abc");
    }
}
