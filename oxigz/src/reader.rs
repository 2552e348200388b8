//! Streaming GZIP decompression.
//!
//! [`GzipReader`] walks a byte source member by member. Each call that needs
//! more data runs one step of the state machine: parse a header, feed a chunk
//! to the decompressor, or validate a trailer at a member boundary. Output
//! accumulates in a read-ahead window, which is what makes `peek`, `readline`
//! and (replayed) `seek` possible on top of a forward-only decoder.

use crate::header::{GzipHeader, GzipTrailer};
use crate::padded::PaddedReader;
use crate::stream::resolve_seek;
use crate::window::ReadAhead;
use oxigz_core::crc::Crc32;
use oxigz_core::error::{OxiGzError, Result};
use oxigz_core::traits::StreamDecompressor;
use oxigz_deflate::Inflater;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// First chunk size requested from the source by `read`; doubles per fill.
const INITIAL_READ_CHUNK: usize = 1024;

/// Upper bound on a single chunk requested from the source.
const MAX_READ_CHUNK: usize = 10 * 1024 * 1024;

/// `peek` always tries to expose at least this many bytes.
const MIN_PEEK: usize = 100;

/// Starting chunk size for `readline`.
const INITIAL_LINE_CHUNK: usize = 100;

/// Ceiling for the adaptive `readline` chunk size.
const MAX_LINE_CHUNK: usize = 512;

/// Forward seeks read and discard in chunks of this size.
const SEEK_CHUNK: u64 = 1024;

/// Where the reader is relative to member boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberState {
    /// The next fill parses a member header.
    NewMember,
    /// Compressed data of the current member is being consumed.
    InMember,
    /// No further members.
    Eof,
}

/// Outcome of one fill step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fill {
    /// Progress was made; more may follow.
    Data,
    /// The stream is exhausted.
    Eof,
}

/// GZIP reader that decompresses a stream of members.
#[derive(Debug)]
pub struct GzipReader<R> {
    /// `None` once closed.
    source: Option<PaddedReader<R>>,
    decoder: Inflater,
    state: MemberState,
    window: ReadAhead,
    /// CRC of the current member's output so far.
    crc: Crc32,
    /// Size of the current member's output so far.
    member_size: u64,
    /// Adaptive starting chunk size for `readline`.
    min_readsize: usize,
    /// Most recently parsed member header.
    header: Option<GzipHeader>,
    name: String,
}

impl<R> GzipReader<R> {
    /// Create a reader over `source`. Nothing is read until data is requested.
    pub fn new(source: R) -> Self {
        Self {
            source: Some(PaddedReader::new(source)),
            decoder: Inflater::new(),
            state: MemberState::NewMember,
            window: ReadAhead::default(),
            crc: Crc32::new(),
            member_size: 0,
            min_readsize: INITIAL_LINE_CHUNK,
            header: None,
            name: String::new(),
        }
    }

    /// Set the name reported by [`name`](Self::name).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Name of the underlying resource, if known.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of decompressed bytes handed out so far.
    pub fn offset(&self) -> u64 {
        self.window.offset()
    }

    /// Current position relative to member boundaries.
    pub fn state(&self) -> MemberState {
        self.state
    }

    /// Header of the member most recently started.
    pub fn header(&self) -> Option<&GzipHeader> {
        self.header.as_ref()
    }

    /// Modification time from the most recent member header.
    pub fn mtime(&self) -> Option<u32> {
        self.header.as_ref().map(|h| h.mtime)
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    /// Get a reference to the underlying source, unless closed.
    pub fn get_ref(&self) -> Option<&R> {
        self.source.as_ref().map(PaddedReader::get_ref)
    }

    /// Release the underlying source. Closing twice is a no-op.
    pub fn close(&mut self) {
        self.source = None;
    }

    fn ensure_open(&self) -> Result<()> {
        if self.source.is_none() {
            return Err(OxiGzError::unsupported("I/O operation on closed stream"));
        }
        Ok(())
    }

    fn source_mut(&mut self) -> Result<&mut PaddedReader<R>> {
        self.source
            .as_mut()
            .ok_or_else(|| OxiGzError::unsupported("I/O operation on closed stream"))
    }

    /// Account for decompressed output of the current member.
    fn add_read_data(&mut self, data: &[u8]) {
        self.crc.update(data);
        self.member_size += data.len() as u64;
        self.window.extend(data);
    }
}

impl GzipReader<File> {
    /// Open a gzip file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self::new(file).with_name(path.to_string_lossy()))
    }
}

impl<R: Read> GzipReader<R> {
    /// Read up to `size` decompressed bytes; fewer only at the end of the stream.
    pub fn read(&mut self, size: usize) -> Result<Vec<u8>> {
        self.ensure_open()?;
        let mut readsize = INITIAL_READ_CHUNK;
        while self.window.remaining() < size {
            if self.fill(readsize)? == Fill::Eof {
                break;
            }
            readsize = (readsize * 2).min(MAX_READ_CHUNK);
        }
        Ok(self.window.consume(size))
    }

    /// Read everything up to the end of the last member.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        self.ensure_open()?;
        let mut readsize = INITIAL_READ_CHUNK;
        while self.fill(readsize)? == Fill::Data {
            readsize = (readsize * 2).min(MAX_READ_CHUNK);
        }
        Ok(self.window.consume(self.window.remaining()))
    }

    /// Look at upcoming bytes without consuming them.
    ///
    /// At least `max(n, 100)` bytes are returned unless the stream ends first.
    pub fn peek(&mut self, n: usize) -> Result<&[u8]> {
        self.ensure_open()?;
        let n = n.max(MIN_PEEK);
        let readsize = n.max(INITIAL_READ_CHUNK);
        while self.window.remaining() < n {
            if self.fill(readsize)? == Fill::Eof {
                break;
            }
        }
        Ok(self.window.peek(n))
    }

    /// Read one line, including its `\n`, of at most `limit` bytes.
    ///
    /// Returns an empty vector at the end of the stream. The last line may
    /// lack a newline.
    pub fn readline(&mut self, limit: Option<usize>) -> Result<Vec<u8>> {
        self.ensure_open()?;
        let (mut size, mut readsize) = match limit {
            Some(limit) => (limit, limit),
            None => {
                if let Some(line) = self.window.take_line() {
                    return Ok(line);
                }
                (usize::MAX, self.min_readsize)
            }
        };

        let mut line = Vec::new();
        while size != 0 {
            let chunk = self.read(readsize)?;
            let newline = chunk.iter().position(|&b| b == b'\n');

            // Index of the last byte that belongs to this line, if it ends here.
            let last = match newline {
                Some(i) if i < size => Some(i),
                Some(_) => Some(size - 1),
                None if chunk.len() > size => Some(size - 1),
                None => None,
            };

            if let Some(last) = last {
                line.extend_from_slice(&chunk[..=last]);
                self.window.unread(chunk.len() - last - 1);
                break;
            }
            if chunk.is_empty() {
                break;
            }

            line.extend_from_slice(&chunk);
            size -= chunk.len();
            readsize = size.min(readsize.saturating_mul(2));
        }

        if readsize > self.min_readsize {
            self.min_readsize = readsize.min(self.min_readsize * 2).min(MAX_LINE_CHUNK);
        }
        Ok(line)
    }

    /// Advance the state machine by one step.
    fn fill(&mut self, size_hint: usize) -> Result<Fill> {
        match self.state {
            MemberState::Eof => return Ok(Fill::Eof),
            MemberState::NewMember => {
                if !self.start_member()? {
                    return Ok(Fill::Eof);
                }
                // The whole member may have arrived with the header.
                if self.state == MemberState::NewMember {
                    return Ok(Fill::Data);
                }
            }
            MemberState::InMember => {}
        }

        let chunk = self.source_mut()?.read(size_hint)?;
        if chunk.is_empty() {
            let tail = self.decoder.flush()?;
            self.add_read_data(&tail);
            let unused = self.decoder.take_unused();
            self.source_mut()?.prepend(&unused, true);
            self.end_member()?;
            self.state = MemberState::NewMember;
            return Ok(Fill::Eof);
        }

        self.feed(&chunk)?;
        Ok(Fill::Data)
    }

    /// Parse the next header and prime the decompressor.
    ///
    /// Returns `false` when the source holds no further member.
    fn start_member(&mut self) -> Result<bool> {
        self.crc.reset();
        self.member_size = 0;

        let source = self.source_mut()?;
        let header = GzipHeader::read(source)?;
        let over_read = source.take_unused();
        let Some(header) = header else {
            self.state = MemberState::Eof;
            return Ok(false);
        };

        self.header = Some(header);
        self.decoder.reset();
        self.state = MemberState::InMember;
        if !over_read.is_empty() {
            self.feed(&over_read)?;
        }
        Ok(true)
    }

    /// Decompress a chunk, closing the member if its DEFLATE stream ended.
    fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        let produced = self.decoder.decompress_step(chunk)?;
        self.add_read_data(&produced);

        let unused = self.decoder.take_unused();
        if !unused.is_empty() {
            self.source_mut()?.prepend(&unused, true);
            self.end_member()?;
            self.state = MemberState::NewMember;
        }
        Ok(())
    }

    /// Validate the trailer and skip zero padding after it.
    fn end_member(&mut self) -> Result<()> {
        let trailer = GzipTrailer::read(self.source_mut()?)?;
        trailer.verify(self.crc.value(), self.member_size)?;

        let source = self.source_mut()?;
        loop {
            let byte = source.read(1)?;
            match byte.first() {
                None => break,
                Some(0) => continue,
                Some(_) => {
                    source.prepend(&byte, true);
                    break;
                }
            }
        }
        Ok(())
    }
}

impl<R: Read + Seek> GzipReader<R> {
    /// Return to the start of the stream.
    pub fn rewind(&mut self) -> Result<()> {
        self.source_mut()?.seek(SeekFrom::Start(0))?;
        self.state = MemberState::NewMember;
        self.window.clear();
        Ok(())
    }

    /// Move to a decompressed offset, returning the offset reached.
    ///
    /// Backward seeks rewind and decompress forward again. Seeking past the
    /// end stops at the end. [`SeekFrom::End`] is not supported.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.ensure_open()?;
        let target = resolve_seek(pos, self.offset())?;
        if target < self.offset() {
            self.rewind()?;
        }

        let mut count = target - self.offset();
        while count > 0 {
            let skipped = self.read(count.min(SEEK_CHUNK) as usize)?;
            if skipped.is_empty() {
                break;
            }
            count -= skipped.len() as u64;
        }
        Ok(self.offset())
    }
}

impl<R: Read> Read for GzipReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let chunk = GzipReader::read(self, buf.len())?;
        buf[..chunk.len()].copy_from_slice(&chunk);
        Ok(chunk.len())
    }
}
