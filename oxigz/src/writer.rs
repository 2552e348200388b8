//! Streaming GZIP compression.

use crate::header::{GzipHeader, GzipTrailer};
use crate::stream::resolve_seek;
use oxigz_core::crc::Crc32;
use oxigz_core::error::{OxiGzError, Result};
use oxigz_core::traits::{CompressionLevel, FlushMode, StreamCompressor};
use oxigz_deflate::Deflater;
use std::fs::File;
use std::io::{self, SeekFrom, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Zero padding for forward seeks is compressed in chunks of this size.
const SEEK_PAD_CHUNK: usize = 1024;

/// Options for a new GZIP member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzipOptions {
    level: CompressionLevel,
    filename: Option<String>,
    mtime: Option<u32>,
}

impl Default for GzipOptions {
    fn default() -> Self {
        Self {
            level: CompressionLevel::BEST,
            filename: None,
            mtime: None,
        }
    }
}

impl GzipOptions {
    /// Options with level 9, no filename and the current time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compression level (0-9).
    pub fn level(mut self, level: u8) -> Self {
        self.level = CompressionLevel::new(level);
        self
    }

    /// Set the filename recorded in the header.
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set the modification time recorded in the header.
    pub fn mtime(mut self, mtime: u32) -> Self {
        self.mtime = Some(mtime);
        self
    }

    /// The configured compression level.
    pub fn compression_level(&self) -> CompressionLevel {
        self.level
    }
}

/// Seconds since the Unix epoch, truncated to the header's 32 bits.
fn now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

/// GZIP writer producing a single member.
///
/// The header is written on construction and the trailer on
/// [`close`](Self::close) or [`finish`](Self::finish). Dropping an unclosed
/// writer finishes the member on a best-effort basis.
#[derive(Debug)]
pub struct GzipWriter<W> {
    /// `None` once closed.
    sink: Option<W>,
    encoder: Deflater,
    crc: Crc32,
    /// Uncompressed bytes written.
    size: u64,
    /// Whether the final block and trailer have reached the sink.
    trailer_written: bool,
    header: GzipHeader,
    name: String,
    /// `finish_member`, captured where `W: Write` is known so that closing
    /// and dropping need no bound on `W`.
    finisher: fn(&mut GzipWriter<W>) -> Result<()>,
}

impl<W> GzipWriter<W> {
    /// Name of the underlying resource, if known.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of uncompressed bytes written so far.
    pub fn offset(&self) -> u64 {
        self.size
    }

    /// The header written at the start of the member.
    pub fn header(&self) -> &GzipHeader {
        &self.header
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.sink.is_none()
    }

    /// Get a reference to the underlying sink, unless closed.
    pub fn get_ref(&self) -> Option<&W> {
        self.sink.as_ref()
    }

    /// Finish the member and release the sink. Closing twice is a no-op.
    ///
    /// The sink is released even when writing the trailer fails.
    pub fn close(&mut self) -> Result<()> {
        let finish = self.finisher;
        let result = finish(self);
        self.sink = None;
        result
    }

    fn sink_mut(&mut self) -> Result<&mut W> {
        self.sink
            .as_mut()
            .ok_or_else(|| OxiGzError::unsupported("write to closed stream"))
    }
}

impl<W: Write> GzipWriter<W> {
    /// Start a member on `sink`, writing its header immediately.
    pub fn new(mut sink: W, options: GzipOptions) -> Result<Self> {
        let filename = options.filename.unwrap_or_default();
        let header = GzipHeader::for_member(&filename, options.mtime.unwrap_or_else(now));
        header.write(&mut sink)?;

        Ok(Self {
            sink: Some(sink),
            encoder: Deflater::with_level(options.level),
            crc: Crc32::new(),
            size: 0,
            trailer_written: false,
            header,
            name: filename,
            finisher: Self::finish_member,
        })
    }

    /// Compress `data` into the member. Returns the number of bytes accepted.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.sink_mut()?;
        if data.is_empty() {
            return Ok(0);
        }

        let compressed = self.encoder.compress_step(data)?;
        self.crc.update(data);
        self.size += data.len() as u64;
        self.sink_mut()?.write_all(&compressed)?;
        Ok(data.len())
    }

    /// Emit everything written so far at a flush boundary, then flush the sink.
    ///
    /// Only [`FlushMode::Sync`] and [`FlushMode::Full`] are accepted; the
    /// member is ended by [`close`](Self::close) or [`finish`](Self::finish).
    pub fn flush(&mut self, mode: FlushMode) -> Result<()> {
        self.sink_mut()?;
        if !matches!(mode, FlushMode::Sync | FlushMode::Full) {
            return Err(OxiGzError::unsupported(format!(
                "flush({mode:?}) on an open member"
            )));
        }

        let pending = self.encoder.flush(mode)?;
        let sink = self.sink_mut()?;
        sink.write_all(&pending)?;
        sink.flush()?;
        Ok(())
    }

    /// Move forward to `pos`, filling the gap with compressed zero bytes.
    ///
    /// Backward seeks and [`SeekFrom::End`] are not supported.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.sink_mut()?;
        let target = resolve_seek(pos, self.size)?;
        if target < self.size {
            return Err(OxiGzError::unsupported("negative seek in write mode"));
        }

        let zeros = [0u8; SEEK_PAD_CHUNK];
        let mut count = target - self.size;
        while count > 0 {
            let step = count.min(SEEK_PAD_CHUNK as u64) as usize;
            self.write(&zeros[..step])?;
            count -= step as u64;
        }
        Ok(self.size)
    }

    /// Finish the member and return the sink.
    pub fn finish(mut self) -> Result<W> {
        self.finish_member()?;
        self.sink
            .take()
            .ok_or_else(|| OxiGzError::unsupported("finish on closed stream"))
    }

    /// Write the final DEFLATE block and the trailer, once.
    fn finish_member(&mut self) -> Result<()> {
        if self.trailer_written {
            return Ok(());
        }
        let Some(sink) = self.sink.as_mut() else {
            return Ok(());
        };

        let tail = self.encoder.flush(FlushMode::Finish)?;
        sink.write_all(&tail)?;
        GzipTrailer::new(self.crc.value(), self.size).write(sink)?;
        sink.flush()?;
        self.trailer_written = true;
        Ok(())
    }
}

impl GzipWriter<File> {
    /// Create (or truncate) a file and start a member in it.
    ///
    /// The header filename defaults to `path` when `options` names none.
    pub fn create<P: AsRef<Path>>(path: P, options: GzipOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        Self::new(file, options.with_default_filename(path))
    }
}

impl GzipOptions {
    pub(crate) fn with_default_filename(mut self, path: &Path) -> Self {
        if self.filename.is_none() {
            self.filename = Some(path.to_string_lossy().into_owned());
        }
        self
    }
}

impl<W: Write> Write for GzipWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(GzipWriter::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(GzipWriter::flush(self, FlushMode::Sync)?)
    }
}

impl<W> Drop for GzipWriter<W> {
    fn drop(&mut self) {
        let finish = self.finisher;
        let _ = finish(self);
    }
}
