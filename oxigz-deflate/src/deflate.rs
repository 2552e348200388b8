//! Raw DEFLATE compression.

use crate::{MIN_SPARE, OUTPUT_CHUNK};
use flate2::{Compress, Compression, FlushCompress, Status};
use oxigz_core::error::{OxiGzError, Result};
use oxigz_core::traits::{CompressionLevel, FlushMode, StreamCompressor};

/// Incremental raw DEFLATE compressor.
#[derive(Debug)]
pub struct Deflater {
    /// Backend stream state.
    inner: Compress,
    /// Compression level.
    level: CompressionLevel,
    /// Whether the stream has been finished.
    finished: bool,
}

impl Deflater {
    /// Create a new DEFLATE compressor with the specified level (0-9).
    pub fn new(level: u8) -> Self {
        Self::with_level(CompressionLevel::new(level))
    }

    /// Create a new DEFLATE compressor from a [`CompressionLevel`].
    pub fn with_level(level: CompressionLevel) -> Self {
        Self {
            inner: Compress::new(Compression::new(u32::from(level.level())), false),
            level,
            finished: false,
        }
    }

    /// Get the compression level.
    pub fn level(&self) -> CompressionLevel {
        self.level
    }

    /// Total uncompressed bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.inner.total_in()
    }

    /// Total compressed bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.inner.total_out()
    }

    /// Whether [`FlushMode::Finish`] has completed the stream.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Drive the backend until `input` is consumed and `flush` is satisfied.
    fn run(&mut self, input: &[u8], flush: FlushCompress) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(OUTPUT_CHUNK.min(input.len() + MIN_SPARE));
        let mut pos = 0;

        loop {
            if output.capacity() - output.len() < MIN_SPARE {
                output.reserve(OUTPUT_CHUNK);
            }

            let before_in = self.inner.total_in();
            let before_out = self.inner.total_out();
            let status = self
                .inner
                .compress_vec(&input[pos..], &mut output, flush)
                .map_err(|e| OxiGzError::corrupted(before_in, e.to_string()))?;
            let consumed = (self.inner.total_in() - before_in) as usize;
            let produced = self.inner.total_out() - before_out;
            pos += consumed;

            if matches!(status, Status::StreamEnd) {
                self.finished = true;
                break;
            }

            // A call that left spare capacity has emitted everything it could.
            let has_room = output.len() < output.capacity();
            let drained = pos == input.len() && has_room && !matches!(flush, FlushCompress::Finish);
            let stalled = consumed == 0 && produced == 0 && has_room;
            if drained || stalled {
                break;
            }
        }

        Ok(output)
    }

    /// Compress data as a complete stream.
    pub fn compress_to_vec(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.compress_all(data)
    }
}

impl Default for Deflater {
    fn default() -> Self {
        Self::with_level(CompressionLevel::DEFAULT)
    }
}

impl StreamCompressor for Deflater {
    fn compress_step(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        if self.finished {
            if input.is_empty() {
                return Ok(Vec::new());
            }
            return Err(OxiGzError::unsupported("compress after the stream was finished"));
        }
        self.run(input, FlushCompress::None)
    }

    fn flush(&mut self, mode: FlushMode) -> Result<Vec<u8>> {
        if self.finished {
            return Ok(Vec::new());
        }
        let flush = match mode {
            FlushMode::None => FlushCompress::None,
            FlushMode::Sync => FlushCompress::Sync,
            FlushMode::Full => FlushCompress::Full,
            FlushMode::Finish => FlushCompress::Finish,
        };
        self.run(&[], flush)
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.finished = false;
    }
}

/// Compress data using raw DEFLATE.
pub fn deflate(data: &[u8], level: u8) -> Result<Vec<u8>> {
    let mut deflater = Deflater::new(level);
    deflater.compress_to_vec(data)
}
