//! Core traits for the DEFLATE collaborator.
//!
//! The GZIP stream never touches the compression algorithm directly. It talks
//! to a [`StreamCompressor`] when writing and a [`StreamDecompressor`] when
//! reading, feeding them chunks as they arrive and collecting whatever output
//! each step produces.

use crate::error::Result;

/// How much pending output a compressor flush forces out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// Emit only what is ready.
    None,
    /// Sync flush - emit all pending output on a byte boundary.
    #[default]
    Sync,
    /// Full flush - emit and reset the match history.
    Full,
    /// Write the final block.
    Finish,
}

/// An incremental raw DEFLATE compressor.
pub trait StreamCompressor {
    /// Compress a chunk, returning whatever compressed bytes are ready.
    ///
    /// The compressor may hold input back internally; nothing is lost, it is
    /// emitted by a later step or by [`flush`](Self::flush).
    fn compress_step(&mut self, input: &[u8]) -> Result<Vec<u8>>;

    /// Emit pending output according to `mode`.
    ///
    /// [`FlushMode::Finish`] terminates the DEFLATE stream.
    fn flush(&mut self, mode: FlushMode) -> Result<Vec<u8>>;

    /// Start a fresh stream.
    fn reset(&mut self);

    /// Compress `input` as one complete stream.
    fn compress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = self.compress_step(input)?;
        output.extend_from_slice(&self.flush(FlushMode::Finish)?);
        Ok(output)
    }
}

/// An incremental raw DEFLATE decompressor.
///
/// Once the end of the DEFLATE stream is reached, every further input byte
/// (including the remainder of the chunk in which the stream ended) is kept as
/// unused data, the same bytes a GZIP reader needs for the member trailer.
pub trait StreamDecompressor {
    /// Decompress a chunk, returning the bytes it produced.
    fn decompress_step(&mut self, input: &[u8]) -> Result<Vec<u8>>;

    /// Take the bytes that followed the end of the DEFLATE stream.
    fn take_unused(&mut self) -> Vec<u8>;

    /// Drain any output still held by the decompressor.
    fn flush(&mut self) -> Result<Vec<u8>>;

    /// Start a fresh stream, discarding any unused tail.
    fn reset(&mut self);

    /// Check if the end of the DEFLATE stream has been reached.
    fn is_finished(&self) -> bool;

    /// Decompress `input` and drain the decoder.
    fn decompress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = self.decompress_step(input)?;
        output.extend_from_slice(&self.flush()?);
        Ok(output)
    }
}

/// Compression level passed through to the compressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// Stored blocks only.
    pub const NONE: Self = Self(0);
    /// Fastest compression.
    pub const FAST: Self = Self(1);
    /// zlib default.
    pub const DEFAULT: Self = Self(6);
    /// Smallest output.
    pub const BEST: Self = Self(9);

    /// Level from 0 to 9; larger values are clamped to 9.
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    /// Get the level value.
    pub fn level(&self) -> u8 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for CompressionLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}
