//! Raw DEFLATE decompression (inflate).

use crate::{MIN_SPARE, OUTPUT_CHUNK};
use flate2::{Decompress, FlushDecompress, Status};
use oxigz_core::error::{OxiGzError, Result};
use oxigz_core::traits::StreamDecompressor;

/// Incremental raw DEFLATE decompressor.
///
/// Bytes that arrive after the final block are not part of the DEFLATE stream
/// and are collected for [`take_unused`](StreamDecompressor::take_unused).
#[derive(Debug)]
pub struct Inflater {
    /// Backend stream state.
    inner: Decompress,
    /// Whether the final block has been decoded.
    finished: bool,
    /// Input seen after the end of the stream.
    unused: Vec<u8>,
}

impl Inflater {
    /// Create a new DEFLATE decompressor.
    pub fn new() -> Self {
        Self {
            inner: Decompress::new(false),
            finished: false,
            unused: Vec::new(),
        }
    }

    /// Total compressed bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.inner.total_in()
    }

    /// Total decompressed bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.inner.total_out()
    }

    /// Bytes seen after the end of the stream, without taking them.
    pub fn unused(&self) -> &[u8] {
        &self.unused
    }

    fn run(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let capacity = OUTPUT_CHUNK.min(input.len().saturating_mul(2) + MIN_SPARE);
        let mut output = Vec::with_capacity(capacity);
        let mut pos = 0;

        loop {
            if output.capacity() - output.len() < MIN_SPARE {
                output.reserve(OUTPUT_CHUNK);
            }

            let before_in = self.inner.total_in();
            let before_out = self.inner.total_out();
            let status = self
                .inner
                .decompress_vec(&input[pos..], &mut output, FlushDecompress::None)
                .map_err(|e| OxiGzError::corrupted(before_in, e.to_string()))?;
            let consumed = (self.inner.total_in() - before_in) as usize;
            let produced = self.inner.total_out() - before_out;
            pos += consumed;

            if matches!(status, Status::StreamEnd) {
                self.finished = true;
                self.unused.extend_from_slice(&input[pos..]);
                break;
            }

            let has_room = output.len() < output.capacity();
            let drained = pos == input.len() && has_room;
            let stalled = consumed == 0 && produced == 0 && has_room;
            if drained || stalled {
                break;
            }
        }

        Ok(output)
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDecompressor for Inflater {
    fn decompress_step(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        if self.finished {
            self.unused.extend_from_slice(input);
            return Ok(Vec::new());
        }
        self.run(input)
    }

    fn take_unused(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.unused)
    }

    fn flush(&mut self) -> Result<Vec<u8>> {
        if self.finished {
            return Ok(Vec::new());
        }
        self.run(&[])
    }

    fn reset(&mut self) {
        self.inner.reset(false);
        self.finished = false;
        self.unused.clear();
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Decompress a complete raw DEFLATE stream.
///
/// Fails if the input ends before the final block.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut inflater = Inflater::new();
    let output = inflater.decompress_all(data)?;
    if !inflater.is_finished() {
        return Err(OxiGzError::corrupted(
            inflater.total_in(),
            "unexpected end of DEFLATE stream",
        ));
    }
    Ok(output)
}
