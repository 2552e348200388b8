//! Edge case tests for the raw DEFLATE collaborator.

use oxigz_core::traits::{FlushMode, StreamCompressor, StreamDecompressor};
use oxigz_deflate::{Deflater, Inflater, deflate, inflate};

#[test]
fn test_empty_input() {
    let input = b"";
    let compressed = deflate(input, 6).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn test_all_zeros() {
    let input = vec![0u8; 1000];
    let compressed = deflate(&input, 6).unwrap();
    let decompressed = inflate(&compressed).unwrap();
    assert_eq!(decompressed, input);
    // All zeros should compress very well
    assert!(compressed.len() < input.len() / 10);
}

#[test]
fn test_large_output_from_small_input() {
    // Expands far beyond a single output chunk.
    let input = vec![b'z'; 1 << 20];
    let compressed = deflate(&input, 9).unwrap();
    assert!(compressed.len() < 4096);

    let mut inflater = Inflater::new();
    let output = inflater.decompress_step(&compressed).unwrap();
    assert_eq!(output.len(), input.len());
    assert!(inflater.is_finished());
}

#[test]
fn test_all_levels() {
    let input = b"level sweep level sweep level sweep".repeat(30);
    for level in 0..=9 {
        let compressed = deflate(&input, level).unwrap();
        assert_eq!(inflate(&compressed).unwrap(), input, "level {}", level);
    }
}

#[test]
fn test_full_flush_mid_stream() {
    let mut deflater = Deflater::new(6);
    let mut compressed = deflater.compress_step(b"before ").unwrap();
    compressed.extend(deflater.flush(FlushMode::Full).unwrap());
    compressed.extend(deflater.compress_step(b"after").unwrap());
    compressed.extend(deflater.flush(FlushMode::Finish).unwrap());

    assert_eq!(inflate(&compressed).unwrap(), b"before after");
}

#[test]
fn test_split_at_every_position() {
    let input = b"split the compressed stream at every byte offset".to_vec();
    let compressed = deflate(&input, 6).unwrap();

    for split in 0..=compressed.len() {
        let mut inflater = Inflater::new();
        let mut output = inflater.decompress_step(&compressed[..split]).unwrap();
        output.extend(inflater.decompress_step(&compressed[split..]).unwrap());
        assert_eq!(output, input, "split at {}", split);
        assert!(inflater.is_finished());
    }
}

quickcheck::quickcheck! {
    fn stream_roundtrip(data: Vec<u8>, level: u8) -> bool {
        let compressed = deflate(&data, level % 10).unwrap();
        inflate(&compressed).unwrap() == data
    }
}
