//! CRC-32 (ISO 3309) as used by GZIP member trailers.
//!
//! The checksum itself is computed by `crc32fast`, which picks a SIMD kernel at
//! runtime when one is available. This module adapts it to the two shapes the
//! codec needs: an accumulating [`Crc32`] that tracks a member as it streams
//! past, and the stateless [`crc32`] function that folds a chunk into a running
//! value.

use crc32fast::Hasher;

/// Fold `data` into a running CRC-32 value.
///
/// Start from `0` for a fresh checksum.
///
/// ```
/// use oxigz_core::crc::crc32;
///
/// let state = crc32(b"Hello, ", 0);
/// assert_eq!(crc32(b"World!", state), 0xEC4AC3D0);
/// ```
#[inline]
pub fn crc32(data: &[u8], state: u32) -> u32 {
    let mut hasher = Hasher::new_with_initial(state);
    hasher.update(data);
    hasher.finalize()
}

/// Accumulating CRC-32 calculator.
///
/// - Polynomial: 0x04C11DB7 (reflected: 0xEDB88320)
/// - Initial value: 0xFFFFFFFF
/// - Final XOR: 0xFFFFFFFF
///
/// # Example
///
/// ```
/// use oxigz_core::crc::Crc32;
///
/// let mut crc = Crc32::new();
/// crc.update(b"Hello, World!");
/// assert_eq!(crc.value(), 0xEC4AC3D0);
/// ```
#[derive(Clone, Default)]
pub struct Crc32 {
    hasher: Hasher,
}

impl Crc32 {
    /// Create a new CRC-32 calculator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the CRC to its initial state.
    pub fn reset(&mut self) {
        self.hasher.reset();
    }

    /// Update the CRC with more data.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Get the current CRC value without consuming the calculator.
    #[inline]
    pub fn value(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    /// Finalize and return the CRC value.
    #[inline]
    pub fn finalize(self) -> u32 {
        self.hasher.finalize()
    }

    /// Compute CRC-32 for a slice in one call.
    #[inline]
    pub fn compute(data: &[u8]) -> u32 {
        crc32(data, 0)
    }
}

impl std::fmt::Debug for Crc32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crc32")
            .field("value", &format_args!("{:#010x}", self.value()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_empty() {
        assert_eq!(Crc32::compute(b""), 0x00000000);
        assert_eq!(Crc32::new().value(), 0x00000000);
    }

    #[test]
    fn test_crc32_check() {
        // Standard CRC-32 check value for "123456789"
        assert_eq!(Crc32::compute(b"123456789"), 0xCBF43926);
    }

    #[test]
    fn test_crc32_incremental() {
        let mut crc = Crc32::new();
        crc.update(b"Hello");
        crc.update(b", ");
        assert_eq!(crc.value(), crc32(b"Hello, ", 0));
        crc.update(b"World!");
        assert_eq!(crc.finalize(), 0xEC4AC3D0);
    }

    #[test]
    fn test_crc32_reset() {
        let mut crc = Crc32::new();
        crc.update(b"garbage");
        crc.reset();
        crc.update(b"123456789");
        assert_eq!(crc.value(), 0xCBF43926);
    }

    quickcheck::quickcheck! {
        fn running_state_matches_accumulator(a: Vec<u8>, b: Vec<u8>) -> bool {
            let mut crc = Crc32::new();
            crc.update(&a);
            crc.update(&b);

            crc32(&b, crc32(&a, 0)) == crc.value()
        }
    }
}
