//! Per-dword endianness conversion.
//!
//! The conversion is stateless and never crosses a dword boundary: each dword's four
//! bytes (and the matching four enable bits) are reordered in place. It is independent
//! of the dword-order swap the request formatter applies to 64-bit addresses.

use serde::{Deserialize, Serialize};

use crate::common::dword::{be_nibble, with_be_nibble};

/// Byte order expected by the physical layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Dwords pass through unchanged.
    #[default]
    Big,
    /// Bytes within every dword are reversed.
    Little,
}

impl Endianness {
    /// Whether this mode reorders bytes.
    pub const fn swaps(self) -> bool {
        matches!(self, Self::Little)
    }

    /// Converts one data dword.
    #[inline]
    pub const fn dword(self, value: u32) -> u32 {
        if self.swaps() { value.swap_bytes() } else { value }
    }

    /// Converts one 4-bit enable nibble.
    #[inline]
    pub const fn nibble(self, nibble: u8) -> u8 {
        if self.swaps() {
            (nibble & 0xF).reverse_bits() >> 4
        } else {
            nibble & 0xF
        }
    }

    /// Converts every dword of `data` in place.
    pub fn convert_dwords(self, data: &mut [u32]) {
        if self.swaps() {
            for value in data.iter_mut() {
                *value = value.swap_bytes();
            }
        }
    }

    /// Converts the first `dwords` enable nibbles of `be`.
    pub fn convert_be(self, be: u64, dwords: usize) -> u64 {
        if !self.swaps() {
            return be;
        }
        (0..dwords).fold(be, |acc, slot| {
            with_be_nibble(acc, slot, self.nibble(be_nibble(be, slot)))
        })
    }
}
