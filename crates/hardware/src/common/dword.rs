//! Datapath widths and per-dword byte-enable helpers.
//!
//! The packetizer moves data in 32-bit dwords. A physical word of `W` bits holds
//! `D = W / 32` dwords and carries one byte-enable bit per byte, so each dword owns a
//! 4-bit enable nibble. Slot `i` of a word covers data bits `[32i, 32i + 32)` and
//! enable bits `[4i, 4i + 4)`. The widest datapath (512 bits) needs 64 enable bits,
//! which is why byte-enables travel as a `u64`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::Error;

/// Byte-enable nibble with all four bytes of a dword enabled.
pub const DWORD_BE: u8 = 0xF;

/// Bytes per dword.
pub const DWORD_BYTES: usize = 4;

/// Physical datapath width.
///
/// Deserializes from the width in bits (`64`, `128`, `256`, `512`); any other value is
/// rejected with [`Error::UnsupportedDataWidth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum DataWidth {
    /// 64-bit datapath (2 dwords per word).
    #[default]
    W64,
    /// 128-bit datapath (4 dwords per word).
    W128,
    /// 256-bit datapath (8 dwords per word).
    W256,
    /// 512-bit datapath (16 dwords per word).
    W512,
}

impl DataWidth {
    /// Every supported width, narrowest first.
    pub const ALL: [Self; 4] = [Self::W64, Self::W128, Self::W256, Self::W512];

    /// Width in bits.
    pub const fn bits(self) -> u32 {
        match self {
            Self::W64 => 64,
            Self::W128 => 128,
            Self::W256 => 256,
            Self::W512 => 512,
        }
    }

    /// Dwords per physical word (`D`).
    pub const fn dwords(self) -> usize {
        self.bits() as usize / 32
    }

    /// Byte-enable with every byte lane of the word set.
    pub const fn full_be(self) -> u64 {
        dword_mask(self.dwords())
    }
}

impl TryFrom<u32> for DataWidth {
    type Error = Error;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            64 => Ok(Self::W64),
            128 => Ok(Self::W128),
            256 => Ok(Self::W256),
            512 => Ok(Self::W512),
            other => Err(Error::UnsupportedDataWidth(other)),
        }
    }
}

impl From<DataWidth> for u32 {
    fn from(width: DataWidth) -> Self {
        width.bits()
    }
}

impl fmt::Display for DataWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}b", self.bits())
    }
}

/// Byte-enable mask covering the first `dwords` slots.
pub const fn dword_mask(dwords: usize) -> u64 {
    if dwords >= 16 {
        u64::MAX
    } else {
        (1u64 << (dwords * DWORD_BYTES)) - 1
    }
}

/// Returns the enable nibble of slot `slot`.
#[inline]
pub const fn be_nibble(be: u64, slot: usize) -> u8 {
    ((be >> (slot * DWORD_BYTES)) & 0xF) as u8
}

/// Returns `be` with the nibble of slot `slot` replaced by `nibble`.
#[inline]
pub const fn with_be_nibble(be: u64, slot: usize, nibble: u8) -> u64 {
    let shift = slot * DWORD_BYTES;
    (be & !(0xF << shift)) | (((nibble & 0xF) as u64) << shift)
}

/// Enable bits of slots `from..` (everything above slot `from - 1`).
#[inline]
pub const fn be_from_slot(be: u64, from: usize) -> u64 {
    if from >= 16 { 0 } else { be >> (from * DWORD_BYTES) }
}

/// Number of slots whose enable nibble is nonzero.
pub fn enabled_dwords(be: u64, dwords: usize) -> usize {
    (0..dwords).filter(|&slot| be_nibble(be, slot) != 0).count()
}

/// Index of the highest slot with a nonzero enable nibble.
pub fn last_enabled_slot(be: u64, dwords: usize) -> Option<usize> {
    (0..dwords).rev().find(|&slot| be_nibble(be, slot) != 0)
}
