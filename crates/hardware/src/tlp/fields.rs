//! TLP header field codes and bit placement.
//!
//! Every header field is described by a [`HeaderField`]: the dword it lives in, its bit
//! offset inside that dword and its width. Dword `i` of a raw header occupies bits
//! `[32i, 32i + 32)` of a 128-bit value, so a field wider than the remaining bits of its
//! dword (the 64-bit address) simply continues into the next dword.

use serde::{Deserialize, Serialize};

/// Placement of one header field inside the 4-dword raw header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderField {
    /// Dword index (0..4).
    pub dword: u32,
    /// Bit offset inside the dword.
    pub offset: u32,
    /// Field width in bits.
    pub width: u32,
}

impl HeaderField {
    /// Creates a field descriptor.
    pub const fn new(dword: u32, offset: u32, width: u32) -> Self {
        Self {
            dword,
            offset,
            width,
        }
    }

    /// First bit of the field in the 128-bit header.
    pub const fn lsb(self) -> u32 {
        self.dword * 32 + self.offset
    }

    /// Value mask of the field, right-aligned.
    pub const fn mask(self) -> u128 {
        (1u128 << self.width) - 1
    }

    /// Writes `value` (truncated to the field width) into `raw`.
    pub const fn insert(self, raw: u128, value: u64) -> u128 {
        let mask = self.mask();
        (raw & !(mask << self.lsb())) | (((value as u128) & mask) << self.lsb())
    }

    /// Reads the field from `raw`.
    pub const fn extract(self, raw: u128) -> u64 {
        ((raw >> self.lsb()) & self.mask()) as u64
    }
}

/// Fields shared by every header (dword 0).
pub mod common {
    use super::HeaderField;

    /// Format code.
    pub const FMT: HeaderField = HeaderField::new(0, 29, 2);
    /// Type code.
    pub const TYPE: HeaderField = HeaderField::new(0, 24, 5);
    /// Traffic class.
    pub const TC: HeaderField = HeaderField::new(0, 20, 3);
    /// TLP digest present.
    pub const TD: HeaderField = HeaderField::new(0, 15, 1);
    /// Poisoned.
    pub const EP: HeaderField = HeaderField::new(0, 14, 1);
    /// Attributes (relaxed ordering, no snoop).
    pub const ATTR: HeaderField = HeaderField::new(0, 12, 2);
    /// Payload length in dwords; 1024 is encoded as 0.
    pub const LENGTH: HeaderField = HeaderField::new(0, 0, 10);
}

/// Memory request fields (dwords 1..4).
pub mod request {
    use super::HeaderField;

    /// Requester ID.
    pub const REQUESTER_ID: HeaderField = HeaderField::new(1, 16, 16);
    /// Tag.
    pub const TAG: HeaderField = HeaderField::new(1, 8, 8);
    /// Last dword byte-enable.
    pub const LAST_BE: HeaderField = HeaderField::new(1, 4, 4);
    /// First dword byte-enable.
    pub const FIRST_BE: HeaderField = HeaderField::new(1, 0, 4);
    /// Address; spans dwords 2 and 3 for 4-dword headers.
    pub const ADDRESS: HeaderField = HeaderField::new(2, 0, 64);
}

/// Completion fields (dwords 1..3).
pub mod completion {
    use super::HeaderField;

    /// Completer ID.
    pub const COMPLETER_ID: HeaderField = HeaderField::new(1, 16, 16);
    /// Completion status.
    pub const STATUS: HeaderField = HeaderField::new(1, 13, 3);
    /// Byte count modified.
    pub const BCM: HeaderField = HeaderField::new(1, 12, 1);
    /// Remaining byte count; 4096 is encoded as 0.
    pub const BYTE_COUNT: HeaderField = HeaderField::new(1, 0, 12);
    /// Requester ID of the original request.
    pub const REQUESTER_ID: HeaderField = HeaderField::new(2, 16, 16);
    /// Tag of the original request.
    pub const TAG: HeaderField = HeaderField::new(2, 8, 8);
    /// Lower 7 bits of the starting byte address.
    pub const LOWER_ADDRESS: HeaderField = HeaderField::new(2, 0, 7);
}

/// Type code for memory requests.
pub const TYPE_MEM: u8 = 0b00000;

/// Type code for completions.
pub const TYPE_CPL: u8 = 0b01010;

/// Header format: the six direction/width/status combinations the packetizer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fmt {
    /// Memory read, 32-bit address, 3-dword header.
    MemRd32,
    /// Memory write, 32-bit address, 3-dword header.
    MemWr32,
    /// Memory read, 64-bit address, 4-dword header.
    MemRd64,
    /// Memory write, 64-bit address, 4-dword header.
    MemWr64,
    /// Completion without data.
    Cpl,
    /// Completion with data.
    CplD,
}

impl Fmt {
    /// Two-bit format code written to dword 0.
    pub const fn code(self) -> u8 {
        match self {
            Self::MemRd32 | Self::Cpl => 0b00,
            Self::MemRd64 => 0b01,
            Self::MemWr32 | Self::CplD => 0b10,
            Self::MemWr64 => 0b11,
        }
    }

    /// Five-bit type code written alongside the format.
    pub const fn type_code(self) -> u8 {
        match self {
            Self::MemRd32 | Self::MemWr32 | Self::MemRd64 | Self::MemWr64 => TYPE_MEM,
            Self::Cpl | Self::CplD => TYPE_CPL,
        }
    }

    /// Header size in dwords (`H`): 4 when the format code selects 64-bit addressing.
    pub const fn header_dwords(self) -> usize {
        if self.code() & 0b01 != 0 { 4 } else { 3 }
    }

    /// Whether the TLP carries a payload.
    pub const fn has_data(self) -> bool {
        self.code() & 0b10 != 0
    }

    /// Recovers the format from its dword-0 codes.
    pub const fn from_codes(fmt: u8, type_code: u8) -> Option<Self> {
        match (fmt, type_code) {
            (0b00, TYPE_MEM) => Some(Self::MemRd32),
            (0b01, TYPE_MEM) => Some(Self::MemRd64),
            (0b10, TYPE_MEM) => Some(Self::MemWr32),
            (0b11, TYPE_MEM) => Some(Self::MemWr64),
            (0b00, TYPE_CPL) => Some(Self::Cpl),
            (0b10, TYPE_CPL) => Some(Self::CplD),
            _ => None,
        }
    }
}

/// Completion status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CplStatus {
    /// Successful completion.
    #[serde(alias = "sc")]
    Sc,
    /// Unsupported request.
    #[serde(alias = "ur")]
    Ur,
    /// Configuration request retry status.
    #[serde(alias = "crs")]
    Crs,
    /// Completer abort.
    #[serde(alias = "ca")]
    Ca,
}

impl CplStatus {
    /// Three-bit status code.
    pub const fn code(self) -> u8 {
        match self {
            Self::Sc => 0b000,
            Self::Ur => 0b001,
            Self::Crs => 0b010,
            Self::Ca => 0b100,
        }
    }

    /// Recovers a status from its code.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0b000 => Some(Self::Sc),
            0b001 => Some(Self::Ur),
            0b010 => Some(Self::Crs),
            0b100 => Some(Self::Ca),
            _ => None,
        }
    }
}
