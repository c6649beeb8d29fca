//! Structured TLP headers and the header encoder.
//!
//! The encoder turns structured request or completion fields into a width-independent
//! [`RawHeader`] of four dwords. Only the first three dwords are meaningful when the
//! format selects a 3-dword header; the fourth is left zero.

use std::fmt;

use super::fields::{CplStatus, Fmt, HeaderField, common, completion, request};

/// Four header dwords in transmission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RawHeader(pub [u32; 4]);

impl RawHeader {
    /// Builds a header from its 128-bit little-dword representation.
    pub const fn from_bits(raw: u128) -> Self {
        Self([
            raw as u32,
            (raw >> 32) as u32,
            (raw >> 64) as u32,
            (raw >> 96) as u32,
        ])
    }

    /// Returns the 128-bit representation (dword `i` at bits `[32i, 32i + 32)`).
    pub const fn bits(&self) -> u128 {
        (self.0[0] as u128)
            | ((self.0[1] as u128) << 32)
            | ((self.0[2] as u128) << 64)
            | ((self.0[3] as u128) << 96)
    }

    /// Returns header dword `index`.
    #[inline]
    pub const fn dword(&self, index: usize) -> u32 {
        self.0[index]
    }

    /// Reads one field.
    pub const fn field(&self, field: HeaderField) -> u64 {
        field.extract(self.bits())
    }

    /// Format recovered from dword 0, if it is one of the six recognized combinations.
    pub const fn fmt(&self) -> Option<Fmt> {
        Fmt::from_codes(
            self.field(common::FMT) as u8,
            self.field(common::TYPE) as u8,
        )
    }
}

impl fmt::Display for RawHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x} {:08x} {:08x} {:08x}",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

/// Memory request header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    /// Format (one of the four memory request formats).
    pub fmt: Fmt,
    /// Traffic class.
    pub tc: u8,
    /// TLP digest present.
    pub td: bool,
    /// Poisoned.
    pub ep: bool,
    /// Attributes.
    pub attr: u8,
    /// Length in dwords (1..=1024).
    pub length: u16,
    /// Requester ID.
    pub requester_id: u16,
    /// Tag.
    pub tag: u8,
    /// Last dword byte-enable.
    pub last_be: u8,
    /// First dword byte-enable.
    pub first_be: u8,
    /// Address field as it is laid out in dwords 2..4.
    ///
    /// For 64-bit formats the request formatter has already swapped the halves, so the
    /// low 32 bits of this value hold the upper half of the bus address.
    pub address: u64,
}

/// Completion header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionHeader {
    /// Format (`Cpl` or `CplD`).
    pub fmt: Fmt,
    /// Traffic class.
    pub tc: u8,
    /// TLP digest present.
    pub td: bool,
    /// Poisoned.
    pub ep: bool,
    /// Attributes.
    pub attr: u8,
    /// Length in dwords.
    pub length: u16,
    /// Completer ID.
    pub completer_id: u16,
    /// Completion status.
    pub status: CplStatus,
    /// Byte count modified.
    pub bcm: bool,
    /// Remaining byte count.
    pub byte_count: u16,
    /// Requester ID.
    pub requester_id: u16,
    /// Tag.
    pub tag: u8,
    /// Lower address.
    pub lower_address: u8,
}

fn encode_dword0(fmt: Fmt, tc: u8, td: bool, ep: bool, attr: u8, length: u16) -> u128 {
    let mut raw = common::FMT.insert(0, fmt.code().into());
    raw = common::TYPE.insert(raw, fmt.type_code().into());
    raw = common::TC.insert(raw, tc.into());
    raw = common::TD.insert(raw, td.into());
    raw = common::EP.insert(raw, ep.into());
    raw = common::ATTR.insert(raw, attr.into());
    common::LENGTH.insert(raw, length.into())
}

impl RequestHeader {
    /// Serializes the header.
    pub fn encode(&self) -> RawHeader {
        let mut raw = encode_dword0(self.fmt, self.tc, self.td, self.ep, self.attr, self.length);
        raw = request::REQUESTER_ID.insert(raw, self.requester_id.into());
        raw = request::TAG.insert(raw, self.tag.into());
        raw = request::LAST_BE.insert(raw, self.last_be.into());
        raw = request::FIRST_BE.insert(raw, self.first_be.into());
        let address = if self.fmt.header_dwords() == 4 {
            self.address
        } else {
            self.address & 0xFFFF_FFFF
        };
        RawHeader::from_bits(request::ADDRESS.insert(raw, address))
    }
}

impl CompletionHeader {
    /// Serializes the header.
    pub fn encode(&self) -> RawHeader {
        let mut raw = encode_dword0(self.fmt, self.tc, self.td, self.ep, self.attr, self.length);
        raw = completion::COMPLETER_ID.insert(raw, self.completer_id.into());
        raw = completion::STATUS.insert(raw, self.status.code().into());
        raw = completion::BCM.insert(raw, self.bcm.into());
        raw = completion::BYTE_COUNT.insert(raw, self.byte_count.into());
        raw = completion::REQUESTER_ID.insert(raw, self.requester_id.into());
        raw = completion::TAG.insert(raw, self.tag.into());
        raw = completion::LOWER_ADDRESS.insert(raw, self.lower_address.into());
        RawHeader::from_bits(raw)
    }
}
