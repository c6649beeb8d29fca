//! Request formatter: generic memory requests to TLP request headers.

use crate::common::dword::{DWORD_BE, be_nibble, last_enabled_slot, with_be_nibble};
use crate::config::AddressWidth;
use crate::stream::{Beat, Op, RawTlpBeat, RawTlpMeta, RequestBeat, RequestMeta, StreamWord};
use crate::tlp::{Endianness, Fmt, RawHeader, RequestHeader};

/// Maps request beats to formatted TLP beats.
///
/// Purely combinational: the formatter holds no state between beats and forwards the
/// downstream `ready` unchanged, so a stalled arbiter stalls the producer.
#[derive(Debug, Clone, Copy)]
pub struct RequestFormatter {
    endianness: Endianness,
    address_width: AddressWidth,
}

impl RequestFormatter {
    /// Creates a formatter.
    pub const fn new(endianness: Endianness, address_width: AddressWidth) -> Self {
        Self {
            endianness,
            address_width,
        }
    }

    /// Builds the structured header for a request.
    ///
    /// 64-bit formats are used only when the packetizer supports 64-bit addressing and
    /// the address has a nonzero upper half. In that case the upper half goes into the
    /// first address dword and the lower half into the second.
    pub fn header(&self, meta: &RequestMeta) -> RequestHeader {
        debug_assert!(meta.length >= 1, "request length must be at least one dword");
        let wide = self.address_width == AddressWidth::Bits64 && meta.address >> 32 != 0;
        let fmt = match (meta.op, wide) {
            (Op::Read, false) => Fmt::MemRd32,
            (Op::Read, true) => Fmt::MemRd64,
            (Op::Write, false) => Fmt::MemWr32,
            (Op::Write, true) => Fmt::MemWr64,
        };
        let address = if wide {
            meta.address.rotate_left(32)
        } else {
            meta.address & 0xFFFF_FFFF
        };
        RequestHeader {
            fmt,
            tc: 0,
            td: false,
            ep: false,
            attr: 0,
            length: meta.length as u16,
            requester_id: meta.requester_id,
            tag: meta.tag,
            last_be: if meta.length > 1 { DWORD_BE } else { 0 },
            first_be: DWORD_BE,
            address,
        }
    }

    /// Formats one beat.
    pub fn format(&self, beat: &RequestBeat) -> RawTlpBeat {
        let header = self.header(&beat.meta);
        let word = &beat.word;
        let be = match beat.meta.op {
            Op::Read => 0,
            Op::Write => payload_be(&header, word),
        };
        Beat {
            meta: RawTlpMeta {
                header: convert_header(header.encode(), self.endianness),
                fmt: header.fmt,
            },
            word: StreamWord {
                dat: word.dat.clone(),
                be,
                first: word.first,
                last: word.last,
            },
        }
    }
}

/// Applies `first_be` to the first payload dword and `last_be` to the final one.
fn payload_be(header: &RequestHeader, word: &StreamWord) -> u64 {
    let mut be = word.be;
    if word.last && header.length != 1 {
        if let Some(slot) = last_enabled_slot(be, word.dwords()) {
            be = with_be_nibble(be, slot, header.last_be);
        }
    }
    if word.first && be_nibble(be, 0) != 0 {
        be = with_be_nibble(be, 0, header.first_be);
    }
    be
}

/// Converts every header dword to the bus byte order.
pub(crate) fn convert_header(header: RawHeader, endianness: Endianness) -> RawHeader {
    let mut dwords = header.0;
    endianness.convert_dwords(&mut dwords);
    RawHeader(dwords)
}
