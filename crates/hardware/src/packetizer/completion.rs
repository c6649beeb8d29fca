//! Completion formatter: generic completion descriptors to TLP completion headers.

use super::request::convert_header;
use crate::common::dword::{DWORD_BE, be_nibble, with_be_nibble};
use crate::stream::{Beat, CompletionBeat, CompletionMeta, RawTlpBeat, RawTlpMeta, StreamWord};
use crate::tlp::{CompletionHeader, CplStatus, Endianness, Fmt};

/// Maps completion beats to formatted TLP beats.
#[derive(Debug, Clone, Copy)]
pub struct CompletionFormatter {
    endianness: Endianness,
}

impl CompletionFormatter {
    /// Creates a formatter.
    pub const fn new(endianness: Endianness) -> Self {
        Self { endianness }
    }

    /// Builds the structured header.
    ///
    /// Error completions become `Cpl` with unsupported-request status; everything else
    /// is `CplD` with successful status. The byte count is the payload size in bytes.
    /// `lower_address` must fit the seven-bit header field.
    pub fn header(&self, meta: &CompletionMeta) -> CompletionHeader {
        debug_assert!(meta.lower_address <= 0x7F, "lower address is a seven-bit field");
        let (fmt, status) = if meta.error {
            (Fmt::Cpl, CplStatus::Ur)
        } else {
            (Fmt::CplD, CplStatus::Sc)
        };
        CompletionHeader {
            fmt,
            tc: 0,
            td: false,
            ep: false,
            attr: 0,
            length: meta.length as u16,
            completer_id: meta.completer_id,
            status,
            bcm: false,
            byte_count: (meta.length * 4) as u16,
            requester_id: meta.requester_id,
            tag: meta.tag,
            lower_address: meta.lower_address,
        }
    }

    /// Formats one beat.
    ///
    /// Completion enables are dword granular: every payload dword is fully enabled, and
    /// an error completion enables nothing.
    pub fn format(&self, beat: &CompletionBeat) -> RawTlpBeat {
        let header = self.header(&beat.meta);
        let word = &beat.word;
        let be = if beat.meta.error {
            0
        } else {
            (0..word.dwords())
                .filter(|&slot| be_nibble(word.be, slot) != 0)
                .fold(0, |acc, slot| with_be_nibble(acc, slot, DWORD_BE))
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
