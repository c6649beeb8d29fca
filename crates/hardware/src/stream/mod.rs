//! Word streams exchanged between pipeline stages.
//!
//! Every stage boundary carries one [`StreamWord`] per transfer: `D` data dwords, one
//! enable bit per byte and the `first`/`last` packet delimiters. Stages that need
//! packet-level sideband information (transaction fields, the encoded header) wrap the
//! word in a [`Beat`].
//!
//! `valid` is modeled by presence (`Option<&Beat<_>>` holds `Some` while a producer
//! presents a word) and `ready` by a `bool` returned from the consumer's step.
//! A transfer happens exactly on a step where both hold.

use std::fmt;

use crate::common::dword::{DataWidth, be_nibble, enabled_dwords};
use crate::tlp::{Fmt, RawHeader};

/// Transaction types and their beat builders.
pub mod transaction;

pub use transaction::{Completion, CompletionMeta, Op, Request, RequestMeta};

/// One bus word.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamWord {
    /// Data dwords, slot 0 first.
    pub dat: Vec<u32>,
    /// Byte-enable, 4 bits per slot.
    pub be: u64,
    /// First word of a packet.
    pub first: bool,
    /// Last word of a packet.
    pub last: bool,
}

impl StreamWord {
    /// All-zero word of the given width.
    pub fn empty(width: DataWidth) -> Self {
        Self {
            dat: vec![0; width.dwords()],
            be: 0,
            first: false,
            last: false,
        }
    }

    /// Dwords per word.
    pub fn dwords(&self) -> usize {
        self.dat.len()
    }

    /// Number of slots with a nonzero enable nibble.
    pub fn enabled_dwords(&self) -> usize {
        enabled_dwords(self.be, self.dwords())
    }

    /// Iterates `(dword, enable nibble)` pairs in slot order.
    pub fn slots(&self) -> impl Iterator<Item = (u32, u8)> + '_ {
        self.dat
            .iter()
            .enumerate()
            .map(|(slot, &dword)| (dword, be_nibble(self.be, slot)))
    }
}

impl fmt::Display for StreamWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.dwords();
        write!(
            f,
            "{}{} be={:0width$x} dat=",
            if self.first { 'F' } else { '-' },
            if self.last { 'L' } else { '-' },
            self.be,
        )?;
        // Highest slot leftmost, like a waveform viewer shows a bus.
        for (i, dword) in self.dat.iter().rev().enumerate() {
            if i > 0 {
                f.write_str("_")?;
            }
            write!(f, "{dword:08x}")?;
        }
        Ok(())
    }
}

/// A stream word plus the sideband fields that ride alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Beat<M> {
    /// Packet-level sideband (identical on every beat of a packet).
    pub meta: M,
    /// The word itself.
    pub word: StreamWord,
}

/// Sideband of a formatted TLP: the encoded header travels next to the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTlpMeta {
    /// Encoded (and endianness-converted) header.
    pub header: RawHeader,
    /// Format, which fixes the header size.
    pub fmt: Fmt,
}

/// Upstream request beat.
pub type RequestBeat = Beat<RequestMeta>;

/// Upstream completion beat.
pub type CompletionBeat = Beat<CompletionMeta>;

/// Formatted TLP beat consumed by the arbiter and the header inserter.
pub type RawTlpBeat = Beat<RawTlpMeta>;

/// Terminal word handed to the physical layer.
pub type PhyWord = StreamWord;

/// Splits `payload` into `width`-sized words, marking each payload dword with a full
/// enable nibble. An empty payload still yields one word (with zero enables) so that the
/// packet has a `first`/`last` carrier.
pub(crate) fn pack_payload(payload: &[u32], width: DataWidth) -> Vec<StreamWord> {
    let d = width.dwords();
    if payload.is_empty() {
        let mut word = StreamWord::empty(width);
        word.first = true;
        word.last = true;
        return vec![word];
    }
    let count = payload.len().div_ceil(d);
    payload
        .chunks(d)
        .enumerate()
        .map(|(i, chunk)| {
            let mut dat = vec![0; d];
            dat[..chunk.len()].copy_from_slice(chunk);
            StreamWord {
                dat,
                be: crate::common::dword::dword_mask(chunk.len()),
                first: i == 0,
                last: i + 1 == count,
            }
        })
        .collect()
}
