//! Header inserter: merges the out-of-band header with the in-band payload.
//!
//! One generic machine serves every datapath width. With `D` dwords per word and an
//! `H`-dword header (3 or 4, chosen per packet from the format), the header occupies
//! `ceil(H / D)` output words and its final word leaves `D - (H mod D)` slots that are
//! filled from the head of the payload. From then on every output word is a sliding
//! window: the `H mod D` trailing dwords of the previous input word (held in the carry
//! register) followed by the leading dwords of the next input word.
//!
//! ```text
//! D = 4, H = 3          slot:  0    1    2    3
//!   header word              h0   h1   h2   p0
//!   data word                p1   p2   p3 | p4      <- carry | new input
//!   data word                p5   p6   p7 | p8
//! ```
//!
//! When `H mod D == 0` the payload is already aligned and input words pass through.

use tracing::{debug, warn};

use crate::common::dword::{
    DWORD_BE, DataWidth, be_from_slot, be_nibble, dword_mask, with_be_nibble,
};
use crate::stream::{PhyWord, RawTlpBeat, StreamWord};

/// Inserter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InserterState {
    /// Emitting header words; `count` of them have already been transferred.
    Header {
        /// Header words already transferred for the current packet.
        count: usize,
    },
    /// Emitting payload words; the first `offset` slots of each come from the carry.
    Data {
        /// `H mod D` for the packet in flight.
        offset: usize,
    },
}

/// Trailing dwords of the last accepted input word.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Carry {
    dat: Vec<u32>,
    be: u64,
    last: bool,
}

/// Result of one inserter step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InserterStep {
    /// Word presented on the output this step (`valid`).
    pub word: Option<PhyWord>,
    /// Whether the presented word was transferred downstream.
    pub transferred: bool,
    /// Whether the input word was accepted (`ready` towards the arbiter).
    pub sink_ready: bool,
    /// Header dwords contained in the presented word.
    pub header_dwords: usize,
}

impl InserterStep {
    const fn stall() -> Self {
        Self {
            word: None,
            transferred: false,
            sink_ready: false,
            header_dwords: 0,
        }
    }
}

/// Width-generic header inserter.
#[derive(Debug, Clone)]
pub struct HeaderInserter {
    width: DataWidth,
    state: InserterState,
    carry: Option<Carry>,
}

impl HeaderInserter {
    /// Creates an inserter in the `Header` state.
    pub const fn new(width: DataWidth) -> Self {
        Self {
            width,
            state: InserterState::Header { count: 0 },
            carry: None,
        }
    }

    /// Current state.
    pub const fn state(&self) -> InserterState {
        self.state
    }

    /// Whether no packet is in flight.
    pub const fn is_idle(&self) -> bool {
        matches!(self.state, InserterState::Header { count: 0 }) && self.carry.is_none()
    }

    /// Evaluates one step.
    ///
    /// `sink` is the raw TLP word the arbiter presents (if any) and `source_ready` whether
    /// the downstream consumer accepts a word this step. State and carry update only when
    /// the output word is transferred.
    ///
    /// A word without `first` presented while no packet is open violates the framing.
    /// Debug builds panic on it; release builds accept and drop it with a warning.
    pub fn step(&mut self, sink: Option<&RawTlpBeat>, source_ready: bool) -> InserterStep {
        match self.state {
            InserterState::Header { count } => self.header_step(count, sink, source_ready),
            InserterState::Data { offset: 0 } => self.passthrough_step(sink, source_ready),
            InserterState::Data { offset } => self.window_step(offset, sink, source_ready),
        }
    }

    fn header_step(
        &mut self,
        count: usize,
        sink: Option<&RawTlpBeat>,
        source_ready: bool,
    ) -> InserterStep {
        let Some(beat) = sink else {
            return InserterStep::stall();
        };
        debug_assert!(beat.word.first, "header inserter received a non-first word");
        if !beat.word.first {
            // Mid-packet word with no packet open: the producer broke the framing.
            warn!("dropping word presented without a preceding first word");
            return InserterStep {
                sink_ready: true,
                ..InserterStep::stall()
            };
        }

        let d = self.width.dwords();
        let h = beat.meta.fmt.header_dwords();
        let offset = h % d;
        let base = count * d;
        let final_header_word = count + 1 == h.div_ceil(d);

        let header_dwords = d.min(h - base);
        let mut word = StreamWord::empty(self.width);
        word.first = count == 0;
        for slot in 0..header_dwords {
            word.dat[slot] = beat.meta.header.dword(base + slot);
            word.be = with_be_nibble(word.be, slot, DWORD_BE);
        }

        if !final_header_word {
            if source_ready {
                self.state = InserterState::Header { count: count + 1 };
            }
            return InserterStep {
                word: Some(word),
                transferred: source_ready,
                sink_ready: false,
                header_dwords,
            };
        }

        if offset == 0 {
            // Aligned: the header ends on a word boundary and payload passes through.
            // A packet whose only input word carries no enabled payload ends here.
            word.last = beat.word.last && beat.word.be == 0;
            let ended = word.last;
            if source_ready {
                self.state = if ended {
                    InserterState::Header { count: 0 }
                } else {
                    debug!(fmt = ?beat.meta.fmt, "inserter header -> data (aligned)");
                    InserterState::Data { offset: 0 }
                };
            }
            return InserterStep {
                word: Some(word),
                transferred: source_ready,
                sink_ready: source_ready && ended,
                header_dwords,
            };
        }

        place(&mut word, offset, &beat.word.dat[..d - offset], beat.word.be);
        word.last = beat.word.last && be_from_slot(beat.word.be, d - offset) == 0;
        if source_ready {
            self.latch(beat, word.last, offset);
        }
        InserterStep {
            word: Some(word),
            transferred: source_ready,
            sink_ready: source_ready,
            header_dwords,
        }
    }

    fn passthrough_step(&mut self, sink: Option<&RawTlpBeat>, source_ready: bool) -> InserterStep {
        let Some(beat) = sink else {
            return InserterStep::stall();
        };
        debug_assert!(!beat.word.first, "first word received mid-packet");
        let mut word = beat.word.clone();
        word.first = false;
        if source_ready && word.last {
            debug!("inserter data -> header");
            self.state = InserterState::Header { count: 0 };
        }
        InserterStep {
            word: Some(word),
            transferred: source_ready,
            sink_ready: source_ready,
            header_dwords: 0,
        }
    }

    fn window_step(
        &mut self,
        offset: usize,
        sink: Option<&RawTlpBeat>,
        source_ready: bool,
    ) -> InserterStep {
        let d = self.width.dwords();
        debug_assert!(self.carry.is_some(), "data state without a carry word");
        let Some(carry) = self.carry.as_ref() else {
            self.state = InserterState::Header { count: 0 };
            return InserterStep::stall();
        };

        let mut word = StreamWord::empty(self.width);
        place(
            &mut word,
            0,
            &carry.dat[d - offset..],
            be_from_slot(carry.be, d - offset),
        );

        if carry.last {
            // Flush the leftover dwords of the final input word; trailing slots stay
            // zero in both data and enable.
            word.last = true;
            if source_ready {
                debug!("inserter data -> header (flush)");
                self.state = InserterState::Header { count: 0 };
                self.carry = None;
            }
            return InserterStep {
                word: Some(word),
                transferred: source_ready,
                sink_ready: false,
                header_dwords: 0,
            };
        }

        let Some(beat) = sink else {
            return InserterStep::stall();
        };
        debug_assert!(!beat.word.first, "first word received mid-packet");
        place(&mut word, offset, &beat.word.dat[..d - offset], beat.word.be);
        word.last = beat.word.last && be_from_slot(beat.word.be, d - offset) == 0;
        if source_ready {
            self.latch(beat, word.last, offset);
        }
        InserterStep {
            word: Some(word),
            transferred: source_ready,
            sink_ready: source_ready,
            header_dwords: 0,
        }
    }

    /// Registers an accepted input word: either the packet ended in the word just sent
    /// or the word's trailing dwords are carried into the next output word.
    fn latch(&mut self, beat: &RawTlpBeat, ended: bool, offset: usize) {
        if ended {
            if !matches!(self.state, InserterState::Header { .. }) {
                debug!("inserter data -> header");
            }
            self.state = InserterState::Header { count: 0 };
            self.carry = None;
        } else {
            if matches!(self.state, InserterState::Header { .. }) {
                debug!(fmt = ?beat.meta.fmt, offset, "inserter header -> data");
            }
            self.state = InserterState::Data { offset };
            self.carry = Some(Carry {
                dat: beat.word.dat.clone(),
                be: beat.word.be,
                last: beat.word.last,
            });
        }
    }
}

/// Copies `dat` into consecutive slots starting at `from`, taking one enable nibble per
/// copied dword from the low end of `be`.
fn place(word: &mut StreamWord, from: usize, dat: &[u32], be: u64) {
    let mask = dword_mask(dat.len());
    let be = be & mask;
    for (i, &dword) in dat.iter().enumerate() {
        word.dat[from + i] = dword;
        word.be = with_be_nibble(word.be, from + i, be_nibble(be, i));
    }
}
