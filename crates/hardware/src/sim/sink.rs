//! Downstream transport (PHY) models.
//!
//! A [`PhySink`] decides per cycle whether it accepts a word and receives every word
//! transferred to it. [`CollectSink`] records the stream and applies a configurable
//! [`Backpressure`] pattern, which is enough to exercise every stall path of the
//! header inserter.

use crate::stream::PhyWord;

/// Consumer of the packetizer's physical word stream.
pub trait PhySink {
    /// Whether the sink accepts a word on `cycle`.
    fn ready(&mut self, cycle: u64) -> bool;

    /// Receives a transferred word.
    fn accept(&mut self, word: PhyWord);
}

/// Cycle-indexed ready pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Backpressure {
    /// Always ready.
    #[default]
    None,
    /// Not ready on every `n`th cycle (cycles `n-1`, `2n-1`, ...). `0` and `1` are
    /// treated as [`Backpressure::None`] and as never ready respectively.
    EveryNth(u64),
    /// Ready follows the pattern, repeated. An empty pattern is always ready.
    Pattern(Vec<bool>),
}

impl Backpressure {
    /// Ready value for `cycle`.
    pub fn ready(&self, cycle: u64) -> bool {
        match self {
            Self::None | Self::EveryNth(0) => true,
            Self::EveryNth(n) => cycle % n != n - 1,
            Self::Pattern(pattern) if pattern.is_empty() => true,
            Self::Pattern(pattern) => pattern[(cycle % pattern.len() as u64) as usize],
        }
    }
}

/// Sink that records every word it accepts.
#[derive(Debug, Clone, Default)]
pub struct CollectSink {
    backpressure: Backpressure,
    words: Vec<PhyWord>,
    stalls: u64,
}

impl CollectSink {
    /// Always-ready sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink following the given ready pattern.
    pub fn with_backpressure(backpressure: Backpressure) -> Self {
        Self {
            backpressure,
            ..Self::default()
        }
    }

    /// Words received so far, in order.
    pub fn words(&self) -> &[PhyWord] {
        &self.words
    }

    /// Consumes the sink, returning the received words.
    pub fn into_words(self) -> Vec<PhyWord> {
        self.words
    }

    /// Cycles on which the sink deasserted ready.
    pub const fn stalls(&self) -> u64 {
        self.stalls
    }
}

impl PhySink for CollectSink {
    fn ready(&mut self, cycle: u64) -> bool {
        let ready = self.backpressure.ready(cycle);
        if !ready {
            self.stalls += 1;
        }
        ready
    }

    fn accept(&mut self, word: PhyWord) {
        self.words.push(word);
    }
}
