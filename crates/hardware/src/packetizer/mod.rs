//! TLP packetizer pipeline.
//!
//! Data flows through four stages, evaluated in order on every step:
//! 1. **Formatters:** Requests and completions become raw TLP words whose sideband carries
//!    the encoded, endianness-converted header.
//! 2. **Arbiter:** One of the two raw streams is granted, packet by packet.
//! 3. **Header Inserter:** Header and payload dwords are packed into physical words.
//! 4. **Output conversion:** Data and enables of every physical word are converted to the
//!    bus byte order.
//!
//! The formatters and the output conversion are combinational. Only the arbiter grant
//! and the inserter state (including its carry register) persist across steps.

/// Packet-atomic arbiter.
pub mod arbiter;

/// Completion formatter.
pub mod completion;

/// Width-generic header inserter.
pub mod inserter;

/// Request formatter.
pub mod request;

use tracing::trace;

use crate::common::dword::DataWidth;
use crate::config::PacketizerConfig;
use crate::stream::{CompletionBeat, PhyWord, RequestBeat};
use crate::tlp::Endianness;

pub use arbiter::{Arbiter, Port};
pub use completion::CompletionFormatter;
pub use inserter::{HeaderInserter, InserterState};
pub use request::RequestFormatter;

/// What happened on the packetizer's three ports during one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// The presented request word was accepted.
    pub request_ready: bool,
    /// The presented completion word was accepted.
    pub completion_ready: bool,
    /// Physical word transferred downstream.
    pub word: Option<PhyWord>,
    /// A physical word was presented (whether or not it was transferred).
    pub presented: bool,
    /// Port forwarded by the arbiter this step.
    pub port: Option<Port>,
    /// Port of the packet the transferred word belongs to.
    ///
    /// Differs from `port` on a carry flush, which completes a packet after the arbiter
    /// has already released its grant.
    pub packet: Option<Port>,
    /// Header dwords contained in the transferred word.
    pub header_dwords: usize,
}

/// The complete packetizer: formatters, arbiter and header inserter.
#[derive(Debug, Clone)]
pub struct Packetizer {
    width: DataWidth,
    endianness: Endianness,
    requests: RequestFormatter,
    completions: CompletionFormatter,
    arbiter: Arbiter,
    inserter: HeaderInserter,
    in_flight: Option<Port>,
    trace_words: bool,
}

impl Packetizer {
    /// Builds a packetizer from its configuration.
    pub const fn new(config: &PacketizerConfig) -> Self {
        Self {
            width: config.data_width,
            endianness: config.endianness,
            requests: RequestFormatter::new(config.endianness, config.address_width),
            completions: CompletionFormatter::new(config.endianness),
            arbiter: Arbiter::new(config.arbitration),
            inserter: HeaderInserter::new(config.data_width),
            in_flight: None,
            trace_words: cfg!(feature = "always-trace"),
        }
    }

    /// Enables or disables per-word trace events.
    pub fn set_trace_words(&mut self, enabled: bool) {
        self.trace_words = enabled || cfg!(feature = "always-trace");
    }

    /// Datapath width.
    pub const fn width(&self) -> DataWidth {
        self.width
    }

    /// Whether no packet is in flight anywhere in the pipeline.
    pub const fn is_idle(&self) -> bool {
        self.inserter.is_idle() && self.arbiter.granted().is_none()
    }

    /// Header inserter state.
    pub const fn inserter_state(&self) -> InserterState {
        self.inserter.state()
    }

    /// Evaluates one step.
    ///
    /// `request` and `completion` are the words the producers present this step (`None`
    /// when not valid); `out_ready` is the downstream ready. A producer whose word is not
    /// accepted must present the same word again on the next step.
    pub fn step(
        &mut self,
        request: Option<&RequestBeat>,
        completion: Option<&CompletionBeat>,
        out_ready: bool,
    ) -> StepOutcome {
        let raw_request = request.map(|beat| self.requests.format(beat));
        let raw_completion = completion.map(|beat| self.completions.format(beat));

        let port = self
            .arbiter
            .arbitrate(raw_request.is_some(), raw_completion.is_some());
        let sink = match port {
            Some(Port::Request) => raw_request.as_ref(),
            Some(Port::Completion) => raw_completion.as_ref(),
            None => None,
        };

        let step = self.inserter.step(sink, out_ready);
        let mut outcome = StepOutcome {
            presented: step.word.is_some(),
            port,
            ..StepOutcome::default()
        };

        if step.sink_ready {
            if let (Some(port), Some(beat)) = (port, sink) {
                self.arbiter.transfer(port, beat.word.last);
                match port {
                    Port::Request => outcome.request_ready = true,
                    Port::Completion => outcome.completion_ready = true,
                }
            }
        }

        if step.transferred {
            if step.word.as_ref().is_some_and(|word| word.first) {
                self.in_flight = port;
            }
            outcome.packet = self.in_flight;
            outcome.header_dwords = step.header_dwords;
            outcome.word = step.word.map(|word| self.to_bus(word));
        }
        outcome
    }

    /// Applies the output byte-order conversion.
    fn to_bus(&self, mut word: PhyWord) -> PhyWord {
        let dwords = word.dwords();
        self.endianness.convert_dwords(&mut word.dat);
        word.be = self.endianness.convert_be(word.be, dwords);
        if self.trace_words {
            trace!(width = %self.width, %word, "phy word");
        }
        word
    }
}
