//! Step-driven simulator: upstream producers, the packetizer and a downstream sink.
//!
//! The simulator owns the two upstream producers as FIFO queues of beats. Each tick it:
//! 1. **Presents:** Offers the head beat of each non-empty queue to the packetizer.
//! 2. **Steps:** Evaluates the packetizer against the sink's ready for this cycle.
//! 3. **Retires:** Pops the beats the packetizer accepted and hands any transferred
//!    physical word to the sink.
//!
//! A beat that was presented but not accepted stays at the head of its queue, which
//! keeps the producer stable under backpressure.

use std::collections::VecDeque;

use tracing::{debug, info};

use super::sink::PhySink;
use crate::common::error::{Error, Result};
use crate::config::{AddressWidth, Config};
use crate::packetizer::{InserterState, Packetizer, StepOutcome};
use crate::stats::PacketizerStats;
use crate::stream::{Completion, CompletionBeat, Op, Request, RequestBeat};

/// Largest TLP payload in dwords.
pub const MAX_LENGTH_DWORDS: usize = 1024;

/// Top-level simulator.
#[derive(Debug, Clone)]
pub struct Simulator {
    packetizer: Packetizer,
    requests: VecDeque<RequestBeat>,
    completions: VecDeque<CompletionBeat>,
    stats: PacketizerStats,
    address_width: AddressWidth,
    max_steps: u64,
    cycle: u64,
}

impl Simulator {
    /// Creates a simulator with empty producer queues.
    pub fn new(config: &Config) -> Self {
        let mut packetizer = Packetizer::new(&config.packetizer);
        packetizer.set_trace_words(config.simulation.trace_words);
        Self {
            packetizer,
            requests: VecDeque::new(),
            completions: VecDeque::new(),
            stats: PacketizerStats::new(config.packetizer.data_width.dwords()),
            address_width: config.packetizer.address_width,
            max_steps: config.simulation.max_steps,
            cycle: 0,
        }
    }

    /// Validates a request and queues its beats on the request port.
    ///
    /// # Errors
    ///
    /// - [`Error::ZeroLengthRequest`] for a zero length.
    /// - [`Error::LengthTooLarge`] above 1024 dwords.
    /// - [`Error::PayloadLengthMismatch`] when a write's payload differs from its length.
    /// - [`Error::AddressOutOfRange`] for an address above 4 GiB under 32-bit addressing.
    pub fn submit_request(&mut self, request: Request) -> Result<()> {
        if request.length == 0 {
            return Err(Error::ZeroLengthRequest);
        }
        if request.length > MAX_LENGTH_DWORDS {
            return Err(Error::LengthTooLarge(request.length));
        }
        if request.op == Op::Write && request.payload.len() != request.length {
            return Err(Error::PayloadLengthMismatch {
                declared: request.length,
                actual: request.payload.len(),
            });
        }
        if self.address_width == AddressWidth::Bits32 && request.address >> 32 != 0 {
            return Err(Error::AddressOutOfRange(request.address));
        }
        debug!(
            op = ?request.op,
            address = request.address,
            length = request.length,
            tag = request.tag,
            "request queued"
        );
        self.requests.extend(request.beats(self.packetizer.width()));
        Ok(())
    }

    /// Validates a completion and queues its beats on the completion port.
    ///
    /// # Errors
    ///
    /// - [`Error::LengthTooLarge`] above 1024 dwords.
    /// - [`Error::PayloadLengthMismatch`] when an error completion carries a payload.
    pub fn submit_completion(&mut self, completion: Completion) -> Result<()> {
        if completion.length() > MAX_LENGTH_DWORDS {
            return Err(Error::LengthTooLarge(completion.length()));
        }
        if completion.error && !completion.payload.is_empty() {
            return Err(Error::PayloadLengthMismatch {
                declared: 0,
                actual: completion.payload.len(),
            });
        }
        debug!(
            length = completion.length(),
            tag = completion.tag,
            error = completion.error,
            "completion queued"
        );
        self.completions.extend(completion.beats(self.packetizer.width()));
        Ok(())
    }

    /// Advances the simulation by one step.
    pub fn tick(&mut self, sink: &mut dyn PhySink) -> StepOutcome {
        let ready = sink.ready(self.cycle);
        let outcome = self
            .packetizer
            .step(self.requests.front(), self.completions.front(), ready);

        if outcome.request_ready {
            let _ = self.requests.pop_front();
        }
        if outcome.completion_ready {
            let _ = self.completions.pop_front();
        }
        if let Some(word) = &outcome.word {
            sink.accept(word.clone());
        }

        self.stats.record(&outcome);
        self.cycle += 1;
        outcome
    }

    /// Whether both queues are drained and no packet is in flight.
    pub fn is_idle(&self) -> bool {
        self.requests.is_empty() && self.completions.is_empty() && self.packetizer.is_idle()
    }

    /// Ticks until idle and returns the number of steps taken.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if the run is not idle after `max_steps` steps.
    pub fn run_until_idle(&mut self, sink: &mut dyn PhySink) -> Result<u64> {
        let mut steps = 0;
        while !self.is_idle() {
            if steps >= self.max_steps {
                return Err(Error::Timeout(self.max_steps));
            }
            let _ = self.tick(sink);
            steps += 1;
        }
        info!(
            steps,
            words = self.stats.words_emitted,
            packets = self.stats.packets_emitted,
            "simulation drained"
        );
        Ok(steps)
    }

    /// Steps simulated so far.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Statistics collected so far.
    pub const fn stats(&self) -> &PacketizerStats {
        &self.stats
    }

    /// Header inserter state.
    pub const fn inserter_state(&self) -> InserterState {
        self.packetizer.inserter_state()
    }

    /// Beats waiting on the request and completion ports.
    pub fn pending(&self) -> (usize, usize) {
        (self.requests.len(), self.completions.len())
    }
}
