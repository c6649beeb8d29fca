//! Packet-atomic arbiter between the request and completion streams.
//!
//! The arbiter is a two-state machine: `Idle` picks a port according to the configured
//! [`ArbitrationPolicy`]; `Granted(port)` keeps that port selected, even while it has
//! nothing to present, until the port transfers its `last` word. Dwords of two packets
//! therefore never interleave.

use tracing::debug;

use crate::config::ArbitrationPolicy;

/// Arbiter input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    /// Formatted request stream.
    Request,
    /// Formatted completion stream.
    Completion,
}

impl Port {
    /// The opposite port.
    pub const fn other(self) -> Self {
        match self {
            Self::Request => Self::Completion,
            Self::Completion => Self::Request,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArbiterState {
    Idle,
    Granted(Port),
}

/// Packet-atomic two-port arbiter.
#[derive(Debug, Clone)]
pub struct Arbiter {
    policy: ArbitrationPolicy,
    state: ArbiterState,
    /// Port that most recently completed a packet (round-robin pointer).
    last_served: Port,
}

impl Arbiter {
    /// Creates an idle arbiter.
    pub const fn new(policy: ArbitrationPolicy) -> Self {
        Self {
            policy,
            state: ArbiterState::Idle,
            last_served: Port::Completion,
        }
    }

    /// Port whose word is forwarded this step, given which ports present a word.
    ///
    /// Selecting a port while idle locks the grant onto it: the inserter may need several
    /// steps (header words) before it accepts the first input word, and the producer
    /// holds that word valid until it is accepted.
    pub fn arbitrate(&mut self, request_valid: bool, completion_valid: bool) -> Option<Port> {
        let valid = |port: Port| match port {
            Port::Request => request_valid,
            Port::Completion => completion_valid,
        };
        match self.state {
            ArbiterState::Granted(port) => valid(port).then_some(port),
            ArbiterState::Idle => {
                let preferred = match self.policy {
                    ArbitrationPolicy::RoundRobin => self.last_served.other(),
                    ArbitrationPolicy::RequestFirst => Port::Request,
                    ArbitrationPolicy::CompletionFirst => Port::Completion,
                };
                let port = [preferred, preferred.other()]
                    .into_iter()
                    .find(|&port| valid(port))?;
                debug!(?port, "arbiter grant");
                self.state = ArbiterState::Granted(port);
                Some(port)
            }
        }
    }

    /// Records that `port` transferred a word; `last` releases the grant.
    pub fn transfer(&mut self, port: Port, last: bool) {
        debug_assert_eq!(
            self.state,
            ArbiterState::Granted(port),
            "transfer from a port without the grant"
        );
        if last {
            debug!(?port, "arbiter release");
            self.state = ArbiterState::Idle;
            self.last_served = port;
        }
    }

    /// Port currently holding the grant, if a packet is in flight.
    pub const fn granted(&self) -> Option<Port> {
        match self.state {
            ArbiterState::Idle => None,
            ArbiterState::Granted(port) => Some(port),
        }
    }
}
