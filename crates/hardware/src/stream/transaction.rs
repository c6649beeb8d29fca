//! Generic bus transactions presented by the upstream producers.
//!
//! A [`Request`] or [`Completion`] is the whole transaction as the surrounding fabric
//! sees it. The producer hands it to the packetizer one word at a time: each beat repeats
//! the transaction fields as sideband and carries up to `D` payload dwords.

use serde::{Deserialize, Serialize};

use super::{Beat, CompletionBeat, RequestBeat, pack_payload};
use crate::common::dword::DataWidth;

/// Request direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    /// Memory read.
    Read,
    /// Memory write.
    Write,
}

/// Generic memory request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Direction.
    pub op: Op,
    /// Byte address; dword aligned.
    pub address: u64,
    /// Length in dwords (at least 1).
    pub length: usize,
    /// Requester ID.
    pub requester_id: u16,
    /// Tag.
    pub tag: u8,
    /// Payload dwords (writes only).
    #[serde(default)]
    pub payload: Vec<u32>,
}

impl Request {
    /// Memory read of `length` dwords.
    pub const fn read(address: u64, length: usize, requester_id: u16, tag: u8) -> Self {
        Self {
            op: Op::Read,
            address,
            length,
            requester_id,
            tag,
            payload: Vec::new(),
        }
    }

    /// Memory write; the length is taken from the payload.
    pub fn write(address: u64, requester_id: u16, tag: u8, payload: Vec<u32>) -> Self {
        Self {
            op: Op::Write,
            address,
            length: payload.len(),
            requester_id,
            tag,
            payload,
        }
    }

    /// Sideband fields repeated on every beat.
    pub const fn meta(&self) -> RequestMeta {
        RequestMeta {
            op: self.op,
            address: self.address,
            length: self.length,
            requester_id: self.requester_id,
            tag: self.tag,
        }
    }

    /// Splits the request into beats of the given width.
    ///
    /// A read is a single beat with no enabled payload.
    pub fn beats(&self, width: DataWidth) -> Vec<RequestBeat> {
        let meta = self.meta();
        let payload: &[u32] = match self.op {
            Op::Read => &[],
            Op::Write => &self.payload,
        };
        pack_payload(payload, width)
            .into_iter()
            .map(|word| Beat { meta, word })
            .collect()
    }
}

/// Request fields carried on every request beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestMeta {
    /// Direction.
    pub op: Op,
    /// Byte address.
    pub address: u64,
    /// Length in dwords.
    pub length: usize,
    /// Requester ID.
    pub requester_id: u16,
    /// Tag.
    pub tag: u8,
}

/// Generic completion descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Completer ID.
    pub completer_id: u16,
    /// Requester ID of the request being completed.
    pub requester_id: u16,
    /// Tag of the request being completed.
    pub tag: u8,
    /// Low seven bits of the starting byte address (`0..=0x7F`).
    #[serde(default)]
    pub lower_address: u8,
    /// Completion reports an unsupported request instead of data.
    #[serde(default)]
    pub error: bool,
    /// Payload dwords.
    #[serde(default)]
    pub payload: Vec<u32>,
}

impl Completion {
    /// Successful completion returning `payload`.
    pub fn success(
        completer_id: u16,
        requester_id: u16,
        tag: u8,
        lower_address: u8,
        payload: Vec<u32>,
    ) -> Self {
        Self {
            completer_id,
            requester_id,
            tag,
            lower_address,
            error: false,
            payload,
        }
    }

    /// Unsupported-request completion without data.
    pub const fn unsupported(completer_id: u16, requester_id: u16, tag: u8) -> Self {
        Self {
            completer_id,
            requester_id,
            tag,
            lower_address: 0,
            error: true,
            payload: Vec::new(),
        }
    }

    /// Length in dwords.
    pub fn length(&self) -> usize {
        self.payload.len()
    }

    /// Sideband fields repeated on every beat.
    pub fn meta(&self) -> CompletionMeta {
        CompletionMeta {
            completer_id: self.completer_id,
            requester_id: self.requester_id,
            tag: self.tag,
            lower_address: self.lower_address,
            length: self.length(),
            error: self.error,
        }
    }

    /// Splits the completion into beats of the given width.
    pub fn beats(&self, width: DataWidth) -> Vec<CompletionBeat> {
        let meta = self.meta();
        pack_payload(&self.payload, width)
            .into_iter()
            .map(|word| Beat { meta, word })
            .collect()
    }
}

/// Completion fields carried on every completion beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionMeta {
    /// Completer ID.
    pub completer_id: u16,
    /// Requester ID.
    pub requester_id: u16,
    /// Tag.
    pub tag: u8,
    /// Lower address, seven bits.
    pub lower_address: u8,
    /// Length in dwords.
    pub length: usize,
    /// Error completion.
    pub error: bool,
}
