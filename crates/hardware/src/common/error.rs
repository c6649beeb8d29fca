//! Error definitions.
//!
//! This module defines the errors surfaced by the simulator. It covers:
//! 1. **Configuration:** Unsupported datapath or address widths and malformed JSON.
//! 2. **Producer contract:** Requests and completions rejected at submission because the
//!    packetizer core would otherwise emit a corrupt byte stream.
//! 3. **Simulation:** Runs that fail to drain within the configured step budget.
//!
//! The packetizer core itself never returns errors. Protocol violations inside the
//! pipeline are contract violations by the producer and are caught with `debug_assert!`.

use std::io;

use thiserror::Error;

/// Convenience result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors reported by configuration parsing, transaction submission and simulation.
#[derive(Debug, Error)]
pub enum Error {
    /// Datapath width is not one of 64, 128, 256 or 512 bits.
    #[error("unsupported data width: {0} bits (expected 64, 128, 256 or 512)")]
    UnsupportedDataWidth(u32),

    /// Address width is neither 32 nor 64 bits.
    #[error("unsupported address width: {0} bits (expected 32 or 64)")]
    UnsupportedAddressWidth(u32),

    /// A request declared a length of zero dwords.
    #[error("request length must be at least one dword")]
    ZeroLengthRequest,

    /// A request or completion exceeds the 1024-dword TLP length limit.
    #[error("length of {0} dwords exceeds the 1024-dword TLP limit")]
    LengthTooLarge(usize),

    /// A write request's payload does not match its declared length.
    #[error("write payload holds {actual} dwords but the request declares {declared}")]
    PayloadLengthMismatch {
        /// Declared length in dwords.
        declared: usize,
        /// Dwords actually supplied.
        actual: usize,
    },

    /// A 64-bit address was submitted to a packetizer configured for 32-bit addressing.
    #[error("address {0:#x} needs 64-bit addressing but the packetizer is configured for 32 bits")]
    AddressOutOfRange(u64),

    /// The simulation did not drain within the step budget.
    #[error("simulation did not drain within {0} steps")]
    Timeout(u64),

    /// Malformed JSON configuration or workload.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure reading a configuration or workload file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
