//! Common utilities and types shared by the packetizer stages.
//!
//! 1. **Dwords:** Datapath widths and per-dword byte-enable arithmetic.
//! 2. **Error Handling:** The crate-level error type and result alias.

/// Datapath widths and byte-enable helpers.
pub mod dword;

/// Error types.
pub mod error;

pub use dword::{DWORD_BE, DataWidth};
pub use error::{Error, Result};
