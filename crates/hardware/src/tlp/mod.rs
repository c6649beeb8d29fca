//! Transaction Layer Packet definitions.
//!
//! 1. **Fields:** Format/type/status codes and the bit placement of every header field.
//! 2. **Header:** Structured request and completion headers and their 4-dword encoding.
//! 3. **Endianness:** The per-dword byte-order conversion applied on the way to the bus.

/// Endianness conversion.
pub mod endian;

/// Header field codes and placement.
pub mod fields;

/// Header structures and encoder.
pub mod header;

pub use endian::Endianness;
pub use fields::{CplStatus, Fmt};
pub use header::{CompletionHeader, RawHeader, RequestHeader};
