//! PCIe TLP packetizer model.
//!
//! This crate implements a step-accurate model of a PCIe transaction-layer packetizer:
//! 1. **TLP:** Header field layout, format/type codes, the header encoder and endianness.
//! 2. **Stream:** Bus words, sideband beats and the generic request/completion transactions.
//! 3. **Packetizer:** Request and completion formatters, the packet-atomic arbiter and the
//!    width-generic header inserter.
//! 4. **Simulation:** Producer queues, downstream sink models, workloads, configuration,
//!    and statistics collection.

/// Common types (datapath width, byte-enable helpers, errors).
pub mod common;
/// Packetizer and simulation configuration.
pub mod config;
/// Formatters, arbiter and header inserter.
pub mod packetizer;
/// Simulator, sinks and workloads.
pub mod sim;
/// Packetizer statistics collection and reporting.
pub mod stats;
/// Bus words and transactions.
pub mod stream;
/// TLP header definitions and encoding.
pub mod tlp;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Crate error and result types.
pub use crate::common::{Error, Result};
/// The packetizer core; drive it directly with `Packetizer::step`.
pub use crate::packetizer::Packetizer;
/// Step loop around the packetizer; construct with `Simulator::new`.
pub use crate::sim::Simulator;
