//! Simulation harness around the packetizer core.
//!
//! Provides the upstream producer model (per-port beat queues), the downstream
//! transport model and JSON workloads that drive a run.

/// Downstream transport models.
pub mod sink;
/// Step loop and upstream producers.
pub mod simulator;
/// Transaction lists loaded from JSON.
pub mod workload;

pub use simulator::Simulator;
pub use sink::{Backpressure, CollectSink, PhySink};
pub use workload::Workload;
