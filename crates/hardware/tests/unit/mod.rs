//! # Unit Components
//!
//! This module serves as the central hub for the packetizer test suites. It organizes
//! tests for the individual pipeline stages, the assembled packetizer and the simulation
//! harness around it.

/// Arbiter grant, release and policy tests.
pub mod arbiter;


/// Request and completion formatter tests.
pub mod formatter;

/// Header encoder bit-layout tests.
pub mod header;
