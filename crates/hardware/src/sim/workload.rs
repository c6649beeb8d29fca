//! JSON workloads.
//!
//! A workload lists the transactions each producer submits, in order:
//!
//! ```json
//! {
//!   "requests": [
//!     { "op": "write", "address": 4096, "length": 2, "requester_id": 256, "tag": 1,
//!       "payload": [1, 2] }
//!   ],
//!   "completions": [
//!     { "completer_id": 1, "requester_id": 256, "tag": 7, "payload": [3] }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::simulator::Simulator;
use crate::common::error::Result;
use crate::stream::{Completion, Request};

/// Transactions for both producers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workload {
    /// Requests, in submission order.
    pub requests: Vec<Request>,
    /// Completions, in submission order.
    pub completions: Vec<Completion>,
}

impl Workload {
    /// Parses a workload from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::common::Error::Json`] on malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a workload file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::common::Error::Io`] if the file cannot be read, otherwise as
    /// [`Workload::from_json`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Total transactions.
    pub fn len(&self) -> usize {
        self.requests.len() + self.completions.len()
    }

    /// Whether the workload holds no transactions.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty() && self.completions.is_empty()
    }

    /// Submits every transaction to the simulator.
    ///
    /// # Errors
    ///
    /// Stops at the first transaction the simulator rejects and returns its error.
    pub fn submit(&self, sim: &mut Simulator) -> Result<()> {
        for request in &self.requests {
            sim.submit_request(request.clone())?;
        }
        for completion in &self.completions {
            sim.submit_completion(completion.clone())?;
        }
        Ok(())
    }
}
