//! Configuration system for the packetizer model.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline datapath, addressing and simulation constants.
//! 2. **Structures:** Hierarchical config for the packetizer core and the simulation loop.
//! 3. **Enums:** Address width and arbitration policy (datapath width and endianness live
//!    with the code that interprets them and are re-exported here).
//!
//! Configuration is supplied as JSON (`Config::from_json`, `Config::from_json_file`) or
//! built with `Config::default()`. Every field may be omitted.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::error::{Error, Result};

pub use crate::common::dword::DataWidth;
pub use crate::tlp::endian::Endianness;

/// Default configuration constants.
mod defaults {
    use super::{AddressWidth, ArbitrationPolicy, DataWidth, Endianness};

    /// Narrowest datapath, matching a Gen1/Gen2 x1..x4 hard block.
    pub const DATA_WIDTH: DataWidth = DataWidth::W64;

    /// Hard PCIe blocks present header dwords in natural order.
    pub const ENDIANNESS: Endianness = Endianness::Big;

    /// Only 3-dword request headers unless 64-bit addressing is enabled.
    pub const ADDRESS_WIDTH: AddressWidth = AddressWidth::Bits32;

    /// Alternate between requests and completions under contention.
    pub const ARBITRATION: ArbitrationPolicy = ArbitrationPolicy::RoundRobin;

    /// Step budget for `Simulator::run_until_idle`.
    pub const MAX_STEPS: u64 = 1_000_000;
}

/// Address width supported by the request path.
///
/// Deserializes from the width in bits (`32` or `64`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum AddressWidth {
    /// Every request uses a 3-dword header.
    #[default]
    Bits32,
    /// Requests whose address has a nonzero upper half use a 4-dword header.
    Bits64,
}

impl AddressWidth {
    /// Width in bits.
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits32 => 32,
            Self::Bits64 => 64,
        }
    }
}

impl TryFrom<u32> for AddressWidth {
    type Error = Error;

    fn try_from(bits: u32) -> Result<Self> {
        match bits {
            32 => Ok(Self::Bits32),
            64 => Ok(Self::Bits64),
            other => Err(Error::UnsupportedAddressWidth(other)),
        }
    }
}

impl From<AddressWidth> for u32 {
    fn from(width: AddressWidth) -> Self {
        width.bits()
    }
}

/// Arbitration between the request and completion streams.
///
/// Every policy is packet-atomic; they differ only in who goes first under contention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbitrationPolicy {
    /// Alternate, starting with requests.
    #[default]
    #[serde(alias = "RoundRobin")]
    RoundRobin,
    /// Requests always win.
    #[serde(alias = "RequestFirst")]
    RequestFirst,
    /// Completions always win.
    #[serde(alias = "CompletionFirst")]
    CompletionFirst,
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use tlpsim_core::config::{Config, DataWidth};
///
/// let config = Config::default();
/// assert_eq!(config.packetizer.data_width, DataWidth::W64);
///
/// let config = Config::from_json(r#"{
///     "packetizer": { "data_width": 256, "endianness": "little", "address_width": 64 },
///     "simulation": { "max_steps": 5000 }
/// }"#).unwrap();
/// assert_eq!(config.packetizer.data_width.dwords(), 8);
/// assert_eq!(config.simulation.max_steps, 5000);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Packetizer core parameters.
    #[serde(default)]
    pub packetizer: PacketizerConfig,
    /// Simulation loop parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Config {
    /// Parses a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed JSON or unsupported width values.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise as [`Config::from_json`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

/// Packetizer core parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketizerConfig {
    /// Physical datapath width.
    #[serde(default = "PacketizerConfig::default_data_width")]
    pub data_width: DataWidth,

    /// Byte order expected by the physical layer.
    #[serde(default = "PacketizerConfig::default_endianness")]
    pub endianness: Endianness,

    /// Whether 64-bit (4-dword header) requests may be emitted.
    #[serde(default = "PacketizerConfig::default_address_width")]
    pub address_width: AddressWidth,

    /// Request/completion arbitration policy.
    #[serde(default = "PacketizerConfig::default_arbitration")]
    pub arbitration: ArbitrationPolicy,
}

impl PacketizerConfig {
    const fn default_data_width() -> DataWidth {
        defaults::DATA_WIDTH
    }

    const fn default_endianness() -> Endianness {
        defaults::ENDIANNESS
    }

    const fn default_address_width() -> AddressWidth {
        defaults::ADDRESS_WIDTH
    }

    const fn default_arbitration() -> ArbitrationPolicy {
        defaults::ARBITRATION
    }
}

impl Default for PacketizerConfig {
    fn default() -> Self {
        Self {
            data_width: defaults::DATA_WIDTH,
            endianness: defaults::ENDIANNESS,
            address_width: defaults::ADDRESS_WIDTH,
            arbitration: defaults::ARBITRATION,
        }
    }
}

/// Simulation loop parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Maximum steps `run_until_idle` may take before reporting a timeout.
    #[serde(default = "SimulationConfig::default_max_steps")]
    pub max_steps: u64,

    /// Emit a trace event for every physical word transferred.
    #[serde(default)]
    pub trace_words: bool,
}

impl SimulationConfig {
    const fn default_max_steps() -> u64 {
        defaults::MAX_STEPS
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_steps: defaults::MAX_STEPS,
            trace_words: false,
        }
    }
}
