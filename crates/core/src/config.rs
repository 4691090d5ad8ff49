//! Configuration system for the co-simulation harness.
//!
//! This module defines all configuration structures used to parameterize a
//! run. It provides:
//! 1. **Defaults:** Baseline constants (DRAM window, termination register,
//!    cycle budget, trace caps) matching the reference SoC memory map.
//! 2. **Structures:** Hierarchical config for DRAM, peripheral, trace,
//!    limit, and protocol settings.
//!
//! Configuration is supplied via JSON (`Config::from_json_file`) or use
//! `Config::default()` for the CLI.

use crate::error::HarnessError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration constants for the harness.
pub mod defaults {
    /// Base physical address of the DRAM window exposed to both channels.
    ///
    /// Channel command addresses are block indices relative to this base.
    pub const DRAM_BASE: u32 = 0x8000_0000;

    /// Bytes moved per channel transaction (128-bit native port).
    pub const BURST_BYTES: u32 = 16;

    /// Address of the termination status register on the peripheral bus.
    ///
    /// A write here ends the run; the merged value encodes pass (0) or a
    /// failure code (non-zero).
    pub const TOHOST_ADDR: u32 = 0xF00F_FF20;

    /// Cycle budget before the run is declared a timeout.
    pub const MAX_CYCLES: u64 = 20_000_000;

    /// Clock toggle pairs driven with reset asserted, and again deasserted.
    pub const RESET_TOGGLES: u32 = 10;

    /// Per-category cap on half-cycle phase observations in the bus trace.
    pub const PHASE_TRACE_CAP: u64 = 50;

    /// Per-category cap on drained-event lines in the bus trace.
    pub const EVENT_TRACE_CAP: u64 = 200;

    /// Relative path of the committed-memory-write trace.
    pub const MEM_TRACE_PATH: &str = "run.memTrace";

    /// Relative path of the bus-phase/summary trace.
    pub const BUS_TRACE_PATH: &str = "run.logTrace";

    /// Environment variable overriding the ELF conversion utility.
    pub const OBJCOPY_ENV: &str = "RISCV_OBJCOPY";

    /// Default conversion utility, resolved via the process search path.
    pub const OBJCOPY_TOOL: &str = "riscv64-unknown-elf-objcopy";
}

/// Root configuration for a harness run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// DRAM window geometry shared by both channels.
    pub dram: DramConfig,
    /// Peripheral bus settings (termination register address).
    pub peripheral: PeripheralConfig,
    /// Trace sinks and verbosity caps.
    pub trace: TraceConfig,
    /// Run limits (cycle budget).
    pub limits: LimitConfig,
    /// Protocol-violation handling.
    pub protocol: ProtocolConfig,
}

impl Config {
    /// Loads a configuration from a JSON file; missing fields keep defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, HarnessError> {
        let text = fs::read_to_string(path).map_err(|source| HarnessError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| HarnessError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// DRAM window geometry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DramConfig {
    /// Byte address of block index 0 on both channels.
    pub base: u32,
    /// Bytes per burst (one command moves this much).
    pub burst_bytes: u32,
}

impl Default for DramConfig {
    fn default() -> Self {
        Self {
            base: defaults::DRAM_BASE,
            burst_bytes: defaults::BURST_BYTES,
        }
    }
}

/// Peripheral bus settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PeripheralConfig {
    /// Byte address of the termination status register.
    pub tohost_addr: u32,
}

impl Default for PeripheralConfig {
    fn default() -> Self {
        Self {
            tohost_addr: defaults::TOHOST_ADDR,
        }
    }
}

/// Trace output locations and verbosity caps.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Cap on half-cycle phase lines per signal category.
    pub phase_cap: u64,
    /// Cap on drained-event lines per category.
    pub event_cap: u64,
    /// Committed-memory-write trace path.
    pub mem_trace_path: PathBuf,
    /// Bus-phase/summary trace path.
    pub bus_trace_path: PathBuf,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            phase_cap: defaults::PHASE_TRACE_CAP,
            event_cap: defaults::EVENT_TRACE_CAP,
            mem_trace_path: PathBuf::from(defaults::MEM_TRACE_PATH),
            bus_trace_path: PathBuf::from(defaults::BUS_TRACE_PATH),
        }
    }
}

/// Run limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    /// Cycle budget; exceeding it without a termination write is a timeout.
    pub max_cycles: u64,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_cycles: defaults::MAX_CYCLES,
        }
    }
}

/// How to treat bus-protocol violations observed during the run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Policy for a write-data phase arriving with no pending write command.
    pub orphan_write_data: OrphanWriteDataPolicy,
}

/// Policy for an orphan write-data phase (data with no queued command).
///
/// The reference harness dropped these silently; `Warn` keeps the drop but
/// surfaces it, `Fatal` aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanWriteDataPolicy {
    /// Drop the phase silently (reference behavior).
    Ignore,
    /// Drop the phase and emit a diagnostic.
    #[default]
    Warn,
    /// Abort the run with a setup-class error.
    Fatal,
}
