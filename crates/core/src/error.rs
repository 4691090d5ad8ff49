//! Error taxonomy for the harness.
//!
//! Every failure here is terminal for the run: setup errors (files, the
//! external conversion tool) and protocol violations promoted to fatal by
//! configuration. The CLI maps all of them to process exit status 2;
//! pass/fail of the simulated program itself is an [`Outcome`], not an
//! error.
//!
//! [`Outcome`]: crate::driver::Outcome

use crate::model::Channel;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal harness errors.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The program image (ELF or HEX) could not be read.
    #[error("failed to open image '{path}': {source}")]
    ImageOpen {
        /// Path passed on the command line or produced by conversion.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// No conversion utility was found on the search path.
    #[error("objcopy '{tool}' not found (set RISCV_OBJCOPY to override): {source}")]
    ObjcopyNotFound {
        /// The tool name that was looked up.
        tool: String,
        /// Lookup failure detail.
        source: which::Error,
    },

    /// The conversion utility could not be spawned.
    #[error("failed to run objcopy '{tool}': {source}")]
    ObjcopySpawn {
        /// Resolved tool path.
        tool: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The conversion utility exited non-zero or produced no output.
    #[error("objcopy conversion of '{path}' failed (exit status {status})")]
    Conversion {
        /// ELF image being converted.
        path: PathBuf,
        /// Tool exit status (-1 if killed by a signal).
        status: i32,
    },

    /// A trace sink could not be created.
    #[error("failed to create trace file '{path}': {source}")]
    TraceCreate {
        /// Configured trace path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing to an already-open trace sink failed.
    #[error("trace stream write failed: {0}")]
    TraceWrite(#[from] std::io::Error),

    /// A write-data phase arrived with no pending write command and the
    /// configured policy is fatal.
    #[error("orphan write data on {channel} channel at cycle {cycle}: no pending write command")]
    OrphanWriteData {
        /// Channel on which the violation was observed.
        channel: Channel,
        /// Cycle of the offending data phase.
        cycle: u64,
    },

    /// A configuration file could not be read.
    #[error("failed to read config '{path}': {source}")]
    ConfigRead {
        /// Configuration file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration file could not be parsed.
    #[error("failed to parse config '{path}': {source}")]
    ConfigParse {
        /// Configuration file path.
        path: PathBuf,
        /// JSON parse error.
        source: serde_json::Error,
    },
}
