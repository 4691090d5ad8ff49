//! Co-simulation harness for a multi-core RISC-V SoC model.
//!
//! This crate emulates everything *outside* an opaque pin-level processor
//! model so that a test image can run to completion:
//! 1. **Memory:** Sparse page-granular backing store shared by both ports.
//! 2. **Bus:** Two split-transaction 128-bit DRAM channels and a narrow
//!    one-outstanding peripheral bus with a one-cycle response latch.
//! 3. **Loader:** Intel-HEX image parsing with external ELF conversion.
//! 4. **Trace:** Bit-exact bus-phase and committed-write trace streams.
//! 5. **Driver:** The deterministic cycle-stepped loop tying it together
//!    and deciding the process exit status.

/// Split-transaction DRAM channel and peripheral bus emulators.
pub mod bus;
/// Harness configuration (defaults, hierarchical config structures).
pub mod config;
/// Cycle-stepped simulation driver and run outcome.
pub mod driver;
/// Error taxonomy for setup failures and protocol violations.
pub mod error;
/// Image loading (Intel HEX records, external ELF conversion).
pub mod loader;
/// Sparse backing-store memory model.
pub mod mem;
/// Pin-level interface of the opaque processor model.
pub mod model;
/// Trace streams for bus phases and committed memory writes.
pub mod trace;

/// Root configuration type; use `Config::default()` or load from JSON.
pub use crate::config::Config;
/// The cycle-stepped control loop; construct with `Driver::new` and `run`.
pub use crate::driver::{Driver, Outcome};
/// Harness-wide error type.
pub use crate::error::HarnessError;
/// Sparse page-granular backing store.
pub use crate::mem::SparseMemory;
/// Capability trait wrapping the foreign model's pins.
pub use crate::model::SocModel;
