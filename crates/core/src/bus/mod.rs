//! Bus emulators attached to the model's ports.
//!
//! This module contains the two port emulators the driver wires to the
//! processor model each cycle:
//! 1. **DramChannel:** Split-transaction 128-bit burst port (one instance
//!    per side, instruction and data).
//! 2. **PeripheralBus:** Unpipelined request/ack port with a one-cycle
//!    response latch, owning the termination status register.

/// Split-transaction DRAM channel emulator.
pub mod dram;

/// One-outstanding peripheral bus with the termination register.
pub mod peripheral;

pub use dram::DramChannel;
pub use peripheral::PeripheralBus;
