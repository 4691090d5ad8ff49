//! Pin-level interface of the opaque processor model.
//!
//! The processor under verification is an external, synthesizable component
//! with a fixed named-signal interface. The harness never reaches into it;
//! everything goes through [`SocModel`], which groups the raw pins into
//! typed signal bundles:
//! 1. **Clock/reset:** Driven by the harness, one toggle pair per cycle.
//! 2. **DRAM channels:** Two independent command/write-data/read-data
//!    triples selected by [`Channel`].
//! 3. **Peripheral port:** One unpipelined request/response pair.
//! 4. **Tie-offs:** Interrupt and debug/JTAG inputs held inactive.
//!
//! Tests substitute a scripted fake; the CLI can bind a compiled model
//! through an FFI adapter.

use std::fmt;

/// Selects one of the two independent wide memory ports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Instruction-fetch side.
    Instruction,
    /// Data-access side.
    Data,
}

impl Channel {
    /// Short tag used in trace lines (`i` / `d`).
    pub fn tag(self) -> &'static str {
        match self {
            Self::Instruction => "i",
            Self::Data => "d",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instruction => write!(f, "instruction"),
            Self::Data => write!(f, "data"),
        }
    }
}

/// Command-phase signals of a DRAM channel, sampled after a clock edge.
///
/// `addr` is a block index; the byte address is `base + addr * burst_bytes`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DramCommand {
    /// Command valid strobe.
    pub valid: bool,
    /// Block index within the DRAM window.
    pub addr: u32,
    /// Direction: `true` = write, `false` = read.
    pub we: bool,
}

/// Write-data-phase signals of a DRAM channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DramWriteData {
    /// Data valid strobe.
    pub valid: bool,
    /// 128-bit payload as four little-endian u32 lanes.
    pub data: [u32; 4],
    /// Per-byte write enables, bit i gates byte lane i.
    pub we: u16,
}

/// Read-response signals driven *into* a DRAM channel port.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DramReadData {
    /// Response valid (front of the response queue is being presented).
    pub valid: bool,
    /// 128-bit payload as four little-endian u32 lanes.
    pub data: [u32; 4],
}

/// Peripheral bus request, sampled after a clock edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeripheralRequest {
    /// Cycle select.
    pub cyc: bool,
    /// Strobe; a request is present when `cyc && stb`.
    pub stb: bool,
    /// Direction: `true` = write.
    pub we: bool,
    /// Word address; the byte address is `adr << 2`.
    pub adr: u32,
    /// 4-bit byte-enable mask for writes.
    pub sel: u8,
    /// Write payload.
    pub dat_w: u32,
}

impl PeripheralRequest {
    /// Whether a request is present this cycle.
    pub fn active(&self) -> bool {
        self.cyc && self.stb
    }

    /// Byte address of the request.
    pub fn byte_addr(&self) -> u32 {
        self.adr << 2
    }
}

/// Peripheral bus response driven back to the model one cycle later.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeripheralResponse {
    /// Acknowledge; always positive one cycle after a request.
    pub ack: bool,
    /// Error; never synthesized in normal operation.
    pub err: bool,
    /// Read payload.
    pub dat_r: u32,
}

/// Capability interface over the foreign processor model's pins.
///
/// Setters drive harness-owned inputs, getters sample model-owned outputs.
/// `eval` propagates combinational logic after any input change, mirroring
/// the evaluation step of a compiled RTL model.
pub trait SocModel {
    /// Drives the external clock pin.
    fn set_clock(&mut self, high: bool);
    /// Drives the external reset pin.
    fn set_reset(&mut self, asserted: bool);
    /// Re-evaluates combinational logic.
    fn eval(&mut self);
    /// Drives interrupt lines and debug/JTAG inputs to their inactive
    /// constants. Called once before reset.
    fn tie_off(&mut self);

    /// Drives a channel's command-ready input.
    fn set_command_ready(&mut self, channel: Channel, ready: bool);
    /// Drives a channel's write-data-ready input.
    fn set_write_data_ready(&mut self, channel: Channel, ready: bool);
    /// Presents a read response (or deasserts valid) on a channel.
    fn set_read_data(&mut self, channel: Channel, data: DramReadData);
    /// Drives the latched peripheral response.
    fn set_peripheral_response(&mut self, response: PeripheralResponse);

    /// Samples a channel's command phase.
    fn command(&self, channel: Channel) -> DramCommand;
    /// Samples a channel's write-data phase.
    fn write_data(&self, channel: Channel) -> DramWriteData;
    /// Samples whether the model accepts the presented read response.
    fn read_data_ready(&self, channel: Channel) -> bool;
    /// Samples the peripheral request pins.
    fn peripheral_request(&self) -> PeripheralRequest;

    /// Whether the model signaled an internal stop (the `$finish` analog).
    fn stop_requested(&self) -> bool {
        false
    }
}
