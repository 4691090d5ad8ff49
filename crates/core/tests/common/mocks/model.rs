//! Scripted pin-level model.
//!
//! Replays a per-cycle table of bus stimulus in place of a compiled core
//! and records everything the harness drives onto its inputs, so driver
//! tests can assert both directions of the pin protocol.

use rvcosim_core::model::{
    Channel, DramCommand, DramReadData, DramWriteData, PeripheralRequest, PeripheralResponse,
    SocModel,
};

/// Model outputs replayed during one running cycle.
///
/// Anything not set stays at its inactive default.
#[derive(Clone, Copy, Debug, Default)]
pub struct CycleScript {
    pub i_cmd: DramCommand,
    pub d_cmd: DramCommand,
    pub i_wdata: DramWriteData,
    pub d_wdata: DramWriteData,
    pub i_rdata_ready: bool,
    pub d_rdata_ready: bool,
    pub periph: PeripheralRequest,
}

/// Falling clock edges the driver produces before the first running
/// cycle: the initial low drive makes none, the first toggle pair makes
/// none, and the remaining 19 toggle pairs of the reset sequence make
/// one each.
const PRE_RUN_FALLING_EDGES: u64 = 19;

/// Table-driven fake implementing [`SocModel`].
///
/// The running-cycle index is recovered from falling clock edges, which
/// the driver produces exactly once per cycle after the fixed reset
/// sequence. Cycles beyond the script replay inactive defaults.
pub struct ScriptedModel {
    script: Vec<CycleScript>,
    clock: bool,
    reset: bool,
    falling_edges: u64,
    /// Total rising edges seen.
    pub rising_edges: u64,
    /// Rising edges seen while reset was asserted.
    pub rising_edges_in_reset: u64,
    /// Whether the harness tied off the inactive inputs.
    pub tied_off: bool,
    /// Peripheral responses driven in, in call order. Index 0 is the
    /// pre-reset idle drive; index `1 + n` is the presentation at cycle
    /// `n`.
    pub responses: Vec<PeripheralResponse>,
    /// Instruction-channel read data driven in, same indexing.
    pub i_rdata_in: Vec<DramReadData>,
    /// Data-channel read data driven in, same indexing.
    pub d_rdata_in: Vec<DramReadData>,
    /// Request an internal stop once this running cycle has elapsed.
    pub stop_at: Option<usize>,
}

impl ScriptedModel {
    pub fn new(script: Vec<CycleScript>) -> Self {
        Self {
            script,
            clock: false,
            reset: false,
            falling_edges: 0,
            rising_edges: 0,
            rising_edges_in_reset: 0,
            tied_off: false,
            responses: Vec::new(),
            i_rdata_in: Vec::new(),
            d_rdata_in: Vec::new(),
            stop_at: None,
        }
    }

    /// Running-cycle index, or `None` while still in the reset sequence.
    fn cycle_index(&self) -> Option<usize> {
        self.falling_edges
            .checked_sub(PRE_RUN_FALLING_EDGES + 1)
            .map(|n| n as usize)
    }

    fn entry(&self) -> CycleScript {
        self.cycle_index()
            .and_then(|i| self.script.get(i).copied())
            .unwrap_or_default()
    }
}

impl SocModel for ScriptedModel {
    fn set_clock(&mut self, high: bool) {
        if self.clock && !high {
            self.falling_edges += 1;
        }
        if !self.clock && high {
            self.rising_edges += 1;
            if self.reset {
                self.rising_edges_in_reset += 1;
            }
        }
        self.clock = high;
    }

    fn set_reset(&mut self, asserted: bool) {
        self.reset = asserted;
    }

    fn eval(&mut self) {}

    fn tie_off(&mut self) {
        self.tied_off = true;
    }

    fn set_command_ready(&mut self, _channel: Channel, _ready: bool) {}

    fn set_write_data_ready(&mut self, _channel: Channel, _ready: bool) {}

    fn set_read_data(&mut self, channel: Channel, data: DramReadData) {
        match channel {
            Channel::Instruction => self.i_rdata_in.push(data),
            Channel::Data => self.d_rdata_in.push(data),
        }
    }

    fn set_peripheral_response(&mut self, response: PeripheralResponse) {
        self.responses.push(response);
    }

    fn command(&self, channel: Channel) -> DramCommand {
        match channel {
            Channel::Instruction => self.entry().i_cmd,
            Channel::Data => self.entry().d_cmd,
        }
    }

    fn write_data(&self, channel: Channel) -> DramWriteData {
        match channel {
            Channel::Instruction => self.entry().i_wdata,
            Channel::Data => self.entry().d_wdata,
        }
    }

    fn read_data_ready(&self, channel: Channel) -> bool {
        match channel {
            Channel::Instruction => self.entry().i_rdata_ready,
            Channel::Data => self.entry().d_rdata_ready,
        }
    }

    fn peripheral_request(&self) -> PeripheralRequest {
        self.entry().periph
    }

    fn stop_requested(&self) -> bool {
        match (self.stop_at, self.cycle_index()) {
            (Some(at), Some(index)) => index >= at,
            _ => false,
        }
    }
}
