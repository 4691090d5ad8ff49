//! Trace streams for bus activity and committed memory writes.
//!
//! Two append-only, line-oriented ASCII streams, each entry stamped with
//! the cycle count:
//! 1. **Memory-write trace:** One line per maximal contiguous run of
//!    enabled bytes inside a committed burst. Downstream tooling expects
//!    coalesced runs, so grouping happens here, not one line per byte.
//! 2. **Bus trace:** Half-cycle phase observations and drained-event
//!    lines, each category capped so a hot signal cannot grow the file
//!    without bound, plus one final summary line with aggregate counters
//!    and the exit code.
//!
//! Counters keep counting past the caps; only line emission stops.

use crate::config::TraceConfig;
use crate::error::HarnessError;
use crate::model::{Channel, PeripheralRequest};
use std::fs::File;
use std::io::{BufWriter, Write};

/// Half-cycle phase of the driving clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockPhase {
    /// Clock low phase.
    Low,
    /// Clock high phase.
    High,
}

impl ClockPhase {
    fn tag(self) -> &'static str {
        match self {
            Self::Low => "L",
            Self::High => "H",
        }
    }
}

/// One counter per channel side.
#[derive(Clone, Copy, Debug, Default)]
pub struct PerChannel {
    /// Instruction-side count.
    pub i: u64,
    /// Data-side count.
    pub d: u64,
}

impl PerChannel {
    fn get_mut(&mut self, channel: Channel) -> &mut u64 {
        match channel {
            Channel::Instruction => &mut self.i,
            Channel::Data => &mut self.d,
        }
    }

    /// Count for one side.
    pub fn get(&self, channel: Channel) -> u64 {
        match channel {
            Channel::Instruction => self.i,
            Channel::Data => self.d,
        }
    }
}

/// Aggregate signal counters reported in the summary line.
#[derive(Clone, Copy, Debug, Default)]
pub struct BusCounters {
    /// Accepted commands per channel.
    pub cmds: PerChannel,
    /// Write-data handshakes per channel.
    pub wdata: PerChannel,
    /// Cycles a read response was presented, per channel.
    pub rdata: PerChannel,
    /// Peripheral requests observed.
    pub periph: u64,
    /// Data-channel command-valid phase observations.
    pub d_cmd_phase: u64,
    /// Data-channel write-data-valid phase observations.
    pub d_wdata_phase: u64,
    /// Peripheral-request phase observations.
    pub periph_phase: u64,
}

/// Writer pair for the two trace streams.
pub struct TraceLogger {
    mem: Box<dyn Write>,
    bus: Box<dyn Write>,
    phase_cap: u64,
    event_cap: u64,
    /// Aggregate counters, exposed for the summary and for tests.
    pub counters: BusCounters,
}

impl TraceLogger {
    /// Wraps two already-open sinks; tests pass in-memory buffers.
    pub fn new(mem: Box<dyn Write>, bus: Box<dyn Write>, phase_cap: u64, event_cap: u64) -> Self {
        Self {
            mem,
            bus,
            phase_cap,
            event_cap,
            counters: BusCounters::default(),
        }
    }

    /// Creates both trace files from the configuration.
    pub fn create(config: &TraceConfig) -> Result<Self, HarnessError> {
        let mem = File::create(&config.mem_trace_path).map_err(|source| {
            HarnessError::TraceCreate {
                path: config.mem_trace_path.clone(),
                source,
            }
        })?;
        let bus = File::create(&config.bus_trace_path).map_err(|source| {
            HarnessError::TraceCreate {
                path: config.bus_trace_path.clone(),
                source,
            }
        })?;
        Ok(Self::new(
            Box::new(BufWriter::new(mem)),
            Box::new(BufWriter::new(bus)),
            config.phase_cap,
            config.event_cap,
        ))
    }

    /// Phase observation: data-channel command valid during a half cycle.
    pub fn phase_command(
        &mut self,
        phase: ClockPhase,
        cycle: u64,
        addr: u32,
        ready: bool,
        we: bool,
    ) -> Result<(), HarnessError> {
        if self.counters.d_cmd_phase < self.phase_cap {
            writeln!(
                self.bus,
                "time={cycle} phase={} d_cmd_valid=1 ready={} addr={addr:#010x} we={}",
                phase.tag(),
                u8::from(ready),
                u8::from(we),
            )?;
        }
        self.counters.d_cmd_phase += 1;
        Ok(())
    }

    /// Phase observation: data-channel write-data valid during a half cycle.
    pub fn phase_write_data(
        &mut self,
        phase: ClockPhase,
        cycle: u64,
        ready: bool,
        mask: u16,
    ) -> Result<(), HarnessError> {
        if self.counters.d_wdata_phase < self.phase_cap {
            writeln!(
                self.bus,
                "time={cycle} phase={} d_wdata_valid=1 ready={} we={mask:#06x}",
                phase.tag(),
                u8::from(ready),
            )?;
        }
        self.counters.d_wdata_phase += 1;
        Ok(())
    }

    /// Phase observation: peripheral request present during a half cycle.
    pub fn phase_peripheral(
        &mut self,
        phase: ClockPhase,
        cycle: u64,
        req: &PeripheralRequest,
    ) -> Result<(), HarnessError> {
        if self.counters.periph_phase < self.phase_cap {
            writeln!(
                self.bus,
                "time={cycle} phase={} periph_req=1 addr={:#010x} we={} sel={:#x} wdata={:#010x}",
                phase.tag(),
                req.byte_addr(),
                u8::from(req.we),
                req.sel,
                req.dat_w,
            )?;
        }
        self.counters.periph_phase += 1;
        Ok(())
    }

    /// Drained event: a command was accepted on a channel.
    pub fn event_command(
        &mut self,
        channel: Channel,
        cycle: u64,
        addr: u32,
        we: bool,
    ) -> Result<(), HarnessError> {
        let count = self.counters.cmds.get_mut(channel);
        if *count < self.event_cap {
            writeln!(
                self.bus,
                "time={cycle} {}_cmd addr={addr:#010x} we={}",
                channel.tag(),
                u8::from(we),
            )?;
        }
        *count += 1;
        Ok(())
    }

    /// Drained event: a write-data handshake completed on a channel.
    pub fn event_write_data(
        &mut self,
        channel: Channel,
        cycle: u64,
        mask: u16,
    ) -> Result<(), HarnessError> {
        let count = self.counters.wdata.get_mut(channel);
        if *count < self.event_cap {
            writeln!(
                self.bus,
                "time={cycle} {}_wdata we={mask:#06x}",
                channel.tag(),
            )?;
        }
        *count += 1;
        Ok(())
    }

    /// Drained event: a read response was presented on a channel.
    ///
    /// The instruction side prints the first two payload words; the data
    /// side prints only the handshake. Downstream tooling parses the two
    /// shapes differently.
    pub fn event_read_data(
        &mut self,
        channel: Channel,
        cycle: u64,
        ready: bool,
        words: [u32; 4],
    ) -> Result<(), HarnessError> {
        let count = self.counters.rdata.get_mut(channel);
        if *count < self.event_cap {
            match channel {
                Channel::Instruction => writeln!(
                    self.bus,
                    "time={cycle} i_rdata valid=1 ready={} data0={:#010x} data1={:#010x}",
                    u8::from(ready),
                    words[0],
                    words[1],
                )?,
                Channel::Data => writeln!(
                    self.bus,
                    "time={cycle} d_rdata valid=1 ready={}",
                    u8::from(ready),
                )?,
            }
        }
        *count += 1;
        Ok(())
    }

    /// Drained event: a peripheral request was observed.
    pub fn event_peripheral(
        &mut self,
        cycle: u64,
        req: &PeripheralRequest,
    ) -> Result<(), HarnessError> {
        if self.counters.periph < self.event_cap {
            writeln!(
                self.bus,
                "time={cycle} periph addr={:#010x} we={} sel={:#x} wdata={:#010x}",
                req.byte_addr(),
                u8::from(req.we),
                req.sel,
                req.dat_w,
            )?;
        }
        self.counters.periph += 1;
        Ok(())
    }

    /// Records a committed write burst as maximal contiguous enabled runs.
    ///
    /// Hex bytes are printed most-significant first so downstream parsers
    /// reconstruct the little-endian value directly.
    pub fn memory_write(
        &mut self,
        cycle: u64,
        base: u32,
        bytes: &[u8; 16],
        mask: u16,
    ) -> Result<(), HarnessError> {
        let mut i = 0usize;
        while i < 16 {
            while i < 16 && (mask >> i) & 1 == 0 {
                i += 1;
            }
            if i >= 16 {
                break;
            }
            let start = i;
            while i < 16 && (mask >> i) & 1 != 0 {
                i += 1;
            }
            let len = i - start;
            let mut hex = String::with_capacity(len * 2);
            for j in (start..start + len).rev() {
                hex.push_str(&format!("{:02x}", bytes[j]));
            }
            writeln!(
                self.mem,
                "{cycle} PC 0 : MEM[{:#010x}] <= {len} bytes : 0x{hex}",
                base.wrapping_add(start as u32),
            )?;
        }
        Ok(())
    }

    /// Writes the final summary line and flushes both streams.
    pub fn finish(&mut self, done: bool, exit_code: i32, cycles: u64) -> Result<(), HarnessError> {
        writeln!(
            self.bus,
            "done={} exit_code={exit_code} cycles={cycles} i_cmds={} d_cmds={} periph={} i_wdata={} d_wdata={}",
            u8::from(done),
            self.counters.cmds.i,
            self.counters.cmds.d,
            self.counters.periph,
            self.counters.wdata.i,
            self.counters.wdata.d,
        )?;
        self.mem.flush()?;
        self.bus.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for TraceLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceLogger")
            .field("phase_cap", &self.phase_cap)
            .field("event_cap", &self.event_cap)
            .field("counters", &self.counters)
            .finish()
    }
}
