//! Cycle-stepped simulation driver.
//!
//! Owns the full simulation state side-by-side — the foreign model, the
//! backing store, both DRAM channels, the peripheral bus, and the trace
//! logger — and advances them through explicit step functions with no
//! module-level state.
//!
//! Each running cycle performs, in order:
//! 1. Present queued read responses and the latched peripheral response.
//! 2. Advance the low then the high clock phase, tracing after each.
//! 3. Drain read-response consumption, the peripheral request (terminal
//!    detection), then both channels' command and write-data phases.
//! 4. Increment the cycle counter.
//!
//! The run ends on the terminal register write, on the cycle budget, or
//! on the model's own stop signal. Termination freezes the harness at
//! that instant: nothing is observed or mutated afterwards.

use crate::bus::dram::DramChannel;
use crate::bus::peripheral::PeripheralBus;
use crate::config::{Config, defaults};
use crate::error::HarnessError;
use crate::mem::SparseMemory;
use crate::model::{Channel, DramReadData, PeripheralResponse, SocModel};
use crate::trace::{BusCounters, ClockPhase, TraceLogger};
use tracing::{info, warn};

/// Driver run state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Reset pulse not yet applied.
    Reset,
    /// Cycle loop in progress.
    Running,
    /// Terminal register written; run frozen.
    Terminal,
    /// Cycle budget exhausted or model stop without termination.
    Timeout,
}

/// Final result of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Terminal write of zero.
    Pass,
    /// Terminal write of a non-zero failure code (not further decoded).
    Fail(u32),
    /// No terminal write within the cycle budget.
    Timeout,
}

impl Outcome {
    /// Process exit status encoding: 0 pass, 1 failure, 2 timeout.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Pass => 0,
            Self::Fail(_) => 1,
            Self::Timeout => 2,
        }
    }
}

/// The cycle-stepped control loop and all simulation state.
pub struct Driver<M: SocModel> {
    model: M,
    mem: SparseMemory,
    ichannel: DramChannel,
    dchannel: DramChannel,
    peripheral: PeripheralBus,
    trace: TraceLogger,
    max_cycles: u64,
    cycle: u64,
    state: RunState,
}

impl<M: SocModel> Driver<M> {
    /// Wires a model to a loaded backing store and open trace sinks.
    pub fn new(model: M, mem: SparseMemory, config: &Config, trace: TraceLogger) -> Self {
        let orphan = config.protocol.orphan_write_data;
        Self {
            model,
            mem,
            ichannel: DramChannel::new(
                Channel::Instruction,
                config.dram.base,
                config.dram.burst_bytes,
                orphan,
            ),
            dchannel: DramChannel::new(
                Channel::Data,
                config.dram.base,
                config.dram.burst_bytes,
                orphan,
            ),
            peripheral: PeripheralBus::new(config.peripheral.tohost_addr),
            trace,
            max_cycles: config.limits.max_cycles,
            cycle: 0,
            state: RunState::Reset,
        }
    }

    /// Cycles started so far (the terminal cycle counts).
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// The backing store, for post-run inspection.
    pub fn memory(&self) -> &SparseMemory {
        &self.mem
    }

    /// The driven model, for post-run inspection.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Aggregate bus counters collected by the trace logger.
    pub fn counters(&self) -> &BusCounters {
        &self.trace.counters
    }

    /// Runs reset and the cycle loop to completion.
    ///
    /// Returns the run outcome; hard failures (trace I/O, fatal protocol
    /// violations) surface as errors instead.
    pub fn run(&mut self) -> Result<Outcome, HarnessError> {
        self.drive_idle_inputs();
        self.apply_reset();
        self.state = RunState::Running;

        let outcome = loop {
            if self.cycle >= self.max_cycles {
                warn!(cycles = self.cycle, "timeout: no terminal write");
                break Outcome::Timeout;
            }
            if self.model.stop_requested() {
                warn!(cycle = self.cycle, "model requested stop before terminal write");
                break Outcome::Timeout;
            }
            if let Some(value) = self.step_cycle()? {
                info!(cycle = self.cycle, value, "terminal register written");
                break if value == 0 {
                    Outcome::Pass
                } else {
                    Outcome::Fail(value)
                };
            }
        };

        self.state = match outcome {
            Outcome::Pass | Outcome::Fail(_) => RunState::Terminal,
            Outcome::Timeout => RunState::Timeout,
        };
        let done = matches!(outcome, Outcome::Pass | Outcome::Fail(_));
        self.trace.finish(done, outcome.exit_code(), self.cycle)?;
        Ok(outcome)
    }

    /// Ties off unused inputs and drives the always-ready handshake lines.
    fn drive_idle_inputs(&mut self) {
        self.model.tie_off();
        for channel in [Channel::Instruction, Channel::Data] {
            self.model.set_command_ready(channel, true);
            self.model.set_write_data_ready(channel, true);
            self.model.set_read_data(channel, DramReadData::default());
        }
        self.model.set_peripheral_response(PeripheralResponse::default());
    }

    /// Ten toggle pairs with reset asserted, ten more deasserted.
    fn apply_reset(&mut self) {
        self.model.set_clock(false);
        self.model.set_reset(true);
        self.model.eval();
        for _ in 0..defaults::RESET_TOGGLES {
            self.toggle_clock();
        }
        self.model.set_reset(false);
        for _ in 0..defaults::RESET_TOGGLES {
            self.toggle_clock();
        }
    }

    fn toggle_clock(&mut self) {
        self.model.set_clock(false);
        self.model.eval();
        self.model.set_clock(true);
        self.model.eval();
    }

    /// Advances one cycle; returns the merged value on a terminal write.
    fn step_cycle(&mut self) -> Result<Option<u32>, HarnessError> {
        let cycle = self.cycle;

        // Present held responses before the edges so they are stable
        // during evaluation.
        self.model.set_peripheral_response(self.peripheral.presented());
        for channel in [Channel::Instruction, Channel::Data] {
            let presented = match channel {
                Channel::Instruction => self.ichannel.presented_read(),
                Channel::Data => self.dchannel.presented_read(),
            }
            .map_or(DramReadData::default(), |r| DramReadData {
                valid: true,
                data: r.words,
            });
            self.model.set_read_data(channel, presented);
        }

        self.model.set_clock(false);
        self.model.eval();
        self.trace_phase(ClockPhase::Low, cycle)?;
        self.model.set_clock(true);
        self.model.eval();
        self.trace_phase(ClockPhase::High, cycle)?;

        Self::consume_reads(&self.model, &mut self.ichannel, &mut self.trace, cycle)?;
        Self::consume_reads(&self.model, &mut self.dchannel, &mut self.trace, cycle)?;

        let req = self.model.peripheral_request();
        if req.active() {
            self.trace.event_peripheral(cycle, &req)?;
        }
        if let Some(value) = self.peripheral.observe(&req) {
            self.cycle += 1;
            return Ok(Some(value));
        }

        Self::drain_channel(
            &self.model,
            &mut self.ichannel,
            &mut self.mem,
            &mut self.trace,
            cycle,
        )?;
        Self::drain_channel(
            &self.model,
            &mut self.dchannel,
            &mut self.mem,
            &mut self.trace,
            cycle,
        )?;

        self.cycle += 1;
        Ok(None)
    }

    /// Per-half-cycle signal observations (data channel and peripheral).
    fn trace_phase(&mut self, phase: ClockPhase, cycle: u64) -> Result<(), HarnessError> {
        let cmd = self.model.command(Channel::Data);
        if cmd.valid {
            let addr = self.dchannel.byte_addr(cmd.addr);
            self.trace.phase_command(phase, cycle, addr, true, cmd.we)?;
        }
        let wdata = self.model.write_data(Channel::Data);
        if wdata.valid {
            self.trace.phase_write_data(phase, cycle, true, wdata.we)?;
        }
        let req = self.model.peripheral_request();
        if req.active() {
            self.trace.phase_peripheral(phase, cycle, &req)?;
        }
        Ok(())
    }

    /// Dequeues the presented read response when the model accepts it.
    fn consume_reads(
        model: &M,
        channel: &mut DramChannel,
        trace: &mut TraceLogger,
        cycle: u64,
    ) -> Result<(), HarnessError> {
        let side = channel.channel();
        if let Some(response) = channel.presented_read() {
            let words = response.words;
            let ready = model.read_data_ready(side);
            trace.event_read_data(side, cycle, ready, words)?;
            if ready {
                channel.consume_read();
            }
        }
        Ok(())
    }

    /// Drains a channel's command and write-data phases for this cycle.
    fn drain_channel(
        model: &M,
        channel: &mut DramChannel,
        mem: &mut SparseMemory,
        trace: &mut TraceLogger,
        cycle: u64,
    ) -> Result<(), HarnessError> {
        let side = channel.channel();

        // Command ready is unconditional, so valid alone is a handshake.
        let cmd = model.command(side);
        if cmd.valid {
            let addr = channel.accept_command(cmd, mem);
            trace.event_command(side, cycle, addr, cmd.we)?;
        }

        let wdata = model.write_data(side);
        if wdata.valid {
            trace.event_write_data(side, cycle, wdata.we)?;
            if let Some(commit) = channel.accept_write_data(&wdata, mem, cycle)? {
                trace.memory_write(cycle, commit.addr, &commit.bytes, commit.mask)?;
            }
        }
        Ok(())
    }
}

impl<M: SocModel> std::fmt::Debug for Driver<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("cycle", &self.cycle)
            .field("state", &self.state)
            .finish()
    }
}
