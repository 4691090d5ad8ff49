//! Peripheral bus emulator and termination register.
//!
//! A narrow memory-mapped port with one-cycle response latency and at most
//! one outstanding transaction (the requester must wait for ack before
//! issuing the next request, so no queue exists). The bus owns the single
//! well-known status register whose write ends the run:
//!
//! * merged value `0` — pass (exit status 0).
//! * merged value non-zero — reported failure code (exit status 1).
//!
//! Writes are masked read-modify-write: the 4-bit byte-enable selects which
//! payload bytes replace bytes of the register's current value. Reads of
//! the status register return its current value; every other address reads
//! zero. The acknowledgement is structural — computed on observation,
//! presented exactly one cycle later, unconditionally positive.

use crate::model::{PeripheralRequest, PeripheralResponse};

/// Observable state of the request/ack machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusState {
    /// No request in flight.
    Idle,
    /// A request was sampled this cycle; its response is latched.
    RequestObserved,
    /// The latched response is on the pins this cycle.
    ResponsePresented,
}

/// One-outstanding peripheral bus with the termination register.
#[derive(Debug)]
pub struct PeripheralBus {
    tohost_addr: u32,
    status: u32,
    state: BusState,
    latched: PeripheralResponse,
    terminal: Option<u32>,
}

impl PeripheralBus {
    /// Creates an idle bus with the termination register at `tohost_addr`.
    pub fn new(tohost_addr: u32) -> Self {
        Self {
            tohost_addr,
            status: 0,
            state: BusState::Idle,
            latched: PeripheralResponse::default(),
            terminal: None,
        }
    }

    /// The response to drive onto the pins this cycle.
    pub fn presented(&self) -> PeripheralResponse {
        self.latched
    }

    /// Current machine state, for observability and tests.
    pub fn state(&self) -> BusState {
        self.state
    }

    /// Current value of the termination register.
    pub fn status(&self) -> u32 {
        self.status
    }

    /// The merged value of the terminal write, once one has happened.
    pub fn terminal_value(&self) -> Option<u32> {
        self.terminal
    }

    /// Samples the request pins for this cycle and latches next cycle's
    /// response.
    ///
    /// Returns the merged register value when this request was the
    /// terminal write. Once terminal, further requests are neither
    /// observed nor acknowledged.
    pub fn observe(&mut self, req: &PeripheralRequest) -> Option<u32> {
        if self.terminal.is_some() {
            return None;
        }

        self.state = match (self.state, req.active()) {
            (_, true) => BusState::RequestObserved,
            (BusState::RequestObserved, false) => BusState::ResponsePresented,
            (_, false) => BusState::Idle,
        };

        self.latched = PeripheralResponse::default();
        if !req.active() {
            return None;
        }

        self.latched.ack = true;
        let addr = req.byte_addr();
        if req.we {
            let merged = merge_masked(self.status, req.dat_w, req.sel);
            if addr == self.tohost_addr {
                self.status = merged;
                self.terminal = Some(merged);
                return Some(merged);
            }
        } else if addr == self.tohost_addr {
            self.latched.dat_r = self.status;
        }
        None
    }
}

/// Merges `wdata` into `current` under a 4-bit byte-enable mask.
pub fn merge_masked(current: u32, wdata: u32, sel: u8) -> u32 {
    let mut merged = current;
    for b in 0..4 {
        if (sel >> b) & 1 != 0 {
            let shift = 8 * b;
            merged &= !(0xFF << shift);
            merged |= ((wdata >> shift) & 0xFF) << shift;
        }
    }
    merged
}
