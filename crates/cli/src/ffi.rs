//! C ABI adapter for a compiled pin-level SoC model.
//!
//! The compiled model (e.g. a verilated core wrapped by a small C shim)
//! exports the `soc_*` symbols below. Each handle owns one model
//! instance; all pin access goes through the shim so this crate never
//! sees the model's internal layout.

#![allow(unsafe_code)]

use rvcosim_core::model::{
    Channel, DramCommand, DramReadData, DramWriteData, PeripheralRequest, PeripheralResponse,
    SocModel,
};
use std::ffi::c_void;

unsafe extern "C" {
    fn soc_new() -> *mut c_void;
    fn soc_delete(handle: *mut c_void);
    fn soc_eval(handle: *mut c_void);
    fn soc_set_clk(handle: *mut c_void, level: u8);
    fn soc_set_reset(handle: *mut c_void, asserted: u8);
    fn soc_drive_inactive(handle: *mut c_void);
    fn soc_finished(handle: *mut c_void) -> u8;

    fn soc_set_dram_cmd_ready(handle: *mut c_void, channel: u32, ready: u8);
    fn soc_set_dram_wdata_ready(handle: *mut c_void, channel: u32, ready: u8);
    fn soc_set_dram_rdata(
        handle: *mut c_void,
        channel: u32,
        valid: u8,
        d0: u32,
        d1: u32,
        d2: u32,
        d3: u32,
    );
    fn soc_dram_cmd_valid(handle: *mut c_void, channel: u32) -> u8;
    fn soc_dram_cmd_addr(handle: *mut c_void, channel: u32) -> u32;
    fn soc_dram_cmd_we(handle: *mut c_void, channel: u32) -> u8;
    fn soc_dram_wdata_valid(handle: *mut c_void, channel: u32) -> u8;
    fn soc_dram_wdata_word(handle: *mut c_void, channel: u32, index: u32) -> u32;
    fn soc_dram_wdata_mask(handle: *mut c_void, channel: u32) -> u32;
    fn soc_dram_rdata_ready(handle: *mut c_void, channel: u32) -> u8;

    fn soc_set_periph_resp(handle: *mut c_void, ack: u8, err: u8, dat: u32);
    fn soc_periph_cyc(handle: *mut c_void) -> u8;
    fn soc_periph_stb(handle: *mut c_void) -> u8;
    fn soc_periph_we(handle: *mut c_void) -> u8;
    fn soc_periph_adr(handle: *mut c_void) -> u32;
    fn soc_periph_sel(handle: *mut c_void) -> u32;
    fn soc_periph_dat_w(handle: *mut c_void) -> u32;
}

fn channel_index(channel: Channel) -> u32 {
    match channel {
        Channel::Instruction => 0,
        Channel::Data => 1,
    }
}

/// Owned handle to one compiled model instance.
#[derive(Debug)]
pub struct FfiSoc {
    handle: *mut c_void,
}

impl FfiSoc {
    /// Instantiates the linked model.
    pub fn new() -> Self {
        // SAFETY: soc_new allocates and returns an opaque instance the
        // shim guarantees is valid until soc_delete.
        let handle = unsafe { soc_new() };
        assert!(!handle.is_null(), "soc_new returned null");
        Self { handle }
    }
}

impl Drop for FfiSoc {
    fn drop(&mut self) {
        // SAFETY: handle came from soc_new and is dropped exactly once.
        unsafe { soc_delete(self.handle) };
    }
}

impl SocModel for FfiSoc {
    fn set_clock(&mut self, high: bool) {
        unsafe { soc_set_clk(self.handle, u8::from(high)) };
    }

    fn set_reset(&mut self, asserted: bool) {
        unsafe { soc_set_reset(self.handle, u8::from(asserted)) };
    }

    fn eval(&mut self) {
        unsafe { soc_eval(self.handle) };
    }

    fn tie_off(&mut self) {
        unsafe { soc_drive_inactive(self.handle) };
    }

    fn set_command_ready(&mut self, channel: Channel, ready: bool) {
        unsafe { soc_set_dram_cmd_ready(self.handle, channel_index(channel), u8::from(ready)) };
    }

    fn set_write_data_ready(&mut self, channel: Channel, ready: bool) {
        unsafe { soc_set_dram_wdata_ready(self.handle, channel_index(channel), u8::from(ready)) };
    }

    fn set_read_data(&mut self, channel: Channel, data: DramReadData) {
        unsafe {
            soc_set_dram_rdata(
                self.handle,
                channel_index(channel),
                u8::from(data.valid),
                data.data[0],
                data.data[1],
                data.data[2],
                data.data[3],
            );
        }
    }

    fn set_peripheral_response(&mut self, response: PeripheralResponse) {
        unsafe {
            soc_set_periph_resp(
                self.handle,
                u8::from(response.ack),
                u8::from(response.err),
                response.dat_r,
            );
        }
    }

    fn command(&self, channel: Channel) -> DramCommand {
        let ch = channel_index(channel);
        unsafe {
            DramCommand {
                valid: soc_dram_cmd_valid(self.handle, ch) != 0,
                addr: soc_dram_cmd_addr(self.handle, ch),
                we: soc_dram_cmd_we(self.handle, ch) != 0,
            }
        }
    }

    fn write_data(&self, channel: Channel) -> DramWriteData {
        let ch = channel_index(channel);
        unsafe {
            DramWriteData {
                valid: soc_dram_wdata_valid(self.handle, ch) != 0,
                data: [
                    soc_dram_wdata_word(self.handle, ch, 0),
                    soc_dram_wdata_word(self.handle, ch, 1),
                    soc_dram_wdata_word(self.handle, ch, 2),
                    soc_dram_wdata_word(self.handle, ch, 3),
                ],
                we: soc_dram_wdata_mask(self.handle, ch) as u16,
            }
        }
    }

    fn read_data_ready(&self, channel: Channel) -> bool {
        unsafe { soc_dram_rdata_ready(self.handle, channel_index(channel)) != 0 }
    }

    fn peripheral_request(&self) -> PeripheralRequest {
        unsafe {
            PeripheralRequest {
                cyc: soc_periph_cyc(self.handle) != 0,
                stb: soc_periph_stb(self.handle) != 0,
                we: soc_periph_we(self.handle) != 0,
                adr: soc_periph_adr(self.handle),
                sel: (soc_periph_sel(self.handle) & 0xF) as u8,
                dat_w: soc_periph_dat_w(self.handle),
            }
        }
    }

    fn stop_requested(&self) -> bool {
        unsafe { soc_finished(self.handle) != 0 }
    }
}
