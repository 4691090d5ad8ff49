//! # Trace Stream Tests
//!
//! Verifies memory-write run grouping, the per-category line caps, and
//! the exact line formats downstream tooling parses.

use crate::common::capture_logger;
use pretty_assertions::assert_eq;
use rvcosim_core::model::{Channel, PeripheralRequest};
use rvcosim_core::trace::ClockPhase;

fn sample_bytes() -> [u8; 16] {
    let mut bytes = [0u8; 16];
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = (i + 1) as u8;
    }
    bytes
}

// ──────────────────────────────────────────────────────────
// Memory-write grouping
// ──────────────────────────────────────────────────────────

#[test]
fn contiguous_runs_become_one_line_each() {
    let (mut logger, mem, _bus) = capture_logger(50, 200);
    // Lanes 0,1,2 and lane 5 enabled: two runs.
    logger
        .memory_write(7, 0x8000_0000, &sample_bytes(), 0b0000_0000_0010_0111)
        .unwrap();
    assert_eq!(
        mem.lines(),
        vec![
            "7 PC 0 : MEM[0x80000000] <= 3 bytes : 0x030201".to_string(),
            "7 PC 0 : MEM[0x80000005] <= 1 bytes : 0x06".to_string(),
        ]
    );
}

#[test]
fn full_mask_is_a_single_sixteen_byte_line() {
    let (mut logger, mem, _bus) = capture_logger(50, 200);
    logger
        .memory_write(12, 0x8000_0040, &sample_bytes(), 0xFFFF)
        .unwrap();
    assert_eq!(
        mem.lines(),
        vec!["12 PC 0 : MEM[0x80000040] <= 16 bytes : 0x100f0e0d0c0b0a090807060504030201".to_string()]
    );
}

#[test]
fn empty_mask_writes_no_lines() {
    let (mut logger, mem, _bus) = capture_logger(50, 200);
    logger.memory_write(3, 0x8000_0000, &sample_bytes(), 0).unwrap();
    assert!(mem.contents().is_empty());
}

#[test]
fn trailing_run_reaches_the_last_lane() {
    let (mut logger, mem, _bus) = capture_logger(50, 200);
    logger
        .memory_write(1, 0x8000_0000, &sample_bytes(), 0b1100_0000_0000_0000)
        .unwrap();
    assert_eq!(
        mem.lines(),
        vec!["1 PC 0 : MEM[0x8000000e] <= 2 bytes : 0x100f".to_string()]
    );
}

// ──────────────────────────────────────────────────────────
// Line caps
// ──────────────────────────────────────────────────────────

#[test]
fn event_lines_stop_at_the_cap_but_counting_continues() {
    let (mut logger, _mem, bus) = capture_logger(50, 2);
    for cycle in 0..5 {
        logger
            .event_command(Channel::Instruction, cycle, 0x8000_0000, false)
            .unwrap();
    }
    assert_eq!(bus.lines().len(), 2);
    assert_eq!(logger.counters.cmds.i, 5);
}

#[test]
fn event_caps_are_tracked_per_category() {
    let (mut logger, _mem, bus) = capture_logger(50, 1);
    logger.event_command(Channel::Instruction, 0, 0x8000_0000, false).unwrap();
    logger.event_command(Channel::Data, 0, 0x8000_0000, true).unwrap();
    logger.event_write_data(Channel::Data, 0, 0xFFFF).unwrap();
    // Three different categories, each under its own cap.
    assert_eq!(bus.lines().len(), 3);
}

#[test]
fn phase_lines_stop_at_the_cap() {
    let (mut logger, _mem, bus) = capture_logger(3, 200);
    for cycle in 0..10 {
        logger
            .phase_command(ClockPhase::Low, cycle, 0x8000_0000, true, false)
            .unwrap();
    }
    assert_eq!(bus.lines().len(), 3);
    assert_eq!(logger.counters.d_cmd_phase, 10);
}

// ──────────────────────────────────────────────────────────
// Line formats
// ──────────────────────────────────────────────────────────

#[test]
fn phase_line_formats() {
    let (mut logger, _mem, bus) = capture_logger(50, 200);
    logger
        .phase_command(ClockPhase::Low, 4, 0x8000_0120, true, true)
        .unwrap();
    logger.phase_write_data(ClockPhase::High, 4, true, 0x00FF).unwrap();
    let req = PeripheralRequest {
        cyc: true,
        stb: true,
        we: true,
        adr: 0xF00F_FF20 >> 2,
        sel: 0xF,
        dat_w: 1,
    };
    logger.phase_peripheral(ClockPhase::High, 5, &req).unwrap();
    assert_eq!(
        bus.lines(),
        vec![
            "time=4 phase=L d_cmd_valid=1 ready=1 addr=0x80000120 we=1".to_string(),
            "time=4 phase=H d_wdata_valid=1 ready=1 we=0x00ff".to_string(),
            "time=5 phase=H periph_req=1 addr=0xf00fff20 we=1 sel=0xf wdata=0x00000001".to_string(),
        ]
    );
}

#[test]
fn event_line_formats() {
    let (mut logger, _mem, bus) = capture_logger(50, 200);
    logger.event_command(Channel::Instruction, 8, 0x8000_0000, false).unwrap();
    logger.event_write_data(Channel::Data, 9, 0x0012).unwrap();
    logger
        .event_read_data(Channel::Instruction, 10, true, [0x1111_1111, 0x2222_2222, 0x3333_3333, 0x4444_4444])
        .unwrap();
    assert_eq!(
        bus.lines(),
        vec![
            "time=8 i_cmd addr=0x80000000 we=0".to_string(),
            "time=9 d_wdata we=0x0012".to_string(),
            "time=10 i_rdata valid=1 ready=1 data0=0x11111111 data1=0x22222222".to_string(),
        ]
    );
}

#[test]
fn read_data_lines_differ_per_channel() {
    let (mut logger, _mem, bus) = capture_logger(50, 200);
    let words = [0x1111_1111, 0x2222_2222, 0x3333_3333, 0x4444_4444];
    logger.event_read_data(Channel::Instruction, 4, false, words).unwrap();
    logger.event_read_data(Channel::Data, 4, true, words).unwrap();
    assert_eq!(
        bus.lines(),
        vec![
            // Payload words appear on the instruction side only.
            "time=4 i_rdata valid=1 ready=0 data0=0x11111111 data1=0x22222222".to_string(),
            "time=4 d_rdata valid=1 ready=1".to_string(),
        ]
    );
}

#[test]
fn summary_line_reports_final_counters() {
    let (mut logger, _mem, bus) = capture_logger(50, 200);
    logger.event_command(Channel::Instruction, 0, 0x8000_0000, false).unwrap();
    logger.event_command(Channel::Instruction, 1, 0x8000_0010, false).unwrap();
    logger.event_command(Channel::Data, 1, 0x8000_0020, true).unwrap();
    logger.event_write_data(Channel::Data, 2, 0xFFFF).unwrap();
    let req = PeripheralRequest {
        cyc: true,
        stb: true,
        we: true,
        adr: 0xF00F_FF20 >> 2,
        sel: 0xF,
        dat_w: 0,
    };
    logger.event_peripheral(3, &req).unwrap();
    logger.finish(true, 0, 4).unwrap();

    let lines = bus.lines();
    assert_eq!(
        lines.last().unwrap(),
        "done=1 exit_code=0 cycles=4 i_cmds=2 d_cmds=1 periph=1 i_wdata=0 d_wdata=1"
    );
}

#[test]
fn timeout_summary_reports_exit_two() {
    let (mut logger, _mem, bus) = capture_logger(50, 200);
    logger.finish(false, 2, 20_000_000).unwrap();
    assert_eq!(
        bus.lines(),
        vec!["done=0 exit_code=2 cycles=20000000 i_cmds=0 d_cmds=0 periph=0 i_wdata=0 d_wdata=0".to_string()]
    );
}
