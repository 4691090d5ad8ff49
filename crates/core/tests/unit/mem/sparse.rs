//! # Sparse Backing Store Tests
//!
//! Verifies sentinel semantics, lazy page allocation, burst reads across
//! page boundaries, and address-space wrapping.

use proptest::prelude::*;
use rvcosim_core::mem::{PAGE_SIZE, SENTINEL, SparseMemory};
use std::collections::HashMap;

#[test]
fn untouched_addresses_read_sentinel() {
    let mem = SparseMemory::new();
    assert_eq!(mem.read(0), SENTINEL);
    assert_eq!(mem.read(0x8000_0000), SENTINEL);
    assert_eq!(mem.read(u32::MAX), SENTINEL);
}

#[test]
fn write_then_read_back() {
    let mut mem = SparseMemory::new();
    mem.write(0x8000_1234, 0x42);
    assert_eq!(mem.read(0x8000_1234), 0x42);
    // Neighbors stay unformatted.
    assert_eq!(mem.read(0x8000_1233), SENTINEL);
    assert_eq!(mem.read(0x8000_1235), SENTINEL);
}

#[test]
fn reads_never_allocate() {
    let mem = SparseMemory::new();
    for addr in [0u32, 0x10_0000, 0x8000_0000, u32::MAX] {
        let _ = mem.read(addr);
    }
    assert_eq!(mem.allocated_pages(), 0);
}

#[test]
fn write_allocates_exactly_one_page() {
    let mut mem = SparseMemory::new();
    mem.write(0x8000_0000, 1);
    assert_eq!(mem.allocated_pages(), 1);
    // Same page, no new allocation.
    mem.write(0x8000_FFFF, 2);
    assert_eq!(mem.allocated_pages(), 1);
    // Different page.
    mem.write(0x8010_0000, 3);
    assert_eq!(mem.allocated_pages(), 2);
}

#[test]
fn burst_read_crosses_page_boundary() {
    let mut mem = SparseMemory::new();
    let start = (PAGE_SIZE as u32) - 8;
    let data: Vec<u8> = (0..16).collect();
    mem.load(start, &data);
    assert_eq!(mem.allocated_pages(), 2);
    assert_eq!(mem.read_burst(start), data.as_slice());
}

#[test]
fn burst_read_wraps_address_space() {
    let mut mem = SparseMemory::new();
    mem.write(0xFFFF_FFFF, 0xAB);
    mem.write(0x0000_0000, 0xCD);
    let burst = mem.read_burst(0xFFFF_FFF8);
    assert_eq!(burst[7], 0xAB);
    assert_eq!(burst[8], 0xCD);
    assert_eq!(burst[0], SENTINEL);
}

#[test]
fn bulk_load_places_every_byte() {
    let mut mem = SparseMemory::new();
    let data: Vec<u8> = (0..64).map(|i| i as u8 ^ 0x5A).collect();
    mem.load(0x8000_0100, &data);
    for (i, expected) in data.iter().enumerate() {
        assert_eq!(mem.read(0x8000_0100 + i as u32), *expected);
    }
}

proptest! {
    /// Last write wins and unwritten addresses stay at the sentinel.
    #[test]
    fn writes_agree_with_reference_map(ops in prop::collection::vec((any::<u32>(), any::<u8>()), 1..64)) {
        let mut mem = SparseMemory::new();
        let mut reference = HashMap::new();
        for (addr, value) in &ops {
            mem.write(*addr, *value);
            reference.insert(*addr, *value);
        }
        for (addr, value) in &reference {
            prop_assert_eq!(mem.read(*addr), *value);
        }
    }
}
