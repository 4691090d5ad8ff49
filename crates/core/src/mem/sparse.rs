//! Sparse Backing Store.
//!
//! A byte-addressable 32-bit address space backed by a fixed directory of
//! lazily allocated 1 MiB pages. Untouched bytes read as the unformatted
//! sentinel `0xFF`, matching erased-flash semantics expected by the test
//! images. Pages are allocated on first write and never freed mid-run.

/// Sentinel byte returned for never-written addresses.
pub const SENTINEL: u8 = 0xFF;

/// Page size in bytes (1 MiB).
pub const PAGE_SIZE: usize = 1 << 20;

/// Number of address bits covered by the in-page offset.
pub const PAGE_SHIFT: u32 = 20;

/// Directory slots covering the full 32-bit space.
pub const PAGE_COUNT: usize = 1 << 12;

/// Sparse page-granular byte store.
///
/// Every 32-bit address is valid; there is no bounds error by construction.
pub struct SparseMemory {
    pages: Vec<Option<Box<[u8]>>>,
}

impl Default for SparseMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseMemory {
    /// Creates an empty store with no pages allocated.
    pub fn new() -> Self {
        let mut pages = Vec::with_capacity(PAGE_COUNT);
        pages.resize_with(PAGE_COUNT, || None);
        Self { pages }
    }

    /// Reads one byte; untouched addresses return [`SENTINEL`].
    ///
    /// Reads never allocate — the observable behavior is identical to
    /// allocate-on-read and keeps read-heavy runs sparse.
    pub fn read(&self, addr: u32) -> u8 {
        let page = (addr >> PAGE_SHIFT) as usize;
        let offset = (addr as usize) & (PAGE_SIZE - 1);
        self.pages[page].as_ref().map_or(SENTINEL, |p| p[offset])
    }

    /// Writes one byte, allocating the covering page on demand.
    pub fn write(&mut self, addr: u32, value: u8) {
        let page = (addr >> PAGE_SHIFT) as usize;
        let offset = (addr as usize) & (PAGE_SIZE - 1);
        let page = self.pages[page]
            .get_or_insert_with(|| vec![SENTINEL; PAGE_SIZE].into_boxed_slice());
        page[offset] = value;
    }

    /// Reads a 16-byte burst starting at `addr` (wrapping addressing).
    pub fn read_burst(&self, addr: u32) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = self.read(addr.wrapping_add(i as u32));
        }
        bytes
    }

    /// Bulk-loads a byte slice starting at `addr`; used by the loader.
    pub fn load(&mut self, addr: u32, data: &[u8]) {
        for (i, b) in data.iter().enumerate() {
            self.write(addr.wrapping_add(i as u32), *b);
        }
    }

    /// Number of pages currently allocated.
    pub fn allocated_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.is_some()).count()
    }
}

impl std::fmt::Debug for SparseMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparseMemory")
            .field("allocated_pages", &self.allocated_pages())
            .finish()
    }
}
