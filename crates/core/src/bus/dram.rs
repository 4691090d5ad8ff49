//! Split-transaction DRAM channel emulator.
//!
//! Each channel moves fixed 16-byte bursts with a command phase, a deferred
//! write-data phase, and FIFO read-response delivery:
//! 1. **Commands** are always accepted (ready is unconditional). Reads
//!    resolve immediately against the backing store and queue a response;
//!    writes queue their target address until the data phase arrives.
//! 2. **Write data** pops the oldest pending address and commits only the
//!    byte lanes enabled in the 16-bit mask.
//! 3. **Responses** are presented front-first and dequeued only when the
//!    consumer asserts ready while valid is high.
//!
//! The channel is timing-transparent: no row/bank/refresh modeling, only
//! the protocol-level queuing delay between phases.

use crate::config::OrphanWriteDataPolicy;
use crate::error::HarnessError;
use crate::mem::SparseMemory;
use crate::model::{Channel, DramCommand, DramWriteData};
use std::collections::VecDeque;
use tracing::warn;

/// A fetched read result awaiting delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadResponse {
    /// Byte address the burst was fetched from.
    pub addr: u32,
    /// Burst payload packed little-endian into four u32 lanes.
    pub words: [u32; 4],
}

/// A committed write burst, reported for trace grouping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteCommit {
    /// Byte address of lane 0.
    pub addr: u32,
    /// Full 16-byte payload (disabled lanes included, uncommitted).
    pub bytes: [u8; 16],
    /// Per-byte enable mask that was applied.
    pub mask: u16,
}

/// One split-transaction memory port.
pub struct DramChannel {
    channel: Channel,
    base: u32,
    burst_bytes: u32,
    orphan_policy: OrphanWriteDataPolicy,
    /// Addresses of accepted write commands awaiting their data phase.
    pending_writes: VecDeque<u32>,
    /// Fetched read results awaiting consumer readiness.
    read_responses: VecDeque<ReadResponse>,
}

impl DramChannel {
    /// Creates a channel over the DRAM window at `base`.
    pub fn new(
        channel: Channel,
        base: u32,
        burst_bytes: u32,
        orphan_policy: OrphanWriteDataPolicy,
    ) -> Self {
        Self {
            channel,
            base,
            burst_bytes,
            orphan_policy,
            pending_writes: VecDeque::new(),
            read_responses: VecDeque::new(),
        }
    }

    /// Which side this channel serves.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Byte address of a command's block index.
    pub fn byte_addr(&self, index: u32) -> u32 {
        self.base.wrapping_add(index.wrapping_mul(self.burst_bytes))
    }

    /// The response currently presented to the consumer, if any.
    pub fn presented_read(&self) -> Option<&ReadResponse> {
        self.read_responses.front()
    }

    /// Dequeues the presented response after a valid/ready handshake.
    pub fn consume_read(&mut self) {
        let _ = self.read_responses.pop_front();
    }

    /// Number of writes whose data phase has not arrived yet.
    pub fn pending_write_count(&self) -> usize {
        self.pending_writes.len()
    }

    /// Number of read responses awaiting delivery.
    pub fn queued_read_count(&self) -> usize {
        self.read_responses.len()
    }

    /// Accepts a command phase; returns the resolved byte address.
    ///
    /// Reads fetch and enqueue their response immediately (delivery is
    /// gated by the consumer's later readiness); writes record the target
    /// address until the matching data phase.
    pub fn accept_command(&mut self, cmd: DramCommand, mem: &SparseMemory) -> u32 {
        let addr = self.byte_addr(cmd.addr);
        if cmd.we {
            self.pending_writes.push_back(addr);
        } else {
            let words = pack_words(&mem.read_burst(addr));
            self.read_responses.push_back(ReadResponse { addr, words });
        }
        addr
    }

    /// Accepts a write-data phase against the oldest pending command.
    ///
    /// Enabled byte lanes are committed to the backing store; disabled
    /// lanes are left untouched. Returns the commit record for tracing,
    /// or `None` when the phase was dropped under a non-fatal orphan
    /// policy.
    pub fn accept_write_data(
        &mut self,
        data: &DramWriteData,
        mem: &mut SparseMemory,
        cycle: u64,
    ) -> Result<Option<WriteCommit>, HarnessError> {
        let Some(addr) = self.pending_writes.pop_front() else {
            return match self.orphan_policy {
                OrphanWriteDataPolicy::Ignore => Ok(None),
                OrphanWriteDataPolicy::Warn => {
                    warn!(
                        channel = %self.channel,
                        cycle,
                        "dropping write data with no pending write command"
                    );
                    Ok(None)
                }
                OrphanWriteDataPolicy::Fatal => Err(HarnessError::OrphanWriteData {
                    channel: self.channel,
                    cycle,
                }),
            };
        };

        let bytes = unpack_words(data.data);
        for (i, b) in bytes.iter().enumerate() {
            if (data.we >> i) & 1 != 0 {
                mem.write(addr.wrapping_add(i as u32), *b);
            }
        }
        Ok(Some(WriteCommit {
            addr,
            bytes,
            mask: data.we,
        }))
    }
}

impl std::fmt::Debug for DramChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DramChannel")
            .field("channel", &self.channel)
            .field("pending_writes", &self.pending_writes.len())
            .field("read_responses", &self.read_responses.len())
            .finish()
    }
}

/// Packs a 16-byte burst into four little-endian u32 lanes.
pub fn pack_words(bytes: &[u8; 16]) -> [u32; 4] {
    let mut words = [0u32; 4];
    for (w, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *w = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    words
}

/// Unpacks four little-endian u32 lanes into a 16-byte burst.
pub fn unpack_words(words: [u32; 4]) -> [u8; 16] {
    let mut bytes = [0u8; 16];
    for (chunk, w) in bytes.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&w.to_le_bytes());
    }
    bytes
}
