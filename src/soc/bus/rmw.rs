//! Read-modify-write coalescing.
//!
//! Consecutive RMW requests aimed at the same register collapse into one baseline read
//! and one final write. The coalescer only tracks state; the operations it emits are
//! scheduled by the bus that owns it.
//!
//! ```text
//! Idle --request(a)--> Pending(a) --request(a)--> Pending(a)
//!                          |  \--request(b)--> [write a] Pending(b)
//!                          \----finalize----> [write a] Idle
//! ```
use smallvec::SmallVec;
use tracing::debug;

use super::{future::ReadSlot, queue::Operation};

/// Operations produced by a single request: at most a flushed write and a baseline read.
pub type Emitted = SmallVec<[Operation; 2]>;

#[derive(Debug, Clone)]
pub struct PendingRmw {
    pub address: u32,
    pub mask: u32,
    pub value: u32,
    pub baseline: ReadSlot,
}

impl PendingRmw {
    fn merge(&mut self, mask: u32, value: u32) {
        self.value = (self.value & !mask) | (value & mask);
        self.mask |= mask;
    }

    fn into_write(self) -> Operation {
        Operation::Rmw {
            address: self.address,
            mask: self.mask,
            value: self.value,
            baseline: self.baseline,
        }
    }
}

#[derive(Debug, Default)]
pub struct RmwCoalescer {
    pending: Option<PendingRmw>,
}

impl RmwCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn pending(&self) -> Option<&PendingRmw> {
        self.pending.as_ref()
    }

    #[inline(always)]
    pub fn target(&self) -> Option<u32> {
        self.pending.as_ref().map(|p| p.address)
    }

    /// Closes the pending aggregation, returning the write that applies it.
    pub fn finalize(&mut self) -> Option<Operation> {
        let pending = self.pending.take()?;
        debug!(
            address = pending.address,
            mask = pending.mask,
            value = pending.value,
            "finalize rmw"
        );
        Some(pending.into_write())
    }

    /// Drops the pending aggregation if its baseline read never completed. Called after a
    /// failed dispatch, which discards the queued baseline read along with the batch.
    pub fn discard_unresolved(&mut self) -> Option<PendingRmw> {
        if self.pending.as_ref()?.baseline.is_resolved() {
            return None;
        }
        let pending = self.pending.take()?;
        debug!(address = pending.address, "discarding rmw with lost baseline");
        Some(pending)
    }

    /// Merges `(mask, value)` into the aggregation for `address`. A pending aggregation
    /// for another address is finalized first; a new aggregation starts with a baseline
    /// read of its register.
    pub fn request(&mut self, address: u32, mask: u32, value: u32) -> Emitted {
        let mut emitted = Emitted::new();
        if self.target().is_some_and(|target| target != address) {
            emitted.extend(self.finalize());
        }
        let pending = self.pending.get_or_insert_with(|| {
            let baseline = ReadSlot::pending(address);
            emitted.push(Operation::Read {
                slot: baseline.clone(),
            });
            PendingRmw {
                address,
                mask: 0,
                value: 0,
                baseline,
            }
        });
        pending.merge(mask, value);
        emitted
    }
}
