//! Ordered list of deferred bus operations. Operations run strictly in scheduling order
//! when the queue is dispatched, and the queue is empty again afterwards.
use std::num::NonZeroUsize;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::soc::device::Device;

use super::{
    error::{AccessError, AccessResult},
    future::ReadSlot,
};

const DEFAULT_MAX_PENDING: NonZeroUsize = NonZeroUsize::new(64).unwrap();

/// A single deferred bus transaction.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Reads `slot.address()` and fills the slot.
    Read { slot: ReadSlot },
    Write { address: u32, value: u32 },
    /// Writes `(baseline & !mask) | value`; `value` is already confined to `mask`.
    Rmw {
        address: u32,
        mask: u32,
        value: u32,
        baseline: ReadSlot,
    },
}

impl Operation {
    pub fn address(&self) -> u32 {
        match self {
            Operation::Read { slot } => slot.address(),
            Operation::Write { address, .. } | Operation::Rmw { address, .. } => *address,
        }
    }

    pub fn execute<D: Device + ?Sized>(&self, device: &mut D) -> AccessResult<()> {
        match self {
            Operation::Read { slot } => {
                let value = device.read(slot.address())?;
                slot.fill(value);
            }
            Operation::Write { address, value } => device.write(*address, *value)?,
            Operation::Rmw {
                address,
                mask,
                value,
                baseline,
            } => {
                let current = baseline.get().ok_or(AccessError::Unresolved {
                    address: baseline.address(),
                })?;
                device.write(*address, (current & !mask) | value)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Queue length that triggers an implicit dispatch.
    pub max_pending: NonZeroUsize,
}

impl QueueConfig {
    pub fn with_max_pending(mut self, max_pending: NonZeroUsize) -> Self {
        self.max_pending = max_pending;
        self
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_pending: DEFAULT_MAX_PENDING,
        }
    }
}

#[derive(Debug)]
pub struct DispatchQueue {
    ops: SmallVec<[Operation; 16]>,
    max_pending: NonZeroUsize,
}

impl DispatchQueue {
    pub fn new(config: QueueConfig) -> Self {
        Self {
            ops: SmallVec::new(),
            max_pending: config.max_pending,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[inline(always)]
    pub fn pending(&self) -> &[Operation] {
        &self.ops
    }

    #[inline(always)]
    pub fn max_pending(&self) -> NonZeroUsize {
        self.max_pending
    }

    /// Appends `op`; once the queue reaches its configured length it is dispatched
    /// before returning.
    pub fn schedule<D: Device + ?Sized>(&mut self, op: Operation, device: &mut D) -> AccessResult<()> {
        trace!(?op, "schedule");
        self.ops.push(op);
        if self.ops.len() >= self.max_pending.get() {
            debug!(len = self.ops.len(), "queue full, dispatching");
            self.dispatch(device)?;
        }
        Ok(())
    }

    /// Runs every queued operation in FIFO order. The queue is cleared even when an
    /// operation fails; the first failure ends the batch.
    pub fn dispatch<D: Device + ?Sized>(&mut self, device: &mut D) -> AccessResult<()> {
        if self.ops.is_empty() {
            trace!("empty dispatch");
            return Ok(());
        }
        let ops = std::mem::take(&mut self.ops);
        debug!(count = ops.len(), device = device.name(), "dispatch");
        for op in &ops {
            op.execute(device)?;
        }
        Ok(())
    }
}

impl Default for DispatchQueue {
    fn default() -> Self {
        Self::new(QueueConfig::default())
    }
}
