//! BatchingBus owns a device together with the deferred-operation queue and the RMW
//! coalescer, giving accessors one total order over immediate and deferred traffic:
//!
//! * deferred calls (`readx`, `writex`) close any open RMW aggregation, then enqueue;
//! * `rmw` feeds the coalescer and enqueues whatever it emits;
//! * immediate calls close the open aggregation, drain the queue, then touch the device.
//!
//! A failed dispatch also drops an open aggregation whose baseline read went down with the
//! batch.
use tracing::trace;

use crate::soc::device::Device;

use super::{
    error::AccessResult,
    future::ReadSlot,
    queue::{DispatchQueue, Operation, QueueConfig},
    register_bus::RegisterBus,
    rmw::{PendingRmw, RmwCoalescer},
};

pub struct BatchingBus<D> {
    device: D,
    queue: DispatchQueue,
    rmw: RmwCoalescer,
}

impl<D: Device> BatchingBus<D> {
    pub fn new(device: D) -> Self {
        Self::with_config(device, QueueConfig::default())
    }

    pub fn with_config(device: D, config: QueueConfig) -> Self {
        Self {
            device,
            queue: DispatchQueue::new(config),
            rmw: RmwCoalescer::new(),
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Releases the device. Operations still queued are discarded.
    pub fn into_inner(self) -> D {
        self.device
    }

    pub fn pending_operations(&self) -> &[Operation] {
        self.queue.pending()
    }

    pub fn pending_rmw(&self) -> Option<&PendingRmw> {
        self.rmw.pending()
    }

    fn schedule(&mut self, op: Operation) -> AccessResult<()> {
        let result = self.queue.schedule(op, &mut self.device);
        self.recover(result)
    }

    // A failed dispatch empties the queue, so an open aggregation may be left waiting on a
    // baseline read that will never run.
    fn recover(&mut self, result: AccessResult<()>) -> AccessResult<()> {
        if result.is_err() {
            self.rmw.discard_unresolved();
        }
        result
    }

    // RMW is closed before the queue is drained; the closing write joins the batch.
    fn settle(&mut self) -> AccessResult<()> {
        self.finalize_rmw()?;
        if !self.queue.is_empty() {
            self.dispatch()?;
        }
        Ok(())
    }
}

impl<D: Device> RegisterBus for BatchingBus<D> {
    fn read(&mut self, address: u32) -> AccessResult<u32> {
        self.settle()?;
        Ok(self.device.read(address)?)
    }

    fn write(&mut self, address: u32, value: u32) -> AccessResult<()> {
        self.settle()?;
        Ok(self.device.write(address, value)?)
    }

    fn readx(&mut self, address: u32) -> AccessResult<ReadSlot> {
        self.finalize_rmw()?;
        let slot = ReadSlot::pending(address);
        self.schedule(Operation::Read { slot: slot.clone() })?;
        Ok(slot)
    }

    fn writex(&mut self, address: u32, value: u32) -> AccessResult<()> {
        self.finalize_rmw()?;
        self.schedule(Operation::Write { address, value })
    }

    fn rmw(&mut self, address: u32, mask: u32, value: u32) -> AccessResult<()> {
        for op in self.rmw.request(address, mask, value) {
            self.schedule(op)?;
        }
        Ok(())
    }

    fn finalize_rmw(&mut self) -> AccessResult<()> {
        match self.rmw.finalize() {
            Some(op) => self.schedule(op),
            None => Ok(()),
        }
    }

    fn dispatch(&mut self) -> AccessResult<()> {
        let result = self.queue.dispatch(&mut self.device);
        self.recover(result)
    }

    fn read_fifo(&mut self, address: u32, count: usize) -> AccessResult<Vec<u32>> {
        self.settle()?;
        trace!(address, count, "fifo read");
        Ok(self.device.read_fifo(address, count)?)
    }

    fn write_fifo(&mut self, address: u32, values: &[u32]) -> AccessResult<()> {
        self.settle()?;
        trace!(address, count = values.len(), "fifo write");
        Ok(self.device.write_fifo(address, values)?)
    }
}
