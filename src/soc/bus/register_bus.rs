//! The bus capability consumed by register accessors.
//!
//! Only `read` and `write` are mandatory. The batching operations default to their
//! immediate equivalents, so any plain transport can sit behind the accessor hierarchy;
//! `BatchingBus` overrides them with real deferral.
use std::{cell::RefCell, rc::Rc};

use crate::soc::device::Device;

use super::{error::AccessResult, future::ReadSlot};

/// Shared handle to the bus every accessor of one hierarchy talks through.
pub type BusRef = Rc<RefCell<dyn RegisterBus>>;

pub fn shared<B: RegisterBus + 'static>(bus: B) -> BusRef {
    Rc::new(RefCell::new(bus))
}

pub trait RegisterBus {
    fn read(&mut self, address: u32) -> AccessResult<u32>;

    fn write(&mut self, address: u32, value: u32) -> AccessResult<()>;

    /// Schedules a read and returns the slot its result lands in.
    fn readx(&mut self, address: u32) -> AccessResult<ReadSlot> {
        let value = self.read(address)?;
        Ok(ReadSlot::resolved(address, value))
    }

    /// Schedules a write.
    fn writex(&mut self, address: u32, value: u32) -> AccessResult<()> {
        self.write(address, value)
    }

    /// Requests `X := (X & !mask) | (value & mask)` on the register at `address`.
    fn rmw(&mut self, address: u32, mask: u32, value: u32) -> AccessResult<()> {
        let current = self.read(address)?;
        self.write(address, (current & !mask) | (value & mask))
    }

    /// Closes any read-modify-write still being aggregated.
    fn finalize_rmw(&mut self) -> AccessResult<()> {
        Ok(())
    }

    /// Executes every scheduled operation.
    fn dispatch(&mut self) -> AccessResult<()> {
        Ok(())
    }

    fn read_fifo(&mut self, address: u32, count: usize) -> AccessResult<Vec<u32>> {
        (0..count).map(|_| self.read(address)).collect()
    }

    fn write_fifo(&mut self, address: u32, values: &[u32]) -> AccessResult<()> {
        for &value in values {
            self.write(address, value)?;
        }
        Ok(())
    }
}

/// Immediate-only bus: every call goes straight to the device.
pub struct DirectBus<D> {
    device: D,
}

impl<D: Device> DirectBus<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_inner(self) -> D {
        self.device
    }
}

impl<D: Device> RegisterBus for DirectBus<D> {
    fn read(&mut self, address: u32) -> AccessResult<u32> {
        Ok(self.device.read(address)?)
    }

    fn write(&mut self, address: u32, value: u32) -> AccessResult<()> {
        Ok(self.device.write(address, value)?)
    }

    fn read_fifo(&mut self, address: u32, count: usize) -> AccessResult<Vec<u32>> {
        Ok(self.device.read_fifo(address, count)?)
    }

    fn write_fifo(&mut self, address: u32, values: &[u32]) -> AccessResult<()> {
        Ok(self.device.write_fifo(address, values)?)
    }
}
