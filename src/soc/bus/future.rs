//! Deferred read results.
//!
//! A `ReadSlot` is the cell a scheduled read fills when its batch executes; it is shared
//! between the queued operation and whoever asked for the read. `ReadFuture` pairs a slot
//! with the bus that owns the queue, so asking for the value of an unresolved read can
//! drain that queue on the spot.
use std::{cell::Cell, fmt, rc::Rc};

use super::{
    error::{AccessError, AccessResult},
    register_bus::BusRef,
};

#[derive(Clone)]
pub struct ReadSlot {
    address: u32,
    cell: Rc<Cell<Option<u32>>>,
}

impl ReadSlot {
    pub fn pending(address: u32) -> Self {
        Self {
            address,
            cell: Rc::new(Cell::new(None)),
        }
    }

    pub fn resolved(address: u32, value: u32) -> Self {
        Self {
            address,
            cell: Rc::new(Cell::new(Some(value))),
        }
    }

    #[inline(always)]
    pub fn address(&self) -> u32 {
        self.address
    }

    #[inline(always)]
    pub fn get(&self) -> Option<u32> {
        self.cell.get()
    }

    #[inline(always)]
    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Stores the value read from the device. A slot is filled exactly once.
    pub fn fill(&self, value: u32) {
        debug_assert!(
            !self.is_resolved(),
            "read slot for 0x{:X} filled twice",
            self.address
        );
        self.cell.set(Some(value));
    }

    /// True when both handles refer to the same scheduled read.
    pub fn same_slot(&self, other: &ReadSlot) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl fmt::Debug for ReadSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadSlot")
            .field("address", &format_args!("0x{:X}", self.address))
            .field("value", &self.cell.get())
            .finish()
    }
}

/// Value of a register read that may not have executed yet.
///
/// `value()` blocks in the sense that it synchronously dispatches the owning bus queue
/// when the read is still pending; it never yields to another task.
#[derive(Clone)]
pub struct ReadFuture {
    slot: ReadSlot,
    bus: BusRef,
}

impl ReadFuture {
    pub fn new(slot: ReadSlot, bus: BusRef) -> Self {
        Self { slot, bus }
    }

    #[inline(always)]
    pub fn address(&self) -> u32 {
        self.slot.address()
    }

    #[inline(always)]
    pub fn is_resolved(&self) -> bool {
        self.slot.is_resolved()
    }

    pub fn value(&self) -> AccessResult<u32> {
        if let Some(value) = self.slot.get() {
            return Ok(value);
        }
        self.bus.borrow_mut().dispatch()?;
        self.slot.get().ok_or(AccessError::Unresolved {
            address: self.slot.address(),
        })
    }
}

impl fmt::Debug for ReadFuture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadFuture").field(&self.slot).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::soc::bus::{BatchingBus, RegisterBus};
    use crate::soc::device::RegisterFile;

    fn bus_with(address: u32, value: u32) -> Rc<RefCell<BatchingBus<RegisterFile>>> {
        let mut file = RegisterFile::new("rf", 0..0x10);
        file.preset(address, value).expect("preset in span");
        Rc::new(RefCell::new(BatchingBus::new(file)))
    }

    #[test]
    fn resolved_slot_short_circuits_dispatch() {
        let bus = bus_with(0, 0);
        let future = ReadFuture::new(ReadSlot::resolved(4, 0x99), bus.clone());
        assert!(future.is_resolved());
        assert_eq!(future.value().expect("already resolved"), 0x99);
        assert!(
            bus.borrow().device().transactions().is_empty(),
            "a resolved future must not touch the bus"
        );
    }

    #[test]
    fn pending_future_dispatches_exactly_once() {
        let bus = bus_with(3, 0x1234);
        let slot = bus.borrow_mut().readx(3).expect("schedule read");
        let future = ReadFuture::new(slot, bus.clone());
        assert!(!future.is_resolved(), "nothing executes before dispatch");

        assert_eq!(future.value().expect("dispatch resolves"), 0x1234);
        assert_eq!(future.value().expect("cached"), 0x1234);
        assert_eq!(
            bus.borrow().device().reads(),
            1,
            "second value() must reuse the stored result"
        );
    }

    #[test]
    fn orphan_slot_reports_unresolved() {
        let bus = bus_with(0, 0);
        let future = ReadFuture::new(ReadSlot::pending(7), bus);
        assert_eq!(
            future.value(),
            Err(AccessError::Unresolved { address: 7 }),
            "a slot with no scheduled read can never resolve"
        );
    }

    #[test]
    fn clones_share_the_same_slot() {
        let slot = ReadSlot::pending(1);
        let alias = slot.clone();
        assert!(slot.same_slot(&alias));
        alias.fill(5);
        assert_eq!(slot.get(), Some(5), "fill is visible through every handle");
        assert!(!slot.same_slot(&ReadSlot::pending(1)));
    }
}
