//! Register and bitfield accessors.
//!
//! A `Register` is a cheap handle (bus reference, absolute address, schema). Immediate
//! calls go straight through the bus; the `*x` calls schedule work and hand back futures.
//! `FieldAccess` narrows a register to one bitfield and routes deferred writes through
//! the bus RMW path so that several field writes to one register share a single read
//! and a single write.
use std::sync::Arc;

use ahash::AHashMap;

use crate::soc::bus::{AccessError, AccessResult, BusRef, ReadFuture};

use super::bitfield::BitField;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Control register.
    ReadWrite,
    /// Status register; every write path fails with `ReadOnly`.
    ReadOnly,
}

#[derive(Debug)]
pub struct RegisterSchema {
    access: Access,
    fields: AHashMap<String, BitField>,
    order: Vec<String>,
}

impl RegisterSchema {
    pub fn control() -> RegisterSchemaBuilder {
        RegisterSchemaBuilder::new(Access::ReadWrite)
    }

    pub fn status() -> RegisterSchemaBuilder {
        RegisterSchemaBuilder::new(Access::ReadOnly)
    }

    #[inline(always)]
    pub fn access(&self) -> Access {
        self.access
    }

    pub fn field(&self, name: &str) -> Option<&BitField> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

pub struct RegisterSchemaBuilder {
    access: Access,
    fields: AHashMap<String, BitField>,
    order: Vec<String>,
}

impl RegisterSchemaBuilder {
    fn new(access: Access) -> Self {
        Self {
            access,
            fields: AHashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, field: BitField) -> Self {
        let name = name.into();
        let previous = self.fields.insert(name.clone(), field);
        assert!(previous.is_none(), "bitfield '{name}' declared twice");
        self.order.push(name);
        self
    }

    pub fn finish(self) -> Arc<RegisterSchema> {
        Arc::new(RegisterSchema {
            access: self.access,
            fields: self.fields,
            order: self.order,
        })
    }
}

#[derive(Clone)]
pub struct Register {
    bus: BusRef,
    address: u32,
    schema: Arc<RegisterSchema>,
}

impl Register {
    pub fn new(bus: BusRef, address: u32, schema: Arc<RegisterSchema>) -> Self {
        Self {
            bus,
            address,
            schema,
        }
    }

    #[inline(always)]
    pub fn address(&self) -> u32 {
        self.address
    }

    #[inline(always)]
    pub fn access(&self) -> Access {
        self.schema.access
    }

    pub fn schema(&self) -> &Arc<RegisterSchema> {
        &self.schema
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.schema.field_names()
    }

    pub fn read(&self) -> AccessResult<u32> {
        self.bus.borrow_mut().read(self.address)
    }

    pub fn write(&self, value: u32) -> AccessResult<()> {
        self.ensure_writable()?;
        self.bus.borrow_mut().write(self.address, value)
    }

    pub fn read_fifo(&self, count: usize) -> AccessResult<Vec<u32>> {
        self.bus.borrow_mut().read_fifo(self.address, count)
    }

    pub fn write_fifo(&self, values: &[u32]) -> AccessResult<()> {
        self.ensure_writable()?;
        self.bus.borrow_mut().write_fifo(self.address, values)
    }

    pub fn readx(&self) -> AccessResult<ReadFuture> {
        let slot = self.bus.borrow_mut().readx(self.address)?;
        Ok(ReadFuture::new(slot, self.bus.clone()))
    }

    /// Schedules a write; it runs on the next dispatch.
    pub fn writex(&self, value: u32) -> AccessResult<()> {
        self.ensure_writable()?;
        self.bus.borrow_mut().writex(self.address, value)
    }

    /// Requests `X := (X & !mask) | (value & mask)`. Requests to the same register
    /// aggregate until `now` is true or another register is touched.
    pub fn rmw(&self, mask: u32, value: u32, now: bool) -> AccessResult<()> {
        self.ensure_writable()?;
        let mut bus = self.bus.borrow_mut();
        bus.rmw(self.address, mask, value)?;
        if now {
            bus.finalize_rmw()?;
        }
        Ok(())
    }

    pub fn dispatch(&self) -> AccessResult<()> {
        self.bus.borrow_mut().dispatch()
    }

    pub fn field(&self, name: &str) -> AccessResult<FieldAccess> {
        let field = *self
            .schema
            .field(name)
            .ok_or_else(|| AccessError::UnknownField {
                scope: format!("register 0x{:08X}", self.address),
                field: name.to_string(),
            })?;
        Ok(FieldAccess {
            register: self.clone(),
            field,
        })
    }

    fn ensure_writable(&self) -> AccessResult<()> {
        match self.schema.access {
            Access::ReadWrite => Ok(()),
            Access::ReadOnly => Err(AccessError::ReadOnly {
                address: self.address,
            }),
        }
    }
}

/// One bitfield of a register.
#[derive(Clone)]
pub struct FieldAccess {
    register: Register,
    field: BitField,
}

impl FieldAccess {
    pub fn bitfield(&self) -> &BitField {
        &self.field
    }

    pub fn register(&self) -> &Register {
        &self.register
    }

    /// Immediate read of the whole register, decoded through the field.
    pub fn read(&self) -> AccessResult<i64> {
        Ok(self.field.decode(self.register.read()?))
    }

    /// Immediate read-modify-write of the register. Each call costs a full read and
    /// write; use `writex` to aggregate several fields.
    pub fn write(&self, value: i64) -> AccessResult<()> {
        self.field.validate(value)?;
        self.register.ensure_writable()?;
        let mut bus = self.register.bus.borrow_mut();
        let prior = bus.read(self.register.address)?;
        let raw = self.field.encode(value, prior)?;
        bus.write(self.register.address, raw)
    }

    pub fn readx(&self) -> AccessResult<FieldFuture> {
        Ok(FieldFuture {
            inner: self.register.readx()?,
            field: self.field,
        })
    }

    /// Deferred write through the register RMW path. With `now` false the update stays
    /// open so further fields of the same register merge into the same write.
    pub fn writex(&self, value: i64, now: bool) -> AccessResult<()> {
        let shifted = self.field.shifted(value)?;
        self.register.rmw(self.field.mask(), shifted, now)
    }
}

/// Deferred bitfield read; the register value is decoded when it is accessed.
#[derive(Clone, Debug)]
pub struct FieldFuture {
    inner: ReadFuture,
    field: BitField,
}

impl FieldFuture {
    #[inline(always)]
    pub fn is_resolved(&self) -> bool {
        self.inner.is_resolved()
    }

    pub fn value(&self) -> AccessResult<i64> {
        Ok(self.field.decode(self.inner.value()?))
    }

    pub fn raw(&self) -> &ReadFuture {
        &self.inner
    }
}
