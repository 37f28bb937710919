//! Accessor layer for memory-mapped register hierarchies.
//!
//! Software addresses blocks, registers and bitfields by name through a bus capability
//! (`RegisterBus`) instead of raw addresses. Underneath, `BatchingBus` batches deferred
//! operations into a dispatch queue and coalesces read-modify-write requests on the same
//! register into a single read and a single write.
//!
//! ```
//! use regbus::{BatchingBus, BitField, Block, BlockSchema, RegisterFile, RegisterSchema, shared};
//!
//! let ctrl = RegisterSchema::control()
//!     .field("MODE", BitField::unsigned(3, 1))
//!     .field("DIV", BitField::unsigned(9, 4))
//!     .finish();
//! let schema = BlockSchema::builder("top", 4).register("CTRL", 1, ctrl).finish();
//!
//! let bus = shared(BatchingBus::new(RegisterFile::new("sim", 0..16)));
//! let top = Block::new(bus, 0, schema);
//! let reg = top.register("CTRL")?;
//! reg.field("DIV")?.writex(11, false)?;
//! reg.field("MODE")?.writex(5, true)?;
//! assert_eq!(reg.read()?, 0xBA);
//! # Ok::<(), regbus::AccessError>(())
//! ```

pub mod soc;

pub use soc::bus::{
    AccessError, AccessResult, BatchingBus, BusRef, DirectBus, Operation, QueueConfig, ReadFuture,
    RegisterBus, shared,
};
pub use soc::device::{Device, DeviceError, DeviceResult, RegisterFile, Transaction};
pub use soc::regs::{
    Access, BitField, Block, BlockSchema, FieldAccess, FieldFuture, Node, Register, RegisterSchema,
    Vector,
};
