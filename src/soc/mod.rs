//! Register access stack, from the device transport up to the block hierarchy.

pub mod bus;
pub mod device;
pub mod regs;
