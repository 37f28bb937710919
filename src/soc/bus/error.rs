use thiserror::Error;

use crate::soc::device::DeviceError;

pub type AccessResult<T> = Result<T, AccessError>;

/// Failures surfaced by register, bitfield and hierarchy accessors. Every variant aborts the
/// current call before any further bus traffic is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("value {value} does not fit in bitfield range [{min}, {max}]")]
    OutOfRange { value: i64, min: i64, max: i64 },
    #[error("status register at 0x{address:08X} can't be written")]
    ReadOnly { address: u32 },
    #[error("index {index} outside vector of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("'{scope}' has no field '{field}'")]
    UnknownField { scope: String, field: String },
    #[error("field '{field}' is not a {expected}")]
    FieldKind { field: String, expected: &'static str },
    #[error("{block} has {register} 0x{expected:08X}, read {register} 0x{found:08X}")]
    IdentityMismatch {
        block: String,
        register: &'static str,
        expected: u32,
        found: u32,
    },
    #[error("address 0x{base:08X} + 0x{offset:X} overflows the 32-bit address space")]
    AddressOverflow { base: u32, offset: u64 },
    #[error("read of 0x{address:08X} still unresolved after dispatch")]
    Unresolved { address: u32 },
    #[error(transparent)]
    Device(#[from] DeviceError),
}
