use std::ops::Range;

use thiserror::Error;

pub type DeviceResult<T> = Result<T, DeviceError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("address 0x{address:08X} outside device span 0x{:08X}..0x{:08X}", span.start, span.end)]
    OutOfRange { address: u32, span: Range<u32> },
    #[error("operation '{0}' not supported by device")]
    Unsupported(&'static str),
    #[error("device '{device}' reported a fault: {details}")]
    Fault { device: String, details: String },
}
