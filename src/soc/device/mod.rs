#[path = "device.rs"]
mod device_trait;
pub mod error;
pub mod register_file;

pub use device_trait::Device;
pub use error::{DeviceError, DeviceResult};
pub use register_file::{RegisterFile, Transaction};
