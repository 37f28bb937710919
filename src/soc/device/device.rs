//! Defines the `Device` trait the register bus drives. A device is the transport that
//! actually moves 32-bit words to and from the hardware (or a simulation of it) and
//! reports failures through a consistent `DeviceResult` surface so bus code can wrap
//! them into `AccessError::Device`.
use std::ops::Range;

use super::error::DeviceResult;

pub trait Device {
    fn name(&self) -> &str;

    /// Word addresses decoded by this device.
    fn span(&self) -> Range<u32>;

    /// Reads one word. Reads may mutate if the register has side effects on read
    /// (clear on read, FIFO pop).
    fn read(&mut self, address: u32) -> DeviceResult<u32>;

    fn write(&mut self, address: u32, value: u32) -> DeviceResult<()>;

    /// Streams `count` words out of a single FIFO register.
    fn read_fifo(&mut self, address: u32, count: usize) -> DeviceResult<Vec<u32>> {
        (0..count).map(|_| self.read(address)).collect()
    }

    /// Streams `values` into a single FIFO register.
    fn write_fifo(&mut self, address: u32, values: &[u32]) -> DeviceResult<()> {
        for &value in values {
            self.write(address, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soc::device::DeviceError;

    #[derive(Default)]
    struct FaultyDevice;

    impl Device for FaultyDevice {
        fn name(&self) -> &str {
            "faulty"
        }

        fn span(&self) -> Range<u32> {
            0..4
        }

        fn read(&mut self, _address: u32) -> DeviceResult<u32> {
            Err(DeviceError::Unsupported("read"))
        }

        fn write(&mut self, _address: u32, _value: u32) -> DeviceResult<()> {
            Err(DeviceError::Unsupported("write"))
        }
    }

    #[derive(Default)]
    struct CountingFifo {
        next: u32,
        sink: Vec<u32>,
    }

    impl Device for CountingFifo {
        fn name(&self) -> &str {
            "fifo"
        }

        fn span(&self) -> Range<u32> {
            0..1
        }

        fn read(&mut self, _address: u32) -> DeviceResult<u32> {
            self.next += 1;
            Ok(self.next)
        }

        fn write(&mut self, _address: u32, value: u32) -> DeviceResult<()> {
            self.sink.push(value);
            Ok(())
        }
    }

    #[test]
    fn trait_helpers_propagate_device_errors() {
        let mut dev = FaultyDevice;
        assert!(dev.read(0).is_err(), "read should surface backend errors");
        assert!(dev.write(0, 1).is_err(), "write should surface backend errors");
        assert!(
            dev.read_fifo(0, 3).is_err(),
            "fifo read should stop at the first backend error"
        );
        assert!(
            dev.write_fifo(0, &[1, 2]).is_err(),
            "fifo write should stop at the first backend error"
        );
    }

    #[test]
    fn default_fifo_helpers_repeat_single_word_access() {
        let mut dev = CountingFifo::default();
        let words = dev.read_fifo(0, 3).expect("fifo read");
        assert_eq!(words, vec![1, 2, 3], "each fifo slot is a separate read");

        dev.write_fifo(0, &[7, 8]).expect("fifo write");
        assert_eq!(dev.sink, vec![7, 8], "values arrive in order");
    }
}
