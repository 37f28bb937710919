//! In-memory register file. Backs a word-addressed span with plain storage and keeps a
//! log of every transaction that crossed the device boundary, so callers can check how
//! many bus cycles an access pattern really costs.
use std::ops::Range;

use tracing::trace;

use crate::soc::device::{Device, DeviceError, DeviceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Read { address: u32, value: u32 },
    Write { address: u32, value: u32 },
}

impl Transaction {
    pub fn address(&self) -> u32 {
        match *self {
            Transaction::Read { address, .. } | Transaction::Write { address, .. } => address,
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Transaction::Write { .. })
    }
}

pub struct RegisterFile {
    name: String,
    base: u32,
    words: Vec<u32>,
    log: Vec<Transaction>,
}

impl RegisterFile {
    pub fn new(name: impl Into<String>, span: Range<u32>) -> Self {
        Self {
            name: name.into(),
            base: span.start,
            words: vec![0; span.len()],
            log: Vec::new(),
        }
    }

    /// Sets a word without logging a transaction. Models state the hardware owns
    /// (identity constants, status bits).
    pub fn preset(&mut self, address: u32, value: u32) -> DeviceResult<()> {
        let index = self.index(address)?;
        self.words[index] = value;
        Ok(())
    }

    /// Reads a word without logging a transaction.
    pub fn peek(&self, address: u32) -> DeviceResult<u32> {
        self.index(address).map(|index| self.words[index])
    }

    #[inline(always)]
    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn reads(&self) -> usize {
        self.log.iter().filter(|t| !t.is_write()).count()
    }

    pub fn writes(&self) -> usize {
        self.log.iter().filter(|t| t.is_write()).count()
    }

    fn index(&self, address: u32) -> DeviceResult<usize> {
        let span = self.span();
        if !span.contains(&address) {
            return Err(DeviceError::OutOfRange { address, span });
        }
        Ok((address - self.base) as usize)
    }
}

impl Device for RegisterFile {
    fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    fn span(&self) -> Range<u32> {
        self.base..self.base + self.words.len() as u32
    }

    fn read(&mut self, address: u32) -> DeviceResult<u32> {
        let value = self.words[self.index(address)?];
        trace!(device = %self.name, address, value, "read");
        self.log.push(Transaction::Read { address, value });
        Ok(value)
    }

    fn write(&mut self, address: u32, value: u32) -> DeviceResult<()> {
        let index = self.index(address)?;
        trace!(device = %self.name, address, value, "write");
        self.words[index] = value;
        self.log.push(Transaction::Write { address, value });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_writes_are_logged_in_order() {
        let mut file = RegisterFile::new("rf", 0x10..0x20);
        file.write(0x12, 0xAB).expect("write in span");
        let value = file.read(0x12).expect("read in span");
        assert_eq!(value, 0xAB, "read returns the written word");
        assert_eq!(
            file.transactions(),
            &[
                Transaction::Write { address: 0x12, value: 0xAB },
                Transaction::Read { address: 0x12, value: 0xAB },
            ],
            "log mirrors device traffic"
        );
        assert_eq!((file.reads(), file.writes()), (1, 1));
    }

    #[test]
    fn preset_and_peek_bypass_the_log() {
        let mut file = RegisterFile::new("rf", 0..4);
        file.preset(3, 0x55).expect("preset in span");
        assert_eq!(file.peek(3).expect("peek in span"), 0x55);
        assert!(file.transactions().is_empty(), "backdoor access is not bus traffic");
    }

    #[test]
    fn out_of_span_access_is_rejected() {
        let mut file = RegisterFile::new("rf", 0x100..0x104);
        let err = file.read(0x104).expect_err("end of span is exclusive");
        assert_eq!(
            err,
            DeviceError::OutOfRange { address: 0x104, span: 0x100..0x104 },
            "error names the offending address"
        );
        assert!(file.write(0xFF, 1).is_err(), "below the span is rejected too");
        assert!(file.transactions().is_empty(), "failed accesses are not logged");
    }
}
