//! Bitfield descriptors with the precomputed masks and bounds needed to move logical
//! values in and out of a 32-bit register word.

use crate::soc::bus::{AccessError, AccessResult};

/// Contiguous bit range `lsb..=msb` of a register, decoded as unsigned or two's-complement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitField {
    msb: u8,
    lsb: u8,
    signed: bool,
    mask: u32,
    sign_mask: u32,
    vmin: i64,
    vmax: i64,
}

impl BitField {
    pub const fn new(msb: u8, lsb: u8, signed: bool) -> Self {
        assert!(msb < 32, "bitfield msb beyond 32-bit register");
        assert!(lsb <= msb, "bitfield lsb above msb");
        let width = (msb - lsb + 1) as u32;
        let mask = (((1u64 << (msb as u32 + 1)) - 1) ^ ((1u64 << lsb as u32) - 1)) as u32;
        let (sign_mask, vmin, vmax) = if signed {
            let sign = 1u32 << (width - 1);
            (sign, -(sign as i64), sign as i64 - 1)
        } else {
            (0, 0, ((1u64 << width) - 1) as i64)
        };
        Self {
            msb,
            lsb,
            signed,
            mask,
            sign_mask,
            vmin,
            vmax,
        }
    }

    pub const fn unsigned(msb: u8, lsb: u8) -> Self {
        Self::new(msb, lsb, false)
    }

    pub const fn signed(msb: u8, lsb: u8) -> Self {
        Self::new(msb, lsb, true)
    }

    #[inline(always)]
    pub fn msb(&self) -> u8 {
        self.msb
    }

    #[inline(always)]
    pub fn lsb(&self) -> u8 {
        self.lsb
    }

    #[inline(always)]
    pub fn width(&self) -> u8 {
        self.msb - self.lsb + 1
    }

    #[inline(always)]
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    #[inline(always)]
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Weight of the sign bit once shifted down; zero for unsigned fields.
    #[inline(always)]
    pub fn sign_mask(&self) -> u32 {
        self.sign_mask
    }

    #[inline(always)]
    pub fn min(&self) -> i64 {
        self.vmin
    }

    #[inline(always)]
    pub fn max(&self) -> i64 {
        self.vmax
    }

    /// Extracts the field from a raw register word, sign-extending signed fields.
    pub fn decode(&self, raw: u32) -> i64 {
        let mut value = ((raw & self.mask) >> self.lsb) as i64;
        if self.signed && value & self.sign_mask as i64 != 0 {
            value -= (self.sign_mask as i64) << 1;
        }
        value
    }

    pub fn validate(&self, value: i64) -> AccessResult<()> {
        if value < self.vmin || value > self.vmax {
            return Err(AccessError::OutOfRange {
                value,
                min: self.vmin,
                max: self.vmax,
            });
        }
        Ok(())
    }

    /// `value` converted to raw bits and shifted into position, confined to the mask.
    pub fn shifted(&self, value: i64) -> AccessResult<u32> {
        self.validate(value)?;
        let raw = if self.signed && value < 0 {
            value + ((self.sign_mask as i64) << 1)
        } else {
            value
        };
        Ok(((raw as u64) << self.lsb) as u32 & self.mask)
    }

    /// Replaces the field bits of `prior` with `value`, leaving other bits untouched.
    pub fn encode(&self, value: i64, prior: u32) -> AccessResult<u32> {
        Ok((prior & !self.mask) | self.shifted(value)?)
    }
}
