//! AS5600-family magnetic encoders on I2C.
//!
//! The feedback "pin" of each side is the 7-bit bus address of its sensor
//! (AS5600L parts allow the address to be changed). Reads return the 12-bit
//! RAW ANGLE register, which wraps at 4096.

use embedded_hal::i2c::I2c;

use crate::utils::controllers::{Pin, PositionSensor};

/// Factory address of the AS5600.
pub const AS5600_ADDRESS: u8 = 0x36;
/// Raw count period.
pub const COUNTS_PER_REV: u16 = 4096;

const REG_STATUS: u8 = 0x0B;
const REG_RAW_ANGLE: u8 = 0x0C;
/// Magnet detected.
const STATUS_MD: u8 = 0x20;

pub struct As5600Encoders<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> As5600Encoders<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Whether the sensor at `address` currently sees a magnet.
    pub fn magnet_detected(
        &mut self,
        address: Pin,
    ) -> Result<bool, I2C::Error> {
        let mut status = [0u8; 1];
        self.i2c.write_read(address, &[REG_STATUS], &mut status)?;
        Ok(status[0] & STATUS_MD != 0)
    }
}

impl<I2C: I2c> PositionSensor for As5600Encoders<I2C> {
    type Error = I2C::Error;

    fn read_raw(
        &mut self,
        pin: Pin,
    ) -> Result<u16, Self::Error> {
        let mut buf = [0u8; 2];
        self.i2c.write_read(pin, &[REG_RAW_ANGLE], &mut buf)?;
        Ok(u16::from_be_bytes(buf) & 0x0FFF)
    }
}
