//! Both backends wired onto one I2C bus.
//!
//! The PCA9685 and the two encoders share a `RefCell`-guarded bus, each
//! getting its own `RefCellDevice`.

use core::cell::RefCell;

use embedded_hal::i2c::I2c;
use embedded_hal_bus::i2c::RefCellDevice;

use crate::utils::{
    config::{MotorConfig, PulseRange},
    controllers::{
        as5600::As5600Encoders,
        motors::{MotorPair, MotorPins},
        pca9685::{Pca9685Servos, ServoError},
    },
};

/// Default I2C address of the PWM expander.
pub const PWM_ADDRESS: u8 = 0x40;

pub type BoardServos<'a, I2C> = Pca9685Servos<RefCellDevice<'a, I2C>>;
pub type BoardEncoders<'a, I2C> = As5600Encoders<RefCellDevice<'a, I2C>>;
pub type MotorBoard<'a, I2C> = MotorPair<BoardServos<'a, I2C>, BoardEncoders<'a, I2C>>;

/// Build a controller whose servos and encoders all live on `i2c_bus`.
///
/// If the PWM expander cannot be set up the bus is scanned and the error
/// returned.
pub fn motor_board<'a, I2C, E>(
    i2c_bus: &'a RefCell<I2C>,
    pwm_address: Option<u8>,
    pins: MotorPins,
    pulse: Option<PulseRange>,
    config: MotorConfig,
) -> Result<MotorBoard<'a, I2C>, ServoError<E>>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
{
    let addr = pwm_address.unwrap_or(PWM_ADDRESS);
    let servos = match Pca9685Servos::new(
        RefCellDevice::new(i2c_bus),
        addr,
        pulse.unwrap_or_default(),
    ) {
        Ok(servos) => servos,
        Err(e) => {
            tracing::warn!("PWM expander setup failed, scanning instead: {:?}", e);
            scan_bus(i2c_bus);
            return Err(e);
        }
    };
    let encoders = As5600Encoders::new(RefCellDevice::new(i2c_bus));

    Ok(MotorPair::new(pins, servos, encoders, config))
}

/// Scan the I2C bus for devices and log any found addresses.
pub fn scan_bus<I2C: I2c>(i2c_bus: &RefCell<I2C>) {
    let mut bus = i2c_bus.borrow_mut();
    for addr in 0x03..0x78 {
        if bus.write(addr, &[]).is_ok() {
            tracing::warn!("I2C device found at 0x{:02X}", addr);
        }
    }
}
