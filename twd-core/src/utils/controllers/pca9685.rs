//! Servo signal generation on a PCA9685 PWM expander.
//!
//! Each "pin" is one of the sixteen PCA9685 outputs. The chip is put into a
//! 50 Hz frame on the first attach; angles `0..=180` map linearly onto the
//! configured pulse widths. Steering servos and BLDC speed controllers are
//! driven the same way.

use embedded_hal::i2c::I2c;
use pwm_pca9685::{Address, Channel, Error as PwmError, Pca9685};

use crate::utils::{
    config::{PulseRange, SIGNAL_MAX_DEGREES},
    controllers::{Pin, ServoDriver},
};

/// 25 MHz / (4096 * 50 Hz) - 1
pub const SERVO_PRESCALE: u8 = 121;
/// Length of one servo frame at 50 Hz.
const FRAME_US: u32 = 20_000;
/// Counter resolution of one frame.
const FRAME_TICKS: u32 = 4096;
const MAX_DEGREES: u16 = SIGNAL_MAX_DEGREES;

/// Errors from the PCA9685 servo backend.
#[derive(Debug)]
pub enum ServoError<E: core::fmt::Debug> {
    Pwm(PwmError<E>),
    /// Only outputs 0..=15 exist.
    InvalidPin(Pin),
    AngleOutOfRange(u16),
}

fn channel_for(pin: Pin) -> Option<Channel> {
    let channel = match pin {
        0 => Channel::C0,
        1 => Channel::C1,
        2 => Channel::C2,
        3 => Channel::C3,
        4 => Channel::C4,
        5 => Channel::C5,
        6 => Channel::C6,
        7 => Channel::C7,
        8 => Channel::C8,
        9 => Channel::C9,
        10 => Channel::C10,
        11 => Channel::C11,
        12 => Channel::C12,
        13 => Channel::C13,
        14 => Channel::C14,
        15 => Channel::C15,
        _ => return None,
    };
    Some(channel)
}

/// Off-count for a servo angle within one 4096-tick frame.
pub fn pulse_ticks(
    pulse: &PulseRange,
    degrees: u16,
) -> u16 {
    let min = u32::from(pulse.min_us);
    let span = u32::from(pulse.max_us.saturating_sub(pulse.min_us));
    let us = min + span * u32::from(degrees.min(MAX_DEGREES)) / u32::from(MAX_DEGREES);
    (us * FRAME_TICKS / FRAME_US) as u16
}

/// Servo driver backed by a PCA9685.
pub struct Pca9685Servos<I2C> {
    pwm: Pca9685<I2C>,
    pulse: PulseRange,
    configured: bool,
}

impl<I2C, E> Pca9685Servos<I2C>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
{
    /// Wrap the expander at `address`. No bus traffic happens until the first attach.
    pub fn new(
        i2c: I2C,
        address: u8,
        pulse: PulseRange,
    ) -> Result<Self, ServoError<E>> {
        let pwm = Pca9685::new(i2c, Address::from(address)).map_err(ServoError::Pwm)?;
        Ok(Self {
            pwm,
            pulse,
            configured: false,
        })
    }

    /// Enable the outputs and set the 50 Hz servo frame.
    fn configure(&mut self) -> Result<(), ServoError<E>> {
        self.pwm.enable().map_err(ServoError::Pwm)?;
        tracing::info!("PWM enabled");
        self.pwm
            .set_prescale(SERVO_PRESCALE)
            .map_err(ServoError::Pwm)?;
        tracing::info!("PWM prescale set to 50Hz");
        self.configured = true;
        Ok(())
    }
}

impl<I2C, E> ServoDriver for Pca9685Servos<I2C>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
{
    type Error = ServoError<E>;
    type Handle = Channel;

    fn attach(
        &mut self,
        pin: Pin,
    ) -> Result<Channel, Self::Error> {
        let channel = channel_for(pin).ok_or(ServoError::InvalidPin(pin))?;
        if !self.configured {
            self.configure()?;
        }
        Ok(channel)
    }

    fn write_angle(
        &mut self,
        handle: Channel,
        degrees: u16,
    ) -> Result<(), Self::Error> {
        if degrees > MAX_DEGREES {
            return Err(ServoError::AngleOutOfRange(degrees));
        }
        let off = pulse_ticks(&self.pulse, degrees);
        self.pwm
            .set_channel_on_off(handle, 0, off)
            .map_err(ServoError::Pwm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pulse_ticks() {
        let pulse = PulseRange::default();
        assert_eq!(pulse_ticks(&pulse, 0), 111);
        assert_eq!(pulse_ticks(&pulse, 90), 301);
        assert_eq!(pulse_ticks(&pulse, 180), 491);
    }

    #[test]
    fn ticks_grow_with_angle() {
        let pulse = PulseRange::default();
        let mut prev = 0;
        for deg in 0..=180 {
            let t = pulse_ticks(&pulse, deg);
            assert!(t >= prev);
            prev = t;
        }
    }

    #[test]
    fn pins_beyond_sixteen_have_no_channel() {
        assert!(channel_for(15).is_some());
        assert!(channel_for(16).is_none());
    }
}
