//! Module Exports
//!
//! This file exports the motor pair controller and the hardware it talks to.
//!
//! - `motors`: the controller owning the four actuation and two feedback channels
//! - `shared`: mutex wrapper for reaching one controller from several contexts
//! - `pca9685`: servo/ESC signal generation on a PCA9685 PWM expander
//! - `as5600`: raw angle readout from AS5600-family magnetic encoders
//! - `board`: both backends wired onto one shared I2C bus

pub mod as5600;
pub mod board;
pub mod motors;
pub mod pca9685;
pub mod shared;

use crate::utils::config::ConfigError;

pub use motors::{MotorPair, MotorPins, WriteReport};
pub use shared::SharedMotorPair;

/// Hardware pin (or channel/address) identifier as handed to the collaborators.
pub type Pin = u8;

/// Capability to generate a hobby-servo style signal on a pin.
///
/// Used both for steering servos and for BLDC speed controllers, which read
/// the same signal as a throttle.
pub trait ServoDriver {
    type Error: core::fmt::Debug;
    /// Token for a pin that has been bound to the driver.
    type Handle: Copy;

    fn attach(
        &mut self,
        pin: Pin,
    ) -> Result<Self::Handle, Self::Error>;

    /// Drive the bound output to `degrees` (`0..=180`).
    fn write_angle(
        &mut self,
        handle: Self::Handle,
        degrees: u16,
    ) -> Result<(), Self::Error>;
}

/// Capability to read the native, wrapping count of a position sensor.
pub trait PositionSensor {
    type Error: core::fmt::Debug;

    fn read_raw(
        &mut self,
        pin: Pin,
    ) -> Result<u16, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Steer,
    Drive,
}

/// One of the four actuation channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelId {
    pub side: Side,
    pub role: Role,
}

impl ChannelId {
    pub const LEFT_STEER: Self = Self::new(Side::Left, Role::Steer);
    pub const RIGHT_STEER: Self = Self::new(Side::Right, Role::Steer);
    pub const LEFT_DRIVE: Self = Self::new(Side::Left, Role::Drive);
    pub const RIGHT_DRIVE: Self = Self::new(Side::Right, Role::Drive);

    /// Attach and write order.
    pub const ALL: [Self; 4] = [
        Self::LEFT_STEER,
        Self::RIGHT_STEER,
        Self::LEFT_DRIVE,
        Self::RIGHT_DRIVE,
    ];

    pub const fn new(
        side: Side,
        role: Role,
    ) -> Self {
        Self { side, role }
    }
}

/// Errors surfaced by the motor pair controller.
///
/// `A` is the servo driver's error type, `S` the position sensor's.
#[derive(Debug)]
pub enum MotorError<A: core::fmt::Debug, S: core::fmt::Debug> {
    /// A write or read was attempted before `attach`.
    NotAttached,
    /// Two channels were configured on the same pin.
    PinConflict { pin: Pin },
    InvalidConfig(ConfigError),
    Actuator { channel: ChannelId, error: A },
    /// A write where `channel` failed; the other channels were still driven
    /// with the values in `report`.
    WriteFailed {
        channel: ChannelId,
        error: A,
        report: WriteReport,
    },
    Sensor { side: Side, error: S },
    /// The sensor answered with a count outside its own period.
    ReadingOutOfRange { side: Side, raw: u16 },
}
