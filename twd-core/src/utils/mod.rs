//! Utility re-exports for the two-wheel drive platform.
//!
//! - `config`: actuation/feedback domains and their defaults
//! - `controllers`: the motor pair controller and its hardware backends
//! - `math`: angle folding, throttle mapping and encoder unwrapping

pub mod config;
pub mod controllers;
pub mod math;

pub use config::MotorConfig;
pub use controllers::{MotorError, MotorPair, MotorPins};
