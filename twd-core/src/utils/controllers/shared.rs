//! Shared access to one [`MotorPair`] from more than one execution context.
//!
//! The encoder rotation counts are the only mutable state that survives
//! between calls, so every access goes through a critical-section mutex. The
//! target must provide a `critical-section` implementation.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use crate::utils::controllers::{
    motors::{MotorPair, PairError, WriteReport},
    PositionSensor, ServoDriver,
};

pub struct SharedMotorPair<A: ServoDriver, S: PositionSensor> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<MotorPair<A, S>>>,
}

impl<A, S> SharedMotorPair<A, S>
where
    A: ServoDriver,
    S: PositionSensor,
{
    pub fn new(pair: MotorPair<A, S>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(pair)),
        }
    }

    /// Run `f` with exclusive access to the controller.
    pub fn with<R>(
        &self,
        f: impl FnOnce(&mut MotorPair<A, S>) -> R,
    ) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    pub fn attach(&self) -> Result<(), PairError<A, S>> {
        self.with(|pair| pair.attach())
    }

    pub fn write_motors(
        &self,
        left_angle: i32,
        right_angle: i32,
        left_speed: i32,
        right_speed: i32,
    ) -> Result<WriteReport, PairError<A, S>> {
        self.with(|pair| pair.write_motors(left_angle, right_angle, left_speed, right_speed))
    }

    pub fn get_y1(&self) -> Result<i32, PairError<A, S>> {
        self.with(|pair| pair.get_y1())
    }

    pub fn get_y2(&self) -> Result<i32, PairError<A, S>> {
        self.with(|pair| pair.get_y2())
    }

    pub fn stop(&self) -> Result<(), PairError<A, S>> {
        self.with(|pair| pair.stop())
    }

    pub fn into_inner(self) -> MotorPair<A, S> {
        self.inner.into_inner().into_inner()
    }
}
