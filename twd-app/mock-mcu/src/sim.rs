//! Simulated hardware for bench runs.
//!
//! Servo outputs are latched per pin. Each encoder follows the throttle of the
//! drive pin it is paired with: every step moves it by
//! `(throttle - neutral) * gain` counts, wrapping at the counter period.

use std::{cell::RefCell, collections::HashMap, convert::Infallible, rc::Rc};

use twd_core::utils::{
    config::MotorConfig,
    controllers::{Pin, PositionSensor, ServoDriver, Side},
    MotorPins,
};

#[derive(Debug)]
pub struct Plant {
    outputs: HashMap<Pin, u16>,
    counts: HashMap<Pin, i64>,
    links: [(Pin, Pin); 2],
    neutral: i64,
    counts_per_rev: i64,
    gain: i64,
}

impl Plant {
    pub fn new(
        pins: &MotorPins,
        config: &MotorConfig,
        gain: i64,
    ) -> Rc<RefCell<Self>> {
        let links = [Side::Left, Side::Right].map(|side| {
            let drive = match side {
                Side::Left => pins.left_drive,
                Side::Right => pins.right_drive,
            };
            (drive, pins.encoder(side))
        });
        Rc::new(RefCell::new(Self {
            outputs: HashMap::new(),
            counts: HashMap::new(),
            links,
            neutral: i64::from(config.throttle.neutral),
            counts_per_rev: i64::from(config.encoder.counts_per_rev),
            gain,
        }))
    }

    /// Advance every encoder by one control period.
    pub fn step(&mut self) {
        for (drive, encoder) in self.links {
            let throttle = self.outputs.get(&drive).copied().map_or(self.neutral, i64::from);
            *self.counts.entry(encoder).or_default() += (throttle - self.neutral) * self.gain;
        }
    }

    fn raw(
        &self,
        encoder: Pin,
    ) -> u16 {
        let c = self.counts.get(&encoder).copied().unwrap_or_default();
        c.rem_euclid(self.counts_per_rev) as u16
    }
}

/// Servo driver that writes into the plant.
pub struct SimServos(pub Rc<RefCell<Plant>>);

impl ServoDriver for SimServos {
    type Error = Infallible;
    type Handle = Pin;

    fn attach(
        &mut self,
        pin: Pin,
    ) -> Result<Pin, Infallible> {
        tracing::debug!(pin, "sim servo attached");
        Ok(pin)
    }

    fn write_angle(
        &mut self,
        handle: Pin,
        degrees: u16,
    ) -> Result<(), Infallible> {
        self.0.borrow_mut().outputs.insert(handle, degrees);
        Ok(())
    }
}

/// Encoders that read the plant.
pub struct SimEncoders(pub Rc<RefCell<Plant>>);

impl PositionSensor for SimEncoders {
    type Error = Infallible;

    fn read_raw(
        &mut self,
        pin: Pin,
    ) -> Result<u16, Infallible> {
        Ok(self.0.borrow().raw(pin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoder_follows_throttle_and_wraps() {
        let pins = MotorPins::new(9, 10, 11, 12, 13, 14);
        let cfg = MotorConfig::default();
        let plant = Plant::new(&pins, &cfg, 10);
        let mut servos = SimServos(plant.clone());
        let mut encoders = SimEncoders(plant.clone());

        servos.write_angle(11, 190).unwrap();
        servos.write_angle(12, 40).unwrap();
        for _ in 0..5 {
            plant.borrow_mut().step();
        }
        // +100 * 10 * 5 wraps once, -50 * 10 * 5 goes below zero
        assert_eq!(encoders.read_raw(13).unwrap(), 5000 - 4096);
        assert_eq!(encoders.read_raw(14).unwrap(), 4096 - 2500);
    }
}
