//! Motor pair controller.
//!
//! Owns the left/right steering servos, the left/right BLDC throttles and the
//! left/right encoders of a two-wheel steer-and-drive platform. Commands come
//! in as absolute angles and signed speeds and leave as servo-domain signals;
//! encoder counts come back as absolute angles.

use crate::utils::{
    config::MotorConfig,
    controllers::{ChannelId, MotorError, Pin, PositionSensor, Role, ServoDriver, Side},
    math::{
        folding::{fold_angle, speed_to_throttle, Folded},
        rotation::{counts_to_degrees, RotationTracker},
    },
};

/// Error type of a [`MotorPair`] over the given collaborators.
pub type PairError<A, S> =
    MotorError<<A as ServoDriver>::Error, <S as PositionSensor>::Error>;

/// The six pins of one controller, in wiring order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorPins {
    pub left_steer: Pin,
    pub right_steer: Pin,
    pub left_drive: Pin,
    pub right_drive: Pin,
    pub left_encoder: Pin,
    pub right_encoder: Pin,
}

impl MotorPins {
    pub const fn new(
        left_steer: Pin,
        right_steer: Pin,
        left_drive: Pin,
        right_drive: Pin,
        left_encoder: Pin,
        right_encoder: Pin,
    ) -> Self {
        Self {
            left_steer,
            right_steer,
            left_drive,
            right_drive,
            left_encoder,
            right_encoder,
        }
    }

    pub fn actuation(
        &self,
        channel: ChannelId,
    ) -> Pin {
        match (channel.side, channel.role) {
            (Side::Left, Role::Steer) => self.left_steer,
            (Side::Right, Role::Steer) => self.right_steer,
            (Side::Left, Role::Drive) => self.left_drive,
            (Side::Right, Role::Drive) => self.right_drive,
        }
    }

    pub fn encoder(
        &self,
        side: Side,
    ) -> Pin {
        match side {
            Side::Left => self.left_encoder,
            Side::Right => self.right_encoder,
        }
    }

    /// First pin that appears more than once, if any.
    ///
    /// Actuation pins and encoder pins are separate namespaces (a PWM output
    /// index and a bus address may share a number) and are checked apart.
    pub fn find_conflict(&self) -> Option<Pin> {
        let actuation = ChannelId::ALL.map(|ch| self.actuation(ch));
        let encoders = [self.left_encoder, self.right_encoder];
        first_duplicate(&actuation).or_else(|| first_duplicate(&encoders))
    }
}

fn first_duplicate(pins: &[Pin]) -> Option<Pin> {
    pins.iter()
        .enumerate()
        .find(|&(i, &pin)| pins[i + 1..].contains(&pin))
        .map(|(_, &pin)| pin)
}

/// Values actually sent to the four actuation channels by one write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    pub left_steer: Folded,
    pub right_steer: Folded,
    pub left_drive: Folded,
    pub right_drive: Folded,
}

impl WriteReport {
    pub fn get(
        &self,
        channel: ChannelId,
    ) -> Folded {
        match (channel.side, channel.role) {
            (Side::Left, Role::Steer) => self.left_steer,
            (Side::Right, Role::Steer) => self.right_steer,
            (Side::Left, Role::Drive) => self.left_drive,
            (Side::Right, Role::Drive) => self.right_drive,
        }
    }

    pub fn any_clamped(&self) -> bool {
        ChannelId::ALL.iter().any(|&ch| self.get(ch).clamped)
    }
}

/// Position in `ChannelId::ALL`.
fn slot(channel: ChannelId) -> usize {
    match (channel.side, channel.role) {
        (Side::Left, Role::Steer) => 0,
        (Side::Right, Role::Steer) => 1,
        (Side::Left, Role::Drive) => 2,
        (Side::Right, Role::Drive) => 3,
    }
}

fn side_slot(side: Side) -> usize {
    match side {
        Side::Left => 0,
        Side::Right => 1,
    }
}

/// Controller for one steer-and-drive wheel pair.
///
/// Construction only records pins; [`MotorPair::attach`] binds the hardware and
/// must succeed before any write or read.
pub struct MotorPair<A: ServoDriver, S: PositionSensor> {
    driver: A,
    sensor: S,
    config: MotorConfig,
    pins: MotorPins,
    /// Bound driver handles, indexed like `ChannelId::ALL`.
    handles: [Option<A::Handle>; 4],
    trackers: [RotationTracker; 2],
}

impl<A, S> MotorPair<A, S>
where
    A: ServoDriver,
    S: PositionSensor,
{
    pub fn new(
        pins: MotorPins,
        driver: A,
        sensor: S,
        config: MotorConfig,
    ) -> Self {
        MotorPair {
            driver,
            sensor,
            config,
            pins,
            handles: [None; 4],
            trackers: [RotationTracker::new(); 2],
        }
    }

    pub fn pins(&self) -> &MotorPins {
        &self.pins
    }

    pub fn config(&self) -> &MotorConfig {
        &self.config
    }

    pub fn is_attached(&self) -> bool {
        self.handles.iter().all(Option::is_some)
    }

    /// Bind all four actuation channels to the servo driver.
    ///
    /// Nothing is committed unless every channel binds. Calling again after a
    /// successful attach does nothing.
    pub fn attach(&mut self) -> Result<(), PairError<A, S>> {
        if self.is_attached() {
            tracing::debug!("motors already attached");
            return Ok(());
        }
        self.config.validate().map_err(MotorError::InvalidConfig)?;
        if let Some(pin) = self.pins.find_conflict() {
            tracing::error!(pin, "pin assigned to more than one channel");
            return Err(MotorError::PinConflict { pin });
        }

        let mut handles = [None; 4];
        for channel in ChannelId::ALL {
            let pin = self.pins.actuation(channel);
            let handle = self
                .driver
                .attach(pin)
                .map_err(|error| MotorError::Actuator { channel, error })?;
            tracing::info!(?channel, pin, "channel attached");
            handles[slot(channel)] = Some(handle);
        }

        self.handles = handles;
        self.reset_encoders();
        Ok(())
    }

    /// Translate one commanded pair and drive all four channels.
    ///
    /// Every channel is written even if an earlier one fails; the first
    /// failure is returned as [`MotorError::WriteFailed`] once all four have
    /// been attempted, carrying the report of what was sent. Out-of-window
    /// values are clamped and flagged in the report, never rejected.
    pub fn write_motors(
        &mut self,
        left_angle: i32,
        right_angle: i32,
        left_speed: i32,
        right_speed: i32,
    ) -> Result<WriteReport, PairError<A, S>> {
        if !self.is_attached() {
            tracing::error!("write_motors called before attach");
            return Err(MotorError::NotAttached);
        }

        let servo = &self.config.servo;
        let throttle = &self.config.throttle;
        let report = WriteReport {
            left_steer: fold_angle(left_angle, servo),
            right_steer: fold_angle(right_angle, servo),
            left_drive: speed_to_throttle(left_speed, throttle),
            right_drive: speed_to_throttle(right_speed, throttle),
        };
        tracing::debug!(left_angle, right_angle, left_speed, right_speed, ?report, "write_motors");

        let mut first_error = None;
        for channel in ChannelId::ALL {
            let out = report.get(channel);
            if out.clamped {
                tracing::warn!(?channel, value = out.value, "command clamped to domain boundary");
            }
            if let Err(e) = self.actuate(channel, out.value) {
                tracing::error!(?channel, "actuation failed: {:?}", e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(MotorError::Actuator { channel, error }) => Err(MotorError::WriteFailed {
                channel,
                error,
                report,
            }),
            Some(e) => Err(e),
            None => Ok(report),
        }
    }

    /// Put both BLDC channels at throttle neutral, leaving steering untouched.
    pub fn stop(&mut self) -> Result<(), PairError<A, S>> {
        if !self.is_attached() {
            return Err(MotorError::NotAttached);
        }
        let neutral = self.config.throttle.neutral;
        let left = self.actuate(ChannelId::LEFT_DRIVE, neutral);
        let right = self.actuate(ChannelId::RIGHT_DRIVE, neutral);
        tracing::info!(neutral, "drives stopped");
        left.and(right)
    }

    /// Absolute angle of the left encoder, in degrees.
    pub fn get_y1(&mut self) -> Result<i32, PairError<A, S>> {
        self.read_angle(Side::Left)
    }

    /// Absolute angle of the right encoder, in degrees.
    pub fn get_y2(&mut self) -> Result<i32, PairError<A, S>> {
        self.read_angle(Side::Right)
    }

    pub fn read_angle(
        &mut self,
        side: Side,
    ) -> Result<i32, PairError<A, S>> {
        if !self.is_attached() {
            return Err(MotorError::NotAttached);
        }
        let cpr = self.config.encoder.counts_per_rev;
        let raw = self
            .sensor
            .read_raw(self.pins.encoder(side))
            .map_err(|error| MotorError::Sensor { side, error })?;
        if raw >= cpr {
            tracing::warn!(?side, raw, cpr, "encoder reading outside its period");
            return Err(MotorError::ReadingOutOfRange { side, raw });
        }

        let counts = self.trackers[side_slot(side)].update(raw, cpr);
        let degrees = counts_to_degrees(counts, cpr);
        tracing::trace!(?side, raw, counts, degrees, "encoder read");
        Ok(degrees)
    }

    /// Zero the rotation count of both encoders.
    pub fn reset_encoders(&mut self) {
        for tracker in self.trackers.iter_mut() {
            tracker.reset();
        }
    }

    /// Give back the servo driver and position sensor.
    pub fn release(self) -> (A, S) {
        (self.driver, self.sensor)
    }

    fn actuate(
        &mut self,
        channel: ChannelId,
        value: u16,
    ) -> Result<(), PairError<A, S>> {
        let handle = self.handles[slot(channel)].ok_or(MotorError::NotAttached)?;
        self.driver
            .write_angle(handle, value)
            .map_err(|error| MotorError::Actuator { channel, error })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_pins_have_no_conflict() {
        assert_eq!(MotorPins::new(9, 10, 11, 12, 13, 14).find_conflict(), None);
    }

    #[test]
    fn shared_pin_is_reported() {
        assert_eq!(MotorPins::new(9, 10, 11, 11, 13, 14).find_conflict(), Some(11));
        assert_eq!(MotorPins::new(9, 9, 11, 12, 13, 14).find_conflict(), Some(9));
        assert_eq!(MotorPins::new(9, 10, 11, 12, 13, 13).find_conflict(), Some(13));
    }

    #[test]
    fn encoder_pins_may_reuse_actuation_numbers() {
        assert_eq!(MotorPins::new(0, 1, 2, 12, 0x36, 0x0C).find_conflict(), None);
        assert_eq!(MotorPins::new(9, 10, 11, 12, 11, 9).find_conflict(), None);
    }

    #[test]
    fn pins_follow_wiring_order() {
        let pins = MotorPins::new(1, 2, 3, 4, 5, 6);
        let actuation = ChannelId::ALL.map(|ch| pins.actuation(ch));
        assert_eq!(actuation, [1, 2, 3, 4]);
        assert_eq!(pins.encoder(Side::Left), 5);
        assert_eq!(pins.encoder(Side::Right), 6);
    }

    #[test]
    fn slots_match_channel_order() {
        for (i, ch) in ChannelId::ALL.into_iter().enumerate() {
            assert_eq!(slot(ch), i);
        }
    }
}
