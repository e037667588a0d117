//! Actuation and feedback domains for the motor pair.
//!
//! All angles are in whole degrees. The servo and throttle domains are the
//! values handed to a hobby-servo style driver (`0..=180`), the encoder domain
//! is the sensor's raw count range.

use serde::{Deserialize, Serialize};

/// Largest angle a servo-signal driver accepts.
pub const SIGNAL_MAX_DEGREES: u16 = 180;

/// Bounded steering domain and the period absolute angles are folded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServoRange {
    pub min: u16,
    pub max: u16,
    /// One full turn in absolute coordinates.
    pub period: u16,
}

impl Default for ServoRange {
    fn default() -> Self {
        Self {
            min: 0,
            max: 180,
            period: 360,
        }
    }
}

/// Throttle domain of a BLDC speed controller driven by a servo signal.
///
/// `neutral` is the stop value; it need not sit in the middle of the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleRange {
    pub min: u16,
    pub neutral: u16,
    pub max: u16,
}

impl Default for ThrottleRange {
    fn default() -> Self {
        Self {
            min: 0,
            neutral: 90,
            max: 180,
        }
    }
}

/// Raw count period of the position sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    pub counts_per_rev: u16,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        // 12-bit magnetic encoder
        Self {
            counts_per_rev: 4096,
        }
    }
}

/// Pulse widths (microseconds) for 0 and 180 degrees on a PWM servo output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseRange {
    pub min_us: u16,
    pub max_us: u16,
}

impl Default for PulseRange {
    fn default() -> Self {
        Self {
            min_us: 544,
            max_us: 2400,
        }
    }
}

/// Reasons a [`MotorConfig`] is rejected at attach time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ServoBounds { min: u16, max: u16 },
    ServoPeriod { max: u16, period: u16 },
    /// A window reaching past what the servo signal can express.
    SignalDomain { max: u16 },
    ThrottleBounds { min: u16, neutral: u16, max: u16 },
    ZeroCountsPerRev,
}

/// Complete translation setup for one controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorConfig {
    pub servo: ServoRange,
    pub throttle: ThrottleRange,
    pub encoder: EncoderConfig,
}

impl MotorConfig {
    /// Check that every domain is non-empty and self-consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = self.servo;
        if s.min > s.max {
            return Err(ConfigError::ServoBounds {
                min: s.min,
                max: s.max,
            });
        }
        if s.max > SIGNAL_MAX_DEGREES {
            return Err(ConfigError::SignalDomain { max: s.max });
        }
        if s.max >= s.period {
            return Err(ConfigError::ServoPeriod {
                max: s.max,
                period: s.period,
            });
        }

        let t = self.throttle;
        if !(t.min <= t.neutral && t.neutral <= t.max) {
            return Err(ConfigError::ThrottleBounds {
                min: t.min,
                neutral: t.neutral,
                max: t.max,
            });
        }
        if t.max > SIGNAL_MAX_DEGREES {
            return Err(ConfigError::SignalDomain { max: t.max });
        }

        if self.encoder.counts_per_rev == 0 {
            return Err(ConfigError::ZeroCountsPerRev);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(MotorConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_servo_max_reaching_period() {
        let mut cfg = MotorConfig::default();
        cfg.servo.max = 170;
        cfg.servo.period = 170;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ServoPeriod {
                max: 170,
                period: 170
            })
        );
    }

    #[test]
    fn rejects_windows_wider_than_the_signal() {
        let mut cfg = MotorConfig::default();
        cfg.servo.max = 270;
        assert_eq!(cfg.validate(), Err(ConfigError::SignalDomain { max: 270 }));

        let mut cfg = MotorConfig::default();
        cfg.throttle.max = 200;
        assert_eq!(cfg.validate(), Err(ConfigError::SignalDomain { max: 200 }));
    }

    #[test]
    fn rejects_neutral_outside_throttle() {
        let mut cfg = MotorConfig::default();
        cfg.throttle.neutral = 200;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ThrottleBounds { .. })
        ));
    }

    #[test]
    fn rejects_zero_counts() {
        let mut cfg = MotorConfig::default();
        cfg.encoder.counts_per_rev = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroCountsPerRev));
    }
}
