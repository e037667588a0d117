//! Translation of commanded values into bounded driver domains.
//!
//! Absolute steering angles are reduced modulo the servo period and then
//! clamped into the servo's reachable window. Speeds are offset from the
//! throttle neutral and clamped into the throttle window. Nothing here ever
//! produces a value outside its target domain.

use crate::utils::config::{ServoRange, ThrottleRange};

/// A device-native value and whether it had to be clamped to get there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Folded {
    pub value: u16,
    pub clamped: bool,
}

impl Folded {
    const fn exact(value: u16) -> Self {
        Self {
            value,
            clamped: false,
        }
    }

    const fn clamped(value: u16) -> Self {
        Self {
            value,
            clamped: true,
        }
    }
}

/// Shortest distance between `a` and `b` on a circle of length `period`.
fn circular_distance(
    a: i32,
    b: i32,
    period: i32,
) -> i32 {
    let d = (a - b).rem_euclid(period);
    d.min(period - d)
}

/// Fold an absolute angle into the servo window.
///
/// Angles that land outside `[min, max]` after the periodic reduction go to the
/// boundary nearest on the circle; a tie resolves to `max`.
pub fn fold_angle(
    absolute: i32,
    range: &ServoRange,
) -> Folded {
    let period = i32::from(range.period.max(1));
    let min = i32::from(range.min);
    let max = i32::from(range.max);
    let folded = absolute.rem_euclid(period);

    if (min..=max).contains(&folded) {
        return Folded::exact(folded as u16);
    }

    let to_max = circular_distance(folded, max, period);
    let to_min = circular_distance(folded, min, period);
    if to_max <= to_min {
        Folded::clamped(range.max)
    } else {
        Folded::clamped(range.min)
    }
}

/// Map a signed speed onto the throttle window, `0` being neutral.
pub fn speed_to_throttle(
    speed: i32,
    range: &ThrottleRange,
) -> Folded {
    let raw = i32::from(range.neutral).saturating_add(speed);
    if raw < i32::from(range.min) {
        Folded::clamped(range.min)
    } else if raw > i32::from(range.max) {
        Folded::clamped(range.max)
    } else {
        Folded::exact(raw as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVO: ServoRange = ServoRange {
        min: 0,
        max: 180,
        period: 360,
    };

    #[test]
    fn in_window_angles_pass_through() {
        for a in 0..=180 {
            assert_eq!(fold_angle(a, &SERVO), Folded::exact(a as u16));
        }
    }

    #[test]
    fn absolute_angles_fold_by_period() {
        assert_eq!(fold_angle(450, &SERVO), Folded::exact(90));
        assert_eq!(fold_angle(-270, &SERVO), Folded::exact(90));
        assert_eq!(fold_angle(720 + 180, &SERVO), Folded::exact(180));
        assert_eq!(fold_angle(-360, &SERVO), Folded::exact(0));
    }

    #[test]
    fn gap_clamps_to_nearest_boundary() {
        assert_eq!(fold_angle(200, &SERVO), Folded::clamped(180));
        assert_eq!(fold_angle(300, &SERVO), Folded::clamped(0));
        assert_eq!(fold_angle(-10, &SERVO), Folded::clamped(0));
        // equidistant
        assert_eq!(fold_angle(270, &SERVO), Folded::clamped(180));
    }

    #[test]
    fn narrow_window_clamps_below_min() {
        let range = ServoRange {
            min: 30,
            max: 150,
            period: 360,
        };
        assert_eq!(fold_angle(10, &range), Folded::clamped(30));
        assert_eq!(fold_angle(170, &range), Folded::clamped(150));
        assert_eq!(fold_angle(380, &range), Folded::clamped(30));
    }

    #[test]
    fn folded_value_never_leaves_window() {
        for a in (-1000..1000).step_by(7) {
            let f = fold_angle(a, &SERVO);
            assert!(f.value <= SERVO.max, "angle {} folded to {}", a, f.value);
        }
    }

    #[test]
    fn zero_speed_is_neutral() {
        let t = ThrottleRange {
            min: 40,
            neutral: 90,
            max: 180,
        };
        assert_eq!(speed_to_throttle(0, &t), Folded::exact(90));
    }

    #[test]
    fn speed_offsets_and_clamps() {
        let t = ThrottleRange {
            min: 40,
            neutral: 90,
            max: 180,
        };
        assert_eq!(speed_to_throttle(50, &t), Folded::exact(140));
        assert_eq!(speed_to_throttle(-50, &t), Folded::exact(40));
        assert_eq!(speed_to_throttle(-51, &t), Folded::clamped(40));
        assert_eq!(speed_to_throttle(500, &t), Folded::clamped(180));
        assert_eq!(speed_to_throttle(i32::MAX, &t), Folded::clamped(180));
    }
}
