//! Encoder unwrapping.
//!
//! Raw sensor counts wrap at `counts_per_rev`. [`RotationTracker`] counts the
//! wraps between successive samples so the accumulated position keeps growing
//! (or shrinking) with physical rotation instead of jumping back to zero.

/// Per-encoder wrap counter.
///
/// Consecutive samples must be less than half a revolution apart for the
/// direction of a wrap to be resolved correctly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationTracker {
    last: Option<u16>,
    turns: i32,
}

impl RotationTracker {
    pub const fn new() -> Self {
        Self {
            last: None,
            turns: 0,
        }
    }

    /// Feed a raw sample and return the accumulated position in counts.
    pub fn update(
        &mut self,
        raw: u16,
        counts_per_rev: u16,
    ) -> i64 {
        let half = i32::from(counts_per_rev) / 2;
        if let Some(prev) = self.last {
            let step = i32::from(raw) - i32::from(prev);
            if step > half {
                self.turns -= 1;
            } else if step < -half {
                self.turns += 1;
            }
        }
        self.last = Some(raw);
        i64::from(self.turns) * i64::from(counts_per_rev) + i64::from(raw)
    }

    /// Whole revolutions accumulated so far.
    pub fn turns(&self) -> i32 {
        self.turns
    }

    /// Forget all history; the next sample is taken as lying within turn zero.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Convert accumulated counts to whole degrees, rounding toward negative infinity.
///
/// Saturates at the `i32` bounds.
pub fn counts_to_degrees(
    counts: i64,
    counts_per_rev: u16,
) -> i32 {
    let degrees = (i128::from(counts) * 360).div_euclid(i128::from(counts_per_rev));
    i32::try_from(degrees).unwrap_or(if degrees < 0 { i32::MIN } else { i32::MAX })
}

/// Smallest count whose [`counts_to_degrees`] is at least `degrees`.
pub fn degrees_to_counts(
    degrees: i32,
    counts_per_rev: u16,
) -> i64 {
    (i64::from(degrees) * i64::from(counts_per_rev) + 359).div_euclid(360)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CPR: u16 = 4096;

    #[test]
    fn first_sample_seeds_turn_zero() {
        let mut t = RotationTracker::new();
        assert_eq!(t.update(3000, CPR), 3000);
        assert_eq!(t.turns(), 0);
    }

    #[test]
    fn forward_wrap_keeps_increasing() {
        let mut t = RotationTracker::new();
        let seq: [i64; 4] = [4000, 4090, 10, 100].map(|r| t.update(r, CPR));
        assert_eq!(seq, [4000, 4090, 4106, 4196]);
        assert_eq!(t.turns(), 1);
    }

    #[test]
    fn backward_wrap_keeps_decreasing() {
        let mut t = RotationTracker::new();
        let seq: [i64; 4] = [100, 10, 4090, 4000].map(|r| t.update(r, CPR));
        assert_eq!(seq, [100, 10, -6, -96]);

        let degrees = seq.map(|c| counts_to_degrees(c, CPR));
        assert!(degrees.windows(2).all(|w| w[1] <= w[0]), "{:?}", degrees);
        assert_eq!(degrees[3], -9);
    }

    #[test]
    fn several_turns_accumulate_monotonically() {
        let mut t = RotationTracker::new();
        let mut prev = i64::MIN;
        let mut raw: u16 = 0;
        for _ in 0..40 {
            let pos = t.update(raw, CPR);
            assert!(pos > prev);
            prev = pos;
            raw = (raw + 500) % CPR;
        }
        assert_eq!(t.turns(), 4);
        assert_eq!(counts_to_degrees(prev, CPR), (39 * 500 * 360 / 4096) as i32);
    }

    #[test]
    fn reset_clears_turns() {
        let mut t = RotationTracker::new();
        t.update(4000, CPR);
        t.update(100, CPR);
        assert_eq!(t.turns(), 1);
        t.reset();
        assert_eq!(t.update(100, CPR), 100);
    }

    #[test]
    fn degrees_saturate_instead_of_wrapping() {
        let far = i64::from(i32::MAX) * i64::from(CPR);
        assert_eq!(counts_to_degrees(far, CPR), i32::MAX);
        assert_eq!(counts_to_degrees(-far, CPR), i32::MIN);
        assert_eq!(counts_to_degrees(i64::MAX, CPR), i32::MAX);
    }

    #[test]
    fn degrees_round_trip_within_one_period() {
        for cpr in [360u16, 1024, 4096] {
            for d in 0..360 {
                assert_eq!(counts_to_degrees(degrees_to_counts(d, cpr), cpr), d);
            }
        }
    }
}
