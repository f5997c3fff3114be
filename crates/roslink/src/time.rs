// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire representation of ROS `time` and `duration` primitives.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Seconds + nanoseconds pair carried by `time` and `duration` fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeData {
    pub sec: i32,
    pub nsec: i32,
}

impl TimeData {
    pub const ZERO: TimeData = TimeData { sec: 0, nsec: 0 };

    pub const fn new(sec: i32, nsec: i32) -> Self {
        Self { sec, nsec }
    }

    /// Current wall-clock time since the Unix epoch.
    pub fn now() -> Self {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(Self::from_duration)
            .unwrap_or(Self::ZERO)
    }

    /// Total nanoseconds, negative durations included.
    pub fn total_nanos(&self) -> i64 {
        i64::from(self.sec) * NANOS_PER_SEC + i64::from(self.nsec)
    }

    /// Normalizes so that `0 <= nsec < 1e9`.
    pub fn from_nanos(nanos: i64) -> Self {
        let sec = nanos.div_euclid(NANOS_PER_SEC);
        let nsec = nanos.rem_euclid(NANOS_PER_SEC);
        Self {
            sec: i32::try_from(sec).unwrap_or(if sec < 0 { i32::MIN } else { i32::MAX }),
            // rem_euclid keeps this below 1e9
            nsec: nsec as i32,
        }
    }

    /// Saturates at `i32::MAX` seconds.
    pub fn from_duration(d: Duration) -> Self {
        Self {
            sec: i32::try_from(d.as_secs()).unwrap_or(i32::MAX),
            nsec: d.subsec_nanos() as i32,
        }
    }

    /// `None` for negative values.
    pub fn to_duration(&self) -> Option<Duration> {
        let nanos = u64::try_from(self.total_nanos()).ok()?;
        Some(Duration::from_nanos(nanos))
    }

    pub fn is_zero(&self) -> bool {
        self.sec == 0 && self.nsec == 0
    }
}

impl From<Duration> for TimeData {
    fn from(d: Duration) -> Self {
        Self::from_duration(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_roundtrip() {
        let d = Duration::from_millis(1_500);
        let t = TimeData::from(d);
        assert_eq!(t, TimeData::new(1, 500_000_000));
        assert_eq!(t.to_duration(), Some(d));
    }

    #[test]
    fn negative_values_normalize() {
        let t = TimeData::from_nanos(-1);
        assert_eq!(t, TimeData::new(-1, 999_999_999));
        assert_eq!(t.total_nanos(), -1);
        assert_eq!(t.to_duration(), None);
    }

    #[test]
    fn zero() {
        assert!(TimeData::ZERO.is_zero());
        assert!(TimeData::default().is_zero());
        assert!(!TimeData::now().is_zero());
    }
}
