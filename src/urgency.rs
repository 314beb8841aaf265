use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const MICROS_PER_HOUR: f64 = 3_600_000_000.0;

/// How soon an item needs attention. Ordered most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UrgencyBand {
    Now,
    Today,
    Later,
}

/// Hour cutoffs between bands. A gap of exactly `now_hours` is still `Now`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    pub now_hours: f64,
    pub today_hours: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            now_hours: 1.0,
            today_hours: 24.0,
        }
    }
}

impl Thresholds {
    pub fn classify(&self, timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> UrgencyBand {
        let Some(ts) = timestamp else {
            return UrgencyBand::Later;
        };
        let gap = ts - now;
        if gap <= hours(self.now_hours) {
            UrgencyBand::Now
        } else if gap <= hours(self.today_hours) {
            UrgencyBand::Today
        } else {
            UrgencyBand::Later
        }
    }
}

fn hours(value: f64) -> Duration {
    Duration::microseconds((value * MICROS_PER_HOUR).round() as i64)
}

/// Classifies with the default 1h / 24h cutoffs. Overdue items are `Now`.
pub fn classify(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> UrgencyBand {
    Thresholds::default().classify(timestamp, now)
}

impl UrgencyBand {
    pub fn label(self) -> &'static str {
        match self {
            UrgencyBand::Now => "NOW",
            UrgencyBand::Today => "TODAY",
            UrgencyBand::Later => "LATER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
    }

    #[test]
    fn missing_timestamp_is_later() {
        assert_eq!(classify(None, now()), UrgencyBand::Later);
    }

    #[test]
    fn boundaries_are_inclusive() {
        let n = now();
        assert_eq!(classify(Some(n + Duration::hours(1)), n), UrgencyBand::Now);
        assert_eq!(
            classify(Some(n + Duration::hours(1) + Duration::seconds(1)), n),
            UrgencyBand::Today
        );
        assert_eq!(classify(Some(n + Duration::hours(24)), n), UrgencyBand::Today);
        assert_eq!(
            classify(Some(n + Duration::hours(24) + Duration::minutes(1)), n),
            UrgencyBand::Later
        );
    }

    #[test]
    fn sub_millisecond_overshoot_leaves_now() {
        let n = now();
        let just_past = n + Duration::hours(1) + Duration::nanoseconds(1);
        assert_eq!(classify(Some(just_past), n), UrgencyBand::Today);
        let just_past_day = n + Duration::hours(24) + Duration::microseconds(1);
        assert_eq!(classify(Some(just_past_day), n), UrgencyBand::Later);
    }

    #[test]
    fn overdue_is_now() {
        let n = now();
        assert_eq!(classify(Some(n - Duration::days(30)), n), UrgencyBand::Now);
        assert_eq!(classify(Some(n), n), UrgencyBand::Now);
    }

    #[test]
    fn custom_thresholds_shift_cutoffs() {
        let n = now();
        let wide = Thresholds {
            now_hours: 4.0,
            today_hours: 72.0,
        };
        assert_eq!(wide.classify(Some(n + Duration::hours(3)), n), UrgencyBand::Now);
        assert_eq!(wide.classify(Some(n + Duration::hours(48)), n), UrgencyBand::Today);
    }

    proptest! {
        #[test]
        fn urgency_never_decreases_as_deadline_nears(
            far in -10_000i64..100_000,
            shrink in 0i64..100_000,
        ) {
            let n = now();
            let near = far - shrink;
            let far_band = classify(Some(n + Duration::minutes(far)), n);
            let near_band = classify(Some(n + Duration::minutes(near)), n);
            prop_assert!(near_band <= far_band);
        }

        #[test]
        fn anything_in_the_past_is_now(mins in 1i64..10_000_000) {
            let n = now();
            prop_assert_eq!(classify(Some(n - Duration::minutes(mins)), n), UrgencyBand::Now);
        }
    }
}
