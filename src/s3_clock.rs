use chrono::{DateTime, Utc};

use crate::error::Advisory;
use crate::s3_constant::CLOCK_SKEW_TOLERANCE_SECONDS;

/// Source of the signing timestamp. Read once per signing operation.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Compares a signing timestamp against the wall clock.
pub fn check_clock_skew(signed_at: DateTime<Utc>, wall: DateTime<Utc>) -> Option<Advisory> {
    let skew_seconds = (signed_at - wall).num_seconds();
    if skew_seconds.abs() > CLOCK_SKEW_TOLERANCE_SECONDS {
        Some(Advisory::ClockSkewRisk {
            skew_seconds,
            tolerance_seconds: CLOCK_SKEW_TOLERANCE_SECONDS,
        })
    } else {
        None
    }
}

/// Date-only form used in the V4 credential scope.
#[inline]
pub fn to_signer_date(time: DateTime<Utc>) -> String {
    time.format("%Y%m%d").to_string()
}

/// Basic ISO 8601 form used by `x-amz-date`.
#[inline]
pub fn to_amz_date(time: DateTime<Utc>) -> String {
    time.format("%Y%m%dT%H%M%SZ").to_string()
}

/// RFC 1123 form used by the `Date` header.
#[inline]
pub fn to_http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn test_date_formats() {
        let t = Utc.with_ymd_and_hms(2013, 5, 24, 0, 0, 0).unwrap();
        assert_eq!(to_signer_date(t), "20130524");
        assert_eq!(to_amz_date(t), "20130524T000000Z");
        assert_eq!(to_http_date(t), "Fri, 24 May 2013 00:00:00 GMT");
    }

    #[test]
    fn test_clock_skew_window() {
        let wall = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(check_clock_skew(wall + Duration::minutes(15), wall), None);
        assert_eq!(
            check_clock_skew(wall - Duration::minutes(16), wall),
            Some(Advisory::ClockSkewRisk {
                skew_seconds: -960,
                tolerance_seconds: 900,
            })
        );
    }
}
