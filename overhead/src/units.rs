//! A lightweight uom-ish set of units for angles and time.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Copy, Clone, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct Angle {
    degrees: f64,
}

impl std::fmt::Debug for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees)
    }
}

impl std::fmt::Display for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}°", self.degrees)
    }
}

impl Angle {
    pub fn from_degrees(degrees: f64) -> Angle {
        Angle { degrees }
    }

    pub fn as_degrees(&self) -> f64 {
        self.degrees
    }

    pub fn as_radians(&self) -> f64 {
        self.degrees.to_radians()
    }

    /// Wrapped into [0, 360)
    pub fn normalized(&self) -> Angle {
        let d = self.degrees.rem_euclid(360.0);
        Angle::from_degrees(if d >= 360.0 { 0.0 } else { d })
    }
}

impl Sub<Angle> for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Self::Output {
        Angle::from_degrees(self.as_degrees() - rhs.as_degrees())
    }
}

#[derive(Copy, Clone, PartialEq, PartialOrd, Default)]
pub struct Time {
    seconds: f64,
}

impl std::fmt::Debug for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} s", self.seconds)
    }
}

impl Time {
    pub fn from_chrono_duration(duration: chrono::Duration) -> Time {
        Time::from_millis(duration.num_milliseconds() as f64)
    }

    pub fn from_std_duration(duration: std::time::Duration) -> Time {
        Time::from_secs(duration.as_secs_f64())
    }

    pub fn from_minutes(minutes: f64) -> Time {
        Self::from_secs(minutes * 60.0)
    }

    pub fn from_secs(seconds: f64) -> Time {
        Time { seconds }
    }

    pub fn from_millis(millis: f64) -> Time {
        Time {
            seconds: millis / 1000.0,
        }
    }

    pub fn as_secs(&self) -> f64 {
        self.seconds
    }

    pub fn as_minutes(&self) -> f64 {
        self.seconds / 60.0
    }

    pub fn as_millis(&self) -> f64 {
        self.seconds * 1_000.0
    }

    pub fn as_chrono_duration(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.as_millis().round() as i64)
    }
}

impl Add<Time> for Time {
    type Output = Time;

    fn add(self, rhs: Time) -> Self::Output {
        Time::from_secs(self.seconds + rhs.seconds)
    }
}

impl Mul<f64> for Time {
    type Output = Time;

    fn mul(self, rhs: f64) -> Self::Output {
        Time::from_secs(self.seconds * rhs)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct Timestamp {
    utc: DateTime<Utc>,
}

impl std::fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.utc)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.utc.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

impl Timestamp {
    pub fn now() -> Timestamp {
        Timestamp::from_utc(Utc::now())
    }

    pub fn from_utc(utc: DateTime<Utc>) -> Timestamp {
        Timestamp { utc }
    }

    /// None when the calendar fields are out of range
    pub fn from_ymd_hms(year: i32, month: u32, day: u32, h: u32, m: u32, s: u32) -> Option<Timestamp> {
        Utc.with_ymd_and_hms(year, month, day, h, m, s)
            .single()
            .map(Timestamp::from_utc)
    }

    pub fn as_utc(&self) -> &DateTime<Utc> {
        &self.utc
    }

    pub fn as_millis(&self) -> i64 {
        self.utc.timestamp_millis()
    }

    /// Days since the Julian epoch
    pub fn as_julian_date(&self) -> f64 {
        const UNIX_EPOCH_JULIAN_DATE: f64 = 2_440_587.5;
        UNIX_EPOCH_JULIAN_DATE + self.as_millis() as f64 / 86_400_000.0
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Time;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        Time::from_chrono_duration(*self.as_utc() - *rhs.as_utc())
    }
}

impl Add<Time> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Time) -> Self::Output {
        let mut ts = self;
        ts += rhs;
        ts
    }
}

impl AddAssign<Time> for Timestamp {
    fn add_assign(&mut self, rhs: Time) {
        self.utc += rhs.as_chrono_duration();
    }
}
