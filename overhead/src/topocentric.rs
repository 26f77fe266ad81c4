//! Observer-centric look angles from TEME positions.
//!
//! The TEME position is rotated into a pseudo earth-fixed frame by the
//! Greenwich sidereal angle (polar motion is ignored), differenced with the
//! observer's WGS-84 ECEF position, then expressed in the observer's local
//! east/north/up frame.

use na::{Matrix3, Rotation3, Vector3};
use nav_types::{ECEF, WGS84};
use skytypes::prelude::*;

use crate::units::Timestamp;

const J2000_JULIAN_DATE: f64 = 2_451_545.0;
const DAYS_PER_JULIAN_YEAR: f64 = 365.25;

/// Greenwich sidereal angle [rad]
pub fn sidereal_angle(t: &Timestamp) -> f64 {
    let years_since_j2000 = (t.as_julian_date() - J2000_JULIAN_DATE) / DAYS_PER_JULIAN_YEAR;
    sgp4::iau_epoch_to_sidereal_time(years_since_j2000).rem_euclid(std::f64::consts::TAU)
}

/// TEME [km] to earth-fixed [km]
pub fn teme_to_ecef(position: &EciPosition, t: &Timestamp) -> Vector3<f64> {
    let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), -sidereal_angle(t));
    rot * position.pos_km
}

/// Observer WGS-84 position in earth-fixed coordinates [km]
pub fn observer_ecef(observer: &ObserverLocation) -> Vector3<f64> {
    let pos = ECEF::from(WGS84::from_degrees_and_meters(
        observer.latitude_deg,
        observer.longitude_deg,
        observer.altitude_m,
    ));
    Vector3::new(pos.x(), pos.y(), pos.z()) / 1000.0
}

/// Rotation from earth-fixed offsets into the observer's east/north/up frame
fn enu_rotation(observer: &ObserverLocation) -> Matrix3<f64> {
    let (sin_lat, cos_lat) = observer.latitude_radians().sin_cos();
    let (sin_lon, cos_lon) = observer.longitude_radians().sin_cos();
    #[rustfmt::skip]
    let m = Matrix3::new(
        -sin_lon,            cos_lon,            0.0,
        -sin_lat * cos_lon, -sin_lat * sin_lon,  cos_lat,
         cos_lat * cos_lon,  cos_lat * sin_lon,  sin_lat,
    );
    m
}

pub fn look_angle(observer: &ObserverLocation, position: &EciPosition, t: &Timestamp) -> LookAngle {
    let offset = teme_to_ecef(position, t) - observer_ecef(observer);
    let enu = enu_rotation(observer) * offset;
    let range = enu.norm();
    if range == 0.0 {
        return LookAngle::from_radians_and_km(0.0, std::f64::consts::FRAC_PI_2, 0.0);
    }
    let azimuth = enu.x.atan2(enu.y);
    let elevation = (enu.z / range).clamp(-1.0, 1.0).asin();
    LookAngle::from_radians_and_km(azimuth, elevation, range)
}
