use derive_more::Display;
use serde::Serialize;

/// Direction and distance from an observer to an object
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Display, Serialize)]
#[display(
    fmt = "{{az: {:.1}, el: {:.1}, range: {:.0} km}}",
    "azimuth_deg",
    "elevation_deg",
    "range_km"
)]
pub struct LookAngle {
    /// Clockwise from true north, [0, 360)
    pub azimuth_deg: f64,
    /// Above the local horizon, [-90, 90]
    pub elevation_deg: f64,
    /// Slant range [km]
    pub range_km: f64,
}

impl LookAngle {
    pub fn from_radians_and_km(azimuth: f64, elevation: f64, range_km: f64) -> Self {
        let mut azimuth_deg = azimuth.to_degrees().rem_euclid(360.0);
        // rem_euclid can round up to the modulus for tiny negative inputs
        if azimuth_deg >= 360.0 {
            azimuth_deg = 0.0;
        }
        Self {
            azimuth_deg,
            elevation_deg: elevation.to_degrees().clamp(-90.0, 90.0),
            range_km: range_km.max(0.0),
        }
    }
}
